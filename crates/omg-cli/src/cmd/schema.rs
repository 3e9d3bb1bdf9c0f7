use anyhow::Result;

use omg_query::{AliasInput, SchemaInput};

use super::Ctx;
use crate::io::input::{addresses, read_json_file};
use crate::output;

pub async fn put_schema(ctx: &Ctx, input: &str) -> Result<()> {
    let schema: SchemaInput = read_json_file(input)?;
    let surface = ctx.surface(&[]).await?;
    let created = surface.create_schema(schema).await?;
    output::print(&created)
}

pub async fn put_alias(ctx: &Ctx, name: String, schemas: &[String]) -> Result<()> {
    let alias = AliasInput {
        name,
        schemas: addresses(schemas),
    };
    let surface = ctx.surface(&[]).await?;
    let created = surface.create_alias(alias).await?;
    output::print(&created)
}

use anyhow::{anyhow, Result};
use serde::Serialize;

use omg_query::ObjectType;

use super::Ctx;
use crate::io::input::addresses;
use crate::output;

#[derive(Debug, Serialize)]
struct TypesOut<'a> {
    root: &'a str,
    types: Vec<&'a ObjectType>,
}

pub async fn run(ctx: &Ctx, schemas: &[String]) -> Result<()> {
    let surface = ctx.surface(&addresses(schemas)).await?;
    let compiled = surface
        .compiled()
        .ok_or_else(|| anyhow!("schema is required"))?;

    if output::is_json() {
        let root = compiled.root_type()?;
        return output::print(&TypesOut {
            root: &root.name,
            types: compiled.types().iter().collect(),
        });
    }
    output::print_text(&compiled.render()?)
}

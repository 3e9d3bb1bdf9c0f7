use anyhow::Result;
use serde_json::Value;

use omg_core::model::Address;
use omg_query::Selection;

use super::Ctx;
use crate::io::input::{addresses, read_json_file};
use crate::output;

pub async fn create(ctx: &Ctx, schemas: &[String], input: &str) -> Result<()> {
    let payload: Value = read_json_file(input)?;
    let surface = ctx.surface(&addresses(schemas)).await?;
    let created = surface.create_document(&payload).await?;
    output::print(&created)
}

pub async fn get(ctx: &Ctx, address: &str, schemas: &[String], select: Option<&str>) -> Result<()> {
    let selection = match select {
        Some(s) => Selection::parse(s)?,
        None => Selection::new(),
    };
    let surface = ctx.surface(&addresses(schemas)).await?;
    let value = surface.get(&Address::from(address), &selection).await?;
    output::print(&value)
}

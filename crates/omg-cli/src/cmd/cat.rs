use anyhow::Result;

use omg_core::determinism::canonical_json::canonicalize_json;
use omg_core::model::Address;

use super::Ctx;
use crate::output;

pub async fn run(ctx: &Ctx, address: &str) -> Result<()> {
    let resource = ctx.caps.fetch(&Address::from(address)).await?;
    let value = canonicalize_json(&serde_json::to_value(&resource)?)?;
    output::print(&value)
}

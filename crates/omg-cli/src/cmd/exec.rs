use anyhow::{bail, Result};

use omg_query::Operation;

use super::Ctx;
use crate::io::input::{addresses, read_json_file};
use crate::output;

/// Run one operation envelope. Operation failures are part of the printed
/// response; the exit status reflects them.
pub async fn run(ctx: &Ctx, schemas: &[String], input: &str) -> Result<()> {
    let op: Operation = read_json_file(input)?;
    let surface = ctx.surface(&addresses(schemas)).await?;
    let response = surface.execute(op).await;
    output::print(&response)?;
    if !response.is_ok() {
        bail!("operation failed");
    }
    Ok(())
}

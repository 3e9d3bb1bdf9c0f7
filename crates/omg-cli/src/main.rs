use anyhow::Result;
use clap::Parser;

mod args;
mod cmd;
mod io;
mod output;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = args::Cli::parse();
    output::init(cli.json);
    output::init_tracing(&cli.log, cli.json);

    if let Err(e) = cmd::dispatch(cli).await {
        output::error_line(&format!("{e:#}"));
        std::process::exit(1);
    }
    Ok(())
}

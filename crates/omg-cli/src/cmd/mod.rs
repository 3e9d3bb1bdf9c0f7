use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use omg_core::capability::Capabilities;
use omg_core::config::CoreConfig;
use omg_core::model::Address;
use omg_query::Surface;
use omg_store::{FsStore, StoreConfig};

use crate::args::{Cli, Command};

mod cat;
mod document;
mod exec;
mod schema;
mod types;

pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = cli.core_config();
    let ctx = Ctx::open(&cli.store_root, config).await?;

    match cli.command {
        Command::PutSchema { input } => schema::put_schema(&ctx, &input).await,
        Command::PutAlias { name, schemas } => schema::put_alias(&ctx, name, &schemas).await,
        Command::CreateDocument { schemas, input } => {
            document::create(&ctx, &schemas, &input).await
        }
        Command::Get { address, schemas, select } => {
            document::get(&ctx, &address, &schemas, select.as_deref()).await
        }
        Command::Types { schemas } => types::run(&ctx, &schemas).await,
        Command::Cat { address } => cat::run(&ctx, &address).await,
        Command::Exec { schemas, input } => exec::run(&ctx, &schemas, &input).await,
    }
}

/// Store plus config shared by every command.
pub struct Ctx {
    pub caps: Capabilities,
    pub config: CoreConfig,
}

impl Ctx {
    async fn open(store_root: &str, config: CoreConfig) -> Result<Self> {
        let store = FsStore::open(store_root, StoreConfig::from(&config))
            .await
            .with_context(|| format!("opening store at {store_root}"))?;
        debug!(root = store_root, "store opened");
        Ok(Self {
            caps: Capabilities::from_shared(Arc::new(store)),
            config,
        })
    }

    pub async fn surface(&self, schemas: &[Address]) -> Result<Surface> {
        Ok(Surface::build(self.caps.clone(), self.config.clone(), schemas).await?)
    }
}

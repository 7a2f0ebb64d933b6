use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use log::debug;

use crate::server::factory::ServerFactory;

use super::{ConfigArgs, LogArgs, RunCommand};

/// Start the gate server. Page navigations are checked against the session
/// and permission cookies; the JSON API manages sessions and the permission
/// matrix.
#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[async_trait(?Send)]
impl RunCommand for ServeArgs {
    async fn run(&self) -> Result<()> {
        self.log.init()?;
        let cfg = self.config.load_server_config()?;
        debug!("Use server config: {cfg:?}");

        let factory = ServerFactory::new(cfg).context("init server")?;
        let srv = factory.build_server()?;
        srv.run().await
    }
}

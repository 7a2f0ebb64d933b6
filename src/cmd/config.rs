use anyhow::Result;
use async_trait::async_trait;
use clap::Args;

use crate::display::pretty_json;

use super::{ConfigArgs, LogArgs, RunCommand};

/// Display the effective server configuration in JSON format.
#[derive(Args)]
pub struct ShowConfigArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[async_trait(?Send)]
impl RunCommand for ShowConfigArgs {
    async fn run(&self) -> Result<()> {
        self.log.init()?;
        let cfg = self.config.load_server_config()?;
        pretty_json(cfg)
    }
}

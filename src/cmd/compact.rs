use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use log::warn;

use crate::display::pretty_json;
use crate::server::authz::resolver::{MatrixState, Resolver};

use super::check::load_state;
use super::{ConfigArgs, LogArgs, RunCommand};

/// Print the role-keyed path lists the permissions cookie carries for a
/// matrix.
#[derive(Args)]
pub struct CompactArgs {
    /// Matrix JSON file to use instead of the persisted one.
    #[arg(long)]
    pub matrix: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[async_trait(?Send)]
impl RunCommand for CompactArgs {
    async fn run(&self) -> Result<()> {
        self.log.init()?;
        let cfg = self.config.load_server_config()?;
        let registry = Arc::new(cfg.authz.build_registry()?);
        let state = load_state(self.matrix.as_deref(), &cfg, registry.clone())?;

        let matrix = match state {
            MatrixState::Unconfigured => {
                warn!("No permission matrix configured, every feature is open");
                return pretty_json(Option::<()>::None);
            }
            MatrixState::Configured(matrix) => matrix,
        };

        let resolver = Resolver::new(registry);
        pretty_json(resolver.compact(&matrix))
    }
}

mod check;
mod compact;
mod config;
mod serve;

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};

use crate::config::{CommonConfig, PathSet};
use crate::logs;
use crate::server::config::ServerConfig;

#[async_trait(?Send)]
pub trait RunCommand {
    async fn run(&self) -> Result<()>;
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Directory holding `server.toml` and the pki files. Default: env
    /// `PETALGATE_CONFIG`, then `/etc/petalgate` for root, else
    /// `~/.config/petalgate`.
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Directory the permission matrix is persisted in. Default: env
    /// `PETALGATE_DATA`, then `/var/lib/petalgate` for root, else
    /// `~/.local/share/petalgate`.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

impl ConfigArgs {
    pub fn build_path_set(&self) -> Result<PathSet> {
        PathSet::new(self.config_dir.clone(), self.data_dir.clone())
    }

    pub fn load_server_config(&self) -> Result<ServerConfig> {
        let ps = self.build_path_set()?;
        ps.load_config("server", ServerConfig::default)
            .context("load server config")
    }
}

#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Log level: error, warn, info or debug.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl LogArgs {
    pub fn init(&self) -> Result<()> {
        logs::init(&self.log_level)
    }
}

#[derive(Parser)]
#[command(author, version, about)]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Check(check::CheckArgs),
    Compact(compact::CompactArgs),
    Config(config::ShowConfigArgs),
    Serve(serve::ServeArgs),
}

#[async_trait(?Send)]
impl RunCommand for App {
    async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Check(args) => args.run().await,
            Commands::Compact(args) => args.run().await,
            Commands::Config(args) => args.run().await,
            Commands::Serve(args) => args.run().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_app() {
        App::command().debug_assert();

        let app = App::try_parse_from([
            "petalgate",
            "check",
            "--role",
            "manager",
            "--path",
            "/invoice/3",
            "--config-dir",
            "/tmp/petalgate",
        ])
        .unwrap();
        match app.command {
            Commands::Check(args) => {
                assert_eq!(args.role, "manager");
                assert_eq!(args.path, "/invoice/3");
                assert!(args.matrix.is_none());
            }
            _ => panic!("expect check command"),
        }
    }
}

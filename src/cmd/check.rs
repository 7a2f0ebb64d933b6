use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::Args;
use serde::Serialize;

use crate::display::pretty_json;
use crate::server::authz::factory::AuthzFactory;
use crate::server::authz::registry::FeatureRegistry;
use crate::server::authz::resolver::{MatrixState, Resolver};
use crate::server::authz::store::MatrixStore;
use crate::server::config::ServerConfig;
use crate::server::gate::Gate;
use crate::types::permission::PermissionMatrix;
use crate::types::role::Role;

use super::{ConfigArgs, LogArgs, RunCommand};

/// Evaluate offline whether a role may open a path, against the configured
/// matrix or a matrix file.
#[derive(Args)]
pub struct CheckArgs {
    /// Role to check: admin, boss, manager, staff, demo or store.
    #[arg(long)]
    pub role: String,

    /// Path to check, e.g. `/invoice/2024`.
    #[arg(long)]
    pub path: String,

    /// Matrix JSON file to use instead of the persisted one.
    #[arg(long)]
    pub matrix: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    role: Role,
    path: String,
    feature: Option<String>,
    admin_path: bool,
    configured: bool,

    /// Decision against the full matrix.
    allowed: bool,

    /// Decision the navigation gate takes from the compacted claims.
    gate_allowed: bool,
}

#[async_trait(?Send)]
impl RunCommand for CheckArgs {
    async fn run(&self) -> Result<()> {
        self.log.init()?;
        let role = Role::parse(&self.role);
        if role == Role::Unknown {
            bail!("unknown role '{}'", self.role);
        }
        if !self.path.starts_with('/') {
            bail!("path must start with '/'");
        }

        let cfg = self.config.load_server_config()?;
        let registry = Arc::new(cfg.authz.build_registry()?);
        let state = load_state(self.matrix.as_deref(), &cfg, registry.clone())?;

        let resolver = Resolver::new(registry.clone());
        let compact = state.matrix().map(|matrix| resolver.compact(matrix));
        let gate = Gate::new(
            &cfg.gate,
            registry.clone(),
            AuthzFactory::new().build_authorizer(registry.clone()),
        );

        pretty_json(CheckResult {
            role,
            path: self.path.clone(),
            feature: registry.resolve(&self.path).map(|f| f.id.clone()),
            admin_path: registry.is_admin_path(&self.path),
            configured: state.matrix().is_some(),
            allowed: resolver.is_path_allowed(role, &self.path, &state),
            gate_allowed: gate.can_access(role, &self.path, compact.as_ref()),
        })
    }
}

/// Reads `file` when given, otherwise the matrix persisted by the server.
pub fn load_state(
    file: Option<&Path>,
    cfg: &ServerConfig,
    registry: Arc<FeatureRegistry>,
) -> Result<MatrixState> {
    let file = match file {
        Some(file) => file,
        None => {
            let store = MatrixStore::open(&cfg.authz.matrix_file, registry)?;
            return Ok(store.state().as_ref().clone());
        }
    };

    let data = fs::read(file).with_context(|| format!("read matrix file '{}'", file.display()))?;
    let matrix: PermissionMatrix = serde_json::from_slice(&data).context("parse matrix json")?;
    registry
        .validate_matrix(&matrix)
        .context("validate matrix")?;

    Ok(MatrixState::Configured(matrix))
}

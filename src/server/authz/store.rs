use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::{fs, io};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::dirs::ensure_dir_exists;
use crate::types::permission::PermissionMatrix;

use super::registry::FeatureRegistry;
use super::resolver::MatrixState;

/// Server-side source of truth for the permission matrix, persisted as a JSON
/// array. Writes are last-write-wins.
pub struct MatrixStore {
    path: PathBuf,
    registry: Arc<FeatureRegistry>,
    state: RwLock<Arc<MatrixState>>,
}

impl MatrixStore {
    pub fn open(path: impl AsRef<Path>, registry: Arc<FeatureRegistry>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = Self::load(&path, &registry)?;
        if let MatrixState::Configured(ref matrix) = state {
            info!(
                "Loaded permission matrix with {} rows from '{}'",
                matrix.rows.len(),
                path.display()
            );
        }

        Ok(Self {
            path,
            registry,
            state: RwLock::new(Arc::new(state)),
        })
    }

    fn load(path: &Path, registry: &FeatureRegistry) -> Result<MatrixState> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(MatrixState::Unconfigured)
            }
            Err(err) => {
                return Err(err).with_context(|| format!("read matrix file '{}'", path.display()))
            }
        };

        let matrix: PermissionMatrix = match serde_json::from_slice(&data) {
            Ok(matrix) => matrix,
            Err(err) => {
                warn!(
                    "Matrix file '{}' is corrupt, treat as unconfigured: {err}",
                    path.display()
                );
                return Ok(MatrixState::Unconfigured);
            }
        };

        // Rows for features that left the registry cannot be enforced, keep
        // them on disk but ignore them when resolving.
        if let Err(err) = registry.validate_matrix(&matrix) {
            warn!("Matrix file '{}': {err}", path.display());
        }

        Ok(MatrixState::Configured(matrix))
    }

    /// A snapshot of the current matrix. Later writes do not affect it.
    pub fn state(&self) -> Arc<MatrixState> {
        let state = match self.state.read() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(&state)
    }

    pub fn replace(&self, matrix: PermissionMatrix) -> Result<Arc<MatrixState>> {
        self.registry
            .validate_matrix(&matrix)
            .context("validate matrix")?;

        let data = serde_json::to_vec_pretty(&matrix).context("encode matrix")?;
        if let Some(dir) = self.path.parent() {
            ensure_dir_exists(dir).context("ensure matrix dir")?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, data).context("write matrix tmp file")?;
        fs::rename(&tmp_path, &self.path).context("rename matrix file")?;

        let state = Arc::new(MatrixState::Configured(matrix));
        self.swap(Arc::clone(&state));
        info!("Permission matrix replaced");
        Ok(state)
    }

    /// Drops the matrix; every feature becomes open again.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err).context("remove matrix file"),
        }

        self.swap(Arc::new(MatrixState::Unconfigured));
        info!("Permission matrix cleared");
        Ok(())
    }

    fn swap(&self, state: Arc<MatrixState>) {
        let mut current = match self.state.write() {
            Ok(current) => current,
            Err(poisoned) => poisoned.into_inner(),
        };
        *current = state;
    }
}

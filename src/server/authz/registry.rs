use std::collections::HashSet;

use thiserror::Error;

use crate::types::permission::{FeatureRoute, PermissionMatrix};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatrixError {
    #[error("feature id cannot be empty")]
    EmptyFeature,

    #[error("unknown feature '{0}'")]
    UnknownFeature(String),

    #[error("duplicate feature '{0}'")]
    DuplicateFeature(String),

    #[error("duplicate path '{0}'")]
    DuplicatePath(String),

    #[error("invalid path '{0}', must start with '/'")]
    InvalidPath(String),
}

/// Returns `true` if `path` equals `prefix` or lies below it. The boundary
/// is a path separator, so `/invoice` covers `/invoice/2024` but not
/// `/invoice-archive`. A prefix of `/` only covers `/` itself.
pub fn path_matches(path: &str, prefix: &str) -> bool {
    if path == prefix {
        return true;
    }
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return false;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

/// The single declarative `{path, feature}` table. The admin editor lists
/// its features and validates matrices against it; the gate resolves paths
/// with it.
#[derive(Debug, Clone)]
pub struct FeatureRegistry {
    features: Vec<FeatureRoute>,
    admin_paths: Vec<String>,
}

impl FeatureRegistry {
    pub fn new(features: Vec<FeatureRoute>, admin_paths: Vec<String>) -> Result<Self, MatrixError> {
        let mut ids = HashSet::new();
        let mut paths = HashSet::new();
        for feature in features.iter() {
            if feature.id.is_empty() {
                return Err(MatrixError::EmptyFeature);
            }
            if !feature.path.starts_with('/') {
                return Err(MatrixError::InvalidPath(feature.path.clone()));
            }
            if !ids.insert(feature.id.as_str()) {
                return Err(MatrixError::DuplicateFeature(feature.id.clone()));
            }
            if !paths.insert(feature.path.as_str()) {
                return Err(MatrixError::DuplicatePath(feature.path.clone()));
            }
        }
        for path in admin_paths.iter() {
            if !path.starts_with('/') {
                return Err(MatrixError::InvalidPath(path.clone()));
            }
        }

        Ok(Self {
            features,
            admin_paths,
        })
    }

    pub fn features(&self) -> &[FeatureRoute] {
        &self.features
    }

    pub fn feature(&self, id: &str) -> Option<&FeatureRoute> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn path_for(&self, id: &str) -> Option<&str> {
        self.feature(id).map(|f| f.path.as_str())
    }

    pub fn is_admin_path(&self, path: &str) -> bool {
        self.admin_paths.iter().any(|p| path_matches(path, p))
    }

    /// Maps `path` to its feature: an exact match wins, otherwise the longest
    /// registered prefix that `path` lies below.
    pub fn resolve(&self, path: &str) -> Option<&FeatureRoute> {
        if let Some(feature) = self.features.iter().find(|f| f.path == path) {
            return Some(feature);
        }

        self.features
            .iter()
            .filter(|f| path_matches(path, &f.path))
            .max_by_key(|f| f.path.len())
    }

    /// Checks that every row names a registered feature, once.
    pub fn validate_matrix(&self, matrix: &PermissionMatrix) -> Result<(), MatrixError> {
        let mut seen = HashSet::new();
        for row in matrix.rows.iter() {
            if row.feature.is_empty() {
                return Err(MatrixError::EmptyFeature);
            }
            if self.feature(&row.feature).is_none() {
                return Err(MatrixError::UnknownFeature(row.feature.clone()));
            }
            if !seen.insert(row.feature.as_str()) {
                return Err(MatrixError::DuplicateFeature(row.feature.clone()));
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn new_test() -> Self {
        use crate::config::CommonConfig;
        use crate::server::authz::config::AuthzConfig;

        let cfg = AuthzConfig::default();
        Self::new(cfg.features, cfg.admin_paths).unwrap()
    }
}

// config.rs — Where the published file and its staging file live.
//
// Both paths are configured relative to the application's data root.
// Absolute paths are kept as-is (`Path::join` semantics).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::persister::{default_staging_path, Persister};

/// Persister section of the downloader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersisterConfig {
    /// Published file, relative to the data root.
    #[serde(default = "default_target")]
    pub target: PathBuf,

    /// Staging file override, relative to the data root. When unset the
    /// staging file sits next to the target as `<target>.tmp`.
    #[serde(default)]
    pub tmp_target: Option<PathBuf>,
}

impl Default for PersisterConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            tmp_target: None,
        }
    }
}

fn default_target() -> PathBuf {
    PathBuf::from("rds").join("rds-data.json")
}

impl PersisterConfig {
    /// Absolute target path under `data_root`.
    pub fn target_path(&self, data_root: &Path) -> PathBuf {
        data_root.join(&self.target)
    }

    /// Staging path under `data_root`, falling back to the colocated default.
    pub fn staging_path(&self, data_root: &Path) -> PathBuf {
        match &self.tmp_target {
            Some(tmp) => data_root.join(tmp),
            None => default_staging_path(&self.target_path(data_root)),
        }
    }

    /// Build a persister for this configuration.
    pub fn build(&self, data_root: &Path) -> Persister {
        Persister::new(
            self.target_path(data_root),
            Some(self.staging_path(data_root)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_under_data_root() {
        let config = PersisterConfig::default();
        let root = Path::new("/srv/data");
        assert_eq!(
            config.target_path(root),
            PathBuf::from("/srv/data/rds/rds-data.json")
        );
        assert_eq!(
            config.staging_path(root),
            PathBuf::from("/srv/data/rds/rds-data.json.tmp")
        );
    }

    #[test]
    fn tmp_target_override_resolves_under_data_root() {
        let config = PersisterConfig {
            target: PathBuf::from("out/data.json"),
            tmp_target: Some(PathBuf::from("work/data.partial")),
        };
        let root = Path::new("/srv/data");
        assert_eq!(
            config.staging_path(root),
            PathBuf::from("/srv/data/work/data.partial")
        );
    }

    #[test]
    fn absolute_target_ignores_data_root() {
        let config = PersisterConfig {
            target: PathBuf::from("/opt/rds/current.json"),
            tmp_target: None,
        };
        let root = Path::new("/srv/data");
        assert_eq!(
            config.target_path(root),
            PathBuf::from("/opt/rds/current.json")
        );
        assert_eq!(
            config.staging_path(root),
            PathBuf::from("/opt/rds/current.json.tmp")
        );
    }

    #[test]
    fn deserializes_partial_section() {
        let config: PersisterConfig =
            serde_json::from_str(r#"{"tmp_target": "x.tmp"}"#).unwrap();
        assert_eq!(config.target, default_target());
        assert_eq!(config.tmp_target, Some(PathBuf::from("x.tmp")));
    }
}

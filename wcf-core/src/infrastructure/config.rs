// wcf-core/src/infrastructure/config.rs

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::infrastructure::error::InfrastructureError;

const CANDIDATE_FILENAMES: [&str; 2] = ["wcf.yaml", "wcf.yml"];

/// CLI-layer configuration, loaded once at startup. The core library never
/// reads this itself — it is handed concrete values (output dir, exporter name,
/// worker count) by the CLI after this struct is resolved.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct WcfConfig {
    #[validate(length(min = 1, message = "profile must not be empty"))]
    pub profile: String,
    #[validate(length(min = 1, message = "output_dir must not be empty"))]
    pub output_dir: String,
    #[validate(length(min = 1, message = "default_exporter must not be empty"))]
    pub default_exporter: String,
    #[validate(range(min = 1, message = "worker_pool_size must be at least 1 when set"))]
    pub worker_pool_size: Option<usize>,
}

impl Default for WcfConfig {
    fn default() -> Self {
        Self {
            profile: "default".to_string(),
            output_dir: ".".to_string(),
            default_exporter: "json".to_string(),
            worker_pool_size: None,
        }
    }
}

impl WcfConfig {
    /// Looks for `wcf.yaml`/`wcf.yml` in `dir`; absence is not an error, the
    /// built-in defaults apply. Environment variables `WCF_PROFILE` and
    /// `WCF_OUTPUT_DIR` override whatever was loaded (or the defaults).
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn load(dir: &Path) -> Result<Self, InfrastructureError> {
        let mut config = match find_config_file(dir) {
            Some(path) => {
                info!(path = %path.display(), "loading wcf config");
                let content = std::fs::read_to_string(&path).map_err(InfrastructureError::Io)?;
                serde_yaml::from_str(&content)?
            }
            None => Self::default(),
        };

        if let Ok(profile) = std::env::var("WCF_PROFILE") {
            info!(new = %profile, "overriding profile via WCF_PROFILE");
            config.profile = profile;
        }
        if let Ok(output_dir) = std::env::var("WCF_OUTPUT_DIR") {
            info!(new = %output_dir, "overriding output_dir via WCF_OUTPUT_DIR");
            config.output_dir = output_dir;
        }

        config
            .validate()
            .map_err(|e| InfrastructureError::ConfigError(e.to_string()))?;

        Ok(config)
    }
}

fn find_config_file(dir: &Path) -> Option<std::path::PathBuf> {
    CANDIDATE_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // std::env is process-wide; serialise tests that touch WCF_* vars.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_apply_when_no_file_present() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("WCF_PROFILE");
        std::env::remove_var("WCF_OUTPUT_DIR");
        let dir = tempfile::tempdir().unwrap();
        let config = WcfConfig::load(dir.path()).unwrap();
        assert_eq!(config.profile, "default");
        assert_eq!(config.default_exporter, "json");
    }

    #[test]
    fn loads_file_when_present() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("WCF_PROFILE");
        std::env::remove_var("WCF_OUTPUT_DIR");
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wcf.yaml"), "profile: ci\ndefault_exporter: yaml\n").unwrap();
        let config = WcfConfig::load(dir.path()).unwrap();
        assert_eq!(config.profile, "ci");
        assert_eq!(config.default_exporter, "yaml");
    }

    #[test]
    fn env_vars_override_file_values() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wcf.yaml"), "profile: ci\n").unwrap();
        std::env::set_var("WCF_PROFILE", "override");
        let config = WcfConfig::load(dir.path()).unwrap();
        assert_eq!(config.profile, "override");
        std::env::remove_var("WCF_PROFILE");
    }
}

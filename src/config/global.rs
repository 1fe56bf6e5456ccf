use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Machine-wide pointer file that lets every invocation share one shop book
/// without passing `-C` each time.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct GlobalConfig {
    #[serde(default)]
    pub config_dir: Option<String>,
}

/// Location of the global pointer file (`<xdg config>/khata/global.toml`)
pub fn global_config_file() -> PathBuf {
    match ProjectDirs::from("", "", "khata") {
        Some(dirs) => dirs.config_dir().join("global.toml"),
        None => super::expand_path("~/.khata/global.toml"),
    }
}

/// Load the global config. A missing or unreadable file yields the default.
pub fn load_global_config() -> GlobalConfig {
    let path = global_config_file();
    let Ok(content) = fs::read_to_string(&path) else {
        return GlobalConfig::default();
    };
    match toml::from_str(&content) {
        Ok(global) => global,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed global config");
            GlobalConfig::default()
        }
    }
}

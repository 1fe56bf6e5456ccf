mod global;
mod settings;

pub use global::{global_config_file, load_global_config, GlobalConfig};
pub use settings::{Config, LogSettings, PdfSettings, ShopSettings, StatementSettings};

use crate::error::{KhataError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path.
///
/// The global pointer file wins, then the XDG project directory, then `~/.khata/`.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = load_global_config().config_dir {
        return Ok(expand_path(&dir));
    }

    if let Some(proj_dirs) = ProjectDirs::from("", "", "khata") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        KhataError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".khata"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve `pdf.output_dir`: `~/` expands to home, relative paths hang off the config dir.
pub fn resolve_output_dir(output_dir: &str, cfg_dir: &Path) -> PathBuf {
    let expanded = expand_path(output_dir);
    if expanded.is_absolute() {
        expanded
    } else {
        cfg_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(cfg_dir: &Path) -> Result<Config> {
    if !cfg_dir.exists() {
        return Err(KhataError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    let path = cfg_dir.join("config.toml");
    if !path.exists() {
        return Err(KhataError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| KhataError::ConfigParse { path, source: e })
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[shop]
currency = "INR"
currency_symbol = "Rs."
low_stock = 5          # products at or below this count show as low stock

[statement]
footer = "Thank you for your business!"

[pdf]
output_dir = "output"  # relative to this directory, or an absolute / ~/ path
paper = "a4"

[log]
# level = "info"       # overridden by KHATA_LOG or -v
"#;

/// Template content for business.toml
pub const BUSINESS_TEMPLATE: &str = r#"# Shown on the header of statements and bills.
name = "Your Shop Name"
address = "Shop Street, City"
phone = "+91-00000-00000"
# gstin = "24ABCDE1234F1Z5"    # optional
"#;

//! Application configuration for pageforge.
//!
//! User config lives at `~/.pageforge/pageforge.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PageforgeError, Result};
use crate::types::PageType;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "pageforge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".pageforge";

// ---------------------------------------------------------------------------
// Config structs (matching pageforge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where and how generated documents are written.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the documents are written to.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// File name of the FAQ document.
    #[serde(default = "default_faq_file")]
    pub faq_file: String,

    /// File name of the product page document.
    #[serde(default = "default_product_file")]
    pub product_file: String,

    /// File name of the comparison page document.
    #[serde(default = "default_comparison_file")]
    pub comparison_file: String,

    /// Pretty-print JSON output.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            faq_file: default_faq_file(),
            product_file: default_product_file(),
            comparison_file: default_comparison_file(),
            pretty: true,
        }
    }
}

impl OutputConfig {
    /// File name configured for a page type.
    pub fn file_for(&self, page_type: PageType) -> &str {
        match page_type {
            PageType::Faq => &self.faq_file,
            PageType::Product => &self.product_file,
            PageType::Comparison => &self.comparison_file,
        }
    }
}

fn default_output_dir() -> String {
    "output".into()
}
fn default_faq_file() -> String {
    "faq.json".into()
}
fn default_product_file() -> String {
    "product_page.json".into()
}
fn default_comparison_file() -> String {
    "comparison_page.json".into()
}
fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.pageforge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PageforgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.pageforge/pageforge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PageforgeError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        PageforgeError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PageforgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PageforgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PageforgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

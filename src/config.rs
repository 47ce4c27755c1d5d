use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Normal,
    Markdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_format: default_output_format(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Try .edscope.yml / .edscope.yaml in current directory
        for name in [".edscope.yml", ".edscope.yaml"] {
            let config_path = PathBuf::from(name);
            if config_path.exists() {
                return Self::load_from(&config_path);
            }
        }

        // Try in home directory
        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".edscope.yml");
            if home_config.exists() {
                return Self::load_from(&home_config);
            }
        }

        Ok(Config::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn merge_with_cli(&mut self, cli_format: Option<OutputFormat>, verbose: bool) {
        if let Some(format) = cli_format {
            self.output_format = format;
        }
        if verbose {
            self.log_level = "debug".to_string();
        }
    }
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Json
}

fn default_log_level() -> String {
    "info".to_string()
}

//! Launch profile configuration loaded from YAML

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::packages::PackageRequirement;

/// Profile applied when no YAML file is given
pub const DEFAULT_PROFILE_NAME: &str = "VeighNa Trader";

/// Environment directory relative to the working directory
pub const DEFAULT_ENV_DIR: &str = ".venv";

/// Interpreter used to seed a fresh environment
pub const PREFERRED_INTERPRETER: &str = "python3.10";

/// Fallback when the preferred interpreter is not on PATH
pub const FALLBACK_INTERPRETER: &str = "python3";

/// Everything the launcher needs to know about one application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchProfile {
    /// Name shown in banners
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Environment root directory
    #[serde(default = "default_env_dir")]
    pub env_dir: PathBuf,
    /// Interpreter candidates for environment creation, best first
    #[serde(default = "default_interpreters")]
    pub interpreters: Vec<String>,
    /// Directory the application is launched from
    #[serde(default = "default_app_dir")]
    pub app_dir: PathBuf,
    /// Entry script handed to the environment interpreter
    #[serde(default = "default_entry")]
    pub entry: String,
    /// Ordered requirement list; the GUI toolkit stays first
    #[serde(default = "PackageRequirement::defaults")]
    pub requirements: Vec<PackageRequirement>,
}

fn default_env_dir() -> PathBuf {
    PathBuf::from(DEFAULT_ENV_DIR)
}

fn default_interpreters() -> Vec<String> {
    vec![
        PREFERRED_INTERPRETER.to_string(),
        FALLBACK_INTERPRETER.to_string(),
    ]
}

fn default_app_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_entry() -> String {
    "run.py".to_string()
}

impl Default for LaunchProfile {
    fn default() -> Self {
        Self {
            name: DEFAULT_PROFILE_NAME.to_string(),
            description: String::new(),
            env_dir: default_env_dir(),
            interpreters: default_interpreters(),
            app_dir: default_app_dir(),
            entry: default_entry(),
            requirements: PackageRequirement::defaults(),
        }
    }
}

impl LaunchProfile {
    /// Load profile from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read profile file: {}", path.as_ref().display()))?;

        let profile: LaunchProfile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse profile YAML: {}", path.as_ref().display()))?;

        Ok(profile)
    }
}

use cmd_lib::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::{Error, ErrorKind};

use crate::common::{DEPENDENCY_MANIFEST, HTTPS_PORT, PROXY_LISTEN_PORT, VENV_DIR_NAME};
use crate::packages::PackageManager;

pub const DEFAULT_APP_DIR: &str = "/home/ubuntu/app";
pub const DEFAULT_ENTRY_FILE: &str = "app.py";
pub const DEFAULT_DOMAIN: &str = "10.94.74.222";
pub const DEFAULT_PORT: u16 = 8501;
pub const DEFAULT_USER: &str = "ubuntu";
pub const DEFAULT_SERVICE_NAME: &str = "streamlit";
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisionConfig {
    pub app_dir: String,
    pub entry_file: String,
    /// Hostname or IPv4 literal
    pub domain: String,
    pub port: u16,
    pub user: String,
    pub package_manager: PackageManager,
    pub service_name: String,
    pub admin_email: Option<String>,
    pub environment: BTreeMap<String, String>,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            app_dir: DEFAULT_APP_DIR.to_string(),
            entry_file: DEFAULT_ENTRY_FILE.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            package_manager: PackageManager::default(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            admin_email: None,
            environment: BTreeMap::from([(
                "AWS_DEFAULT_REGION".to_string(),
                DEFAULT_AWS_REGION.to_string(),
            )]),
        }
    }
}

impl ProvisionConfig {
    pub fn load(path: Option<&str>) -> Result<Self, Error> {
        let Some(path) = path else {
            info!("No config file given, using built-in defaults");
            return Ok(Self::default());
        };
        info!("Loading provision config from {path}");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(|e| Error::other(format!("TOML parse error: {e}")))
    }

    pub fn venv_dir(&self) -> String {
        format!("{}/{VENV_DIR_NAME}", self.app_dir.trim_end_matches('/'))
    }

    pub fn manifest_path(&self) -> String {
        format!("{}/{DEPENDENCY_MANIFEST}", self.app_dir.trim_end_matches('/'))
    }

    pub fn admin_email(&self) -> String {
        self.admin_email
            .clone()
            .unwrap_or_else(|| format!("admin@{}", self.domain))
    }

    pub fn validate(&self) -> Result<(), Error> {
        let invalid =
            |msg: String| -> Result<(), Error> { Err(Error::new(ErrorKind::InvalidInput, msg)) };

        for (name, value) in [
            ("domain", &self.domain),
            ("user", &self.user),
            ("entry_file", &self.entry_file),
            ("service_name", &self.service_name),
        ] {
            if value.trim().is_empty() {
                return invalid(format!("{name} must not be empty"));
            }
            if value.chars().any(char::is_whitespace) {
                return invalid(format!("{name} must not contain whitespace: {value:?}"));
            }
        }
        if self.port == 0 {
            return invalid("port must be non-zero".to_string());
        }
        if self.port == PROXY_LISTEN_PORT || self.port == HTTPS_PORT {
            return invalid(format!("port {} is reserved for nginx", self.port));
        }
        if !self.app_dir.starts_with('/') {
            return invalid(format!("app_dir must be absolute: {}", self.app_dir));
        }
        if self.entry_file.contains('/') {
            return invalid(format!(
                "entry_file must be a file name inside app_dir: {}",
                self.entry_file
            ));
        }
        for (key, value) in &self.environment {
            if !is_env_name(key) {
                return invalid(format!("invalid environment variable name: {key:?}"));
            }
            if value.chars().any(char::is_control) {
                return invalid(format!(
                    "environment variable {key} contains control characters"
                ));
            }
        }
        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_env_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::settings::LoggingConfig;
use crate::config::types::ServiceConfig;
use crate::config::validator;

/// Read, expand, parse and validate a YAML config file.
pub fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;

    let expanded = expand_env_vars(&content)?;
    parse_config(&expanded)
}

pub fn parse_config(content: &str) -> Result<ServiceConfig> {
    let mut service_config: ServiceConfig = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse config error: {}", e))?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::default());
    }

    debug!("validating config ...");
    validator::validate_config(&service_config).map_err(|errors| {
        for e in &errors {
            error!("config: {}", e);
        }
        anyhow!("invalid config: {}", errors.join("; "))
    })?;

    Ok(service_config)
}

/// Entry point used by the binary.
pub fn load_config(config_path: &str) -> Result<ServiceConfig> {
    file_to_config(Path::new(config_path)).map_err(|e| anyhow!("Invalid config format: {:#}", e))
}

/// Replace `${VAR}` and `${VAR:default}` with the environment value or the default.
pub fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}

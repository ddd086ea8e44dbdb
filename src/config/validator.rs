//! Configuration validation with aggregated errors.

use tracing::info;

use crate::adapter::AdapterKind;
use crate::config::settings::SettingsConfig;
use crate::config::types::{CacheConfig, ServiceConfig, StorageConfig};

/// Returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_cache(&cfg.cache, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(logging) = &settings.logging {
        match logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => errors.push(format!(
                "settings.logging.level '{}' must be one of trace, debug, info, warn, error",
                other
            )),
        }
    }
}

fn validate_cache(cache: &CacheConfig, errors: &mut Vec<String>) {
    if cache.client_id.trim().is_empty() {
        errors.push("cache.client_id cannot be empty".to_string());
    }

    match &cache.storage {
        StorageConfig::Memory => {
            if cache.adapter == AdapterKind::Structured {
                info!("cache.storage is in-memory; cached tokens are lost on exit");
            }
        }
        StorageConfig::File { path } => {
            if cache.adapter == AdapterKind::Legacy {
                errors.push(
                    "cache.storage must be memory for the legacy adapter, it keeps tokens in process only"
                        .to_string(),
                );
            }
            if path.as_os_str().is_empty() {
                errors.push("cache.storage.path cannot be empty for file storage".to_string());
            } else if path.is_dir() {
                errors.push(format!(
                    "cache.storage.path '{}' is a directory",
                    path.display()
                ));
            }
        }
    }
}

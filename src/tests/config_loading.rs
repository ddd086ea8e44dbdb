#[cfg(test)]
mod test {
    use std::fs;
    use std::path::PathBuf;

    use serial_test::serial;
    use tempfile::tempdir;

    use crate::adapter::AdapterKind;
    use crate::config::loader::{expand_env_vars, file_to_config, parse_config};
    use crate::config::settings::{LogFormat, LoggingConfig};
    use crate::config::types::StorageConfig;
    use crate::utils::logging::{effective_config, LogLevel};

    const FULL: &str = r#"
settings:
  logging:
    level: debug
    format: compact
cache:
  client_id: my-client
  adapter: structured
  storage:
    type: file
    path: /var/lib/oidc/cache.json
"#;

    #[test]
    fn parses_full_config() {
        let config = parse_config(FULL).unwrap();
        assert_eq!(config.cache.client_id, "my-client");
        assert_eq!(config.cache.adapter, AdapterKind::Structured);
        assert_eq!(
            config.cache.storage,
            StorageConfig::File {
                path: PathBuf::from("/var/lib/oidc/cache.json")
            }
        );
        assert_eq!(
            config.settings.logging,
            Some(LoggingConfig::new("debug", LogFormat::Compact))
        );
    }

    #[test]
    #[serial]
    fn defaults_apply_for_minimal_config() {
        std::env::set_var("LOG_FORMAT", "text");
        let config = parse_config("cache:\n  client_id: c\n").unwrap();
        std::env::remove_var("LOG_FORMAT");

        assert_eq!(config.cache.adapter, AdapterKind::Structured);
        assert_eq!(config.cache.storage, StorageConfig::Memory);
        assert_eq!(config.settings.logging, Some(LoggingConfig::new("info", LogFormat::Compact)));
    }

    #[test]
    fn validation_errors_are_aggregated() {
        let err = parse_config(
            "settings:\n  logging:\n    level: loud\n    format: json\ncache:\n  client_id: ' '\n",
        )
        .unwrap_err()
        .to_string();
        assert!(err.contains("cache.client_id cannot be empty"));
        assert!(err.contains("settings.logging.level 'loud'"));
    }

    #[test]
    fn legacy_adapter_requires_memory_storage() {
        let err = parse_config(
            "cache:\n  client_id: c\n  adapter: legacy\n  storage:\n    type: file\n    path: /tmp/cache.json\n",
        )
        .unwrap_err()
        .to_string();
        assert!(err.contains("cache.storage must be memory for the legacy adapter"));

        let config = parse_config("cache:\n  client_id: c\n  adapter: legacy\n").unwrap();
        assert_eq!(config.cache.adapter, AdapterKind::Legacy);
        assert_eq!(config.cache.storage, StorageConfig::Memory);
    }

    #[test]
    fn unknown_adapter_is_rejected() {
        assert!(parse_config("cache:\n  client_id: c\n  adapter: v3\n").is_err());
    }

    #[test]
    #[serial]
    fn env_vars_are_expanded_with_defaults() {
        std::env::set_var("OIDC_CACHE_CLIENT", "from-env");
        std::env::remove_var("OIDC_CACHE_UNSET");
        let expanded = expand_env_vars("a: ${OIDC_CACHE_CLIENT}\nb: ${OIDC_CACHE_UNSET:fallback}\n").unwrap();
        std::env::remove_var("OIDC_CACHE_CLIENT");

        assert_eq!(expanded, "a: from-env\nb: fallback\n");
    }

    #[test]
    #[serial]
    fn loads_config_file_with_expansion() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "cache:\n  client_id: ${OIDC_CACHE_TEST_CLIENT:default-client}\n  storage:\n    type: memory\n",
        )
        .unwrap();

        std::env::remove_var("OIDC_CACHE_TEST_CLIENT");
        let config = file_to_config(&path).unwrap();
        assert_eq!(config.cache.client_id, "default-client");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(file_to_config(&dir.path().join("nope.yaml")).is_err());
    }

    #[test]
    fn cli_level_overrides_configured_level() {
        let config = parse_config(FULL).unwrap();
        let logging = effective_config(&config, Some(LogLevel::WARN));
        assert_eq!(logging, LoggingConfig::new("WARN", LogFormat::Compact));
        assert_eq!(effective_config(&config, None).level, "debug");
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::adapter::factory::{create_bound_adapter, create_token_cache, create_token_cache_adapter};
    use crate::adapter::structured::{StructuredTokenCache, StructuredTokenCacheAdapter};
    use crate::adapter::{AdapterError, AdapterKind, TokenCacheAdapter, TokenCacheHandle};
    use crate::cache::account::Account;
    use crate::config::types::{CacheConfig, StorageConfig};
    use crate::storage::manager::StorageManager;
    use crate::storage::memory::InMemoryStorageWorker;
    use crate::tests::common::*;

    fn storage_manager() -> Arc<StorageManager> {
        Arc::new(StorageManager::new(Arc::new(InMemoryStorageWorker::new())))
    }

    #[test]
    fn adapters_reject_a_cache_of_the_other_kind() {
        for kind in [AdapterKind::Structured, AdapterKind::Legacy] {
            let adapter = create_token_cache_adapter(kind, CLIENT_ID, storage_manager());
            let other = match kind {
                AdapterKind::Structured => AdapterKind::Legacy,
                AdapterKind::Legacy => AdapterKind::Structured,
            };

            let err = adapter.set_token_cache(Some(create_token_cache(other))).unwrap_err();
            assert_eq!(err, AdapterError::IncompatibleCache { adapter: kind, cache: other });
            assert!(!adapter.is_bound());

            adapter.set_token_cache(Some(create_token_cache(kind))).unwrap();
            assert!(adapter.is_bound());
            assert_eq!(adapter.token_cache().map(|c| c.kind()), Some(kind));
        }
    }

    #[test]
    fn failed_rebind_keeps_the_current_binding() {
        let adapter = create_token_cache_adapter(AdapterKind::Structured, CLIENT_ID, storage_manager());
        adapter.set_token_cache(Some(create_token_cache(AdapterKind::Structured))).unwrap();

        assert!(adapter.set_token_cache(Some(create_token_cache(AdapterKind::Legacy))).is_err());
        assert_eq!(adapter.token_cache().map(|c| c.kind()), Some(AdapterKind::Structured));
    }

    #[test]
    fn unbound_adapters_return_nothing() {
        for kind in [AdapterKind::Structured, AdapterKind::Legacy] {
            let adapter = create_token_cache_adapter(kind, CLIENT_ID, storage_manager());
            let params = auth_params(HOME_ACCOUNT_ID, &["scope1"]);

            assert!(adapter.save_token_response(&params, &token_response(&["scope1"])).is_none());
            assert!(adapter.try_read_cache(&params).is_none());
            assert!(adapter.get_accounts("").is_empty());
            adapter.delete_cached_refresh_token(&params);

            let status = adapter.remove_account(&Account::default());
            assert!(!status.is_success());
            assert_eq!(status.failure().map(|f| f.code), Some(-1));
        }
    }

    #[test]
    fn unbinding_stops_serving_from_the_cache() {
        let adapter = create_token_cache_adapter(AdapterKind::Structured, CLIENT_ID, storage_manager());
        adapter.set_token_cache(Some(create_token_cache(AdapterKind::Structured))).unwrap();
        let params = auth_params(HOME_ACCOUNT_ID, &["scope1"]);
        adapter.save_token_response(&params, &token_response(&["scope1"]));
        assert!(adapter.try_read_cache(&params).is_some());

        adapter.set_token_cache(None).unwrap();
        assert!(adapter.try_read_cache(&params).is_none());
    }

    #[test]
    fn structured_adapter_lists_and_removes_accounts() {
        let adapter = create_bound_adapter(&CacheConfig {
            client_id: CLIENT_ID.to_owned(),
            adapter: AdapterKind::Structured,
            storage: StorageConfig::Memory,
        })
        .unwrap();
        let params = auth_params(HOME_ACCOUNT_ID, &["scope1"]);
        let account = adapter
            .save_token_response(&params, &token_response(&["scope1"]))
            .unwrap();

        assert_eq!(adapter.get_accounts(ENVIRONMENT), vec![account.clone()]);
        assert!(adapter.get_accounts("login.other.com").is_empty());

        assert!(adapter.remove_account(&account).is_success());
        assert!(adapter.get_accounts("").is_empty());
    }

    #[test]
    fn structured_cache_exports_through_its_storage_manager() {
        let cache = Arc::new(StructuredTokenCache::new());
        assert!(!cache.serialize().is_success());

        let adapter = StructuredTokenCacheAdapter::new(storage_manager());
        adapter
            .set_token_cache(Some(TokenCacheHandle::Structured(cache.clone())))
            .unwrap();
        let params = auth_params(HOME_ACCOUNT_ID, &["scope1"]);
        adapter.save_token_response(&params, &token_response(&["scope1"]));

        let bytes = cache.serialize().into_value().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("the_secret"));
    }
}

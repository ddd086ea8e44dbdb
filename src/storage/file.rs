use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::account::Account;
use crate::cache::app_metadata::AppMetadata;
use crate::cache::credential::{Credential, CredentialKey, CredentialType};
use crate::storage::error::StorageResult;
use crate::storage::snapshot::CacheSnapshot;
use crate::storage::worker::StorageWorker;

/// Worker persisting the whole store as one JSON document.
///
/// Every mutation is read-modify-write under an in-process mutex and lands via
/// tmp file + rename. Cross-process writers are not serialized.
#[derive(Debug)]
pub struct FileStorageWorker {
    path: PathBuf,
    io_lock: Mutex<()>,
}

impl FileStorageWorker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StorageResult<CacheSnapshot> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(CacheSnapshot::from_bytes(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("cache file {} not found, starting empty", self.path.display());
                Ok(CacheSnapshot::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, snapshot: &CacheSnapshot) -> StorageResult<()> {
        write_atomic(&self.path, &snapshot.to_bytes()?)
    }

    fn read_with<T>(&self, f: impl FnOnce(&CacheSnapshot) -> T) -> StorageResult<T> {
        let _guard = self.io_lock.lock();
        Ok(f(&self.load()?))
    }

    fn update_with(&self, f: impl FnOnce(&mut CacheSnapshot)) -> StorageResult<()> {
        let _guard = self.io_lock.lock();
        let mut snapshot = self.load()?;
        f(&mut snapshot);
        self.store(&snapshot)
    }
}

/// `<file name>.<pid>.tmp` next to the target, unique per target and process.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

/// tmp -> chmod 600 -> rename
fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, bytes)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

impl StorageWorker for FileStorageWorker {
    fn read_credentials(
        &self,
        key: &CredentialKey,
        types: &HashSet<CredentialType>,
    ) -> StorageResult<Vec<Credential>> {
        self.read_with(|s| s.find_credentials(key, types))
    }

    fn write_credentials(&self, credentials: &[Credential]) -> StorageResult<()> {
        self.update_with(|s| s.upsert_credentials(credentials))
    }

    fn delete_credentials(
        &self,
        key: &CredentialKey,
        types: &HashSet<CredentialType>,
    ) -> StorageResult<()> {
        self.update_with(|s| s.remove_credentials(key, types))
    }

    fn read_account(
        &self,
        home_account_id: &str,
        environment: &str,
        realm: &str,
    ) -> StorageResult<Option<Account>> {
        self.read_with(|s| s.find_account(home_account_id, environment, realm))
    }

    fn write_account(&self, account: &Account) -> StorageResult<()> {
        self.update_with(|s| s.upsert_account(account))
    }

    fn delete_account(&self, home_account_id: &str, environment: &str, realm: &str) -> StorageResult<()> {
        self.update_with(|s| s.remove_account(home_account_id, environment, realm))
    }

    fn delete_accounts(&self, home_account_id: &str, environment: &str) -> StorageResult<()> {
        self.update_with(|s| s.remove_accounts(home_account_id, environment))
    }

    fn read_all_accounts(&self) -> StorageResult<Vec<Account>> {
        self.read_with(|s| s.accounts.clone())
    }

    fn read_app_metadata(&self, environment: &str, client_id: &str) -> StorageResult<Option<AppMetadata>> {
        self.read_with(|s| s.find_app_metadata(environment, client_id))
    }

    fn write_app_metadata(&self, app_metadata: &AppMetadata) -> StorageResult<()> {
        self.update_with(|s| s.upsert_app_metadata(app_metadata))
    }

    fn serialize(&self) -> StorageResult<Vec<u8>> {
        let snapshot = self.read_with(CacheSnapshot::clone)?;
        Ok(snapshot.to_bytes()?)
    }

    fn deserialize(&self, bytes: &[u8]) -> StorageResult<()> {
        // validate before replacing the file
        let snapshot = CacheSnapshot::from_bytes(bytes)?;
        let _guard = self.io_lock.lock();
        self.store(&snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_name_keeps_the_full_file_name() {
        let json = tmp_path(Path::new("/var/cache/cache.json"));
        let yaml = tmp_path(Path::new("/var/cache/cache.yaml"));
        assert_ne!(json, yaml);
        assert_eq!(
            json,
            PathBuf::from(format!("/var/cache/cache.json.{}.tmp", std::process::id()))
        );
    }
}

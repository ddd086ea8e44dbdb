use tracing::error;

use crate::cache::account::Account;
use crate::cache::app_metadata::AppMetadata;
use crate::cache::credential::Credential;
use crate::storage::error::{StorageError, StorageResult};
use crate::utils::constants::STORAGE_FAILURE_CODE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusType {
    Success,
    Failure,
}

/// Diagnostics attached to a failed storage operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFailure {
    pub code: i32,
    pub description: String,
}

impl From<StorageError> for StatusFailure {
    fn from(err: StorageError) -> Self {
        Self {
            code: STORAGE_FAILURE_CODE,
            description: err.to_string(),
        }
    }
}

/// Outcome of every Storage Manager operation. Faults never travel further up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus<T = ()> {
    Success(T),
    Failure(StatusFailure),
}

pub type ReadCredentialsResponse = OperationStatus<Vec<Credential>>;
pub type ReadAccountResponse = OperationStatus<Option<Account>>;
pub type ReadAccountsResponse = OperationStatus<Vec<Account>>;
pub type ReadAppMetadataResponse = OperationStatus<Option<AppMetadata>>;

impl<T> OperationStatus<T> {
    /// Convert a worker result, logging the fault once here.
    pub fn from_storage(operation: &str, result: StorageResult<T>) -> Self {
        match result {
            Ok(value) => OperationStatus::Success(value),
            Err(err) => {
                error!(operation, "storage operation failed: {}", err);
                OperationStatus::Failure(err.into())
            }
        }
    }

    pub fn status_type(&self) -> StatusType {
        match self {
            OperationStatus::Success(_) => StatusType::Success,
            OperationStatus::Failure(_) => StatusType::Failure,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_type() == StatusType::Success
    }

    pub fn failure(&self) -> Option<&StatusFailure> {
        match self {
            OperationStatus::Success(_) => None,
            OperationStatus::Failure(failure) => Some(failure),
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            OperationStatus::Success(value) => Some(value),
            OperationStatus::Failure(_) => None,
        }
    }
}

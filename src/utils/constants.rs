//! Shared constants and invariants

/// An access token must outlive `now` by more than this many seconds to be served.
pub const ACCESS_TOKEN_EXPIRY_BUFFER_SECS: i64 = 300;

/// Status code carried by every storage failure.
pub const STORAGE_FAILURE_CODE: i32 = -1;

/// Authority path segment identifying an ADFS authority.
pub const ADFS_PATH_SEGMENT: &str = "adfs";

pub const DEFAULT_CONFIG_PATH: &str = "oidc-token-cache.yaml";

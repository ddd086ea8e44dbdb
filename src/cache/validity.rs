use crate::cache::credential::Credential;
use crate::helpers::time::now_i64;
use crate::utils::constants::ACCESS_TOKEN_EXPIRY_BUFFER_SECS;

/// Access token validity against the current clock.
pub fn is_access_token_valid(access_token: &Credential) -> bool {
    is_access_token_valid_at(access_token, now_i64())
}

/// An access token is usable iff it expires strictly after `now + 300` and was
/// not cached in the future.
pub fn is_access_token_valid_at(access_token: &Credential, now: i64) -> bool {
    if access_token.expires_on <= now.saturating_add(ACCESS_TOKEN_EXPIRY_BUFFER_SECS) {
        return false;
    }

    // living in the future
    access_token.cached_at <= now
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::credential::CredentialKey;

    const NOW: i64 = 1_700_000_000;

    fn at(cached_at: i64, expires_on: i64) -> Credential {
        let key = CredentialKey::new("h", "env", "realm", "client", "scope");
        Credential::access_token(key, "secret", cached_at, expires_on, expires_on)
    }

    #[test]
    fn buffer_boundary_is_strict() {
        assert!(!is_access_token_valid_at(&at(NOW, NOW + 300), NOW));
        assert!(is_access_token_valid_at(&at(NOW, NOW + 301), NOW));
        assert!(!is_access_token_valid_at(&at(NOW, NOW + 299), NOW));
    }

    #[test]
    fn expired_token_is_invalid() {
        assert!(!is_access_token_valid_at(&at(NOW - 7200, NOW - 3600), NOW));
    }

    #[test]
    fn future_cache_timestamp_is_invalid() {
        assert!(!is_access_token_valid_at(&at(NOW + 1, NOW + 3600), NOW));
        assert!(is_access_token_valid_at(&at(NOW, NOW + 3600), NOW));
    }

    #[test]
    fn wall_clock_variant_accepts_fresh_token() {
        let now = now_i64();
        assert!(is_access_token_valid(&at(now, now + 3600)));
    }
}

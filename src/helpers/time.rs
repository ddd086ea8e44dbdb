use chrono::Utc;

/// Seconds since the unix epoch, the single clock every cache timestamp uses.
pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

/// Absolute expiry for a relative `expires_in` reported by a token endpoint.
pub fn expires_on_from(now: i64, expires_in: i64) -> i64 {
    now.saturating_add(expires_in.max(0))
}

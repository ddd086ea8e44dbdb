/// Join scopes with a single space, keeping the caller's order.
pub fn join_scopes<S: AsRef<str>>(scopes: &[S]) -> String {
    scopes
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a space separated scope string, dropping empty pieces.
pub fn split_scopes(scope: &str) -> Vec<String> {
    scope.split_whitespace().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_preserves_order() {
        assert_eq!(join_scopes(&["user.read", "openid", "mail.send"]), "user.read openid mail.send");
        assert_eq!(join_scopes::<&str>(&[]), "");
    }

    #[test]
    fn split_ignores_extra_whitespace() {
        assert_eq!(split_scopes("  a   b "), vec!["a".to_string(), "b".to_string()]);
    }
}

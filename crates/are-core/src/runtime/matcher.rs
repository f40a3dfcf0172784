//! Wildcard pattern matching for runtime queries.

/// Whether a claim field matches a query field.
///
/// Honored forms, in order: the bare wildcard `*`, a literal match, a
/// `prefix/*` segment wildcard (the query must continue with `/` after
/// the prefix), and a `prefix*` bare-prefix wildcard. No other wildcard
/// syntax is recognized.
#[must_use]
pub(crate) fn matches(pattern: &str, value: &str) -> bool {
    if pattern == "*" || pattern == value {
        return true;
    }

    if let Some(prefix) = pattern.strip_suffix("/*") {
        if value
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
        {
            return true;
        }
    } else if let Some(prefix) = pattern.strip_suffix('*') {
        if value.starts_with(prefix) {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_wildcard_matches_anything() {
        assert!(matches("*", "anything"));
        assert!(matches("*", ""));
    }

    #[test]
    fn literal_match() {
        assert!(matches("read", "read"));
        assert!(!matches("read", "write"));
    }

    #[test]
    fn segment_wildcard_requires_separator() {
        assert!(matches("/code/*", "/code/main.rs"));
        assert!(matches("/code/*", "/code/sub/deep.rs"));
        assert!(!matches("/code/*", "/codex"));
        assert!(!matches("/code/*", "/code"));
    }

    #[test]
    fn bare_prefix_wildcard() {
        assert!(matches("/code*", "/codex"));
        assert!(matches("/code*", "/code"));
        assert!(!matches("/code*", "/src/code"));
    }

    #[test]
    fn infix_wildcards_are_not_honored() {
        assert!(!matches("/a/*/b", "/a/x/b"));
        assert!(!matches("*suffix", "has-suffix"));
    }
}

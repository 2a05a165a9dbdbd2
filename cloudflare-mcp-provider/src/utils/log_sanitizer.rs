//! Log and message sanitization utilities
//!
//! Keeps the API token, record content and attacker-supplied identifiers
//! from being fully exposed in logs or in errors returned to the caller.

/// Maximum number of bytes to include in truncated log output.
const TRUNCATE_LIMIT: usize = 256;

/// Words longer than this are treated as identifiers and shortened.
const MAX_IDENTIFIER_CHARS: usize = 40;

/// Characters kept from a shortened identifier.
const IDENTIFIER_PREFIX_CHARS: usize = 32;

/// Replacement for any occurrence of the secret.
pub const MASK: &str = "***";

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging.
///
/// Returns the original string if it's within the limit,
/// otherwise returns the first `TRUNCATE_LIMIT` bytes with a suffix
/// indicating the total length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Replace every occurrence of `secret` in `message` with [`MASK`].
///
/// An empty secret masks nothing.
pub fn mask_secret(message: &str, secret: &str) -> String {
    if secret.is_empty() {
        message.to_string()
    } else {
        message.replace(secret, MASK)
    }
}

/// Shorten every whitespace-separated word longer than
/// `MAX_IDENTIFIER_CHARS` to a `IDENTIFIER_PREFIX_CHARS` prefix followed by `...`.
///
/// A 32-character zone id passes through untouched.
pub fn truncate_identifiers(message: &str) -> String {
    message
        .split(' ')
        .map(|word| {
            if word.chars().count() > MAX_IDENTIFIER_CHARS {
                let prefix: String = word.chars().take(IDENTIFIER_PREFIX_CHARS).collect();
                format!("{prefix}...")
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_string_unchanged() {
        let s = "hello world";
        assert_eq!(truncate_for_log(s), s);
    }

    #[test]
    fn exactly_at_limit() {
        let s = "a".repeat(TRUNCATE_LIMIT);
        assert_eq!(truncate_for_log(&s), s);
    }

    #[test]
    fn over_limit_truncated() {
        let s = "a".repeat(TRUNCATE_LIMIT + 100);
        let result = truncate_for_log(&s);
        assert!(result.contains("... [truncated, total"));
        assert!(result.contains(&format!("{} bytes]", TRUNCATE_LIMIT + 100)));
        assert!(result.len() < s.len());
    }

    #[test]
    fn multibyte_chars_safe() {
        let s = "你".repeat(200);
        let result = truncate_for_log(&s);
        assert!(result.contains("... [truncated, total"));
    }

    #[test]
    fn secret_is_masked_everywhere() {
        let masked = mask_secret(
            "Invalid token: secret_token_12345 (secret_token_12345)",
            "secret_token_12345",
        );
        assert!(!masked.contains("secret_token_12345"));
        assert_eq!(masked, "Invalid token: *** (***)");
    }

    #[test]
    fn empty_secret_masks_nothing() {
        assert_eq!(mask_secret("nothing here", ""), "nothing here");
    }

    #[test]
    fn long_identifier_is_truncated() {
        let long_id = "a".repeat(100);
        let message = truncate_identifiers(&format!("Zone not found: {long_id}"));
        assert!(!message.contains(&long_id));
        assert!(message.contains("..."));
        assert!(message.starts_with("Zone not found: "));
    }

    #[test]
    fn zone_id_survives_truncation() {
        let message = "Zone a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4 not found";
        assert_eq!(truncate_identifiers(message), message);
    }
}

//! Cache key derivation for translated sentences.

use sha2::{Digest, Sha256};

/// Computes the cache key for one sentence and language pair.
///
/// The key is the hex-encoded SHA-256 digest of the canonical JSON encoding
/// of the sentence text, its disambiguating context, and the language pair.
/// serde_json serializes object keys in sorted order, so the encoding and
/// the key derived from it are stable across process restarts and catalogs.
///
/// The context is folded in so that two entries with identical text but
/// different contexts never share a cache slot; an absent context encodes
/// as JSON `null`, which no string context can collide with.
///
/// This is a total function: any input, including the empty string, yields
/// a key.
pub fn fingerprint(text: &str, context: Option<&str>, from: &str, to: &str) -> String {
    let input = serde_json::json!({
        "text": text,
        "context": context,
        "from": from,
        "to": to,
    });

    let mut hasher = Sha256::new();
    hasher.update(input.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = fingerprint("Hello", None, "en", "cs");
        let b = fingerprint("Hello", None, "en", "cs");
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let key = fingerprint("Hello", None, "en", "cs");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_varies_with_every_input() {
        let base = fingerprint("Hello", None, "en", "cs");

        assert_ne!(base, fingerprint("Hello!", None, "en", "cs"));
        assert_ne!(base, fingerprint("Hello", Some("menu"), "en", "cs"));
        assert_ne!(base, fingerprint("Hello", None, "de", "cs"));
        assert_ne!(base, fingerprint("Hello", None, "en", "sk"));
    }

    #[test]
    fn test_fingerprint_context_disambiguates() {
        let menu = fingerprint("Open", Some("menu"), "en", "cs");
        let door = fingerprint("Open", Some("door state"), "en", "cs");
        assert_ne!(menu, door);
    }

    #[test]
    fn test_fingerprint_absent_context_differs_from_empty() {
        let absent = fingerprint("Open", None, "en", "cs");
        let empty = fingerprint("Open", Some(""), "en", "cs");
        assert_ne!(absent, empty);
    }

    #[test]
    fn test_fingerprint_accepts_empty_text() {
        let key = fingerprint("", None, "en", "cs");
        assert_eq!(key.len(), 64);
    }

    #[test]
    fn test_fingerprint_field_boundaries_are_unambiguous() {
        // Concatenation-style keys would collide here; the JSON encoding
        // must not.
        let a = fingerprint("ab", None, "c", "d");
        let b = fingerprint("a", None, "bc", "d");
        assert_ne!(a, b);
    }
}

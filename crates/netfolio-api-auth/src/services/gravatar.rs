//! Gravatar avatar derivation.

use md5::{Digest, Md5};

/// Derive the default avatar URL for an email address.
///
/// The address is trimmed and lowercased before hashing, so the URL is
/// stable across case and whitespace variations of the same address.
/// Query parameters: 200px, PG-rated, "mystery man" fallback image.
#[must_use]
pub fn gravatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let digest = Md5::digest(normalized.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("https://www.gravatar.com/avatar/{hex}?s=200&r=pg&d=mm")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_hash() {
        // md5("ada@example.com")
        assert_eq!(
            gravatar_url("ada@example.com"),
            "https://www.gravatar.com/avatar/3e3417d7ef77d5932a6734b916515ed5?s=200&r=pg&d=mm"
        );
    }

    #[test]
    fn normalization_is_case_and_whitespace_insensitive() {
        let canonical = gravatar_url("ada@example.com");
        assert_eq!(gravatar_url("  Ada@Example.COM  "), canonical);
    }

    #[test]
    fn url_carries_size_rating_and_default() {
        let url = gravatar_url("someone@example.com");
        assert!(url.contains("s=200"));
        assert!(url.contains("r=pg"));
        assert!(url.contains("d=mm"));
    }
}

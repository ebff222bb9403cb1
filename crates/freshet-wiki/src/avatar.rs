//! Avatar URLs for contributors.

use sha2::{Digest, Sha256};

/// Size of the avatars in the contributor bar, in pixels.
pub const CONTRIBUTOR_AVATAR_SIZE: u32 = 34;

const AVATAR_BASE: &str = "https://secure.gravatar.com/avatar";

/// Returns the Gravatar URL for `email` at `size` pixels.
///
/// The address is trimmed and lowercased before hashing. Unknown addresses
/// fall back to the generic silhouette.
///
/// # Examples
///
/// ```
/// use freshet_wiki::avatar::avatar_url;
///
/// let url = avatar_url(" Kuma@Example.com ", 34);
/// assert!(url.starts_with("https://secure.gravatar.com/avatar/"));
/// assert!(url.ends_with("?s=34&d=mm"));
/// ```
pub fn avatar_url(email: &str, size: u32) -> String {
    let normalized = email.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    format!("{}/{}?s={}&d=mm", AVATAR_BASE, hex::encode(digest), size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_url_is_normalized() {
        assert_eq!(
            avatar_url("kuma@example.com", 34),
            avatar_url("  KUMA@example.COM\n", 34)
        );
    }

    #[test]
    fn test_avatar_url_format() {
        let url = avatar_url("kuma@example.com", CONTRIBUTOR_AVATAR_SIZE);
        let hash = url
            .strip_prefix("https://secure.gravatar.com/avatar/")
            .and_then(|rest| rest.strip_suffix("?s=34&d=mm"))
            .unwrap();

        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_distinct_emails_distinct_urls() {
        assert_ne!(avatar_url("a@example.com", 34), avatar_url("b@example.com", 34));
    }
}

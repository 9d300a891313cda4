//! Media URL signing.

use chrono::Utc;
use sha2::{Digest, Sha256};

/// Object storage holding cover images and audio files.
pub trait BlobStore: Send + Sync {
    /// Time-limited URL for a stored object, `None` when the reference does
    /// not point into this store.
    fn signed_url(&self, reference: &str) -> Option<String>;
}

// == Signing Blob Store ==
/// Signs object keys with a shared secret: `{base}/{key}?expires=..&signature=..`.
#[derive(Debug, Clone)]
pub struct SigningBlobStore {
    base_url: String,
    secret: String,
    ttl_secs: u64,
}

impl SigningBlobStore {
    pub fn new(base_url: &str, secret: &str, ttl_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            secret: secret.to_string(),
            ttl_secs,
        }
    }

    /// Object key for a stored reference: either a bare key or a full URL
    /// under the base URL.
    fn object_key<'a>(&self, reference: &'a str) -> Option<&'a str> {
        let reference = reference.trim();
        let key = match reference.strip_prefix(self.base_url.as_str()) {
            Some(rest) => rest,
            None if reference.contains("://") || reference.starts_with("data:") => return None,
            None => reference,
        };
        let key = key.trim_start_matches('/');
        (!key.is_empty()).then_some(key)
    }

    fn signature(&self, key: &str, expires: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b"\n");
        hasher.update(key.as_bytes());
        hasher.update(b"\n");
        hasher.update(expires.to_string().as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    /// Checks a signature produced by this store and that it has not expired.
    pub fn verify(&self, key: &str, expires: i64, signature: &str) -> bool {
        expires >= Utc::now().timestamp() && self.signature(key, expires) == signature
    }
}

impl BlobStore for SigningBlobStore {
    fn signed_url(&self, reference: &str) -> Option<String> {
        let key = self.object_key(reference)?;
        let expires = Utc::now().timestamp() + self.ttl_secs as i64;
        Some(format!(
            "{}/{}?expires={}&signature={}",
            self.base_url,
            key,
            expires,
            self.signature(key, expires)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SigningBlobStore {
        SigningBlobStore::new("https://media.local/", "secret", 600)
    }

    fn split(url: &str) -> (String, i64, String) {
        let (path, query) = url.split_once('?').unwrap();
        let key = path.strip_prefix("https://media.local/").unwrap().to_string();
        let mut expires = 0;
        let mut signature = String::new();
        for pair in query.split('&') {
            match pair.split_once('=').unwrap() {
                ("expires", v) => expires = v.parse().unwrap(),
                ("signature", v) => signature = v.to_string(),
                _ => {}
            }
        }
        (key, expires, signature)
    }

    #[test]
    fn test_bare_key_is_signed() {
        let store = store();
        let url = store.signed_url("covers/blue-train.jpg").unwrap();
        let (key, expires, signature) = split(&url);

        assert_eq!(key, "covers/blue-train.jpg");
        assert_eq!(signature.len(), 64);
        assert!(store.verify(&key, expires, &signature));
        assert!(!store.verify("covers/other.jpg", expires, &signature));
    }

    #[test]
    fn test_url_under_base_is_signed_by_key() {
        let url = store()
            .signed_url("https://media.local/audio/track.mp3")
            .unwrap();
        assert!(url.starts_with("https://media.local/audio/track.mp3?expires="));
    }

    #[test]
    fn test_foreign_and_empty_references_are_not_signed() {
        let store = store();
        assert_eq!(store.signed_url("https://elsewhere.example/a.jpg"), None);
        assert_eq!(store.signed_url("data:image/svg+xml;base64,AAAA"), None);
        assert_eq!(store.signed_url(""), None);
        assert_eq!(store.signed_url("https://media.local/"), None);
    }

    #[test]
    fn test_expired_signature_fails_verification() {
        let store = store();
        let expired = Utc::now().timestamp() - 1;
        let signature = store.signature("k", expired);
        assert!(!store.verify("k", expired, &signature));
    }
}

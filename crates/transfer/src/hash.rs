use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Computes SHA-256 of `data` and returns the hex-encoded digest.
///
/// Used as the transfer id and as the post-reconstruction integrity check.
pub fn content_id(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Returns `true` if `data` hashes to `id`.
///
/// The digest is chosen by the id's length: 40 hex chars is a SHA-1 id as
/// minted by older JavaScript peers, anything else is checked as SHA-256.
pub fn verify_content(data: &[u8], id: &str) -> bool {
    let digest = if id.len() == 40 {
        hex::encode(Sha1::digest(data))
    } else {
        content_id(data)
    };
    digest.eq_ignore_ascii_case(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_id_deterministic() {
        let c1 = content_id(b"hello world");
        let c2 = content_id(b"hello world");
        assert_eq!(c1, c2);
        assert_eq!(c1.len(), 64); // SHA-256 = 64 hex chars.
    }

    #[test]
    fn content_id_known_vectors() {
        assert_eq!(
            content_id(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            content_id(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn content_id_different_data() {
        assert_ne!(content_id(b"hello"), content_id(b"world"));
    }

    #[test]
    fn verify_content_ignores_hex_case() {
        let id = content_id(b"abc").to_uppercase();
        assert!(verify_content(b"abc", &id));
        assert!(!verify_content(b"abd", &id));
    }

    #[test]
    fn verify_content_accepts_sha1_ids() {
        let id = "a9993e364706816aba3e25717850c26c9cd0d89d";
        assert!(verify_content(b"abc", id));
        assert!(verify_content(b"abc", &id.to_uppercase()));
        assert!(!verify_content(b"abd", id));
    }

    #[test]
    fn verify_content_rejects_other_lengths() {
        assert!(!verify_content(b"abc", ""));
        assert!(!verify_content(b"abc", "ba7816bf"));
    }
}

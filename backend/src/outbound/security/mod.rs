//! Password hashing adapter.
//!
//! Hashes are stored as `sha256$<salt-hex>$<digest-hex>` where the digest is
//! SHA-256 over the salt followed by the password bytes.

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

/// Salted SHA-256 implementation of [`PasswordHasher`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256PasswordHasher;

fn digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0_u8, |acc, (l, r)| acc | (l ^ r))
        == 0
}

impl PasswordHasher for Sha256PasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        let mut salt = [0_u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|err| PasswordHashError::hashing(err.to_string()))?;
        let encoded = format!(
            "{SCHEME}${}${}",
            hex::encode(salt),
            hex::encode(digest(&salt, password))
        );
        Ok(PasswordHash::new(encoded))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
        let mut parts = hash.as_str().split('$');
        let (Some(SCHEME), Some(salt_hex), Some(digest_hex), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(digest_hex)) else {
            return false;
        };
        constant_time_eq(&digest(&salt, password), &expected)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hash_then_verify() {
        let hasher = Sha256PasswordHasher;
        let hash = hasher.hash("secret1").expect("hashes");
        assert!(hasher.verify("secret1", &hash));
        assert!(!hasher.verify("secret2", &hash));
    }

    #[rstest]
    fn salts_differ_between_hashes() {
        let hasher = Sha256PasswordHasher;
        let first = hasher.hash("secret1").expect("hashes");
        let second = hasher.hash("secret1").expect("hashes");
        assert_ne!(first.as_str(), second.as_str());
    }

    #[rstest]
    #[case("")]
    #[case("plain")]
    #[case("md5$00$00")]
    #[case("sha256$zz$00")]
    #[case("sha256$00$00$extra")]
    fn malformed_hashes_never_match(#[case] encoded: &str) {
        assert!(!Sha256PasswordHasher.verify("secret1", &PasswordHash::new(encoded)));
    }
}

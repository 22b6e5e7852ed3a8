//! Deterministic fingerprints for terms, canonical forms and certificates.
//!
//! Every fingerprint is a domain-separated, length-prefixed SHA-256 digest of a
//! canonical byte encoding. Two values with equal canonical bytes always hash
//! equal across runs and platforms, which is what determinism tests and audit
//! trails compare.
//!
//! # Citations
//! - SHA-256: NIST FIPS 180-4 (2015)
//! - Domain separation & length prefixing: Bernstein et al., "How to hash into elliptic curves" (2009)

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Domain for host terms (v0).
pub const DOMAIN_TERM_V0: &[u8] = b"TERM_V0";

/// Domain for canonical forms (v0).
pub const DOMAIN_NORMAL_EXPR_V0: &[u8] = b"NORMAL_EXPR_V0";

/// Domain for certificate trees (v0).
pub const DOMAIN_CERTIFICATE_V0: &[u8] = b"CERTIFICATE_V0";

/// A 256-bit hash value.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashValue(pub [u8; 32]);

impl HashValue {
    /// Creates a zero hash (all zeros).
    #[inline]
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Returns the raw byte array.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Computes SHA-256 of `data` under `domain`.
    ///
    /// The digest input is `b"MNF:<domain>:v1" || len(data) as u64 LE || data`.
    pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"MNF:");
        hasher.update(domain);
        hasher.update(b":v1");
        hasher.update((data.len() as u64).to_le_bytes());
        hasher.update(data);
        Self(hasher.finalize().into())
    }
}

impl std::fmt::Display for HashValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "HashValue({:02x}{:02x}{:02x}{:02x}…)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

/// Values with a canonical byte encoding.
///
/// Encodings must be injective on the values they distinguish: every variant
/// writes a distinct tag byte and every variable-length field is length
/// prefixed.
pub trait Canonicalizable {
    /// Writes the canonical encoding of `self` into `out`.
    fn write_canonical(&self, out: &mut Vec<u8>);

    /// Returns the canonical encoding as a fresh buffer.
    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64);
        self.write_canonical(&mut out);
        out
    }

    /// Domain-separated hash of the canonical encoding.
    fn fingerprint_in(&self, domain: &[u8]) -> HashValue {
        HashValue::hash_with_domain(domain, &self.to_canonical_bytes())
    }
}

/// Writes a length-prefixed byte string.
pub(crate) fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
    out.extend_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_separation_changes_hash() {
        let a = HashValue::hash_with_domain(DOMAIN_TERM_V0, b"payload");
        let b = HashValue::hash_with_domain(DOMAIN_NORMAL_EXPR_V0, b"payload");
        assert_ne!(a, b);
    }

    #[test]
    fn length_prefix_prevents_concatenation_collisions() {
        let mut left = Vec::new();
        write_bytes(&mut left, b"ab");
        write_bytes(&mut left, b"c");
        let mut right = Vec::new();
        write_bytes(&mut right, b"a");
        write_bytes(&mut right, b"bc");
        assert_ne!(
            HashValue::hash_with_domain(DOMAIN_TERM_V0, &left),
            HashValue::hash_with_domain(DOMAIN_TERM_V0, &right)
        );
    }

    #[test]
    fn display_shows_prefix() {
        let h = HashValue::zero();
        assert_eq!(h.to_string(), "HashValue(00000000…)");
    }
}

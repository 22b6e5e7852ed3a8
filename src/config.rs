//! Normalizer configuration.
//!
//! All switches default to on. Configurations persist as CBOR so a run can be
//! reproduced with exactly the settings that produced a stored certificate.

use serde::{Deserialize, Serialize};

/// Switches controlling one [`Normalizer`](crate::normalize::Normalizer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Build a certificate alongside every result.
    ///
    /// When off, no proof terms are constructed at all.
    pub record_certificates: bool,
    /// Simplify structural parts while composing: drop identities, flatten
    /// composites and cancel adjacent inverse pairs.
    ///
    /// When off, structural parts keep every composite the engine built.
    pub simplify_structural: bool,
    /// Check the composability invariants of every canonical form returned by
    /// `normalize` and panic on violation.
    pub verify_invariants: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            record_certificates: true,
            simplify_structural: true,
            verify_invariants: true,
        }
    }
}

impl NormalizerConfig {
    /// Default configuration without certificate construction.
    pub fn without_certificates() -> Self {
        Self {
            record_certificates: false,
            ..Self::default()
        }
    }

    pub fn with_simplification(mut self, on: bool) -> Self {
        self.simplify_structural = on;
        self
    }

    pub fn with_invariant_checks(mut self, on: bool) -> Self {
        self.verify_invariants = on;
        self
    }

    /// Serializes the configuration to CBOR bytes.
    ///
    /// Returns an error if serialization fails.
    pub fn to_cbor(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let bytes = serde_cbor::to_vec(self)?;
        Ok(bytes)
    }

    /// Deserializes a configuration from CBOR bytes; missing fields take
    /// their defaults.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = serde_cbor::from_slice(bytes)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn defaults_are_all_on() {
        let c = NormalizerConfig::default();
        assert!(c.record_certificates && c.simplify_structural && c.verify_invariants);
        assert!(!NormalizerConfig::without_certificates().record_certificates);
    }

    #[test]
    fn cbor_round_trip_keeps_switches() {
        let c = NormalizerConfig::without_certificates().with_simplification(false);
        let back = NormalizerConfig::from_cbor(&c.to_cbor().unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let mut partial = BTreeMap::new();
        partial.insert("verify_invariants".to_string(), false);
        let bytes = serde_cbor::to_vec(&partial).unwrap();
        let c = NormalizerConfig::from_cbor(&bytes).unwrap();
        assert!(!c.verify_invariants);
        assert!(c.record_certificates);
    }
}

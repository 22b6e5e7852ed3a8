//! monoidal-normal: normal forms for morphisms of monoidal categories, with
//! certificates.
//!
//! This crate decides equality of morphism expressions "up to coherence". It
//! provides:
//! - A term language for objects and morphisms of a monoidal category
//!   ([`term`]), interpreted through a pluggable [`Host`] that supplies
//!   reduction, definitional equality and typing.
//! - A classifier recognizing associators, unitors and coherence morphisms
//!   inside host terms ([`classify`]).
//! - A normalization engine turning any well-typed morphism into a canonical
//!   alternating chain of structural isomorphisms and whiskered atoms
//!   ([`normalize`]).
//! - Equality certificates proving that the input equals the reconstruction of
//!   its canonical form, replayable against the host ([`certificate`]).
//!
//! # Mathematical Foundations
//!
//! By Mac Lane's coherence theorem every diagram built from associators and
//! unitors commutes, so two morphisms are equal modulo the monoidal axioms
//! exactly when they have the same sequence of non-structural parts, each
//! whiskered in the same position. The canonical form exposes that sequence:
//!
//! ```text
//! α₀ ≫ η₁ ≫ α₁ ≫ η₂ ≫ … ≫ ηₙ ≫ αₙ
//! ```
//!
//! where every `αᵢ` is structural and every `ηᵢ` is a left-whiskered tensor of
//! right-whiskered atoms. Tensors of morphisms are expanded by the interchange
//! law, so `f ⊗ g` becomes `(f ▷ Y) ≫ (X' ◁ g)`.
//!
//! # References
//!
//! - Mac Lane, S. "Natural associativity and commutativity" (1963) – coherence
//! - Joyal, A., Street, R. "The geometry of tensor calculus I" (1991) – string diagrams
//! - Selinger, P. "A survey of graphical languages for monoidal categories" (2011)
//! - Delpeuch, A., Vicary, J. "Normalization for planar string diagrams" (2022)
//!
//! # Example
//!
//! ```
//! use monoidal_normal::prelude::*;
//!
//! let mut sig = Signature::new();
//! sig.declare_category("C", true).unwrap();
//! let x = sig.declare_object("X", "C").unwrap();
//! let y = sig.declare_object("Y", "C").unwrap();
//! let f = sig.declare_morphism("f", x.clone(), y).unwrap();
//!
//! // (X ⊗ 𝟙) ◁ f has a single atom, wrapped in unitors and associators.
//! let e = Term::whisker_left(Term::tensor(x, Term::unit("C")), f);
//! let n = Normalizer::new(&sig).normalize(&e).unwrap();
//! assert_eq!(n.to_list().len(), 1);
//! n.verify(&sig).unwrap();
//! ```

pub mod certificate;
pub mod classify;
pub mod config;
pub mod core;
pub mod fingerprint;
pub mod host;
pub mod normal;
pub mod normalize;
pub mod signature;
pub mod structural;
pub mod term;

pub use certificate::{Certificate, CertificateError, Certified, Rule};
pub use config::NormalizerConfig;
pub use host::{Host, MonoidalStructure};
pub use normal::NormalExpr;
pub use normalize::{NormalizeError, Normalized, Normalizer};
pub use term::{Symbol, Term};

/// Prelude for convenient usage.
pub mod prelude {
    pub use crate::certificate::{AuditEntry, Certificate, CertificateError, Certified, Rule};
    pub use crate::classify::Classifier;
    pub use crate::config::NormalizerConfig;
    pub use crate::core::{Atom, Atom1, Mor1};
    pub use crate::fingerprint::{Canonicalizable, HashValue};
    pub use crate::host::{Host, MonoidalStructure};
    pub use crate::normal::{
        InvariantViolation, NormalExpr, TensorHomExpr, WhiskerLeftExpr, WhiskerRightExpr,
    };
    pub use crate::normalize::{NormalizeError, Normalized, Normalizer};
    pub use crate::signature::{Signature, SignatureError};
    pub use crate::structural::{Structural, StructuralAtom};
    pub use crate::term::{Symbol, Term};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    /// Builds a monoidal signature with objects `X`, `Y` and `f : X ⟶ Y`.
    fn setup() -> (Signature, Term, Term, Term) {
        let mut sig = Signature::new();
        sig.declare_category("C", true).unwrap();
        let x = sig.declare_object("X", "C").unwrap();
        let y = sig.declare_object("Y", "C").unwrap();
        let f = sig.declare_morphism("f", x.clone(), y.clone()).unwrap();
        (sig, x, y, f)
    }

    /// Two whiskerings that agree up to coherence share a canonical form.
    #[test]
    fn equal_up_to_coherence() {
        let (sig, x, _, f) = setup();
        let unit = Term::unit("C");
        let a = Term::whisker_left(Term::tensor(x.clone(), unit.clone()), f.clone());
        let b = Term::whisker_left(x, Term::whisker_left(unit, f));
        let normalizer = Normalizer::new(&sig);
        let na = normalizer.normalize(&a).unwrap();
        let nb = normalizer.normalize(&b).unwrap();
        assert_eq!(na.to_list(), nb.to_list());
        na.verify(&sig).unwrap();
        nb.verify(&sig).unwrap();
    }

    /// Different generators never share a canonical form.
    #[test]
    fn distinct_generators_stay_distinct() {
        let (mut sig, x, y, f) = setup();
        let f2 = sig.declare_morphism("f2", x, y).unwrap();
        let normalizer = Normalizer::new(&sig);
        let a = normalizer.normalize(&f).unwrap();
        let b = normalizer.normalize(&f2).unwrap();
        assert_ne!(a.expr, b.expr);
        assert_ne!(a.expr.fingerprint(), b.expr.fingerprint());
    }

    /// Certificates survive a CBOR round trip and still check.
    #[test]
    fn stored_certificate_still_checks() {
        let (sig, x, _, f) = setup();
        let e = Term::tensor(f, Term::id(x));
        let n = Normalizer::new(&sig).normalize(&e).unwrap();
        let cert = n.certificate.as_ref().unwrap();
        let restored = Certificate::from_cbor(&cert.to_cbor().unwrap()).unwrap();
        assert_eq!(&restored, cert);
        restored.check(&sig).unwrap();
    }
}

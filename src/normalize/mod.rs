//! Normalization of morphism terms.
//!
//! [`Normalizer`] is the entry point: it checks once that the input is a
//! morphism of a monoidal category, then runs the evaluation engine and returns
//! the canonical form together with an optional certificate that the input
//! equals the canonical form's reconstruction.
//!
//! Normalization is deterministic: the same host and the same input always
//! produce the same canonical form and the same certificate.
//!
//! # Stack usage
//! Composition chains are merged iteratively. Nesting in the input term, and
//! the tensor depth of whiskering objects, are handled by recursion; callers
//! normalizing very deep terms should run on a thread with a larger stack.

mod eval;

use crate::certificate::{Certificate, CertificateError, Certified};
use crate::classify::Classifier;
use crate::config::NormalizerConfig;
use crate::core::Mor1;
use crate::host::{Host, MonoidalStructure};
use crate::normal::{InvariantViolation, NormalExpr, WhiskerLeftExpr};
use crate::term::{Symbol, Term};
use eval::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Precondition failures reported before any normalization work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// The host cannot infer a domain and codomain for the input.
    NotAMorphism(Term),
    /// The input's category carries no monoidal structure.
    NoAmbientStructure(Symbol),
}

impl std::fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeError::NotAMorphism(t) => write!(f, "not a morphism: {}", t),
            NormalizeError::NoAmbientStructure(c) => {
                write!(f, "category {} has no monoidal structure", c)
            }
        }
    }
}

impl std::error::Error for NormalizeError {}

/// The outcome of normalizing one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalized {
    /// The term that was normalized.
    pub input: Term,
    /// Its canonical form.
    pub expr: NormalExpr,
    /// Proof that `input` equals `expr`'s reconstruction, when recorded.
    pub certificate: Option<Certificate>,
    /// The ambient structure the canonical form lives in.
    pub structure: MonoidalStructure,
}

impl Normalized {
    /// The canonical form as a host term.
    pub fn reconstruct(&self) -> Term {
        self.expr.to_term(&self.structure)
    }

    /// The non-structural parts, left to right.
    pub fn to_list(&self) -> Vec<&WhiskerLeftExpr> {
        self.expr.to_list()
    }

    /// Replays the certificate and checks that it relates the input to the
    /// reconstruction.
    pub fn verify<H: Host>(&self, host: &H) -> Result<(), CertificateError> {
        let cert = self.certificate.as_ref().ok_or(CertificateError::Missing)?;
        let (lhs, rhs) = (cert.lhs(), cert.rhs());
        if lhs != self.input {
            return Err(CertificateError::BrokenChain {
                expected: self.input.clone(),
                found: lhs,
            });
        }
        let reconstructed = self.reconstruct();
        if rhs != reconstructed {
            return Err(CertificateError::BrokenChain {
                expected: reconstructed,
                found: rhs,
            });
        }
        cert.check(host)
    }
}

/// Boundary of a checked input.
struct Ambient {
    structure: MonoidalStructure,
    src: Term,
    tgt: Term,
}

/// Normalizes morphism terms against a [`Host`].
///
/// # Examples
///
/// ```
/// use monoidal_normal::prelude::*;
///
/// let mut sig = Signature::new();
/// sig.declare_category("C", true).unwrap();
/// let x = sig.declare_object("X", "C").unwrap();
/// let y = sig.declare_object("Y", "C").unwrap();
/// let f = sig.declare_morphism("f", x.clone(), y.clone()).unwrap();
///
/// let normalizer = Normalizer::new(&sig);
/// let e = Term::comp(Term::id(x), Term::comp(f, Term::id(y)));
/// let n = normalizer.normalize(&e).unwrap();
/// assert_eq!(n.to_list().len(), 1);
/// assert!(n.verify(&sig).is_ok());
/// ```
pub struct Normalizer<H> {
    host: H,
    config: NormalizerConfig,
}

impl<H: Host> Normalizer<H> {
    /// Creates a normalizer with the default configuration.
    pub fn new(host: H) -> Self {
        Self::with_config(host, NormalizerConfig::default())
    }

    pub fn with_config(host: H, config: NormalizerConfig) -> Self {
        Self { host, config }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Resolves the monoidal structure a morphism lives in.
    pub fn ambient_structure(&self, e: &Term) -> Result<MonoidalStructure, NormalizeError> {
        self.ambient(e).map(|a| a.structure)
    }

    fn ambient(&self, e: &Term) -> Result<Ambient, NormalizeError> {
        let (src, tgt) = self
            .host
            .infer_hom(e)
            .ok_or_else(|| NormalizeError::NotAMorphism(e.clone()))?;
        let category = self
            .host
            .infer_category(&src)
            .ok_or_else(|| NormalizeError::NotAMorphism(e.clone()))?;
        let structure = self
            .host
            .monoidal_structure(&category)
            .ok_or(NormalizeError::NoAmbientStructure(category))?;
        Ok(Ambient {
            structure,
            src,
            tgt,
        })
    }

    /// Computes the canonical form of `e`.
    ///
    /// # Errors
    /// [`NormalizeError`] if `e` is not a morphism of a monoidal category.
    ///
    /// # Panics
    /// If invariant verification is enabled and the engine produced an
    /// ill-formed canonical form.
    pub fn normalize(&self, e: &Term) -> Result<Normalized, NormalizeError> {
        self.run(e, self.config)
    }

    /// The non-structural parts of `e`'s canonical form, left to right.
    ///
    /// Never builds a certificate.
    pub fn atoms(&self, e: &Term) -> Result<Vec<WhiskerLeftExpr>, NormalizeError> {
        let config = NormalizerConfig {
            record_certificates: false,
            ..self.config
        };
        let normalized = self.run(e, config)?;
        Ok(normalized.expr.to_list().into_iter().cloned().collect())
    }

    fn run(&self, e: &Term, config: NormalizerConfig) -> Result<Normalized, NormalizeError> {
        let ambient = self.ambient(e)?;
        debug!(term = %e, category = %ambient.structure.category, "normalizing");
        let engine = Engine::new(&self.host, &ambient.structure, config);
        let Certified { value, certificate } = engine.eval(e);
        if config.verify_invariants {
            let classifier = engine.classifier();
            let expected = (classifier.mor1(&ambient.src), classifier.mor1(&ambient.tgt));
            if let Err(violation) = check_result(&value, expected) {
                panic!("normalization of {} broke an invariant: {}", e, violation);
            }
        }
        debug!(
            fingerprint = %value.fingerprint(),
            atoms = value.to_list().len(),
            laws = certificate.as_ref().map_or(0, Certificate::law_count),
            "normalized"
        );
        Ok(Normalized {
            input: e.clone(),
            expr: value,
            certificate,
            structure: ambient.structure,
        })
    }

    /// Classifier bound to `structure`.
    pub fn classifier<'a>(&'a self, structure: &'a MonoidalStructure) -> Classifier<'a, H> {
        Classifier::new(&self.host, structure)
    }

    /// Normalizes `e` in a given ambient structure without the entry checks.
    ///
    /// The caller guarantees `e` is a well-typed morphism of `structure`'s
    /// category.
    pub fn eval(&self, structure: &MonoidalStructure, e: &Term) -> Certified<NormalExpr> {
        Engine::new(&self.host, structure, self.config).eval(e)
    }

    /// Composes two canonical forms.
    ///
    /// # Panics
    /// If `tgt a ≠ src b`.
    pub fn eval_comp(
        &self,
        structure: &MonoidalStructure,
        a: &NormalExpr,
        b: &NormalExpr,
    ) -> Certified<NormalExpr> {
        Engine::new(&self.host, structure, self.config).eval_comp(a, b)
    }

    /// Left-whiskers a canonical form by an object.
    pub fn eval_whisker_left(
        &self,
        structure: &MonoidalStructure,
        f: &Mor1,
        a: &NormalExpr,
    ) -> Certified<NormalExpr> {
        Engine::new(&self.host, structure, self.config).eval_whisker_left(f, a)
    }

    /// Right-whiskers a canonical form by an object.
    pub fn eval_whisker_right(
        &self,
        structure: &MonoidalStructure,
        a: &NormalExpr,
        f: &Mor1,
    ) -> Certified<NormalExpr> {
        Engine::new(&self.host, structure, self.config).eval_whisker_right(a, f)
    }
}

fn check_result(n: &NormalExpr, (src, tgt): (Mor1, Mor1)) -> Result<(), InvariantViolation> {
    n.check_well_formed()?;
    if n.src() != src {
        return Err(InvariantViolation::EndpointMismatch {
            expected: src,
            found: n.src(),
        });
    }
    if n.tgt() != tgt {
        return Err(InvariantViolation::EndpointMismatch {
            expected: tgt,
            found: n.tgt(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::Rule;
    use crate::core::Atom;
    use crate::normal::{TensorHomExpr, WhiskerRightExpr};
    use crate::signature::Signature;
    use crate::structural::{Structural, StructuralAtom};

    struct Fixture {
        sig: Signature,
        x: Term,
        y: Term,
        z: Term,
        w: Term,
        v: Term,
        /// `X ⟶ Y`
        f: Term,
        /// `Y ⟶ Z`
        g: Term,
        /// `Z ⟶ W`
        h: Term,
    }

    fn fixture() -> Fixture {
        let mut sig = Signature::new();
        sig.declare_category("C", true).unwrap();
        let [x, y, z, w, v] =
            ["X", "Y", "Z", "W", "V"].map(|n| sig.declare_object(n, "C").unwrap());
        let f = sig.declare_morphism("f", x.clone(), y.clone()).unwrap();
        let g = sig.declare_morphism("g", y.clone(), z.clone()).unwrap();
        let h = sig.declare_morphism("h", z.clone(), w.clone()).unwrap();
        Fixture {
            sig,
            x,
            y,
            z,
            w,
            v,
            f,
            g,
            h,
        }
    }

    fn leaf(t: &Term) -> Mor1 {
        Mor1::leaf(t.clone())
    }

    fn structure() -> MonoidalStructure {
        MonoidalStructure::new("C")
    }

    fn atom_names(n: &Normalized) -> Vec<String> {
        n.expr.atoms().iter().map(|a| a.term.to_string()).collect()
    }

    fn normalize_verified(sig: &Signature, e: &Term) -> Normalized {
        let n = Normalizer::new(sig).normalize(e).unwrap();
        if let Err(err) = n.verify(sig) {
            panic!("certificate for {} rejected: {}", e, err);
        }
        n
    }

    #[test]
    fn identity_padding_collapses_into_structural_parts() {
        let fx = fixture();
        let e = Term::comp(
            Term::comp(Term::id(fx.x.clone()), fx.f.clone()),
            Term::comp(fx.g.clone(), Term::id(fx.z.clone())),
        );
        let n = normalize_verified(&fx.sig, &e);
        let f_atom = Atom::new(fx.f.clone(), leaf(&fx.x), leaf(&fx.y));
        let g_atom = Atom::new(fx.g.clone(), leaf(&fx.y), leaf(&fx.z));
        let expected = NormalExpr::cons(
            Structural::Id(leaf(&fx.x)),
            WhiskerLeftExpr::of_atom(f_atom),
            NormalExpr::cons(
                Structural::Id(leaf(&fx.y)),
                WhiskerLeftExpr::of_atom(g_atom),
                NormalExpr::nil(Structural::Id(leaf(&fx.z))),
            ),
        );
        assert_eq!(n.expr, expected);
        assert_eq!(atom_names(&n), vec!["f", "g"]);
    }

    #[test]
    fn associator_pair_cancels_to_identity() {
        let fx = fixture();
        let s = structure();
        let (a, b, c) = (leaf(&fx.x), leaf(&fx.y), leaf(&fx.z));
        let assoc = StructuralAtom::Associator(a.clone(), b.clone(), c.clone());
        let normalizer = Normalizer::new(&fx.sig);
        let r = normalizer.eval_comp(
            &s,
            &NormalExpr::nil(Structural::atom(assoc.clone())),
            &NormalExpr::nil(Structural::atom(assoc.inverse())),
        );
        assert_eq!(
            r.value,
            NormalExpr::nil(Structural::Id(Mor1::tensor(Mor1::tensor(a, b), c)))
        );
        assert!(r.certificate.unwrap().check(&fx.sig).is_ok());
    }

    #[test]
    fn identities_are_absorbed() {
        let fx = fixture();
        let padded = Term::comp(
            Term::id(fx.x.clone()),
            Term::comp(fx.f.clone(), Term::id(fx.y.clone())),
        );
        let plain = normalize_verified(&fx.sig, &fx.f);
        let n = normalize_verified(&fx.sig, &padded);
        assert_eq!(n.expr, plain.expr);
    }

    #[test]
    fn left_whisker_distributes_over_composition() {
        let fx = fixture();
        let x = fx.x.clone();
        let whole = Term::whisker_left(x.clone(), Term::comp(fx.f.clone(), fx.g.clone()));
        let split = Term::comp(
            Term::whisker_left(x.clone(), fx.f.clone()),
            Term::whisker_left(x, fx.g.clone()),
        );
        assert_eq!(
            normalize_verified(&fx.sig, &whole).expr,
            normalize_verified(&fx.sig, &split).expr
        );
    }

    #[test]
    fn tensor_whisker_matches_nested_whiskers_with_associators() {
        let fx = fixture();
        let (x, y) = (fx.x.clone(), fx.y.clone());
        let direct = Term::whisker_left(Term::tensor(x.clone(), y.clone()), fx.f.clone());
        let nested = Term::comp(
            Term::associator(x.clone(), y.clone(), fx.x.clone()),
            Term::comp(
                Term::whisker_left(x.clone(), Term::whisker_left(y.clone(), fx.f.clone())),
                Term::associator_inv(x, y, fx.y.clone()),
            ),
        );
        let a = normalize_verified(&fx.sig, &direct);
        let b = normalize_verified(&fx.sig, &nested);
        assert_eq!(a.expr, b.expr);
        let structurals = a.expr.structurals();
        assert!(matches!(
            structurals[0],
            Structural::Atom(StructuralAtom::Associator(..))
        ));
        assert!(matches!(
            structurals[1],
            Structural::Atom(StructuralAtom::AssociatorInv(..))
        ));
    }

    #[test]
    fn tensor_of_morphisms_expands_to_whiskers() {
        let fx = fixture();
        let e = Term::tensor(fx.f.clone(), fx.h.clone());
        let n = normalize_verified(&fx.sig, &e);
        let parts = n.to_list();
        assert_eq!(parts.len(), 2);
        assert_eq!(
            parts[0].to_term(),
            Term::whisker_right(fx.f.clone(), fx.z.clone())
        );
        assert_eq!(
            parts[1].to_term(),
            Term::whisker_left(fx.y.clone(), fx.h.clone())
        );
        let rules: Vec<Rule> = n
            .certificate
            .as_ref()
            .unwrap()
            .audit_trail()
            .iter()
            .map(|entry| entry.rule)
            .collect();
        assert!(rules.contains(&Rule::TensorHomDef));
    }

    #[test]
    fn monoidal_composition_inserts_coherence() {
        let mut fx = fixture();
        let (x, y, z, w) = (fx.x.clone(), fx.y.clone(), fx.z.clone(), fx.w.clone());
        let p = fx
            .sig
            .declare_morphism(
                "p",
                x.clone(),
                Term::tensor(Term::tensor(y.clone(), z.clone()), w.clone()),
            )
            .unwrap();
        let q = fx
            .sig
            .declare_morphism("q", Term::tensor(y, Term::tensor(z, w)), x)
            .unwrap();
        let n = normalize_verified(&fx.sig, &Term::monoidal_comp(p, q));
        let structurals = n.expr.structurals();
        assert_eq!(structurals.len(), 3);
        assert!(matches!(
            structurals[1],
            Structural::Atom(StructuralAtom::Coherence { .. })
        ));
        assert_eq!(atom_names(&n), vec!["p", "q"]);
    }

    #[test]
    fn trivial_coherence_disappears() {
        let fx = fixture();
        let up_to_coherence = Term::monoidal_comp(fx.f.clone(), fx.g.clone());
        let strict = Term::comp(fx.f.clone(), fx.g.clone());
        assert_eq!(
            normalize_verified(&fx.sig, &up_to_coherence).expr,
            normalize_verified(&fx.sig, &strict).expr
        );
    }

    #[test]
    fn right_whisker_moves_inside_left_whisker() {
        let fx = fixture();
        let (x, y, z) = (leaf(&fx.x), leaf(&fx.y), leaf(&fx.z));
        let e = Term::whisker_right(Term::whisker_left(fx.x.clone(), fx.f.clone()), fx.z.clone());
        let n = normalize_verified(&fx.sig, &e);
        let f_atom = Atom::new(fx.f.clone(), x.clone(), y.clone());
        let inner = WhiskerLeftExpr::Of(TensorHomExpr::Of(WhiskerRightExpr::Whisker(
            Box::new(WhiskerRightExpr::Of(f_atom)),
            crate::core::Atom1::new(fx.z.clone()),
        )));
        let expected = NormalExpr::cons(
            Structural::atom(StructuralAtom::Associator(x.clone(), x.clone(), z.clone())),
            WhiskerLeftExpr::Whisker(crate::core::Atom1::new(fx.x.clone()), Box::new(inner)),
            NormalExpr::nil(Structural::atom(StructuralAtom::AssociatorInv(x, y, z))),
        );
        assert_eq!(n.expr, expected);
    }

    #[test]
    fn right_whisker_by_tensor_object() {
        let fx = fixture();
        let obj = Term::tensor(fx.y.clone(), fx.z.clone());
        let e = Term::whisker_right(fx.f.clone(), obj.clone());
        let n = normalize_verified(&fx.sig, &e);
        assert_eq!(atom_names(&n), vec!["f"]);
        assert_eq!(
            n.expr.src(),
            Mor1::tensor(leaf(&fx.x), Mor1::tensor(leaf(&fx.y), leaf(&fx.z)))
        );
    }

    #[test]
    fn unit_whiskers_become_unitors() {
        let fx = fixture();
        let unit = Term::unit("C");
        let left = normalize_verified(&fx.sig, &Term::whisker_left(unit.clone(), fx.f.clone()));
        assert_eq!(
            left.expr.structurals(),
            vec![
                &Structural::atom(StructuralAtom::LeftUnitor(leaf(&fx.x))),
                &Structural::atom(StructuralAtom::LeftUnitorInv(leaf(&fx.y))),
            ]
        );
        let right = normalize_verified(&fx.sig, &Term::whisker_right(fx.f.clone(), unit));
        assert_eq!(
            right.expr.structurals(),
            vec![
                &Structural::atom(StructuralAtom::RightUnitor(leaf(&fx.x))),
                &Structural::atom(StructuralAtom::RightUnitorInv(leaf(&fx.y))),
            ]
        );
    }

    #[test]
    fn right_whisker_enters_last_tensor_factor() {
        let fx = fixture();
        let s = structure();
        let (x, y, z, w, v) = (
            leaf(&fx.x),
            leaf(&fx.y),
            leaf(&fx.z),
            leaf(&fx.w),
            leaf(&fx.v),
        );
        let f_atom = WhiskerRightExpr::Of(Atom::new(fx.f.clone(), x.clone(), y.clone()));
        let h_atom = WhiskerRightExpr::Of(Atom::new(fx.h.clone(), z.clone(), w.clone()));
        let a = NormalExpr::cons(
            Structural::Id(Mor1::tensor(x.clone(), z.clone())),
            WhiskerLeftExpr::Of(TensorHomExpr::Cons(
                f_atom.clone(),
                Box::new(TensorHomExpr::Of(h_atom.clone())),
            )),
            NormalExpr::nil(Structural::Id(Mor1::tensor(y.clone(), w.clone()))),
        );
        let normalizer = Normalizer::new(&fx.sig);
        let r = normalizer.eval_whisker_right(&s, &a, &v);
        let expected = NormalExpr::cons(
            Structural::atom(StructuralAtom::Associator(x, z, v.clone())),
            WhiskerLeftExpr::Of(TensorHomExpr::Cons(
                f_atom,
                Box::new(TensorHomExpr::Of(WhiskerRightExpr::Whisker(
                    Box::new(h_atom),
                    crate::core::Atom1::new(fx.v.clone()),
                ))),
            )),
            NormalExpr::nil(Structural::atom(StructuralAtom::AssociatorInv(y, w, v))),
        );
        assert_eq!(r.value, expected);
        let cert = r.certificate.unwrap();
        assert_eq!(cert.lhs(), Term::whisker_right(a.to_term(&s), fx.v.clone()));
        assert_eq!(cert.rhs(), expected.to_term(&s));
        assert!(cert.check(&fx.sig).is_ok());
    }

    #[test]
    fn objects_and_ill_typed_terms_are_not_morphisms() {
        let fx = fixture();
        let normalizer = Normalizer::new(&fx.sig);
        assert_eq!(
            normalizer.normalize(&fx.x),
            Err(NormalizeError::NotAMorphism(fx.x.clone()))
        );
        let bad = Term::comp(fx.f.clone(), fx.f.clone());
        assert!(matches!(
            normalizer.normalize(&bad),
            Err(NormalizeError::NotAMorphism(_))
        ));
    }

    #[test]
    fn morphisms_without_monoidal_structure_are_rejected() {
        let mut sig = Signature::new();
        sig.declare_category("D", false).unwrap();
        let a = sig.declare_object("A", "D").unwrap();
        let u = sig.declare_morphism("u", a.clone(), a).unwrap();
        assert_eq!(
            Normalizer::new(&sig).normalize(&u),
            Err(NormalizeError::NoAmbientStructure(Symbol::new("D")))
        );
    }

    #[test]
    fn definitions_are_unfolded_before_dispatch() {
        let mut fx = fixture();
        let fg = fx
            .sig
            .define("fg", Term::comp(fx.f.clone(), fx.g.clone()))
            .unwrap();
        let alias = fx.sig.define("f'", fx.f.clone()).unwrap();
        let n = normalize_verified(&fx.sig, &fg);
        assert_eq!(atom_names(&n), vec!["f", "g"]);
        let m = normalize_verified(&fx.sig, &alias);
        assert_eq!(atom_names(&m), vec!["f"]);
        let rules: Vec<Rule> = m
            .certificate
            .unwrap()
            .audit_trail()
            .iter()
            .map(|entry| entry.rule)
            .collect();
        assert_eq!(rules, vec![Rule::DefEq, Rule::IdCompId]);
    }

    #[test]
    fn normalization_is_deterministic() {
        let fx = fixture();
        let e = Term::whisker_right(
            Term::whisker_left(Term::unit("C"), Term::comp(fx.f.clone(), fx.g.clone())),
            Term::tensor(fx.v.clone(), fx.w.clone()),
        );
        let normalizer = Normalizer::new(&fx.sig);
        let a = normalizer.normalize(&e).unwrap();
        let b = normalizer.normalize(&e).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.expr.fingerprint(), b.expr.fingerprint());
        assert_eq!(
            a.certificate.as_ref().map(Certificate::fingerprint),
            b.certificate.as_ref().map(Certificate::fingerprint)
        );
    }

    #[test]
    fn canonical_forms_are_fixed_points() {
        let fx = fixture();
        let terms = [
            Term::tensor(fx.f.clone(), fx.h.clone()),
            Term::whisker_right(Term::whisker_left(fx.x.clone(), fx.f.clone()), fx.z.clone()),
            Term::whisker_left(Term::tensor(fx.x.clone(), Term::unit("C")), fx.g.clone()),
            Term::whisker_right(fx.f.clone(), Term::tensor(fx.v.clone(), Term::unit("C"))),
        ];
        for e in &terms {
            let once = normalize_verified(&fx.sig, e);
            let twice = normalize_verified(&fx.sig, &once.reconstruct());
            assert_eq!(once.expr, twice.expr, "not a fixed point: {}", e);
        }
    }

    #[test]
    fn disabling_certificates_keeps_the_canonical_form() {
        let fx = fixture();
        let e = Term::tensor(fx.f.clone(), fx.g.clone());
        let recorded = Normalizer::new(&fx.sig).normalize(&e).unwrap();
        let bare = Normalizer::with_config(&fx.sig, NormalizerConfig::without_certificates())
            .normalize(&e)
            .unwrap();
        assert!(bare.certificate.is_none());
        assert_eq!(bare.expr, recorded.expr);
        assert_eq!(bare.verify(&fx.sig), Err(CertificateError::Missing));
    }

    #[test]
    fn raw_structural_parts_still_verify() {
        let fx = fixture();
        let e = Term::comp(
            Term::comp(Term::id(fx.x.clone()), fx.f.clone()),
            Term::comp(fx.g.clone(), Term::id(fx.z.clone())),
        );
        let config = NormalizerConfig::default().with_simplification(false);
        let n = Normalizer::with_config(&fx.sig, config).normalize(&e).unwrap();
        assert!(n.verify(&fx.sig).is_ok());
        assert_eq!(atom_names(&n), vec!["f", "g"]);
        assert!(matches!(n.expr.structurals()[1], Structural::Comp(..)));
    }

    #[test]
    fn atoms_lists_non_structural_parts_in_order() {
        let fx = fixture();
        let e = Term::comp(
            Term::associator(fx.x.clone(), fx.y.clone(), fx.z.clone()),
            Term::whisker_left(fx.x.clone(), Term::tensor(fx.g.clone(), fx.h.clone())),
        );
        let atoms = Normalizer::new(&fx.sig).atoms(&e).unwrap();
        let names: Vec<String> = atoms
            .iter()
            .flat_map(|part| part.atoms().into_iter().map(|a| a.term.to_string()))
            .collect();
        assert_eq!(names, vec!["g", "h"]);
    }

    #[test]
    fn tensors_of_morphisms_never_build_tensor_heads() {
        let fx = fixture();
        let e = Term::tensor(fx.f.clone(), Term::tensor(fx.g.clone(), fx.h.clone()));
        let n = normalize_verified(&fx.sig, &e);
        assert_eq!(atom_names(&n), vec!["f", "g", "h"]);
        assert!(n
            .to_list()
            .iter()
            .all(|eta| matches!(eta.tensor_hom(), TensorHomExpr::Of(_))));
    }

    #[test]
    fn left_nested_chains_cite_linearly_many_laws() {
        let fx = fixture();
        let mut sig = fx.sig;
        let k = sig
            .declare_morphism("k", fx.x.clone(), fx.x.clone())
            .unwrap();
        let n = 64;
        let chain = (1..n).fold(k.clone(), |acc, _| Term::comp(acc, k.clone()));
        let result = normalize_verified(&sig, &chain);
        assert_eq!(result.to_list().len(), n);
        let cert = result.certificate.as_ref().unwrap();
        assert!(cert.law_count() <= 3 * n, "{} laws", cert.law_count());
    }

    #[test]
    fn long_chains_normalize_on_a_large_stack() {
        let fx = fixture();
        let mut sig = fx.sig;
        let k = sig
            .declare_morphism("k", fx.x.clone(), fx.x.clone())
            .unwrap();
        let chain = Term::comp_all(std::iter::repeat(k).take(1_000).collect::<Vec<_>>()).unwrap();
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024 * 1024)
            .spawn(move || {
                let normalizer =
                    Normalizer::with_config(&sig, NormalizerConfig::without_certificates());
                normalizer.normalize(&chain).map(|n| n.to_list().len())
            })
            .unwrap();
        assert_eq!(handle.join().unwrap(), Ok(1_000));
    }
}

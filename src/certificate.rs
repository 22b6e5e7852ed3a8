//! Equality certificates for normalization steps.
//!
//! Every engine operation can return, next to its result, a [`Certificate`]:
//! a proof tree that the input term equals the reconstruction of the result in
//! any monoidal category. Leaves are reflexivity or named [`Rule`]
//! instances; inner nodes are transitivity and congruence under composition and
//! whiskering.
//!
//! [`Certificate::check`] replays a tree against a [`Host`]. It verifies that
//! transitivity steps chain and that definitional-unfolding steps really are
//! definitional. For every other rule instance it checks that both sides are
//! well-typed parallel morphisms whose non-structural atoms occur in the same
//! order, each with the same objects whiskered to its left and to its right.
//!
//! When both sides are composites of whiskered atoms separated by structural
//! isomorphisms, matching placements force the objects between consecutive
//! atoms to agree up to bracketing and units, and Mac Lane's coherence theorem
//! then equates the two sides. The check is conservative: an equation that
//! slides independent atoms past each other (interchange) is rejected even
//! though it holds.
//!
//! Certificates can be audited ([`Certificate::audit_trail`]) and persisted as
//! CBOR.
//!
//! # Citations
//! - Mac Lane, "Natural associativity and commutativity" (1963) – coherence
//! - Joyal & Street, "Braided tensor categories" (1993) – strictification

use crate::fingerprint::{Canonicalizable, HashValue, DOMAIN_CERTIFICATE_V0};
use crate::host::Host;
use crate::term::Term;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named rewriting rules a certificate may cite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rule {
    /// Definitional unfolding; checked with the host's `def_eq`.
    DefEq,
    /// `α ≫ β` of structural parts, merged into one structural part.
    StructuralComp,
    /// Reassociation of a composite with a canonical form.
    CompAssoc,
    /// `f ◁ α` of a structural part.
    WhiskerLeftStructural,
    /// `f ◁ (α ≫ η ≫ θ) = (f ◁ α) ≫ (f ◁ η) ≫ (f ◁ θ)`.
    WhiskerLeftComp,
    /// `(f ⊗ g) ◁ η = α ≫ f ◁ (g ◁ η) ≫ α⁻¹`.
    TensorWhiskerLeft,
    /// `𝟙 ◁ η = λ ≫ η ≫ λ⁻¹`.
    UnitWhiskerLeft,
    /// `α ▷ f` of a structural part.
    WhiskerRightStructural,
    /// `(α ≫ η ≫ θ) ▷ f = (α ▷ f) ≫ (η ▷ f) ≫ (θ ▷ f)`.
    WhiskerRightComp,
    /// Pushing a right whisker through a left-whiskered atom.
    WhiskerRightCompWhiskerLeft,
    /// Pushing a right whisker into the last factor of a tensor.
    TensorHomWhiskerRight,
    /// `η ▷ (f ⊗ g) = α⁻¹ ≫ (η ▷ f) ▷ g ≫ α`.
    WhiskerRightTensor,
    /// `η ▷ 𝟙 = ρ ≫ η ≫ ρ⁻¹`.
    WhiskerRightUnit,
    /// `f ⊗ g = (f ▷ X) ≫ (Y ◁ g)`.
    TensorHomDef,
    /// `f ⊗≫ g = f ≫ ⊗𝟙 ≫ g`.
    MonoidalCompDef,
    /// `η = 𝟙 ≫ η ≫ 𝟙`.
    IdCompId,
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::DefEq => "def_eq",
            Rule::StructuralComp => "structural_comp",
            Rule::CompAssoc => "comp_assoc",
            Rule::WhiskerLeftStructural => "whisker_left_structural",
            Rule::WhiskerLeftComp => "whisker_left_comp",
            Rule::TensorWhiskerLeft => "tensor_whisker_left",
            Rule::UnitWhiskerLeft => "unit_whisker_left",
            Rule::WhiskerRightStructural => "whisker_right_structural",
            Rule::WhiskerRightComp => "whisker_right_comp",
            Rule::WhiskerRightCompWhiskerLeft => "whisker_right_comp_whisker_left",
            Rule::TensorHomWhiskerRight => "tensor_hom_whisker_right",
            Rule::WhiskerRightTensor => "whisker_right_tensor",
            Rule::WhiskerRightUnit => "whisker_right_unit",
            Rule::TensorHomDef => "tensor_hom_def",
            Rule::MonoidalCompDef => "monoidal_comp_def",
            Rule::IdCompId => "id_comp_id",
        }
    }

    fn tag(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A proof tree that `lhs() = rhs()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Certificate {
    /// `t = t`.
    Refl(Term),
    /// An instance of a named rule.
    Law { rule: Rule, lhs: Term, rhs: Term },
    /// `a = b` and `b = c` give `a = c`.
    Trans(Box<Certificate>, Box<Certificate>),
    /// `f = f'` and `g = g'` give `f ≫ g = f' ≫ g'`.
    CongrComp(Box<Certificate>, Box<Certificate>),
    /// `f = f'` gives `X ◁ f = X ◁ f'`.
    CongrWhiskerLeft(Term, Box<Certificate>),
    /// `f = f'` gives `f ▷ X = f' ▷ X`.
    CongrWhiskerRight(Box<Certificate>, Term),
}

impl Certificate {
    pub fn refl(t: Term) -> Self {
        Certificate::Refl(t)
    }

    pub fn law(rule: Rule, lhs: Term, rhs: Term) -> Self {
        Certificate::Law { rule, lhs, rhs }
    }

    /// `Refl` if the terms are syntactically equal, a `DefEq` step otherwise.
    pub fn cast(lhs: Term, rhs: Term) -> Self {
        if lhs == rhs {
            Certificate::Refl(lhs)
        } else {
            Certificate::law(Rule::DefEq, lhs, rhs)
        }
    }

    /// Transitivity, absorbing reflexive steps.
    pub fn trans(p: Certificate, q: Certificate) -> Self {
        match (p, q) {
            (Certificate::Refl(_), q) => q,
            (p, Certificate::Refl(_)) => p,
            (p, q) => Certificate::Trans(Box::new(p), Box::new(q)),
        }
    }

    pub fn congr_comp(p: Certificate, q: Certificate) -> Self {
        match (p, q) {
            (Certificate::Refl(a), Certificate::Refl(b)) => Certificate::Refl(Term::comp(a, b)),
            (p, q) => Certificate::CongrComp(Box::new(p), Box::new(q)),
        }
    }

    pub fn congr_whisker_left(x: Term, p: Certificate) -> Self {
        match p {
            Certificate::Refl(a) => Certificate::Refl(Term::whisker_left(x, a)),
            p => Certificate::CongrWhiskerLeft(x, Box::new(p)),
        }
    }

    pub fn congr_whisker_right(p: Certificate, x: Term) -> Self {
        match p {
            Certificate::Refl(a) => Certificate::Refl(Term::whisker_right(a, x)),
            p => Certificate::CongrWhiskerRight(Box::new(p), x),
        }
    }

    /// Left-hand side of the proven equation.
    pub fn lhs(&self) -> Term {
        match self {
            Certificate::Refl(t) => t.clone(),
            Certificate::Law { lhs, .. } => lhs.clone(),
            Certificate::Trans(p, _) => p.lhs(),
            Certificate::CongrComp(p, q) => Term::comp(p.lhs(), q.lhs()),
            Certificate::CongrWhiskerLeft(x, p) => Term::whisker_left(x.clone(), p.lhs()),
            Certificate::CongrWhiskerRight(p, x) => Term::whisker_right(p.lhs(), x.clone()),
        }
    }

    /// Right-hand side of the proven equation.
    pub fn rhs(&self) -> Term {
        match self {
            Certificate::Refl(t) => t.clone(),
            Certificate::Law { rhs, .. } => rhs.clone(),
            Certificate::Trans(_, q) => q.rhs(),
            Certificate::CongrComp(p, q) => Term::comp(p.rhs(), q.rhs()),
            Certificate::CongrWhiskerLeft(x, p) => Term::whisker_left(x.clone(), p.rhs()),
            Certificate::CongrWhiskerRight(p, x) => Term::whisker_right(p.rhs(), x.clone()),
        }
    }

    /// Number of rule instances in the tree.
    pub fn law_count(&self) -> usize {
        match self {
            Certificate::Refl(_) => 0,
            Certificate::Law { .. } => 1,
            Certificate::Trans(p, q) | Certificate::CongrComp(p, q) => {
                p.law_count() + q.law_count()
            }
            Certificate::CongrWhiskerLeft(_, p) | Certificate::CongrWhiskerRight(p, _) => {
                p.law_count()
            }
        }
    }

    /// Replays the certificate against `host`.
    pub fn check<H: Host>(&self, host: &H) -> Result<(), CertificateError> {
        self.check_sides(host).map(|_| ())
    }

    /// Checks the tree bottom-up, returning the proven `(lhs, rhs)`.
    fn check_sides<H: Host>(&self, host: &H) -> Result<(Term, Term), CertificateError> {
        match self {
            Certificate::Refl(t) => Ok((t.clone(), t.clone())),
            Certificate::Law { rule, lhs, rhs } => {
                check_law(host, *rule, lhs, rhs)?;
                Ok((lhs.clone(), rhs.clone()))
            }
            Certificate::Trans(p, q) => {
                let (a, b) = p.check_sides(host)?;
                let (b2, c) = q.check_sides(host)?;
                if b != b2 {
                    return Err(CertificateError::BrokenChain {
                        expected: b,
                        found: b2,
                    });
                }
                Ok((a, c))
            }
            Certificate::CongrComp(p, q) => {
                let (a, a2) = p.check_sides(host)?;
                let (b, b2) = q.check_sides(host)?;
                Ok((Term::comp(a, b), Term::comp(a2, b2)))
            }
            Certificate::CongrWhiskerLeft(x, p) => {
                let (a, a2) = p.check_sides(host)?;
                Ok((
                    Term::whisker_left(x.clone(), a),
                    Term::whisker_left(x.clone(), a2),
                ))
            }
            Certificate::CongrWhiskerRight(p, x) => {
                let (a, a2) = p.check_sides(host)?;
                Ok((
                    Term::whisker_right(a, x.clone()),
                    Term::whisker_right(a2, x.clone()),
                ))
            }
        }
    }

    /// Rule instances in proof order, with side fingerprints.
    pub fn audit_trail(&self) -> Vec<AuditEntry> {
        let mut out = Vec::new();
        self.collect_audit(&mut out);
        out
    }

    fn collect_audit(&self, out: &mut Vec<AuditEntry>) {
        match self {
            Certificate::Refl(_) => {}
            Certificate::Law { rule, lhs, rhs } => out.push(AuditEntry {
                rule: *rule,
                lhs: lhs.fingerprint(),
                rhs: rhs.fingerprint(),
            }),
            Certificate::Trans(p, q) | Certificate::CongrComp(p, q) => {
                p.collect_audit(out);
                q.collect_audit(out);
            }
            Certificate::CongrWhiskerLeft(_, p) | Certificate::CongrWhiskerRight(p, _) => {
                p.collect_audit(out)
            }
        }
    }

    pub fn fingerprint(&self) -> HashValue {
        self.fingerprint_in(DOMAIN_CERTIFICATE_V0)
    }

    /// Serializes the certificate to CBOR bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>, CertificateError> {
        serde_cbor::to_vec(self).map_err(|e| CertificateError::Encoding(e.to_string()))
    }

    /// Deserializes a certificate from CBOR bytes.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, CertificateError> {
        serde_cbor::from_slice(bytes).map_err(|e| CertificateError::Encoding(e.to_string()))
    }
}

fn check_law<H: Host>(host: &H, rule: Rule, lhs: &Term, rhs: &Term) -> Result<(), CertificateError> {
    if rule == Rule::DefEq {
        return if host.def_eq(lhs, rhs) {
            Ok(())
        } else {
            Err(CertificateError::NotDefEq {
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            })
        };
    }
    let (ls, lt) = host
        .infer_hom(lhs)
        .ok_or_else(|| CertificateError::IllTyped { rule, term: lhs.clone() })?;
    let (rs, rt) = host
        .infer_hom(rhs)
        .ok_or_else(|| CertificateError::IllTyped { rule, term: rhs.clone() })?;
    if !host.def_eq(&ls, &rs) || !host.def_eq(&lt, &rt) {
        return Err(CertificateError::NotParallel {
            rule,
            lhs: lhs.clone(),
            rhs: rhs.clone(),
        });
    }
    let left = placed_atoms(host, lhs)
        .ok_or_else(|| CertificateError::IllTyped { rule, term: lhs.clone() })?;
    let right = placed_atoms(host, rhs)
        .ok_or_else(|| CertificateError::IllTyped { rule, term: rhs.clone() })?;
    let preserved = left.len() == right.len()
        && left.iter().zip(&right).all(|(a, b)| a.same_as(host, b));
    if preserved {
        Ok(())
    } else {
        Err(CertificateError::AtomsNotPreserved {
            rule,
            lhs: lhs.clone(),
            rhs: rhs.clone(),
        })
    }
}

/// A non-structural atom together with the flattened objects beside it.
#[derive(Debug)]
struct Placed {
    left: Vec<Term>,
    atom: Term,
    right: Vec<Term>,
}

impl Placed {
    fn same_as<H: Host>(&self, host: &H, other: &Placed) -> bool {
        host.def_eq(&self.atom, &other.atom)
            && same_objects(host, &self.left, &other.left)
            && same_objects(host, &self.right, &other.right)
    }
}

fn same_objects<H: Host>(host: &H, a: &[Term], b: &[Term]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| host.def_eq(x, y))
}

/// Non-structural atoms of a morphism term, left to right, with their
/// whiskering context. `None` if a tensor factor cannot be typed.
fn placed_atoms<H: Host>(host: &H, e: &Term) -> Option<Vec<Placed>> {
    let mut out = Vec::new();
    place(host, e, &[], &[], &mut out)?;
    Some(out)
}

fn place<H: Host>(
    host: &H,
    e: &Term,
    left: &[Term],
    right: &[Term],
    out: &mut Vec<Placed>,
) -> Option<()> {
    match host.whnf(e) {
        Term::Comp(a, b) | Term::MonoidalComp(a, b) => {
            place(host, a, left, right, out)?;
            place(host, b, left, right, out)
        }
        Term::WhiskerLeft(x, a) => {
            let mut inner = left.to_vec();
            object_atoms(host, x, &mut inner);
            place(host, a, &inner, right, out)
        }
        Term::WhiskerRight(a, x) => {
            let mut inner = Vec::new();
            object_atoms(host, x, &mut inner);
            inner.extend_from_slice(right);
            place(host, a, left, &inner, out)
        }
        // f ⊗ g = (f ▷ src g) ≫ (tgt f ◁ g)
        Term::Tensor(a, b) => {
            let (_, tgt_a) = host.infer_hom(a)?;
            let (src_b, _) = host.infer_hom(b)?;
            let mut a_right = Vec::new();
            object_atoms(host, &src_b, &mut a_right);
            a_right.extend_from_slice(right);
            place(host, a, left, &a_right, out)?;
            let mut b_left = left.to_vec();
            object_atoms(host, &tgt_a, &mut b_left);
            place(host, b, &b_left, right, out)
        }
        Term::Id(_)
        | Term::Associator(..)
        | Term::AssociatorInv(..)
        | Term::LeftUnitor(_)
        | Term::LeftUnitorInv(_)
        | Term::RightUnitor(_)
        | Term::RightUnitorInv(_)
        | Term::Coherence(..) => Some(()),
        other => {
            out.push(Placed {
                left: left.to_vec(),
                atom: other.clone(),
                right: right.to_vec(),
            });
            Some(())
        }
    }
}

/// Tensor factors of an object term with units dropped.
fn object_atoms<H: Host>(host: &H, x: &Term, out: &mut Vec<Term>) {
    match host.whnf(x) {
        Term::Unit(_) => {}
        Term::Tensor(a, b) => {
            object_atoms(host, a, out);
            object_atoms(host, b, out);
        }
        other => out.push(other.clone()),
    }
}

/// One rule instance in a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub rule: Rule,
    pub lhs: HashValue,
    pub rhs: HashValue,
}

/// A value paired with an optional certificate that relates it to the
/// engine's input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certified<T> {
    pub value: T,
    pub certificate: Option<Certificate>,
}

impl<T> Certified<T> {
    pub fn new(value: T, certificate: Option<Certificate>) -> Self {
        Self { value, certificate }
    }
}

/// Reasons a certificate fails to replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateError {
    /// Consecutive transitivity steps do not meet.
    BrokenChain { expected: Term, found: Term },
    /// A side of a rule instance is not a well-typed morphism.
    IllTyped { rule: Rule, term: Term },
    /// The two sides of a rule instance have different boundaries.
    NotParallel { rule: Rule, lhs: Term, rhs: Term },
    /// A rule instance reorders, drops or duplicates non-structural atoms, or
    /// moves one onto different wires.
    AtomsNotPreserved { rule: Rule, lhs: Term, rhs: Term },
    /// A definitional step relates non-definitionally-equal terms.
    NotDefEq { lhs: Term, rhs: Term },
    /// No certificate was recorded.
    Missing,
    /// CBOR encoding or decoding failed.
    Encoding(String),
}

impl fmt::Display for CertificateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateError::BrokenChain { expected, found } => {
                write!(f, "transitivity chain broken: expected {}, found {}", expected, found)
            }
            CertificateError::IllTyped { rule, term } => {
                write!(f, "{}: side {} is not a morphism", rule, term)
            }
            CertificateError::NotParallel { rule, lhs, rhs } => {
                write!(f, "{}: {} and {} are not parallel", rule, lhs, rhs)
            }
            CertificateError::AtomsNotPreserved { rule, lhs, rhs } => {
                write!(f, "{}: {} and {} differ in their atoms", rule, lhs, rhs)
            }
            CertificateError::NotDefEq { lhs, rhs } => {
                write!(f, "{} and {} are not definitionally equal", lhs, rhs)
            }
            CertificateError::Missing => write!(f, "no certificate recorded"),
            CertificateError::Encoding(msg) => write!(f, "certificate encoding: {}", msg),
        }
    }
}

impl std::error::Error for CertificateError {}

impl Canonicalizable for Certificate {
    fn write_canonical(&self, out: &mut Vec<u8>) {
        match self {
            Certificate::Refl(t) => {
                out.push(0x70);
                t.write_canonical(out);
            }
            Certificate::Law { rule, lhs, rhs } => {
                out.push(0x71);
                out.push(rule.tag());
                lhs.write_canonical(out);
                rhs.write_canonical(out);
            }
            Certificate::Trans(p, q) => {
                out.push(0x72);
                p.write_canonical(out);
                q.write_canonical(out);
            }
            Certificate::CongrComp(p, q) => {
                out.push(0x73);
                p.write_canonical(out);
                q.write_canonical(out);
            }
            Certificate::CongrWhiskerLeft(x, p) => {
                out.push(0x74);
                x.write_canonical(out);
                p.write_canonical(out);
            }
            Certificate::CongrWhiskerRight(p, x) => {
                out.push(0x75);
                p.write_canonical(out);
                x.write_canonical(out);
            }
        }
    }
}

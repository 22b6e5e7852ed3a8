//! Canonical forms of morphisms.
//!
//! A canonical form alternates structural isomorphisms with atomic
//! non-structural morphisms:
//!
//! ```text
//! NormalExpr   ::= Nil(α) | Cons(α, η, NormalExpr)
//! WhiskerLeftExpr ::= Of(TensorHomExpr) | Whisker(f, WhiskerLeftExpr)
//! TensorHomExpr   ::= Of(WhiskerRightExpr) | Cons(WhiskerRightExpr, TensorHomExpr)
//! WhiskerRightExpr ::= Of(Atom) | Whisker(WhiskerRightExpr, f)
//! ```
//!
//! Left whiskers sit outside tensors, which sit outside right whiskers, which
//! sit outside atoms. The nesting order is what makes the form canonical: two
//! morphisms are equal up to coherence exactly when their canonical forms have
//! the same atom sequence and parallel structural parts.
//!
//! # Invariants
//! - In `Cons(α, η, rest)`: `tgt α = src η` and `tgt η = src rest`.
//! - Every structural part is internally composable.
//!
//! Both are checked by [`NormalExpr::check_well_formed`].

use crate::core::{Atom, Atom1, Mor1};
use crate::fingerprint::{Canonicalizable, HashValue, DOMAIN_NORMAL_EXPR_V0};
use crate::host::MonoidalStructure;
use crate::structural::Structural;
use crate::term::Term;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An atom under zero or more right whiskers: `((η ▷ f₁) ▷ f₂) …`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WhiskerRightExpr {
    Of(Atom),
    Whisker(Box<WhiskerRightExpr>, Atom1),
}

impl WhiskerRightExpr {
    pub fn src(&self) -> Mor1 {
        match self {
            WhiskerRightExpr::Of(a) => a.src.clone(),
            WhiskerRightExpr::Whisker(e, f) => Mor1::tensor(e.src(), Mor1::Leaf(f.clone())),
        }
    }

    pub fn tgt(&self) -> Mor1 {
        match self {
            WhiskerRightExpr::Of(a) => a.tgt.clone(),
            WhiskerRightExpr::Whisker(e, f) => Mor1::tensor(e.tgt(), Mor1::Leaf(f.clone())),
        }
    }

    /// The underlying atom.
    pub fn atom(&self) -> &Atom {
        let mut cur = self;
        loop {
            match cur {
                WhiskerRightExpr::Of(a) => return a,
                WhiskerRightExpr::Whisker(e, _) => cur = &**e,
            }
        }
    }

    pub fn to_term(&self) -> Term {
        match self {
            WhiskerRightExpr::Of(a) => a.term.clone(),
            WhiskerRightExpr::Whisker(e, f) => Term::whisker_right(e.to_term(), f.term.clone()),
        }
    }
}

/// A tensor product of right-whiskered atoms, `η₁ ⊗ (η₂ ⊗ …)`.
///
/// Evaluation expands every tensor of morphisms into whiskers, so `Cons`
/// values only come from callers; the merge operations still accept them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TensorHomExpr {
    Of(WhiskerRightExpr),
    Cons(WhiskerRightExpr, Box<TensorHomExpr>),
}

impl TensorHomExpr {
    pub fn src(&self) -> Mor1 {
        match self {
            TensorHomExpr::Of(e) => e.src(),
            TensorHomExpr::Cons(e, rest) => Mor1::tensor(e.src(), rest.src()),
        }
    }

    pub fn tgt(&self) -> Mor1 {
        match self {
            TensorHomExpr::Of(e) => e.tgt(),
            TensorHomExpr::Cons(e, rest) => Mor1::tensor(e.tgt(), rest.tgt()),
        }
    }

    /// Factors left to right.
    pub fn factors(&self) -> Vec<&WhiskerRightExpr> {
        let mut out = Vec::new();
        let mut cur = self;
        loop {
            match cur {
                TensorHomExpr::Of(e) => {
                    out.push(e);
                    return out;
                }
                TensorHomExpr::Cons(e, rest) => {
                    out.push(e);
                    cur = &**rest;
                }
            }
        }
    }

    pub fn to_term(&self) -> Term {
        match self {
            TensorHomExpr::Of(e) => e.to_term(),
            TensorHomExpr::Cons(e, rest) => Term::tensor(e.to_term(), rest.to_term()),
        }
    }
}

/// A tensor of atoms under zero or more left whiskers: `f₁ ◁ (f₂ ◁ …)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WhiskerLeftExpr {
    Of(TensorHomExpr),
    Whisker(Atom1, Box<WhiskerLeftExpr>),
}

impl WhiskerLeftExpr {
    /// An atom with no whiskers.
    pub fn of_atom(atom: Atom) -> Self {
        WhiskerLeftExpr::Of(TensorHomExpr::Of(WhiskerRightExpr::Of(atom)))
    }

    pub fn src(&self) -> Mor1 {
        match self {
            WhiskerLeftExpr::Of(e) => e.src(),
            WhiskerLeftExpr::Whisker(f, e) => Mor1::tensor(Mor1::Leaf(f.clone()), e.src()),
        }
    }

    pub fn tgt(&self) -> Mor1 {
        match self {
            WhiskerLeftExpr::Of(e) => e.tgt(),
            WhiskerLeftExpr::Whisker(f, e) => Mor1::tensor(Mor1::Leaf(f.clone()), e.tgt()),
        }
    }

    /// The tensor product under all left whiskers.
    pub fn tensor_hom(&self) -> &TensorHomExpr {
        let mut cur = self;
        loop {
            match cur {
                WhiskerLeftExpr::Of(e) => return e,
                WhiskerLeftExpr::Whisker(_, e) => cur = &**e,
            }
        }
    }

    /// Non-structural atoms in left-to-right order.
    pub fn atoms(&self) -> Vec<&Atom> {
        self.tensor_hom().factors().into_iter().map(WhiskerRightExpr::atom).collect()
    }

    pub fn to_term(&self) -> Term {
        match self {
            WhiskerLeftExpr::Of(e) => e.to_term(),
            WhiskerLeftExpr::Whisker(f, e) => Term::whisker_left(f.term.clone(), e.to_term()),
        }
    }
}

/// A canonical form: structural parts interleaved with non-structural atoms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormalExpr {
    Nil(Structural),
    Cons(Structural, WhiskerLeftExpr, Box<NormalExpr>),
}

impl NormalExpr {
    #[inline]
    pub fn nil(alpha: Structural) -> Self {
        NormalExpr::Nil(alpha)
    }

    #[inline]
    pub fn cons(alpha: Structural, eta: WhiskerLeftExpr, rest: NormalExpr) -> Self {
        NormalExpr::Cons(alpha, eta, Box::new(rest))
    }

    /// `𝟙 (src η) ≫ η ≫ 𝟙 (tgt η)`.
    pub fn single(eta: WhiskerLeftExpr) -> Self {
        let (src, tgt) = (eta.src(), eta.tgt());
        NormalExpr::cons(Structural::Id(src), eta, NormalExpr::Nil(Structural::Id(tgt)))
    }

    pub fn src(&self) -> Mor1 {
        match self {
            NormalExpr::Nil(alpha) | NormalExpr::Cons(alpha, _, _) => alpha.src(),
        }
    }

    pub fn tgt(&self) -> Mor1 {
        self.last_structural().tgt()
    }

    /// The trailing structural part.
    pub fn last_structural(&self) -> &Structural {
        let mut cur = self;
        loop {
            match cur {
                NormalExpr::Nil(alpha) => return alpha,
                NormalExpr::Cons(_, _, rest) => cur = &**rest,
            }
        }
    }

    /// Returns `true` if no non-structural atom occurs.
    pub fn is_structural(&self) -> bool {
        matches!(self, NormalExpr::Nil(_))
    }

    /// The non-structural parts, left to right.
    pub fn to_list(&self) -> Vec<&WhiskerLeftExpr> {
        let mut out = Vec::new();
        let mut cur = self;
        while let NormalExpr::Cons(_, eta, rest) = cur {
            out.push(eta);
            cur = &**rest;
        }
        out
    }

    /// The structural parts, left to right; always one more than `to_list`.
    pub fn structurals(&self) -> Vec<&Structural> {
        let mut out = Vec::new();
        let mut cur = self;
        loop {
            match cur {
                NormalExpr::Nil(alpha) => {
                    out.push(alpha);
                    return out;
                }
                NormalExpr::Cons(alpha, _, rest) => {
                    out.push(alpha);
                    cur = &**rest;
                }
            }
        }
    }

    /// Every non-structural atom in order.
    pub fn atoms(&self) -> Vec<&Atom> {
        self.to_list().into_iter().flat_map(WhiskerLeftExpr::atoms).collect()
    }

    /// Rebuilds a host term: `α ≫ (η ≫ rest)`, right-nested.
    pub fn to_term(&self, structure: &MonoidalStructure) -> Term {
        match self {
            NormalExpr::Nil(alpha) => alpha.to_term(structure),
            NormalExpr::Cons(alpha, eta, rest) => Term::comp(
                alpha.to_term(structure),
                Term::comp(eta.to_term(), rest.to_term(structure)),
            ),
        }
    }

    /// Verifies the composability invariants.
    pub fn check_well_formed(&self) -> Result<(), InvariantViolation> {
        let mut cur = self;
        let mut position = 0usize;
        loop {
            match cur {
                NormalExpr::Nil(alpha) => return check_structural(alpha, position),
                NormalExpr::Cons(alpha, eta, rest) => {
                    check_structural(alpha, position)?;
                    if alpha.tgt() != eta.src() {
                        return Err(InvariantViolation::BoundaryMismatch {
                            position,
                            left: alpha.tgt(),
                            right: eta.src(),
                        });
                    }
                    if eta.tgt() != rest.src() {
                        return Err(InvariantViolation::BoundaryMismatch {
                            position,
                            left: eta.tgt(),
                            right: rest.src(),
                        });
                    }
                    position += 1;
                    cur = &**rest;
                }
            }
        }
    }

    pub fn fingerprint(&self) -> HashValue {
        self.fingerprint_in(DOMAIN_NORMAL_EXPR_V0)
    }
}

fn check_structural(alpha: &Structural, position: usize) -> Result<(), InvariantViolation> {
    if alpha.is_well_formed() {
        Ok(())
    } else {
        Err(InvariantViolation::IllFormedStructural { position })
    }
}

/// A canonical form that breaks its own composability invariants.
///
/// Produced only by engine bugs; the normalizer panics with it when
/// invariant verification is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Adjacent parts at the given position do not compose.
    BoundaryMismatch { position: usize, left: Mor1, right: Mor1 },
    /// A structural part contains a non-composable composite.
    IllFormedStructural { position: usize },
    /// The canonical form's boundary differs from the input's.
    EndpointMismatch { expected: Mor1, found: Mor1 },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::BoundaryMismatch {
                position,
                left,
                right,
            } => write!(
                f,
                "canonical form broken at position {}: {} does not compose with {}",
                position, left, right
            ),
            InvariantViolation::IllFormedStructural { position } => {
                write!(f, "ill-formed structural part at position {}", position)
            }
            InvariantViolation::EndpointMismatch { expected, found } => {
                write!(f, "canonical form endpoint {} differs from {}", found, expected)
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

impl fmt::Display for WhiskerRightExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_term())
    }
}

impl fmt::Display for WhiskerLeftExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_term())
    }
}

impl fmt::Display for NormalExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalExpr::Nil(alpha) => write!(f, "{}", alpha),
            NormalExpr::Cons(alpha, eta, rest) => write!(f, "{} ≫ {} ≫ {}", alpha, eta, rest),
        }
    }
}

impl Canonicalizable for WhiskerRightExpr {
    fn write_canonical(&self, out: &mut Vec<u8>) {
        match self {
            WhiskerRightExpr::Of(a) => {
                out.push(0x50);
                a.write_canonical(out);
            }
            WhiskerRightExpr::Whisker(e, f) => {
                out.push(0x51);
                e.write_canonical(out);
                f.write_canonical(out);
            }
        }
    }
}

impl Canonicalizable for TensorHomExpr {
    fn write_canonical(&self, out: &mut Vec<u8>) {
        match self {
            TensorHomExpr::Of(e) => {
                out.push(0x52);
                e.write_canonical(out);
            }
            TensorHomExpr::Cons(e, rest) => {
                out.push(0x53);
                e.write_canonical(out);
                rest.write_canonical(out);
            }
        }
    }
}

impl Canonicalizable for WhiskerLeftExpr {
    fn write_canonical(&self, out: &mut Vec<u8>) {
        match self {
            WhiskerLeftExpr::Of(e) => {
                out.push(0x54);
                e.write_canonical(out);
            }
            WhiskerLeftExpr::Whisker(f, e) => {
                out.push(0x55);
                f.write_canonical(out);
                e.write_canonical(out);
            }
        }
    }
}

impl Canonicalizable for NormalExpr {
    fn write_canonical(&self, out: &mut Vec<u8>) {
        let mut cur = self;
        loop {
            match cur {
                NormalExpr::Nil(alpha) => {
                    out.push(0x60);
                    alpha.write_canonical(out);
                    return;
                }
                NormalExpr::Cons(alpha, eta, rest) => {
                    out.push(0x61);
                    alpha.write_canonical(out);
                    eta.write_canonical(out);
                    cur = &**rest;
                }
            }
        }
    }
}

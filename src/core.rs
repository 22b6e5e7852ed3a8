//! Object terms of the free monoid the engine normalizes over.
//!
//! A [`Mor1`] is the classified form of a host object term: the unit, a
//! binary tensor, or an opaque leaf. The morphisms being normalized act between
//! these terms, and every domain/codomain computed by the engine is a `Mor1`.
//!
//! # Invariants
//! - `Mor1` values are immutable once classified.
//! - `to_list` forgets bracketing and units: `(a ⊗ b) ⊗ c`, `a ⊗ (b ⊗ c)` and
//!   `a ⊗ (𝟙 ⊗ (b ⊗ c))` all flatten to `[a, b, c]`.
//! - Syntactic equality of `Mor1` is the equality used for composability
//!   checks; it is *not* taken up to associativity.
//!
//! # Citations
//! - Free monoids and coherence: Mac Lane, "Natural associativity and commutativity" (1963)

use crate::fingerprint::{Canonicalizable, HashValue};
use crate::host::MonoidalStructure;
use crate::term::Term;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque atomic object term.
///
/// Equality is syntactic equality of the (unfolded) host term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Atom1 {
    /// The host term this leaf stands for.
    pub term: Term,
}

impl Atom1 {
    #[inline]
    pub fn new(term: Term) -> Self {
        Self { term }
    }
}

impl fmt::Display for Atom1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.term)
    }
}

/// Classified object term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mor1 {
    /// The tensor unit.
    Unit,
    /// `f ⊗ g`.
    Tensor(Box<Mor1>, Box<Mor1>),
    /// An opaque atom.
    Leaf(Atom1),
}

impl Mor1 {
    #[inline]
    pub fn tensor(f: Mor1, g: Mor1) -> Self {
        Mor1::Tensor(Box::new(f), Box::new(g))
    }

    #[inline]
    pub fn leaf(term: Term) -> Self {
        Mor1::Leaf(Atom1::new(term))
    }

    /// Returns `true` for the unit object.
    #[inline]
    pub fn is_unit(&self) -> bool {
        matches!(self, Mor1::Unit)
    }

    /// Ordered list of atoms with bracketing and units forgotten.
    pub fn to_list(&self) -> Vec<&Atom1> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(m) = stack.pop() {
            match m {
                Mor1::Unit => {}
                Mor1::Tensor(f, g) => {
                    stack.push(g);
                    stack.push(f);
                }
                Mor1::Leaf(a) => out.push(a),
            }
        }
        out
    }

    /// Nesting depth of tensors (0 for a leaf or the unit).
    pub fn depth(&self) -> usize {
        match self {
            Mor1::Unit | Mor1::Leaf(_) => 0,
            Mor1::Tensor(f, g) => 1 + f.depth().max(g.depth()),
        }
    }

    /// Rebuilds the host object term.
    pub fn to_term(&self, structure: &MonoidalStructure) -> Term {
        match self {
            Mor1::Unit => structure.unit_term(),
            Mor1::Tensor(f, g) => Term::tensor(f.to_term(structure), g.to_term(structure)),
            Mor1::Leaf(a) => a.term.clone(),
        }
    }
}

impl fmt::Display for Mor1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mor1::Unit => write!(f, "𝟙"),
            Mor1::Tensor(a, b) => write!(f, "({} ⊗ {})", a, b),
            Mor1::Leaf(a) => write!(f, "{}", a),
        }
    }
}

/// An atomic non-structural morphism together with its boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Atom {
    /// The host term, as exposed by the host's head unfolding.
    pub term: Term,
    /// Domain.
    pub src: Mor1,
    /// Codomain.
    pub tgt: Mor1,
}

impl Atom {
    pub fn new(term: Term, src: Mor1, tgt: Mor1) -> Self {
        Self { term, src, tgt }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {} ⟶ {}", self.term, self.src, self.tgt)
    }
}

impl Canonicalizable for Atom1 {
    fn write_canonical(&self, out: &mut Vec<u8>) {
        out.push(0x20);
        self.term.write_canonical(out);
    }
}

impl Canonicalizable for Mor1 {
    fn write_canonical(&self, out: &mut Vec<u8>) {
        match self {
            Mor1::Unit => out.push(0x21),
            Mor1::Tensor(f, g) => {
                out.push(0x22);
                f.write_canonical(out);
                g.write_canonical(out);
            }
            Mor1::Leaf(a) => {
                out.push(0x23);
                a.write_canonical(out);
            }
        }
    }
}

impl Canonicalizable for Atom {
    fn write_canonical(&self, out: &mut Vec<u8>) {
        out.push(0x24);
        self.term.write_canonical(out);
        self.src.write_canonical(out);
        self.tgt.write_canonical(out);
    }
}

impl Atom {
    /// Fingerprint under the term domain; stable across runs.
    pub fn fingerprint(&self) -> HashValue {
        self.fingerprint_in(crate::fingerprint::DOMAIN_TERM_V0)
    }
}

//! Host expression language.
//!
//! `Term` is the surface syntax the normalizer consumes: object terms and
//! morphism terms share one tree type, and which one a term denotes is decided
//! by inference in the [`Host`](crate::host::Host). The engine never inspects a
//! `Term` directly; it asks the host to unfold it and then matches the exposed
//! top-level operator.
//!
//! # Notation
//! `Display` renders terms in the usual categorical notation: `≫` for
//! composition, `⊗` for tensor, `◁`/`▷` for left/right whiskering, `α`, `λ`, `ρ`
//! for the associator and unitors, `⊗𝟙` for derived coherence isomorphisms and
//! `⊗≫` for composition up to coherence.
//!
//! # Citations
//! - Mac Lane, "Categories for the Working Mathematician", Chapter VII (1998)

use crate::fingerprint::{write_bytes, Canonicalizable, HashValue, DOMAIN_TERM_V0};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Interned-by-sharing name of a declared constant or category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Creates a symbol from any string-like value.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Returns the symbol text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

/// A host expression: either an object term or a morphism term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// A declared object, generator morphism, or definition.
    Const(Symbol),
    /// The tensor unit `𝟙_C` of the named category.
    Unit(Symbol),
    /// `X ⊗ Y` on objects, or the tensor of morphisms `f ⊗ g`.
    Tensor(Box<Term>, Box<Term>),
    /// `𝟙 X`.
    Id(Box<Term>),
    /// `f ≫ g`.
    Comp(Box<Term>, Box<Term>),
    /// `X ◁ f`.
    WhiskerLeft(Box<Term>, Box<Term>),
    /// `f ▷ X`.
    WhiskerRight(Box<Term>, Box<Term>),
    /// `α X Y Z : (X ⊗ Y) ⊗ Z ⟶ X ⊗ (Y ⊗ Z)`.
    Associator(Box<Term>, Box<Term>, Box<Term>),
    /// `α⁻¹ X Y Z : X ⊗ (Y ⊗ Z) ⟶ (X ⊗ Y) ⊗ Z`.
    AssociatorInv(Box<Term>, Box<Term>, Box<Term>),
    /// `λ X : 𝟙 ⊗ X ⟶ X`.
    LeftUnitor(Box<Term>),
    /// `λ⁻¹ X : X ⟶ 𝟙 ⊗ X`.
    LeftUnitorInv(Box<Term>),
    /// `ρ X : X ⊗ 𝟙 ⟶ X`.
    RightUnitor(Box<Term>),
    /// `ρ⁻¹ X : X ⟶ X ⊗ 𝟙`.
    RightUnitorInv(Box<Term>),
    /// Derived coherence isomorphism `⊗𝟙 : X ⟶ Y`.
    Coherence(Box<Term>, Box<Term>),
    /// Composition up to coherence, `f ⊗≫ g = f ≫ ⊗𝟙 ≫ g`.
    MonoidalComp(Box<Term>, Box<Term>),
}

impl Term {
    pub fn constant(name: impl AsRef<str>) -> Self {
        Term::Const(Symbol::new(name))
    }

    pub fn unit(category: impl AsRef<str>) -> Self {
        Term::Unit(Symbol::new(category))
    }

    pub fn tensor(a: Term, b: Term) -> Self {
        Term::Tensor(Box::new(a), Box::new(b))
    }

    pub fn id(x: Term) -> Self {
        Term::Id(Box::new(x))
    }

    pub fn comp(f: Term, g: Term) -> Self {
        Term::Comp(Box::new(f), Box::new(g))
    }

    pub fn whisker_left(x: Term, f: Term) -> Self {
        Term::WhiskerLeft(Box::new(x), Box::new(f))
    }

    pub fn whisker_right(f: Term, x: Term) -> Self {
        Term::WhiskerRight(Box::new(f), Box::new(x))
    }

    pub fn associator(x: Term, y: Term, z: Term) -> Self {
        Term::Associator(Box::new(x), Box::new(y), Box::new(z))
    }

    pub fn associator_inv(x: Term, y: Term, z: Term) -> Self {
        Term::AssociatorInv(Box::new(x), Box::new(y), Box::new(z))
    }

    pub fn left_unitor(x: Term) -> Self {
        Term::LeftUnitor(Box::new(x))
    }

    pub fn left_unitor_inv(x: Term) -> Self {
        Term::LeftUnitorInv(Box::new(x))
    }

    pub fn right_unitor(x: Term) -> Self {
        Term::RightUnitor(Box::new(x))
    }

    pub fn right_unitor_inv(x: Term) -> Self {
        Term::RightUnitorInv(Box::new(x))
    }

    pub fn coherence(x: Term, y: Term) -> Self {
        Term::Coherence(Box::new(x), Box::new(y))
    }

    pub fn monoidal_comp(f: Term, g: Term) -> Self {
        Term::MonoidalComp(Box::new(f), Box::new(g))
    }

    /// Right-nested composite `f₀ ≫ (f₁ ≫ (… ≫ fₙ))`.
    ///
    /// Returns `None` for an empty iterator.
    pub fn comp_all<I>(parts: I) -> Option<Term>
    where
        I: IntoIterator<Item = Term>,
        I::IntoIter: DoubleEndedIterator,
    {
        let mut iter = parts.into_iter().rev();
        let last = iter.next()?;
        Some(iter.fold(last, |acc, t| Term::comp(t, acc)))
    }

    /// Left-nested tensor `((x₀ ⊗ x₁) ⊗ …) ⊗ xₙ`.
    pub fn tensor_all<I>(parts: I) -> Option<Term>
    where
        I: IntoIterator<Item = Term>,
    {
        let mut iter = parts.into_iter();
        let first = iter.next()?;
        Some(iter.fold(first, Term::tensor))
    }

    /// Number of nodes in the term tree.
    pub fn size(&self) -> usize {
        match self {
            Term::Const(_) | Term::Unit(_) => 1,
            Term::Id(x)
            | Term::LeftUnitor(x)
            | Term::LeftUnitorInv(x)
            | Term::RightUnitor(x)
            | Term::RightUnitorInv(x) => 1 + x.size(),
            Term::Tensor(a, b)
            | Term::Comp(a, b)
            | Term::WhiskerLeft(a, b)
            | Term::WhiskerRight(a, b)
            | Term::Coherence(a, b)
            | Term::MonoidalComp(a, b) => 1 + a.size() + b.size(),
            Term::Associator(x, y, z) | Term::AssociatorInv(x, y, z) => {
                1 + x.size() + y.size() + z.size()
            }
        }
    }

    /// Fingerprint of the canonical encoding under [`DOMAIN_TERM_V0`].
    pub fn fingerprint(&self) -> HashValue {
        self.fingerprint_in(DOMAIN_TERM_V0)
    }
}

impl Canonicalizable for Term {
    fn write_canonical(&self, out: &mut Vec<u8>) {
        let (tag, children): (u8, Vec<&Term>) = match self {
            Term::Const(s) => {
                out.push(0x01);
                write_bytes(out, s.as_str().as_bytes());
                return;
            }
            Term::Unit(c) => {
                out.push(0x02);
                write_bytes(out, c.as_str().as_bytes());
                return;
            }
            Term::Tensor(a, b) => (0x03, vec![&**a, &**b]),
            Term::Id(x) => (0x04, vec![&**x]),
            Term::Comp(a, b) => (0x05, vec![&**a, &**b]),
            Term::WhiskerLeft(a, b) => (0x06, vec![&**a, &**b]),
            Term::WhiskerRight(a, b) => (0x07, vec![&**a, &**b]),
            Term::Associator(x, y, z) => (0x08, vec![&**x, &**y, &**z]),
            Term::AssociatorInv(x, y, z) => (0x09, vec![&**x, &**y, &**z]),
            Term::LeftUnitor(x) => (0x0a, vec![&**x]),
            Term::LeftUnitorInv(x) => (0x0b, vec![&**x]),
            Term::RightUnitor(x) => (0x0c, vec![&**x]),
            Term::RightUnitorInv(x) => (0x0d, vec![&**x]),
            Term::Coherence(a, b) => (0x0e, vec![&**a, &**b]),
            Term::MonoidalComp(a, b) => (0x0f, vec![&**a, &**b]),
        };
        out.push(tag);
        for child in children {
            child.write_canonical(out);
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Const(s) => write!(f, "{}", s),
            Term::Unit(c) => write!(f, "𝟙_{}", c),
            Term::Tensor(a, b) => write!(f, "({} ⊗ {})", a, b),
            Term::Id(x) => write!(f, "𝟙({})", x),
            Term::Comp(a, b) => write!(f, "({} ≫ {})", a, b),
            Term::WhiskerLeft(x, a) => write!(f, "({} ◁ {})", x, a),
            Term::WhiskerRight(a, x) => write!(f, "({} ▷ {})", a, x),
            Term::Associator(x, y, z) => write!(f, "α({}, {}, {})", x, y, z),
            Term::AssociatorInv(x, y, z) => write!(f, "α⁻¹({}, {}, {})", x, y, z),
            Term::LeftUnitor(x) => write!(f, "λ({})", x),
            Term::LeftUnitorInv(x) => write!(f, "λ⁻¹({})", x),
            Term::RightUnitor(x) => write!(f, "ρ({})", x),
            Term::RightUnitorInv(x) => write!(f, "ρ⁻¹({})", x),
            Term::Coherence(x, y) => write!(f, "⊗𝟙({}, {})", x, y),
            Term::MonoidalComp(a, b) => write!(f, "({} ⊗≫ {})", a, b),
        }
    }
}

//! The upstream collaborator: term inspection and typing queries.
//!
//! The normalizer does not own a type checker. Everything it needs to know
//! about a host term is asked through [`Host`]: how to expose its top-level
//! operator, whether two terms are definitionally equal, what a morphism's
//! domain and codomain are, which category an object lives in, and whether that
//! category carries a monoidal structure.
//!
//! Implementations must be total and deterministic within one normalization
//! run. Shape queries answer "no match" (`None`/`false`) rather than failing.
//!
//! # Citations
//! - Lawvere, "Functorial semantics of algebraic theories" (1963) – theories as structure
//! - Mac Lane, "Categories for the Working Mathematician", Section VII.1 (1998) – monoidal categories

use crate::term::{Symbol, Term};
use serde::{Deserialize, Serialize};

/// The ambient monoidal structure a normalization run works in.
///
/// Object classification only recognizes units and tensors that belong to
/// this structure's category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonoidalStructure {
    /// The category carrying the structure.
    pub category: Symbol,
}

impl MonoidalStructure {
    pub fn new(category: impl Into<Symbol>) -> Self {
        Self {
            category: category.into(),
        }
    }

    /// The unit object `𝟙_C` as a host term.
    pub fn unit_term(&self) -> Term {
        Term::Unit(self.category.clone())
    }
}

/// Queries the normalizer issues against the host environment.
pub trait Host {
    /// Unfolds definitions at the head of `e` until its top-level operator is
    /// not a definition.
    ///
    /// Returns `e` itself when nothing unfolds.
    fn whnf<'a>(&'a self, e: &'a Term) -> &'a Term;

    /// Decides definitional equality of two terms.
    fn def_eq(&self, a: &Term, b: &Term) -> bool;

    /// Infers `(domain, codomain)` of a morphism term.
    ///
    /// Returns `None` when `e` is not a well-typed morphism.
    fn infer_hom(&self, e: &Term) -> Option<(Term, Term)>;

    /// Infers the category an object term lives in.
    ///
    /// Returns `None` when `e` is not a well-formed object term.
    fn infer_category(&self, e: &Term) -> Option<Symbol>;

    /// Looks up the monoidal structure on `category`, if any.
    fn monoidal_structure(&self, category: &Symbol) -> Option<MonoidalStructure>;
}

impl<H: Host + ?Sized> Host for &H {
    fn whnf<'a>(&'a self, e: &'a Term) -> &'a Term {
        (**self).whnf(e)
    }

    fn def_eq(&self, a: &Term, b: &Term) -> bool {
        (**self).def_eq(a, b)
    }

    fn infer_hom(&self, e: &Term) -> Option<(Term, Term)> {
        (**self).infer_hom(e)
    }

    fn infer_category(&self, e: &Term) -> Option<Symbol> {
        (**self).infer_category(e)
    }

    fn monoidal_structure(&self, category: &Symbol) -> Option<MonoidalStructure> {
        (**self).monoidal_structure(category)
    }
}

//! A concrete host: declared categories, objects, generators and definitions.
//!
//! `Signature` is the reference implementation of [`Host`]. It plays the role
//! of the ambient environment a normalization request is checked against:
//! - categories, each with or without a monoidal structure;
//! - objects, each living in one category;
//! - generator morphisms with declared domain and codomain;
//! - definitions (abbreviations) that unfold to previously declared terms.
//!
//! Definitional equality is syntactic equality after full unfolding. Because a
//! definition may only mention names declared before it, unfolding always
//! terminates.
//!
//! # Citations
//! - Signatures for monoidal theories: Joyal & Street, "The geometry of tensor calculus I" (1991)
//! - δ-reduction and weak head normal form: Barendregt, "The Lambda Calculus", Chapter 3 (1984)

use crate::host::{Host, MonoidalStructure};
use crate::term::{Symbol, Term};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error type for signature construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureError {
    /// A name is already declared.
    DuplicateName(Symbol),
    /// Referenced category is not declared.
    UnknownCategory(Symbol),
    /// A term expected to be an object is not a well-formed object term.
    NotAnObject(Term),
    /// Domain and codomain of a generator live in different categories.
    CategoryMismatch {
        /// Category of the domain.
        src: Symbol,
        /// Category of the codomain.
        tgt: Symbol,
    },
    /// A definition body is neither a well-formed object nor a well-typed morphism.
    IllTypedDefinition(Symbol),
}

impl std::fmt::Display for SignatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignatureError::DuplicateName(name) => write!(f, "name `{}` is already declared", name),
            SignatureError::UnknownCategory(name) => write!(f, "unknown category `{}`", name),
            SignatureError::NotAnObject(term) => write!(f, "`{}` is not an object term", term),
            SignatureError::CategoryMismatch { src, tgt } => write!(
                f,
                "domain lives in category `{}` but codomain lives in `{}`",
                src, tgt
            ),
            SignatureError::IllTypedDefinition(name) => {
                write!(f, "definition `{}` has an ill-typed body", name)
            }
        }
    }
}

impl std::error::Error for SignatureError {}

/// Declared category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct CategoryDecl {
    monoidal: bool,
}

/// Environment of declarations that answers host queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Signature {
    categories: BTreeMap<Symbol, CategoryDecl>,
    /// Object name → category.
    objects: BTreeMap<Symbol, Symbol>,
    /// Generator name → (domain, codomain).
    morphisms: BTreeMap<Symbol, (Term, Term)>,
    definitions: BTreeMap<Symbol, Term>,
}

impl Signature {
    /// Creates an empty signature.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a category, optionally carrying a monoidal structure.
    pub fn declare_category(
        &mut self,
        name: impl Into<Symbol>,
        monoidal: bool,
    ) -> Result<(), SignatureError> {
        let name = name.into();
        if self.categories.contains_key(&name) {
            return Err(SignatureError::DuplicateName(name));
        }
        self.categories.insert(name, CategoryDecl { monoidal });
        Ok(())
    }

    /// Declares an object of `category` and returns it as a term.
    pub fn declare_object(
        &mut self,
        name: impl Into<Symbol>,
        category: impl Into<Symbol>,
    ) -> Result<Term, SignatureError> {
        let name = name.into();
        let category = category.into();
        self.ensure_fresh(&name)?;
        if !self.categories.contains_key(&category) {
            return Err(SignatureError::UnknownCategory(category));
        }
        self.objects.insert(name.clone(), category);
        Ok(Term::Const(name))
    }

    /// Declares a generator morphism `name : src ⟶ tgt` and returns it as a term.
    pub fn declare_morphism(
        &mut self,
        name: impl Into<Symbol>,
        src: Term,
        tgt: Term,
    ) -> Result<Term, SignatureError> {
        let name = name.into();
        self.ensure_fresh(&name)?;
        let src_cat = self
            .infer_category(&src)
            .ok_or_else(|| SignatureError::NotAnObject(src.clone()))?;
        let tgt_cat = self
            .infer_category(&tgt)
            .ok_or_else(|| SignatureError::NotAnObject(tgt.clone()))?;
        if src_cat != tgt_cat {
            return Err(SignatureError::CategoryMismatch {
                src: src_cat,
                tgt: tgt_cat,
            });
        }
        self.morphisms.insert(name.clone(), (src, tgt));
        Ok(Term::Const(name))
    }

    /// Declares `name := body` and returns `name` as a term.
    ///
    /// `body` must be a well-formed object or a well-typed morphism over the
    /// declarations made so far.
    pub fn define(&mut self, name: impl Into<Symbol>, body: Term) -> Result<Term, SignatureError> {
        let name = name.into();
        self.ensure_fresh(&name)?;
        if self.infer_category(&body).is_none() && self.infer_hom(&body).is_none() {
            return Err(SignatureError::IllTypedDefinition(name));
        }
        self.definitions.insert(name.clone(), body);
        Ok(Term::Const(name))
    }

    /// Returns `true` if `name` is declared as an object, generator or definition.
    pub fn contains(&self, name: &Symbol) -> bool {
        self.objects.contains_key(name)
            || self.morphisms.contains_key(name)
            || self.definitions.contains_key(name)
    }

    /// Replaces every definition occurring anywhere in `e` by its body.
    pub fn unfold_all(&self, e: &Term) -> Term {
        let unfold = |t: &Box<Term>| Box::new(self.unfold_all(t));
        match self.whnf(e) {
            Term::Const(s) => Term::Const(s.clone()),
            Term::Unit(c) => Term::Unit(c.clone()),
            Term::Tensor(a, b) => Term::Tensor(unfold(a), unfold(b)),
            Term::Id(x) => Term::Id(unfold(x)),
            Term::Comp(a, b) => Term::Comp(unfold(a), unfold(b)),
            Term::WhiskerLeft(x, a) => Term::WhiskerLeft(unfold(x), unfold(a)),
            Term::WhiskerRight(a, x) => Term::WhiskerRight(unfold(a), unfold(x)),
            Term::Associator(x, y, z) => Term::Associator(unfold(x), unfold(y), unfold(z)),
            Term::AssociatorInv(x, y, z) => Term::AssociatorInv(unfold(x), unfold(y), unfold(z)),
            Term::LeftUnitor(x) => Term::LeftUnitor(unfold(x)),
            Term::LeftUnitorInv(x) => Term::LeftUnitorInv(unfold(x)),
            Term::RightUnitor(x) => Term::RightUnitor(unfold(x)),
            Term::RightUnitorInv(x) => Term::RightUnitorInv(unfold(x)),
            Term::Coherence(x, y) => Term::Coherence(unfold(x), unfold(y)),
            Term::MonoidalComp(a, b) => Term::MonoidalComp(unfold(a), unfold(b)),
        }
    }

    fn ensure_fresh(&self, name: &Symbol) -> Result<(), SignatureError> {
        if self.contains(name) {
            Err(SignatureError::DuplicateName(name.clone()))
        } else {
            Ok(())
        }
    }

    fn is_monoidal(&self, category: &Symbol) -> bool {
        self.categories
            .get(category)
            .map(|decl| decl.monoidal)
            .unwrap_or(false)
    }

    /// Category of an object term, provided that category is monoidal.
    fn monoidal_category(&self, x: &Term) -> Option<Symbol> {
        self.infer_category(x).filter(|c| self.is_monoidal(c))
    }

    /// Category shared by all `objects`, provided it is monoidal.
    fn common_monoidal_category(&self, objects: &[&Term]) -> Option<Symbol> {
        let mut common: Option<Symbol> = None;
        for x in objects {
            let c = self.monoidal_category(x)?;
            match &common {
                Some(prev) if *prev != c => return None,
                _ => common = Some(c),
            }
        }
        common
    }

    /// Flattened non-unit atoms of an object term, unfolded.
    fn object_atoms(&self, x: &Term, out: &mut Vec<Term>) {
        match self.whnf(x) {
            Term::Unit(_) => {}
            Term::Tensor(a, b) => {
                self.object_atoms(a, out);
                self.object_atoms(b, out);
            }
            other => out.push(self.unfold_all(other)),
        }
    }

    fn coherent(&self, x: &Term, y: &Term) -> bool {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        self.object_atoms(x, &mut xs);
        self.object_atoms(y, &mut ys);
        xs == ys
    }

    /// Domain of a morphism and the monoidal category it lives in.
    fn hom_in_monoidal(&self, f: &Term) -> Option<(Term, Term, Symbol)> {
        let (s, t) = self.infer_hom(f)?;
        let c = self.monoidal_category(&s)?;
        Some((s, t, c))
    }
}

impl Host for Signature {
    fn whnf<'a>(&'a self, e: &'a Term) -> &'a Term {
        let mut current = e;
        while let Term::Const(name) = current {
            match self.definitions.get(name) {
                Some(body) => current = body,
                None => break,
            }
        }
        current
    }

    fn def_eq(&self, a: &Term, b: &Term) -> bool {
        a == b || self.unfold_all(a) == self.unfold_all(b)
    }

    fn infer_hom(&self, e: &Term) -> Option<(Term, Term)> {
        match self.whnf(e) {
            Term::Const(name) => self.morphisms.get(name).cloned(),
            Term::Unit(_) => None,
            Term::Id(x) => {
                self.infer_category(x)?;
                Some(((**x).clone(), (**x).clone()))
            }
            Term::Comp(a, b) => {
                let (sa, ta) = self.infer_hom(a)?;
                let (sb, tb) = self.infer_hom(b)?;
                self.def_eq(&ta, &sb).then_some((sa, tb))
            }
            Term::WhiskerLeft(x, f) => {
                let (s, t, c) = self.hom_in_monoidal(f)?;
                (self.infer_category(x)? == c).then(|| {
                    (
                        Term::tensor((**x).clone(), s),
                        Term::tensor((**x).clone(), t),
                    )
                })
            }
            Term::WhiskerRight(f, x) => {
                let (s, t, c) = self.hom_in_monoidal(f)?;
                (self.infer_category(x)? == c).then(|| {
                    (
                        Term::tensor(s, (**x).clone()),
                        Term::tensor(t, (**x).clone()),
                    )
                })
            }
            Term::Tensor(f, g) => {
                let (sf, tf, cf) = self.hom_in_monoidal(f)?;
                let (sg, tg, cg) = self.hom_in_monoidal(g)?;
                (cf == cg).then(|| (Term::tensor(sf, sg), Term::tensor(tf, tg)))
            }
            Term::Associator(x, y, z) => {
                self.common_monoidal_category(&[&**x, &**y, &**z])?;
                let (x, y, z) = ((**x).clone(), (**y).clone(), (**z).clone());
                Some((
                    Term::tensor(Term::tensor(x.clone(), y.clone()), z.clone()),
                    Term::tensor(x, Term::tensor(y, z)),
                ))
            }
            Term::AssociatorInv(x, y, z) => {
                self.common_monoidal_category(&[&**x, &**y, &**z])?;
                let (x, y, z) = ((**x).clone(), (**y).clone(), (**z).clone());
                Some((
                    Term::tensor(x.clone(), Term::tensor(y.clone(), z.clone())),
                    Term::tensor(Term::tensor(x, y), z),
                ))
            }
            Term::LeftUnitor(x) => {
                let c = self.monoidal_category(x)?;
                Some((Term::tensor(Term::Unit(c), (**x).clone()), (**x).clone()))
            }
            Term::LeftUnitorInv(x) => {
                let c = self.monoidal_category(x)?;
                Some(((**x).clone(), Term::tensor(Term::Unit(c), (**x).clone())))
            }
            Term::RightUnitor(x) => {
                let c = self.monoidal_category(x)?;
                Some((Term::tensor((**x).clone(), Term::Unit(c)), (**x).clone()))
            }
            Term::RightUnitorInv(x) => {
                let c = self.monoidal_category(x)?;
                Some(((**x).clone(), Term::tensor((**x).clone(), Term::Unit(c))))
            }
            Term::Coherence(x, y) => {
                self.common_monoidal_category(&[&**x, &**y])?;
                self.coherent(x, y)
                    .then(|| ((**x).clone(), (**y).clone()))
            }
            Term::MonoidalComp(f, g) => {
                let (sf, tf, cf) = self.hom_in_monoidal(f)?;
                let (sg, tg, cg) = self.hom_in_monoidal(g)?;
                (cf == cg && self.coherent(&tf, &sg)).then_some((sf, tg))
            }
        }
    }

    fn infer_category(&self, e: &Term) -> Option<Symbol> {
        match self.whnf(e) {
            Term::Const(name) => self.objects.get(name).cloned(),
            Term::Unit(c) => self.is_monoidal(c).then(|| c.clone()),
            Term::Tensor(a, b) => {
                let ca = self.monoidal_category(a)?;
                let cb = self.monoidal_category(b)?;
                (ca == cb).then_some(ca)
            }
            _ => None,
        }
    }

    fn monoidal_structure(&self, category: &Symbol) -> Option<MonoidalStructure> {
        self.is_monoidal(category)
            .then(|| MonoidalStructure::new(category.clone()))
    }
}

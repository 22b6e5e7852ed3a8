//! Structural isomorphisms: associators, unitors and their composites.
//!
//! A [`Structural`] term is built only from [`StructuralAtom`]s, identities,
//! composition and whiskering. Every such term is invertible, and any two
//! parallel ones are equal in every monoidal category (Mac Lane coherence), so
//! the engine is free to simplify them as long as domain and codomain are kept.
//!
//! Smart constructors ([`Structural::comp`], [`Structural::whisker_left`],
//! [`Structural::whisker_right`]) drop identities, flatten composites into a
//! right-nested chain and cancel adjacent inverse pairs. The plain constructors
//! ([`Structural::comp_raw`] and friends) only check composability.
//!
//! # Panics
//! Composing terms whose codomain and domain differ is an internal invariant
//! violation and panics.

use crate::core::Mor1;
use crate::fingerprint::Canonicalizable;
use crate::host::MonoidalStructure;
use crate::term::Term;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive structural isomorphisms over object terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructuralAtom {
    /// `α f g h : (f ⊗ g) ⊗ h ⟶ f ⊗ (g ⊗ h)`.
    Associator(Mor1, Mor1, Mor1),
    /// `α⁻¹ f g h : f ⊗ (g ⊗ h) ⟶ (f ⊗ g) ⊗ h`.
    AssociatorInv(Mor1, Mor1, Mor1),
    /// `λ f : 𝟙 ⊗ f ⟶ f`.
    LeftUnitor(Mor1),
    /// `λ⁻¹ f : f ⟶ 𝟙 ⊗ f`.
    LeftUnitorInv(Mor1),
    /// `ρ f : f ⊗ 𝟙 ⟶ f`.
    RightUnitor(Mor1),
    /// `ρ⁻¹ f : f ⟶ f ⊗ 𝟙`.
    RightUnitorInv(Mor1),
    /// A derived coherence isomorphism between two bracketings of the same atoms.
    Coherence { src: Mor1, tgt: Mor1 },
}

impl StructuralAtom {
    pub fn src(&self) -> Mor1 {
        match self {
            StructuralAtom::Associator(f, g, h) => {
                Mor1::tensor(Mor1::tensor(f.clone(), g.clone()), h.clone())
            }
            StructuralAtom::AssociatorInv(f, g, h) => {
                Mor1::tensor(f.clone(), Mor1::tensor(g.clone(), h.clone()))
            }
            StructuralAtom::LeftUnitor(f) => Mor1::tensor(Mor1::Unit, f.clone()),
            StructuralAtom::RightUnitor(f) => Mor1::tensor(f.clone(), Mor1::Unit),
            StructuralAtom::LeftUnitorInv(f) | StructuralAtom::RightUnitorInv(f) => f.clone(),
            StructuralAtom::Coherence { src, .. } => src.clone(),
        }
    }

    pub fn tgt(&self) -> Mor1 {
        self.inverse().src()
    }

    /// The inverse isomorphism.
    pub fn inverse(&self) -> StructuralAtom {
        match self {
            StructuralAtom::Associator(f, g, h) => {
                StructuralAtom::AssociatorInv(f.clone(), g.clone(), h.clone())
            }
            StructuralAtom::AssociatorInv(f, g, h) => {
                StructuralAtom::Associator(f.clone(), g.clone(), h.clone())
            }
            StructuralAtom::LeftUnitor(f) => StructuralAtom::LeftUnitorInv(f.clone()),
            StructuralAtom::LeftUnitorInv(f) => StructuralAtom::LeftUnitor(f.clone()),
            StructuralAtom::RightUnitor(f) => StructuralAtom::RightUnitorInv(f.clone()),
            StructuralAtom::RightUnitorInv(f) => StructuralAtom::RightUnitor(f.clone()),
            StructuralAtom::Coherence { src, tgt } => StructuralAtom::Coherence {
                src: tgt.clone(),
                tgt: src.clone(),
            },
        }
    }

    /// Rebuilds the host term.
    pub fn to_term(&self, structure: &MonoidalStructure) -> Term {
        let t = |m: &Mor1| m.to_term(structure);
        match self {
            StructuralAtom::Associator(f, g, h) => Term::associator(t(f), t(g), t(h)),
            StructuralAtom::AssociatorInv(f, g, h) => Term::associator_inv(t(f), t(g), t(h)),
            StructuralAtom::LeftUnitor(f) => Term::left_unitor(t(f)),
            StructuralAtom::LeftUnitorInv(f) => Term::left_unitor_inv(t(f)),
            StructuralAtom::RightUnitor(f) => Term::right_unitor(t(f)),
            StructuralAtom::RightUnitorInv(f) => Term::right_unitor_inv(t(f)),
            StructuralAtom::Coherence { src, tgt } => Term::coherence(t(src), t(tgt)),
        }
    }
}

impl fmt::Display for StructuralAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralAtom::Associator(a, b, c) => write!(f, "α({}, {}, {})", a, b, c),
            StructuralAtom::AssociatorInv(a, b, c) => write!(f, "α⁻¹({}, {}, {})", a, b, c),
            StructuralAtom::LeftUnitor(a) => write!(f, "λ({})", a),
            StructuralAtom::LeftUnitorInv(a) => write!(f, "λ⁻¹({})", a),
            StructuralAtom::RightUnitor(a) => write!(f, "ρ({})", a),
            StructuralAtom::RightUnitorInv(a) => write!(f, "ρ⁻¹({})", a),
            StructuralAtom::Coherence { src, tgt } => write!(f, "⊗𝟙({}, {})", src, tgt),
        }
    }
}

/// A term built only from structural isomorphisms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Structural {
    Atom(StructuralAtom),
    /// `𝟙 f`.
    Id(Mor1),
    /// `α ≫ β`.
    Comp(Box<Structural>, Box<Structural>),
    /// `f ◁ α`.
    WhiskerLeft(Mor1, Box<Structural>),
    /// `α ▷ f`.
    WhiskerRight(Box<Structural>, Mor1),
}

impl Structural {
    #[inline]
    pub fn id(f: Mor1) -> Self {
        Structural::Id(f)
    }

    /// Wraps an atom, collapsing a coherence isomorphism with equal ends to an
    /// identity.
    pub fn atom(atom: StructuralAtom) -> Self {
        match atom {
            StructuralAtom::Coherence { src, tgt } if src == tgt => Structural::Id(src),
            atom => Structural::Atom(atom),
        }
    }

    pub fn src(&self) -> Mor1 {
        match self {
            Structural::Atom(a) => a.src(),
            Structural::Id(f) => f.clone(),
            Structural::Comp(a, _) => a.src(),
            Structural::WhiskerLeft(f, a) => Mor1::tensor(f.clone(), a.src()),
            Structural::WhiskerRight(a, f) => Mor1::tensor(a.src(), f.clone()),
        }
    }

    pub fn tgt(&self) -> Mor1 {
        match self {
            Structural::Atom(a) => a.tgt(),
            Structural::Id(f) => f.clone(),
            Structural::Comp(_, b) => b.tgt(),
            Structural::WhiskerLeft(f, a) => Mor1::tensor(f.clone(), a.tgt()),
            Structural::WhiskerRight(a, f) => Mor1::tensor(a.tgt(), f.clone()),
        }
    }

    #[inline]
    pub fn is_id(&self) -> bool {
        matches!(self, Structural::Id(_))
    }

    /// The inverse isomorphism.
    pub fn inverse(&self) -> Structural {
        match self {
            Structural::Atom(a) => Structural::Atom(a.inverse()),
            Structural::Id(f) => Structural::Id(f.clone()),
            Structural::Comp(a, b) => {
                Structural::Comp(Box::new(b.inverse()), Box::new(a.inverse()))
            }
            Structural::WhiskerLeft(f, a) => {
                Structural::WhiskerLeft(f.clone(), Box::new(a.inverse()))
            }
            Structural::WhiskerRight(a, f) => {
                Structural::WhiskerRight(Box::new(a.inverse()), f.clone())
            }
        }
    }

    /// Returns `true` if `self ≫ other` is syntactically an inverse pair.
    pub fn is_inverse_of(&self, other: &Structural) -> bool {
        !self.is_id() && self.inverse() == *other
    }

    /// `α ≫ β` without simplification.
    pub fn comp_raw(a: Structural, b: Structural) -> Self {
        assert_composable(&a, &b);
        Structural::Comp(Box::new(a), Box::new(b))
    }

    /// `f ◁ α` without simplification.
    pub fn whisker_left_raw(f: Mor1, a: Structural) -> Self {
        Structural::WhiskerLeft(f, Box::new(a))
    }

    /// `α ▷ f` without simplification.
    pub fn whisker_right_raw(a: Structural, f: Mor1) -> Self {
        Structural::WhiskerRight(Box::new(a), f)
    }

    /// `α ≫ β`, dropping identities and cancelling inverse pairs at the seam.
    ///
    /// The result is a right-nested chain, or `𝟙 (src α)` if every factor
    /// cancels.
    pub fn comp(a: Structural, b: Structural) -> Self {
        assert_composable(&a, &b);
        let src = a.src();
        let mut left = Vec::new();
        a.push_factors(&mut left);
        let mut right = Vec::new();
        b.push_factors(&mut right);
        for factor in right {
            match left.last() {
                Some(last) if last.is_inverse_of(&factor) => {
                    left.pop();
                }
                _ => left.push(factor),
            }
        }
        let mut iter = left.into_iter().rev();
        match iter.next() {
            None => Structural::Id(src),
            Some(last) => iter.fold(last, |acc, s| Structural::Comp(Box::new(s), Box::new(acc))),
        }
    }

    /// `f ◁ α`, with `f ◁ 𝟙 x = 𝟙 (f ⊗ x)`.
    pub fn whisker_left(f: Mor1, a: Structural) -> Self {
        match a {
            Structural::Id(x) => Structural::Id(Mor1::tensor(f, x)),
            a => Structural::WhiskerLeft(f, Box::new(a)),
        }
    }

    /// `α ▷ f`, with `𝟙 x ▷ f = 𝟙 (x ⊗ f)`.
    pub fn whisker_right(a: Structural, f: Mor1) -> Self {
        match a {
            Structural::Id(x) => Structural::Id(Mor1::tensor(x, f)),
            a => Structural::WhiskerRight(Box::new(a), f),
        }
    }

    /// Non-identity factors of a composite, left to right.
    fn push_factors(self, out: &mut Vec<Structural>) {
        match self {
            Structural::Id(_) => {}
            Structural::Comp(a, b) => {
                a.push_factors(out);
                b.push_factors(out);
            }
            other => out.push(other),
        }
    }

    /// Checks composability of every internal composite.
    pub fn is_well_formed(&self) -> bool {
        match self {
            Structural::Atom(_) | Structural::Id(_) => true,
            Structural::Comp(a, b) => a.tgt() == b.src() && a.is_well_formed() && b.is_well_formed(),
            Structural::WhiskerLeft(_, a) | Structural::WhiskerRight(a, _) => a.is_well_formed(),
        }
    }

    /// Rebuilds the host term.
    pub fn to_term(&self, structure: &MonoidalStructure) -> Term {
        match self {
            Structural::Atom(a) => a.to_term(structure),
            Structural::Id(f) => Term::id(f.to_term(structure)),
            Structural::Comp(a, b) => Term::comp(a.to_term(structure), b.to_term(structure)),
            Structural::WhiskerLeft(f, a) => {
                Term::whisker_left(f.to_term(structure), a.to_term(structure))
            }
            Structural::WhiskerRight(a, f) => {
                Term::whisker_right(a.to_term(structure), f.to_term(structure))
            }
        }
    }
}

fn assert_composable(a: &Structural, b: &Structural) {
    let (tgt, src) = (a.tgt(), b.src());
    assert!(
        tgt == src,
        "structural composition of non-composable terms: {} ⟶ {} then {} ⟶ {}",
        a.src(),
        tgt,
        src,
        b.tgt()
    );
}

impl fmt::Display for Structural {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Structural::Atom(a) => write!(f, "{}", a),
            Structural::Id(x) => write!(f, "𝟙({})", x),
            Structural::Comp(a, b) => write!(f, "({} ≫ {})", a, b),
            Structural::WhiskerLeft(x, a) => write!(f, "({} ◁ {})", x, a),
            Structural::WhiskerRight(a, x) => write!(f, "({} ▷ {})", a, x),
        }
    }
}

impl Canonicalizable for StructuralAtom {
    fn write_canonical(&self, out: &mut Vec<u8>) {
        match self {
            StructuralAtom::Associator(f, g, h) | StructuralAtom::AssociatorInv(f, g, h) => {
                out.push(if matches!(self, StructuralAtom::Associator(..)) {
                    0x30
                } else {
                    0x31
                });
                f.write_canonical(out);
                g.write_canonical(out);
                h.write_canonical(out);
            }
            StructuralAtom::LeftUnitor(f) => {
                out.push(0x32);
                f.write_canonical(out);
            }
            StructuralAtom::LeftUnitorInv(f) => {
                out.push(0x33);
                f.write_canonical(out);
            }
            StructuralAtom::RightUnitor(f) => {
                out.push(0x34);
                f.write_canonical(out);
            }
            StructuralAtom::RightUnitorInv(f) => {
                out.push(0x35);
                f.write_canonical(out);
            }
            StructuralAtom::Coherence { src, tgt } => {
                out.push(0x36);
                src.write_canonical(out);
                tgt.write_canonical(out);
            }
        }
    }
}

impl Canonicalizable for Structural {
    fn write_canonical(&self, out: &mut Vec<u8>) {
        match self {
            Structural::Atom(a) => {
                out.push(0x40);
                a.write_canonical(out);
            }
            Structural::Id(f) => {
                out.push(0x41);
                f.write_canonical(out);
            }
            Structural::Comp(a, b) => {
                out.push(0x42);
                a.write_canonical(out);
                b.write_canonical(out);
            }
            Structural::WhiskerLeft(f, a) => {
                out.push(0x43);
                f.write_canonical(out);
                a.write_canonical(out);
            }
            Structural::WhiskerRight(a, f) => {
                out.push(0x44);
                a.write_canonical(out);
                f.write_canonical(out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;

    fn leaf(name: &str) -> Mor1 {
        Mor1::leaf(Term::constant(name))
    }

    fn assoc() -> StructuralAtom {
        StructuralAtom::Associator(leaf("f"), leaf("g"), leaf("h"))
    }

    #[test]
    fn associator_boundaries() {
        let a = assoc();
        assert_eq!(a.src(), Mor1::tensor(Mor1::tensor(leaf("f"), leaf("g")), leaf("h")));
        assert_eq!(a.tgt(), Mor1::tensor(leaf("f"), Mor1::tensor(leaf("g"), leaf("h"))));
        assert_eq!(a.inverse().inverse(), a);
    }

    #[test]
    fn unitor_boundaries() {
        let l = StructuralAtom::LeftUnitor(leaf("x"));
        assert_eq!(l.src(), Mor1::tensor(Mor1::Unit, leaf("x")));
        assert_eq!(l.tgt(), leaf("x"));
        let r = StructuralAtom::RightUnitorInv(leaf("x"));
        assert_eq!(r.src(), leaf("x"));
        assert_eq!(r.tgt(), Mor1::tensor(leaf("x"), Mor1::Unit));
    }

    #[test]
    fn inverse_pair_cancels_to_identity() {
        let a = Structural::atom(assoc());
        let b = Structural::atom(assoc().inverse());
        let src = a.src();
        assert_eq!(Structural::comp(a, b), Structural::Id(src));
    }

    #[test]
    fn cancellation_cascades_through_nested_pairs() {
        let a = Structural::atom(assoc());
        let l = Structural::atom(StructuralAtom::LeftUnitorInv(a.tgt()));
        let left = Structural::comp(a.clone(), l.clone());
        let right = Structural::comp(l.inverse(), a.inverse());
        assert_eq!(Structural::comp(left, right), Structural::Id(a.src()));
    }

    #[test]
    fn identities_are_dropped_and_chain_is_right_nested() {
        let a = Structural::atom(assoc());
        let x = a.tgt();
        let l = Structural::atom(StructuralAtom::LeftUnitorInv(x.clone()));
        let r = Structural::atom(StructuralAtom::RightUnitorInv(l.tgt()));
        let left = Structural::comp(Structural::comp(a.clone(), Structural::id(x)), l.clone());
        let composite = Structural::comp(left, r.clone());
        assert_eq!(
            composite,
            Structural::Comp(
                Box::new(a),
                Box::new(Structural::Comp(Box::new(l), Box::new(r)))
            )
        );
        assert!(composite.is_well_formed());
    }

    #[test]
    fn whiskered_inverses_cancel() {
        let f = leaf("k");
        let a = Structural::whisker_left(f.clone(), Structural::atom(assoc()));
        let b = Structural::whisker_left(f, Structural::atom(assoc().inverse()));
        let src = a.src();
        assert_eq!(Structural::comp(a, b), Structural::Id(src));
    }

    #[test]
    fn whiskering_identity_is_identity() {
        let f = leaf("k");
        assert_eq!(
            Structural::whisker_left(f.clone(), Structural::id(leaf("x"))),
            Structural::Id(Mor1::tensor(f.clone(), leaf("x")))
        );
        assert_eq!(
            Structural::whisker_right(Structural::id(leaf("x")), f.clone()),
            Structural::Id(Mor1::tensor(leaf("x"), f))
        );
    }

    #[test]
    fn trivial_coherence_is_identity() {
        let x = Mor1::tensor(leaf("a"), leaf("b"));
        let c = Structural::atom(StructuralAtom::Coherence {
            src: x.clone(),
            tgt: x.clone(),
        });
        assert_eq!(c, Structural::Id(x));
    }

    #[test]
    fn raw_composition_keeps_identities() {
        let x = leaf("x");
        let s = Structural::comp_raw(Structural::id(x.clone()), Structural::id(x.clone()));
        assert_eq!(
            s,
            Structural::Comp(Box::new(Structural::Id(x.clone())), Box::new(Structural::Id(x)))
        );
    }

    #[test]
    #[should_panic(expected = "non-composable")]
    fn composing_mismatched_boundaries_panics() {
        let a = Structural::atom(assoc());
        let _ = Structural::comp(a.clone(), a);
    }
}

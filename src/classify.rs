//! Recognizers turning host terms into the engine's object and structural
//! models.
//!
//! Classification is conservative: a structural candidate is accepted only
//! after the host confirms its inferred domain and codomain agree with the
//! boundaries the candidate claims. Anything not recognized is treated as an
//! opaque atom by the engine, which is always sound.

use crate::core::{Atom, Mor1};
use crate::host::{Host, MonoidalStructure};
use crate::structural::StructuralAtom;
use crate::term::Term;
use tracing::trace;

/// Classifies host terms relative to one ambient monoidal structure.
pub struct Classifier<'a, H> {
    host: &'a H,
    structure: &'a MonoidalStructure,
}

impl<'a, H: Host> Classifier<'a, H> {
    pub fn new(host: &'a H, structure: &'a MonoidalStructure) -> Self {
        Self { host, structure }
    }

    /// Classifies an object term.
    ///
    /// Units and tensors are recognized only when they belong to the ambient
    /// category; everything else becomes a leaf holding the head-normal term.
    pub fn mor1(&self, e: &Term) -> Mor1 {
        let head = self.host.whnf(e);
        match head {
            Term::Unit(c) if *c == self.structure.category => Mor1::Unit,
            Term::Tensor(a, b) if self.in_ambient_category(head) => {
                Mor1::tensor(self.mor1(a), self.mor1(b))
            }
            other => Mor1::leaf(other.clone()),
        }
    }

    fn in_ambient_category(&self, e: &Term) -> bool {
        self.host.infer_category(e).as_ref() == Some(&self.structure.category)
    }

    /// Recognizes a primitive structural isomorphism.
    ///
    /// Returns `None` if no shape matches or if the host's typing of `e`
    /// disagrees with the candidate's boundaries.
    pub fn structural_atom(&self, e: &Term) -> Option<StructuralAtom> {
        let head = self.host.whnf(e);
        let candidate = self.match_shape(head)?;
        if self.confirm(e, &candidate) {
            trace!(atom = %candidate, "recognized structural atom");
            Some(candidate)
        } else {
            trace!(atom = %candidate, "structural candidate rejected by typing");
            None
        }
    }

    /// Wraps a morphism term as an opaque atom with classified boundaries.
    pub fn atom(&self, e: &Term) -> Option<Atom> {
        let (src, tgt) = self.host.infer_hom(e)?;
        Some(Atom::new(
            self.host.whnf(e).clone(),
            self.mor1(&src),
            self.mor1(&tgt),
        ))
    }

    fn confirm(&self, e: &Term, candidate: &StructuralAtom) -> bool {
        let Some((src, tgt)) = self.host.infer_hom(e) else {
            return false;
        };
        self.host.def_eq(&src, &candidate.src().to_term(self.structure))
            && self.host.def_eq(&tgt, &candidate.tgt().to_term(self.structure))
    }

    /// Trial order for structural recognition; inverse shapes are tried
    /// together with their forward counterpart.
    fn match_shape(&self, head: &Term) -> Option<StructuralAtom> {
        self.match_associator(head)
            .or_else(|| self.match_left_unitor(head))
            .or_else(|| self.match_right_unitor(head))
            .or_else(|| self.match_coherence(head))
    }

    fn match_associator(&self, head: &Term) -> Option<StructuralAtom> {
        match head {
            Term::Associator(f, g, h) => Some(StructuralAtom::Associator(
                self.mor1(f),
                self.mor1(g),
                self.mor1(h),
            )),
            Term::AssociatorInv(f, g, h) => Some(StructuralAtom::AssociatorInv(
                self.mor1(f),
                self.mor1(g),
                self.mor1(h),
            )),
            _ => None,
        }
    }

    fn match_left_unitor(&self, head: &Term) -> Option<StructuralAtom> {
        match head {
            Term::LeftUnitor(f) => Some(StructuralAtom::LeftUnitor(self.mor1(f))),
            Term::LeftUnitorInv(f) => Some(StructuralAtom::LeftUnitorInv(self.mor1(f))),
            _ => None,
        }
    }

    fn match_right_unitor(&self, head: &Term) -> Option<StructuralAtom> {
        match head {
            Term::RightUnitor(f) => Some(StructuralAtom::RightUnitor(self.mor1(f))),
            Term::RightUnitorInv(f) => Some(StructuralAtom::RightUnitorInv(self.mor1(f))),
            _ => None,
        }
    }

    fn match_coherence(&self, head: &Term) -> Option<StructuralAtom> {
        let Term::Coherence(x, y) = head else {
            return None;
        };
        let (src, tgt) = (self.mor1(x), self.mor1(y));
        (src.to_list() == tgt.to_list()).then_some(StructuralAtom::Coherence { src, tgt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Signature;

    fn setup() -> (Signature, MonoidalStructure, Term, Term) {
        let mut sig = Signature::new();
        sig.declare_category("C", true).unwrap();
        sig.declare_category("D", false).unwrap();
        let x = sig.declare_object("X", "C").unwrap();
        let y = sig.declare_object("Y", "C").unwrap();
        (sig, MonoidalStructure::new("C"), x, y)
    }

    #[test]
    fn classifies_units_and_tensors_of_ambient_category() {
        let (sig, structure, x, y) = setup();
        let c = Classifier::new(&sig, &structure);
        let t = Term::tensor(Term::unit("C"), Term::tensor(x.clone(), y.clone()));
        assert_eq!(
            c.mor1(&t),
            Mor1::tensor(
                Mor1::Unit,
                Mor1::tensor(Mor1::leaf(x.clone()), Mor1::leaf(y.clone()))
            )
        );
    }

    #[test]
    fn foreign_unit_is_a_leaf() {
        let (sig, structure, _, _) = setup();
        let c = Classifier::new(&sig, &structure);
        assert_eq!(c.mor1(&Term::unit("D")), Mor1::leaf(Term::unit("D")));
    }

    #[test]
    fn object_definitions_are_unfolded() {
        let (mut sig, structure, x, y) = setup();
        let xy = sig.define("XY", Term::tensor(x.clone(), y.clone())).unwrap();
        let c = Classifier::new(&sig, &structure);
        assert_eq!(c.mor1(&xy), Mor1::tensor(Mor1::leaf(x), Mor1::leaf(y)));
    }

    #[test]
    fn recognizes_each_structural_shape() {
        let (sig, structure, x, y) = setup();
        let c = Classifier::new(&sig, &structure);
        let cases = [
            Term::associator(x.clone(), y.clone(), x.clone()),
            Term::associator_inv(x.clone(), y.clone(), x.clone()),
            Term::left_unitor(x.clone()),
            Term::left_unitor_inv(x.clone()),
            Term::right_unitor(y.clone()),
            Term::right_unitor_inv(y.clone()),
            Term::coherence(
                Term::tensor(Term::tensor(x.clone(), y.clone()), x.clone()),
                Term::tensor(x.clone(), Term::tensor(y.clone(), x.clone())),
            ),
        ];
        for term in &cases {
            assert!(c.structural_atom(term).is_some(), "not recognized: {}", term);
        }
    }

    #[test]
    fn generators_are_not_structural() {
        let (mut sig, structure, x, y) = setup();
        let f = sig.declare_morphism("f", x, y).unwrap();
        let c = Classifier::new(&sig, &structure);
        assert!(c.structural_atom(&f).is_none());
        let atom = c.atom(&f).unwrap();
        assert_eq!(atom.term, f);
    }

    #[test]
    fn ill_typed_structural_shape_is_rejected() {
        let (sig, structure, x, y) = setup();
        let c = Classifier::new(&sig, &structure);
        let bogus = Term::coherence(x, y);
        assert!(c.structural_atom(&bogus).is_none());
    }

    #[test]
    fn structural_definition_is_recognized_through_unfolding() {
        let (mut sig, structure, x, _) = setup();
        let l = sig.define("l", Term::left_unitor(x.clone())).unwrap();
        let c = Classifier::new(&sig, &structure);
        assert_eq!(
            c.structural_atom(&l),
            Some(StructuralAtom::LeftUnitor(Mor1::leaf(x)))
        );
    }
}

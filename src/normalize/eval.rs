//! The evaluation engine.
//!
//! [`Engine::eval`] turns a host morphism term into a [`NormalExpr`] by
//! structural recursion. The three merge operations it relies on each follow a
//! fixed case order:
//!
//! * [`Engine::eval_comp`]: `A ≫ B`, walking the atoms of `A`;
//! * [`Engine::eval_whisker_left`]: `f ◁ A`, splitting `f` into atoms;
//! * [`Engine::eval_whisker_right`]: `A ▷ f`, pushing `f` inward past every
//!   left whisker and into the last tensor factor.
//!
//! Each operation returns a [`Certified`] value whose certificate (when
//! recording) proves `input = reconstruct(result)`. Composition and atomic
//! left whiskering walk their operand iteratively and cite one distributing
//! law per call, so certificates grow linearly with the number of merges. The
//! remaining whiskering cases recurse on the shape of their operands and need
//! stack proportional to tensor and chain depth.

use crate::certificate::{Certificate, Certified, Rule};
use crate::classify::Classifier;
use crate::config::NormalizerConfig;
use crate::core::{Atom1, Mor1};
use crate::host::{Host, MonoidalStructure};
use crate::normal::{NormalExpr, TensorHomExpr, WhiskerLeftExpr, WhiskerRightExpr};
use crate::structural::{Structural, StructuralAtom};
use crate::term::Term;
use tracing::trace;

type Cert = Option<Certificate>;

fn trans(p: Cert, q: Cert) -> Cert {
    Some(Certificate::trans(p?, q?))
}

fn congr_comp(p: Cert, q: Cert) -> Cert {
    Some(Certificate::congr_comp(p?, q?))
}

/// Structural and atom parts of a normal form, front to back, and its final
/// structural part.
fn spine(n: &NormalExpr) -> (Vec<(&Structural, &WhiskerLeftExpr)>, &Structural) {
    let mut parts = Vec::new();
    let mut cur = n;
    loop {
        match cur {
            NormalExpr::Nil(alpha) => return (parts, alpha),
            NormalExpr::Cons(alpha, eta, rest) => {
                parts.push((alpha, eta));
                cur = &**rest;
            }
        }
    }
}

/// One normalization context: a host, an ambient structure and the switches.
pub(crate) struct Engine<'a, H> {
    host: &'a H,
    structure: &'a MonoidalStructure,
    classifier: Classifier<'a, H>,
    config: NormalizerConfig,
}

impl<'a, H: Host> Engine<'a, H> {
    pub(crate) fn new(host: &'a H, structure: &'a MonoidalStructure, config: NormalizerConfig) -> Self {
        Self {
            host,
            structure,
            classifier: Classifier::new(host, structure),
            config,
        }
    }

    pub(crate) fn classifier(&self) -> &Classifier<'a, H> {
        &self.classifier
    }

    // ---------------------------------------------------------------------
    // Certificate helpers; all of them are no-ops when not recording.

    fn recording(&self) -> bool {
        self.config.record_certificates
    }

    fn refl(&self, t: impl FnOnce() -> Term) -> Cert {
        self.recording().then(|| Certificate::refl(t()))
    }

    fn law(&self, rule: Rule, sides: impl FnOnce() -> (Term, Term)) -> Cert {
        self.recording().then(|| {
            let (lhs, rhs) = sides();
            if lhs == rhs {
                Certificate::refl(lhs)
            } else {
                Certificate::law(rule, lhs, rhs)
            }
        })
    }

    fn cast(&self, sides: impl FnOnce() -> (Term, Term)) -> Cert {
        self.recording().then(|| {
            let (lhs, rhs) = sides();
            Certificate::cast(lhs, rhs)
        })
    }

    fn congr_wl(&self, x: impl FnOnce() -> Term, p: Cert) -> Cert {
        let p = p?;
        Some(Certificate::congr_whisker_left(x(), p))
    }

    fn congr_wr(&self, p: Cert, x: impl FnOnce() -> Term) -> Cert {
        let p = p?;
        Some(Certificate::congr_whisker_right(p, x()))
    }

    fn t(&self, n: &NormalExpr) -> Term {
        n.to_term(self.structure)
    }

    fn st(&self, s: &Structural) -> Term {
        s.to_term(self.structure)
    }

    fn ot(&self, m: &Mor1) -> Term {
        m.to_term(self.structure)
    }

    // ---------------------------------------------------------------------
    // Structural constructors honouring `simplify_structural`.

    fn s_atom(&self, atom: StructuralAtom) -> Structural {
        if self.config.simplify_structural {
            Structural::atom(atom)
        } else {
            Structural::Atom(atom)
        }
    }

    fn s_comp(&self, a: Structural, b: Structural) -> Structural {
        if self.config.simplify_structural {
            Structural::comp(a, b)
        } else {
            Structural::comp_raw(a, b)
        }
    }

    fn s_wl(&self, f: Mor1, a: Structural) -> Structural {
        if self.config.simplify_structural {
            Structural::whisker_left(f, a)
        } else {
            Structural::whisker_left_raw(f, a)
        }
    }

    fn s_wr(&self, a: Structural, f: Mor1) -> Structural {
        if self.config.simplify_structural {
            Structural::whisker_right(a, f)
        } else {
            Structural::whisker_right_raw(a, f)
        }
    }

    /// Classified domain and codomain of a sub-term of the input.
    ///
    /// # Panics
    /// If the host cannot type a sub-term of a morphism it typed at entry.
    fn boundary(&self, e: &Term) -> (Mor1, Mor1) {
        match self.host.infer_hom(e) {
            Some((s, t)) => (self.classifier.mor1(&s), self.classifier.mor1(&t)),
            None => panic!("host cannot type sub-term {} of a well-typed morphism", e),
        }
    }

    // ---------------------------------------------------------------------
    // eval

    /// Normalizes a morphism term.
    pub(crate) fn eval(&self, e: &Term) -> Certified<NormalExpr> {
        if let Some(atom) = self.classifier.structural_atom(e) {
            trace!(case = "structural", term = %e);
            let n = NormalExpr::nil(self.s_atom(atom));
            let cert = self.law(Rule::StructuralComp, || (e.clone(), self.t(&n)));
            return Certified::new(n, cert);
        }
        let head = self.host.whnf(e);
        let unfold = self.cast(|| (e.clone(), head.clone()));
        let result = match head {
            Term::Id(x) => {
                trace!(case = "id", term = %head);
                let n = NormalExpr::nil(Structural::id(self.classifier.mor1(x)));
                let cert = self.law(Rule::StructuralComp, || (head.clone(), self.t(&n)));
                Certified::new(n, cert)
            }
            Term::Comp(a, b) => {
                trace!(case = "comp", term = %head);
                let ra = self.eval(a);
                let rb = self.eval(b);
                let rc = self.eval_comp(&ra.value, &rb.value);
                let cert = trans(congr_comp(ra.certificate, rb.certificate), rc.certificate);
                Certified::new(rc.value, cert)
            }
            Term::WhiskerLeft(x, a) => {
                trace!(case = "whisker_left", term = %head);
                let f = self.classifier.mor1(x);
                let ra = self.eval(a);
                let rw = self.eval_whisker_left(&f, &ra.value);
                let cast = self.cast(|| {
                    (
                        head.clone(),
                        Term::whisker_left(self.ot(&f), (**a).clone()),
                    )
                });
                let congr = self.congr_wl(|| self.ot(&f), ra.certificate);
                Certified::new(rw.value, trans(cast, trans(congr, rw.certificate)))
            }
            Term::WhiskerRight(a, x) => {
                trace!(case = "whisker_right", term = %head);
                let f = self.classifier.mor1(x);
                let ra = self.eval(a);
                let rw = self.eval_whisker_right(&ra.value, &f);
                let cast = self.cast(|| {
                    (
                        head.clone(),
                        Term::whisker_right((**a).clone(), self.ot(&f)),
                    )
                });
                let congr = self.congr_wr(ra.certificate, || self.ot(&f));
                Certified::new(rw.value, trans(cast, trans(congr, rw.certificate)))
            }
            Term::Tensor(a, b) => {
                trace!(case = "tensor_hom", term = %head);
                self.eval_tensor_hom(head, a, b)
            }
            Term::MonoidalComp(a, b) => {
                trace!(case = "monoidal_comp", term = %head);
                self.eval_monoidal_comp(head, a, b)
            }
            other => {
                trace!(case = "atom", term = %other);
                let atom = self
                    .classifier
                    .atom(other)
                    .unwrap_or_else(|| panic!("host cannot type atom {}", other));
                let n = NormalExpr::single(WhiskerLeftExpr::of_atom(atom));
                let cert = self.law(Rule::IdCompId, || (other.clone(), self.t(&n)));
                Certified::new(n, cert)
            }
        };
        Certified::new(result.value, trans(unfold, result.certificate))
    }

    /// `f ⊗ g = (f ▷ src g) ≫ (tgt f ◁ g)`.
    fn eval_tensor_hom(&self, head: &Term, a: &Term, b: &Term) -> Certified<NormalExpr> {
        let (_, tgt_a) = self.boundary(a);
        let (src_b, _) = self.boundary(b);
        let ra = self.eval(a);
        let rb = self.eval(b);
        let r1 = self.eval_whisker_right(&ra.value, &src_b);
        let r2 = self.eval_whisker_left(&tgt_a, &rb.value);
        let r3 = self.eval_comp(&r1.value, &r2.value);
        let law = self.law(Rule::TensorHomDef, || {
            (
                head.clone(),
                Term::comp(
                    Term::whisker_right(a.clone(), self.ot(&src_b)),
                    Term::whisker_left(self.ot(&tgt_a), b.clone()),
                ),
            )
        });
        let left = trans(self.congr_wr(ra.certificate, || self.ot(&src_b)), r1.certificate);
        let right = trans(self.congr_wl(|| self.ot(&tgt_a), rb.certificate), r2.certificate);
        let cert = trans(law, trans(congr_comp(left, right), r3.certificate));
        Certified::new(r3.value, cert)
    }

    /// `f ⊗≫ g = f ≫ ⊗𝟙 ≫ g`.
    fn eval_monoidal_comp(&self, head: &Term, a: &Term, b: &Term) -> Certified<NormalExpr> {
        let (_, tgt_a) = self.boundary(a);
        let (src_b, _) = self.boundary(b);
        let coherence = self.s_atom(StructuralAtom::Coherence {
            src: tgt_a,
            tgt: src_b,
        });
        let ra = self.eval(a);
        let rb = self.eval(b);
        let r1 = self.eval_comp(&NormalExpr::nil(coherence.clone()), &rb.value);
        let r2 = self.eval_comp(&ra.value, &r1.value);
        let law = self.law(Rule::MonoidalCompDef, || {
            (
                head.clone(),
                Term::comp(a.clone(), Term::comp(self.st(&coherence), b.clone())),
            )
        });
        let tail = trans(
            congr_comp(self.refl(|| self.st(&coherence)), rb.certificate),
            r1.certificate,
        );
        let cert = trans(law, trans(congr_comp(ra.certificate, tail), r2.certificate));
        Certified::new(r2.value, cert)
    }

    // ---------------------------------------------------------------------
    // eval_comp

    /// `A ≫ B`.
    ///
    /// The certificate reassociates `A ≫ B` in one step, so it holds a constant
    /// number of rule instances however long `A` is.
    ///
    /// # Panics
    /// If `tgt A ≠ src B`.
    pub(crate) fn eval_comp(&self, a: &NormalExpr, b: &NormalExpr) -> Certified<NormalExpr> {
        let (spine, last) = spine(a);
        let tail = self.comp_nil(last, b);
        let value = spine.iter().rev().fold(tail.value, |acc, (alpha, eta)| {
            NormalExpr::cons((*alpha).clone(), (*eta).clone(), acc)
        });
        let assoc = self.law(Rule::CompAssoc, || {
            let spliced = spine.iter().rev().fold(
                Term::comp(self.st(last), self.t(b)),
                |acc, (alpha, eta)| Term::comp(self.st(alpha), Term::comp(eta.to_term(), acc)),
            );
            (Term::comp(self.t(a), self.t(b)), spliced)
        });
        let inner = spine.iter().rev().fold(tail.certificate, |acc, (alpha, eta)| {
            congr_comp(
                self.refl(|| self.st(alpha)),
                congr_comp(self.refl(|| eta.to_term()), acc),
            )
        });
        Certified::new(value, trans(assoc, inner))
    }

    /// `α ≫ B` for a structural `α`: merges `α` into the first structural
    /// part of `B`.
    fn comp_nil(&self, alpha: &Structural, b: &NormalExpr) -> Certified<NormalExpr> {
        let n = match b {
            NormalExpr::Nil(beta) => NormalExpr::nil(self.s_comp(alpha.clone(), beta.clone())),
            NormalExpr::Cons(beta, eta, rest) => NormalExpr::cons(
                self.s_comp(alpha.clone(), beta.clone()),
                eta.clone(),
                (**rest).clone(),
            ),
        };
        let cert = self.law(Rule::StructuralComp, || {
            (Term::comp(self.st(alpha), self.t(b)), self.t(&n))
        });
        Certified::new(n, cert)
    }

    // ---------------------------------------------------------------------
    // eval_whisker_left

    /// `f ◁ A`.
    pub(crate) fn eval_whisker_left(&self, f: &Mor1, a: &NormalExpr) -> Certified<NormalExpr> {
        match (f, a) {
            (_, NormalExpr::Nil(alpha)) => {
                let n = NormalExpr::nil(self.s_wl(f.clone(), alpha.clone()));
                let cert = self.law(Rule::WhiskerLeftStructural, || {
                    (Term::whisker_left(self.ot(f), self.st(alpha)), self.t(&n))
                });
                Certified::new(n, cert)
            }
            (Mor1::Leaf(f1), _) => self.whisker_left_atomic(f1, a),
            (Mor1::Tensor(g, h), _) => {
                let (src, tgt) = (a.src(), a.tgt());
                let r1 = self.eval_whisker_left(h, a);
                let r2 = self.eval_whisker_left(g, &r1.value);
                let assoc = self.s_atom(StructuralAtom::Associator(
                    (**g).clone(),
                    (**h).clone(),
                    src,
                ));
                let assoc_inv = self.s_atom(StructuralAtom::AssociatorInv(
                    (**g).clone(),
                    (**h).clone(),
                    tgt,
                ));
                let r3 = self.eval_comp(&r2.value, &NormalExpr::nil(assoc_inv.clone()));
                let r4 = self.eval_comp(&NormalExpr::nil(assoc.clone()), &r3.value);
                let law = self.law(Rule::TensorWhiskerLeft, || {
                    (
                        Term::whisker_left(self.ot(f), self.t(a)),
                        Term::comp(
                            self.st(&assoc),
                            Term::comp(
                                Term::whisker_left(
                                    self.ot(g),
                                    Term::whisker_left(self.ot(h), self.t(a)),
                                ),
                                self.st(&assoc_inv),
                            ),
                        ),
                    )
                });
                let nested = trans(self.congr_wl(|| self.ot(g), r1.certificate), r2.certificate);
                let inner = trans(
                    congr_comp(nested, self.refl(|| self.st(&assoc_inv))),
                    r3.certificate,
                );
                let outer = trans(congr_comp(self.refl(|| self.st(&assoc)), inner), r4.certificate);
                Certified::new(r4.value, trans(law, outer))
            }
            (Mor1::Unit, _) => {
                let (src, tgt) = (a.src(), a.tgt());
                let unitor = self.s_atom(StructuralAtom::LeftUnitor(src));
                let unitor_inv = self.s_atom(StructuralAtom::LeftUnitorInv(tgt));
                let r1 = self.eval_comp(a, &NormalExpr::nil(unitor_inv.clone()));
                let r2 = self.eval_comp(&NormalExpr::nil(unitor.clone()), &r1.value);
                let law = self.law(Rule::UnitWhiskerLeft, || {
                    (
                        Term::whisker_left(self.ot(f), self.t(a)),
                        Term::comp(
                            self.st(&unitor),
                            Term::comp(self.t(a), self.st(&unitor_inv)),
                        ),
                    )
                });
                let cert = trans(
                    law,
                    trans(
                        congr_comp(self.refl(|| self.st(&unitor)), r1.certificate),
                        r2.certificate,
                    ),
                );
                Certified::new(r2.value, cert)
            }
        }
    }

    /// `f ◁ A` for an atomic `f`: whiskers every part of `A` in place.
    fn whisker_left_atomic(&self, f1: &Atom1, a: &NormalExpr) -> Certified<NormalExpr> {
        let f = Mor1::Leaf(f1.clone());
        let ft = || f1.term.clone();
        let (spine, last) = spine(a);
        let tail = NormalExpr::nil(self.s_wl(f.clone(), last.clone()));
        let tail_cert = self.law(Rule::WhiskerLeftStructural, || {
            (Term::whisker_left(ft(), self.st(last)), self.t(&tail))
        });
        let distribute = self.law(Rule::WhiskerLeftComp, || {
            let split = spine.iter().rev().fold(
                Term::whisker_left(ft(), self.st(last)),
                |acc, (alpha, eta)| {
                    Term::comp(
                        Term::whisker_left(ft(), self.st(alpha)),
                        Term::comp(Term::whisker_left(ft(), eta.to_term()), acc),
                    )
                },
            );
            (Term::whisker_left(ft(), self.t(a)), split)
        });
        let mut acc = Certified::new(tail, tail_cert);
        for (alpha, eta) in spine.into_iter().rev() {
            let head = self.s_wl(f.clone(), alpha.clone());
            let head_step = self.law(Rule::WhiskerLeftStructural, || {
                (Term::whisker_left(ft(), self.st(alpha)), self.st(&head))
            });
            let eta_step = self.refl(|| Term::whisker_left(ft(), eta.to_term()));
            acc = Certified::new(
                NormalExpr::cons(
                    head,
                    WhiskerLeftExpr::Whisker(f1.clone(), Box::new(eta.clone())),
                    acc.value,
                ),
                congr_comp(head_step, congr_comp(eta_step, acc.certificate)),
            );
        }
        Certified::new(acc.value, trans(distribute, acc.certificate))
    }

    // ---------------------------------------------------------------------
    // eval_whisker_right

    /// `A ▷ f`.
    pub(crate) fn eval_whisker_right(&self, a: &NormalExpr, f: &Mor1) -> Certified<NormalExpr> {
        match (a, f) {
            (NormalExpr::Nil(alpha), _) => {
                let n = NormalExpr::nil(self.s_wr(alpha.clone(), f.clone()));
                let cert = self.law(Rule::WhiskerRightStructural, || {
                    (Term::whisker_right(self.st(alpha), self.ot(f)), self.t(&n))
                });
                Certified::new(n, cert)
            }
            (NormalExpr::Cons(alpha, WhiskerLeftExpr::Whisker(g1, eta), rest), _) => {
                self.whisker_right_past_whisker(a, alpha, g1, eta, rest, f)
            }
            (
                NormalExpr::Cons(alpha, WhiskerLeftExpr::Of(TensorHomExpr::Of(wr)), rest),
                Mor1::Leaf(f1),
            ) => {
                let r = self.eval_whisker_right(rest, f);
                let head = self.s_wr(alpha.clone(), f.clone());
                let eta = WhiskerLeftExpr::Of(TensorHomExpr::Of(WhiskerRightExpr::Whisker(
                    Box::new(wr.clone()),
                    f1.clone(),
                )));
                let law = self.law(Rule::WhiskerRightComp, || {
                    (
                        Term::whisker_right(self.t(a), self.ot(f)),
                        Term::comp(
                            Term::whisker_right(self.st(alpha), self.ot(f)),
                            Term::comp(
                                Term::whisker_right(wr.to_term(), self.ot(f)),
                                Term::whisker_right(self.t(rest), self.ot(f)),
                            ),
                        ),
                    )
                });
                let head_step = self.law(Rule::WhiskerRightStructural, || {
                    (Term::whisker_right(self.st(alpha), self.ot(f)), self.st(&head))
                });
                let cert = trans(
                    law,
                    congr_comp(
                        head_step,
                        congr_comp(self.refl(|| eta.to_term()), r.certificate),
                    ),
                );
                Certified::new(NormalExpr::cons(head, eta, r.value), cert)
            }
            (
                NormalExpr::Cons(alpha, WhiskerLeftExpr::Of(th @ TensorHomExpr::Cons(..)), rest),
                Mor1::Leaf(f1),
            ) => {
                let (pre, th2, post) = self.whisker_right_tensor_hom(th, f1);
                let r = self.eval_whisker_right(rest, f);
                let rp = self.eval_comp(&NormalExpr::nil(post.clone()), &r.value);
                let head = self.s_comp(self.s_wr(alpha.clone(), f.clone()), pre);
                let eta = WhiskerLeftExpr::Of(th2);
                let law = self.law(Rule::TensorHomWhiskerRight, || {
                    (
                        Term::whisker_right(self.t(a), self.ot(f)),
                        Term::comp(
                            self.st(&head),
                            Term::comp(
                                eta.to_term(),
                                Term::comp(
                                    self.st(&post),
                                    Term::whisker_right(self.t(rest), self.ot(f)),
                                ),
                            ),
                        ),
                    )
                });
                let tail = trans(
                    congr_comp(self.refl(|| self.st(&post)), r.certificate),
                    rp.certificate,
                );
                let cert = trans(
                    law,
                    congr_comp(
                        self.refl(|| self.st(&head)),
                        congr_comp(self.refl(|| eta.to_term()), tail),
                    ),
                );
                Certified::new(NormalExpr::cons(head, eta, rp.value), cert)
            }
            (_, Mor1::Tensor(g, h)) => {
                let (src, tgt) = (a.src(), a.tgt());
                let r1 = self.eval_whisker_right(a, g);
                let r2 = self.eval_whisker_right(&r1.value, h);
                let assoc = self.s_atom(StructuralAtom::Associator(
                    tgt,
                    (**g).clone(),
                    (**h).clone(),
                ));
                let assoc_inv = self.s_atom(StructuralAtom::AssociatorInv(
                    src,
                    (**g).clone(),
                    (**h).clone(),
                ));
                let r3 = self.eval_comp(&r2.value, &NormalExpr::nil(assoc.clone()));
                let r4 = self.eval_comp(&NormalExpr::nil(assoc_inv.clone()), &r3.value);
                let law = self.law(Rule::WhiskerRightTensor, || {
                    (
                        Term::whisker_right(self.t(a), self.ot(f)),
                        Term::comp(
                            self.st(&assoc_inv),
                            Term::comp(
                                Term::whisker_right(
                                    Term::whisker_right(self.t(a), self.ot(g)),
                                    self.ot(h),
                                ),
                                self.st(&assoc),
                            ),
                        ),
                    )
                });
                let nested = trans(self.congr_wr(r1.certificate, || self.ot(h)), r2.certificate);
                let inner = trans(
                    congr_comp(nested, self.refl(|| self.st(&assoc))),
                    r3.certificate,
                );
                let outer = trans(
                    congr_comp(self.refl(|| self.st(&assoc_inv)), inner),
                    r4.certificate,
                );
                Certified::new(r4.value, trans(law, outer))
            }
            (_, Mor1::Unit) => {
                let (src, tgt) = (a.src(), a.tgt());
                let unitor = self.s_atom(StructuralAtom::RightUnitor(src));
                let unitor_inv = self.s_atom(StructuralAtom::RightUnitorInv(tgt));
                let r1 = self.eval_comp(a, &NormalExpr::nil(unitor_inv.clone()));
                let r2 = self.eval_comp(&NormalExpr::nil(unitor.clone()), &r1.value);
                let law = self.law(Rule::WhiskerRightUnit, || {
                    (
                        Term::whisker_right(self.t(a), self.ot(f)),
                        Term::comp(
                            self.st(&unitor),
                            Term::comp(self.t(a), self.st(&unitor_inv)),
                        ),
                    )
                });
                let cert = trans(
                    law,
                    trans(
                        congr_comp(self.refl(|| self.st(&unitor)), r1.certificate),
                        r2.certificate,
                    ),
                );
                Certified::new(r2.value, cert)
            }
        }
    }

    /// `(α ≫ (g ◁ η) ≫ θ) ▷ f`
    /// `= (α ▷ f ≫ α(g, X, f)) ≫ g ◁ (η ▷ f) ≫ α⁻¹(g, Y, f) ≫ (θ ▷ f)`.
    fn whisker_right_past_whisker(
        &self,
        a: &NormalExpr,
        alpha: &Structural,
        g1: &Atom1,
        eta: &WhiskerLeftExpr,
        rest: &NormalExpr,
        f: &Mor1,
    ) -> Certified<NormalExpr> {
        let g = Mor1::Leaf(g1.clone());
        let (x, y) = (eta.src(), eta.tgt());
        let single = NormalExpr::single(eta.clone());
        let r1 = self.eval_whisker_right(&single, f);
        let r2 = self.eval_whisker_left(&g, &r1.value);
        let r3 = self.eval_whisker_right(rest, f);
        let assoc_inv = self.s_atom(StructuralAtom::AssociatorInv(g.clone(), y, f.clone()));
        let r4 = self.eval_comp(&r2.value, &NormalExpr::nil(assoc_inv.clone()));
        let r5 = self.eval_comp(&r4.value, &r3.value);
        let head = self.s_comp(
            self.s_wr(alpha.clone(), f.clone()),
            self.s_atom(StructuralAtom::Associator(g.clone(), x, f.clone())),
        );
        let r6 = self.eval_comp(&NormalExpr::nil(head.clone()), &r5.value);
        let law = self.law(Rule::WhiskerRightCompWhiskerLeft, || {
            (
                Term::whisker_right(self.t(a), self.ot(f)),
                Term::comp(
                    self.st(&head),
                    Term::comp(
                        Term::comp(
                            Term::whisker_left(
                                g1.term.clone(),
                                Term::whisker_right(self.t(&single), self.ot(f)),
                            ),
                            self.st(&assoc_inv),
                        ),
                        Term::whisker_right(self.t(rest), self.ot(f)),
                    ),
                ),
            )
        });
        let pushed = trans(self.congr_wl(|| g1.term.clone(), r1.certificate), r2.certificate);
        let inner = trans(
            congr_comp(pushed, self.refl(|| self.st(&assoc_inv))),
            r4.certificate,
        );
        let middle = trans(congr_comp(inner, r3.certificate), r5.certificate);
        let cert = trans(
            law,
            trans(congr_comp(self.refl(|| self.st(&head)), middle), r6.certificate),
        );
        Certified::new(r6.value, cert)
    }

    /// Pushes an atomic right whisker into the last factor of a tensor.
    ///
    /// Returns `(pre, th', post)` with `th ▷ f = pre ≫ th' ≫ post`.
    fn whisker_right_tensor_hom(
        &self,
        th: &TensorHomExpr,
        f1: &Atom1,
    ) -> (Structural, TensorHomExpr, Structural) {
        let f = Mor1::Leaf(f1.clone());
        match th {
            TensorHomExpr::Of(e) => (
                Structural::id(Mor1::tensor(e.src(), f.clone())),
                TensorHomExpr::Of(WhiskerRightExpr::Whisker(Box::new(e.clone()), f1.clone())),
                Structural::id(Mor1::tensor(e.tgt(), f)),
            ),
            TensorHomExpr::Cons(e, rest) => {
                let (pre, rest2, post) = self.whisker_right_tensor_hom(rest, f1);
                let pre = self.s_comp(
                    self.s_atom(StructuralAtom::Associator(e.src(), rest.src(), f.clone())),
                    self.s_wl(e.src(), pre),
                );
                let post = self.s_comp(
                    self.s_wl(e.tgt(), post),
                    self.s_atom(StructuralAtom::AssociatorInv(e.tgt(), rest.tgt(), f)),
                );
                (pre, TensorHomExpr::Cons(e.clone(), Box::new(rest2)), post)
            }
        }
    }
}

//! Walks a [`Derivation`] into a [`Proof`] step DAG, enforcing a maximum
//! nesting depth and rejecting a derivation that revisits the same fact
//! along one root-to-leaf path.
//!
//! `Exists` doesn't get its own step: the bound witness is interesting to
//! a caller via the reasoner's `Bindings`, not via the proof's prose, so
//! the builder just descends straight through it to its witness.

use crate::error::ProofError;
use crate::step::{Proof, Step, StepId, StepKind};
use kb_reason::Derivation;
use kb_store::{FactId, FactStore};

pub struct ProofBuilder {
    max_depth: usize,
}

impl ProofBuilder {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Builds a step DAG from a successful derivation. The resulting
    /// [`Proof::validator_ok`] starts `true`; call [`Self::validate`]
    /// afterward to re-check it against a store that may have changed
    /// since the derivation was produced.
    pub fn build(&self, derivation: &Derivation) -> Result<Proof, ProofError> {
        let mut steps = Vec::new();
        let mut path = Vec::new();
        let root = self.build_step(derivation, 0, &mut steps, &mut path)?;
        Ok(Proof { root, steps, validator_ok: true })
    }

    /// Re-checks every fact a proof cites against the current store and
    /// returns a copy with `validator_ok` set accordingly. A fact that has
    /// since been retracted invalidates the whole proof: the derivation it
    /// once supported no longer holds.
    pub fn validate(&self, proof: &Proof, store: &FactStore) -> Proof {
        let ok = proof.steps.iter().all(|step| match step.fact {
            Some(id) => store.fact(id).is_some(),
            None => true,
        });
        Proof { root: proof.root, steps: proof.steps.clone(), validator_ok: ok }
    }

    fn enter(&self, path: &mut Vec<FactId>, id: FactId) -> Result<(), ProofError> {
        if path.contains(&id) {
            return Err(ProofError::CycleDetected);
        }
        path.push(id);
        Ok(())
    }

    fn leaf(&self, steps: &mut Vec<Step>, path: &mut Vec<FactId>, id: FactId) -> Result<StepId, ProofError> {
        self.enter(path, id)?;
        let step_id = StepId(steps.len() as u32);
        steps.push(Step { kind: StepKind::FactInKB, fact: Some(id), sub_steps: Vec::new() });
        path.pop();
        Ok(step_id)
    }

    fn build_step(
        &self,
        derivation: &Derivation,
        depth: usize,
        steps: &mut Vec<Step>,
        path: &mut Vec<FactId>,
    ) -> Result<StepId, ProofError> {
        if depth > self.max_depth {
            return Err(ProofError::DepthExceeded);
        }

        match derivation {
            Derivation::Fact(id) => self.leaf(steps, path, *id),
            Derivation::Symmetric(id) => self.leaf(steps, path, *id),
            Derivation::ExplicitNegation(id) => self.leaf(steps, path, *id),

            Derivation::Transitive(chain) => {
                let mut hops = Vec::with_capacity(chain.len());
                for id in chain {
                    hops.push(self.leaf(steps, path, *id)?);
                }
                Ok(self.push(steps, StepKind::TransitiveHop, None, hops))
            }

            Derivation::Inherited { isa_chain, property } => {
                let mut hops = Vec::with_capacity(isa_chain.len() + 1);
                for id in isa_chain {
                    hops.push(self.leaf(steps, path, *id)?);
                }
                hops.push(self.build_step(property, depth + 1, steps, path)?);
                Ok(self.push(steps, StepKind::InheritanceHop, None, hops))
            }

            Derivation::ModusPonens { implication, antecedent } => {
                self.enter(path, *implication)?;
                let sub = self.build_step(antecedent, depth + 1, steps, path);
                path.pop();
                let sub = sub?;
                Ok(self.push(steps, StepKind::RuleApplication, Some(*implication), vec![sub]))
            }

            Derivation::ClosedWorldFailure => Ok(self.push(steps, StepKind::CWA, None, Vec::new())),

            Derivation::And(parts) => {
                let mut subs = Vec::with_capacity(parts.len());
                for part in parts {
                    subs.push(self.build_step(part, depth + 1, steps, path)?);
                }
                Ok(self.push(steps, StepKind::AndAll, None, subs))
            }

            Derivation::Or(inner) => {
                let sub = self.build_step(inner, depth + 1, steps, path)?;
                Ok(self.push(steps, StepKind::OrBranch, None, vec![sub]))
            }

            Derivation::Exists { witness, .. } => self.build_step(witness, depth, steps, path),
        }
    }

    fn push(&self, steps: &mut Vec<Step>, kind: StepKind, fact: Option<FactId>, sub_steps: Vec<StepId>) -> StepId {
        let id = StepId(steps.len() as u32);
        steps.push(Step { kind, fact, sub_steps });
        id
    }
}

/// Builds the degenerate one-step proof for a search that ran out of
/// iterations or wall-clock time before reaching a verdict.
pub fn timeout_proof() -> Proof {
    Proof {
        root: StepId(0),
        steps: vec![Step { kind: StepKind::Timeout, fact: None, sub_steps: Vec::new() }],
        validator_ok: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kb_hdc::HdcStrategyKind;
    use kb_store::{Arg, CandidateFact, Polarity, Triple, Vocabulary};

    fn store_with_fact() -> (FactStore, FactId) {
        let mut s = FactStore::new(Vocabulary::new(HdcStrategyKind::DenseBinary, 64), 8);
        let isa = s.vocabulary_mut().get_or_create("isA");
        s.vocabulary_mut().mark_operator(isa);
        let fido = s.vocabulary_mut().get_or_create("Fido");
        let dog = s.vocabulary_mut().get_or_create("Dog");
        let mut tx = s.begin();
        let id = tx.assert(CandidateFact::triple(isa, Arg::Symbol(fido), Arg::Symbol(dog), Polarity::Positive)).unwrap();
        tx.commit();
        (s, id)
    }

    #[test]
    fn builds_a_single_fact_step() {
        let (_s, id) = store_with_fact();
        let derivation = Derivation::Fact(id);
        let proof = ProofBuilder::new(64).build(&derivation).unwrap();
        assert_eq!(proof.steps.len(), 1);
        assert_eq!(proof.step(proof.root).kind, StepKind::FactInKB);
    }

    #[test]
    fn builds_nested_and_with_two_fact_children() {
        let (_s, id) = store_with_fact();
        let derivation = Derivation::And(vec![Derivation::Fact(id), Derivation::Fact(id)]);
        let proof = ProofBuilder::new(64).build(&derivation).unwrap();
        assert_eq!(proof.step(proof.root).kind, StepKind::AndAll);
        assert_eq!(proof.step(proof.root).sub_steps.len(), 2);
    }

    #[test]
    fn exists_is_transparent_to_its_witness() {
        let (_s, id) = store_with_fact();
        let symbol = kb_base::Symbol::EMPTY;
        let derivation = Derivation::Exists { binding: symbol, witness: Box::new(Derivation::Fact(id)) };
        let proof = ProofBuilder::new(64).build(&derivation).unwrap();
        assert_eq!(proof.steps.len(), 1);
        assert_eq!(proof.step(proof.root).kind, StepKind::FactInKB);
    }

    #[test]
    fn rejects_a_derivation_that_revisits_the_same_fact() {
        let (_s, id) = store_with_fact();
        let antecedent = Derivation::ModusPonens { implication: id, antecedent: Box::new(Derivation::Fact(id)) };
        let err = ProofBuilder::new(64).build(&antecedent).unwrap_err();
        assert_eq!(err, ProofError::CycleDetected);
    }

    #[test]
    fn rejects_a_derivation_deeper_than_the_configured_max() {
        let (_s, id) = store_with_fact();
        let mut derivation = Derivation::Fact(id);
        for _ in 0..10 {
            derivation = Derivation::Or(Box::new(derivation));
        }
        let err = ProofBuilder::new(3).build(&derivation).unwrap_err();
        assert_eq!(err, ProofError::DepthExceeded);
    }

    #[test]
    fn validate_fails_once_the_cited_fact_is_retracted() {
        let (mut s, id) = store_with_fact();
        let proof = ProofBuilder::new(64).build(&Derivation::Fact(id)).unwrap();
        assert!(proof.validator_ok);

        let mut tx = s.begin();
        tx.retract(id).unwrap();
        tx.commit();

        let revalidated = ProofBuilder::new(64).validate(&proof, &s);
        assert!(!revalidated.validator_ok);
    }
}

use kb_store::{Arg, FactId, FactStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepId(pub u32);

impl StepId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The nine step shapes a proof can be built from. Fixed by the consumer
/// contract: the NL layer matches on these names, not on `Derivation`'s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    FactInKB,
    TransitiveHop,
    InheritanceHop,
    RuleApplication,
    AndAll,
    OrBranch,
    NotBlocked,
    CWA,
    Timeout,
}

#[derive(Debug, Clone)]
pub struct Step {
    pub kind: StepKind,
    pub fact: Option<FactId>,
    pub sub_steps: Vec<StepId>,
}

#[derive(Debug, Clone)]
pub struct Proof {
    pub root: StepId,
    pub steps: Vec<Step>,
    pub validator_ok: bool,
}

impl Proof {
    pub fn step(&self, id: StepId) -> &Step {
        &self.steps[id.index()]
    }

    /// One sentence per step, joined with `". "`. Consumer layers depend on
    /// this exact join shape.
    pub fn render(&self, store: &FactStore) -> String {
        let mut sentences = Vec::new();
        render_step(self, self.root, store, &mut sentences);
        sentences.join(". ")
    }
}

fn fact_sentence(store: &FactStore, id: FactId) -> String {
    match store.fact(id) {
        Some(fact) => format!(
            "{} holds between {} and {}",
            store.vocabulary().name_of(fact.triple.operator),
            arg_text(store, fact.triple.arg1),
            arg_text(store, fact.triple.arg2),
        ),
        None => "a fact no longer in the store".to_string(),
    }
}

fn arg_text(store: &FactStore, arg: Arg) -> String {
    match arg {
        Arg::Symbol(sym) => store.vocabulary().name_of(sym).to_string(),
        Arg::Compound(id) => format!("compound#{}", id.index()),
    }
}

fn render_step(proof: &Proof, id: StepId, store: &FactStore, out: &mut Vec<String>) {
    let step = proof.step(id);
    let sentence = match step.kind {
        StepKind::FactInKB => match step.fact {
            Some(fact) => format!("Found that {}", fact_sentence(store, fact)),
            None => "Found a matching fact".to_string(),
        },
        StepKind::TransitiveHop => format!(
            "Followed a chain of {} facts to the goal",
            step.sub_steps.len()
        ),
        StepKind::InheritanceHop => "Inherited the property from a parent category".to_string(),
        StepKind::RuleApplication => match step.fact {
            Some(fact) => format!("Applied the rule that {}", fact_sentence(store, fact)),
            None => "Applied a rule".to_string(),
        },
        StepKind::AndAll => format!("Proved all {} required parts", step.sub_steps.len()),
        StepKind::OrBranch => "Proved one branch of a disjunction".to_string(),
        StepKind::NotBlocked => "The negation failed because the underlying goal was proven".to_string(),
        StepKind::CWA => "Assumed false because nothing proved it true".to_string(),
        StepKind::Timeout => "The search ran out of time before reaching a verdict".to_string(),
    };
    out.push(sentence);
    for child in &step.sub_steps {
        render_step(proof, *child, store, out);
    }
}

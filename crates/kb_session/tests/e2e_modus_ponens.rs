//! Rule firing across a variable-bound `Implies`, and the companion
//! regression test that a ground-antecedent rule never leaks across
//! entities it was never written for.

use kb_session::{Session, SessionConfig, Verdict};

#[test]
fn variable_rule_fires_with_the_subject_bound() {
    let mut session = Session::new(SessionConfig::default());

    session.learn("Implies (hasProperty ?x big) (hasProperty ?x green)");
    session.learn("hasProperty Bob big");

    let report = session.prove("hasProperty Bob green");
    assert_eq!(report.verdict, Verdict::Proven);
    assert!(report.proof.as_deref().unwrap_or_default().contains("Applied the rule that"));
}

#[test]
fn ground_antecedent_rule_does_not_leak_to_a_different_subject() {
    let mut session = Session::new(SessionConfig::default());

    session.learn("Implies (hasProperty Ice cold) (hasProperty Ice frozen)");
    session.learn("hasProperty Ice cold");
    // Water also happens to be cold, but the rule above names Ice
    // specifically — it must not fire for Water.
    session.learn("hasProperty Water cold");

    assert_eq!(session.prove("hasProperty Ice frozen").verdict, Verdict::Proven);
    assert_eq!(session.prove("hasProperty Water frozen").verdict, Verdict::NotProven);
}

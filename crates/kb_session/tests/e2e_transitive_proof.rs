//! `isA` chains transitively by construction, with no theory declaration
//! needed (unlike an ordinary relation, which only transitively closes once
//! tagged `__TransitiveRelation`).

use kb_session::{Session, SessionConfig, Verdict};

#[test]
fn two_step_isa_chain_proves_transitively() {
    let mut session = Session::new(SessionConfig::default());

    let learned = session.learn("isA Dog Mammal\nisA Mammal Animal");
    assert!(learned.success);
    assert_eq!(learned.facts_added, 2);

    let report = session.prove("isA Dog Animal");
    assert_eq!(report.verdict, Verdict::Proven);
    assert!(report.proof.as_deref().unwrap_or_default().contains("Followed a chain of"));
}

#[test]
fn unrelated_categories_do_not_prove() {
    let mut session = Session::new(SessionConfig::default());
    session.learn("isA Dog Mammal\nisA Mammal Animal");

    let report = session.prove("isA Dog Plant");
    assert_eq!(report.verdict, Verdict::NotProven);
}

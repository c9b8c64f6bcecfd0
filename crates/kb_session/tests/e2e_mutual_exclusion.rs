//! A `mutuallyExclusive` rejection rolls the whole `learn` call back, even
//! when the contradicting statement shares a batch with an otherwise
//! unrelated one.

use kb_session::{Session, SessionConfig, Verdict};

#[test]
fn rejected_batch_leaves_no_trace_and_the_prior_fact_still_proves() {
    let mut session = Session::new(SessionConfig::default());

    session.learn("mutuallyExclusive hasState Open Closed");
    let opened = session.learn("hasState Door Open");
    assert!(opened.success);

    let batch = session.learn("hasState Door Closed\nisA Widget Gadget");
    assert!(!batch.success);
    assert_eq!(batch.facts_added, 0);
    assert!(!batch.errors.is_empty());

    assert_eq!(session.prove("hasState Door Open").verdict, Verdict::Proven);
    assert_eq!(session.prove("hasState Door Closed").verdict, Verdict::NotProven);
    assert_eq!(session.prove("isA Widget Gadget").verdict, Verdict::NotProven);
}

#[test]
fn direct_negation_is_also_rejected() {
    let mut session = Session::new(SessionConfig::default());
    session.learn("hasState Door Open");

    let rejected = session.learn("Not hasState Door Open");
    assert!(!rejected.success);
    assert_eq!(session.prove("hasState Door Open").verdict, Verdict::Proven);
}

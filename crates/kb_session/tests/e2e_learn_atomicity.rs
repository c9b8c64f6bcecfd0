//! A rejected `learn` batch must leave no trace at all — not just of the
//! facts it tried to assert, but of any `alias`/`synonym`/`mutuallyExclusive`
//! /`contradictsSameArgs`/`exception` directive bundled into the same batch.

use kb_session::{Session, SessionConfig, Verdict};

#[test]
fn a_rule_declared_in_a_rejected_batch_does_not_survive_the_rollback() {
    let mut session = Session::new(SessionConfig::default());

    let batch = session.learn("mutuallyExclusive status A B\nstatus X A\nstatus X B");
    assert!(!batch.success);
    assert_eq!(batch.facts_added, 0);

    // If `mutuallyExclusive status A B` had leaked out of the rejected
    // batch, this second, unrelated pair would also be rejected.
    let learned = session.learn("status Y A\nstatus Y B");
    assert!(learned.success);
    assert_eq!(learned.facts_added, 2);
}

#[test]
fn an_alias_declared_in_a_rejected_batch_does_not_survive_the_rollback() {
    let mut session = Session::new(SessionConfig::default());
    session.learn("isA Fido Dog");

    let batch = session.learn("alias Doggo Dog\nNot isA Fido Dog");
    assert!(!batch.success);
    assert_eq!(batch.facts_added, 0);

    // If `alias Doggo Dog` had leaked out, `Doggo` would canonicalize to
    // `Dog` and this fresh fact would immediately prove `isA Rex Dog`.
    let learned = session.learn("isA Rex Doggo");
    assert!(learned.success);
    assert_eq!(session.prove("isA Rex Dog").verdict, Verdict::NotProven);
}

#[test]
fn an_exception_declared_in_a_rejected_batch_does_not_survive_the_rollback() {
    let mut session = Session::new(SessionConfig::default());
    session.learn("isA Fido Dog");

    // `exception Not isA Fido Dog` would normally exempt that exact negation
    // from the direct-negation check; bundling it with an unrelated
    // rejected statement must roll both back together.
    let batch = session.learn(
        "exception Not isA Fido Dog\nmutuallyExclusive isA Gadget NotGadget\nisA Widget Gadget\nisA Widget NotGadget",
    );
    assert!(!batch.success);
    assert_eq!(batch.facts_added, 0);

    // If the exception had leaked out of the rejected batch, this would
    // succeed instead of being rejected as a direct negation.
    let rejected_again = session.learn("Not isA Fido Dog");
    assert!(!rejected_again.success);
    assert_eq!(session.prove("isA Fido Dog").verdict, Verdict::Proven);
}

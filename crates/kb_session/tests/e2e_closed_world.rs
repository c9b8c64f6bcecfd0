//! Closed-world assumption: `Not(P)` only succeeds by absence when CWA is
//! on, and never when `P` is itself provable.

use kb_session::{Session, SessionConfig, Verdict};

fn cwa_session() -> Session {
    let config = SessionConfig { closed_world_assumption: true, ..SessionConfig::default() };
    Session::new(config)
}

#[test]
fn provable_goal_blocks_its_own_negation_even_under_cwa() {
    let mut session = cwa_session();
    session.learn("hasProperty Harry big");

    let report = session.prove("Not (hasProperty Harry big)");
    assert_eq!(report.verdict, Verdict::NotProven);
}

#[test]
fn absent_goal_proves_its_negation_under_cwa() {
    let mut session = cwa_session();
    session.learn("hasProperty Harry big");

    let report = session.prove("Not (hasProperty Zed big)");
    assert_eq!(report.verdict, Verdict::Proven);
    assert!(report.proof.as_deref().unwrap_or_default().contains("Assumed false"));
}

#[test]
fn absent_goal_is_unknown_not_disproven_with_cwa_off() {
    let mut session = Session::new(SessionConfig::default());
    session.learn("hasProperty Harry big");

    let report = session.prove("Not (hasProperty Zed big)");
    assert_eq!(report.verdict, Verdict::NotProven);
}

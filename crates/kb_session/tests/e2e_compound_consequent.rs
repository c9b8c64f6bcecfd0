//! Modus ponens over a compound (`And`) consequent: proving a single leaf
//! inside the conjunction must succeed without requiring the caller to
//! prove the whole conjunction at once.

use kb_session::{Session, SessionConfig, Verdict};

#[test]
fn proving_one_leaf_of_a_conjoined_consequent_succeeds() {
    let mut session = Session::new(SessionConfig::default());

    session.learn(
        "Implies (And (isA ?x Wumpus) (isA ?x Sterpus) (isA ?x Gorpus)) (And (isA ?x Zumpus) (isA ?x Impus))",
    );
    session.learn("isA Sally Wumpus");
    session.learn("isA Sally Sterpus");
    session.learn("isA Sally Gorpus");

    assert_eq!(session.prove("isA Sally Zumpus").verdict, Verdict::Proven);
    assert_eq!(session.prove("isA Sally Impus").verdict, Verdict::Proven);
}

#[test]
fn missing_one_antecedent_leaf_blocks_the_rule() {
    let mut session = Session::new(SessionConfig::default());

    session.learn(
        "Implies (And (isA ?x Wumpus) (isA ?x Sterpus) (isA ?x Gorpus)) (And (isA ?x Zumpus) (isA ?x Impus))",
    );
    session.learn("isA Sally Wumpus");
    session.learn("isA Sally Sterpus");
    // Gorpus never asserted for Sally.

    assert_eq!(session.prove("isA Sally Zumpus").verdict, Verdict::NotProven);
}

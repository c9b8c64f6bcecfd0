//! Three-coloring a triangle graph through a `solve { csp ... }` block,
//! driven entirely through `learn`/`prove` — mirrors kb_plan's
//! `three_color_triangle_has_solutions` unit test but at the DSL surface.

use kb_session::{Session, SessionConfig, Verdict};

fn triangle_world(session: &mut Session) {
    for region in ["RegionA", "RegionB", "RegionC"] {
        for color in ["Red", "Green", "Blue"] {
            let report = session.learn(&format!("domain {region} {color}"));
            assert!(report.success, "{region}/{color}: {:?}", report.errors);
        }
    }
    let report = session.learn(
        "constraint RegionA RegionB\n\
         constraint RegionB RegionC\n\
         constraint RegionA RegionC",
    );
    assert!(report.success);
}

#[test]
fn three_color_triangle_has_all_six_proper_colorings() {
    let mut session = Session::new(SessionConfig::default());
    triangle_world(&mut session);

    let solved = session.learn("@coloring1 solve csp\nend");
    assert!(solved.success, "{:?}", solved.errors);

    assert_eq!(session.prove("cspSolutionCount coloring1 6").verdict, Verdict::Proven);
}

#[test]
fn two_colors_cannot_satisfy_a_triangle() {
    let mut session = Session::new(SessionConfig::default());
    for region in ["RegionA", "RegionB", "RegionC"] {
        for color in ["Red", "Blue"] {
            let report = session.learn(&format!("domain {region} {color}"));
            assert!(report.success);
        }
    }
    session.learn(
        "constraint RegionA RegionB\n\
         constraint RegionB RegionC\n\
         constraint RegionA RegionC",
    );

    let solved = session.learn("@coloring2 solve csp\nend");
    assert!(!solved.success);
}

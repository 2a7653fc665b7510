mod common;

use common::ClassicBuilder;
use fission_core::classic::ClassicEvaluator;
use fission_core::PlannerConfig;
use fission_data::{ClassicGoal, ClassicTile, Cooler, Symmetry};
use fission_opt_lib::engine::{Engine, CLASSIC_BATCH};
use fission_opt_lib::render;

fn run(engine: &mut Engine, batches: usize) {
    for _ in 0..batches {
        engine.run_batch();
    }
}

#[test]
fn test_best_respects_limits() {
    let settings = ClassicBuilder::new()
        .with(|s| {
            s.limits.cell = 2;
            s.limits.moderator = 0;
            s.limits.set(ClassicTile::Passive(Cooler::Water), 1);
        })
        .build();
    let mut engine = Engine::classic(&settings, &PlannerConfig::default()).unwrap();
    run(&mut engine, 4);

    for best in [engine.best_classic(), engine.best_classic_no_net_heat()]
        .into_iter()
        .flatten()
    {
        let grid = best.grid();
        assert!(grid.count(|t| t == ClassicTile::Cell) <= 2);
        assert_eq!(grid.count(|t| t == ClassicTile::Moderator), 0);
        assert!(grid.count(|t| t == ClassicTile::Passive(Cooler::Water)) <= 1);
        assert_eq!(grid.count(|t| matches!(t, ClassicTile::Active(_))), 0);
    }
}

#[test]
fn test_snapshot_is_canonical() {
    let settings = ClassicBuilder::new().with_size(4, 3, 3).build();
    let mut engine = Engine::classic(&settings, &PlannerConfig::default()).unwrap();
    run(&mut engine, 4);

    let best = engine.best_classic().unwrap();
    let eval = ClassicEvaluator::new(&settings).evaluate(best.grid());
    assert!(eval.invalid.is_empty());
    assert!((eval.metrics.power - best.metrics().power).abs() < 1e-9);
    assert!((eval.metrics.heat - best.metrics().heat).abs() < 1e-9);
    assert!((eval.metrics.cooling - best.metrics().cooling).abs() < 1e-9);
}

#[test]
fn test_data_buffer_matches_grid() {
    let mut engine = Engine::classic(&ClassicBuilder::new().build(), &PlannerConfig::default())
        .unwrap();
    run(&mut engine, 2);

    let best = engine.best_classic().unwrap();
    for ((x, y, z), tile) in best.grid().iter() {
        let offset = x as isize * best.stride(0)
            + y as isize * best.stride(1)
            + z as isize * best.stride(2);
        assert_eq!(ClassicTile::from_id(best.data()[offset as usize]), Some(tile));
    }
}

#[test]
fn test_every_goal_runs() {
    for goal in [ClassicGoal::Power, ClassicGoal::Breeder, ClassicGoal::Efficiency] {
        let settings = ClassicBuilder::new().with(|s| s.goal = goal).build();
        let mut engine = Engine::classic(&settings, &PlannerConfig::default()).unwrap();
        run(&mut engine, 2);
        assert_eq!(engine.steps(), 2 * CLASSIC_BATCH);
        let score = engine.as_local_search().unwrap().best_score().unwrap();
        assert!(score.is_finite(), "goal {goal:?} produced {score}");
    }
}

#[test]
fn test_symmetric_best() {
    let settings = ClassicBuilder::new()
        .with_size(5, 3, 4)
        .with_symmetry(Symmetry::new(true, false, true))
        .build();
    let mut engine = Engine::classic(&settings, &PlannerConfig::default()).unwrap();
    run(&mut engine, 3);

    let search = engine.as_local_search().unwrap();
    let best = engine.best_classic().unwrap();
    assert!(search.mirror().is_fixed_point(best.grid()));
}

#[test]
fn test_render_best() {
    let mut engine = Engine::classic(&ClassicBuilder::new().build(), &PlannerConfig::default())
        .unwrap();
    run(&mut engine, 1);

    let best = engine.best_classic().unwrap();
    let text = render::layers(&**best);
    assert_eq!(text.lines().count(), 3 * (1 + 3));
    assert!(text.contains("Layer 3"));
    assert!(text.lines().filter(|l| !l.starts_with("Layer")).all(|l| l.len() == 9));
    assert!(render::classic_summary(best.metrics()).contains("dutyCycle="));
}

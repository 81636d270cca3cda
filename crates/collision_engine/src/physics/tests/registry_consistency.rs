//! Registry and tree stay in lock-step under random churn
//!
//! Seeded sequences of register, deregister, move and resize calls, checked
//! after every step against the tree structure and a brute-force pairwise
//! classification.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::WorldConfig;
use crate::foundation::math::Vec2;
use crate::physics::CollisionEngine;

#[cfg(test)]
mod tests {
    use super::*;

    const POOL: usize = 24;
    const STEPS: usize = 400;

    fn id(n: usize) -> String {
        format!("e{n:02}")
    }

    fn random_size(rng: &mut StdRng) -> Vec2 {
        Vec2::new(rng.gen_range(0.0..30.0), rng.gen_range(0.0..30.0))
    }

    fn random_position(rng: &mut StdRng) -> Vec2 {
        // Reaches past the initial world so growth is exercised too
        Vec2::new(rng.gen_range(-40.0..260.0), rng.gen_range(-40.0..260.0))
    }

    fn churn(rng: &mut StdRng, engine: &mut CollisionEngine) {
        let target = id(rng.gen_range(0..POOL));
        match rng.gen_range(0..5) {
            0 => {
                let position = random_position(rng);
                let size = random_size(rng);
                let expected = !engine.contains(&target);
                assert_eq!(engine.register(target.as_str(), position, size), expected);
            }
            1 => {
                let expected = engine.contains(&target);
                assert_eq!(engine.deregister(&target), expected);
            }
            2 => {
                let position = random_position(rng);
                let expected = engine.contains(&target);
                assert_eq!(engine.move_to(&target, position), expected);
            }
            3 => {
                let delta = Vec2::new(rng.gen_range(-15.0..15.0), rng.gen_range(-15.0..15.0));
                let expected = engine.contains(&target);
                assert_eq!(engine.move_by(&target, delta), expected);
            }
            _ => {
                let size = random_size(rng);
                let expected = engine.contains(&target);
                assert_eq!(engine.resize_entity(&target, size), expected);
            }
        }
    }

    fn assert_tree_consistent(engine: &CollisionEngine) {
        let index = engine.index();
        let world = index.world_rect();
        assert_eq!(index.len(), engine.len());

        for item in index.all_items() {
            let name = item.id().as_str();
            assert!(engine.contains(name), "{name} is indexed but not registered");

            let node = engine.node_of(name).unwrap();
            assert_eq!(item.subscribers(), &[node], "{name} subscriptions");

            let holder = index.node(node).unwrap();
            assert!(holder.holds(name));
            assert!(holder.rect().contains_rect(&item.rect()), "{name} outside its node");
            assert!(world.contains_rect(&item.rect()), "{name} outside the world");
        }
    }

    fn assert_matches_brute_force(engine: &CollisionEngine, cached: bool) {
        for a in (0..POOL).map(id) {
            for b in (0..POOL).map(id) {
                if a == b {
                    continue;
                }
                let expected = match (engine.rect_of(&a), engine.rect_of(&b)) {
                    (Some(ra), Some(rb)) => ra.classified_intersect(&rb),
                    _ => Default::default(),
                };
                assert_eq!(engine.check_collision(&a, &b).unwrap(), expected, "{a} vs {b}");
                if cached {
                    assert_eq!(engine.check_cached_collision(&a, &b), expected, "cached {a} vs {b}");
                }
            }
        }
    }

    fn run(seed: u64, collapse_empty_nodes: bool) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut engine = CollisionEngine::new(WorldConfig {
            collapse_empty_nodes,
            ..WorldConfig::with_world(Vec2::new(200.0, 200.0), 2)
        })
        .unwrap();

        for step in 0..STEPS {
            churn(&mut rng, &mut engine);
            assert_tree_consistent(&engine);

            if step % 25 == 0 {
                engine.update();
                assert_matches_brute_force(&engine, true);
            }
        }
        assert_matches_brute_force(&engine, false);
    }

    #[test]
    fn test_random_churn_keeps_tree_consistent() {
        for seed in 0..8 {
            run(seed, false);
        }
    }

    #[test]
    fn test_random_churn_with_collapse_keeps_tree_consistent() {
        for seed in 100..108 {
            run(seed, true);
        }
    }
}

//! Property-based tests for the incremental BVH.
//!
//! Random sequences of inserts, removals and updates are mirrored in a plain
//! map; the tree must agree with it after every step.
//!
//! Run with: cargo test -p sim-core --test bvh_proptest

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use nalgebra::{Point3, Vector3};
use proptest::prelude::*;
use sim_core::{Aabb, BoundingSphere, BoundingVolume, Bvh};

// =============================================================================
// Strategies
// =============================================================================

fn arb_point() -> impl Strategy<Value = Point3<f64>> + Clone {
    prop::array::uniform3(-10.0..10.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

fn arb_aabb() -> impl Strategy<Value = Aabb> + Clone {
    (arb_point(), prop::array::uniform3(0.0..2.0f64))
        .prop_map(|(c, [x, y, z])| Aabb::from_center(c, Vector3::new(x, y, z)))
}

fn arb_sphere() -> impl Strategy<Value = BoundingSphere> + Clone {
    (arb_point(), -0.5..2.5f64).prop_map(|(c, r)| BoundingSphere::new(c, r))
}

#[derive(Debug, Clone)]
enum Op<V> {
    Insert(u32, V),
    Remove(u32),
    Update(u32, V),
}

/// Spheres on a lattice whose spacing equals the diameter, so neighbours
/// touch exactly, handed out in a random order.
fn arb_tangent_lattice() -> impl Strategy<Value = Vec<(u32, BoundingSphere)>> {
    (0.05..1.5f64, prop::array::uniform3(-50.0..50.0f64)).prop_flat_map(|(spacing, [x, y, z])| {
        let origin = Point3::new(x, y, z);
        let spheres: Vec<_> = (0..40_u32)
            .map(|id| {
                let (i, j, k) = (id % 4, (id / 4) % 5, id / 20);
                let center = origin
                    + Vector3::new(f64::from(i), f64::from(j), f64::from(k)) * spacing;
                (id, BoundingSphere::new(center, spacing * 0.5))
            })
            .collect();
        Just(spheres).prop_shuffle()
    })
}

fn arb_ops<V: std::fmt::Debug + Clone>(
    volume: impl Strategy<Value = V> + Clone,
) -> impl Strategy<Value = Vec<Op<V>>> {
    let op = prop_oneof![
        3 => (0..24u32, volume.clone()).prop_map(|(id, v)| Op::Insert(id, v)),
        1 => (0..24u32).prop_map(Op::Remove),
        2 => (0..24u32, volume).prop_map(|(id, v)| Op::Update(id, v)),
    ];
    prop::collection::vec(op, 1..80)
}

// =============================================================================
// Helpers
// =============================================================================

/// Apply `ops` to a tree and a model, checking each step's return value.
fn replay<V: BoundingVolume>(ops: &[Op<V>]) -> (Bvh<V, u32>, BTreeMap<u32, V>) {
    let mut bvh = Bvh::new();
    let mut model = BTreeMap::new();

    for op in ops {
        match op {
            Op::Insert(id, v) => {
                let fresh = !model.contains_key(id);
                assert_eq!(bvh.insert(*id, v.clone()), fresh);
                if fresh {
                    model.insert(*id, v.clone());
                }
            }
            Op::Remove(id) => {
                assert_eq!(bvh.remove(*id), model.remove(id).is_some());
            }
            Op::Update(id, v) => {
                let present = model.contains_key(id);
                assert_eq!(bvh.update(*id, v.clone()), present);
                if present {
                    model.insert(*id, v.clone());
                }
            }
        }
        assert_eq!(bvh.len(), model.len());
    }
    (bvh, model)
}

fn brute_force_pairs<V: BoundingVolume>(model: &BTreeMap<u32, V>) -> Vec<(u32, u32)> {
    let entries: Vec<_> = model.iter().collect();
    let mut pairs = Vec::new();
    for (i, (id_a, a)) in entries.iter().enumerate() {
        for (id_b, b) in &entries[i + 1..] {
            if a.overlaps(*b) {
                pairs.push((**id_a, **id_b));
            }
        }
    }
    pairs
}

fn coarse_pairs<V: BoundingVolume>(bvh: &Bvh<V, u32>) -> Vec<(u32, u32)> {
    let mut pairs = Vec::new();
    let count = bvh.generate_coarse_collisions(&mut pairs);
    assert_eq!(count, pairs.len());
    pairs.sort_unstable();
    pairs
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn aabb_tree_tracks_model(ops in arb_ops(arb_aabb())) {
        let (bvh, model) = replay(&ops);

        prop_assert!(bvh.is_consistent());
        prop_assert_eq!(bvh.ids().collect::<Vec<_>>(), model.keys().copied().collect::<Vec<_>>());
        for (id, v) in &model {
            prop_assert_eq!(bvh.volume(*id), Some(v));
        }
    }

    #[test]
    fn sphere_tree_tracks_model(ops in arb_ops(arb_sphere())) {
        let (bvh, model) = replay(&ops);
        prop_assert!(bvh.is_consistent());
        prop_assert_eq!(bvh.len(), model.len());
    }

    #[test]
    fn aabb_coarse_pairs_match_brute_force(ops in arb_ops(arb_aabb())) {
        let (bvh, model) = replay(&ops);
        prop_assert_eq!(coarse_pairs(&bvh), brute_force_pairs(&model));
    }

    #[test]
    fn sphere_coarse_pairs_match_brute_force(ops in arb_ops(arb_sphere())) {
        let (bvh, model) = replay(&ops);
        prop_assert_eq!(coarse_pairs(&bvh), brute_force_pairs(&model));
    }

    #[test]
    fn absent_ids_leave_tree_untouched(
        ops in arb_ops(arb_aabb()),
        volume in arb_aabb(),
    ) {
        let (mut bvh, model) = replay(&ops);
        let absent = 1000;
        let before = (bvh.len(), bvh.root_volume().copied(), coarse_pairs(&bvh));

        prop_assert!(!bvh.remove(absent));
        prop_assert!(!bvh.update(absent, volume));

        let after = (bvh.len(), bvh.root_volume().copied(), coarse_pairs(&bvh));
        prop_assert_eq!(before, after);
        prop_assert_eq!(bvh.len(), model.len());
    }

    #[test]
    fn query_matches_brute_force(
        ops in arb_ops(arb_aabb()),
        query_box in arb_aabb(),
    ) {
        let (bvh, model) = replay(&ops);
        let expected: Vec<u32> = model
            .iter()
            .filter(|(_, v)| v.overlaps(&query_box))
            .map(|(id, _)| *id)
            .collect();
        prop_assert_eq!(bvh.query(&query_box), expected);
    }

    #[test]
    fn tangent_spheres_keep_every_pair(spheres in arb_tangent_lattice()) {
        let mut bvh = Bvh::new();
        let mut model = BTreeMap::new();
        for (id, sphere) in &spheres {
            prop_assert!(bvh.insert(*id, *sphere));
            model.insert(*id, *sphere);
        }

        prop_assert!(bvh.is_consistent());
        prop_assert_eq!(coarse_pairs(&bvh), brute_force_pairs(&model));
    }

    #[test]
    fn root_encloses_every_leaf(ops in arb_ops(arb_sphere())) {
        let (bvh, model) = replay(&ops);
        if let Some(root) = bvh.root_volume() {
            for v in model.values() {
                prop_assert!(root.contains(v));
            }
        } else {
            prop_assert!(model.is_empty());
        }
    }
}

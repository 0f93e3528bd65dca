use std::sync::atomic::{AtomicUsize, Ordering};

use prim_index::{Bvh, KdTree, LazyIndex};
use prim_math::{DVec3, LineSegment, Point3};
use proptest::prelude::*;
use rayon::prelude::*;

fn arb_point() -> impl Strategy<Value = Point3> {
    (-50.0f64..50.0, -50.0f64..50.0, -50.0f64..50.0).prop_map(|(x, y, z)| DVec3::new(x, y, z))
}

#[test]
fn test_lazy_index_concurrent_build_runs_once() {
    let builds = AtomicUsize::new(0);
    let lazy: LazyIndex<KdTree> = LazyIndex::new();
    let points: Vec<Point3> = (0..1000)
        .map(|i| DVec3::new(i as f64, (i * 7 % 13) as f64, 0.0))
        .collect();

    let hits: Vec<usize> = (0..256)
        .into_par_iter()
        .map(|i| {
            let tree = lazy.get_or_build(|| {
                builds.fetch_add(1, Ordering::SeqCst);
                KdTree::build(&points)
            });
            tree.nearest(DVec3::new(i as f64 + 0.1, 0.0, 0.0))
                .map(|n| n.index)
                .unwrap_or(usize::MAX)
        })
        .collect();

    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert!(hits.iter().all(|&h| h != usize::MAX));
}

proptest! {
    #[test]
    fn kdtree_nearest_matches_brute_force(
        points in prop::collection::vec(arb_point(), 1..200),
        query in arb_point(),
    ) {
        let tree = KdTree::build(&points);
        let hit = tree.nearest(query).unwrap();
        let brute = points
            .iter()
            .map(|p| (*p - query).length_squared())
            .fold(f64::INFINITY, f64::min);
        prop_assert!((hit.distance_squared - brute).abs() <= 1e-9 * brute.max(1.0));
        prop_assert!(((points[hit.index] - query).length_squared() - brute).abs() <= 1e-9 * brute.max(1.0));
    }

    #[test]
    fn bvh_nearest_matches_brute_force(
        ends in prop::collection::vec((arb_point(), arb_point()), 1..150),
        query in arb_point(),
    ) {
        let segs: Vec<LineSegment> = ends.iter().map(|&(a, b)| LineSegment::new(a, b)).collect();
        let bvh = Bvh::build(segs.clone());
        let hit = bvh.nearest(query, |s| Some((s.distance_squared(query), ()))).unwrap();
        let brute = segs
            .iter()
            .map(|s| s.distance_squared(query))
            .fold(f64::INFINITY, f64::min);
        prop_assert!((hit.distance_squared - brute).abs() <= 1e-9 * brute.max(1.0));
    }

    #[test]
    fn kdtree_order_is_a_permutation(points in prop::collection::vec(arb_point(), 0..100)) {
        let tree = KdTree::build(&points);
        let mut order = tree.order().to_vec();
        order.sort_unstable();
        prop_assert_eq!(order, (0..points.len()).collect::<Vec<_>>());
    }
}

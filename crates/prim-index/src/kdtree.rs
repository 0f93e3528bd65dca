//! Exact nearest-neighbour kd-tree over points.

use std::cmp::Ordering;

use prim_math::{Aabb3, Point3};
use tracing::{debug, instrument};

pub const KD_LEAF_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
enum KdNode {
    Leaf { start: u32, count: u32 },
    Split { axis: u8, value: f64, left: u32, right: u32 },
}

/// Result of a nearest-neighbour lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPoint {
    /// Caller index of the point.
    pub index: usize,
    pub distance_squared: f64,
}

/// An immutable kd-tree. Points are stored permuted; `order[i]` is the
/// caller's index of `points[i]`.
#[derive(Debug, Clone)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    points: Vec<Point3>,
    order: Vec<usize>,
}

impl KdTree {
    /// Build by recursive median split on the widest axis.
    #[instrument(skip_all, fields(points = points.len()))]
    pub fn build(points: &[Point3]) -> Self {
        let mut order: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::new();
        if !order.is_empty() {
            let len = order.len();
            build_node(&mut nodes, points, &mut order, 0, len);
        }
        let points: Vec<Point3> = order.iter().map(|&i| points[i]).collect();

        debug!(nodes = nodes.len(), points = points.len(), "built kd-tree");
        Self {
            nodes,
            points,
            order,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// The closest point to `query`. Equidistant points resolve to the lowest caller index.
    ///
    /// Any non-empty tree answers a non-NaN query, even one far enough away
    /// that every squared distance is infinite.
    pub fn nearest(&self, query: Point3) -> Option<NearestPoint> {
        if self.nodes.is_empty() || query.is_nan() {
            return None;
        }
        let mut best: Option<NearestPoint> = None;
        self.search(0, query, &mut best);
        best
    }

    fn search(&self, node_index: usize, query: Point3, best: &mut Option<NearestPoint>) {
        match self.nodes[node_index] {
            KdNode::Leaf { start, count } => {
                let start = start as usize;
                let end = start + count as usize;
                for slot in start..end {
                    let d2 = (self.points[slot] - query).length_squared();
                    let index = self.order[slot];
                    let better = match best {
                        None => true,
                        Some(b) => {
                            d2 < b.distance_squared
                                || (d2 == b.distance_squared && index < b.index)
                        }
                    };
                    if better {
                        *best = Some(NearestPoint {
                            index,
                            distance_squared: d2,
                        });
                    }
                }
            }
            KdNode::Split {
                axis,
                value,
                left,
                right,
            } => {
                let diff = query[axis as usize] - value;
                let (near, far) = if diff < 0.0 { (left, right) } else { (right, left) };
                self.search(near as usize, query, best);
                let bound = best.map_or(f64::INFINITY, |b| b.distance_squared);
                if diff * diff <= bound {
                    self.search(far as usize, query, best);
                }
            }
        }
    }
}

fn build_node(
    nodes: &mut Vec<KdNode>,
    points: &[Point3],
    order: &mut [usize],
    start: usize,
    end: usize,
) -> u32 {
    let count = end - start;
    let node_index = nodes.len() as u32;
    nodes.push(KdNode::Leaf {
        start: start as u32,
        count: count as u32,
    });
    if count <= KD_LEAF_SIZE {
        return node_index;
    }

    let mut bounds = Aabb3::empty();
    for &i in &order[start..end] {
        bounds.include_point(points[i]);
    }
    let axis = bounds.longest_axis();

    let half = count / 2;
    order[start..end].select_nth_unstable_by(half, |&a, &b| {
        points[a][axis]
            .partial_cmp(&points[b][axis])
            .unwrap_or(Ordering::Equal)
    });
    let mid = start + half;
    let value = points[order[mid]][axis];

    let left = build_node(nodes, points, order, start, mid);
    let right = build_node(nodes, points, order, mid, end);
    nodes[node_index as usize] = KdNode::Split {
        axis: axis as u8,
        value,
        left,
        right,
    };

    node_index
}

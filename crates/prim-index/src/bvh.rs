//! Bounding volume hierarchy over arbitrary bounded items.

use std::cmp::Ordering;

use prim_math::{Aabb3, Bounded, Point3};
use tracing::{debug, instrument};

pub const BVH_NONE: u32 = u32::MAX;
pub const BVH_LEAF_SIZE: usize = 4;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BvhNode {
    pub bounds: Aabb3,
    pub left: u32,
    pub right: u32,
    pub start: u32,
    pub count: u32,
}

impl BvhNode {
    pub fn is_leaf(&self) -> bool {
        self.left == BVH_NONE
    }
}

/// Best candidate found by [`Bvh::nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestItem<R> {
    pub distance_squared: f64,
    pub value: R,
}

/// An immutable BVH.
///
/// Items are stored permuted so every leaf references a contiguous slice;
/// `order[i]` is the caller's index of `items[i]`.
#[derive(Debug, Clone)]
pub struct Bvh<T> {
    nodes: Vec<BvhNode>,
    items: Vec<T>,
    order: Vec<usize>,
}

impl<T: Bounded> Bvh<T> {
    /// Build top-down, splitting each node at the median of its longest axis.
    #[instrument(skip_all, fields(items = items.len()))]
    pub fn build(items: Vec<T>) -> Self {
        let bounds: Vec<Aabb3> = items.iter().map(Bounded::aabb).collect();
        let centers: Vec<Point3> = bounds.iter().map(Aabb3::center).collect();

        let mut order: Vec<usize> = (0..items.len()).collect();
        let mut nodes = Vec::new();
        if !order.is_empty() {
            let len = order.len();
            build_node(&mut nodes, &bounds, &centers, &mut order, 0, len);
        }

        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        let items: Vec<T> = order.iter().filter_map(|&i| slots[i].take()).collect();

        debug!(nodes = nodes.len(), items = items.len(), "built bvh");
        Self {
            nodes,
            items,
            order,
        }
    }
}

impl<T> Bvh<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Items in leaf order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Caller index of each item in leaf order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn bounds(&self) -> Option<Aabb3> {
        self.nodes.first().map(|n| n.bounds)
    }

    /// Branch-and-bound search for the item minimising `eval`.
    ///
    /// `eval` returns the squared distance from `query` to an item together
    /// with any payload the caller wants back; it may return `None` to skip
    /// an item. Children are visited nearest-box first, and a child is skipped
    /// once its box is no closer than the best item found so far.
    ///
    /// Until a first candidate is found every box is entered and every item
    /// is accepted, so a far query whose squared distances overflow to
    /// infinity still gets an answer. A NaN query gets none.
    pub fn nearest<R, F>(&self, query: Point3, mut eval: F) -> Option<NearestItem<R>>
    where
        F: FnMut(&T) -> Option<(f64, R)>,
    {
        if self.nodes.is_empty() || query.is_nan() {
            return None;
        }
        let mut best = None;
        let mut best_d2 = f64::INFINITY;
        self.visit(0, query, &mut eval, &mut best, &mut best_d2);
        best
    }

    fn visit<R, F>(
        &self,
        node_index: usize,
        query: Point3,
        eval: &mut F,
        best: &mut Option<NearestItem<R>>,
        best_d2: &mut f64,
    ) where
        F: FnMut(&T) -> Option<(f64, R)>,
    {
        let node = &self.nodes[node_index];
        if node.is_leaf() {
            let start = node.start as usize;
            let end = start + node.count as usize;
            for item in &self.items[start..end] {
                if let Some((d2, value)) = eval(item) {
                    if best.is_none() || d2 < *best_d2 {
                        *best_d2 = d2;
                        *best = Some(NearestItem {
                            distance_squared: d2,
                            value,
                        });
                    }
                }
            }
            return;
        }

        let left = node.left as usize;
        let right = node.right as usize;
        let left_d2 = self.nodes[left].bounds.distance_squared(query);
        let right_d2 = self.nodes[right].bounds.distance_squared(query);
        let (near, near_d2, far, far_d2) = if left_d2 <= right_d2 {
            (left, left_d2, right, right_d2)
        } else {
            (right, right_d2, left, left_d2)
        };

        if best.is_none() || near_d2 < *best_d2 {
            self.visit(near, query, eval, best, best_d2);
        }
        if best.is_none() || far_d2 < *best_d2 {
            self.visit(far, query, eval, best, best_d2);
        }
    }
}

fn build_node(
    nodes: &mut Vec<BvhNode>,
    bounds: &[Aabb3],
    centers: &[Point3],
    order: &mut [usize],
    start: usize,
    end: usize,
) -> u32 {
    let mut node_bounds = Aabb3::empty();
    for &i in &order[start..end] {
        node_bounds.include(&bounds[i]);
    }

    let count = end - start;
    let node_index = nodes.len() as u32;
    nodes.push(BvhNode {
        bounds: node_bounds,
        left: BVH_NONE,
        right: BVH_NONE,
        start: start as u32,
        count: count as u32,
    });

    if count <= BVH_LEAF_SIZE {
        return node_index;
    }

    // Split on the longest axis of the item centers.
    let mut center_bounds = Aabb3::empty();
    for &i in &order[start..end] {
        center_bounds.include_point(centers[i]);
    }
    let axis = center_bounds.longest_axis();

    let half = count / 2;
    order[start..end].select_nth_unstable_by(half, |&a, &b| {
        centers[a][axis]
            .partial_cmp(&centers[b][axis])
            .unwrap_or(Ordering::Equal)
    });

    let mid = start + half;
    let left = build_node(nodes, bounds, centers, order, start, mid);
    let right = build_node(nodes, bounds, centers, order, mid, end);

    let node = &mut nodes[node_index as usize];
    node.left = left;
    node.right = right;
    node.count = 0;

    node_index
}

//! Spatial indices for closest-point queries.

pub mod bvh;
pub mod kdtree;
pub mod lazy;

pub use bvh::{Bvh, BvhNode, NearestItem, BVH_LEAF_SIZE, BVH_NONE};
pub use kdtree::{KdTree, NearestPoint, KD_LEAF_SIZE};
pub use lazy::LazyIndex;

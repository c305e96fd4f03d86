//! Pointer picking: ray construction, ray/shape intersection, hover edge
//! detection and the per-frame picking session.
//!
//! # Invariants
//! - Intersection results are ordered by ascending distance, independent of
//!   candidate order.
//! - Each hover session tracks at most one hit, always the nearest of the
//!   latest frame for its group.
//! - Enter and leave fire exactly once per transition.
//! - Primary objects take picking priority over the model.

mod hover;
mod intersect;
mod ray;
mod session;

pub use hover::{HoverEdge, HoverSession};
pub use intersect::{
    intersect_object, intersect_objects, intersect_shape, ray_aabb, ray_sphere, ray_triangle,
    sort_by_distance, Intersection,
};
pub use ray::Ray;
pub use session::{FrameReport, HoverEvent, PickGroup, PickingSession};

mod dag;
mod search;
mod trap_map;
mod trapezoids;

pub use trap_map::TrapMap;
pub use trapezoids::{BoundingBox, Trapezoid};

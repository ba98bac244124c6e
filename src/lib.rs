//! Point location in a planar subdivision with a trapezoidal map.
//!
//! The subdivision is described by a set of pairwise non-crossing segments inside a bounding
//! box. [`TrapMap`] builds the trapezoidal decomposition of that set with the classical
//! randomized incremental algorithm, together with a search structure answering point-location
//! queries in expected *O*(log(*n*)) time.
//!
//! # Example
//!
//! ```
//! use trapmap::{BoundingBox, PointLocator, Segment, TrapMap};
//!
//! # fn main() -> anyhow::Result<()> {
//! let bbox = BoundingBox::new(0., 10., 0., 10.)?;
//! let segments = vec![
//!     Segment::new([1., 3.], [9., 3.]),
//!     Segment::new([2., 6.], [8., 7.]),
//! ];
//! let trap_map = TrapMap::from_segments(bbox, segments)?;
//!
//! // Points separated by a segment land in different trapezoids
//! assert_ne!(trap_map.locate_one(&[5., 1.]), trap_map.locate_one(&[5., 5.]));
//! // Points outside the bounding box are not located
//! assert_eq!(trap_map.locate_one(&[11., 1.]), None);
//! # Ok(())
//! # }
//! ```

mod geometry;
mod point_locator;
mod trapezoidal_map;

pub use geometry::{Point, Segment};
pub use point_locator::PointLocator;
pub use trapezoidal_map::{BoundingBox, TrapMap, Trapezoid};

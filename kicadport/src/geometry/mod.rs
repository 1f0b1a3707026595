//! Geometry helpers shared by the exporter: unit conversion, placement
//! frames, arc math, bounding boxes and orientation inference.

pub mod arc;
pub mod bbox;
pub mod orientation;
pub mod transform;

pub use arc::{arc_ends, extent_angles};
pub use bbox::{bounding_box, board_box, BoundingBox, ObjectRef};
pub use orientation::{infer_rotation, FIXED_ROTATION_ATTRIBUTE};
pub use transform::{area_to_mm2, point_to_mm, slot_shape, to_mm, Placement, Rotation, SlotShape};

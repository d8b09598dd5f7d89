//! Scanned-room model for RAMPART.
//!
//! A room is a set of labeled rectangular surfaces. It answers random
//! "give me a point on a surface like this" queries the way a headset scene
//! scan does: probabilistically, sometimes coming back empty even when a
//! valid surface exists.

pub mod room;
pub mod surface;

pub use rampart_core as core;
pub use room::Room;
pub use surface::{RoomLayout, SurfacePlane};

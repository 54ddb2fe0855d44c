//! The shared plane agents live on: navigation, sensing, points of interest, objects

pub mod locomotion;
pub mod nav;
pub mod objects;
pub mod poi;
pub mod sensor;

pub use locomotion::{Locomotion, SimpleLocomotion};
pub use nav::NavBounds;
pub use objects::{ObjectTickContext, WorldObject, WorldObjects};
pub use poi::{PoiRegistry, PointOfInterest};
pub use sensor::{AgentView, EntityRef, QueryFilter, SpatialSensor, WorldSensor};

/// Collision volumes: four analytic primitives and the enum that the
/// relaxation kernel dispatches over.
pub mod primitives;
pub mod dispatcher;

pub use dispatcher::{project_all, CollisionShape};
pub use primitives::{Collider, Cube, Cylinder, Plane, Sphere};

// Domain layer: ids, aim math, targets, and the host-visible projection.

pub mod aim;
pub mod ids;
pub mod ports;
pub mod projection;
pub mod targets;

pub use aim::{AimTracker, MalformedReading, Quaternion, Vector2, aim_angle};
pub use ids::{GameId, PlayerId};
pub use ports::{HitRequest, HitResolver, ResolveError};
pub use projection::{PlayerProjection, PlayerView, Projection, ProjectionSnapshot, ThrowOutcome};
pub use targets::TargetPool;

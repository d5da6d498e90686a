// Use cases layer: game registry and per-game session workflows.

pub mod registry;
pub mod session;
pub(crate) mod throttle;
pub mod types;

pub use registry::{GameRegistry, RegistryError};
pub use session::{GameSession, SessionError};
pub use types::{HostAction, PlayerAction, SessionSettings};

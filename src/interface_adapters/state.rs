use crate::use_cases::GameRegistry;
use std::sync::Arc;

// Shared application state for socket and HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    // Every live game, keyed by join code.
    pub registry: Arc<GameRegistry>,
}

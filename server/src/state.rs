use std::path::PathBuf;
use std::sync::Arc;

use crate::config::PageSettings;
use crate::ws::ConnectionRegistry;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Every open chat connection, in connection order
    pub registry: ConnectionRegistry,
    /// Title and description rendered on the chat page
    pub page: Arc<PageSettings>,
    /// Directory served under /static
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(registry: ConnectionRegistry, page: PageSettings, static_dir: PathBuf) -> Self {
        Self {
            registry,
            page: Arc::new(page),
            static_dir,
        }
    }
}

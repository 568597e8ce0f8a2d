pub mod actor;
pub mod broadcast;
pub mod codec;
pub mod handler;
pub mod protocol;
pub mod registry;
pub mod session;

use tokio::sync::mpsc;

pub use registry::ConnectionRegistry;

/// Type alias for the sender half of a WebSocket connection's outbound queue.
/// The connection's writer task owns the receiving half.
pub type ConnectionSender = mpsc::UnboundedSender<axum::extract::ws::Message>;

/// Identifies one WebSocket connection for its whole lifetime.
pub type ConnectionId = uuid::Uuid;

/// Create a new empty connection registry.
pub fn new_connection_registry() -> ConnectionRegistry {
    ConnectionRegistry::new()
}

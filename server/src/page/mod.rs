//! The page that bootstraps the browser client, plus its static assets.
//! Nothing here touches the connection registry.

pub mod chat;

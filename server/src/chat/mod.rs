//! Chat-room state: participants and the roster built from them.

pub mod client;
pub mod roster;

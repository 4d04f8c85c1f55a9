//! Network layer subsystem.
//!
//! # Design Decisions
//! - Listeners are bound synchronously during worker construction so a port
//!   conflict fails the generation instead of surfacing later
//! - The listener is owned by exactly one server task and dropped on shutdown

pub mod listener;

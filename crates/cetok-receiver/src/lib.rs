//! CloudEvents receiver for cetokjob
//!
//! Accepts CloudEvents over HTTP, turns each event's data into a flat string
//! payload, and hands it to a shared `JobGenerator`.

pub mod cloudevent;
pub mod config;
pub mod error;
pub mod namespace;
pub mod payload;
pub mod server;

pub use config::Cli;
pub use error::{EventError, ReceiverError};
pub use namespace::resolve_namespace;
pub use server::{receiver_router, serve, ReceiverState};

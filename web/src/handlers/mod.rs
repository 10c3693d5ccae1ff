//! HTTP handlers for the portal API.
//!
//! Handlers are thin: extract, call the engine, map the result. All of them
//! are generic over the engine's collaborators so the same code serves the
//! production wiring and the in-memory test wiring.

pub mod admin;
pub mod agreement;
pub mod details;
pub mod health;
pub mod requests;

pub use requests::RequestView;

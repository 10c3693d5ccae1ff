//! Recording mocks for testing.
//!
//! The in-memory [`crate::stores::MemoryRequestStore`] doubles as the test
//! store; these mocks cover the two outward-facing collaborators so tests
//! can assert on what the engine announced and rendered.

mod notifier;
mod renderer;

pub use notifier::MockNotifier;
pub use renderer::MockRenderer;

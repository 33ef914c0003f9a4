//! tabshell - headless driver for the tab/iframe session engine
//!
//! The engine itself lives in `tabshell-app` (state, messages, handlers) on
//! top of `tabshell-core` (document model, identities, errors, logging). This
//! crate adds the headless runner used by the binary and the E2E tests.

pub mod headless;

// Re-export main entry points
pub use headless::runner::{run_headless, CommandSource, Session, Step};

//! # tabshell-core - Core Domain Types
//!
//! Foundation crate for tabshell. Provides the in-memory document model, the
//! markup vocabulary shared with the host page, tab identity resolution,
//! error handling and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, regex, tracing).
//!
//! ## Public API
//!
//! ### Document Model (`dom`)
//! - [`Document`] - Arena of elements rooted at `<body>` with a mutation-record queue
//! - [`NodeId`] - Stable, never-reused element handle
//! - [`ElementSpec`] - Builder used to insert whole subtrees
//! - [`MutationRecord`] - A batch of structural changes under one parent
//!
//! ### Identity (`identity`)
//! - [`resolve_identity()`] - Derive a tab identity from a link reference
//! - [`TabIdentity`] - Normalized key distinguishing tabs
//!
//! ### Markup (`markup`)
//! - `data-lte-*` attribute names, class names, [`Widget`] and [`CloseScope`]
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `silent` vs `fatal` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use tabshell_core::prelude::*;
//! ```

pub mod dom;
pub mod error;
pub mod identity;
pub mod logging;
pub mod markup;

/// Prelude for common imports used throughout all tabshell crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use dom::{Document, Element, ElementSpec, MutationRecord, NodeId};
pub use error::{Error, Result, ResultExt};
pub use identity::{is_unusable_reference, resolve_identity, TabIdentity};
pub use markup::{CloseScope, Widget};

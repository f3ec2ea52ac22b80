//! # repoprompt core
//!
//! Domain types shared by every repoprompt crate: role-tagged messages,
//! project-relative file references, code fences, and the top-level error.
//!
//! Nothing here touches the filesystem beyond path arithmetic. The corpus
//! and assembler crates build on these values.

pub mod error;
pub mod fence;
pub mod message;
pub mod path;

pub use error::{Error, Result};
pub use fence::Fence;
pub use message::{Message, Role};
pub use path::FileRef;

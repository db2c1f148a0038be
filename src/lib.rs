//! Implements context-scoped string patching for binary files.
//!
//! The input is treated as an opaque byte buffer. Every occurrence of a
//! context marker opens a fixed-size search window right at the marker, and
//! within each window the first hit of every replacement rule is overwritten
//! in place. Replacements preserve the pattern length, so the buffer never
//! grows or shrinks and all other offsets stay where they were.

#![forbid(unsafe_code)]

pub mod data;
pub mod error;
pub mod patch;
pub mod profile;
pub mod rule;
pub mod survey;
pub mod window;

pub use data::{Input, Output};
pub use error::{PatchError, Result};
pub use patch::{Change, PatchReport, Patcher};
pub use profile::Profile;
pub use rule::Rule;
pub use survey::Survey;
pub use window::Window;

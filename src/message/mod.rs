//! Commit message formatting and validation.

pub mod format;
pub mod validate;

pub use format::{CommitMessage, format_subject, render_template};
pub use validate::{Validated, ValidationWarning, truncate_subject, validate};

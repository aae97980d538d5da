//! AI boundary: prompt construction, the provider seam and response extraction.

pub mod json;
pub mod prompt;
pub mod provider;

pub use json::{AiCandidate, extract_candidate, extract_json};
pub use prompt::build_commit_prompt;
pub use provider::{CommandProvider, CommitMessageProvider, TimeoutProvider};

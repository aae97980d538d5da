//! Change set model and collection from git.

pub mod collect;
pub mod model;

pub use collect::{CollectMode, collect_change_set, open_repository};
pub use model::{ChangeSet, ChangedFile, FileStatus};

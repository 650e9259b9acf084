//! Filer-supplied additions to the return, merged section by section.

pub mod merge;
pub mod service;

pub use merge::{MergeError, MergePolicy, MergeStrategy, merge_sections, sections};
pub use service::{UserInputError, apply_user_edits};

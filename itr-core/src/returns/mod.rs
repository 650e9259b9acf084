//! The canonical return document: its schema, assembly, stable paths and
//! structural diff.

pub mod assembler;
pub mod diff;
pub mod paths;
pub mod schema;

pub use assembler::{AssemblyError, ReturnAssembler, rupees};
pub use diff::{DiffEntry, DiffError, DiffKind, diff_documents, diff_schedule, diff_values, normalize};
pub use schema::ReturnDocument;

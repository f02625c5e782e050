//! Model files: name resolution, document envelopes and the on-disk store.

pub mod document;
pub mod paths;
pub mod store;

pub use document::{is_full_document, prepare_document, wrap_procedures};
pub use paths::{validate_name, Access, ModelPaths};
pub use store::{ModelEntry, ModelStore};

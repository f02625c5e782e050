//! Engine seam
//!
//! The NetLogo engine is reached only through the [`Workspace`] trait. The
//! JVM-backed implementation lives in [`jvm`]; everything else in the crate
//! works against the trait so it can be driven by a scripted workspace in tests.

pub mod failure;
#[cfg(feature = "jvm")]
pub mod jvm;
pub mod normalize;
pub mod probe;
pub mod value;
pub mod workspace;

pub use failure::{strip_wrapper_prefixes, EngineFailure};
pub use normalize::{Normalizer, ShapeConverter};
pub use probe::model_loaded;
pub use value::{EngineValue, Table, ValueShape};
pub use workspace::{EngineSettings, Workspace};

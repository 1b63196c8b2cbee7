pub mod config;
pub mod control;
pub mod error;
pub mod extract;
pub mod logging;
pub mod pipeline;
pub mod project;
pub mod redirect;
pub mod session;
pub mod slug;
pub mod upstream;
pub mod validate;

pub use control::CancelToken;
pub use error::{Classification, ErrorKind, PipelineError, Stage};
pub use pipeline::{Outcome, Pipeline, RunMode};
pub use project::AddonMetadata;

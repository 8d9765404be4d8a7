pub mod engine;
pub mod errors;
pub mod functions;
pub mod reachability;
pub mod resolution;
pub mod targets;
pub mod values;

pub use errors::{Error, Result};
pub use resolution::*;
pub use reachability::*;

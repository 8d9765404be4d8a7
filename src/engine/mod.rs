pub mod engine_service;
pub mod engine_traits;

pub use engine_service::ResolutionEngine;
pub use engine_traits::{ClockTrait, SystemClock};

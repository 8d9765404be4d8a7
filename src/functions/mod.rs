pub mod functions_errors;
pub mod functions_model;
pub mod functions_repository;
pub mod functions_traits;

pub use functions_errors::FunctionError;
pub use functions_model::{FunctionParameters, ParameterizedFunction, StaticFunction};
pub use functions_repository::FunctionRepository;
pub use functions_traits::FunctionDefinitionTrait;

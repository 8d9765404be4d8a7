pub mod targets_errors;
pub mod targets_model;
pub mod targets_registry;
pub mod targets_traits;

pub use targets_errors::TargetError;
pub use targets_model::{ComputationTarget, TargetKind, TargetSpecification, TargetType};
pub use targets_registry::TargetKindRegistry;
pub use targets_traits::{EmptyTargetResolver, MapTargetResolver, TargetResolverTrait};

use crate::functions::functions_errors::FunctionError;
use crate::functions::functions_model::FunctionParameters;
use crate::targets::targets_model::{ComputationTarget, TargetType};
use crate::targets::targets_registry::TargetKindRegistry;
use crate::values::values_model::{ValueRequirement, ValueSpecification};

/// Contract of a registered computation unit.
///
/// The engine only plans with these: it never executes a function's
/// computation body. Implementations advertise what they can produce for a
/// target, and what they would additionally require as input to do so.
pub trait FunctionDefinitionTrait: Send + Sync {
    /// Stable identity of the function within a repository.
    fn unique_id(&self) -> &str;

    /// The kinds of target this function declares itself runnable against.
    fn target_type(&self) -> &TargetType;

    fn default_parameters(&self) -> FunctionParameters {
        FunctionParameters::empty()
    }

    /// Instance-level applicability check. The default accepts every target
    /// the declared target type matches; implementations can narrow further
    /// (e.g. only securities carrying a listed exchange).
    fn can_apply_to(&self, registry: &TargetKindRegistry, target: &ComputationTarget) -> bool {
        self.target_type().matches(target, registry)
    }

    /// The value specifications this function advertises for a target.
    ///
    /// Invoking this for a target the function was never meant to handle is a
    /// programming-contract violation and fails with
    /// [`FunctionError::UnsupportedTarget`]; it is not a resolution miss.
    fn results(&self, target: &ComputationTarget)
        -> Result<Vec<ValueSpecification>, FunctionError>;

    /// What this function additionally requires as input to produce
    /// `desired` on `target`.
    fn requirements(
        &self,
        target: &ComputationTarget,
        desired: &ValueRequirement,
    ) -> Result<Vec<ValueRequirement>, FunctionError>;

    /// Late-bound result shape for multi-pass functions, once the actually
    /// resolved inputs are known. Defaults to the early advertisement.
    fn late_results(
        &self,
        target: &ComputationTarget,
        _resolved_inputs: &[ValueSpecification],
    ) -> Result<Vec<ValueSpecification>, FunctionError> {
        self.results(target)
    }
}

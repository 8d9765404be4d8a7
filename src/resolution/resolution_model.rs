use std::fmt;
use std::sync::Arc;

use crate::functions::functions_model::ParameterizedFunction;
use crate::targets::targets_model::{ComputationTarget, TargetSpecification};

/// Instance-level applicability predicate of a resolution rule, evaluated
/// against the concrete target at query time.
pub trait TargetFilterTrait: Send + Sync {
    fn accepts(&self, target: &ComputationTarget) -> bool;
}

/// The default filter: every target passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyToAllTargets;

impl TargetFilterTrait for ApplyToAllTargets {
    fn accepts(&self, _target: &ComputationTarget) -> bool {
        true
    }
}

/// Filter scoping a rule to one concrete target.
#[derive(Debug, Clone)]
pub struct SpecificTargetFilter {
    target: TargetSpecification,
}

impl SpecificTargetFilter {
    pub fn new(target: TargetSpecification) -> Self {
        SpecificTargetFilter { target }
    }
}

impl TargetFilterTrait for SpecificTargetFilter {
    fn accepts(&self, target: &ComputationTarget) -> bool {
        target.specification() == self.target
    }
}

impl<F> TargetFilterTrait for F
where
    F: Fn(&ComputationTarget) -> bool + Send + Sync,
{
    fn accepts(&self, target: &ComputationTarget) -> bool {
        self(target)
    }
}

/// Binds a parameterized function to an applicability filter and a priority.
/// Immutable once created; higher priority resolves first.
#[derive(Clone)]
pub struct ResolutionRule {
    pub function: ParameterizedFunction,
    pub filter: Arc<dyn TargetFilterTrait>,
    pub priority: i32,
}

impl ResolutionRule {
    pub fn new(function: ParameterizedFunction, priority: i32) -> Self {
        ResolutionRule {
            function,
            filter: Arc::new(ApplyToAllTargets),
            priority,
        }
    }

    pub fn with_filter(
        function: ParameterizedFunction,
        filter: Arc<dyn TargetFilterTrait>,
        priority: i32,
    ) -> Self {
        ResolutionRule {
            function,
            filter,
            priority,
        }
    }

    pub fn accepts(&self, target: &ComputationTarget) -> bool {
        self.filter.accepts(target)
    }
}

impl fmt::Debug for ResolutionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionRule")
            .field("function", &self.function.unique_id())
            .field("priority", &self.priority)
            .finish()
    }
}

pub mod resolution_compiler;
pub mod resolution_model;
pub mod resolution_repository;
pub mod resolution_service;

#[cfg(test)]
pub(crate) mod tests;

pub use resolution_compiler::{CompiledRuleSet, RuleCompiler};
pub use resolution_model::{
    ApplyToAllTargets, ResolutionRule, SpecificTargetFilter, TargetFilterTrait,
};
pub use resolution_repository::ResolutionRuleRepository;
pub use resolution_service::{FunctionResolver, ResolutionIter, ResolvedFunction};

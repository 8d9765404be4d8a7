use std::sync::Arc;

use crate::errors::Result;
use crate::functions::functions_model::ParameterizedFunction;
use crate::functions::functions_repository::FunctionRepository;
use crate::functions::functions_traits::FunctionDefinitionTrait;
use crate::resolution::resolution_model::ResolutionRule;
use crate::targets::targets_registry::TargetKindRegistry;

/// The unordered bag of resolution rules gathered at configuration time.
/// Registration validates each rule's declared target type against the kind
/// registry, so misconfiguration fails here rather than at resolution time.
pub struct ResolutionRuleRepository {
    registry: Arc<TargetKindRegistry>,
    rules: Vec<Arc<ResolutionRule>>,
}

impl ResolutionRuleRepository {
    pub fn new(registry: Arc<TargetKindRegistry>) -> Self {
        ResolutionRuleRepository {
            registry,
            rules: Vec::new(),
        }
    }

    pub fn add_rule(&mut self, rule: ResolutionRule) -> Result<()> {
        self.registry
            .validate_type(rule.function.function.target_type())?;
        self.rules.push(Arc::new(rule));
        Ok(())
    }

    /// Register a function at the given priority with the default
    /// (accept-everything) filter.
    pub fn add_function(
        &mut self,
        function: Arc<dyn FunctionDefinitionTrait>,
        priority: i32,
    ) -> Result<()> {
        self.add_rule(ResolutionRule::new(
            ParameterizedFunction::new(function),
            priority,
        ))
    }

    /// Register every function of a repository, each with the default filter
    /// and the priority the callback assigns it.
    pub fn add_functions<P>(&mut self, functions: &FunctionRepository, priority: P) -> Result<()>
    where
        P: Fn(&dyn FunctionDefinitionTrait) -> i32,
    {
        for function in functions.functions() {
            self.add_rule(ResolutionRule::new(
                ParameterizedFunction::new(Arc::clone(function)),
                priority(function.as_ref()),
            ))?;
        }
        Ok(())
    }

    /// Rules in registration order.
    pub fn rules(&self) -> &[Arc<ResolutionRule>] {
        &self.rules
    }

    pub fn registry(&self) -> &Arc<TargetKindRegistry> {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

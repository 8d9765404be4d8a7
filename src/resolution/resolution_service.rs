use std::collections::VecDeque;
use std::sync::Arc;

use crate::errors::Result;
use crate::functions::functions_model::ParameterizedFunction;
use crate::resolution::resolution_compiler::CompiledRuleSet;
use crate::resolution::resolution_model::ResolutionRule;
use crate::targets::targets_model::{ComputationTarget, TargetType};
use crate::targets::targets_traits::TargetResolverTrait;
use crate::values::value_properties::ValueProperties;
use crate::values::values_model::ValueSpecification;

/// One candidate resolution: the function, the advertised specification bound
/// to the demanded constraints, and the complete set of specifications the
/// same invocation produces. Some functions are atomic multi-output:
/// consuming one output commits the caller to accepting the siblings too.
#[derive(Debug, Clone)]
pub struct ResolvedFunction {
    pub function: ParameterizedFunction,
    pub specification: ValueSpecification,
    pub results: Vec<ValueSpecification>,
}

/// The central query service over one compiled rule set.
pub struct FunctionResolver {
    rule_set: Arc<CompiledRuleSet>,
    target_resolver: Arc<dyn TargetResolverTrait>,
}

impl FunctionResolver {
    pub fn new(
        rule_set: Arc<CompiledRuleSet>,
        target_resolver: Arc<dyn TargetResolverTrait>,
    ) -> Self {
        FunctionResolver {
            rule_set,
            target_resolver,
        }
    }

    pub fn rule_set(&self) -> &Arc<CompiledRuleSet> {
        &self.rule_set
    }

    /// The candidates able to produce `value_name` on `target` under
    /// `constraints`, in priority order.
    ///
    /// The returned cursor is lazy: rules are only evaluated as elements are
    /// pulled, so a caller that abandons a candidate resumes enumeration
    /// exactly where it left off. "Nothing found" is an empty sequence; the
    /// only up-front failure is a target kind the algebra cannot classify.
    pub fn resolve_function(
        &self,
        value_name: &str,
        target: &ComputationTarget,
        constraints: &ValueProperties,
    ) -> Result<ResolutionIter> {
        let rules = self.rule_set.rules_for(&target.kind)?.to_vec();
        Ok(ResolutionIter {
            rule_set: Arc::clone(&self.rule_set),
            target_resolver: Arc::clone(&self.target_resolver),
            rules,
            next_rule: 0,
            pending: VecDeque::new(),
            value_name: value_name.to_string(),
            target: target.clone(),
            constraints: constraints.clone(),
        })
    }
}

/// Whether a rule applies to a concrete target: its filter accepts the
/// target, a contextual declaration's context actually resolves, and the
/// function's own applicability check passes. Failures are silent; most
/// rules are expected not to apply to any given target.
pub(crate) fn rule_applies(
    rule: &ResolutionRule,
    target: &ComputationTarget,
    rule_set: &CompiledRuleSet,
    target_resolver: &dyn TargetResolverTrait,
) -> bool {
    if !rule.accepts(target) {
        return false;
    }
    let registry = rule_set.registry();
    let function = &rule.function.function;
    if let TargetType::Contextual { context, .. } = function.target_type() {
        let resolved = target
            .context
            .as_ref()
            .and_then(|specification| target_resolver.resolve(specification));
        match resolved {
            Some(outer) if registry.is_compatible(&outer.kind, context) => {}
            _ => {
                log::trace!(
                    "Skipping '{}' for {}: context did not resolve",
                    function.unique_id(),
                    target
                );
                return false;
            }
        }
    }
    function.can_apply_to(registry, target)
}

/// Pull-based cursor over the folded, priority-ordered rule list.
///
/// Items are `Result`: a function that violates its contract when asked for
/// results surfaces as an `Err` element, while ordinary misses are simply
/// absent. Not shareable across threads mid-iteration; each caller obtains
/// its own cursor.
pub struct ResolutionIter {
    rule_set: Arc<CompiledRuleSet>,
    target_resolver: Arc<dyn TargetResolverTrait>,
    rules: Vec<Arc<ResolutionRule>>,
    next_rule: usize,
    pending: VecDeque<ResolvedFunction>,
    value_name: String,
    target: ComputationTarget,
    constraints: ValueProperties,
}

impl Iterator for ResolutionIter {
    type Item = Result<ResolvedFunction>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(resolved) = self.pending.pop_front() {
                return Some(Ok(resolved));
            }
            let rule = self.rules.get(self.next_rule)?.clone();
            self.next_rule += 1;

            if !rule_applies(
                &rule,
                &self.target,
                &self.rule_set,
                self.target_resolver.as_ref(),
            ) {
                continue;
            }

            let results = match rule.function.function.results(&self.target) {
                Ok(results) => results,
                Err(error) => {
                    log::error!(
                        "Function '{}' failed on {}: {}",
                        rule.function.unique_id(),
                        self.target,
                        error
                    );
                    return Some(Err(error.into()));
                }
            };

            let target_specification = self.target.specification();
            for specification in &results {
                if specification.value_name != self.value_name
                    || specification.target != target_specification
                {
                    continue;
                }
                if !self.constraints.is_satisfied_by(&specification.properties) {
                    log::trace!(
                        "Discarding {} from '{}': constraints {} not satisfied",
                        specification,
                        rule.function.unique_id(),
                        self.constraints
                    );
                    continue;
                }
                self.pending.push_back(ResolvedFunction {
                    function: rule.function.clone(),
                    specification: specification.compose_with(&self.constraints),
                    results: results.clone(),
                });
            }
        }
    }
}

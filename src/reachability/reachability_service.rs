use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::errors::Result;
use crate::reachability::reachability_traits::MarketDataAvailabilityTrait;
use crate::resolution::resolution_compiler::CompiledRuleSet;
use crate::resolution::resolution_model::ResolutionRule;
use crate::resolution::resolution_service::rule_applies;
use crate::targets::targets_model::ComputationTarget;
use crate::targets::targets_traits::TargetResolverTrait;
use crate::values::values_model::{ValueRequirement, ValueSpecification};

/// Answers, for a target and a compiled rule set, "what could be computed"
/// without executing anything.
///
/// Two criteria: [`maximal_results`](ReachabilityAnalyzer::maximal_results)
/// is the optimistic one-hop projection; [`partial_results`]
/// (ReachabilityAnalyzer::partial_results) keeps only value names reachable
/// through a fully satisfiable requirement chain.
pub struct ReachabilityAnalyzer {
    rule_set: Arc<CompiledRuleSet>,
    target_resolver: Arc<dyn TargetResolverTrait>,
    availability: Arc<dyn MarketDataAvailabilityTrait>,
}

impl ReachabilityAnalyzer {
    pub fn new(
        rule_set: Arc<CompiledRuleSet>,
        target_resolver: Arc<dyn TargetResolverTrait>,
        availability: Arc<dyn MarketDataAvailabilityTrait>,
    ) -> Self {
        ReachabilityAnalyzer {
            rule_set,
            target_resolver,
            availability,
        }
    }

    fn applicable_rules(&self, target: &ComputationTarget) -> Result<Vec<Arc<ResolutionRule>>> {
        let rules = self.rule_set.rules_for(&target.kind)?;
        Ok(rules
            .iter()
            .filter(|rule| {
                rule_applies(rule, target, &self.rule_set, self.target_resolver.as_ref())
            })
            .cloned()
            .collect())
    }

    /// Every value name advertised by a rule whose filter and applicability
    /// checks accept the target, irrespective of whether the function's own
    /// requirements could in turn be satisfied.
    pub fn maximal_results(&self, target: &ComputationTarget) -> Result<BTreeSet<String>> {
        let target_specification = target.specification();
        let mut names = BTreeSet::new();
        for rule in self.applicable_rules(target)? {
            for specification in rule.function.function.results(target)? {
                if specification.target == target_specification {
                    names.insert(specification.value_name);
                }
            }
        }
        Ok(names)
    }

    /// The subset of maximal results for which at least one fully satisfiable
    /// resolution chain exists: every requirement of the producing function
    /// must itself resolve, recursively, down to either raw data the
    /// availability collaborator accepts or another satisfiable producer
    /// whose advertised properties meet the demand. Compatibility is
    /// re-checked at every hop; cyclic chains are unsatisfiable.
    pub fn partial_results(&self, target: &ComputationTarget) -> Result<BTreeSet<String>> {
        let rules = self.applicable_rules(target)?;
        let target_specification = target.specification();

        let mut advertised: Vec<Vec<ValueSpecification>> = Vec::with_capacity(rules.len());
        for rule in &rules {
            advertised.push(rule.function.function.results(target)?);
        }

        // Value name -> (rule index, specification index) of its producers on
        // this target.
        let mut producers: HashMap<&str, Vec<(usize, usize)>> = HashMap::new();
        for (rule_index, specifications) in advertised.iter().enumerate() {
            for (spec_index, specification) in specifications.iter().enumerate() {
                if specification.target == target_specification {
                    producers
                        .entry(specification.value_name.as_str())
                        .or_default()
                        .push((rule_index, spec_index));
                }
            }
        }

        let mut walk = SatisfiabilityWalk {
            rules: &rules,
            advertised: &advertised,
            producers: &producers,
            target,
            availability: self.availability.as_ref(),
            memo: HashMap::new(),
            touched_pending: false,
        };

        let mut names = BTreeSet::new();
        for (rule_index, specifications) in advertised.iter().enumerate() {
            for specification in specifications {
                if specification.target != target_specification {
                    continue;
                }
                if names.contains(&specification.value_name) {
                    continue;
                }
                if walk.function_satisfiable(rule_index, &specification.value_name)? {
                    names.insert(specification.value_name.clone());
                }
            }
        }
        Ok(names)
    }
}

#[derive(Clone, Copy)]
enum MemoState {
    Pending,
    Done(bool),
}

/// Recursive satisfiability search, memoised per (rule, value name). A chain
/// re-entering a pair still being evaluated is cyclic and answers `false`
/// for that branch. Satisfiability is monotone, so a `true` outcome is final
/// and always cached; a `false` outcome that leaned on a still-pending
/// ancestor is only tentative (the ancestor may yet prove satisfiable
/// through another branch) and is re-evaluated on the next query instead of
/// being cached.
struct SatisfiabilityWalk<'a> {
    rules: &'a [Arc<ResolutionRule>],
    advertised: &'a [Vec<ValueSpecification>],
    producers: &'a HashMap<&'a str, Vec<(usize, usize)>>,
    target: &'a ComputationTarget,
    availability: &'a dyn MarketDataAvailabilityTrait,
    memo: HashMap<(usize, String), MemoState>,
    touched_pending: bool,
}

impl SatisfiabilityWalk<'_> {
    fn function_satisfiable(&mut self, rule_index: usize, value_name: &str) -> Result<bool> {
        let key = (rule_index, value_name.to_string());
        match self.memo.get(&key) {
            Some(MemoState::Pending) => {
                self.touched_pending = true;
                return Ok(false);
            }
            Some(MemoState::Done(satisfiable)) => return Ok(*satisfiable),
            None => {}
        }
        self.memo.insert(key.clone(), MemoState::Pending);
        let touched_outside = std::mem::replace(&mut self.touched_pending, false);

        let desired = ValueRequirement::new(value_name, self.target.specification());
        let requirements = self.rules[rule_index]
            .function
            .function
            .requirements(self.target, &desired)?;

        let mut satisfiable = true;
        for requirement in &requirements {
            if !self.requirement_satisfiable(requirement)? {
                log::trace!(
                    "'{}' cannot produce {}: requirement {} unsatisfiable",
                    self.rules[rule_index].function.unique_id(),
                    value_name,
                    requirement
                );
                satisfiable = false;
                break;
            }
        }

        let tentative = !satisfiable && self.touched_pending;
        self.touched_pending = touched_outside || tentative;
        if tentative {
            self.memo.remove(&key);
        } else {
            self.memo.insert(key, MemoState::Done(satisfiable));
        }
        Ok(satisfiable)
    }

    fn requirement_satisfiable(&mut self, requirement: &ValueRequirement) -> Result<bool> {
        let candidates = self
            .producers
            .get(requirement.value_name.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        // A name no function produces is raw data; the availability
        // collaborator decides whether it actually exists. A produced name
        // never falls back to raw data: if every producer mismatches or is
        // itself unsatisfiable, the branch is dead.
        if candidates.is_empty() {
            return Ok(self.availability.is_available(requirement));
        }

        for (rule_index, spec_index) in candidates {
            let specification = &self.advertised[*rule_index][*spec_index];
            if !specification.satisfies(requirement) {
                continue;
            }
            if self.function_satisfiable(*rule_index, &specification.value_name)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

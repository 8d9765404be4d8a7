
use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use crate::reachability::reachability_service::ReachabilityAnalyzer;
use crate::reachability::reachability_traits::MarketDataAvailabilityTrait;
use crate::resolution::resolution_compiler::RuleCompiler;
use crate::resolution::resolution_repository::ResolutionRuleRepository;
use crate::targets::targets_model::{ComputationTarget, TargetKind};
use crate::targets::targets_registry::TargetKindRegistry;
use crate::targets::targets_traits::EmptyTargetResolver;

pub(crate) fn repository() -> ResolutionRuleRepository {
    ResolutionRuleRepository::new(Arc::new(TargetKindRegistry::standard()))
}

pub(crate) fn primitive_target(identifier: &str) -> ComputationTarget {
    ComputationTarget::new(TargetKind::primitive(), identifier)
}

pub(crate) fn analyzer(
    rules: &ResolutionRuleRepository,
    availability: Arc<dyn MarketDataAvailabilityTrait>,
) -> ReachabilityAnalyzer {
    let compiled = Arc::new(RuleCompiler::compile(rules, Utc::now()).unwrap());
    ReachabilityAnalyzer::new(compiled, Arc::new(EmptyTargetResolver), availability)
}

pub(crate) fn names(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|name| name.to_string()).collect()
}

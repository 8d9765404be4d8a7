use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::{Arc, RwLock};

use crate::engine::engine_traits::{ClockTrait, SystemClock};
use crate::errors::Result;
use crate::reachability::reachability_service::ReachabilityAnalyzer;
use crate::reachability::reachability_traits::{
    MarketDataAvailabilityTrait, OptimisticMarketDataAvailability,
};
use crate::resolution::resolution_compiler::{CompiledRuleSet, RuleCompiler};
use crate::resolution::resolution_repository::ResolutionRuleRepository;
use crate::resolution::resolution_service::FunctionResolver;
use crate::targets::targets_traits::TargetResolverTrait;

/// Entry point tying the subsystem together: owns the rule repository
/// snapshot and its collaborators, compiles (and caches) one rule set per
/// instant, and tracks which rule set is current.
///
/// Compiled rule sets are immutable, so the cache and the current pointer can
/// be shared across any number of concurrent query threads; replacing the
/// current rule set never disturbs queries already holding their own `Arc`.
pub struct ResolutionEngine {
    rules: ResolutionRuleRepository,
    target_resolver: Arc<dyn TargetResolverTrait>,
    availability: Arc<dyn MarketDataAvailabilityTrait>,
    clock: Arc<dyn ClockTrait>,
    compiled: DashMap<DateTime<Utc>, Arc<CompiledRuleSet>>,
    current: RwLock<Option<Arc<CompiledRuleSet>>>,
}

impl ResolutionEngine {
    pub fn new(
        rules: ResolutionRuleRepository,
        target_resolver: Arc<dyn TargetResolverTrait>,
    ) -> Self {
        ResolutionEngine {
            rules,
            target_resolver,
            availability: Arc::new(OptimisticMarketDataAvailability),
            clock: Arc::new(SystemClock),
            compiled: DashMap::new(),
            current: RwLock::new(None),
        }
    }

    pub fn with_availability(
        mut self,
        availability: Arc<dyn MarketDataAvailabilityTrait>,
    ) -> Self {
        self.availability = availability;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn ClockTrait>) -> Self {
        self.clock = clock;
        self
    }

    pub fn rules(&self) -> &ResolutionRuleRepository {
        &self.rules
    }

    /// The compiled rule set for `instant`, compiling and caching one if this
    /// epoch has not been seen. Concurrent first calls for the same instant
    /// may compile twice; compilation is pure, so either result is valid.
    pub fn compile_at(&self, instant: DateTime<Utc>) -> Result<Arc<CompiledRuleSet>> {
        if let Some(existing) = self.compiled.get(&instant) {
            return Ok(Arc::clone(existing.value()));
        }
        let rule_set = Arc::new(RuleCompiler::compile(&self.rules, instant)?);
        self.compiled.insert(instant, Arc::clone(&rule_set));
        Ok(rule_set)
    }

    /// Compile for the clock's current instant and make the result the
    /// current rule set. Single-writer swap; readers keep whatever `Arc` they
    /// already hold.
    pub fn recompile_current(&self) -> Result<Arc<CompiledRuleSet>> {
        let rule_set = self.compile_at(self.clock.now())?;
        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = Some(Arc::clone(&rule_set));
        Ok(rule_set)
    }

    pub fn current(&self) -> Option<Arc<CompiledRuleSet>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn resolver(&self, rule_set: Arc<CompiledRuleSet>) -> FunctionResolver {
        FunctionResolver::new(rule_set, Arc::clone(&self.target_resolver))
    }

    pub fn reachability(&self, rule_set: Arc<CompiledRuleSet>) -> ReachabilityAnalyzer {
        ReachabilityAnalyzer::new(
            rule_set,
            Arc::clone(&self.target_resolver),
            Arc::clone(&self.availability),
        )
    }
}

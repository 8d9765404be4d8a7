use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::Result;
use crate::resolution::resolution_model::ResolutionRule;
use crate::resolution::resolution_repository::ResolutionRuleRepository;
use crate::targets::targets_errors::TargetError;
use crate::targets::targets_model::TargetKind;
use crate::targets::targets_registry::TargetKindRegistry;

/// The deduplicated, priority-ordered, per-kind rule index built from a rule
/// repository snapshot at a point in time. Immutable; shared read-only across
/// concurrent queries via `Arc`. A new epoch produces a new instance.
pub struct CompiledRuleSet {
    instant: DateTime<Utc>,
    registry: Arc<TargetKindRegistry>,
    rules_by_kind: HashMap<TargetKind, Vec<Arc<ResolutionRule>>>,
}

impl CompiledRuleSet {
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn registry(&self) -> &Arc<TargetKindRegistry> {
        &self.registry
    }

    /// The folded, ordered rule list for a concrete target kind. A kind the
    /// algebra cannot classify is a configuration defect, not a miss.
    pub fn rules_for(&self, kind: &TargetKind) -> Result<&[Arc<ResolutionRule>]> {
        self.rules_by_kind
            .get(kind)
            .map(Vec::as_slice)
            .ok_or_else(|| TargetError::UnknownKind(kind.name().to_string()).into())
    }
}

/// Turns an unordered bag of rules into a [`CompiledRuleSet`].
///
/// For every registered kind, the compiler gathers each rule whose declared
/// coverage can match a target of that kind (expanding unions and the kind
/// compatibility relation), orders by priority descending with narrower
/// declared coverage breaking ties ahead of wider, preserving registration
/// order beyond that, and folds overlapping coverage of the same function to
/// a single entry so each function is evaluated once per concrete target.
pub struct RuleCompiler;

impl RuleCompiler {
    /// Pure function of the repository snapshot and the instant; no I/O.
    pub fn compile(
        repository: &ResolutionRuleRepository,
        instant: DateTime<Utc>,
    ) -> Result<CompiledRuleSet> {
        let registry = Arc::clone(repository.registry());
        let mut rules_by_kind: HashMap<TargetKind, Vec<Arc<ResolutionRule>>> = HashMap::new();

        for kind in registry.kinds() {
            let mut entries: Vec<(usize, usize, &Arc<ResolutionRule>)> = Vec::new();
            for (sequence, rule) in repository.rules().iter().enumerate() {
                let declared = rule.function.function.target_type();
                let covers = declared
                    .leaf_kinds()
                    .iter()
                    .any(|leaf| registry.is_compatible(kind, leaf));
                if covers {
                    entries.push((sequence, registry.coverage_breadth(declared), rule));
                }
            }

            // Stable sort: priority descending, then narrower coverage, then
            // registration order.
            entries.sort_by(|a, b| {
                let (seq_a, breadth_a, rule_a) = a;
                let (seq_b, breadth_b, rule_b) = b;
                rule_b
                    .priority
                    .cmp(&rule_a.priority)
                    .then(breadth_a.cmp(breadth_b))
                    .then(seq_a.cmp(seq_b))
            });

            // Fold: one entry per (function, parameters), keeping the
            // best-ordered occurrence.
            let mut folded: Vec<Arc<ResolutionRule>> = Vec::with_capacity(entries.len());
            for (_, _, rule) in entries {
                let duplicate = folded
                    .iter()
                    .any(|kept| kept.function == rule.function);
                if !duplicate {
                    folded.push(Arc::clone(rule));
                }
            }

            rules_by_kind.insert(kind.clone(), folded);
        }

        log::debug!(
            "Compiled {} rules into {} kind buckets at {}",
            repository.len(),
            rules_by_kind.len(),
            instant
        );

        Ok(CompiledRuleSet {
            instant,
            registry,
            rules_by_kind,
        })
    }
}

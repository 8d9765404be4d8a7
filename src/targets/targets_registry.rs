use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::targets::targets_errors::TargetError;
use crate::targets::targets_model::{TargetKind, TargetType};

/// Registry of target kinds and the "is-compatible-with" relation between
/// them. A kind is compatible with itself and, transitively, with every
/// parent kind it was registered under, so a single target can satisfy
/// several declared kinds (a trade is also a tradeable).
///
/// The registry is plain data: build one, share it behind an `Arc`. Multiple
/// registries with different hierarchies can coexist.
#[derive(Debug, Clone, Default)]
pub struct TargetKindRegistry {
    parents: HashMap<TargetKind, HashSet<TargetKind>>,
}

impl TargetKindRegistry {
    pub fn new() -> Self {
        TargetKindRegistry::default()
    }

    /// The kind hierarchy of the portfolio analytics platform: positions and
    /// trades are both tradeables, everything else stands alone.
    pub fn standard() -> Self {
        let mut registry = TargetKindRegistry::new();
        registry.register_kind(TargetKind::primitive());
        registry.register_kind(TargetKind::currency());
        registry.register_kind(TargetKind::security());
        registry.register_kind(TargetKind::portfolio());
        registry.register_kind(TargetKind::portfolio_node());
        registry.register_kind(TargetKind::tradeable());
        for kind in [TargetKind::position(), TargetKind::trade()] {
            registry
                .parents
                .entry(kind)
                .or_default()
                .insert(TargetKind::tradeable());
        }
        registry
    }

    pub fn register_kind(&mut self, kind: TargetKind) {
        self.parents.entry(kind).or_default();
    }

    /// Register `kind` as compatible with each of `parents`. Parents must
    /// already be registered.
    pub fn register_kind_with(
        &mut self,
        kind: TargetKind,
        parents: impl IntoIterator<Item = TargetKind>,
    ) -> Result<(), TargetError> {
        let parents: HashSet<TargetKind> = parents.into_iter().collect();
        for parent in &parents {
            if !self.parents.contains_key(parent) {
                return Err(TargetError::UnknownKind(parent.name().to_string()));
            }
        }
        self.parents.entry(kind).or_default().extend(parents);
        Ok(())
    }

    pub fn contains(&self, kind: &TargetKind) -> bool {
        self.parents.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &TargetKind> {
        self.parents.keys()
    }

    /// Whether a target of kind `actual` satisfies the declared kind
    /// `declared`, directly or through the transitive parent relation.
    pub fn is_compatible(&self, actual: &TargetKind, declared: &TargetKind) -> bool {
        if actual == declared {
            return true;
        }
        let mut seen: HashSet<&TargetKind> = HashSet::new();
        let mut queue: VecDeque<&TargetKind> = VecDeque::new();
        queue.push_back(actual);
        while let Some(kind) = queue.pop_front() {
            if !seen.insert(kind) {
                continue;
            }
            if let Some(parents) = self.parents.get(kind) {
                for parent in parents {
                    if parent == declared {
                        return true;
                    }
                    queue.push_back(parent);
                }
            }
        }
        false
    }

    /// All declared kinds a target of kind `actual` satisfies, `actual`
    /// included.
    pub fn compatible_kinds(&self, actual: &TargetKind) -> BTreeSet<TargetKind> {
        let mut result = BTreeSet::new();
        let mut queue: VecDeque<&TargetKind> = VecDeque::new();
        queue.push_back(actual);
        while let Some(kind) = queue.pop_front() {
            if !result.insert(kind.clone()) {
                continue;
            }
            if let Some(parents) = self.parents.get(kind) {
                queue.extend(parents.iter());
            }
        }
        result
    }

    /// Ensure every kind named by a declared target type is registered.
    /// Called at rule registration so misconfiguration fails early rather
    /// than at resolution time.
    pub fn validate_type(&self, target_type: &TargetType) -> Result<(), TargetError> {
        for kind in target_type.leaf_kinds() {
            if !self.contains(kind) {
                return Err(TargetError::UnknownKind(kind.name().to_string()));
            }
        }
        if let TargetType::Contextual { context, .. } = target_type {
            if !self.contains(context) {
                return Err(TargetError::UnknownKind(context.name().to_string()));
            }
        }
        Ok(())
    }

    /// How many registered kinds the declared type covers. Lower is more
    /// specific; a contextual declaration ranks ahead of a bare leaf over the
    /// same kind because of the extra context constraint.
    pub fn coverage_breadth(&self, target_type: &TargetType) -> usize {
        let covered = self
            .parents
            .keys()
            .filter(|kind| {
                target_type
                    .leaf_kinds()
                    .iter()
                    .any(|declared| self.is_compatible(kind, declared))
            })
            .count();
        match target_type {
            TargetType::Contextual { .. } => covered * 2 - 1,
            _ => covered * 2,
        }
    }
}

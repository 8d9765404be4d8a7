use std::collections::HashMap;

use crate::targets::targets_model::{ComputationTarget, TargetSpecification};

/// Resolves a target reference to a concrete entity. Used by the resolver to
/// resolve the enclosing context of contextually-typed functions; a miss is
/// an ordinary outcome, not an error.
pub trait TargetResolverTrait: Send + Sync {
    fn resolve(&self, specification: &TargetSpecification) -> Option<ComputationTarget>;
}

/// In-memory target resolver over a fixed set of known targets.
#[derive(Debug, Clone, Default)]
pub struct MapTargetResolver {
    targets: HashMap<TargetSpecification, ComputationTarget>,
}

impl MapTargetResolver {
    pub fn new() -> Self {
        MapTargetResolver::default()
    }

    pub fn add_target(&mut self, target: ComputationTarget) {
        self.targets.insert(target.specification(), target);
    }

    pub fn with_target(mut self, target: ComputationTarget) -> Self {
        self.add_target(target);
        self
    }
}

impl TargetResolverTrait for MapTargetResolver {
    fn resolve(&self, specification: &TargetSpecification) -> Option<ComputationTarget> {
        self.targets.get(specification).cloned()
    }
}

/// Resolver that knows no targets; contextual functions never apply.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyTargetResolver;

impl TargetResolverTrait for EmptyTargetResolver {
    fn resolve(&self, _specification: &TargetSpecification) -> Option<ComputationTarget> {
        None
    }
}

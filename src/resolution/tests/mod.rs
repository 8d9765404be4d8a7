mod resolver_tests;

use std::sync::Arc;

use crate::resolution::resolution_repository::ResolutionRuleRepository;
use crate::targets::targets_model::{ComputationTarget, TargetKind};
use crate::targets::targets_registry::TargetKindRegistry;

pub(crate) fn repository() -> ResolutionRuleRepository {
    ResolutionRuleRepository::new(Arc::new(TargetKindRegistry::standard()))
}

pub(crate) fn primitive_target(identifier: &str) -> ComputationTarget {
    ComputationTarget::new(TargetKind::primitive(), identifier)
}

pub(crate) fn position_target(identifier: &str) -> ComputationTarget {
    ComputationTarget::new(TargetKind::position(), identifier)
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::targets::targets_errors::TargetError;
use crate::targets::targets_registry::TargetKindRegistry;

/// A named kind of computable entity (portfolio, position, trade, ...).
///
/// Kinds are plain names; the compatibility relation between them lives in
/// the [`TargetKindRegistry`], so one concrete target can satisfy several
/// declared kinds at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetKind(String);

impl TargetKind {
    pub fn new(name: impl Into<String>) -> Self {
        TargetKind(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    // Kinds of the standard registry. Callers with their own registry are
    // free to ignore these.
    pub fn portfolio() -> Self {
        TargetKind::new("Portfolio")
    }

    pub fn portfolio_node() -> Self {
        TargetKind::new("PortfolioNode")
    }

    pub fn position() -> Self {
        TargetKind::new("Position")
    }

    pub fn trade() -> Self {
        TargetKind::new("Trade")
    }

    pub fn tradeable() -> Self {
        TargetKind::new("Tradeable")
    }

    pub fn security() -> Self {
        TargetKind::new("Security")
    }

    pub fn currency() -> Self {
        TargetKind::new("Currency")
    }

    pub fn primitive() -> Self {
        TargetKind::new("Primitive")
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetKind {
    fn from(name: &str) -> Self {
        TargetKind::new(name)
    }
}

/// Declared applicability of a function: a single kind, a union of kinds, or
/// a kind qualified by the enclosing context it must appear in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetType {
    Leaf(TargetKind),
    Union(Vec<TargetKind>),
    Contextual { context: TargetKind, inner: TargetKind },
}

impl TargetType {
    pub fn leaf(kind: impl Into<TargetKind>) -> Self {
        TargetType::Leaf(kind.into())
    }

    /// A union of two or more distinct kinds. Anything narrower is not a
    /// union and is rejected at construction time.
    pub fn union(kinds: Vec<TargetKind>) -> Result<Self, TargetError> {
        if kinds.len() < 2 {
            return Err(TargetError::InvalidTargetType(format!(
                "a union must name at least two kinds, got {}",
                kinds.len()
            )));
        }
        let distinct: BTreeSet<&TargetKind> = kinds.iter().collect();
        if distinct.len() != kinds.len() {
            return Err(TargetError::InvalidTargetType(
                "a union must name distinct kinds".to_string(),
            ));
        }
        Ok(TargetType::Union(kinds))
    }

    /// An `inner` kind that must appear within an enclosing `context` kind.
    pub fn contextual(context: impl Into<TargetKind>, inner: impl Into<TargetKind>) -> Self {
        TargetType::Contextual {
            context: context.into(),
            inner: inner.into(),
        }
    }

    /// The leaf kinds this type can directly cover (the inner kind for a
    /// contextual type). Used to bucket rules by concrete kind.
    pub fn leaf_kinds(&self) -> Vec<&TargetKind> {
        match self {
            TargetType::Leaf(kind) => vec![kind],
            TargetType::Union(kinds) => kinds.iter().collect(),
            TargetType::Contextual { inner, .. } => vec![inner],
        }
    }

    pub fn is_contextual(&self) -> bool {
        matches!(self, TargetType::Contextual { .. })
    }

    /// Structural compatibility test against a concrete target. For a
    /// contextual type this only checks the declared context kind against the
    /// context the target carries; actually resolving that context to a
    /// concrete entity is the resolver's job.
    pub fn matches(&self, target: &ComputationTarget, registry: &TargetKindRegistry) -> bool {
        match self {
            TargetType::Leaf(kind) => registry.is_compatible(&target.kind, kind),
            TargetType::Union(kinds) => kinds
                .iter()
                .any(|kind| registry.is_compatible(&target.kind, kind)),
            TargetType::Contextual { context, inner } => {
                registry.is_compatible(&target.kind, inner)
                    && target
                        .context
                        .as_ref()
                        .map(|spec| registry.is_compatible(&spec.kind, context))
                        .unwrap_or(false)
            }
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Leaf(kind) => write!(f, "{}", kind),
            TargetType::Union(kinds) => {
                let names: Vec<&str> = kinds.iter().map(|k| k.name()).collect();
                write!(f, "({})", names.join("|"))
            }
            TargetType::Contextual { context, inner } => write!(f, "{}/{}", context, inner),
        }
    }
}

/// A reference to a concrete entity: its kind plus an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSpecification {
    pub kind: TargetKind,
    pub identifier: String,
}

impl TargetSpecification {
    pub fn new(kind: impl Into<TargetKind>, identifier: impl Into<String>) -> Self {
        TargetSpecification {
            kind: kind.into(),
            identifier: identifier.into(),
        }
    }
}

impl fmt::Display for TargetSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}", self.kind, self.identifier)
    }
}

/// A resolved, concrete entity a function can be evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputationTarget {
    pub kind: TargetKind,
    pub identifier: String,
    /// The enclosing context, when this target was reached through one
    /// (e.g. a position viewed within a particular portfolio node).
    pub context: Option<TargetSpecification>,
}

impl ComputationTarget {
    pub fn new(kind: impl Into<TargetKind>, identifier: impl Into<String>) -> Self {
        ComputationTarget {
            kind: kind.into(),
            identifier: identifier.into(),
            context: None,
        }
    }

    pub fn in_context(
        kind: impl Into<TargetKind>,
        identifier: impl Into<String>,
        context: TargetSpecification,
    ) -> Self {
        ComputationTarget {
            kind: kind.into(),
            identifier: identifier.into(),
            context: Some(context),
        }
    }

    pub fn specification(&self) -> TargetSpecification {
        TargetSpecification::new(self.kind.clone(), self.identifier.clone())
    }
}

impl fmt::Display for ComputationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}", self.kind, self.identifier)
    }
}

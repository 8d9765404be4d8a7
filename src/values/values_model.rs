use serde::{Deserialize, Serialize};
use std::fmt;

use crate::targets::targets_model::TargetSpecification;
use crate::values::value_properties::ValueProperties;

/// A single unit of demand: a named value on a target, under constraints the
/// consumer is willing to accept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRequirement {
    pub value_name: String,
    pub target: TargetSpecification,
    pub constraints: ValueProperties,
}

impl ValueRequirement {
    pub fn new(value_name: impl Into<String>, target: TargetSpecification) -> Self {
        ValueRequirement {
            value_name: value_name.into(),
            target,
            constraints: ValueProperties::none(),
        }
    }

    pub fn with_constraints(
        value_name: impl Into<String>,
        target: TargetSpecification,
        constraints: ValueProperties,
    ) -> Self {
        ValueRequirement {
            value_name: value_name.into(),
            target,
            constraints,
        }
    }
}

impl fmt::Display for ValueRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]{}", self.value_name, self.target, self.constraints)
    }
}

/// A single unit of supply: a named value a producer guarantees on a target,
/// with the properties it advertises.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSpecification {
    pub value_name: String,
    pub target: TargetSpecification,
    pub properties: ValueProperties,
}

impl ValueSpecification {
    pub fn new(
        value_name: impl Into<String>,
        target: TargetSpecification,
        properties: ValueProperties,
    ) -> Self {
        ValueSpecification {
            value_name: value_name.into(),
            target,
            properties,
        }
    }

    /// Whether this supply satisfies `requirement`: same value name, same
    /// target, and every demanded property compatible with the advertised
    /// ones.
    pub fn satisfies(&self, requirement: &ValueRequirement) -> bool {
        self.value_name == requirement.value_name
            && self.target == requirement.target
            && requirement.constraints.is_satisfied_by(&self.properties)
    }

    /// Bind this advertised specification to the demanded constraints,
    /// narrowing wildcard properties to what was actually asked for.
    pub fn compose_with(&self, constraints: &ValueProperties) -> ValueSpecification {
        ValueSpecification {
            value_name: self.value_name.clone(),
            target: self.target.clone(),
            properties: self.properties.compose(constraints),
        }
    }
}

impl fmt::Display for ValueSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]{}", self.value_name, self.target, self.properties)
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::functions::functions_errors::FunctionError;
use crate::functions::functions_traits::FunctionDefinitionTrait;
use crate::targets::targets_model::{ComputationTarget, TargetType};
use crate::values::value_properties::ValueProperties;
use crate::values::values_model::{ValueRequirement, ValueSpecification};

/// Named parameter set a function is invoked with. Values are free-form JSON,
/// matching how configuration reaches functions from the outer layers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionParameters(BTreeMap<String, serde_json::Value>);

impl FunctionParameters {
    pub fn empty() -> Self {
        FunctionParameters::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// A function definition paired with the parameters it will run with. This is
/// the unit resolution rules bind to; identity is (function id, parameters).
#[derive(Clone)]
pub struct ParameterizedFunction {
    pub function: Arc<dyn FunctionDefinitionTrait>,
    pub parameters: FunctionParameters,
}

impl ParameterizedFunction {
    /// Pair a function with its own default parameters.
    pub fn new(function: Arc<dyn FunctionDefinitionTrait>) -> Self {
        let parameters = function.default_parameters();
        ParameterizedFunction {
            function,
            parameters,
        }
    }

    pub fn with_parameters(
        function: Arc<dyn FunctionDefinitionTrait>,
        parameters: FunctionParameters,
    ) -> Self {
        ParameterizedFunction {
            function,
            parameters,
        }
    }

    pub fn unique_id(&self) -> &str {
        self.function.unique_id()
    }
}

impl PartialEq for ParameterizedFunction {
    fn eq(&self, other: &Self) -> bool {
        self.unique_id() == other.unique_id() && self.parameters == other.parameters
    }
}

impl Eq for ParameterizedFunction {}

impl fmt::Debug for ParameterizedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterizedFunction")
            .field("function", &self.unique_id())
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// A function defined entirely by declared data: fixed value names and
/// property shapes it produces and requires, emitted against whichever target
/// it is applied to.
///
/// Useful for wiring externally computed values into a rule repository and as
/// the workhorse of resolution tests.
pub struct StaticFunction {
    unique_id: String,
    target_type: TargetType,
    results: Vec<(String, ValueProperties)>,
    requirements: Vec<(String, ValueProperties)>,
    parameters: FunctionParameters,
}

impl StaticFunction {
    pub fn new(unique_id: impl Into<String>, target_type: TargetType) -> Self {
        StaticFunction {
            unique_id: unique_id.into(),
            target_type,
            results: Vec::new(),
            requirements: Vec::new(),
            parameters: FunctionParameters::empty(),
        }
    }

    /// Advertise a result by name, with the given properties.
    pub fn producing(
        mut self,
        value_name: impl Into<String>,
        properties: ValueProperties,
    ) -> Self {
        self.results.push((value_name.into(), properties));
        self
    }

    /// Require an input by name, under the given constraints, on the same
    /// target the function runs against.
    pub fn requiring(
        mut self,
        value_name: impl Into<String>,
        constraints: ValueProperties,
    ) -> Self {
        self.requirements.push((value_name.into(), constraints));
        self
    }

    pub fn with_parameters(mut self, parameters: FunctionParameters) -> Self {
        self.parameters = parameters;
        self
    }
}

impl FunctionDefinitionTrait for StaticFunction {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn target_type(&self) -> &TargetType {
        &self.target_type
    }

    fn default_parameters(&self) -> FunctionParameters {
        self.parameters.clone()
    }

    fn results(
        &self,
        target: &ComputationTarget,
    ) -> Result<Vec<ValueSpecification>, FunctionError> {
        let specification = target.specification();
        Ok(self
            .results
            .iter()
            .map(|(value_name, properties)| {
                ValueSpecification::new(
                    value_name.clone(),
                    specification.clone(),
                    properties.clone(),
                )
            })
            .collect())
    }

    fn requirements(
        &self,
        target: &ComputationTarget,
        _desired: &ValueRequirement,
    ) -> Result<Vec<ValueRequirement>, FunctionError> {
        let specification = target.specification();
        Ok(self
            .requirements
            .iter()
            .map(|(value_name, constraints)| {
                ValueRequirement::with_constraints(
                    value_name.clone(),
                    specification.clone(),
                    constraints.clone(),
                )
            })
            .collect())
    }
}

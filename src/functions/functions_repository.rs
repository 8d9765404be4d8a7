use std::collections::HashMap;
use std::sync::Arc;

use crate::functions::functions_errors::FunctionError;
use crate::functions::functions_traits::FunctionDefinitionTrait;

/// Registry of the functions available at compile time. Functions are
/// registered once, in a well-defined order, and shared read-only afterwards.
#[derive(Default)]
pub struct FunctionRepository {
    functions: Vec<Arc<dyn FunctionDefinitionTrait>>,
    by_id: HashMap<String, usize>,
}

impl FunctionRepository {
    pub fn new() -> Self {
        FunctionRepository::default()
    }

    pub fn add_function(
        &mut self,
        function: Arc<dyn FunctionDefinitionTrait>,
    ) -> Result<(), FunctionError> {
        let id = function.unique_id().to_string();
        if self.by_id.contains_key(&id) {
            return Err(FunctionError::DuplicateFunction(id));
        }
        self.by_id.insert(id, self.functions.len());
        self.functions.push(function);
        Ok(())
    }

    pub fn get(&self, unique_id: &str) -> Option<&Arc<dyn FunctionDefinitionTrait>> {
        self.by_id.get(unique_id).map(|index| &self.functions[*index])
    }

    /// Functions in registration order.
    pub fn functions(&self) -> &[Arc<dyn FunctionDefinitionTrait>] {
        &self.functions
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

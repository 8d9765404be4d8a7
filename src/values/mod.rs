pub mod value_properties;
pub mod values_model;

pub use value_properties::{PropertyValue, ValueProperties, ValuePropertiesBuilder};
pub use values_model::{ValueRequirement, ValueSpecification};

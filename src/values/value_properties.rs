use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Constraint state of a single named property.
///
/// An empty value set means "any value" (wildcard). An optional property does
/// not have to be defined by the other side for satisfaction to hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyValue {
    pub values: BTreeSet<String>,
    pub optional: bool,
}

impl PropertyValue {
    pub fn any() -> Self {
        PropertyValue {
            values: BTreeSet::new(),
            optional: false,
        }
    }

    pub fn of(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        PropertyValue {
            values: values.into_iter().map(Into::into).collect(),
            optional: false,
        }
    }

    pub fn is_any(&self) -> bool {
        self.values.is_empty()
    }
}

/// The constraint/advertisement language over named string-valued properties.
///
/// Used in two directions: a consumer *demands* properties on a value it is
/// willing to accept, and a producer *advertises* the properties of the value
/// it guarantees to output. `Empty` constrains nothing; `Infinite` advertises
/// every property with every value; `Finite` names specific properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueProperties {
    Empty,
    Infinite,
    Finite(BTreeMap<String, PropertyValue>),
}

impl ValueProperties {
    /// No constraints at all.
    pub fn none() -> Self {
        ValueProperties::Empty
    }

    /// Every property, with any value.
    pub fn all() -> Self {
        ValueProperties::Infinite
    }

    pub fn builder() -> ValuePropertiesBuilder {
        ValuePropertiesBuilder::new()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ValueProperties::Empty)
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ValueProperties::Infinite)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        match self {
            ValueProperties::Empty => false,
            ValueProperties::Infinite => true,
            ValueProperties::Finite(properties) => properties.contains_key(name),
        }
    }

    /// The specific values of a property, when it is defined with a finite
    /// set. `None` for undefined and for wildcard properties.
    pub fn specific_values(&self, name: &str) -> Option<&BTreeSet<String>> {
        match self {
            ValueProperties::Finite(properties) => properties
                .get(name)
                .filter(|property| !property.is_any())
                .map(|property| &property.values),
            _ => None,
        }
    }

    pub fn is_optional(&self, name: &str) -> bool {
        match self {
            ValueProperties::Finite(properties) => properties
                .get(name)
                .map(|property| property.optional)
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn property_names(&self) -> Vec<&str> {
        match self {
            ValueProperties::Finite(properties) => {
                properties.keys().map(String::as_str).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Whether a demand expressed by `self` is met by the `offered`
    /// properties of a producer.
    ///
    /// Every non-optional demanded property must be defined by the offer,
    /// with at least one value in common (a wildcard on either side always
    /// intersects). Optional demanded properties pass when the offer omits
    /// them but must still intersect when it does not.
    pub fn is_satisfied_by(&self, offered: &ValueProperties) -> bool {
        match self {
            ValueProperties::Empty => true,
            ValueProperties::Infinite => offered.is_all(),
            ValueProperties::Finite(demanded) => demanded
                .iter()
                .all(|(name, property)| Self::property_satisfied(name, property, offered)),
        }
    }

    fn property_satisfied(name: &str, demanded: &PropertyValue, offered: &ValueProperties) -> bool {
        match offered {
            ValueProperties::Infinite => true,
            ValueProperties::Empty => demanded.optional,
            ValueProperties::Finite(properties) => match properties.get(name) {
                None => demanded.optional,
                Some(offer) => {
                    demanded.is_any() || offer.is_any() || !demanded.values.is_disjoint(&offer.values)
                }
            },
        }
    }

    /// Narrow advertised properties to the shape actually demanded, yielding
    /// the properties of the bound output. Wildcards on the advertised side
    /// collapse to the demanded values; finite sets intersect. Properties the
    /// demand does not mention are kept as advertised.
    pub fn compose(&self, constraints: &ValueProperties) -> ValueProperties {
        match (self, constraints) {
            (ValueProperties::Empty, _) => ValueProperties::Empty,
            (advertised, ValueProperties::Empty) => advertised.clone(),
            (ValueProperties::Infinite, demanded) => demanded.clone(),
            (advertised, ValueProperties::Infinite) => advertised.clone(),
            (ValueProperties::Finite(advertised), ValueProperties::Finite(demanded)) => {
                let mut composed = BTreeMap::new();
                for (name, property) in advertised {
                    let narrowed = match demanded.get(name) {
                        Some(constraint) if property.is_any() && !constraint.is_any() => {
                            PropertyValue {
                                values: constraint.values.clone(),
                                optional: property.optional,
                            }
                        }
                        Some(constraint) if !property.is_any() && !constraint.is_any() => {
                            let intersection: BTreeSet<String> = property
                                .values
                                .intersection(&constraint.values)
                                .cloned()
                                .collect();
                            if intersection.is_empty() {
                                property.clone()
                            } else {
                                PropertyValue {
                                    values: intersection,
                                    optional: property.optional,
                                }
                            }
                        }
                        _ => property.clone(),
                    };
                    composed.insert(name.clone(), narrowed);
                }
                ValueProperties::Finite(composed)
            }
        }
    }
}

impl Default for ValueProperties {
    fn default() -> Self {
        ValueProperties::Empty
    }
}

impl fmt::Display for ValueProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueProperties::Empty => f.write_str("{}"),
            ValueProperties::Infinite => f.write_str("{*}"),
            ValueProperties::Finite(properties) => {
                f.write_str("{")?;
                let mut first = true;
                for (name, property) in properties {
                    if !first {
                        f.write_str(",")?;
                    }
                    first = false;
                    if property.is_any() {
                        write!(f, "{}=*", name)?;
                    } else {
                        let values: Vec<&str> =
                            property.values.iter().map(String::as_str).collect();
                        write!(f, "{}=[{}]", name, values.join(","))?;
                    }
                    if property.optional {
                        f.write_str("?")?;
                    }
                }
                f.write_str("}")
            }
        }
    }
}

/// Builder for finite property sets.
#[derive(Debug, Clone, Default)]
pub struct ValuePropertiesBuilder {
    properties: BTreeMap<String, PropertyValue>,
}

impl ValuePropertiesBuilder {
    pub fn new() -> Self {
        ValuePropertiesBuilder::default()
    }

    /// Add a single allowed value for a property, merging with any values
    /// already declared for it.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let property = self
            .properties
            .entry(name.into())
            .or_insert_with(PropertyValue::any);
        property.values.insert(value.into());
        self
    }

    pub fn with_values(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let property = self
            .properties
            .entry(name.into())
            .or_insert_with(PropertyValue::any);
        property.values.extend(values.into_iter().map(Into::into));
        self
    }

    /// Declare a property present with any value.
    pub fn with_any(mut self, name: impl Into<String>) -> Self {
        let property = self
            .properties
            .entry(name.into())
            .or_insert_with(PropertyValue::any);
        property.values.clear();
        self
    }

    /// Mark a property optional, declaring it wildcard if not yet present.
    pub fn with_optional(mut self, name: impl Into<String>) -> Self {
        let property = self
            .properties
            .entry(name.into())
            .or_insert_with(PropertyValue::any);
        property.optional = true;
        self
    }

    pub fn build(self) -> ValueProperties {
        if self.properties.is_empty() {
            ValueProperties::Empty
        } else {
            ValueProperties::Finite(self.properties)
        }
    }
}

use std::collections::HashSet;

use crate::values::values_model::ValueRequirement;

/// Decides whether a requirement no registered function produces can be
/// sourced as externally supplied raw data (live market data, reference
/// data). Consulted only for value names with no producing function.
pub trait MarketDataAvailabilityTrait: Send + Sync {
    fn is_available(&self, requirement: &ValueRequirement) -> bool;
}

/// Treats every unproduced requirement as available raw data. This is the
/// default: absence of a producer usually means the value is expected to
/// arrive from a market-data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimisticMarketDataAvailability;

impl MarketDataAvailabilityTrait for OptimisticMarketDataAvailability {
    fn is_available(&self, _requirement: &ValueRequirement) -> bool {
        true
    }
}

/// Only the named values are available as raw data.
#[derive(Debug, Clone, Default)]
pub struct FixedMarketDataAvailability {
    value_names: HashSet<String>,
}

impl FixedMarketDataAvailability {
    pub fn new(value_names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        FixedMarketDataAvailability {
            value_names: value_names.into_iter().map(Into::into).collect(),
        }
    }
}

impl MarketDataAvailabilityTrait for FixedMarketDataAvailability {
    fn is_available(&self, requirement: &ValueRequirement) -> bool {
        self.value_names.contains(&requirement.value_name)
    }
}

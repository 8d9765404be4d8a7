pub mod reachability_service;
pub mod reachability_traits;

#[cfg(test)]
pub(crate) mod tests;

pub use reachability_service::ReachabilityAnalyzer;
pub use reachability_traits::{
    FixedMarketDataAvailability, MarketDataAvailabilityTrait, OptimisticMarketDataAvailability,
};

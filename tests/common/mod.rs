use std::sync::Arc;

use quantfolio_core::engine::ResolutionEngine;
use quantfolio_core::functions::functions_model::{ParameterizedFunction, StaticFunction};
use quantfolio_core::reachability::FixedMarketDataAvailability;
use quantfolio_core::resolution::{ResolutionRule, ResolutionRuleRepository, SpecificTargetFilter};
use quantfolio_core::targets::targets_model::{
    ComputationTarget, TargetKind, TargetSpecification, TargetType,
};
use quantfolio_core::targets::targets_registry::TargetKindRegistry;
use quantfolio_core::targets::targets_traits::MapTargetResolver;
use quantfolio_core::values::value_properties::ValueProperties;

pub const ROOT_NODE: &str = "MainPortfolio";
pub const OVERRIDDEN_POSITION: &str = "POS-AAPL";

pub fn position(identifier: &str) -> ComputationTarget {
    ComputationTarget::new(TargetKind::position(), identifier)
}

pub fn position_in_root(identifier: &str) -> ComputationTarget {
    ComputationTarget::in_context(
        TargetKind::position(),
        identifier,
        TargetSpecification::new(TargetKind::portfolio_node(), ROOT_NODE),
    )
}

/// A small but complete portfolio-analytics configuration: market values fed
/// by raw prices, present values derived from market values with a
/// per-position override, and a portfolio weight that only makes sense for a
/// position seen within a node.
pub fn build_engine() -> ResolutionEngine {
    let registry = Arc::new(TargetKindRegistry::standard());
    let mut rules = ResolutionRuleRepository::new(registry);

    rules
        .add_function(
            Arc::new(
                StaticFunction::new("MarketValueFn", TargetType::leaf(TargetKind::tradeable()))
                    .producing(
                        "MarketValue",
                        ValueProperties::builder().with("Currency", "USD").build(),
                    )
                    .requiring("Price", ValueProperties::none()),
            ),
            0,
        )
        .unwrap();

    rules
        .add_function(
            Arc::new(
                StaticFunction::new("PresentValueFn", TargetType::leaf(TargetKind::position()))
                    .producing("PresentValue", ValueProperties::builder().with_any("Currency").build())
                    .requiring("MarketValue", ValueProperties::none()),
            ),
            100,
        )
        .unwrap();

    rules
        .add_rule(ResolutionRule::with_filter(
            ParameterizedFunction::new(Arc::new(
                StaticFunction::new(
                    "PresentValueOverrideFn",
                    TargetType::leaf(TargetKind::position()),
                )
                .producing("PresentValue", ValueProperties::all()),
            )),
            Arc::new(SpecificTargetFilter::new(
                position(OVERRIDDEN_POSITION).specification(),
            )),
            200,
        ))
        .unwrap();

    rules
        .add_function(
            Arc::new(
                StaticFunction::new(
                    "PortfolioWeightFn",
                    TargetType::contextual(TargetKind::portfolio_node(), TargetKind::position()),
                )
                .producing("Weight", ValueProperties::all()),
            ),
            0,
        )
        .unwrap();

    let targets =
        MapTargetResolver::new().with_target(ComputationTarget::new(TargetKind::portfolio_node(), ROOT_NODE));

    ResolutionEngine::new(rules, Arc::new(targets))
        .with_availability(Arc::new(FixedMarketDataAvailability::new(["Price"])))
}

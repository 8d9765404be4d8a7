use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{position_target, primitive_target, repository};
use crate::errors::{Error, Result};
use crate::functions::functions_errors::FunctionError;
use crate::functions::functions_model::{FunctionParameters, ParameterizedFunction, StaticFunction};
use crate::functions::functions_traits::FunctionDefinitionTrait;
use crate::resolution::resolution_compiler::RuleCompiler;
use crate::resolution::resolution_model::{ResolutionRule, SpecificTargetFilter};
use crate::resolution::resolution_repository::ResolutionRuleRepository;
use crate::resolution::resolution_service::{FunctionResolver, ResolvedFunction};
use crate::targets::targets_model::{
    ComputationTarget, TargetKind, TargetSpecification, TargetType,
};
use crate::targets::targets_traits::{EmptyTargetResolver, MapTargetResolver};
use crate::values::value_properties::ValueProperties;
use crate::values::values_model::{ValueRequirement, ValueSpecification};
use chrono::Utc;

fn resolver(rules: &ResolutionRuleRepository) -> FunctionResolver {
    let compiled = Arc::new(RuleCompiler::compile(rules, Utc::now()).unwrap());
    FunctionResolver::new(compiled, Arc::new(EmptyTargetResolver))
}

fn collect_ids(
    resolver: &FunctionResolver,
    value_name: &str,
    target: &ComputationTarget,
) -> Vec<String> {
    resolver
        .resolve_function(value_name, target, &ValueProperties::none())
        .unwrap()
        .map(|item| item.unwrap().function.unique_id().to_string())
        .collect()
}

fn producing(unique_id: &str, value_name: &str) -> Arc<StaticFunction> {
    Arc::new(
        StaticFunction::new(unique_id, TargetType::leaf(TargetKind::primitive()))
            .producing(value_name, ValueProperties::all()),
    )
}

#[test]
fn candidates_come_out_in_priority_order() {
    let mut rules = repository();
    rules.add_function(producing("Low", "Value"), 100).unwrap();
    rules.add_function(producing("High", "Value"), 200).unwrap();

    let resolver = resolver(&rules);
    assert_eq!(
        collect_ids(&resolver, "Value", &primitive_target("X")),
        vec!["High", "Low"]
    );
}

#[test]
fn a_target_specific_filter_redirects_only_its_own_target() {
    let mut rules = repository();
    let special = primitive_target("Special");
    rules.add_function(producing("General", "Value"), 100).unwrap();
    rules
        .add_rule(ResolutionRule::with_filter(
            ParameterizedFunction::new(producing("Override", "Value")),
            Arc::new(SpecificTargetFilter::new(special.specification())),
            200,
        ))
        .unwrap();

    let resolver = resolver(&rules);
    // The filtered rule outranks the general one where its filter matches.
    assert_eq!(
        collect_ids(&resolver, "Value", &special),
        vec!["Override", "General"]
    );
    // Everything else never sees the filtered rule.
    assert_eq!(
        collect_ids(&resolver, "Value", &primitive_target("Other")),
        vec!["General"]
    );
}

#[test]
fn a_miss_is_an_empty_sequence_not_an_error() {
    let mut rules = repository();
    rules.add_function(producing("Fn", "Value"), 0).unwrap();
    let resolver = resolver(&rules);
    let candidates: Vec<_> = resolver
        .resolve_function("Other", &primitive_target("X"), &ValueProperties::none())
        .unwrap()
        .collect();
    assert!(candidates.is_empty());
}

#[test]
fn unsatisfied_constraints_discard_the_candidate() {
    let mut rules = repository();
    rules
        .add_function(
            Arc::new(
                StaticFunction::new("Usd", TargetType::leaf(TargetKind::primitive())).producing(
                    "Value",
                    ValueProperties::builder().with("Currency", "USD").build(),
                ),
            ),
            0,
        )
        .unwrap();
    let resolver = resolver(&rules);
    let target = primitive_target("X");

    let eur = ValueProperties::builder().with("Currency", "EUR").build();
    assert!(resolver
        .resolve_function("Value", &target, &eur)
        .unwrap()
        .next()
        .is_none());

    let usd = ValueProperties::builder().with("Currency", "USD").build();
    let resolved: Vec<Result<ResolvedFunction>> = resolver
        .resolve_function("Value", &target, &usd)
        .unwrap()
        .collect();
    assert_eq!(resolved.len(), 1);
}

#[test]
fn bound_specification_satisfies_the_demanded_constraints() {
    let mut rules = repository();
    rules
        .add_function(
            Arc::new(
                StaticFunction::new("Fn", TargetType::leaf(TargetKind::primitive()))
                    .producing("Value", ValueProperties::builder().with_any("Curve").build()),
            ),
            0,
        )
        .unwrap();
    let resolver = resolver(&rules);
    let target = primitive_target("X");
    let constraints = ValueProperties::builder().with("Curve", "Flat").build();

    let resolved = resolver
        .resolve_function("Value", &target, &constraints)
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    let requirement = ValueRequirement::with_constraints(
        "Value",
        target.specification(),
        constraints.clone(),
    );
    assert!(resolved.specification.satisfies(&requirement));
    assert_eq!(
        resolved.specification.properties.specific_values("Curve"),
        constraints.specific_values("Curve")
    );
}

#[test]
fn sibling_outputs_travel_with_the_candidate() {
    let mut rules = repository();
    rules
        .add_function(
            Arc::new(
                StaticFunction::new("Both", TargetType::leaf(TargetKind::primitive()))
                    .producing("Delta", ValueProperties::all())
                    .producing("Gamma", ValueProperties::all()),
            ),
            0,
        )
        .unwrap();
    let resolver = resolver(&rules);

    let resolved = resolver
        .resolve_function("Delta", &primitive_target("X"), &ValueProperties::none())
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    assert_eq!(resolved.specification.value_name, "Delta");
    let names: Vec<&str> = resolved
        .results
        .iter()
        .map(|specification| specification.value_name.as_str())
        .collect();
    assert_eq!(names, vec!["Delta", "Gamma"]);
}

#[test]
fn a_compatible_supertype_registration_reaches_the_concrete_target() {
    let mut rules = repository();
    rules
        .add_function(
            Arc::new(
                StaticFunction::new("Pv", TargetType::leaf(TargetKind::tradeable()))
                    .producing("PresentValue", ValueProperties::all()),
            ),
            0,
        )
        .unwrap();
    let resolver = resolver(&rules);
    assert_eq!(
        collect_ids(&resolver, "PresentValue", &position_target("P1")),
        vec!["Pv"]
    );
}

/// Counts how often the engine actually asks for results; lets the tests pin
/// down that enumeration is pull-based.
struct CountingFunction {
    unique_id: String,
    target_type: TargetType,
    invocations: Arc<AtomicUsize>,
}

impl CountingFunction {
    fn new(unique_id: &str, invocations: Arc<AtomicUsize>) -> Self {
        CountingFunction {
            unique_id: unique_id.to_string(),
            target_type: TargetType::leaf(TargetKind::primitive()),
            invocations,
        }
    }
}

impl FunctionDefinitionTrait for CountingFunction {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn target_type(&self) -> &TargetType {
        &self.target_type
    }

    fn results(
        &self,
        target: &ComputationTarget,
    ) -> std::result::Result<Vec<ValueSpecification>, FunctionError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(vec![ValueSpecification::new(
            "Value",
            target.specification(),
            ValueProperties::all(),
        )])
    }

    fn requirements(
        &self,
        _target: &ComputationTarget,
        _desired: &ValueRequirement,
    ) -> std::result::Result<Vec<ValueRequirement>, FunctionError> {
        Ok(Vec::new())
    }
}

#[test]
fn enumeration_is_lazy() {
    let first_calls = Arc::new(AtomicUsize::new(0));
    let second_calls = Arc::new(AtomicUsize::new(0));

    let mut rules = repository();
    rules
        .add_function(Arc::new(CountingFunction::new("First", first_calls.clone())), 200)
        .unwrap();
    rules
        .add_function(
            Arc::new(CountingFunction::new("Second", second_calls.clone())),
            100,
        )
        .unwrap();

    let resolver = resolver(&rules);
    let mut candidates = resolver
        .resolve_function("Value", &primitive_target("X"), &ValueProperties::none())
        .unwrap();

    let first = candidates.next().unwrap().unwrap();
    assert_eq!(first.function.unique_id(), "First");
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);

    let second = candidates.next().unwrap().unwrap();
    assert_eq!(second.function.unique_id(), "Second");
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn abandoning_and_resuming_does_not_reevaluate_earlier_rules() {
    let first_calls = Arc::new(AtomicUsize::new(0));
    let second_calls = Arc::new(AtomicUsize::new(0));

    let mut rules = repository();
    rules
        .add_function(Arc::new(CountingFunction::new("First", first_calls.clone())), 200)
        .unwrap();
    rules
        .add_function(
            Arc::new(CountingFunction::new("Second", second_calls.clone())),
            100,
        )
        .unwrap();

    let resolver = resolver(&rules);
    let mut candidates = resolver
        .resolve_function("Value", &primitive_target("X"), &ValueProperties::none())
        .unwrap();

    // Caller tries the first candidate, rejects it, resumes.
    let _ = candidates.next().unwrap().unwrap();
    let _ = candidates.next().unwrap().unwrap();
    assert!(candidates.next().is_none());
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
}

fn contextual_rules() -> (ResolutionRuleRepository, ComputationTarget) {
    let mut rules = repository();
    rules
        .add_function(
            Arc::new(
                StaticFunction::new(
                    "NodeWeight",
                    TargetType::contextual(TargetKind::portfolio_node(), TargetKind::position()),
                )
                .producing("Weight", ValueProperties::all()),
            ),
            0,
        )
        .unwrap();
    let node = TargetSpecification::new(TargetKind::portfolio_node(), "N1");
    let target = ComputationTarget::in_context(TargetKind::position(), "P1", node);
    (rules, target)
}

#[test]
fn contextual_functions_apply_when_the_context_resolves() {
    let (rules, target) = contextual_rules();
    let compiled = Arc::new(RuleCompiler::compile(&rules, Utc::now()).unwrap());
    let mut targets = MapTargetResolver::new();
    targets.add_target(ComputationTarget::new(TargetKind::portfolio_node(), "N1"));
    let resolver = FunctionResolver::new(compiled, Arc::new(targets));

    let candidates: Vec<_> = resolver
        .resolve_function("Weight", &target, &ValueProperties::none())
        .unwrap()
        .collect();
    assert_eq!(candidates.len(), 1);
}

#[test]
fn an_unresolvable_context_silently_drops_the_candidate() {
    let (rules, target) = contextual_rules();
    let resolver = resolver(&rules);
    let candidates: Vec<_> = resolver
        .resolve_function("Weight", &target, &ValueProperties::none())
        .unwrap()
        .collect();
    assert!(candidates.is_empty());
}

#[test]
fn a_target_without_context_never_matches_a_contextual_rule() {
    let (rules, _) = contextual_rules();
    let resolver = resolver(&rules);
    let candidates: Vec<_> = resolver
        .resolve_function("Weight", &position_target("P1"), &ValueProperties::none())
        .unwrap()
        .collect();
    assert!(candidates.is_empty());
}

/// Claims applicability but then refuses to enumerate results; models a
/// misregistered function.
struct MisregisteredFunction {
    target_type: TargetType,
}

impl FunctionDefinitionTrait for MisregisteredFunction {
    fn unique_id(&self) -> &str {
        "Misregistered"
    }

    fn target_type(&self) -> &TargetType {
        &self.target_type
    }

    fn results(
        &self,
        target: &ComputationTarget,
    ) -> std::result::Result<Vec<ValueSpecification>, FunctionError> {
        Err(FunctionError::UnsupportedTarget {
            function: "Misregistered".to_string(),
            target: target.to_string(),
        })
    }

    fn requirements(
        &self,
        _target: &ComputationTarget,
        _desired: &ValueRequirement,
    ) -> std::result::Result<Vec<ValueRequirement>, FunctionError> {
        Ok(Vec::new())
    }
}

#[test]
fn a_contract_violation_surfaces_as_an_error_item() {
    let mut rules = repository();
    rules
        .add_function(
            Arc::new(MisregisteredFunction {
                target_type: TargetType::leaf(TargetKind::primitive()),
            }),
            0,
        )
        .unwrap();
    let resolver = resolver(&rules);
    let item = resolver
        .resolve_function("Value", &primitive_target("X"), &ValueProperties::none())
        .unwrap()
        .next()
        .unwrap();
    assert!(matches!(
        item,
        Err(Error::Function(FunctionError::UnsupportedTarget { .. }))
    ));
}

#[test]
fn resolving_against_an_unknown_kind_fails_up_front() {
    let rules = repository();
    let resolver = resolver(&rules);
    let target = ComputationTarget::new(TargetKind::new("Swaption"), "X");
    assert!(resolver
        .resolve_function("Value", &target, &ValueProperties::none())
        .is_err());
}

#[test]
fn distinct_parameter_sets_of_one_function_resolve_separately() {
    let mut rules = repository();
    let function = producing("Pv", "Value");
    rules
        .add_rule(ResolutionRule::new(
            ParameterizedFunction::new(function.clone()),
            200,
        ))
        .unwrap();
    rules
        .add_rule(ResolutionRule::new(
            ParameterizedFunction::with_parameters(
                function,
                FunctionParameters::empty().with("iterations", serde_json::json!(100)),
            ),
            100,
        ))
        .unwrap();

    let resolver = resolver(&rules);
    let candidates: Vec<_> = resolver
        .resolve_function("Value", &primitive_target("X"), &ValueProperties::none())
        .unwrap()
        .map(|item| item.unwrap())
        .collect();
    // Different parameters mean different planning units; no folding.
    assert_eq!(candidates.len(), 2);
    assert!(candidates[0].function.parameters.is_empty());
    assert!(!candidates[1].function.parameters.is_empty());
}

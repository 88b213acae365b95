use rstest::*;
use sats_core::models::{
    Archetype, BandId, Bidder, BidderId, ItemId, ItemWorld, Markup, Mip, RegionId,
    RegionalValue, World,
};
use sats_core::ports::{MipSolver, SolverOutput};
use sats_opt::microlp::MicrolpSolver;
use sats_opt::{
    AggregationLimit, AllocationError, DecodeError, FormulationConfig, FormulationError,
    ModelAssembler, allocate,
};

use worlds::*;

#[derive(Debug, thiserror::Error)]
#[error("solver unavailable")]
struct Unavailable;

/// Fails every solve
struct Offline;

impl MipSolver for Offline {
    type Error = Unavailable;

    fn solve(&self, _mip: &Mip) -> Result<SolverOutput, Self::Error> {
        Err(Unavailable)
    }
}

/// Succeeds without reporting any value
struct Silent;

impl MipSolver for Silent {
    type Error = Unavailable;

    fn solve(&self, _mip: &Mip) -> Result<SolverOutput, Self::Error> {
        Ok(SolverOutput::default())
    }
}

fn configuration_error(
    world: &World,
    bidders: &[Bidder],
    config: &FormulationConfig,
) -> FormulationError {
    match allocate(world, bidders, &MicrolpSolver, config) {
        Err(AllocationError::Configuration(err)) => err,
        other => panic!("expected a configuration error, got {other:?}"),
    }
}

#[rstest]
fn empty_population_is_rejected() {
    let err = configuration_error(&two_band_world(1), &[], &FormulationConfig::default());
    assert_eq!(err, FormulationError::EmptyPopulation);
}

#[rstest]
fn duplicate_bidders_are_rejected() {
    let bidders = vec![
        local(3, 0.4, linear_quality(), &[0]),
        local(3, 0.6, linear_quality(), &[0]),
    ];
    let err = configuration_error(&two_band_world(1), &bidders, &FormulationConfig::default());
    assert_eq!(err, FormulationError::DuplicateBidder(BidderId(3)));
}

#[rstest]
fn archetypes_must_fit_the_world() {
    let bidders = vec![local(0, 0.4, linear_quality(), &[0])];
    let err = configuration_error(&item_world(2), &bidders, &FormulationConfig::default());
    assert_eq!(
        err,
        FormulationError::ArchetypeMismatch {
            bidder: BidderId(0),
            archetype: "local",
            world: "items",
        }
    );
}

#[rstest]
fn duplicate_items_are_rejected() {
    let world = World::Items(ItemWorld {
        items: vec![ItemId(0), ItemId(1), ItemId(1)],
    });
    let bidders = vec![items_bidder(0, &[(0, 10.0), (1, 5.0)], Markup::default())];
    let err = configuration_error(&world, &bidders, &FormulationConfig::default());
    assert_eq!(err, FormulationError::DuplicateCategory(item(1)));
}

#[rstest]
fn unknown_regions_of_interest_are_rejected() {
    let bidders = vec![local(0, 0.4, linear_quality(), &[5])];
    let err = configuration_error(&two_band_world(1), &bidders, &FormulationConfig::default());
    assert_eq!(err, FormulationError::UnknownRegion(RegionId(5)));
}

#[rstest]
fn quality_domain_must_cover_every_share() {
    let bidders = vec![Bidder {
        id: BidderId(0),
        archetype: Archetype::Local {
            value: RegionalValue {
                alpha: 0.4,
                beta: 0.5,
                quality: pwl(&[(-0.2, 0.0), (0.5, 1.0)]),
            },
            regions_of_interest: vec![RegionId(0)],
        },
    }];
    let err = configuration_error(&two_band_world(1), &bidders, &FormulationConfig::default());
    assert!(matches!(
        err,
        FormulationError::Domain { ref variable, domain_lower, .. }
            if variable == "qin_b0_r0" && domain_lower == -0.2
    ));
}

#[rstest]
#[case::zero(0.0)]
#[case::negative(-2.0)]
#[case::nan(f64::NAN)]
fn scaling_overrides_must_be_positive(#[case] factor: f64) {
    let config = FormulationConfig {
        scaling_override: Some(factor),
        ..Default::default()
    };
    let bidders = vec![local(0, 0.4, linear_quality(), &[0])];
    let err = ModelAssembler::new(&two_band_world(1), &bidders, &config)
        .assemble()
        .unwrap_err();
    assert!(matches!(err, FormulationError::InvalidScaling(_)));
}

#[rstest]
fn aggregation_limits_need_known_bands() {
    let config = FormulationConfig {
        aggregation_limit: Some(AggregationLimit::new("LOW_PAIRED", "UNPAIRED")),
        ..Default::default()
    };
    let bidders = vec![national(0, 0.4, &[(0.0, 1.0), (1.0, 0.5)])];
    let err = configuration_error(&paired_world(2), &bidders, &config);
    assert_eq!(err, FormulationError::UnknownBand(BandId::from("UNPAIRED")));
}

#[rstest]
fn solver_failures_are_passed_through() {
    let bidders = vec![local(0, 0.4, linear_quality(), &[0])];
    let result = allocate(
        &two_band_world(1),
        &bidders,
        &Offline,
        &FormulationConfig::default(),
    );
    assert!(matches!(result, Err(AllocationError::Solve(Unavailable))));
}

#[rstest]
fn incomplete_assignments_fail_to_decode() {
    let bidders = vec![local(0, 0.4, linear_quality(), &[0])];
    let result = allocate(
        &two_band_world(1),
        &bidders,
        &Silent,
        &FormulationConfig::default(),
    );
    match result {
        Err(AllocationError::Decode(DecodeError::MissingVariable(name))) => {
            assert_eq!(name, "x_b0_r0_A")
        }
        other => panic!("expected a decoding error, got {other:?}"),
    }
}

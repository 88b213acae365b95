use approx::assert_relative_eq;
use rstest::*;
use rstest_reuse::{self, *};
use sats_core::models::BidderId;
use sats_core::ports::MipSolver;
use sats_opt::{AggregationLimit, FormulationConfig, allocate};

mod all_solvers;
use all_solvers::all_solvers;

use worlds::*;

#[fixture]
fn limited() -> FormulationConfig {
    FormulationConfig {
        aggregation_limit: Some(AggregationLimit::new("LOW_PAIRED", "HIGH_PAIRED")),
        ..Default::default()
    }
}

#[apply(all_solvers)]
#[rstest]
fn global_bidder_alone_covers_everything(solver: impl MipSolver) {
    let world = two_band_world(3);
    let bidders = vec![global(0, 0.4, &[(0.0, 1.0), (1.0, 0.5), (2.0, 0.2)])];

    let result = allocate(&world, &bidders, &solver, &FormulationConfig::default()).unwrap();

    assert_relative_eq!(result.total_value, 60.0, epsilon = 1e-4);
    let global = result.bidder(BidderId(0)).unwrap();
    for region in 0..3 {
        assert_eq!(global.quantity(&license(region, "A")), 2);
        assert_eq!(global.quantity(&license(region, "B")), 6);
    }
}

#[apply(all_solvers)]
#[rstest]
fn global_bidder_keeps_a_foothold_to_avoid_the_discount(solver: impl MipSolver) {
    let world = two_band_world(2);
    let bidders = vec![
        global(0, 0.4, &[(0.0, 1.0), (1.0, 0.5)]),
        local(1, 0.8, linear_quality(), &[1]),
    ];

    let result = allocate(&world, &bidders, &solver, &FormulationConfig::default()).unwrap();

    // one lot of band B in region 1 keeps the global bidder undiscounted
    let expected = 20.0 + 20.0 * 10.0 / 140.0 + 40.0 * 130.0 / 140.0;
    assert_relative_eq!(result.total_value, expected, epsilon = 1e-4);

    let global = result.bidder(BidderId(0)).unwrap();
    assert_eq!(global.quantity(&license(1, "A")), 0);
    assert_eq!(global.quantity(&license(1, "B")), 1);
    let global_value = bidders[0].value(&world, &global.quantities).unwrap();
    assert_relative_eq!(global.value, global_value, epsilon = 1e-4);

    let local = result.bidder(BidderId(1)).unwrap();
    assert_eq!(local.quantity(&license(1, "A")), 2);
    assert_eq!(local.quantity(&license(1, "B")), 5);
}

#[apply(all_solvers)]
#[rstest]
fn uncovered_regions_beyond_the_domain_use_the_last_discount(solver: impl MipSolver) {
    let world = two_band_world(3);
    // two competitors outbid the global bidder in regions 1 and 2
    let bidders = vec![
        global(0, 0.4, &[(0.0, 1.0), (1.0, 0.5)]),
        local(1, 1.0, linear_quality(), &[1]),
        local(2, 1.0, linear_quality(), &[2]),
    ];

    let result = allocate(&world, &bidders, &solver, &FormulationConfig::default()).unwrap();

    for bidder in bidders.iter() {
        let allocation = result.bidder(bidder.id).unwrap();
        let expected = bidder.value(&world, &allocation.quantities).unwrap();
        assert_relative_eq!(allocation.value, expected, epsilon = 1e-4);
    }
    assert_relative_eq!(result.objective, result.total_value, epsilon = 1e-4);
}

#[apply(all_solvers)]
#[rstest]
fn national_bidders_use_a_single_paired_band(solver: impl MipSolver, limited: FormulationConfig) {
    let world = paired_world(2);
    let bidders = vec![national(0, 0.4, &[(0.0, 1.0), (1.0, 0.5)])];

    let unlimited = allocate(&world, &bidders, &solver, &FormulationConfig::default()).unwrap();
    assert_relative_eq!(unlimited.total_value, 20.0, epsilon = 1e-4);

    let result = allocate(&world, &bidders, &solver, &limited).unwrap();
    assert_relative_eq!(result.total_value, 10.0, epsilon = 1e-4);
    let national = result.bidder(BidderId(0)).unwrap();
    assert_eq!(national.quantity(&license(0, "LOW_PAIRED")), 2);
    assert_eq!(national.quantity(&license(0, "HIGH_PAIRED")), 0);
}

#[apply(all_solvers)]
#[rstest]
fn national_bidders_never_mix_paired_bands(solver: impl MipSolver, limited: FormulationConfig) {
    // one lot per band: holding both would double the value and respects
    // both the pair limit and the high-band limit
    let world = paired_world(1);
    let bidders = vec![national(0, 0.4, &[(0.0, 1.0), (1.0, 0.5)])];

    let unlimited = allocate(&world, &bidders, &solver, &FormulationConfig::default()).unwrap();
    assert_relative_eq!(unlimited.total_value, 20.0, epsilon = 1e-4);

    let result = allocate(&world, &bidders, &solver, &limited).unwrap();
    assert_relative_eq!(result.total_value, 10.0, epsilon = 1e-4);
    let national = result.bidder(BidderId(0)).unwrap();
    let low = national.quantity(&license(0, "LOW_PAIRED"));
    let high = national.quantity(&license(0, "HIGH_PAIRED"));
    assert_eq!(low + high, 1);
}

#[apply(all_solvers)]
#[rstest]
fn paired_bands_stay_open_to_other_bidders(solver: impl MipSolver, limited: FormulationConfig) {
    let world = paired_world(1);
    let bidders = vec![local(0, 0.4, linear_quality(), &[0])];

    let result = allocate(&world, &bidders, &solver, &limited).unwrap();

    assert_relative_eq!(result.total_value, 20.0, epsilon = 1e-4);
    let local = result.bidder(BidderId(0)).unwrap();
    assert_eq!(local.quantity(&license(0, "LOW_PAIRED")), 1);
    assert_eq!(local.quantity(&license(0, "HIGH_PAIRED")), 1);
}

#[apply(all_solvers)]
#[rstest]
fn pair_limit_applies_to_every_bidder(solver: impl MipSolver, limited: FormulationConfig) {
    let world = paired_world(2);
    let bidders = vec![local(0, 0.4, linear_quality(), &[0])];

    let result = allocate(&world, &bidders, &solver, &limited).unwrap();

    assert_relative_eq!(result.total_value, 10.0, epsilon = 1e-4);
    let local = result.bidder(BidderId(0)).unwrap();
    assert_eq!(
        local.quantity(&license(0, "LOW_PAIRED")) + local.quantity(&license(0, "HIGH_PAIRED")),
        2
    );
}

use approx::assert_relative_eq;
use rstest::*;
use rstest_reuse::{self, *};
use sats_core::models::{
    AllocationResult, Archetype, Bidder, BidderId, Region, RegionId, RegionalValue,
    RegionalWorld, World,
};
use sats_core::ports::MipSolver;
use sats_opt::{FormulationConfig, ModelAssembler, allocate};

mod all_solvers;
use all_solvers::all_solvers;

use worlds::*;

/// Every decoded value must equal the bidder's own valuation of its bundle,
/// and the allocation must respect supply.
fn assert_consistent(world: &World, bidders: &[Bidder], result: &AllocationResult) {
    for bidder in bidders {
        let allocation = result.bidder(bidder.id).unwrap();
        let expected = bidder.value(world, &allocation.quantities).unwrap();
        assert_relative_eq!(allocation.value, expected, epsilon = 1e-4);
    }
    for category in world.categories() {
        assert!(result.allocated(&category.id) <= category.capacity);
    }
    let sum: f64 = result.bidders.values().map(|a| a.value).sum();
    assert_relative_eq!(result.total_value, sum, epsilon = 1e-9);
    assert_relative_eq!(result.objective, result.total_value, epsilon = 1e-4);
}

#[apply(all_solvers)]
#[rstest]
fn constant_quality_values_are_allocation_independent(solver: impl MipSolver) {
    let world = two_band_world(1);
    let plateau = pwl(&[(-0.5, 0.8), (0.5, 0.8)]);
    let bidders = vec![
        local(0, 0.4, plateau.clone(), &[0]),
        local(1, 0.6, plateau, &[0]),
    ];

    let result = allocate(&world, &bidders, &solver, &FormulationConfig::default()).unwrap();

    assert_relative_eq!(result.total_value, 40.0, epsilon = 1e-4);
    assert_relative_eq!(
        result.bidder(BidderId(0)).unwrap().value,
        16.0,
        epsilon = 1e-4
    );
    assert_relative_eq!(
        result.bidder(BidderId(1)).unwrap().value,
        24.0,
        epsilon = 1e-4
    );
    assert_eq!(result.scaling_factor, 1.0);
    assert_consistent(&world, &bidders, &result);
}

#[apply(all_solvers)]
#[rstest]
fn higher_coefficient_wins_everything(solver: impl MipSolver) {
    let world = two_band_world(1);
    let bidders = vec![
        local(0, 0.4, linear_quality(), &[0]),
        local(1, 0.6, linear_quality(), &[0]),
    ];

    let result = allocate(&world, &bidders, &solver, &FormulationConfig::default()).unwrap();

    assert_relative_eq!(result.total_value, 30.0, epsilon = 1e-4);
    let winner = result.bidder(BidderId(1)).unwrap();
    assert_eq!(winner.quantity(&license(0, "A")), 2);
    assert_eq!(winner.quantity(&license(0, "B")), 6);
    assert!(result.bidder(BidderId(0)).unwrap().is_empty());
    assert_consistent(&world, &bidders, &result);
}

#[apply(all_solvers)]
#[rstest]
fn s_shaped_quality_is_linearized_exactly(solver: impl MipSolver) {
    let world = two_band_world(2);
    let bidders = vec![
        local(0, 0.4, s_quality(), &[0, 1]),
        local(1, 0.6, s_quality(), &[0, 1]),
    ];

    let result = allocate(&world, &bidders, &solver, &FormulationConfig::default()).unwrap();

    assert_relative_eq!(result.total_value, 60.0, epsilon = 1e-4);
    assert_consistent(&world, &bidders, &result);
}

#[apply(all_solvers)]
#[rstest]
fn regional_bidders_discount_by_distance(solver: impl MipSolver) {
    let world = two_band_world(3);
    let bidders = vec![
        Bidder {
            id: BidderId(0),
            archetype: Archetype::Regional {
                value: value(0.4, linear_quality()),
                home: RegionId(0),
                distance_discounts: vec![1.0, 0.5],
            },
        },
        local(1, 0.4, linear_quality(), &[2]),
    ];

    let result = allocate(&world, &bidders, &solver, &FormulationConfig::default()).unwrap();

    // 20 at home, 10 next door, nothing two hops away; the local bidder takes region 2
    assert_relative_eq!(result.total_value, 50.0, epsilon = 1e-4);
    let local = result.bidder(BidderId(1)).unwrap();
    assert_eq!(local.quantity(&license(2, "A")), 2);
    assert_eq!(local.quantity(&license(2, "B")), 6);
    assert_consistent(&world, &bidders, &result);
}

#[apply(all_solvers)]
#[rstest]
fn scaling_does_not_change_the_allocation(solver: impl MipSolver) {
    let world = two_band_world(1);
    let bidders = vec![
        local(0, 0.4, linear_quality(), &[0]),
        local(1, 0.6, linear_quality(), &[0]),
    ];

    for factor in [1.0, 1000.0] {
        let config = FormulationConfig {
            scaling_override: Some(factor),
            ..Default::default()
        };
        let result = allocate(&world, &bidders, &solver, &config).unwrap();
        assert_eq!(result.scaling_factor, factor);
        assert_relative_eq!(result.total_value, 30.0, epsilon = 1e-3);
        assert_eq!(
            result.bidder(BidderId(1)).unwrap().quantity(&license(0, "A")),
            2
        );
    }

    // a ceiling below the highest value triggers scaling
    let config = FormulationConfig {
        safe_ceiling: 10.0,
        ..Default::default()
    };
    let result = allocate(&world, &bidders, &solver, &config).unwrap();
    assert_relative_eq!(result.scaling_factor, 3.0, epsilon = 1e-12);
    assert_relative_eq!(result.total_value, 30.0, epsilon = 1e-3);
    assert_consistent(&world, &bidders, &result);
}

#[apply(all_solvers)]
#[rstest]
fn peaked_quality_is_not_capped_by_the_full_bundle(solver: impl MipSolver) {
    // quality peaks at half of the regional capacity and drops afterwards
    let world = World::MultiRegion(RegionalWorld {
        regions: vec![Region {
            id: RegionId(0),
            population: 100.0,
        }],
        adjacency: vec![],
        bands: vec![band("A", 2, 10.0, &[(0.0, 1.0), (2.0, 1.0)])],
    });
    let bidders = vec![Bidder {
        id: BidderId(0),
        archetype: Archetype::Local {
            value: RegionalValue {
                alpha: 1.0,
                beta: 0.5,
                quality: pwl(&[(-0.5, 0.0), (0.0, 1.0), (0.5, 0.2)]),
            },
            regions_of_interest: vec![RegionId(0)],
        },
    }];

    let result = allocate(&world, &bidders, &solver, &FormulationConfig::default()).unwrap();

    assert_relative_eq!(result.total_value, 50.0, epsilon = 1e-4);
    assert_eq!(
        result.bidder(BidderId(0)).unwrap().quantity(&license(0, "A")),
        1
    );
    assert_consistent(&world, &bidders, &result);
}

#[rstest]
fn value_variables_are_bounded_by_the_full_bundle() {
    let world = two_band_world(2);
    let bidders = vec![
        local(0, 0.4, linear_quality(), &[0]),
        local(1, 0.6, s_quality(), &[0, 1]),
    ];
    let config = FormulationConfig {
        safe_ceiling: 20.0,
        ..Default::default()
    };
    let model = ModelAssembler::new(&world, &bidders, &config)
        .assemble()
        .unwrap();

    // the highest full-bundle value is 60
    assert_relative_eq!(model.scaling_factor, 3.0, epsilon = 1e-12);
    for (bidder, full) in [(BidderId(0), 20.0), (BidderId(1), 60.0)] {
        let var = model.space.value_variable(bidder).unwrap();
        let upper = model.mip.variable(var).unwrap().upper;
        assert_relative_eq!(upper, full / 3.0, max_relative = 1e-5);
    }
}

fn variable_names(world: &World, bidders: &[Bidder]) -> Vec<String> {
    let config = FormulationConfig::default();
    let model = ModelAssembler::new(world, bidders, &config)
        .assemble()
        .unwrap();
    model
        .mip
        .variables()
        .map(|(_, variable)| variable.name.clone())
        .collect()
}

#[rstest]
fn assembly_is_deterministic() {
    let world = two_band_world(2);
    let bidders = vec![
        local(0, 0.4, s_quality(), &[0]),
        local(1, 0.6, linear_quality(), &[0, 1]),
    ];

    let first = variable_names(&world, &bidders);
    assert_eq!(first, variable_names(&world, &bidders));
    assert_eq!(first[0], "x_b0_r0_A");
    assert!(first.contains(&"omega_b1_r1".to_owned()));
}

//! Integration test: beam and branch-and-bound against brute force

use fodiscovery::prelude::*;
use fodiscovery::search::exhaustive_top_k;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const TOL: f64 = 1e-9;

/// Random categorical table whose last attribute depends on the first two predictors
fn random_table(seed: u64, predictors: usize, rows: usize) -> DiscreteTable {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut columns: Vec<Vec<u32>> = (0..predictors)
        .map(|_| {
            let arity = rng.gen_range(2..=3u32);
            (0..rows).map(|_| rng.gen_range(0..arity)).collect()
        })
        .collect();

    let target: Vec<u32> = (0..rows)
        .map(|r| {
            if rng.gen::<f64>() < 0.2 {
                rng.gen_range(0..3)
            } else {
                (columns[0][r] + 2 * columns[1][r]) % 3
            }
        })
        .collect();
    columns.push(target);

    let names: Vec<String> = (0..=predictors).map(|i| format!("x{}", i)).collect();
    DiscreteTable::from_columns(
        "random",
        names.iter().map(String::as_str).zip(columns).collect(),
    )
    .unwrap()
}

/// Four binary attributes: y = a xor b, c is noise
fn xor_data_table() -> DataTable {
    let a = [0., 0., 0., 0., 1., 1., 1., 1., 0., 0., 0., 0., 1., 1., 1., 1.];
    let b = [0., 0., 1., 1., 0., 0., 1., 1., 0., 0., 1., 1., 0., 0., 1., 1.];
    let c = [0., 1., 0., 1., 0., 1., 0., 1., 0., 1., 0., 1., 0., 1., 0., 1.];
    let y: Vec<f64> = a.iter().zip(&b).map(|(x, z)| (x + z) % 2.0).collect();
    DataTable::from_columns(
        "xor",
        vec![
            (Attribute::categorical("a"), a.to_vec()),
            (Attribute::categorical("b"), b.to_vec()),
            (Attribute::categorical("c"), c.to_vec()),
            (Attribute::categorical("y"), y),
        ],
    )
    .unwrap()
}

fn assert_scores_match(actual: &[f64], expected: &[f64], context: &str) {
    assert_eq!(actual.len(), expected.len(), "{}: result count", context);
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < TOL, "{}: {:?} vs {:?}", context, actual, expected);
    }
}

#[test]
fn test_xor_scenario_beam_and_exact_agree() {
    let table = xor_data_table();

    let beam = discover(&table, Target::Last, &DiscoveryConfig::beam(4)).unwrap();
    let exact = discover(&table, Target::Last, &DiscoveryConfig::default()).unwrap();

    let best = exact.best().expect("exact search finds a pattern");
    assert_eq!(best.subset.indices(), vec![0, 1], "a and b determine y");
    assert_eq!(beam.patterns, exact.patterns);
    assert_eq!(exact.statistics.winning_depth, 2);
    assert_eq!(exact.statistics.search_space_size, 8.0);
}

#[test]
fn test_branch_and_bound_matches_exhaustive() {
    let estimators = [
        OptimisticEstimator::None,
        OptimisticEstimator::Mon,
        OptimisticEstimator::Chain,
        OptimisticEstimator::Spc,
    ];
    let propagations = [RefinementPropagation::All, RefinementPropagation::NonRedundant];
    let operator_orders = [OperatorOrder::OpusPaper, OperatorOrder::Lexicographic];

    for seed in 0..4 {
        let table = random_table(seed, 6, 40);
        let target = 6;
        let base = DiscoveryConfig::default().with_top_k(3);
        let expected = exhaustive_top_k(&table, target, &base).unwrap().scores();

        for order in TraverseOrder::ALL {
            for estimator in estimators {
                for propagation in propagations {
                    for operator_order in operator_orders {
                        let config = base
                            .clone()
                            .with_traverse_order(order)
                            .with_estimator(estimator)
                            .with_propagation(propagation)
                            .with_operator_order(operator_order);
                        let outcome = BranchAndBoundEngine::new(&table, target, &config)
                            .unwrap()
                            .run()
                            .unwrap();
                        let context = format!(
                            "seed {} {:?} {:?} {:?} {:?}",
                            seed, order, estimator, propagation, operator_order
                        );
                        assert_scores_match(&outcome.scores(), &expected, &context);
                        assert_eq!(outcome.statistics.termination, Termination::Exhausted);
                    }
                }
            }
        }
    }
}

#[test]
fn test_pruning_reduces_work() {
    let table = random_table(11, 8, 60);
    let unpruned = DiscoveryConfig::default().with_estimator(OptimisticEstimator::None);
    let pruned = DiscoveryConfig::default().with_estimator(OptimisticEstimator::Spc);

    let a = BranchAndBoundEngine::new(&table, 8, &unpruned).unwrap().run().unwrap();
    let b = BranchAndBoundEngine::new(&table, 8, &pruned).unwrap().run().unwrap();

    assert_eq!(a.statistics.nodes_created, 255, "NONE visits the whole lattice");
    assert!(b.statistics.nodes_created <= a.statistics.nodes_created);
    assert!(b.statistics.pruned_percentage() >= 0.0);
    assert_scores_match(&b.scores(), &a.scores(), "pruned vs unpruned");
}

#[test]
fn test_beam_never_beats_exact() {
    for seed in 0..8 {
        let table = random_table(100 + seed, 7, 50);
        let exact = BranchAndBoundEngine::new(&table, 7, &DiscoveryConfig::default())
            .unwrap()
            .run()
            .unwrap();
        let exact_best = exact.best().unwrap().score;

        for width in 1..=3 {
            let beam = BeamSearchEngine::new(&table, 7, &DiscoveryConfig::beam(width))
                .unwrap()
                .run()
                .unwrap();
            let beam_best = beam.best().unwrap().score;
            assert!(
                beam_best <= exact_best + TOL,
                "seed {} width {}: beam {} > exact {}",
                seed,
                width,
                beam_best,
                exact_best
            );
            assert!(beam.statistics.max_frontier_size <= width.max(1));
        }
    }
}

#[test]
fn test_untruncated_beam_is_exact() {
    for seed in 0..4 {
        let table = random_table(200 + seed, 6, 40);
        let config = DiscoveryConfig::beam(20).with_top_k(3);
        let beam = BeamSearchEngine::new(&table, 6, &config).unwrap().run().unwrap();
        let expected = exhaustive_top_k(&table, 6, &config).unwrap().scores();
        assert_scores_match(&beam.scores(), &expected, &format!("seed {}", seed));
    }
}

#[test]
fn test_beam_width_at_least_predictors_on_three_attributes() {
    let table = random_table(7, 3, 30);
    let config = DiscoveryConfig::beam(3);
    let beam = BeamSearchEngine::new(&table, 3, &config).unwrap().run().unwrap();
    let expected = exhaustive_top_k(&table, 3, &config).unwrap();
    assert_scores_match(&beam.scores(), &expected.scores(), "three predictors");
}

#[test]
fn test_depth_first_and_best_first_agree() {
    for seed in 0..4 {
        let table = random_table(300 + seed, 7, 50);
        let dfs = DiscoveryConfig::default()
            .with_top_k(2)
            .with_traverse_order(TraverseOrder::DepthFirst);
        let best_first = dfs.clone().with_traverse_order(TraverseOrder::BestFirstPotential);

        let a = BranchAndBoundEngine::new(&table, 7, &dfs).unwrap().run().unwrap();
        let b = BranchAndBoundEngine::new(&table, 7, &best_first).unwrap().run().unwrap();
        assert_scores_match(&a.scores(), &b.scores(), &format!("seed {}", seed));
        assert!(a.statistics.nodes_created <= 127);
        assert!(b.statistics.nodes_created <= 127);
    }
}

#[test]
fn test_propagation_policies_agree() {
    let table = random_table(400, 6, 40);
    for algorithm_config in [DiscoveryConfig::default(), DiscoveryConfig::beam(3)] {
        let all = algorithm_config
            .clone()
            .with_top_k(3)
            .with_propagation(RefinementPropagation::All);
        let non_redundant = all.clone().with_propagation(RefinementPropagation::NonRedundant);

        let a = fodiscovery::discover_discrete(&table, 6, &all).unwrap();
        let b = fodiscovery::discover_discrete(&table, 6, &non_redundant).unwrap();
        assert_scores_match(&a.scores(), &b.scores(), "ALL vs NON_REDUNDANT");
    }
}

#[test]
fn test_alpha_approximation_guarantee() {
    for seed in 0..4 {
        let table = random_table(500 + seed, 7, 60);
        let exact = BranchAndBoundEngine::new(&table, 7, &DiscoveryConfig::default())
            .unwrap()
            .run()
            .unwrap();
        let optimum = exact.best().unwrap().score;
        assert!(optimum > 0.0, "fixture target depends on x0 and x1");

        let approx_config = DiscoveryConfig::default().with_alpha(0.5);
        let approx = BranchAndBoundEngine::new(&table, 7, &approx_config)
            .unwrap()
            .run()
            .unwrap();
        let found = approx.best().unwrap().score;
        assert!(found >= 0.5 * optimum - TOL, "{} < 0.5 * {}", found, optimum);
    }
}

#[test]
fn test_result_set_invariants() {
    let table = random_table(600, 6, 40);
    for config in [
        DiscoveryConfig::default().with_top_k(5),
        DiscoveryConfig::beam(2).with_top_k(5),
    ] {
        let outcome = fodiscovery::discover_discrete(&table, 6, &config).unwrap();
        let patterns = &outcome.patterns;

        assert!(patterns.len() <= 5);
        assert!(patterns.iter().all(|p| !p.subset.is_empty()));
        assert!(patterns.iter().all(|p| !p.subset.contains(6)));
        assert!(patterns.windows(2).all(|w| w[0].score >= w[1].score));

        let mut subsets: Vec<_> = patterns.iter().map(|p| p.subset.clone()).collect();
        subsets.sort();
        subsets.dedup();
        assert_eq!(subsets.len(), patterns.len(), "patterns are distinct");
    }
}

#[test]
fn test_language_options() {
    let mut table_columns: Vec<(&str, Vec<u32>)> = vec![
        ("a", vec![0, 0, 1, 1, 0, 1, 0, 1, 1, 0]),
        ("id", (0..10).collect()),
        ("a_copy", vec![1, 1, 0, 0, 1, 0, 1, 0, 0, 1]),
        ("b", vec![0, 1, 0, 1, 1, 0, 0, 1, 0, 1]),
    ];
    table_columns.push(("y", vec![0, 1, 1, 0, 1, 1, 0, 0, 1, 1]));
    let table = DiscreteTable::from_columns("language", table_columns).unwrap();

    let engines = [
        DiscoveryConfig::default(),
        DiscoveryConfig::default().with_operator_order(OperatorOrder::Lexicographic),
        DiscoveryConfig::beam(6),
    ];

    for language in [LanguageOption::All, LanguageOption::ExcludeKeys, LanguageOption::Minimal] {
        for engine in &engines {
            let config = engine.clone().with_top_k(4).with_language(language);
            let expected = exhaustive_top_k(&table, 4, &config).unwrap();
            let outcome = fodiscovery::discover_discrete(&table, 4, &config).unwrap();
            let context = format!("{:?} {:?} {:?}", language, config.algorithm, config.operator_order);
            assert_scores_match(&outcome.scores(), &expected.scores(), &context);

            if language == LanguageOption::ExcludeKeys {
                assert!(outcome.patterns.iter().all(|p| !p.subset.contains(1)), "{}", context);
                assert!(outcome.statistics.nodes_discarded_by_rule > 0, "{}", context);
            }
            if language == LanguageOption::Minimal {
                let both_copies: SubsetKey = vec![0, 2].into();
                assert!(
                    outcome
                        .patterns
                        .iter()
                        .all(|p| !both_copies.is_subset_of(&p.subset)),
                    "{}",
                    context
                );
            }
        }
    }
}

#[test]
fn test_exclude_keys_with_code_gaps() {
    let table = DiscreteTable::from_columns(
        "gaps",
        vec![
            ("dup_gap", vec![0, 0, 3, 1]),
            ("key_gap", vec![0, 2, 4, 6]),
            ("y", vec![0, 1, 1, 0]),
        ],
    )
    .unwrap();

    for engine in [DiscoveryConfig::default(), DiscoveryConfig::beam(2)] {
        let config = engine.with_top_k(3).with_language(LanguageOption::ExcludeKeys);
        let outcome = fodiscovery::discover_discrete(&table, 2, &config).unwrap();
        let subsets: Vec<Vec<usize>> = outcome.patterns.iter().map(|p| p.subset.indices()).collect();
        assert_eq!(subsets, vec![vec![0]], "{:?}", config.algorithm);
    }
}

#[test]
fn test_budgets_end_search_gracefully() {
    let table = random_table(700, 8, 60);

    let node_budget = DiscoveryConfig::default()
        .with_estimator(OptimisticEstimator::None)
        .with_max_nodes(2);
    let outcome = BranchAndBoundEngine::new(&table, 8, &node_budget).unwrap().run().unwrap();
    assert_eq!(outcome.statistics.termination, Termination::NodeBudget);
    assert!(!outcome.patterns.is_empty(), "best-so-far results are kept");

    let time_budget = DiscoveryConfig::default().with_time_budget(1e-9);
    let outcome = BranchAndBoundEngine::new(&table, 8, &time_budget).unwrap().run().unwrap();
    assert_eq!(outcome.statistics.termination, Termination::TimeBudget);

    let beam_budget = DiscoveryConfig::beam(3).with_max_nodes(1);
    let outcome = BeamSearchEngine::new(&table, 8, &beam_budget).unwrap().run().unwrap();
    assert_eq!(outcome.statistics.termination, Termination::NodeBudget);
}

#[test]
fn test_invalid_configuration_rejected() {
    let table = xor_data_table();

    let bins = DiscoveryConfig::default()
        .with_discretization(DiscretizationConfig::equal_frequency(1));
    assert!(matches!(
        discover(&table, Target::Last, &bins),
        Err(DiscoveryError::InvalidConfig { .. })
    ));

    let top_k = DiscoveryConfig::default().with_top_k(0);
    assert!(matches!(
        discover(&table, Target::Last, &top_k),
        Err(DiscoveryError::InvalidConfig { .. })
    ));

    assert!(matches!(
        discover(&table, Target::Index(9), &DiscoveryConfig::default()),
        Err(DiscoveryError::TargetAttributeInvalid(_))
    ));
}

#[test]
fn test_no_predictors_yields_empty_result() {
    let table = DiscreteTable::from_columns("only-target", vec![("y", vec![0, 1, 0])]).unwrap();
    let outcome = fodiscovery::discover_discrete(&table, 0, &DiscoveryConfig::default()).unwrap();
    assert!(outcome.patterns.is_empty());
    assert_eq!(outcome.statistics.nodes_created, 0);
}

#[test]
fn test_constant_target_scores_zero() {
    let table = DiscreteTable::from_columns(
        "constant",
        vec![("a", vec![0, 1, 0, 1]), ("b", vec![1, 1, 0, 0]), ("y", vec![2, 2, 2, 2])],
    )
    .unwrap();
    let outcome = fodiscovery::discover_discrete(&table, 2, &DiscoveryConfig::default().with_top_k(3))
        .unwrap();
    assert!(outcome.patterns.iter().all(|p| p.score == 0.0));
}

use candle_core::{DType, Device, Tensor};
use rand::rngs::StdRng;
use rand::SeedableRng;
use subsample_align::alignment::oracles::{at_least_kept, expected_kept_count};
use subsample_align::alignment::sampling::{empirical_alignment_matrix, uniform_emission_batch};
use subsample_align::{
    compute_alignment_matrix, compute_alignment_matrix_batched, AlignmentEngineBuilder,
    AlignmentError, EmissionBatch, EngineConfig,
};

fn f64_engine() -> subsample_align::AlignmentEngine {
    let config = EngineConfig {
        dtype: "f64".to_string(),
        ..EngineConfig::default()
    };
    AlignmentEngineBuilder::new(config).build().expect("engine")
}

#[test]
fn two_element_fixture_through_both_strategies() {
    let (p0, p1) = (0.25, 0.8);
    let expected = [[p0, (1.0 - p0) * p1], [0.0, p0 * p1]];

    let reference = compute_alignment_matrix(&[p0, p1]).unwrap();
    let batched = f64_engine()
        .compute(&EmissionBatch::single(vec![p0, p1]))
        .unwrap();
    let batched = batched.get(0).unwrap();

    for m in 0..2 {
        for n in 0..2 {
            assert!((reference.get(m, n) - expected[m][n]).abs() < 1e-12);
            assert!((batched.get(m, n) - expected[m][n]).abs() < 1e-12);
        }
    }
    assert_eq!(reference.get(1, 0), 0.0);
    assert_eq!(batched.get(1, 0), 0.0);
}

#[test]
fn single_element_is_one_by_one() {
    let a = compute_alignment_matrix(&[0.6]).unwrap();
    assert_eq!(a.to_rows(), vec![vec![0.6]]);

    let batched = f64_engine()
        .compute(&EmissionBatch::single(vec![0.6]))
        .unwrap();
    assert_eq!(batched.get(0).unwrap().size, 1);
    assert!((batched.get(0).unwrap().get(0, 0) - 0.6).abs() < 1e-12);
}

#[test]
fn row_and_total_mass_match_oracles() {
    let mut rng = StdRng::seed_from_u64(2024);
    let batch = uniform_emission_batch(5, 12, &mut rng);
    for row in batch.rows() {
        let a = compute_alignment_matrix(row).unwrap();
        assert!((a.total_mass() - expected_kept_count(row)).abs() < 1e-10);
        for (m, tail) in at_least_kept(row).into_iter().enumerate() {
            let mass = a.row_mass(m);
            assert!(mass <= 1.0 + 1e-12, "row {m} mass {mass}");
            assert!((mass - tail).abs() < 1e-10, "row {m}: {mass} vs {tail}");
        }
        assert!(a.values.iter().all(|&v| v >= 0.0));
    }
}

#[test]
fn degenerate_inputs_through_engine() {
    let engine = f64_engine();
    let batch = EmissionBatch::from_rows(vec![vec![0.0; 6], vec![1.0; 6]]).unwrap();
    let out = engine.compute(&batch).unwrap();

    let zeros = out.get(0).unwrap();
    assert!(zeros.values.iter().all(|&v| v == 0.0));

    let ones = out.get(1).unwrap();
    for m in 0..6 {
        for n in 0..6 {
            let expected = if m == n { 1.0 } else { 0.0 };
            assert!((ones.get(m, n) - expected).abs() < 1e-9);
        }
    }
}

#[test]
fn reference_converges_to_simulation() {
    let e = [0.6, 0.2, 0.9, 0.45, 0.3];
    let mut rng = StdRng::seed_from_u64(99);
    let empirical = empirical_alignment_matrix(&e, 50_000, &mut rng);
    let exact = compute_alignment_matrix(&e).unwrap();
    let diff = exact.max_abs_diff(&empirical).unwrap();
    assert!(diff < 0.02, "max deviation {diff}");
}

#[test]
fn zero_padding_leaves_prefix_unchanged() {
    let short = compute_alignment_matrix(&[0.4, 0.7, 0.5]).unwrap();
    let padded = compute_alignment_matrix(&[0.4, 0.7, 0.5, 0.0, 0.0]).unwrap();
    for m in 0..5 {
        for n in 0..5 {
            let expected = if m < 3 && n < 3 { short.get(m, n) } else { 0.0 };
            assert!((padded.get(m, n) - expected).abs() < 1e-15);
        }
    }
}

#[test]
fn raw_tensor_entry_point_matches_engine() {
    let values = vec![0.3f64, 0.5, 0.9, 0.1, 0.2, 0.6, 0.7, 0.05];
    let tensor = Tensor::from_vec(values.clone(), (2, 4), &Device::Cpu).unwrap();
    let raw = compute_alignment_matrix_batched(&tensor, EngineConfig::DEFAULT_STABILITY_FLOOR)
        .unwrap()
        .to_vec3::<f64>()
        .unwrap();
    let via_engine = f64_engine()
        .compute_tensor(&tensor)
        .unwrap()
        .to_vec3::<f64>()
        .unwrap();
    for (a, b) in raw.iter().flatten().flatten().zip(via_engine.iter().flatten().flatten()) {
        assert!((a - b).abs() < 1e-15);
    }
}

#[test]
fn engine_f32_output_keeps_f32_dtype() {
    let engine = AlignmentEngineBuilder::new(EngineConfig::default())
        .build()
        .unwrap();
    let tensor = Tensor::new(&[[0.5f32, 0.5, 0.5]], &Device::Cpu).unwrap();
    let out = engine.compute_tensor(&tensor).unwrap();
    assert_eq!(out.dtype(), DType::F32);
    assert_eq!(out.dims(), &[1, 3, 3]);
}

#[test]
fn domain_violations_fail_fast() {
    let engine = f64_engine();
    let err = engine
        .compute(&EmissionBatch::single(vec![0.1, f64::NAN]))
        .unwrap_err();
    assert!(matches!(err, AlignmentError::InvalidProbability { position: 1, .. }));

    let err = compute_alignment_matrix(&[-0.01]).unwrap_err();
    assert!(matches!(err, AlignmentError::InvalidProbability { position: 0, .. }));
}

#[test]
fn ragged_rows_require_explicit_padding() {
    let err = EmissionBatch::from_rows(vec![vec![0.5, 0.5], vec![0.5]]).unwrap_err();
    assert!(matches!(err, AlignmentError::ShapeMismatch { .. }));

    let padded = EmissionBatch::from_rows_zero_padded(vec![vec![0.5, 0.5], vec![0.5]]);
    let out = f64_engine().compute(&padded).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out.get(1).unwrap().row_mass(1), 0.0);
}

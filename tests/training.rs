use autoencoder::{AeError, Autoencoder, Dataset, TrainingOptions, write_model};

/// Two alternating prototypes, so the data has fewer directions of
/// variation than its width.
fn pattern_rows(rows: usize, dim: usize) -> Dataset {
    let a: Vec<f32> = (0..dim)
        .map(|i| if i % 2 == 0 { 0.9 } else { 0.1 })
        .collect();
    let b: Vec<f32> = (0..dim)
        .map(|i| if i % 2 == 0 { 0.2 } else { 0.7 })
        .collect();

    let rows: Vec<Vec<f32>> = (0..rows)
        .map(|i| if i % 2 == 0 { a.clone() } else { b.clone() })
        .collect();
    Dataset::from_rows(&rows).unwrap()
}

fn quick_options(epochs: u32) -> TrainingOptions {
    TrainingOptions {
        epochs,
        seed: Some(42),
        ..TrainingOptions::default()
    }
}

#[test]
fn zero_epochs_is_rejected_before_touching_the_model() {
    let mut model = Autoencoder::new(3, 16, 4).unwrap();
    let data = pattern_rows(8, 16);
    let options = TrainingOptions {
        epochs: 0,
        ..TrainingOptions::default()
    };

    assert!(matches!(
        model.train(&data, &options),
        Err(AeError::InvalidOptions(_))
    ));
}

#[test]
fn zero_report_interval_is_rejected() {
    let mut model = Autoencoder::new(3, 16, 4).unwrap();
    let data = pattern_rows(8, 16);
    let options = TrainingOptions {
        report_interval: 0,
        ..TrainingOptions::default()
    };

    assert!(matches!(
        model.train(&data, &options),
        Err(AeError::InvalidOptions(_))
    ));
}

#[test]
fn empty_dataset_is_rejected() {
    let mut model = Autoencoder::new(3, 16, 4).unwrap();
    let data = Dataset::from_rows::<Vec<f32>>(&[]).unwrap();

    assert!(matches!(
        model.train(&data, &quick_options(10)),
        Err(AeError::InvalidOptions(_))
    ));
}

#[test]
fn mismatched_dataset_width_is_rejected() {
    let mut model = Autoencoder::new(3, 16, 4).unwrap();
    let data = pattern_rows(8, 15);

    assert!(matches!(
        model.train(&data, &quick_options(10)),
        Err(AeError::DimensionMismatch {
            got: 15,
            expected: 16,
            ..
        })
    ));
}

#[test]
fn final_loss_does_not_exceed_the_initial_loss() {
    let data = pattern_rows(16, 12);

    // One epoch evaluates the freshly initialized parameters exactly once,
    // so its reported loss is the starting point of the longer run.
    let mut baseline = Autoencoder::new(2, 12, 3).unwrap();
    let initial = baseline.train(&data, &quick_options(1)).unwrap();

    let mut model = Autoencoder::new(2, 12, 3).unwrap();
    let trained = model.train(&data, &quick_options(400)).unwrap();

    assert!(trained.is_finite());
    assert!(trained <= initial);
}

#[test]
fn longer_runs_never_report_a_worse_best_loss() {
    let data = pattern_rows(16, 12);

    let mut short = Autoencoder::new(2, 12, 3).unwrap();
    let mut long = Autoencoder::new(2, 12, 3).unwrap();
    let short_loss = short.train(&data, &quick_options(20)).unwrap();
    let long_loss = long.train(&data, &quick_options(400)).unwrap();

    assert!(long_loss <= short_loss);
}

#[test]
fn best_parameters_never_lose_to_the_last_ones() {
    let data = pattern_rows(16, 12);
    let keep_best = quick_options(150);
    let keep_last = TrainingOptions {
        keep_lowest_loss: false,
        ..quick_options(150)
    };

    let mut best = Autoencoder::new(2, 12, 3).unwrap();
    let mut last = Autoencoder::new(2, 12, 3).unwrap();
    let best_loss = best.train(&data, &keep_best).unwrap();
    let last_loss = last.train(&data, &keep_last).unwrap();

    assert!(best_loss <= last_loss);
}

#[test]
fn seeded_runs_are_reproducible() {
    let data = pattern_rows(8, 10);

    let mut a = Autoencoder::new(2, 10, 2).unwrap();
    let mut b = Autoencoder::new(2, 10, 2).unwrap();
    let loss_a = a.train(&data, &quick_options(50)).unwrap();
    let loss_b = b.train(&data, &quick_options(50)).unwrap();

    assert_eq!(loss_a, loss_b);
    assert_eq!(
        a.encode(data.row(0)).unwrap(),
        b.encode(data.row(0)).unwrap()
    );
}

#[test]
fn training_rewrites_the_shared_parameter_buffer() {
    let data = pattern_rows(8, 10);
    let mut model = Autoencoder::new(2, 10, 2).unwrap();

    let mut before = Vec::new();
    write_model(&model, &mut before).unwrap();

    model.train(&data, &quick_options(30)).unwrap();

    let mut after = Vec::new();
    write_model(&model, &mut after).unwrap();

    assert_eq!(before.len(), after.len());
    assert_ne!(before, after);

    let latent = model.encode(data.row(0)).unwrap();
    assert_eq!(latent.len(), 2);
    assert_eq!(model.decode(&latent).unwrap().len(), 10);
}

#[test]
fn encode_is_pure() {
    let data = pattern_rows(8, 10);
    let mut model = Autoencoder::new(2, 10, 2).unwrap();
    model.train(&data, &quick_options(25)).unwrap();

    let first = model.encode(data.row(1)).unwrap();
    let second = model.encode(data.row(1)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn exploding_initialization_reports_divergence() {
    let data = pattern_rows(4, 8);
    let mut model = Autoencoder::new(1, 8, 2).unwrap();
    let options = TrainingOptions {
        epochs: 10,
        initial_noise: 1e30,
        seed: Some(5),
        ..TrainingOptions::default()
    };

    match model.train(&data, &options) {
        Err(AeError::Diverged { step, .. }) => assert_eq!(step, 0),
        other => panic!("expected divergence, got {other:?}"),
    }
}

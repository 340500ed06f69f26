use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ml_pipeline::preprocessing::{ColumnTransformer, ScalerType};
use ml_pipeline::training::{DecisionTree, LinearRegression, RandomForest};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_regression_data(n_rows: usize, n_features: usize) -> (Array2<f64>, Array1<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let x = Array2::from_shape_fn((n_rows, n_features), |_| rng.gen::<f64>() * 10.0);
    let y = x.rows().into_iter().map(|row| row.sum() + rng.gen::<f64>() * 0.1).collect();
    (x, y)
}

fn create_frame(n_rows: usize, n_features: usize) -> DataFrame {
    let (x, _) = create_regression_data(n_rows, n_features);
    let columns: Vec<Column> = (0..n_features)
        .map(|j| Column::new(format!("feature_{}", j).into(), x.column(j).to_vec()))
        .collect();
    DataFrame::new(columns).unwrap()
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    group.sample_size(10);

    for n_rows in [1000, 5000].iter() {
        let (x, y) = create_regression_data(*n_rows, 10);

        group.bench_with_input(BenchmarkId::new("linear_regression", n_rows), &(&x, &y), |b, (x, y)| {
            b.iter(|| LinearRegression::new().fit(black_box(x), black_box(y)).map(|_| ()).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("decision_tree", n_rows), &(&x, &y), |b, (x, y)| {
            b.iter(|| {
                DecisionTree::new_regressor()
                    .with_max_depth(8)
                    .fit(black_box(x), black_box(y))
                    .map(|_| ())
                    .unwrap()
            })
        });

        group.bench_with_input(BenchmarkId::new("random_forest", n_rows), &(&x, &y), |b, (x, y)| {
            b.iter(|| {
                RandomForest::new_regressor(20)
                    .with_max_depth(8)
                    .fit(black_box(x), black_box(y))
                    .map(|_| ())
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_preprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocessing");

    for n_rows in [1000, 10000].iter() {
        let df = create_frame(*n_rows, 6);
        let groups = |names: &[usize]| names.iter().map(|j| format!("feature_{}", j)).collect::<Vec<_>>();

        group.bench_with_input(BenchmarkId::new("column_transformer", n_rows), &df, |b, df| {
            b.iter(|| {
                let mut ct = ColumnTransformer::new()
                    .with_scaler("scaler_standard", ScalerType::Standard, groups(&[0, 1]))
                    .with_scaler("scaler_robust", ScalerType::Robust, groups(&[2, 3]))
                    .with_scaler("scaler_minmax", ScalerType::MinMax, groups(&[4]));
                ct.fit_transform(black_box(df)).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fit, bench_preprocessing);
criterion_main!(benches);

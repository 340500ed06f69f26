//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// A CSV written into a temporary directory that lives as long as the fixture
pub struct CsvFixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

fn write_csv(header: &str, rows: impl Iterator<Item = String>) -> CsvFixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "{}", header).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    CsvFixture { dir, path }
}

/// `y = 3a - 2b + 1` exactly, plus an unused column `noise`
pub fn regression_csv(n: usize) -> CsvFixture {
    write_csv(
        "a,b,noise,y",
        (0..n).map(|i| {
            let a = i as f64 * 0.5;
            let b = ((i * 7) % 11) as f64;
            let noise = ((i * 13) % 5) as f64;
            let y = 3.0 * a - 2.0 * b + 1.0;
            format!("{:.3},{:.3},{:.3},{:.3}", a, b, noise, y)
        }),
    )
}

/// Two well separated classes: label 1 when `a + b` is large
pub fn binary_csv(n: usize) -> CsvFixture {
    write_csv(
        "a,b,label",
        (0..n).map(|i| {
            let label = i % 2;
            let offset = if label == 1 { 10.0 } else { 0.0 };
            let a = offset + ((i * 3) % 7) as f64 * 0.3;
            let b = offset + ((i * 5) % 9) as f64 * 0.2;
            format!("{:.3},{:.3},{}", a, b, label)
        }),
    )
}

/// Three classes laid out along `a`
pub fn multiclass_csv(n: usize) -> CsvFixture {
    write_csv(
        "a,b,label",
        (0..n).map(|i| {
            let label = i % 3;
            let a = label as f64 * 10.0 + ((i * 7) % 5) as f64 * 0.4;
            let b = ((i * 11) % 6) as f64;
            format!("{:.3},{:.3},{}", a, b, label)
        }),
    )
}

pub fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

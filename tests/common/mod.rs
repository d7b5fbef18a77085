//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tempfile::TempDir;

const VEHICLE_TYPES: [&str; 4] = ["01", "05", "06", "14"];
const SEXES: [&str; 3] = ["M", "F", "missing"];

/// Collision records with a fixed number of fatalities.
///
/// Every `rows / positives`-th row is a fatality. Fatal rows lean towards
/// vehicle type "14" and bad weather so a classifier has something to learn.
/// Columns: `index`, `C_MNTH`, `C_WTHR`, `C_RCFG`, `V_TYPE`, `P_SEX`,
/// `P_AGE`, `FATALITY`.
pub fn create_collision_dataframe(rows: usize, positives: usize) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let stride = rows / positives.max(1);

    let mut index = Vec::with_capacity(rows);
    let mut month = Vec::with_capacity(rows);
    let mut weather = Vec::with_capacity(rows);
    let mut road = Vec::with_capacity(rows);
    let mut vehicle = Vec::with_capacity(rows);
    let mut sex = Vec::with_capacity(rows);
    let mut age = Vec::with_capacity(rows);
    let mut fatality = Vec::with_capacity(rows);

    for i in 0..rows {
        let fatal = i % stride == 0 && i / stride < positives;

        index.push(i as i64);
        month.push(rng.gen_range(1..=12i64));
        road.push(rng.gen_range(1..=5i64));
        age.push(rng.gen_range(16..=90i64));
        sex.push(SEXES[rng.gen_range(0..SEXES.len())].to_string());

        if fatal && rng.gen_bool(0.7) {
            weather.push(rng.gen_range(5..=7i64));
            vehicle.push("14".to_string());
        } else {
            weather.push(rng.gen_range(1..=7i64));
            vehicle.push(VEHICLE_TYPES[rng.gen_range(0..VEHICLE_TYPES.len())].to_string());
        }

        fatality.push(fatal as i64);
    }

    df! {
        "index" => index,
        "C_MNTH" => month,
        "C_WTHR" => weather,
        "C_RCFG" => road,
        "V_TYPE" => vehicle,
        "P_SEX" => sex,
        "P_AGE" => age,
        "FATALITY" => fatality,
    }
    .unwrap()
}

/// Records for the feature-subset analysis: the five subset features plus a
/// three-level severity `P_ISEV` (1 = none, 2 = injury, 3 = fatal).
pub fn create_severity_dataframe(rows: usize) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let mut weather = Vec::with_capacity(rows);
    let mut road = Vec::with_capacity(rows);
    let mut month = Vec::with_capacity(rows);
    let mut vehicle = Vec::with_capacity(rows);
    let mut age = Vec::with_capacity(rows);
    let mut severity = Vec::with_capacity(rows);

    for i in 0..rows {
        let level = match i % 10 {
            0 | 1 => 3i64,
            2..=5 => 2,
            _ => 1,
        };
        severity.push(level);
        weather.push(if level == 3 && rng.gen_bool(0.6) {
            7i64
        } else {
            rng.gen_range(1..=7)
        });
        road.push(rng.gen_range(1..=5i64));
        month.push(rng.gen_range(1..=12i64));
        vehicle.push(VEHICLE_TYPES[rng.gen_range(0..VEHICLE_TYPES.len())].to_string());
        age.push(rng.gen_range(2..=8i64) * 10);
    }

    df! {
        "C_WTHR" => weather,
        "C_RCFG" => road,
        "C_MNTH" => month,
        "V_TYPE" => vehicle,
        "P_AGE" => age,
        "P_ISEV" => severity,
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let mut file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Write a collision CSV whose `C_WTHR` column is numeric for `numeric_rows`
/// rows and then ends with a single `missing` cell
pub fn create_late_missing_csv(numeric_rows: usize) -> (TempDir, PathBuf) {
    use std::io::Write;

    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("late_missing.csv");

    let mut file = std::io::BufWriter::new(std::fs::File::create(&csv_path).unwrap());
    writeln!(file, "index,C_WTHR,V_TYPE,FATALITY").unwrap();
    for i in 0..numeric_rows {
        let fatal = u8::from(i % 10 == 0);
        writeln!(file, "{},{},{},{}", i, 1 + i % 7, 1 + i % 3, fatal).unwrap();
    }
    writeln!(file, "{},missing,2,1", numeric_rows).unwrap();
    drop(file);

    (temp_dir, csv_path)
}

/// Read a CSV written by one of the commands
pub fn read_csv(path: &std::path::Path) -> DataFrame {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .unwrap()
        .finish()
        .unwrap()
}

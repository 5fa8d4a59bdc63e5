use std::fs;
use std::path::{Path, PathBuf};

use ilp_reader::{KeyOrder, MemoryContainer, ReadOptions, read_project, read_project_with};

fn golden_dir(dir: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join(dir)
}

fn load_container(dir: &str) -> MemoryContainer {
    let input = golden_dir(dir).join("project.json");
    MemoryContainer::from_json_file(&input).expect("load project.json")
}

fn load_expected(dir: &str) -> serde_json::Value {
    let expected_path = golden_dir(dir).join("expected_project.json");
    let expected_json = fs::read_to_string(&expected_path).expect("read expected_project.json");
    serde_json::from_str(&expected_json).expect("parse expected project")
}

fn run_golden(dir: &str) {
    let container = load_container(dir);
    let expected = load_expected(dir);

    let actual = read_project(&container).expect("read project");
    let actual_value = serde_json::to_value(actual).expect("serialize actual");

    assert_eq!(actual_value, expected, "golden mismatch in {dir}");
}

#[test]
fn golden_pixel_classification() {
    run_golden("tests/golden/pixel_classification");
}

#[test]
fn golden_pixel_classification_timestamp() {
    let project = read_project(&load_container("tests/golden/pixel_classification"))
        .expect("read project");
    let created = project.created_at().expect("ctime timestamp");
    assert_eq!(created.year(), 2020);
    assert_eq!(created.day(), 15);
    assert_eq!(created.hour(), 9);
}

#[test]
fn golden_pixel_classification_numeric_order_matches() {
    let container = load_container("tests/golden/pixel_classification");
    let options = ReadOptions {
        key_order: KeyOrder::Numeric,
        ..ReadOptions::default()
    };

    let lexicographic = read_project(&container).expect("read project");
    let numeric = read_project_with(&container, &options).expect("read project");
    assert_eq!(lexicographic, numeric);
}

#[test]
fn golden_fixture_round_trips_through_json() {
    let container = load_container("tests/golden/pixel_classification");
    let json = serde_json::to_string(&container).expect("serialize container");
    let reloaded = MemoryContainer::from_json_str(&json).expect("reload container");
    assert_eq!(reloaded, container);
}

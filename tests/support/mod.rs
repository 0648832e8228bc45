#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sqlnorm::{NormalizeOptions, Normalizer, Numbering};

pub(crate) fn fixture_dir(fixture: &str) -> PathBuf {
    PathBuf::from("tests/fixtures").join(fixture)
}

pub(crate) fn read_fixture_sql(fixture: &str) -> String {
    let path = fixture_dir(fixture).join("input.sql");
    std::fs::read_to_string(path).expect("fixture SQL should be readable")
}

pub(crate) fn read_fixture_expected(fixture: &str) -> String {
    let path = fixture_dir(fixture).join("expected.sql");
    std::fs::read_to_string(path).expect("fixture expectation should be readable")
}

/// Options from the fixture's `options.json`, or the defaults when absent.
pub(crate) fn load_fixture_options(fixture: &str) -> NormalizeOptions {
    let path = fixture_dir(fixture).join("options.json");
    match std::fs::read_to_string(path) {
        Ok(json) => NormalizeOptions::from_json(&json).expect("fixture options should parse"),
        Err(_) => NormalizeOptions::default(),
    }
}

pub(crate) fn fixture_names() -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir("tests/fixtures")
        .expect("fixtures directory should exist")
        .flatten()
        .filter(|entry| entry.path().join("input.sql").is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();
    names.sort();
    names
}

/// Script-wide numbering with GROUP BY alignment, as pg_stat_statements sees it.
pub(crate) fn pg_stat_statements_normalizer() -> Normalizer {
    Normalizer::new(NormalizeOptions {
        numbering: Numbering::Script,
        match_group_by_targets: true,
        keep_routine_bodies: false,
    })
}

pub(crate) fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}_{nanos}"));
    std::fs::create_dir_all(&dir).expect("should create temp dir");
    dir
}

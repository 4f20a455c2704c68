mod support;

use accessibility_store::config::StoreOptions;
use accessibility_store::format::AccessibilityRecord;
use accessibility_store::preprocess::{self, RowMajorInputs};
use accessibility_store::query::{self, QueryRequest};
use std::collections::HashMap as StdHashMap;
use support::{write_dataset, GeneratorConfig, NullPolicy};

fn build_store(config: &GeneratorConfig, options: &StoreOptions) -> tempfile::TempDir {
    let input_dir = tempfile::tempdir().unwrap();
    let dataset = support::generate(config);
    let (origin_path, destination_path, accessibility_path) =
        write_dataset(input_dir.path(), &dataset, "test");

    let output_dir = tempfile::tempdir().unwrap();
    preprocess::run(
        &RowMajorInputs {
            origin_path,
            destination_path,
            accessibility_path,
        },
        output_dir.path(),
        options,
    )
    .unwrap();

    output_dir
}

fn read_records(path: &std::path::Path) -> Vec<AccessibilityRecord> {
    let bytes = std::fs::read(path).unwrap();
    assert_eq!(bytes.len() % AccessibilityRecord::SIZE, 0);
    bytes
        .chunks_exact(AccessibilityRecord::SIZE)
        .map(AccessibilityRecord::from_bytes)
        .collect()
}

fn as_multiset(records: &[AccessibilityRecord]) -> StdHashMap<(u32, u32), u32> {
    let mut counts = StdHashMap::new();
    for r in records {
        *counts.entry((r.origin_id, r.destination_id)).or_insert(0) += 1;
    }
    counts
}

/// Builds a store with a column-index null-fraction policy: column `a` is
/// `(1 - a/100)` fraction null — column 0 is all-null, column 1 is ~1%
/// non-null, and columns at index 100+ are fully dense. This is the policy
/// the spec's concrete end-to-end scenarios (S1/S2/S3/S4/S6) are defined
/// against; the dataset here is scaled down from the scenario's literal
/// sizes so the test suite stays fast, but the column-threshold behavior
/// and intersection semantics it exercises are the same.
fn scenario_config() -> GeneratorConfig {
    GeneratorConfig {
        num_origins: 300,
        num_dests: 50,
        origin_attrs: 210,
        dest_attrs: 210,
        seed: 33,
        null_policy: support::NullPolicy::ColumnIndexThreshold,
    }
}

/// S2-equivalent / S3: querying on fully-dense columns returns every
/// origin-destination pair, and diagonal pairs carry a zeroed time/distance.
#[test_log::test]
fn all_dense_columns_return_every_pair_with_zero_diagonal() {
    let config = scenario_config();
    let options = StoreOptions::new()
        .origin_attrs(config.origin_attrs)
        .dest_attrs(config.dest_attrs);
    let store_dir = build_store(&config, &options);

    let result_path = store_dir.path().join("result.bin");
    query::run(
        &QueryRequest {
            store_dir: store_dir.path().to_path_buf(),
            origin_attrs: vec![200],
            dest_attrs: vec![200],
            result_path: result_path.clone(),
        },
        &options,
    )
    .unwrap();

    let records = read_records(&result_path);
    assert_eq!(records.len(), config.num_origins as usize * config.num_dests as usize);

    for record in &records {
        if record.origin_id == record.destination_id {
            assert_eq!(record.time, 0.0);
            assert_eq!(record.distance, 0.0);
        }
    }
}

/// S6: a fully-null column yields an empty result regardless of the other
/// side's filter.
#[test_log::test]
fn fully_null_column_yields_empty_result() {
    let config = scenario_config();
    let options = StoreOptions::new()
        .origin_attrs(config.origin_attrs)
        .dest_attrs(config.dest_attrs);
    let store_dir = build_store(&config, &options);

    let result_path = store_dir.path().join("result.bin");
    query::run(
        &QueryRequest {
            store_dir: store_dir.path().to_path_buf(),
            origin_attrs: vec![0],
            dest_attrs: vec![200],
            result_path: result_path.clone(),
        },
        &options,
    )
    .unwrap();

    assert_eq!(std::fs::metadata(&result_path).unwrap().len(), 0);
}

/// S4: intersection semantics — the kept origins equal the intersection of
/// the non-null id sets of the two requested columns, not their union.
#[test_log::test]
fn multi_attribute_query_is_intersection_not_union() {
    let config = scenario_config();
    let options = StoreOptions::new()
        .origin_attrs(config.origin_attrs)
        .dest_attrs(config.dest_attrs);
    let store_dir = build_store(&config, &options);

    let single_result = store_dir.path().join("single.bin");
    query::run(
        &QueryRequest {
            store_dir: store_dir.path().to_path_buf(),
            origin_attrs: vec![50],
            dest_attrs: vec![200],
            result_path: single_result.clone(),
        },
        &options,
    )
    .unwrap();

    let pair_result = store_dir.path().join("pair.bin");
    query::run(
        &QueryRequest {
            store_dir: store_dir.path().to_path_buf(),
            origin_attrs: vec![50, 60],
            dest_attrs: vec![200],
            result_path: pair_result.clone(),
        },
        &options,
    )
    .unwrap();

    let single_origins: std::collections::HashSet<u32> =
        read_records(&single_result).iter().map(|r| r.origin_id).collect();
    let pair_origins: std::collections::HashSet<u32> =
        read_records(&pair_result).iter().map(|r| r.origin_id).collect();

    // Adding a second required attribute can only narrow (or preserve) the
    // set of kept origins — it can never grow it the way a union would.
    assert!(pair_origins.is_subset(&single_origins));
}

/// Property 6 (soundness): the query result is exactly the set of records
/// whose origin and destination both carry every requested attribute.
#[test_log::test]
fn query_soundness_against_brute_force() {
    let config = GeneratorConfig {
        num_origins: 60,
        num_dests: 20,
        origin_attrs: 10,
        dest_attrs: 10,
        seed: 5,
        null_policy: NullPolicy::Uniform(0.4),
    };
    let options = StoreOptions::new()
        .origin_attrs(config.origin_attrs)
        .dest_attrs(config.dest_attrs);

    let dataset = support::generate(&config);
    let input_dir = tempfile::tempdir().unwrap();
    let (origin_path, destination_path, accessibility_path) =
        write_dataset(input_dir.path(), &dataset, "test");
    let store_dir = tempfile::tempdir().unwrap();
    preprocess::run(
        &RowMajorInputs {
            origin_path,
            destination_path,
            accessibility_path,
        },
        store_dir.path(),
        &options,
    )
    .unwrap();

    let origin_attrs = [2u32, 5];
    let dest_attrs = [1u32, 3];

    let row_size = |n_attrs: u32| 4 + n_attrs as usize * 4;
    let has_value = |bytes: &[u8], row_size: usize, row: usize, attr: u32| -> bool {
        let offset = row * row_size + 4 + attr as usize * 4;
        !f32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap()).is_nan()
    };

    let origin_row_size = row_size(config.origin_attrs);
    let dest_row_size = row_size(config.dest_attrs);

    let qualifying_origins: std::collections::HashSet<u32> = (0..config.num_origins)
        .filter(|&o| {
            origin_attrs
                .iter()
                .all(|&a| has_value(&dataset.origin_bytes, origin_row_size, o as usize, a))
        })
        .collect();

    let qualifying_dests: std::collections::HashSet<u32> = (0..config.num_dests)
        .filter(|&d| {
            dest_attrs
                .iter()
                .all(|&a| has_value(&dataset.destination_bytes, dest_row_size, d as usize, a))
        })
        .collect();

    let mut expected = StdHashMap::new();
    for record in dataset.accessibility_bytes.chunks_exact(16) {
        let rec = AccessibilityRecord::from_bytes(record);
        if qualifying_origins.contains(&rec.origin_id) && qualifying_dests.contains(&rec.destination_id) {
            *expected.entry((rec.origin_id, rec.destination_id)).or_insert(0u32) += 1;
        }
    }

    let result_path = store_dir.path().join("result.bin");
    query::run(
        &QueryRequest {
            store_dir: store_dir.path().to_path_buf(),
            origin_attrs: origin_attrs.to_vec(),
            dest_attrs: dest_attrs.to_vec(),
            result_path: result_path.clone(),
        },
        &options,
    )
    .unwrap();

    let actual = as_multiset(&read_records(&result_path));
    assert_eq!(actual, expected);
}

/// Property 7 (idempotence) and property 8 (parallel-invariance): repeated
/// runs, and runs with a different worker count, yield identical multisets.
#[test_log::test]
fn query_is_idempotent_and_parallel_invariant() {
    let config = GeneratorConfig {
        num_origins: 90,
        num_dests: 24,
        origin_attrs: 6,
        dest_attrs: 6,
        seed: 42,
        null_policy: NullPolicy::Uniform(0.5),
    };
    let options = StoreOptions::new()
        .origin_attrs(config.origin_attrs)
        .dest_attrs(config.dest_attrs);

    let store_dir = build_store(&config, &options);

    let run_query = |worker_threads: usize, file_name: &str| -> StdHashMap<(u32, u32), u32> {
        let request = QueryRequest {
            store_dir: store_dir.path().to_path_buf(),
            origin_attrs: vec![1, 3],
            dest_attrs: vec![2],
            result_path: store_dir.path().join(file_name),
        };
        let options = options.worker_threads(worker_threads);
        query::run(&request, &options).unwrap();
        as_multiset(&read_records(&request.result_path))
    };

    let single_threaded = run_query(1, "result_1.bin");
    let repeated = run_query(1, "result_1_again.bin");
    let multi_threaded = run_query(4, "result_4.bin");

    assert_eq!(single_threaded, repeated);
    assert_eq!(single_threaded, multi_threaded);
}

/// S1: a narrow-selectivity column pair (column 1 is ~1% non-null on both
/// sides) keeps only origins/destinations that actually have a value there.
#[test_log::test]
fn narrow_columns_match_their_non_null_sets_exactly() {
    let config = scenario_config();
    let options = StoreOptions::new()
        .origin_attrs(config.origin_attrs)
        .dest_attrs(config.dest_attrs);

    let dataset = support::generate(&config);
    let input_dir = tempfile::tempdir().unwrap();
    let (origin_path, destination_path, accessibility_path) =
        write_dataset(input_dir.path(), &dataset, "test");
    let store_dir = tempfile::tempdir().unwrap();
    preprocess::run(
        &RowMajorInputs {
            origin_path,
            destination_path,
            accessibility_path,
        },
        store_dir.path(),
        &options,
    )
    .unwrap();

    let origin_row_size = 4 + config.origin_attrs as usize * 4;
    let dest_row_size = 4 + config.dest_attrs as usize * 4;

    let has_value = |bytes: &[u8], row_size: usize, row: usize, attr: u32| -> bool {
        let offset = row * row_size + 4 + attr as usize * 4;
        !f32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap()).is_nan()
    };

    let expected_origins: std::collections::HashSet<u32> = (0..config.num_origins)
        .filter(|&o| has_value(&dataset.origin_bytes, origin_row_size, o as usize, 1))
        .collect();
    let expected_dests: std::collections::HashSet<u32> = (0..config.num_dests)
        .filter(|&d| has_value(&dataset.destination_bytes, dest_row_size, d as usize, 1))
        .collect();

    let result_path = store_dir.path().join("result.bin");
    query::run(
        &QueryRequest {
            store_dir: store_dir.path().to_path_buf(),
            origin_attrs: vec![1],
            dest_attrs: vec![1],
            result_path: result_path.clone(),
        },
        &options,
    )
    .unwrap();

    let records = read_records(&result_path);
    assert_eq!(records.len(), expected_origins.len() * expected_dests.len());

    for record in &records {
        assert!(expected_origins.contains(&record.origin_id));
        assert!(expected_dests.contains(&record.destination_id));
    }
}

/// S5: two preprocessor runs over identical input produce byte-identical
/// index files.
#[test_log::test]
fn preprocessing_is_deterministic() {
    let config = GeneratorConfig {
        num_origins: 50,
        num_dests: 15,
        origin_attrs: 6,
        dest_attrs: 6,
        seed: 17,
        null_policy: NullPolicy::Uniform(0.5),
    };
    let options = StoreOptions::new()
        .origin_attrs(config.origin_attrs)
        .dest_attrs(config.dest_attrs);

    let dataset = support::generate(&config);
    let input_dir = tempfile::tempdir().unwrap();
    let (origin_path, destination_path, accessibility_path) =
        write_dataset(input_dir.path(), &dataset, "test");
    let inputs = RowMajorInputs {
        origin_path,
        destination_path,
        accessibility_path,
    };

    let store_a = tempfile::tempdir().unwrap();
    let store_b = tempfile::tempdir().unwrap();
    preprocess::run(&inputs, store_a.path(), &options).unwrap();
    preprocess::run(&inputs, store_b.path(), &options).unwrap();

    let origin_index_a = std::fs::read(store_a.path().join("attributes/origin/index.bin")).unwrap();
    let origin_index_b = std::fs::read(store_b.path().join("attributes/origin/index.bin")).unwrap();
    assert_eq!(origin_index_a, origin_index_b);

    let acc_index_a = std::fs::read(store_a.path().join("accessibility/index.bin")).unwrap();
    let acc_index_b = std::fs::read(store_b.path().join("accessibility/index.bin")).unwrap();
    assert_eq!(acc_index_a, acc_index_b);
}

/// A request with an empty attribute list is rejected rather than treated
/// as a vacuous filter, per the query executor's failure semantics.
#[test_log::test]
fn empty_attribute_list_is_bad_argument() {
    let config = GeneratorConfig::default();
    let options = StoreOptions::new()
        .origin_attrs(config.origin_attrs)
        .dest_attrs(config.dest_attrs);
    let store_dir = build_store(&config, &options);

    let err = query::run(
        &QueryRequest {
            store_dir: store_dir.path().to_path_buf(),
            origin_attrs: vec![],
            dest_attrs: vec![0],
            result_path: store_dir.path().join("result.bin"),
        },
        &options,
    )
    .unwrap_err();

    assert!(matches!(err, accessibility_store::Error::BadArgument(_)));
}

//! End-to-end runs over ensemble and instance files.

use std::io::Write;
use std::path::Path;

use approx::assert_relative_eq;
use rstest::rstest;
use tempfile::NamedTempFile;

use flatforest::config::{BatchSize, EvalConfig, Layout};
use flatforest::eval::run;
use flatforest::testing::{assert_scores_eq, random_features, to_text, RandomEnsemble};
use flatforest::ForestError;

// =============================================================================
// Fixtures
// =============================================================================

const ONE_STUMP: &str = "\
1
1
root 1 0 0.5
leaf 2 1 1 1.0
leaf 3 1 0 2.0
end
";

const TWO_STUMPS: &str = "\
2
1
root 1 0 0.5
leaf 2 1 1 1.0
leaf 3 1 0 2.0
end
1
root 1 0 0.5
leaf 2 1 1 1.0
leaf 3 1 0 2.0
end
";

const THREE_ROWS: &str = "\
3 1
0 qid:1 1:0.1
0 qid:1 1:0.9
0 qid:1 1:0.5
";

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn config(ensemble: &Path, instances: &Path, layout: Layout, batch_size: BatchSize) -> EvalConfig {
    EvalConfig::builder()
        .ensemble(ensemble.to_path_buf())
        .instances(instances.to_path_buf())
        .max_leaves(4)
        .layout(layout)
        .batch_size(batch_size)
        .build()
        .unwrap()
}

fn run_text(ensemble: &str, instances: &str, layout: Layout) -> Result<Vec<f32>, ForestError> {
    let ensemble = write_temp(ensemble);
    let instances = write_temp(instances);
    run(&config(ensemble.path(), instances.path(), layout, BatchSize::B4)).map(|r| r.scores)
}

// =============================================================================
// Scenarios
// =============================================================================

#[rstest]
#[case::linked(Layout::Linked, BatchSize::B8)]
#[case::compact(Layout::Compact, BatchSize::B8)]
#[case::flat_v1(Layout::Flat, BatchSize::B1)]
#[case::flat_v4(Layout::Flat, BatchSize::B4)]
#[case::flat_v32(Layout::Flat, BatchSize::B32)]
fn single_stump(#[case] layout: Layout, #[case] batch_size: BatchSize) {
    let ensemble = write_temp(ONE_STUMP);
    let instances = write_temp(THREE_ROWS);

    let report = run(&config(ensemble.path(), instances.path(), layout, batch_size)).unwrap();

    assert_eq!(report.scores, vec![1.0, 2.0, 1.0]);
    assert_eq!(report.n_instances, 3);
    assert_eq!(report.layout, layout);
    assert_eq!(report.ensemble.n_trees, 1);
    assert_relative_eq!(report.checksum, 4.0);
}

#[rstest]
#[case::linked(Layout::Linked)]
#[case::compact(Layout::Compact)]
#[case::flat(Layout::Flat)]
fn two_stumps_sum(#[case] layout: Layout) {
    let scores = run_text(TWO_STUMPS, THREE_ROWS, layout).unwrap();
    assert_eq!(scores, vec![2.0, 4.0, 2.0]);
}

#[rstest]
#[case::linked(Layout::Linked)]
#[case::compact(Layout::Compact)]
#[case::flat(Layout::Flat)]
fn random_ensemble_file_agrees_with_in_memory(#[case] layout: Layout) {
    let records = RandomEnsemble::new(20, 6).max_depth(6).generate(2024);
    let features = random_features(37, 6, 99);

    let mut svm = format!("{} {}\n", features.num_rows(), features.num_features());
    for row in features.rows() {
        svm.push('0');
        for (idx, value) in row.iter().enumerate() {
            svm.push_str(&format!(" {}:{}", idx + 1, value));
        }
        svm.push('\n');
    }

    let ensemble = write_temp(&to_text(&records));
    let instances = write_temp(&svm);
    let config = EvalConfig::builder()
        .ensemble(ensemble.path().to_path_buf())
        .instances(instances.path().to_path_buf())
        .max_leaves(RandomEnsemble::max_leaves_for(6))
        .layout(layout)
        .build()
        .unwrap();
    let report = run(&config).unwrap();

    let linked = flatforest::builder::build_ensemble(&records, RandomEnsemble::max_leaves_for(6)).unwrap();
    let expected: Vec<f32> = features.rows().map(|row| linked.predict_row(row)).collect();
    assert_scores_eq(&report.scores, &expected, "file vs memory");
}

// =============================================================================
// Failures
// =============================================================================

#[rstest]
#[case::missing_end("1\n1\nroot 1 0 0.5\nleaf 2 1 1 1.0\nleaf 3 1 0 2.0\n")]
#[case::unknown_parent("1\n1\nroot 1 0 0.5\nleaf 2 7 1 1.0\nleaf 3 1 0 2.0\nend\n")]
#[case::too_few_trees("2\n1\nroot 1 0 0.5\nleaf 2 1 1 1.0\nleaf 3 1 0 2.0\nend\n")]
#[case::too_many_trees("1\n1\nroot 1 0 0.5\nleaf 2 1 1 1.0\nleaf 3 1 0 2.0\nend\n1\nroot 1 0 0.5\nend\n")]
#[case::single_child("1\n1\nroot 1 0 0.5\nleaf 2 1 1 1.0\nend\n")]
fn malformed_ensembles(#[case] ensemble: &str) {
    let err = run_text(ensemble, THREE_ROWS, Layout::Flat).unwrap_err();
    assert!(matches!(err, ForestError::MalformedEnsemble { .. }), "{err}");
}

#[test]
fn capacity_exceeded() {
    // max_leaves = 4 allows 8 nodes; a depth-3 full tree has 15.
    let mut text = String::from("1\n3\nroot 0 0 0.0\n");
    for id in 1..15u32 {
        let parent = (id - 1) / 2;
        let is_left = u8::from(id % 2 == 1);
        if id < 7 {
            text.push_str(&format!("node {id} {parent} {is_left} 0 0.0\n"));
        } else {
            text.push_str(&format!("leaf {id} {parent} {is_left} 1.0\n"));
        }
    }
    text.push_str("end\n");

    let err = run_text(&text, THREE_ROWS, Layout::Linked).unwrap_err();
    assert!(matches!(err, ForestError::CapacityExceeded { tree: 0, capacity: 8 }));
}

#[rstest]
#[case::too_narrow("3 1\n0 1:0.1\n0 1:0.2\n0 1:0.3\n", "1\n1\nroot 1 1 0.5\nleaf 2 1 1 1.0\nleaf 3 1 0 2.0\nend\n")]
#[case::index_out_of_range("1 1\n0 2:0.1\n", ONE_STUMP)]
#[case::row_count("4 1\n0 1:0.1\n", ONE_STUMP)]
fn malformed_features(#[case] instances: &str, #[case] ensemble: &str) {
    for layout in [Layout::Linked, Layout::Compact, Layout::Flat] {
        let err = run_text(ensemble, instances, layout).unwrap_err();
        assert!(matches!(err, ForestError::MalformedFeatures(_)), "{layout}: {err}");
    }
}

#[test]
fn missing_file_is_io_error() {
    let instances = write_temp(THREE_ROWS);
    let config = config(Path::new("/no/such/ensemble.txt"), instances.path(), Layout::Flat, BatchSize::B8);
    assert!(matches!(run(&config), Err(ForestError::Io(_))));
}

#[test]
fn report_serializes_without_scores() {
    let ensemble = write_temp(TWO_STUMPS);
    let instances = write_temp(THREE_ROWS);
    let report = run(&config(ensemble.path(), instances.path(), Layout::Flat, BatchSize::B16)).unwrap();

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["layout"], "flat");
    assert_eq!(json["batch_size"], 16);
    assert_eq!(json["n_instances"], 3);
    assert_eq!(json["ensemble"]["n_trees"], 2);
    assert_eq!(json["ensemble"]["n_leaves"], 4);
    assert!(json.get("scores").is_none());
}

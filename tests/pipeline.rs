//! End-to-end run of the three stages over a scratch annotation directory

use std::path::Path;

use vaguestat::{
    execute_stage1, execute_stage2, normalize, read_merged_table, NormalizeConfig, PipelineError,
    RunDate, Stage1Config, Stage2Config,
};

fn write_annotations(dir: &Path) {
    std::fs::write(
        dir.join("batch_01.tsv"),
        "Many Tall People\tclass\tperson\tundetermined\tadjective\tdegree subjective\n\
         xxx reviewed up to here\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("batch_02.tsv"),
        "The Eiffel Tower\tinstance\tplace\tcontains_named determined\t\tnot_vague xxx landmark\n\
         \n\
         XXX second pass pending\n",
    )
    .unwrap();
}

#[test]
fn test_full_pipeline() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_annotations(input.path());

    let date = RunDate::parse("20240215").unwrap();
    let dataset_path = date.dataset_path(output.path());

    let normalized = normalize(input.path(), &dataset_path, &NormalizeConfig::default()).unwrap();
    assert_eq!(normalized.records.len(), 2);

    let content = std::fs::read_to_string(&dataset_path).unwrap();
    let rows: Vec<&str> = content.lines().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.split('\t').count() == 18));
    assert!(rows[1].starts_with("many tall people\tclass\tperson"));

    let dataset = read_merged_table(&dataset_path).unwrap();
    assert_eq!(dataset.records, normalized.records);

    let stats = execute_stage1(
        &dataset_path,
        &date,
        &Stage1Config {
            output_dir: output.path().to_path_buf(),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(stats.summary.total, 2);
    assert_eq!(stats.summary.vague.count, 1);
    assert_eq!(stats.summary.vague.percent, 50.0);
    assert_eq!(stats.summary.multi_vague.count, 1);

    let class_report = std::fs::read_to_string(
        output
            .path()
            .join("20240215 percentage of all noun phrases with XXX class.tsv"),
    )
    .unwrap();
    assert_eq!(class_report.lines().count(), 11);

    let correlations = execute_stage2(
        &dataset_path,
        &date,
        &Stage2Config {
            output_dir: output.path().to_path_buf(),
            render_heatmap: false,
        },
    )
    .unwrap();
    let n = correlations.matrix.labels.len();
    assert_eq!(correlations.ranking.len(), n * n);
    assert!(correlations.interesting.iter().all(|p| {
        (p.d1.contains("vagueness") || p.d2.contains("vagueness")) && p.d1[..3] != p.d2[..3]
    }));
    assert!(output.path().join("20240215_interesting_correlations.csv").exists());
    assert!(!output.path().join("20240215_correlation_heatmap.svg").exists());
}

#[test]
fn test_malformed_line_aborts_the_run() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    std::fs::write(
        input.path().join("broken.tsv"),
        "fine\tclass\tperson\t\tnoun\tportions\nmissing cells\tclass\n",
    )
    .unwrap();

    let dataset_path = output.path().join("dataset.tsv");
    let err = normalize(input.path(), &dataset_path, &NormalizeConfig::default()).unwrap_err();

    match err.downcast_ref::<PipelineError>() {
        Some(PipelineError::MalformedRecord {
            path,
            line_number,
            line,
            ..
        }) => {
            assert!(path.ends_with("broken.tsv"));
            assert_eq!(*line_number, 2);
            assert_eq!(line, "missing cells\tclass");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!dataset_path.exists());
}

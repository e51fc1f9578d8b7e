use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use plotters::prelude::*;
use tracing::{debug, info};

use crate::io::{read_merged_table, write_csv};
use crate::models::{CategoryFlag, Dataset, Manifestation, Modifier, RunDate, Vagueness};

/// Label substring a pair needs to be reported as interesting
const VAGUENESS_MARKER: &str = "vagueness";
/// Labels sharing this many leading characters are one-hot siblings
const SIBLING_PREFIX_LEN: usize = 3;

/// Configuration for Stage 2 correlation analysis
#[derive(Debug, Clone)]
pub struct Stage2Config {
    /// Directory receiving the CSV reports and the heatmap
    pub output_dir: PathBuf,
    /// Whether to render the heatmap
    pub render_heatmap: bool,
}

impl Default for Stage2Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            render_heatmap: true,
        }
    }
}

/// Numeric view of the dataset: flag columns plus one-hot categorical columns
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    pub labels: Vec<String>,
    /// One vector per label, one entry per record
    pub columns: Vec<Vec<f64>>,
}

/// One-hot encode the dataset, leaving out the expression text
///
/// Flag columns come first in table order, then `plurality_<value>` and
/// `semantic_class_<value>` with values sorted.
pub fn build_feature_matrix(dataset: &Dataset) -> FeatureMatrix {
    let mut labels: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();

    let mut push = |label: String, value: &dyn Fn(usize) -> bool| {
        labels.push(label);
        columns.push(
            (0..dataset.len())
                .map(|i| if value(i) { 1.0 } else { 0.0 })
                .collect(),
        );
    };

    let records = &dataset.records;
    for &flag in Manifestation::ALL {
        push(flag.column().to_string(), &|i: usize| records[i].has_manifestation(flag));
    }
    for &flag in Modifier::ALL {
        push(flag.column().to_string(), &|i: usize| records[i].has_modifier(flag));
    }
    for &flag in Vagueness::ALL {
        push(flag.column().to_string(), &|i: usize| records[i].has_vagueness(flag));
    }
    for value in dataset.plurality_values() {
        push(format!("plurality_{}", value), &|i: usize| {
            records[i].plurality.as_str() == value
        });
    }
    for value in dataset.semantic_class_values() {
        push(format!("semantic_class_{}", value), &|i: usize| {
            records[i].semantic_class == value
        });
    }

    FeatureMatrix { labels, columns }
}

/// Pearson correlation; `NaN` when either column has no variance
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return f64::NAN;
    }

    let mean_x = x[..n].iter().sum::<f64>() / n as f64;
    let mean_y = y[..n].iter().sum::<f64>() / n as f64;

    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_yy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sum_xy += dx * dy;
        sum_xx += dx * dx;
        sum_yy += dy * dy;
    }

    let divisor = (sum_xx * sum_yy).sqrt();
    if divisor == 0.0 {
        return f64::NAN;
    }
    (sum_xy / divisor).clamp(-1.0, 1.0)
}

/// Signed pairwise correlation matrix
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// `values[row][col]`, symmetric
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn from_features(features: &FeatureMatrix) -> Self {
        let n = features.labels.len();
        let mut values = vec![vec![f64::NAN; n]; n];

        for i in 0..n {
            for j in i..n {
                let value = pearson(&features.columns[i], &features.columns[j]);
                // Exact unit diagonal for non-constant columns
                let value = if i == j && !value.is_nan() { 1.0 } else { value };
                values[i][j] = value;
                values[j][i] = value;
            }
        }

        Self {
            labels: features.labels.clone(),
            values,
        }
    }

    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let row = self.labels.iter().position(|l| l == row)?;
        let col = self.labels.iter().position(|l| l == col)?;
        Some(self.values[row][col])
    }
}

/// Absolute correlation between two labelled columns
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationPair {
    pub d1: String,
    pub d2: String,
    pub value: f64,
}

impl CorrelationPair {
    /// Printed value: shortest round-trip form, empty for `NaN`
    pub fn value_repr(&self) -> String {
        if self.value.is_nan() {
            String::new()
        } else {
            format!("{:?}", self.value)
        }
    }

    fn to_row(&self) -> [String; 3] {
        [self.d1.clone(), self.d2.clone(), self.value_repr()]
    }
}

/// Every ordered pair with its absolute correlation, highest first
///
/// Pairs are enumerated column by column; the sort is stable and puts
/// `NaN` last.
pub fn rank_pairs(matrix: &CorrelationMatrix) -> Vec<CorrelationPair> {
    let n = matrix.labels.len();
    let mut pairs = Vec::with_capacity(n * n);
    for col in 0..n {
        for row in 0..n {
            pairs.push(CorrelationPair {
                d1: matrix.labels[col].clone(),
                d2: matrix.labels[row].clone(),
                value: matrix.values[row][col].abs(),
            });
        }
    }

    pairs.sort_by(|a, b| {
        a.value
            .is_nan()
            .cmp(&b.value.is_nan())
            .then_with(|| b.value.total_cmp(&a.value))
    });
    pairs
}

fn label_prefix(label: &str) -> String {
    label.chars().take(SIBLING_PREFIX_LEN).collect()
}

/// Keep the pairs worth reading, in ranking order
///
/// A pair is kept when one label mentions vagueness, its value does not
/// print as `1.0`, the labels do not share their three-character prefix,
/// and the unordered pair has not been kept already.
pub fn interesting_pairs(ranking: &[CorrelationPair]) -> Vec<CorrelationPair> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut kept = Vec::new();

    for pair in ranking {
        if pair.value.is_nan() {
            continue;
        }
        if !pair.d1.contains(VAGUENESS_MARKER) && !pair.d2.contains(VAGUENESS_MARKER) {
            continue;
        }
        if pair.value_repr() == "1.0" {
            continue;
        }
        if label_prefix(&pair.d1) == label_prefix(&pair.d2) {
            continue;
        }

        let key = if pair.d1 <= pair.d2 {
            (pair.d1.clone(), pair.d2.clone())
        } else {
            (pair.d2.clone(), pair.d1.clone())
        };
        if !seen.insert(key) {
            continue;
        }

        kept.push(pair.clone());
    }

    kept
}

/// Diverging blue-white-red scale over [-1, 1], grey for `NaN`
fn heat_color(value: f64) -> RGBColor {
    const NEGATIVE: (u8, u8, u8) = (59, 76, 192);
    const POSITIVE: (u8, u8, u8) = (180, 4, 38);

    if value.is_nan() {
        return RGBColor(200, 200, 200);
    }

    let lerp = |from: u8, to: u8, t: f64| (from as f64 + (to as f64 - from as f64) * t).round() as u8;
    let value = value.clamp(-1.0, 1.0);
    let (end, t) = if value < 0.0 { (NEGATIVE, -value) } else { (POSITIVE, value) };
    RGBColor(lerp(255, end.0, t), lerp(255, end.1, t), lerp(255, end.2, t))
}

fn axis_label(labels: &[String], value: &SegmentValue<usize>) -> String {
    match value {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
            labels.get(*i).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    }
}

/// Render the signed correlation matrix as an SVG heatmap
pub fn render_heatmap(path: &Path, matrix: &CorrelationMatrix) -> Result<()> {
    let n = matrix.labels.len();
    let side = 260 + 24 * n as u32;

    let root = SVGBackend::new(path, (side, side)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation matrix", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(220)
        .y_label_area_size(220)
        .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n + 1)
        .y_labels(n + 1)
        .x_label_formatter(&|v| axis_label(&matrix.labels, v))
        .y_label_formatter(&|v| axis_label(&matrix.labels, v))
        .x_label_style(
            ("sans-serif", 11)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_label_style(("sans-serif", 11))
        .draw()?;

    chart.draw_series(
        (0..n)
            .flat_map(|row| (0..n).map(move |col| (row, col)))
            .map(|(row, col)| {
                Rectangle::new(
                    [
                        (SegmentValue::Exact(col), SegmentValue::Exact(row)),
                        (SegmentValue::Exact(col + 1), SegmentValue::Exact(row + 1)),
                    ],
                    heat_color(matrix.values[row][col]).filled(),
                )
            }),
    )?;

    root.present()?;
    Ok(())
}

/// Result of Stage 2 correlation analysis
#[derive(Debug)]
pub struct Stage2Result {
    pub matrix: CorrelationMatrix,
    pub ranking: Vec<CorrelationPair>,
    pub interesting: Vec<CorrelationPair>,
    /// Every file written, in writing order
    pub reports: Vec<PathBuf>,
}

/// Execute Stage 2: correlations between annotation dimensions
pub fn execute_stage2(dataset_path: &Path, date: &RunDate, config: &Stage2Config) -> Result<Stage2Result> {
    info!("Computing correlations from {:?}", dataset_path);
    let dataset = read_merged_table(dataset_path)?;
    report_correlations(&dataset, date, config)
}

/// Compute, rank and filter correlations for a loaded dataset and write the reports
pub fn report_correlations(dataset: &Dataset, date: &RunDate, config: &Stage2Config) -> Result<Stage2Result> {
    let features = build_feature_matrix(dataset);
    debug!("Feature matrix: {} columns x {} rows", features.labels.len(), dataset.len());

    let matrix = CorrelationMatrix::from_features(&features);
    let ranking = rank_pairs(&matrix);
    let interesting = interesting_pairs(&ranking);
    info!(
        "{} correlation pairs, {} interesting",
        ranking.len(),
        interesting.len()
    );

    let header = ["d1", "d2", "value"];
    let mut reports = Vec::new();

    let all_path = config
        .output_dir
        .join(format!("{}_all_correlation.csv", date.stamp()));
    let rows: Vec<[String; 3]> = ranking.iter().map(CorrelationPair::to_row).collect();
    write_csv(&all_path, &header, &rows)?;
    reports.push(all_path);

    let interesting_path = config
        .output_dir
        .join(format!("{}_interesting_correlations.csv", date.stamp()));
    let rows: Vec<[String; 3]> = interesting.iter().map(CorrelationPair::to_row).collect();
    write_csv(&interesting_path, &header, &rows)?;
    reports.push(interesting_path);

    if config.render_heatmap {
        let heatmap_path = config
            .output_dir
            .join(format!("{}_correlation_heatmap.svg", date.stamp()));
        render_heatmap(&heatmap_path, &matrix)?;
        info!("Heatmap written to {:?}", heatmap_path);
        reports.push(heatmap_path);
    }

    Ok(Stage2Result {
        matrix,
        ranking,
        interesting,
        reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnnotationRecord;

    fn pair(d1: &str, d2: &str, value: f64) -> CorrelationPair {
        CorrelationPair {
            d1: d1.to_string(),
            d2: d2.to_string(),
            value,
        }
    }

    fn sample() -> Dataset {
        Dataset::new(vec![
            AnnotationRecord::from_cells("tall men", "class", "person", "undetermined", "adjective", "degree"),
            AnnotationRecord::from_cells("paris", "instance", "place", "named", "", "not_vague"),
            AnnotationRecord::from_cells("most books", "class", "creativework", "undetermined", "", "portions"),
            AnnotationRecord::from_cells("the city", "instance", "place", "determined", "", "not_vague"),
        ])
    }

    #[test]
    fn test_pearson() {
        assert!((pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]) - 1.0).abs() < 1e-12);
        assert!((pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
        assert!(pearson(&[], &[]).is_nan());
    }

    #[test]
    fn test_feature_matrix_columns() {
        let features = build_feature_matrix(&sample());
        assert_eq!(features.labels[0], "manifestation_named");
        assert_eq!(features.labels[14], "vagueness_not_vague");
        assert_eq!(features.labels[15], "plurality_class");
        assert_eq!(features.labels[16], "plurality_instance");
        assert_eq!(
            &features.labels[17..],
            &["semantic_class_creativework", "semantic_class_person", "semantic_class_place"]
        );
        assert!(!features.labels.iter().any(|l| l == "expression"));
        assert_eq!(features.columns[15], vec![1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_matrix_diagonal_and_constant_columns() {
        let matrix = CorrelationMatrix::from_features(&build_feature_matrix(&sample()));
        assert_eq!(matrix.get("vagueness_not_vague", "vagueness_not_vague"), Some(1.0));
        // No record is numbered: constant column
        assert!(matrix
            .get("manifestation_numbered", "vagueness_degree")
            .unwrap()
            .is_nan());
        // not_vague and instance coincide exactly
        let value = matrix.get("vagueness_not_vague", "plurality_instance").unwrap();
        assert!((value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rank_pairs_orders_descending_nan_last() {
        let matrix = CorrelationMatrix::from_features(&build_feature_matrix(&sample()));
        let ranking = rank_pairs(&matrix);
        let n = matrix.labels.len();
        assert_eq!(ranking.len(), n * n);

        let finite: Vec<f64> = ranking
            .iter()
            .map(|p| p.value)
            .take_while(|v| !v.is_nan())
            .collect();
        assert!(finite.windows(2).all(|w| w[0] >= w[1]));
        assert!(ranking[finite.len()..].iter().all(|p| p.value.is_nan()));
    }

    #[test]
    fn test_interesting_filter_rules() {
        let ranking = vec![
            pair("vagueness_degree", "vagueness_degree", 1.0),
            pair("vagueness_degree", "vagueness_portions", 0.9),
            pair("modifiers_adjective", "vagueness_degree", 0.8),
            pair("vagueness_degree", "modifiers_adjective", 0.8),
            pair("modifiers_adjective", "manifestation_named", 0.7),
            pair("plurality_class", "vagueness_portions", 0.5),
            pair("semantic_class_place", "vagueness_not_vague", f64::NAN),
        ];

        let kept = interesting_pairs(&ranking);
        assert_eq!(
            kept,
            vec![
                pair("modifiers_adjective", "vagueness_degree", 0.8),
                pair("plurality_class", "vagueness_portions", 0.5),
            ]
        );
    }

    #[test]
    fn test_interesting_excludes_values_printed_as_one() {
        let ranking = vec![pair("plurality_instance", "vagueness_not_vague", 1.0)];
        assert!(interesting_pairs(&ranking).is_empty());

        let ranking = vec![pair("plurality_instance", "vagueness_not_vague", 0.9999999999999998)];
        assert_eq!(interesting_pairs(&ranking).len(), 1);
    }

    #[test]
    fn test_heat_color() {
        assert_eq!(heat_color(0.0), RGBColor(255, 255, 255));
        assert_eq!(heat_color(1.0), RGBColor(180, 4, 38));
        assert_eq!(heat_color(-1.0), RGBColor(59, 76, 192));
        assert_eq!(heat_color(f64::NAN), RGBColor(200, 200, 200));
    }

    #[test]
    fn test_report_correlations_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = Stage2Config {
            output_dir: dir.path().to_path_buf(),
            render_heatmap: true,
        };
        let date = RunDate::parse("20240101").unwrap();

        let result = report_correlations(&sample(), &date, &config).unwrap();
        assert_eq!(result.reports.len(), 3);
        assert!(result.reports.iter().all(|p| p.exists()));

        let all = std::fs::read_to_string(dir.path().join("20240101_all_correlation.csv")).unwrap();
        assert_eq!(all.lines().next(), Some("d1,d2,value"));
        assert_eq!(all.lines().count(), result.ranking.len() + 1);

        let svg = std::fs::read_to_string(dir.path().join("20240101_correlation_heatmap.svg")).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("vagueness_degree"));
    }
}

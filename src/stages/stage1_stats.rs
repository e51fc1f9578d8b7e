use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::io::{read_merged_table, report_path, write_json, write_lines};
use crate::models::{Criterion, Dataset, RunDate, SemanticClass, Vagueness};

/// Percentage of `count` in `total`, rounded up to two decimals
///
/// Always rounds towards the higher percentage. An empty denominator yields 0.
pub fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 10000.0).ceil() / 100.0
}

/// Shortest round-trip form, keeping `.0` on integral values (`100.0`, `33.34`)
pub fn format_percent(value: f64) -> String {
    format!("{:?}", value)
}

/// Configuration for Stage 1 statistics
#[derive(Debug, Clone)]
pub struct Stage1Config {
    /// Directory receiving the report files
    pub output_dir: PathBuf,
    /// Also write the summary as JSON
    pub write_json_summary: bool,
}

impl Default for Stage1Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            write_json_summary: true,
        }
    }
}

/// A count with its share of some denominator
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CountShare {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

impl CountShare {
    fn new(label: &str, count: usize, total: usize) -> Self {
        Self {
            label: label.to_string(),
            count,
            percent: percent(count, total),
        }
    }
}

/// Vague share of every noun phrase carrying a feature
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeatureVagueness {
    pub feature: String,
    pub total: usize,
    pub vague: CountShare,
}

/// Top-level figures over the whole table
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatsSummary {
    pub total: usize,
    pub vague: CountShare,
    pub multi_vague: CountShare,
    /// Multi-vague noun phrases among the vague ones
    pub multi_vague_among_vague: f64,
    pub dimensions: Vec<CountShare>,
    pub pluralities: Vec<CountShare>,
    pub features: Vec<FeatureVagueness>,
}

/// Compute the top-level summary
pub fn summarize(dataset: &Dataset) -> StatsSummary {
    let total = dataset.len();
    let vague = dataset.count_where(|r| r.is_vague());
    let multi_vague = dataset.count_where(|r| r.is_multi_vague());

    let dimensions = Criterion::vague_types()
        .iter()
        .map(|c| CountShare::new(c.label(), dataset.count(c), total))
        .collect();

    let pluralities = Criterion::pluralities()
        .iter()
        .map(|c| CountShare::new(c.label(), dataset.count(c), total))
        .collect();

    let features = Criterion::features()
        .iter()
        .map(|c| {
            let feature_total = dataset.count(c);
            let feature_vague = dataset.select(c).filter(|r| r.is_vague()).count();
            FeatureVagueness {
                feature: c.label().to_string(),
                total: feature_total,
                vague: CountShare::new("vague", feature_vague, feature_total),
            }
        })
        .collect();

    StatsSummary {
        total,
        vague: CountShare::new("vague", vague, total),
        multi_vague: CountShare::new("multiple vague", multi_vague, total),
        multi_vague_among_vague: percent(multi_vague, vague),
        dimensions,
        pluralities,
        features,
    }
}

impl StatsSummary {
    /// Console rendering of the summary
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("# of NPs: {}", self.total),
            format!(
                "# of vague NPs: {} ({}%)",
                self.vague.count,
                format_percent(self.vague.percent)
            ),
            format!(
                "# of multiple vague NPs: {} (with all NP: {}%, among vague NPs: {}%)",
                self.multi_vague.count,
                format_percent(self.multi_vague.percent),
                format_percent(self.multi_vague_among_vague)
            ),
        ];

        for share in self.dimensions.iter().chain(&self.pluralities) {
            lines.push(format!(
                "# of {} NPs: {} ({}%)",
                share.label,
                share.count,
                format_percent(share.percent)
            ));
        }

        for feature in &self.features {
            lines.push(format!(
                "total # of {}:\t{}\t# of vague:\t{}\t{}%",
                feature.feature,
                feature.total,
                feature.vague.count,
                format_percent(feature.vague.percent)
            ));
        }

        lines
    }
}

/// Share of one member inside one group
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownRow {
    pub group: String,
    pub group_total: usize,
    pub member: String,
    pub count: usize,
    pub percent: f64,
}

impl BreakdownRow {
    pub fn to_line(&self) -> String {
        format!(
            "total # of {}:\t{}\t# of {}:\t{}\t{}%",
            self.group,
            self.group_total,
            self.member,
            self.count,
            format_percent(self.percent)
        )
    }
}

/// For each group, how many of its records also match each member
///
/// Percentages are relative to the group size.
pub fn breakdown(dataset: &Dataset, groups: &[Criterion], members: &[Criterion]) -> Vec<BreakdownRow> {
    let mut rows = Vec::with_capacity(groups.len() * members.len());
    for group in groups {
        let group_total = dataset.count(group);
        for member in members {
            let count = dataset.count_both(group, member);
            rows.push(BreakdownRow {
                group: group.label().to_string(),
                group_total,
                member: member.label().to_string(),
                count,
                percent: percent(count, group_total),
            });
        }
    }
    rows
}

/// Per-class totals with vague sub-counts
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSummaryRow {
    pub class: String,
    pub total: usize,
    pub vague: usize,
    pub degree: usize,
    pub portions: usize,
    pub subjective: usize,
}

impl ClassSummaryRow {
    /// LaTeX table row
    pub fn to_latex(&self) -> String {
        let share = |count| format_percent(percent(count, self.total));
        format!(
            "{} & {} & {} & {}\\% & {} & {}\\% & {} & {}\\% & {} & {}\\% \\\\",
            self.class,
            self.total,
            self.vague,
            share(self.vague),
            self.degree,
            share(self.degree),
            self.portions,
            share(self.portions),
            self.subjective,
            share(self.subjective)
        )
    }
}

/// One row per semantic class, largest classes first
pub fn class_summary(dataset: &Dataset) -> Vec<ClassSummaryRow> {
    let mut rows: Vec<ClassSummaryRow> = SemanticClass::ALL
        .iter()
        .map(|&class| {
            let criterion = Criterion::Class(class);
            let count_dim = |v: Vagueness| dataset.select(&criterion).filter(|r| r.has_vagueness(v)).count();
            ClassSummaryRow {
                class: class.label().to_string(),
                total: dataset.count(&criterion),
                vague: dataset.select(&criterion).filter(|r| r.is_vague()).count(),
                degree: count_dim(Vagueness::Degree),
                portions: count_dim(Vagueness::Portions),
                subjective: count_dim(Vagueness::Subjective),
            }
        })
        .collect();

    // Stable: ties keep vocabulary order
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}

const VAGUE_BY_FEATURE: &str =
    "percentage of all XXX vague noun phrases having a YYY modifier or manifestation";
const FEATURE_BY_VAGUE: &str =
    "percentage of all noun phrases with XXX modifier or manifestation being YYY vague";
const VAGUE_BY_CLASS: &str = "percentage of all XXX vague noun phrases having a YYY class";
const CLASS_BY_VAGUE: &str = "percentage of all noun phrases with XXX class being YYY vague";
const CLASS_SUMMARY: &str = "percentage of all noun phrases with XXX class";
const VAGUE_BY_PLURALITY: &str = "percentage of all XXX vague noun phrases having a YYY plurality";
const PLURALITY_BY_VAGUE: &str =
    "percentage of all noun phrases with XXX plurality being YYY vague";

/// Result of Stage 1 statistics
#[derive(Debug)]
pub struct Stage1Result {
    pub summary: StatsSummary,
    /// Every file written, in writing order
    pub reports: Vec<PathBuf>,
}

/// Execute Stage 1: descriptive statistics over the merged table
pub fn execute_stage1(dataset_path: &Path, date: &RunDate, config: &Stage1Config) -> Result<Stage1Result> {
    info!("Computing statistics from {:?}", dataset_path);
    let dataset = read_merged_table(dataset_path)?;
    report_stats(&dataset, date, config)
}

/// Print the summary and write every breakdown report for a loaded dataset
pub fn report_stats(dataset: &Dataset, date: &RunDate, config: &Stage1Config) -> Result<Stage1Result> {
    let summary = summarize(dataset);
    for line in summary.lines() {
        println!("{}", line);
    }

    let vague_types = Criterion::vague_types();
    let features = Criterion::features();
    let classes = Criterion::classes();
    let pluralities = Criterion::pluralities();

    let breakdowns = [
        (VAGUE_BY_FEATURE, breakdown(dataset, &vague_types, &features)),
        (FEATURE_BY_VAGUE, breakdown(dataset, &features, &vague_types)),
        (VAGUE_BY_CLASS, breakdown(dataset, &vague_types, &classes)),
        (CLASS_BY_VAGUE, breakdown(dataset, &classes, &vague_types)),
        (VAGUE_BY_PLURALITY, breakdown(dataset, &vague_types, &pluralities)),
        (PLURALITY_BY_VAGUE, breakdown(dataset, &pluralities, &vague_types)),
    ];

    let mut reports = Vec::new();
    for (description, rows) in &breakdowns {
        let path = report_path(&config.output_dir, date, description, "tsv");
        let lines: Vec<String> = rows.iter().map(BreakdownRow::to_line).collect();
        write_lines(&path, &lines)?;
        reports.push(path);
    }

    let path = report_path(&config.output_dir, date, CLASS_SUMMARY, "tsv");
    let lines: Vec<String> = class_summary(dataset).iter().map(ClassSummaryRow::to_latex).collect();
    write_lines(&path, &lines)?;
    reports.push(path);

    if config.write_json_summary {
        let path = config.output_dir.join(format!("{}_summary.json", date.stamp()));
        write_json(&path, &summary)?;
        reports.push(path);
    }

    info!("Wrote {} statistics reports to {:?}", reports.len(), config.output_dir);

    Ok(Stage1Result { summary, reports })
}

use anyhow::Result;
use colored::Colorize;
use synthsync_core::SyncReport;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_report(report: &SyncReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Table => {
            print_as_table(report);
            print_summary(report);
        }
    }
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

fn print_as_table(report: &SyncReport) {
    if report.entries.is_empty() {
        println!("No monitors to sync.");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(["Set", "Monitor", "File", "Outcome", "Detail"]);
    for entry in &report.entries {
        builder.push_record([
            entry.set.as_str().to_string(),
            entry.name.clone(),
            entry.file.clone(),
            entry.outcome.label().to_string(),
            entry.outcome.detail(),
        ]);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
}

fn summary_line(report: &SyncReport) -> String {
    ["updated", "created", "deleted", "planned", "skipped", "failed"]
        .iter()
        .map(|label| (label, report.count(label)))
        .filter(|(_, n)| *n > 0)
        .map(|(label, n)| format!("{n} {label}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_summary(report: &SyncReport) {
    if report.entries.is_empty() {
        return;
    }
    let line = summary_line(report);
    if report.has_failures() {
        print_error(&line);
    } else {
        print_success(&line);
    }
}

#[cfg(test)]
mod tests {
    use synthsync_core::manifest::ChangeSet;
    use synthsync_core::reconcile::{ReportEntry, SkipReason};
    use synthsync_core::Outcome;

    use super::*;

    fn entry(name: &str, outcome: Outcome) -> ReportEntry {
        ReportEntry {
            set: ChangeSet::Changed,
            name: name.to_string(),
            file: format!("synthetics/{name}.js"),
            outcome,
        }
    }

    #[test]
    fn summary_counts_only_present_outcomes() {
        let report = SyncReport {
            entries: vec![
                entry("a", Outcome::Deleted { guid: "g1".into() }),
                entry("b", Outcome::Deleted { guid: "g2".into() }),
                entry(
                    "c",
                    Outcome::Skipped {
                        reason: SkipReason::UndeclaredType,
                    },
                ),
            ],
        };
        assert_eq!(summary_line(&report), "2 deleted, 1 skipped");
    }
}

//! Artifact materialization for external viewing. Export never mutates or
//! re-aggregates the data; column order is the artifact's metric keys in
//! their canonical order.

use newsreport_core::types::{Metric, ReportArtifact};
use newsreport_core::ReportResult;

/// Render an artifact as CSV: a header row, one line per campaign row in
/// stored order, and a final `Total` line. CTR is written with four decimal
/// places, counts as integers.
pub fn export_csv(artifact: &ReportArtifact) -> Vec<u8> {
    let columns: Vec<Metric> = artifact.metrics.totals.keys().copied().collect();

    let mut csv = String::from("Date");
    for metric in &columns {
        csv.push(',');
        csv.push_str(metric.column_label());
    }
    csv.push('\n');

    for row in &artifact.metrics.rows {
        csv.push_str(&row.send_date.to_string());
        for metric in &columns {
            csv.push(',');
            let value = row.metrics.get(metric).copied().unwrap_or(0.0);
            csv.push_str(&format_value(*metric, value));
        }
        csv.push('\n');
    }

    csv.push_str("Total");
    for metric in &columns {
        csv.push(',');
        let value = artifact.metrics.totals.get(metric).copied().unwrap_or(0.0);
        csv.push_str(&format_value(*metric, value));
    }
    csv.push('\n');

    csv.into_bytes()
}

/// Render an artifact as pretty-printed JSON.
pub fn export_json(artifact: &ReportArtifact) -> ReportResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(artifact)?)
}

fn format_value(metric: Metric, value: f64) -> String {
    match metric {
        Metric::Ctr => format!("{:.4}", value),
        _ => format!("{}", value as u64),
    }
}

//! HTML audit report for a validation run.

use crate::gate::Rejection;
use crate::GateResult;
use bridge_files::ArtifactDir;
use chrono::{DateTime, Utc};
use html_escape::encode_text;
use std::fmt::Write;
use std::path::{Path, PathBuf};

const STYLE: &str = "body { font-family: sans-serif; padding: 20px; background: #f4f4f9; }
h1 { color: #2c3e50; }
.card { background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); margin-bottom: 20px; }
.stats { display: flex; gap: 20px; }
.stat-box { flex: 1; text-align: center; padding: 20px; background: #ecf0f1; border-radius: 8px; }
.valid { background: #d4edda; color: #155724; }
.invalid { background: #f8d7da; color: #721c24; }
table { width: 100%; border-collapse: collapse; margin-top: 20px; }
th, td { text-align: left; padding: 12px; border-bottom: 1px solid #ddd; }
th { background-color: #2c3e50; color: white; }";

/// Percentage of accepted artifacts, truncated; zero for an empty run.
pub fn quality_score(accepted: usize, rejected: usize) -> usize {
    let total = accepted + rejected;
    if total == 0 {
        0
    } else {
        accepted * 100 / total
    }
}

pub fn report_file_name(generated_at: DateTime<Utc>) -> String {
    format!(
        "audit_report_{}.html",
        generated_at.format("%Y_%m_%d_%H_%M_%S")
    )
}

/// Render the report document.
pub fn render_report(
    accepted: usize,
    rejections: &[Rejection],
    generated_at: DateTime<Utc>,
) -> String {
    let rejected = rejections.len();
    let mut rows = String::new();
    for rejection in rejections {
        // Writing to a String cannot fail.
        let _ = writeln!(
            rows,
            "<tr><td>{}</td><td>{}</td></tr>",
            encode_text(&rejection.filename),
            encode_text(&rejection.reason)
        );
    }

    format!(
        "<!DOCTYPE html>
<html>
<head>
<meta charset=\"utf-8\">
<title>Data Quality Audit Report</title>
<style>
{STYLE}
</style>
</head>
<body>
<h1>Data Quality Audit Report</h1>
<p>Generated: {generated}</p>
<div class=\"card stats\">
<div class=\"stat-box valid\"><h2>{accepted}</h2><p>Accepted Records</p></div>
<div class=\"stat-box invalid\"><h2>{rejected}</h2><p>Rejected Records</p></div>
<div class=\"stat-box\"><h2>{score}%</h2><p>Quality Score</p></div>
</div>
<div class=\"card\">
<h2>Rejection Log</h2>
<table>
<thead><tr><th>Filename</th><th>Reason</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
</div>
</body>
</html>
",
        generated = generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        score = quality_score(accepted, rejected),
    )
}

/// Write the report into `report_dir`, creating it when missing.
///
/// # Errors
///
/// Returns `GateError` if the directory cannot be created or the write fails.
pub fn write_report(
    report_dir: &Path,
    accepted: usize,
    rejections: &[Rejection],
    generated_at: DateTime<Utc>,
) -> GateResult<PathBuf> {
    let dir = ArtifactDir::create(report_dir)?;
    let path = dir.write(
        &report_file_name(generated_at),
        &render_report(accepted, rejections, generated_at),
    )?;
    Ok(path)
}

/// Output rendering
use crate::analysis::{TrackReport, TrackStatus};
use crate::config::OutputFormat;
use crate::error::Result;
use drumline_loudness::LoudnessMeasurement;
use std::fmt::Write;

/// Render reports in the requested format
pub fn render(reports: &[TrackReport], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(reports)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(reports)?),
    }
}

/// One line per file: loudness, gain, multiplier
pub fn render_text(reports: &[TrackReport]) -> String {
    let mut out = String::new();

    for report in reports {
        let _ = match report.status {
            TrackStatus::Measured => writeln!(
                out,
                "{:>8.2} LUFS  {:>+7.2} dB  x{:<6.3}  {}",
                report.lufs.unwrap_or(f64::NAN),
                report.gain_db.unwrap_or(0.0),
                report.linear_gain.unwrap_or(1.0),
                report.path
            ),
            TrackStatus::Unmeasurable => writeln!(
                out,
                "{:>8}       {:>7}     {:<6}  {} (too short or silent)",
                "-", "-", "-", report.path
            ),
            TrackStatus::Unsupported | TrackStatus::Failed => writeln!(
                out,
                "{:>8}       {:>7}     {:<6}  {} ({})",
                "-",
                "-",
                "-",
                report.path,
                report.error.as_deref().unwrap_or("unknown error")
            ),
        };
    }

    let measured = reports
        .iter()
        .filter(|r| r.status == TrackStatus::Measured)
        .count();
    let _ = writeln!(out, "{} of {} files measured", measured, reports.len());

    out
}

/// Detailed view of one measurement
pub fn render_measurement(path: &str, m: &LoudnessMeasurement) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "File:            {}", path);
    let _ = writeln!(out, "Sample rate:     {} Hz", m.sample_rate);
    let _ = writeln!(out, "Channels:        {}", m.channels);
    let _ = writeln!(out, "Duration:        {:.2} s", m.duration_seconds);
    let _ = writeln!(out, "Segments:        {}", m.segments);
    let _ = writeln!(out, "Blocks:          {} ({} above gate)", m.blocks, m.blocks_counted);
    let _ = writeln!(out, "Absolute-gated:  {:.2} LUFS", m.absolute_gated_lufs);
    let _ = writeln!(out, "Relative gate:   {:.2} LUFS", m.relative_gate_lufs);
    let _ = writeln!(out, "Integrated:      {:.2} LUFS", m.integrated_lufs);
    out
}

use std::path::{Path, PathBuf};

use eyre::Result;
use log::debug;
use serde::Serialize;

use crate::pipeline::Report;

pub const SUMMARY_FILE: &str = "video_summary.md";
pub const TRANSCRIPT_FILE: &str = "transcript.txt";

/// Render the report as markdown: thumbnail, notes, optional transcript
pub fn render_markdown(report: &Report, show_transcript: bool) -> String {
    let mut out = format!(
        "![YouTube Thumbnail]({})\n\n## Detailed Notes:\n\n{}\n",
        report.thumbnail_url,
        report.summary.trim_end()
    );
    if show_transcript {
        out.push_str("\n## Transcript:\n\n");
        out.push_str(&report.transcript_text());
        out.push('\n');
    }
    out
}

/// Render the report as plain text with no markup
pub fn render_text(report: &Report, show_transcript: bool) -> String {
    let mut out = format!("Thumbnail: {}\n\n{}\n", report.thumbnail_url, report.summary.trim_end());
    if show_transcript {
        out.push_str("\n--- Transcript ---\n");
        out.push_str(&report.transcript_text());
        out.push('\n');
    }
    out
}

pub fn render_json(report: &Report) -> String {
    to_json_or_error(report)
}

fn to_json_or_error<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
}

/// Download directory for one report; several URLs get one subdirectory per video
pub fn download_dir(base: &Path, report: &Report, per_video: bool) -> PathBuf {
    if per_video {
        base.join(report.video.id())
    } else {
        base.to_path_buf()
    }
}

/// Write `video_summary.md` and `transcript.txt` into `dir`
pub fn write_downloads(report: &Report, dir: &Path) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let summary_path = dir.join(SUMMARY_FILE);
    let transcript_path = dir.join(TRANSCRIPT_FILE);
    std::fs::write(&summary_path, &report.summary)?;
    std::fs::write(&transcript_path, report.transcript_text())?;
    debug!("Downloads written to {}", dir.display());
    Ok((summary_path, transcript_path))
}

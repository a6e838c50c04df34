use std::io::Write;

use anyhow::Result;
use backports::{Backport, BackportGroup, BackportState};
use chrono::{DateTime, Utc};
use serde::Serialize;

fn state_marker(state: BackportState) -> &'static str {
    match state {
        BackportState::Open => "🐣",
        BackportState::Merged => "✅",
        BackportState::Closed => "🔴",
    }
}

fn format_relative_time(time: DateTime<Utc>) -> String {
    use chrono_humanize::HumanTime;
    HumanTime::from(time).to_string()
}

/// Writes each feature title followed by one line per backport of it.
pub fn display_grouped<W: Write>(grouped: &BackportGroup, writer: &mut W) -> Result<()> {
    for (title, backports) in grouped.iter() {
        writeln!(writer, "{title}")?;
        for backport in backports {
            writeln!(
                writer,
                "  {}  {}: {}",
                state_marker(backport.state),
                backport.version,
                backport.url
            )?;
        }
    }
    Ok(())
}

pub fn display_stale<W: Write>(stale: &[Backport], writer: &mut W) -> Result<()> {
    for backport in stale {
        writeln!(writer, "Title: {}", backport.title)?;
        writeln!(writer, "  URL: {}", backport.url)?;
        writeln!(writer, "  Version: {}", backport.version)?;
        writeln!(
            writer,
            "  Created: {} ({})",
            backport.created_at.format("%Y-%m-%d %H:%M UTC"),
            format_relative_time(backport.created_at)
        )?;
    }
    Ok(())
}

pub fn display_json<T: Serialize + ?Sized, W: Write>(value: &T, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

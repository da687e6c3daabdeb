// Replay a recorded engine event log through the reporter

use crate::client::{RecordedCall, RecordingClient};
use crate::events::RunnerEvent;
use crate::reporter::{PortalReporter, dispatch};
use anyhow::{Context, Result};
use std::io::BufRead;
use std::path::Path;

/// Parse newline-delimited JSON events. Blank lines and lines starting with
/// `#` are skipped.
pub fn parse_events<R: BufRead>(reader: R) -> Result<Vec<RunnerEvent>> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read event line {}", index + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(trimmed)
            .with_context(|| format!("Invalid event on line {}", index + 1))?;
        events.push(event);
    }
    Ok(events)
}

pub fn load_events(path: &Path) -> Result<Vec<RunnerEvent>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open event log: {}", path.display()))?;
    parse_events(std::io::BufReader::new(file))
}

/// Feed events to the reporter in order, awaiting each handler, and return
/// the calls the recording client saw.
pub async fn replay(
    reporter: &PortalReporter<RecordingClient>,
    events: &[RunnerEvent],
) -> Vec<RecordedCall> {
    for event in events {
        dispatch(reporter, event).await;
    }
    reporter.client().calls()
}

pub fn render_console(calls: &[RecordedCall]) -> String {
    let mut out = String::new();
    for (index, call) in calls.iter().enumerate() {
        out.push_str(&format!("{:>3}. {}\n", index + 1, call.describe()));
    }
    out
}

pub fn render_json(calls: &[RecordedCall]) -> Result<String> {
    serde_json::to_string_pretty(calls).context("Failed to serialize recorded calls to JSON")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_events_skips_blank_and_comments() {
        let input = "# recorded run\n{\"event\":\"run_begin\"}\n\n{\"event\":\"run_end\"}\n";
        let events = parse_events(input.as_bytes()).expect("valid log");
        assert_eq!(events, vec![RunnerEvent::RunBegin, RunnerEvent::RunEnd]);
    }

    #[test]
    fn test_parse_events_reports_line() {
        let input = "{\"event\":\"run_begin\"}\n{\"event\":\"explode\"}\n";
        let err = parse_events(input.as_bytes()).expect_err("invalid event");
        assert!(format!("{:#}", err).contains("line 2"));
    }
}

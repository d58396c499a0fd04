use crate::OutputLevel;

/// One line of compressor output, interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    TrackProgress { track: String, percent: f64 },
    FileCounts { processed: u64, total: u64 },
    Output(OutputLevel),
}

const PROGRESS_PREFIX: &str = "PROGRESS ";
const FILES_PREFIX: &str = "FILES ";

pub(crate) const COMPRESSING_MARKERS: [&str; 2] = ["Compressing", "Komprimiere"];
const SUCCESS_MARKERS: [&str; 3] = ["✓", "Done", "Fertig"];
const ERROR_MARKERS: [&str; 3] = ["✗", "Error", "Fehler"];
const WARNING_MARKERS: [&str; 3] = ["⚠", "Warning", "Warnung"];

/// Recognizes `PROGRESS <track> <percent>` and `FILES <processed>/<total>`;
/// everything else is classified by its markers. Malformed structured lines
/// fall through to classification.
pub fn parse_line(line: &str) -> ParsedLine {
    let trimmed = line.trim();
    if let Some(rest) = trimmed.strip_prefix(PROGRESS_PREFIX) {
        if let Some(parsed) = parse_progress(rest) {
            return parsed;
        }
    }
    if let Some(rest) = trimmed.strip_prefix(FILES_PREFIX) {
        if let Some(parsed) = parse_counts(rest) {
            return parsed;
        }
    }
    ParsedLine::Output(classify(trimmed))
}

fn parse_progress(rest: &str) -> Option<ParsedLine> {
    let mut parts = rest.split_whitespace();
    let track = parts.next()?;
    let percent = parts.next()?.trim_end_matches('%').parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(ParsedLine::TrackProgress {
        track: track.to_string(),
        percent,
    })
}

fn parse_counts(rest: &str) -> Option<ParsedLine> {
    let (processed, total) = rest.trim().split_once('/')?;
    Some(ParsedLine::FileCounts {
        processed: processed.trim().parse().ok()?,
        total: total.trim().parse().ok()?,
    })
}

pub fn classify(line: &str) -> OutputLevel {
    let contains_any = |markers: &[&str]| markers.iter().any(|m| line.contains(m));
    if contains_any(&COMPRESSING_MARKERS) {
        OutputLevel::Info
    } else if contains_any(&SUCCESS_MARKERS) {
        OutputLevel::Success
    } else if contains_any(&ERROR_MARKERS) {
        OutputLevel::Error
    } else if contains_any(&WARNING_MARKERS) {
        OutputLevel::Warning
    } else {
        OutputLevel::Info
    }
}

use std::io::BufRead;

use super::domain::Severity;

/// A question parsed from a line-delimited import, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedQuestion {
    pub text: String,
    pub severity: Severity,
}

/// Parse `text` or `text|severity` lines. Blank lines are skipped; a missing or
/// non-numeric severity becomes 1 and numeric values are clamped to `[1, 10]`.
pub fn parse_question_lines<R: BufRead>(reader: R) -> Result<Vec<ImportedQuestion>, std::io::Error> {
    let mut parsed = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if let Some(question) = parse_line(&line) {
            parsed.push(question);
        }
    }

    Ok(parsed)
}

fn parse_line(line: &str) -> Option<ImportedQuestion> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (text, severity) = match trimmed.split_once('|') {
        Some((text, rest)) => {
            let raw = rest.split('|').next().unwrap_or("");
            (text.trim(), parse_severity(raw))
        }
        None => (trimmed, Severity::default()),
    };

    if text.is_empty() {
        return None;
    }

    Some(ImportedQuestion {
        text: text.to_string(),
        severity,
    })
}

fn parse_severity(raw: &str) -> Severity {
    leading_integer(raw.trim())
        .map(Severity::clamped)
        .unwrap_or_default()
}

// Accepts a leading signed integer and ignores trailing characters ("7 critical" -> 7).
fn leading_integer(raw: &str) -> Option<i64> {
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let end = digits
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map(|(idx, _)| idx)
        .unwrap_or(digits.len());

    if end == 0 {
        return None;
    }

    digits[..end]
        .parse::<i64>()
        .ok()
        .map(|value| sign * value)
        .or(Some(sign * i64::MAX))
}

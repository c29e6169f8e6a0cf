//! Heading detection for chunk section labels.
//!
//! A chunk is labelled by its first non-blank line when that line reads like
//! a heading: a markdown `#` heading, or a short title-cased / upper-case line
//! without sentence punctuation. List markers and `*` / `_` emphasis are not
//! part of the label.

pub const MAX_HEADING_CHARS: usize = 60;

const BULLET_MARKERS: &[char] = &['-', '*', '•', '+', '#', '>'];

const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "in", "of", "on", "or", "the", "to", "vs", "with",
];

pub fn detect_heading(text: &str) -> Option<String> {
    let first = text.lines().map(str::trim).find(|l| !l.is_empty())?;

    if first.starts_with('#') {
        let label = plain_line(first);
        return if label.is_empty() { None } else { Some(label.to_string()) };
    }

    let label = plain_line(first).trim_end_matches(':').trim();
    if label.is_empty() || label.chars().count() > MAX_HEADING_CHARS {
        return None;
    }
    if !label.chars().any(char::is_alphabetic) {
        return None;
    }
    if label.ends_with(['.', '!', '?', ',', ';']) {
        return None;
    }
    if is_title_case(label) || is_upper_case(label) {
        Some(label.to_string())
    } else {
        None
    }
}

/// Line text without surrounding list marker or emphasis:
/// `- **Sick Leave**` reads as `Sick Leave`.
pub fn plain_line(line: &str) -> &str {
    strip_emphasis(strip_list_marker(strip_emphasis(line.trim())))
}

/// Drops a leading bullet (`-`, `*`, `•`, `#`...) or `1.` / `1)` marker.
pub fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let unbulleted = line.trim_start_matches(BULLET_MARKERS);
    if unbulleted.len() != line.len() {
        return unbulleted.trim_start();
    }
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(after) = rest.strip_prefix(['.', ')']) {
            if after.is_empty() || after.starts_with(char::is_whitespace) {
                return after.trim_start();
            }
        }
    }
    line
}

/// `**text**`, `*text*`, `__text__` and `_text_` lose their markers.
fn strip_emphasis(line: &str) -> &str {
    let Some(marker) = line.chars().next().filter(|c| matches!(c, '*' | '_')) else { return line };
    if line.len() > 2 && line.ends_with(marker) {
        line.trim_matches(marker).trim()
    } else {
        line
    }
}

fn is_title_case(line: &str) -> bool {
    let mut words = 0usize;
    for (i, word) in line.split_whitespace().enumerate() {
        let Some(first) = word.chars().find(|c| c.is_alphanumeric()) else { continue };
        if !first.is_alphabetic() {
            continue;
        }
        words += 1;
        if first.is_uppercase() {
            continue;
        }
        if i > 0 && MINOR_WORDS.contains(&word.to_lowercase().as_str()) {
            continue;
        }
        return false;
    }
    words > 0
}

fn is_upper_case(line: &str) -> bool {
    line.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase)
}

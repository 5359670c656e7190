//! Front-matter error diagnostics with source locations

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Malformed item header, pointing at the offending location in the file
#[derive(Debug, Error, Diagnostic)]
#[error("malformed item file: {message}")]
#[diagnostic(code(tkt::store::parse))]
pub struct FrontMatterError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl FrontMatterError {
    /// Build from a serde_yml error raised while parsing the header block.
    ///
    /// `header_line` is the 1-based line of the file where the header text
    /// starts, so locations reported by serde_yml can be mapped back onto the
    /// whole file.
    pub fn from_serde_error(
        err: &serde_yml::Error,
        source: &str,
        filename: &str,
        header_line: usize,
    ) -> Self {
        let message = err.to_string();
        let (line, column) = match err.location() {
            Some(loc) => (loc.line(), loc.column()),
            None => (1, 1),
        };

        let help = hint_for(&message);
        Self::at_location(
            message,
            source,
            filename,
            line + header_line.saturating_sub(1),
            column,
            help,
        )
    }

    /// The file does not open with a `---` delimited header
    pub fn missing_header(source: &str, filename: &str) -> Self {
        Self::at_location(
            "missing front-matter header",
            source,
            filename,
            1,
            1,
            Some("Item files start with a '---' line, the YAML header, then a closing '---' line".to_string()),
        )
    }

    /// The header opens but never closes
    pub fn unterminated_header(source: &str, filename: &str) -> Self {
        let last_line = source.lines().count().max(1);
        Self::at_location(
            "front-matter header is not closed",
            source,
            filename,
            last_line,
            1,
            Some("Add a '---' line after the last header field".to_string()),
        )
    }

    fn at_location(
        message: impl Into<String>,
        source: &str,
        filename: &str,
        line: usize,
        column: usize,
        help: Option<String>,
    ) -> Self {
        let offset = offset_of(source, line, column);

        Self {
            message: message.into(),
            src: NamedSource::new(filename, source.to_string()),
            span: (offset, 1).into(),
            help,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Byte offset of a 1-based line and character column, clamped to the end
/// of that line (or of the source when the line does not exist)
fn offset_of(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    if line_start >= source.len() {
        return source.len().saturating_sub(1);
    }

    let rest = &source[line_start..];
    let line_text = rest.split('\n').next().unwrap_or_default();
    line_text
        .char_indices()
        .nth(column.saturating_sub(1))
        .map(|(idx, _)| line_start + idx)
        .unwrap_or(line_start + line_text.len())
}

/// Known serde_yml messages and a hint for each
const HINTS: &[(&str, &str)] = &[
    ("tab", "Indent the header with spaces; YAML does not allow tabs"),
    ("duplicate", "Each header field can only appear once"),
    (
        "mapping values are not allowed",
        "Titles containing ': ' need quotes, e.g. title: \"fix: the thing\"",
    ),
    (
        "invalid type",
        "tags and links are lists; created and updated are RFC 3339 timestamps",
    ),
    ("premature end", "Timestamps look like 2026-01-02T03:04:05Z"),
    ("invalid value", "Timestamps look like 2026-01-02T03:04:05Z"),
];

fn hint_for(message: &str) -> Option<String> {
    let lower = message.to_lowercase();
    HINTS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, hint)| hint.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_of() {
        let source = "line1\nline2\nline3";
        assert_eq!(offset_of(source, 1, 1), 0);
        assert_eq!(offset_of(source, 2, 1), 6);
        assert_eq!(offset_of(source, 3, 3), 14);
        // past the end of a line stops at its newline
        assert_eq!(offset_of(source, 1, 40), 5);
        // missing line points at the last byte
        assert_eq!(offset_of(source, 9, 1), source.len() - 1);
        assert_eq!(offset_of("", 1, 1), 0);
    }

    #[test]
    fn test_hints() {
        assert!(hint_for("found tab character").is_some());
        assert!(hint_for("duplicate entry with key \"title\"").is_some());
        assert!(hint_for("some random error").is_none());
    }

    #[test]
    fn test_missing_header_points_at_start() {
        let err = FrontMatterError::missing_header("just text", "ab12.md");
        assert_eq!(err.span.offset(), 0);
        assert!(err.help.is_some());
    }

    #[test]
    fn test_serde_error_maps_to_file_line() {
        let text = "---\ntitle: ok\ntags: [a\n---\n";
        let header = "title: ok\ntags: [a\n";
        let err = serde_yml::from_str::<serde_yml::Value>(header).unwrap_err();
        let diag = FrontMatterError::from_serde_error(&err, text, "ab12.md", 2);
        assert!(diag.span.offset() >= "---\n".len());
        assert!(!diag.message().is_empty());
    }
}

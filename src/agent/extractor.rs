//! Tool-call extraction from model replies
//!
//! Models are asked to request tool runs in free text. A [`ToolCallParser`]
//! turns a reply into provisional [`ToolCallDescriptor`]s; nothing here
//! validates or executes what it finds.

use crate::storage::ToolCallDescriptor;

/// Marker that introduces a tool request on a line of model output
pub const TOOL_SENTINEL: &str = "EXECUTE_TOOL:";

/// Extracts tool-call intents from reply text
pub trait ToolCallParser: Send + Sync {
    /// Returns every intent found in `reply`, in order of appearance
    fn parse(&self, reply: &str) -> Vec<ToolCallDescriptor>;
}

/// Line-oriented parser keyed on a sentinel marker
///
/// Every line containing the marker yields one descriptor whose `raw` field
/// is the line with all marker occurrences removed and surrounding
/// whitespace trimmed.
///
/// # Examples
///
/// ```
/// use nexus::agent::extractor::{SentinelParser, ToolCallParser};
///
/// let parser = SentinelParser::default();
/// let calls = parser.parse("Running a scan.\nEXECUTE_TOOL: nmap -sV 10.0.0.5\nDone.");
/// assert_eq!(calls.len(), 1);
/// assert_eq!(calls[0].raw, "nmap -sV 10.0.0.5");
/// ```
#[derive(Debug, Clone)]
pub struct SentinelParser {
    marker: String,
}

impl SentinelParser {
    /// Creates a parser for a custom marker
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// The marker this parser looks for
    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl Default for SentinelParser {
    fn default() -> Self {
        Self::new(TOOL_SENTINEL)
    }
}

impl ToolCallParser for SentinelParser {
    fn parse(&self, reply: &str) -> Vec<ToolCallDescriptor> {
        if self.marker.is_empty() || !reply.contains(&self.marker) {
            return Vec::new();
        }

        reply
            .lines()
            .filter(|line| line.contains(&self.marker))
            .map(|line| ToolCallDescriptor::raw(line.replace(&self.marker, "").trim()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_marker_yields_nothing() {
        let parser = SentinelParser::default();
        assert!(parser.parse("Just some advice about nmap.").is_empty());
    }

    #[test]
    fn test_multiple_markers_keep_order() {
        let parser = SentinelParser::default();
        let reply = "EXECUTE_TOOL: whois example.com\ntext\n  EXECUTE_TOOL:   nikto -h example.com  ";
        let calls = parser.parse(reply);
        let raws: Vec<&str> = calls.iter().map(|c| c.raw.as_str()).collect();
        assert_eq!(raws, vec!["whois example.com", "nikto -h example.com"]);
    }

    #[test]
    fn test_marker_mid_line_is_removed() {
        let parser = SentinelParser::default();
        let calls = parser.parse("Next step -> EXECUTE_TOOL: dirb http://t");
        assert_eq!(calls[0].raw, "Next step ->  dirb http://t");
    }

    #[test]
    fn test_marker_removal_keeps_interior_spacing() {
        let parser = SentinelParser::default();
        let calls = parser.parse("  run EXECUTE_TOOL:nmap  -p 80 t  ");
        assert_eq!(calls[0].raw, "run nmap  -p 80 t");
    }

    #[test]
    fn test_bare_marker_yields_empty_raw() {
        let parser = SentinelParser::default();
        let calls = parser.parse("EXECUTE_TOOL:");
        assert_eq!(calls.len(), 1);
        assert!(calls[0].raw.is_empty());
    }

    #[test]
    fn test_windows_line_endings() {
        let parser = SentinelParser::default();
        let calls = parser.parse("a\r\nEXECUTE_TOOL: john hashes.txt\r\nb");
        assert_eq!(calls[0].raw, "john hashes.txt");
    }

    #[test]
    fn test_custom_marker() {
        let parser = SentinelParser::new("RUN:");
        assert_eq!(parser.marker(), "RUN:");
        assert_eq!(parser.parse("RUN: hydra")[0].raw, "hydra");
        assert!(parser.parse("EXECUTE_TOOL: hydra").is_empty());
    }
}

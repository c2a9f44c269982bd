//! Multi-record `kubectl describe` output
//!
//! A describe artifact concatenates one record per resource. Every line
//! starting with `Name:` opens a new record. Inside a record, each
//! non-indented line opens a section named by the text before its first
//! colon, and all following lines belong to that section until the next
//! non-indented line.

use crate::error::{BundleError, Result};
use crate::models::{DescribeSections, OrderedMap};

const RECORD_MARKER: &str = "Name:";

/// Split describe output into one text block per record
///
/// Lines before the first `Name:` line belong to no record and are dropped.
pub fn split_describe_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in text.lines() {
        if line.starts_with(RECORD_MARKER) {
            if let Some(lines) = current.take() {
                blocks.push(lines.join("\n"));
            }
            current = Some(vec![line]);
        } else if let Some(lines) = current.as_mut() {
            lines.push(line);
        }
    }

    if let Some(lines) = current {
        blocks.push(lines.join("\n"));
    }

    blocks
}

/// Split one describe record into its top-level sections
///
/// The section's own header line is part of its text. A section name that
/// repeats within a record appends to the earlier text.
pub fn parse_sections(block: &str) -> DescribeSections {
    let mut sections = DescribeSections::new();
    let mut current: Option<String> = None;

    for line in block.split('\n') {
        if !line.is_empty() && !line.starts_with(char::is_whitespace) {
            let name = line.split(':').next().unwrap_or(line);
            current = Some(name.to_string());
        }

        let Some(name) = current.as_deref() else {
            continue;
        };
        match sections.get_mut(name) {
            Some(text) => {
                text.push('\n');
                text.push_str(line);
            }
            None => {
                sections.insert(name, line.to_string());
            }
        }
    }

    sections
}

/// Parse describe output into per-record section maps, in input order
pub fn parse_describe_output(text: &str) -> Vec<DescribeSections> {
    split_describe_blocks(text)
        .iter()
        .map(|block| parse_sections(block))
        .collect()
}

/// Pair describe records with the names from the matching `get` listing
///
/// Both artifacts enumerate the same resources in the same order; differing
/// counts are reported rather than truncated.
pub fn join_describe_with_names(
    resource_type: &str,
    names: &[String],
    records: Vec<DescribeSections>,
) -> Result<OrderedMap<DescribeSections>> {
    if names.len() != records.len() {
        return Err(BundleError::DataInconsistency(format!(
            "{} get output lists {} resources but describe output has {} records",
            resource_type,
            names.len(),
            records.len()
        )));
    }

    Ok(names.iter().cloned().zip(records).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_PODS: &str = "\
Name:         web-0
Namespace:    viya
Labels:       app=web
              tier=frontend
Containers:
  web:
    Image:    nginx
Events:       <none>

Name:         web-1
Namespace:    viya
Events:       <none>
";

    #[test]
    fn test_split_counts_name_lines() {
        let blocks = split_describe_blocks(TWO_PODS);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("Name:         web-0"));
        assert!(blocks[1].starts_with("Name:         web-1"));
    }

    #[test]
    fn test_split_preserves_all_lines_in_order() {
        let blocks = split_describe_blocks(TWO_PODS);
        let rejoined = blocks.join("\n");
        let original: Vec<&str> = TWO_PODS.lines().collect();
        let rebuilt: Vec<&str> = rejoined.lines().collect();
        assert_eq!(original, rebuilt);
    }

    #[test]
    fn test_split_drops_preamble() {
        let text = "kubectl describe pods\n\nName:   a\nStatus: Running\n";
        let blocks = split_describe_blocks(text);
        assert_eq!(blocks, vec!["Name:   a\nStatus: Running".to_string()]);
    }

    #[test]
    fn test_split_empty_input() {
        assert!(split_describe_blocks("").is_empty());
        assert!(split_describe_blocks("no records here\n").is_empty());
    }

    #[test]
    fn test_sections_collect_indented_lines() {
        let records = parse_describe_output(TWO_PODS);
        let first = &records[0];

        assert_eq!(
            first.keys().collect::<Vec<_>>(),
            vec!["Name", "Namespace", "Labels", "Containers", "Events"]
        );
        assert_eq!(
            first.get("Labels").map(String::as_str),
            Some("Labels:       app=web\n              tier=frontend")
        );
        assert_eq!(
            first.get("Containers").map(String::as_str),
            Some("Containers:\n  web:\n    Image:    nginx")
        );
        // The blank separator line trails the last section of the record.
        assert_eq!(
            first.get("Events").map(String::as_str),
            Some("Events:       <none>\n")
        );
    }

    #[test]
    fn test_trailing_blank_line_stays_in_last_section() {
        let sections = parse_sections("Name: a\nStatus: Running\n");
        assert_eq!(
            sections.get("Status").map(String::as_str),
            Some("Status: Running\n")
        );
        assert_eq!(sections.get("Name").map(String::as_str), Some("Name: a"));
    }

    #[test]
    fn test_repeated_section_appends() {
        let sections = parse_sections("Name: a\nNote: one\nNote: two");
        assert_eq!(
            sections.get("Note").map(String::as_str),
            Some("Note: one\nNote: two")
        );
    }

    #[test]
    fn test_header_without_colon_is_its_own_section() {
        let sections = parse_sections("Name: cm\nData\n====\nKEY:\n----\nvalue");
        assert!(sections.contains_key("Data"));
        assert!(sections.contains_key("===="));
        assert_eq!(sections.get("KEY").map(String::as_str), Some("KEY:"));
    }

    #[test]
    fn test_join_pairs_positionally() {
        let names = vec!["web-0".to_string(), "web-1".to_string()];
        let joined =
            join_describe_with_names("pods", &names, parse_describe_output(TWO_PODS)).unwrap();

        assert_eq!(joined.keys().collect::<Vec<_>>(), vec!["web-0", "web-1"]);
        assert!(joined.get("web-1").unwrap().contains_key("Namespace"));
    }

    #[test]
    fn test_join_rejects_count_mismatch() {
        let names = vec!["web-0".to_string()];
        let result = join_describe_with_names("pods", &names, parse_describe_output(TWO_PODS));
        assert!(matches!(result, Err(BundleError::DataInconsistency(_))));
    }
}

//! Doc comment harvesting.

/// The doc comment's summary markup is unbalanced or otherwise unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedDoc;

const SUMMARY_OPEN: &str = "<summary>";
const SUMMARY_CLOSE: &str = "</summary>";

/// Extract the `<summary>` text from a raw doc comment.
///
/// Returns `Ok(None)` when the comment carries no summary block at all, and
/// `Err` when the block is unbalanced so the caller can report it and move on.
///
/// # Errors
///
/// Returns [`MalformedDoc`] when only one of the open/close markers is present
/// or they appear out of order.
pub fn extract_summary(comment: &str) -> Result<Option<String>, MalformedDoc> {
    let open = comment.find(SUMMARY_OPEN);
    let close = comment.find(SUMMARY_CLOSE);

    match (open, close) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) if start + SUMMARY_OPEN.len() <= end => {
            let inner = comment.get(start + SUMMARY_OPEN.len()..end).unwrap_or_default();
            let text = inner
                .lines()
                .map(|line| line.trim().trim_start_matches("///").trim())
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if text.is_empty() { Ok(None) } else { Ok(Some(text)) }
        }
        _ => Err(MalformedDoc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_summary_block() {
        assert_eq!(extract_summary("just some text"), Ok(None));
    }

    #[test]
    fn test_simple_summary() {
        let comment = "<summary>Number of cache hits.</summary>";
        assert_eq!(extract_summary(comment), Ok(Some("Number of cache hits.".to_string())));
    }

    #[test]
    fn test_multiline_summary_is_joined() {
        let comment = "/// <summary>\n/// Number of\n/// cache hits.\n/// </summary>";
        assert_eq!(extract_summary(comment), Ok(Some("Number of cache hits.".to_string())));
    }

    #[test]
    fn test_empty_summary_is_none() {
        assert_eq!(extract_summary("<summary>  </summary>"), Ok(None));
    }

    #[test]
    fn test_unclosed_summary_is_malformed() {
        assert_eq!(extract_summary("<summary>oops"), Err(MalformedDoc));
    }

    #[test]
    fn test_unopened_summary_is_malformed() {
        assert_eq!(extract_summary("oops</summary>"), Err(MalformedDoc));
    }

    #[test]
    fn test_out_of_order_markers_are_malformed() {
        assert_eq!(extract_summary("</summary>backwards<summary>"), Err(MalformedDoc));
    }
}

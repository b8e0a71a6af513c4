//! Splits a label into plain and emphasized runs according to its highlight index.
//!
//! Every char of the label ends up in exactly one segment, in order. Runs that start
//! past the end of the label are ignored, and runs overlapping an earlier run only
//! emphasize the part not already emitted.

use crate::model::Highlight;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub emphasized: bool,
}

pub fn segments(label: &str, highlights: &[Highlight]) -> Vec<Segment> {
    let chars: Vec<char> = label.chars().collect();
    let total = chars.len();
    let mut out = Vec::new();
    let mut cursor = 0;

    for highlight in highlights {
        let start = highlight.start().max(cursor);
        let end = (highlight.start() + highlight.len()).min(total);
        if start >= total {
            break;
        }
        if end <= start {
            continue;
        }

        push_segment(&mut out, &chars[cursor..start], false);
        push_segment(&mut out, &chars[start..end], true);
        cursor = end;
    }

    push_segment(&mut out, &chars[cursor..], false);
    out
}

/// HTML for a label: emphasized runs wrapped in `<span class="{prefix}-item-hl">`.
pub fn markup(label: &str, highlights: Option<&[Highlight]>, class_prefix: &str) -> String {
    let Some(highlights) = highlights else {
        return escape(label);
    };

    let open = if class_prefix.is_empty() {
        "<span>".to_string()
    } else {
        format!("<span class=\"{}-item-hl\">", escape(class_prefix))
    };

    segments(label, highlights)
        .into_iter()
        .map(|segment| {
            if segment.emphasized {
                format!("{open}{}</span>", escape(&segment.text))
            } else {
                escape(&segment.text)
            }
        })
        .collect()
}

fn push_segment(out: &mut Vec<Segment>, chars: &[char], emphasized: bool) {
    if chars.is_empty() {
        return;
    }
    out.push(Segment {
        text: chars.iter().collect(),
        emphasized,
    });
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{markup, segments, Segment};
    use crate::model::Highlight;

    fn joined(parts: &[Segment]) -> String {
        parts.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn wraps_ranges_and_offsets() {
        let html = markup(
            "abcdef",
            Some(&[Highlight::Range(0, 2), Highlight::Offset(4)]),
            "ui-select",
        );
        assert_eq!(
            html,
            "<span class=\"ui-select-item-hl\">ab</span>cd<span class=\"ui-select-item-hl\">e</span>f"
        );
    }

    #[test]
    fn keeps_every_char_exactly_once() {
        let highlights = [
            Highlight::Range(2, 5),
            Highlight::Range(1, 3),
            Highlight::Range(9, 12),
        ];
        let parts = segments("天弘增利宝货币", &highlights);
        assert_eq!(joined(&parts), "天弘增利宝货币");
        assert_eq!(parts.iter().filter(|s| s.emphasized).count(), 1);
    }

    #[test]
    fn plain_label_without_highlight() {
        assert_eq!(markup("a<b", None, "x"), "a&lt;b");
        assert_eq!(markup("ab", Some(&[Highlight::Offset(1)]), ""), "a<span>b</span>");
    }
}

//! Small shared helpers.

/// Truncate to at most `max_len` characters, appending an ellipsis marker
/// when anything was cut. Used for log/error snippets.
pub fn truncate_text(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_len).collect();
    out.push_str("...");
    out
}

/// Split a markdown reply into chunks of at most `limit` characters.
///
/// Splitting happens on the markdown, before HTML conversion, so no chunk can
/// end mid-tag. Preference order: paragraph breaks, then line breaks, then a
/// hard character split.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for para in split_keeping(text, "\n\n") {
        let para_len = para.chars().count();

        if current_len + para_len <= limit {
            current.push_str(para);
            current_len += para_len;
            continue;
        }

        if current_len > 0 {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if para_len <= limit {
            current.push_str(para);
            current_len = para_len;
            continue;
        }

        // Paragraph itself too long: fall back to lines, then hard splits.
        for line in split_keeping(para, "\n") {
            let line_len = line.chars().count();
            if current_len + line_len <= limit {
                current.push_str(line);
                current_len += line_len;
                continue;
            }
            if current_len > 0 {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if line_len <= limit {
                current.push_str(line);
                current_len = line_len;
                continue;
            }
            for piece in hard_split(line, limit) {
                chunks.push(piece);
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
        .into_iter()
        .map(|c| c.trim_matches('\n').to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

/// Split on `sep`, keeping the separator attached to the preceding piece so
/// rejoined chunks preserve spacing.
fn split_keeping<'a>(text: &'a str, sep: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(idx) = rest.find(sep) {
        let cut = idx + sep.len();
        out.push(&rest[..cut]);
        rest = &rest[cut..];
    }
    if !rest.is_empty() {
        out.push(rest);
    }
    out
}

fn hard_split(text: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(limit)
        .map(|c| c.iter().collect::<String>())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_message("hello", 100), vec!["hello"]);
    }

    #[test]
    fn splits_on_paragraphs_first() {
        let text = format!("{}\n\n{}", "a".repeat(60), "b".repeat(60));
        let chunks = split_message(&text, 80);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "a".repeat(60));
        assert_eq!(chunks[1], "b".repeat(60));
    }

    #[test]
    fn falls_back_to_lines() {
        let text = format!("{}\n{}", "a".repeat(60), "b".repeat(60));
        let chunks = split_message(&text, 80);
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn hard_splits_unbreakable_runs() {
        let text = "x".repeat(250);
        let chunks = split_message(&text, 100);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
    }

    #[test]
    fn no_chunk_exceeds_limit() {
        let text = "para one line\n\nsecond paragraph that is a bit longer\nwith a line\n\nthird";
        for chunk in split_message(text, 20) {
            assert!(chunk.chars().count() <= 20, "chunk too long: {chunk:?}");
        }
    }

    #[test]
    fn truncation_marks_cut_text() {
        assert_eq!(truncate_text("abcdef", 10), "abcdef");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
    }
}

//! Markdown → Telegram HTML conversion.
//!
//! Gemini answers in markdown; Telegram HTML parse mode supports only a small
//! tag subset (`<b>`, `<i>`, `<code>`, `<pre>`, `<a href>`). Code spans and
//! links are extracted first so their contents are never reinterpreted as
//! markup (URLs routinely contain `_` and `*`).

use regex::Regex;

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn markdown_to_html(input: &str) -> String {
    let (text, code_blocks) = extract_fenced(input);
    let (text, inline_codes) = extract_backticked(&text);
    let (text, links) = extract_links(&text);

    let mut text = escape_html(&text);

    // Line-oriented transforms; emphasis never spans lines.
    text = text
        .split('\n')
        .map(convert_line)
        .collect::<Vec<_>>()
        .join("\n");

    for (i, (label, url)) in links.iter().enumerate() {
        text = text.replace(
            &format!("\u{0}LINK{i}\u{0}"),
            &format!(r#"<a href="{}">{}</a>"#, escape_html(url), escape_html(label)),
        );
    }

    for (i, code) in code_blocks.iter().enumerate() {
        let escaped = escape_html(code);
        text = text.replace(
            &format!("\u{0}FENCE{i}\u{0}"),
            &format!("<pre>{escaped}</pre>"),
        );
    }
    for (i, code) in inline_codes.iter().enumerate() {
        let escaped = escape_html(code);
        text = text.replace(
            &format!("\u{0}TICK{i}\u{0}"),
            &format!("<code>{escaped}</code>"),
        );
    }

    while text.contains("\n\n\n") {
        text = text.replace("\n\n\n", "\n\n");
    }

    text
}

fn convert_line(line: &str) -> String {
    // Headers become bold.
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if (1..=6).contains(&hashes) && line.as_bytes().get(hashes) == Some(&b' ') {
        return format!("<b>{}</b>", &line[hashes + 1..]);
    }

    // Bullets.
    let mut l = line.to_string();
    for marker in ["- ", "* "] {
        if let Some(rest) = l.strip_prefix(marker) {
            l = format!("\u{2022} {rest}");
            break;
        }
    }

    l = replace_pair(&l, "**", "<b>", "</b>");
    l = replace_pair(&l, "__", "<b>", "</b>");
    l = replace_single(&l, '*', "<i>", "</i>");
    l = replace_single(&l, '_', "<i>", "</i>");
    l
}

/// Replace `<delim>content<delim>` with `open content close`, leaving any
/// unpaired delimiter untouched.
fn replace_pair(text: &str, delim: &str, open: &str, close: &str) -> String {
    let mut out = String::new();
    let mut rest = text;
    while let Some(start) = rest.find(delim) {
        let after = &rest[start + delim.len()..];
        let Some(len) = after.find(delim) else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(open);
        out.push_str(&after[..len]);
        out.push_str(close);
        rest = &after[len + delim.len()..];
    }
    out.push_str(rest);
    out
}

fn replace_single(text: &str, delim: char, open: &str, close: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::new();
    let mut i = 0usize;

    while i < chars.len() {
        if chars[i] != delim || is_doubled(&chars, i, delim) {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        // Find a matching single closing delimiter on this line.
        let close_at = (i + 1..chars.len())
            .find(|&j| chars[j] == delim && !is_doubled(&chars, j, delim));
        match close_at {
            Some(j) if j > i + 1 => {
                out.push_str(open);
                out.extend(&chars[i + 1..j]);
                out.push_str(close);
                i = j + 1;
            }
            _ => {
                out.push(delim);
                i += 1;
            }
        }
    }

    out
}

fn is_doubled(chars: &[char], i: usize, delim: char) -> bool {
    (i > 0 && chars[i - 1] == delim) || chars.get(i + 1) == Some(&delim)
}

fn extract_fenced(input: &str) -> (String, Vec<String>) {
    let mut blocks = Vec::new();
    let mut out = String::new();
    let mut i = 0usize;

    while let Some(rel) = input[i..].find("```") {
        let start = i + rel;
        out.push_str(&input[i..start]);

        // Skip optional language tag and one newline after the fence.
        let mut p = start + 3;
        while p < input.len() {
            let b = input.as_bytes()[p];
            if b.is_ascii_alphanumeric() || b == b'_' {
                p += 1;
            } else {
                break;
            }
        }
        if input.as_bytes().get(p) == Some(&b'\n') {
            p += 1;
        }

        let Some(end_rel) = input[p..].find("```") else {
            // Unclosed fence: keep the rest verbatim.
            out.push_str(&input[start..]);
            return (out, blocks);
        };
        let end = p + end_rel;
        let idx = blocks.len();
        blocks.push(input[p..end].to_string());
        out.push_str(&format!("\u{0}FENCE{idx}\u{0}"));
        i = end + 3;
    }

    out.push_str(&input[i..]);
    (out, blocks)
}

fn extract_backticked(input: &str) -> (String, Vec<String>) {
    let mut codes = Vec::new();
    let mut out = String::new();
    let mut i = 0usize;

    while let Some(rel) = input[i..].find('`') {
        let start = i + rel;
        out.push_str(&input[i..start]);

        let body = start + 1;
        let Some(end_rel) = input[body..].find('`') else {
            out.push_str(&input[start..]);
            return (out, codes);
        };
        let end = body + end_rel;
        let idx = codes.len();
        codes.push(input[body..end].to_string());
        out.push_str(&format!("\u{0}TICK{idx}\u{0}"));
        i = end + 1;
    }

    out.push_str(&input[i..]);
    (out, codes)
}

/// Pull `[text](url)` spans out before escaping and emphasis, so URLs with
/// `_` or `*` in them survive intact.
fn extract_links(input: &str) -> (String, Vec<(String, String)>) {
    let link_re = Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("valid regex");
    let mut links = Vec::new();
    let out = link_re
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let idx = links.len();
            links.push((caps[1].to_string(), caps[2].to_string()));
            format!("\u{0}LINK{idx}\u{0}")
        })
        .to_string();
    (out, links)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html() {
        assert_eq!(
            escape_html(r#"<a href="x&y">"#),
            "&lt;a href=&quot;x&amp;y&quot;&gt;"
        );
    }

    #[test]
    fn bold_and_italic() {
        assert_eq!(markdown_to_html("**Answer: B**"), "<b>Answer: B</b>");
        assert_eq!(markdown_to_html("a *subtle* hint"), "a <i>subtle</i> hint");
    }

    #[test]
    fn headers_become_bold() {
        assert_eq!(markdown_to_html("## Takeaway"), "<b>Takeaway</b>");
    }

    #[test]
    fn bullets_are_rewritten() {
        let html = markdown_to_html("- first\n* second");
        assert_eq!(html, "\u{2022} first\n\u{2022} second");
    }

    #[test]
    fn code_blocks_are_not_reinterpreted() {
        let md = "before\n```js\nlet x = '<b>**bold**</b>';\n```\nafter";
        let html = markdown_to_html(md);
        assert!(html.contains("<pre>"));
        assert!(html.contains("let x = '&lt;b&gt;**bold**&lt;/b&gt;';"));
        assert!(!html.contains("<b>**bold**"));
    }

    #[test]
    fn inline_code_preserved() {
        let html = markdown_to_html("use `x < y` here");
        assert_eq!(html, "use <code>x &lt; y</code> here");
    }

    #[test]
    fn links_converted() {
        assert_eq!(
            markdown_to_html("[SAT](https://example.com/sat)"),
            r#"<a href="https://example.com/sat">SAT</a>"#
        );
    }

    #[test]
    fn link_url_with_underscores_survives() {
        assert_eq!(
            markdown_to_html("[x](https://a.io/b_c_d)"),
            r#"<a href="https://a.io/b_c_d">x</a>"#
        );
    }

    #[test]
    fn link_url_is_escaped() {
        assert_eq!(
            markdown_to_html("[q](https://a.io/?x=1&y=2)"),
            r#"<a href="https://a.io/?x=1&amp;y=2">q</a>"#
        );
    }

    #[test]
    fn unpaired_asterisk_left_alone() {
        assert_eq!(markdown_to_html("2 * 3 = 6"), "2 * 3 = 6");
    }
}

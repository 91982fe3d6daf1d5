use crate::tools::tool::{Tool, ToolDefinition, ToolParameter};
use std::collections::HashMap;

/// Tool converting a markdown fragment to HTML.
///
/// Covers the subset that shows up in model answers: ATX headings, bold,
/// italics, inline and fenced code, unordered lists, links, and paragraphs.
/// Text content is HTML-escaped before any tags are emitted.
pub struct MarkdownTool;

impl Tool for MarkdownTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "format_markdown_to_html".to_string(),
            description: "Convert markdown text to HTML.".to_string(),
            parameters: vec![ToolParameter::new("text", "string - markdown content")],
        }
    }

    fn run(&self, args: &HashMap<String, String>) -> String {
        let text = args.get("text").map(String::as_str).unwrap_or("");
        markdown_to_html(text)
    }
}

fn markdown_to_html(text: &str) -> String {
    let mut html: Vec<String> = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();
    let mut list_items: Vec<String> = Vec::new();
    let mut code_lines: Vec<String> = Vec::new();
    let mut in_code = false;

    for line in text.lines() {
        if in_code {
            if line.trim() == "```" {
                flush_code(&mut html, &mut code_lines);
                in_code = false;
            } else {
                code_lines.push(line.to_string());
            }
            continue;
        }

        let stripped = line.trim();
        if stripped.starts_with("```") {
            flush_paragraph(&mut html, &mut paragraph);
            flush_list(&mut html, &mut list_items);
            in_code = true;
            continue;
        }
        if stripped.is_empty() {
            flush_paragraph(&mut html, &mut paragraph);
            flush_list(&mut html, &mut list_items);
            continue;
        }

        let level = stripped.chars().take_while(|&c| c == '#').count();
        if (1..=6).contains(&level) && stripped[level..].starts_with(' ') {
            flush_paragraph(&mut html, &mut paragraph);
            flush_list(&mut html, &mut list_items);
            let content = stripped[level + 1..].trim_start();
            html.push(format!("<h{0}>{1}</h{0}>", level, render_inline(content)));
            continue;
        }

        if let Some(item) = stripped.strip_prefix("- ").or_else(|| stripped.strip_prefix("* ")) {
            flush_paragraph(&mut html, &mut paragraph);
            list_items.push(render_inline(item));
            continue;
        }

        flush_list(&mut html, &mut list_items);
        paragraph.push(stripped.to_string());
    }

    if in_code {
        flush_code(&mut html, &mut code_lines);
    }
    flush_paragraph(&mut html, &mut paragraph);
    flush_list(&mut html, &mut list_items);

    html.join("\n")
}

fn flush_paragraph(html: &mut Vec<String>, paragraph: &mut Vec<String>) {
    if !paragraph.is_empty() {
        html.push(format!("<p>{}</p>", render_inline(&paragraph.join(" "))));
        paragraph.clear();
    }
}

fn flush_list(html: &mut Vec<String>, items: &mut Vec<String>) {
    if !items.is_empty() {
        let body = items
            .iter()
            .map(|item| format!("<li>{}</li>", item))
            .collect::<Vec<_>>()
            .join("");
        html.push(format!("<ul>{}</ul>", body));
        items.clear();
    }
}

fn flush_code(html: &mut Vec<String>, lines: &mut Vec<String>) {
    html.push(format!("<pre><code>{}</code></pre>", escape_html(&lines.join("\n"))));
    lines.clear();
}

/// Applies inline markup to already-block-split text. Unmatched markers and
/// emphasis spans touching whitespace stay literal.
fn render_inline(text: &str) -> String {
    let escaped = escape_html(text);
    let mut out = String::with_capacity(escaped.len());
    let mut rest: &str = &escaped;

    loop {
        let Some(pos) = rest.find(&['`', '*', '['][..]) else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match render_marker(tail) {
            Some((rendered, consumed)) => {
                out.push_str(&rendered);
                rest = &tail[consumed..];
            }
            None => {
                let marker_len = tail.chars().next().map(char::len_utf8).unwrap_or(1);
                out.push_str(&tail[..marker_len]);
                rest = &tail[marker_len..];
            }
        }
    }
    out
}

fn render_marker(tail: &str) -> Option<(String, usize)> {
    if let Some(rest) = tail.strip_prefix("**") {
        let close = rest.find("**")?;
        let body = &rest[..close];
        if body.is_empty() || body.starts_with(' ') || body.ends_with(' ') {
            return None;
        }
        return Some((format!("<strong>{}</strong>", body), 2 + close + 2));
    }
    if let Some(rest) = tail.strip_prefix('*') {
        let close = rest.find('*')?;
        let body = &rest[..close];
        if body.is_empty() || body.starts_with(' ') || body.ends_with(' ') {
            return None;
        }
        return Some((format!("<em>{}</em>", body), 1 + close + 1));
    }
    if let Some(rest) = tail.strip_prefix('`') {
        let close = rest.find('`')?;
        return Some((format!("<code>{}</code>", &rest[..close]), 1 + close + 1));
    }
    if let Some(rest) = tail.strip_prefix('[') {
        let label_end = rest.find("](")?;
        let after_label = &rest[label_end + 2..];
        let url_end = after_label.find(')')?;
        let label = &rest[..label_end];
        let url = &after_label[..url_end];
        return Some((
            format!("<a href=\"{}\">{}</a>", url, label),
            1 + label_end + 2 + url_end + 1,
        ));
    }
    None
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(text: &str) -> String {
        let mut args = HashMap::new();
        args.insert("text".to_string(), text.to_string());
        MarkdownTool.run(&args)
    }

    #[test]
    fn test_definition() {
        let definition = MarkdownTool.definition();
        assert_eq!(definition.name, "format_markdown_to_html");
        assert_eq!(definition.parameters[0].name, "text");
    }

    #[test]
    fn test_headings() {
        assert_eq!(convert("# Title"), "<h1>Title</h1>");
        assert_eq!(convert("### Sub"), "<h3>Sub</h3>");
    }

    #[test]
    fn test_seven_hashes_is_not_a_heading() {
        assert_eq!(convert("####### nope"), "<p>####### nope</p>");
    }

    #[test]
    fn test_paragraph_with_inline_markup() {
        assert_eq!(
            convert("This **bold** and *em* and `code`."),
            "<p>This <strong>bold</strong> and <em>em</em> and <code>code</code>.</p>"
        );
    }

    #[test]
    fn test_link() {
        assert_eq!(
            convert("See [docs](https://example.com/guide)."),
            "<p>See <a href=\"https://example.com/guide\">docs</a>.</p>"
        );
    }

    #[test]
    fn test_unordered_list() {
        assert_eq!(convert("- one\n- two"), "<ul><li>one</li><li>two</li></ul>");
        assert_eq!(convert("* one\n* two"), "<ul><li>one</li><li>two</li></ul>");
    }

    #[test]
    fn test_adjacent_lines_join_into_one_paragraph() {
        assert_eq!(convert("line one\nline two"), "<p>line one line two</p>");
    }

    #[test]
    fn test_blank_line_splits_paragraphs() {
        assert_eq!(convert("first\n\nsecond"), "<p>first</p>\n<p>second</p>");
    }

    #[test]
    fn test_fenced_code_is_escaped() {
        assert_eq!(
            convert("```\n<script>alert(1)</script>\n```"),
            "<pre><code>&lt;script&gt;alert(1)&lt;/script&gt;</code></pre>"
        );
    }

    #[test]
    fn test_prose_is_escaped() {
        assert_eq!(convert("a < b & c"), "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn test_stray_asterisk_stays_literal() {
        assert_eq!(convert("2 * 3 = 6"), "<p>2 * 3 = 6</p>");
    }

    #[test]
    fn test_mixed_document() {
        let html = convert("# Plan\n\nSteps to follow:\n\n- read `input`\n- **write** output");
        assert_eq!(
            html,
            "<h1>Plan</h1>\n<p>Steps to follow:</p>\n<ul><li>read <code>input</code></li><li><strong>write</strong> output</li></ul>"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(convert(""), "");
    }
}

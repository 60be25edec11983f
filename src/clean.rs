use once_cell::sync::Lazy;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

static BODY_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

/// Subtrees whose text is never visible. `noscript` is included because the
/// parser runs with scripting enabled and keeps its content as raw markup.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript"];

// ── Public API ───────────────────────────────────────────────────────────────

/// Serialized `<body>` element, or an empty string when there is none.
pub fn extract_body(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .select(&BODY_SEL)
        .next()
        .map(|body| body.html())
        .unwrap_or_default()
}

/// Visible text of `body`, one trimmed non-blank line per text line.
pub fn clean_body(body: &str) -> String {
    if body.trim().is_empty() {
        return String::new();
    }

    let document = Html::parse_document(body);
    let root = document
        .select(&BODY_SEL)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut parts = Vec::new();
    collect_visible_text(root, &mut parts);

    parts
        .join("\n")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn clean_html(html: &str) -> String {
    clean_body(&extract_body(html))
}

// ── DOM walk ─────────────────────────────────────────────────────────────────

fn collect_visible_text(el: ElementRef<'_>, parts: &mut Vec<String>) {
    if HIDDEN_TAGS.contains(&el.value().name()) {
        return;
    }
    for child in el.children() {
        match child.value() {
            Node::Text(text) => parts.push((&*text.text).to_string()),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_visible_text(child_el, parts);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_scripts_and_styles() {
        let html = r#"<html><head><title>T</title></head><body>
            <style>.a { color: red }</style>
            <p>Hello World</p>
            <script>var ignored = 1;</script>
        </body></html>"#;
        assert_eq!(clean_html(html), "Hello World");
    }

    #[test]
    fn trims_lines_and_drops_blank_ones() {
        let html = "<body><div>\n   first  \n\n\t</div><ul><li>  second</li><li>third  </li></ul></body>";
        let cleaned = clean_html(html);
        assert_eq!(cleaned, "first\nsecond\nthird");
        for line in cleaned.lines() {
            assert_eq!(line, line.trim());
            assert!(!line.is_empty());
        }
    }

    #[test]
    fn adjacent_text_nodes_land_on_separate_lines() {
        let html = "<body><p>Price: <b>10</b> EUR</p></body>";
        assert_eq!(clean_html(html), "Price:\n10\nEUR");
    }

    #[test]
    fn head_text_is_excluded() {
        let html = "<html><head><title>Title only</title></head><body><h1>Heading</h1></body></html>";
        assert_eq!(clean_html(html), "Heading");
    }

    #[test]
    fn extract_body_returns_serialized_body() {
        let body = extract_body("<html><body><p>x</p></body></html>");
        assert!(body.starts_with("<body>"));
        assert!(body.contains("<p>x</p>"));
    }

    #[test]
    fn empty_or_hidden_input_yields_empty_text() {
        assert_eq!(clean_html(""), "");
        assert_eq!(clean_body(""), "");
        assert_eq!(clean_html("just text"), "just text");
        assert_eq!(clean_html("<script>only()</script>"), "");
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(clean_html("<body><p>Fish &amp; Chips</p></body>"), "Fish & Chips");
    }
}

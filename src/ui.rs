// ── Layout ───────────────────────────────────────────────────────────────────

const TITLE: &str = "AI Web Scraper";

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem}\
input[type=url],textarea{width:100%;box-sizing:border-box;font:inherit;padding:.4rem}\
button{margin-top:.5rem;padding:.4rem 1rem}\
.success{color:#1b5e20}.error{color:#b71c1c}.warning{color:#e65100}.info{color:#0d47a1}\
pre{white-space:pre-wrap;background:#f5f5f5;padding:1rem}";

pub enum Notice {
    Success(String),
    Warning(String),
    Error { message: String, hint: String },
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{TITLE}</title>\
         <style>{STYLE}</style></head><body><h1>{TITLE}</h1>{body}</body></html>"
    )
}

fn scrape_form(url: &str) -> String {
    format!(
        "<form method=\"post\" action=\"/scrape\">\
         <label for=\"url\">Enter Website URL</label>\
         <input type=\"url\" id=\"url\" name=\"url\" value=\"{}\">\
         <button type=\"submit\">Scrape Website</button></form>",
        escape(url)
    )
}

fn notice(n: &Notice) -> String {
    match n {
        Notice::Success(msg) => format!("<p class=\"success\">{}</p>", escape(msg)),
        Notice::Warning(msg) => format!("<p class=\"warning\">{}</p>", escape(msg)),
        Notice::Error { message, hint } => format!(
            "<p class=\"error\">{}</p><p class=\"info\">{}</p>",
            escape(message),
            escape(hint)
        ),
    }
}

/// Collapsible viewer for the cleaned text plus the description form that
/// resubmits it.
fn content_section(url: &str, content: &str, description: &str) -> String {
    format!(
        "<details><summary>View DOM Content</summary>\
         <textarea readonly rows=\"15\">{content}</textarea></details>\
         <form method=\"post\" action=\"/parse\">\
         <input type=\"hidden\" name=\"url\" value=\"{url}\">\
         <input type=\"hidden\" name=\"content\" value=\"{content}\">\
         <label for=\"description\">Describe what you want to parse</label>\
         <textarea id=\"description\" name=\"description\" rows=\"4\">{description}</textarea>\
         <button type=\"submit\">Parse Content</button></form>",
        url = escape(url),
        content = escape(content),
        description = escape(description),
    )
}

// ── Pages ────────────────────────────────────────────────────────────────────

pub fn index_page() -> String {
    layout(&scrape_form(""))
}

/// Scrape page: form, an optional notice, and the content section when a
/// scrape has produced text.
pub fn scrape_page(url: &str, flash: Option<&Notice>, content: Option<&str>) -> String {
    let mut body = scrape_form(url);
    if let Some(n) = flash {
        body.push_str(&notice(n));
    }
    if let Some(content) = content {
        body.push_str(&content_section(url, content, ""));
    }
    layout(&body)
}

pub fn parse_page(
    url: &str,
    content: &str,
    description: &str,
    flash: Option<&Notice>,
    result: Option<&str>,
) -> String {
    let mut body = scrape_form(url);
    body.push_str(&content_section(url, content, description));
    if let Some(n) = flash {
        body.push_str(&notice(n));
    }
    if let Some(result) = result {
        body.push_str(&format!("<h2>Parsed Result</h2><pre>{}</pre>", escape(result)));
    }
    layout(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn index_has_url_field_and_scrape_action() {
        let page = index_page();
        assert!(page.contains("action=\"/scrape\""));
        assert!(page.contains("name=\"url\""));
        assert!(page.contains("Scrape Website"));
        assert!(!page.contains("Parse Content"));
    }

    #[test]
    fn scraped_content_is_escaped_in_viewer_and_hidden_field() {
        let page = scrape_page(
            "https://example.com",
            Some(&Notice::Success("Website scraped successfully!".into())),
            Some("<b>bold</b>"),
        );
        assert!(page.contains("<details>"));
        assert!(page.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(!page.contains("<b>bold</b>"));
        assert!(page.contains("Parse Content"));
    }

    #[test]
    fn errors_render_message_and_hint() {
        let page = scrape_page(
            "bad",
            Some(&Notice::Error {
                message: "boom".into(),
                hint: "try again".into(),
            }),
            None,
        );
        assert!(page.contains("class=\"error\">boom"));
        assert!(page.contains("class=\"info\">try again"));
        assert!(!page.contains("<details>"));
    }

    #[test]
    fn parse_page_shows_result_as_plain_text() {
        let page = parse_page("u", "c", "d", None, Some("a < b"));
        assert!(page.contains("<pre>a &lt; b</pre>"));
    }
}

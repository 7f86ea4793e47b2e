//! Page analysis
//!
//! Reduces raw HTML to the inputs the signal scorers consume: normalized
//! visible text, the tag-name skeleton and a bag of attribute values.
//! Parsing happens entirely inside this module; `scraper::Html` is not
//! `Send` and must never be held across an await point.

use ego_tree::NodeRef;
use once_cell::sync::Lazy;
use scraper::{Html, Node, Selector};

/// Upper bound on the tag skeleton so pathological pages stay cheap to diff.
const MAX_SKELETON_TAGS: usize = 600;

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());

/// Scorer-ready view of a fetched page.
#[derive(Debug, Clone, Default)]
pub struct PageAnalysis {
    /// Visible text, lowercased, whitespace collapsed.
    pub text: String,
    /// Tag names in document order, scripts/styles excluded.
    pub tags: Vec<String>,
    /// Attribute values, lowercased, whitespace collapsed.
    pub attr_text: String,
    /// Normalized `<title>` content.
    pub title: String,
}

/// Parse and reduce a page.
pub fn analyze(html: &str) -> PageAnalysis {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| normalize_text(&el.text().collect::<String>()))
        .unwrap_or_default();

    let mut raw_text = String::new();
    let mut raw_attrs = String::new();
    let mut tags = Vec::new();
    walk(document.tree.root(), &mut raw_text, &mut raw_attrs, &mut tags);

    PageAnalysis {
        text: normalize_text(&raw_text),
        tags,
        attr_text: normalize_text(&raw_attrs),
        title,
    }
}

/// Lowercase and collapse all whitespace runs to single spaces.
pub fn normalize_text(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn walk(
    node: NodeRef<'_, Node>,
    text: &mut String,
    attrs: &mut String,
    tags: &mut Vec<String>,
) {
    match node.value() {
        Node::Element(element) => {
            let name = element.name();
            if matches!(name, "script" | "style" | "noscript") {
                return;
            }
            if tags.len() < MAX_SKELETON_TAGS {
                tags.push(name.to_string());
            }
            for (_, value) in element.attrs() {
                attrs.push_str(value);
                attrs.push(' ');
            }
            for child in node.children() {
                walk(child, text, attrs, tags);
            }
        }
        Node::Text(content) => {
            text.push_str(&content.text);
            text.push(' ');
        }
        _ => {
            for child in node.children() {
                walk(child, text, attrs, tags);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <html>
          <head>
            <title>  ComBank   Digital  </title>
            <style>body { color: red; }</style>
          </head>
          <body>
            <h1>Secure   Login</h1>
            <form action="/login" class="login-form">
              <input type="text" name="username">
            </form>
            <script>console.log("tracking");</script>
          </body>
        </html>
    "#;

    #[test]
    fn test_visible_text_skips_scripts_and_styles() {
        let analysis = analyze(SAMPLE);
        assert!(analysis.text.contains("secure login"));
        assert!(!analysis.text.contains("tracking"));
        assert!(!analysis.text.contains("color: red"));
    }

    #[test]
    fn test_tag_skeleton_in_document_order() {
        let analysis = analyze(SAMPLE);
        let skeleton: Vec<&str> = analysis.tags.iter().map(String::as_str).collect();
        assert_eq!(
            skeleton,
            vec!["html", "head", "title", "body", "h1", "form", "input"]
        );
    }

    #[test]
    fn test_attributes_collected() {
        let analysis = analyze(SAMPLE);
        assert!(analysis.attr_text.contains("/login"));
        assert!(analysis.attr_text.contains("login-form"));
        assert!(analysis.attr_text.contains("username"));
    }

    #[test]
    fn test_title_normalized() {
        let analysis = analyze(SAMPLE);
        assert_eq!(analysis.title, "combank digital");
    }

    #[test]
    fn test_empty_document() {
        let analysis = analyze("");
        assert!(analysis.text.is_empty());
        assert!(analysis.title.is_empty());
        // html5ever always synthesizes the html/head/body shell
        assert!(analysis.tags.contains(&"html".to_string()));
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Hello\n\tWORLD  "), "hello world");
        assert_eq!(normalize_text(""), "");
    }
}

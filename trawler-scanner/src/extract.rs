use crate::error::{Result, ScanError};
use scraper::{Html, Node, Selector};

/// The raw references a page exposes, before any resolution or scoping.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    /// `<base href>`, if the page declares one
    pub base_href: Option<String>,
    pub comments: Vec<String>,
    pub anchors: Vec<String>,
    pub images: Vec<String>,
    pub scripts: Vec<String>,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScanError::ParseError(format!("selector {}: {:?}", css, e)))
}

/// Parse an HTML document into its comments, anchor targets, image sources
/// and script sources. Malformed markup is handled by the HTML5 parser's own
/// error recovery.
pub fn parse_html(html: &str) -> Result<ParsedPage> {
    let document = Html::parse_document(html);

    let base_selector = selector("base[href]")?;
    let link_selector = selector("a[href]")?;
    let image_selector = selector("img[src]")?;
    let script_selector = selector("script[src]")?;

    let base_href = document
        .select(&base_selector)
        .next()
        .and_then(|e| e.value().attr("href"))
        .map(str::to_string);

    let comments = document
        .tree
        .nodes()
        .filter_map(|node| match node.value() {
            Node::Comment(comment) => {
                let text = comment.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            _ => None,
        })
        .collect();

    let attrs = |sel: &Selector, name: &str| -> Vec<String> {
        document
            .select(sel)
            .filter_map(|e| e.value().attr(name))
            .map(str::to_string)
            .collect()
    };

    Ok(ParsedPage {
        base_href,
        comments,
        anchors: attrs(&link_selector, "href"),
        images: attrs(&image_selector, "src"),
        scripts: attrs(&script_selector, "src"),
    })
}

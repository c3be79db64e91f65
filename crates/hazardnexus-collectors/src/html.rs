//! Link discovery in bulletin pages

use hazardnexus_core::{Error, Result};
use regex::Regex;
use url::Url;

const PRIMARY_ID: &str = "default-block-btn";
const FALLBACK_TEXT: &str = "all india weather forecast bulletin";
const FALLBACK_HREF: &str = "all_india_forcast_bulletin";

/// One `<a>` element with an href
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub id: Option<String>,
    pub href: String,
    /// Visible text, tags stripped and whitespace collapsed
    pub text: String,
}

/// Anchor extraction using regex patterns
///
/// Pages are small, server-rendered and only ever searched for links, so a
/// full DOM is not built.
pub struct LinkScanner {
    anchor_regex: Regex,
    attribute_regex: Regex,
    tag_regex: Regex,
}

impl LinkScanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            anchor_regex: Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>")
                .map_err(|e| Error::internal(format!("Failed to compile anchor regex: {}", e)))?,
            attribute_regex: Regex::new(
                r#"(?i)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#,
            )
            .map_err(|e| Error::internal(format!("Failed to compile attribute regex: {}", e)))?,
            tag_regex: Regex::new(r"(?s)<[^>]*>")
                .map_err(|e| Error::internal(format!("Failed to compile tag regex: {}", e)))?,
        })
    }

    /// Every anchor that carries an href, in document order
    pub fn anchors(&self, page: &str) -> Vec<Anchor> {
        self.anchor_regex
            .captures_iter(page)
            .filter_map(|caps| {
                let attributes = caps.get(1)?.as_str();
                let inner = caps.get(2).map_or("", |m| m.as_str());

                let mut id = None;
                let mut href = None;
                for attr in self.attribute_regex.captures_iter(attributes) {
                    let value = attr
                        .get(2)
                        .or_else(|| attr.get(3))
                        .or_else(|| attr.get(4))
                        .map_or("", |m| m.as_str());
                    match attr[1].to_ascii_lowercase().as_str() {
                        "id" if id.is_none() => id = Some(value.to_string()),
                        "href" if href.is_none() => href = Some(value.replace("&amp;", "&")),
                        _ => {}
                    }
                }

                let text = self.tag_regex.replace_all(inner, " ");
                Some(Anchor {
                    id,
                    href: href?,
                    text: text.split_whitespace().collect::<Vec<_>>().join(" "),
                })
            })
            .collect()
    }

    /// Bulletin document link: the primary button if it points at a PDF,
    /// otherwise the first link whose text or href names the bulletin.
    pub fn bulletin_link(&self, page: &str) -> Option<String> {
        let anchors = self.anchors(page);

        let primary = anchors
            .iter()
            .find(|a| a.id.as_deref() == Some(PRIMARY_ID))
            .filter(|a| a.href.to_lowercase().contains("pdf"));
        if let Some(primary) = primary {
            return Some(primary.href.clone());
        }

        anchors
            .into_iter()
            .find(|a| a.text.to_lowercase().contains(FALLBACK_TEXT) || a.href.contains(FALLBACK_HREF))
            .map(|a| a.href)
    }

    /// First link whose href mentions `.pdf`, ignoring case
    pub fn pdf_link(&self, page: &str) -> Option<String> {
        self.anchors(page)
            .into_iter()
            .find(|a| a.href.to_lowercase().contains(".pdf"))
            .map(|a| a.href)
    }
}

/// Resolve a possibly relative link against a site base
pub fn resolve_link(base: &str, link: &str) -> Result<String> {
    let link = link.trim();
    if let Ok(absolute) = Url::parse(link) {
        return Ok(absolute.to_string());
    }

    let base = Url::parse(base).map_err(|e| Error::config(format!("invalid base URL {base}: {e}")))?;
    base.join(link)
        .map(|u| u.to_string())
        .map_err(|e| Error::parse(format!("cannot resolve link {link}: {e}")))
}

use html_escape::decode_html_entities;
use tracing::warn;

use crate::app::{Result, ThicketError};
use crate::domain::Item;

/// Decodes raw response bodies from the item API into domain values.
#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Decode an `item/{id}.json` body. The upstream answers `null` for ids
    /// that do not exist. A body describing some other item is rejected so it
    /// cannot stand in for one that is already shown.
    pub fn normalize_item(&self, id: i64, body: &[u8]) -> Result<Item> {
        let item: Option<Item> = serde_json::from_slice(body)?;
        let mut item = item.ok_or(ThicketError::NotFound(id))?;

        if item.id != id {
            warn!(requested = id, received = item.id, "Item id mismatch");
            return Err(ThicketError::IdMismatch {
                requested: id,
                received: item.id,
            });
        }

        item.title = item
            .title
            .map(|t| decode_html_entities(&t).to_string());

        Ok(item)
    }

    /// Decode a `{feed}.json` body: a JSON array of item ids.
    pub fn normalize_id_list(&self, body: &[u8]) -> Result<Vec<i64>> {
        let ids: Option<Vec<i64>> = serde_json::from_slice(body)?;
        Ok(ids.unwrap_or_default())
    }
}

/// Render upstream comment HTML as plain text for the terminal.
///
/// Paragraph tags become blank lines and entities are decoded. Every other
/// tag is dropped, keeping its text.
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('>') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let tag = &rest[start + 1..start + end];
        let name = tag
            .trim_start_matches('/')
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase();
        match name.as_str() {
            "p" if !tag.starts_with('/') => out.push_str("\n\n"),
            "br" => out.push('\n'),
            _ => {}
        }
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);

    decode_html_entities(out.trim()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORY: &str = r#"{"by":"dhouston","descendants":71,"id":8863,
        "kids":[9224,8917,8884],"score":104,"time":1175714200,
        "title":"My YC app: Dropbox &amp; friends","type":"story",
        "url":"http://www.getdropbox.com/u/2/screencast.html"}"#;

    #[test]
    fn test_normalize_item() {
        let item = Normalizer::new()
            .normalize_item(8863, STORY.as_bytes())
            .unwrap();

        assert_eq!(item.id, 8863);
        assert_eq!(item.title.as_deref(), Some("My YC app: Dropbox & friends"));
        assert_eq!(item.child_ids, vec![9224, 8917, 8884]);
        assert_eq!(item.descendants, Some(71));
    }

    #[test]
    fn test_null_item_is_not_found() {
        let err = Normalizer::new().normalize_item(42, b"null").unwrap_err();
        assert!(matches!(err, ThicketError::NotFound(42)));
    }

    #[test]
    fn test_malformed_item_is_parse_error() {
        let err = Normalizer::new()
            .normalize_item(1, b"{\"id\": 1,")
            .unwrap_err();
        assert!(matches!(err, ThicketError::Parse(_)));

        let err = Normalizer::new()
            .normalize_item(1, b"{\"title\": \"no id\"}")
            .unwrap_err();
        assert!(matches!(err, ThicketError::Parse(_)));
    }

    #[test]
    fn test_mismatched_id_is_rejected() {
        let err = Normalizer::new()
            .normalize_item(2, br#"{"id":1,"title":"other"}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ThicketError::IdMismatch {
                requested: 2,
                received: 1
            }
        ));
    }

    #[test]
    fn test_normalize_id_list() {
        let normalizer = Normalizer::new();
        assert_eq!(
            normalizer.normalize_id_list(b"[3, 1, 2]").unwrap(),
            vec![3, 1, 2]
        );
        assert!(normalizer.normalize_id_list(b"null").unwrap().is_empty());
        assert!(normalizer.normalize_id_list(b"{}").is_err());
    }

    #[test]
    fn test_html_to_text() {
        let html = "First line<p>Second &amp; <i>third</i><p>See <a href=\"https://x.org\">https://x.org</a>";
        assert_eq!(
            html_to_text(html),
            "First line\n\nSecond & third\n\nSee https://x.org"
        );
    }

    #[test]
    fn test_html_to_text_unclosed_tag() {
        assert_eq!(html_to_text("a < b"), "a < b");
    }
}

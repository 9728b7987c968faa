use serde_json::Value;
use thiserror::Error;

use super::PhotoRecord;

/// The expected `photos.*` structure was not in the response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Key not found: {0}")]
pub struct ParseError(pub &'static str);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPage {
    pub items: Vec<PhotoRecord>,
    pub pages: u64,
    pub per_page: u64,
}

impl ResultPage {
    /// Non-object entries become empty records so positions stay aligned.
    pub fn parse(raw: &Value) -> Result<Self, ParseError> {
        let photos = raw.get("photos").ok_or(ParseError("photos"))?;

        let pages = photos
            .get("pages")
            .and_then(as_count)
            .ok_or(ParseError("photos.pages"))?;
        let per_page = photos
            .get("perpage")
            .and_then(as_count)
            .ok_or(ParseError("photos.perpage"))?;

        let items = photos
            .get("photo")
            .and_then(Value::as_array)
            .ok_or(ParseError("photos.photo"))?
            .iter()
            .map(|item| match item {
                Value::Object(fields) => PhotoRecord::new(fields.clone()),
                _ => PhotoRecord::default(),
            })
            .collect();

        Ok(Self {
            items,
            pages,
            per_page,
        })
    }

    /// `pages * per_page`. Overcounts when the last page is partial.
    pub fn estimated_available(&self) -> u64 {
        self.pages.saturating_mul(self.per_page)
    }

    pub fn urls(&self) -> Vec<Option<String>> {
        self.items.iter().map(PhotoRecord::file_url).collect()
    }
}

// Flickr is not consistent about numbers vs numeric strings.
fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_metadata_and_items() {
        let raw = json!({
            "photos": {
                "page": 1,
                "pages": 3,
                "perpage": 2,
                "total": "6",
                "photo": [
                    {"farm": 5, "id": "1", "secret": "a", "server": "10"},
                    {"farm": 8, "id": "2", "secret": "b", "server": "20"},
                ],
            },
            "stat": "ok",
        });

        let page = ResultPage::parse(&raw).unwrap();
        assert_eq!(page.pages, 3);
        assert_eq!(page.per_page, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.estimated_available(), 6);
    }

    #[test]
    fn accepts_numeric_strings() {
        let raw = json!({"photos": {"pages": "4", "perpage": "100", "photo": []}});

        let page = ResultPage::parse(&raw).unwrap();
        assert_eq!(page.estimated_available(), 400);
    }

    #[test]
    fn empty_photo_list_is_valid() {
        let raw = json!({"photos": {"pages": 0, "perpage": 100, "photo": []}});

        let page = ResultPage::parse(&raw).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.estimated_available(), 0);
    }

    #[test]
    fn missing_keys_are_reported() {
        let cases = [
            (json!({"stat": "ok"}), "photos"),
            (json!({"photos": {"perpage": 1, "photo": []}}), "photos.pages"),
            (json!({"photos": {"pages": 1, "photo": []}}), "photos.perpage"),
            (json!({"photos": {"pages": 1, "perpage": 1}}), "photos.photo"),
        ];

        for (raw, key) in cases {
            assert_eq!(ResultPage::parse(&raw), Err(ParseError(key)));
        }
    }

    #[test]
    fn bad_record_keeps_its_slot() {
        let raw = json!({
            "photos": {
                "pages": 1,
                "perpage": 3,
                "photo": [
                    {"farm": 5, "id": "1", "secret": "a", "server": "10"},
                    {"farm": 5, "id": "2", "server": "10"},
                    "garbage",
                ],
            },
        });

        let urls = ResultPage::parse(&raw).unwrap().urls();
        assert_eq!(urls.len(), 3);
        assert!(urls[0].is_some());
        assert_eq!(urls[1], None);
        assert_eq!(urls[2], None);
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::error;

/// Raw search result entry. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoRecord {
    fields: Map<String, Value>,
}

impl PhotoRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    // Null, arrays and objects count as missing.
    pub fn field(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(value) => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            Value::Bool(value) => Some(value.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Medium-size static URL, `None` if a required key is missing.
    pub fn file_url(&self) -> Option<String> {
        let require = |key: &str| {
            let value = self.field(key);
            if value.is_none() {
                error!(key, record = ?self.fields, "key not found in photo record");
            }
            value
        };

        let farm = require("farm")?;
        let server = require("server")?;
        let id = require("id")?;
        let secret = require("secret")?;

        Some(format!(
            "https://farm{farm}.staticflickr.com/{server}/{id}_{secret}_m.jpg"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> PhotoRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn builds_url_from_complete_record() {
        let photo = record(json!({
            "farm": 5,
            "id": "46944690811",
            "secret": "3535fb688d",
            "server": "4865",
            "title": "Weigh",
        }));

        assert_eq!(
            photo.file_url().as_deref(),
            Some("https://farm5.staticflickr.com/4865/46944690811_3535fb688d_m.jpg")
        );
    }

    #[test]
    fn missing_field_yields_none() {
        for missing in ["farm", "server", "id", "secret"] {
            let mut fields = json!({
                "farm": 5,
                "id": "46944690811",
                "secret": "3535fb688d",
                "server": "4865",
            });
            fields.as_object_mut().unwrap().remove(missing);

            assert_eq!(record(fields).file_url(), None, "without {missing}");
        }
    }

    #[test]
    fn null_field_counts_as_missing() {
        let photo = record(json!({
            "farm": null,
            "id": "1",
            "secret": "s",
            "server": "2",
        }));

        assert_eq!(photo.file_url(), None);
    }

    #[test]
    fn oddly_typed_scalar_still_renders() {
        let photo = record(json!({
            "farm": "wrong_type",
            "id": "1",
            "secret": "s",
            "server": 2,
        }));

        assert_eq!(
            photo.file_url().as_deref(),
            Some("https://farmwrong_type.staticflickr.com/2/1_s_m.jpg")
        );
    }
}

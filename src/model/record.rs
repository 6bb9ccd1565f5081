//! Item records produced by the content fetcher

use crate::FetchError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Projection of one fetched archive document
///
/// Every field is optional: `None` means the source response did not carry
/// the field. That is different from [`ItemRecord::Placeholder`], which means
/// the document could not be fetched at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Job name the document was collected under
    pub name: Option<String>,

    /// `item.library_of_congress_control_number`
    pub control_number: Option<String>,

    /// `item.date`
    pub date: Option<String>,

    /// First entry of `item.location_city`
    pub city: Option<String>,

    /// First entry of `item.location_state`
    pub state: Option<String>,

    /// Top-level `full_text`
    pub text: Option<String>,
}

impl Document {
    /// Extracts a document from a detail endpoint response
    ///
    /// Missing or empty nested fields become `None`. A response that is not a
    /// JSON object, or whose `item` is present but not an object, is
    /// malformed.
    ///
    /// # Arguments
    ///
    /// * `url` - The detail URL, used in error messages
    /// * `body` - The decoded response body
    /// * `name` - Job name stamped onto the document
    pub fn from_detail(url: &str, body: &Value, name: Option<&str>) -> Result<Self, FetchError> {
        let top = body.as_object().ok_or_else(|| FetchError::Malformed {
            url: url.to_string(),
            message: "detail response is not a JSON object".to_string(),
        })?;

        let item = match top.get("item") {
            None | Some(Value::Null) => None,
            Some(Value::Object(item)) => Some(item),
            Some(_) => {
                return Err(FetchError::Malformed {
                    url: url.to_string(),
                    message: "`item` is not an object".to_string(),
                })
            }
        };

        let item_field = |key: &str| item.and_then(|item| item.get(key));

        Ok(Self {
            name: name.map(str::to_string),
            control_number: item_field("library_of_congress_control_number").and_then(text_of),
            date: item_field("date").and_then(text_of),
            city: item_field("location_city").and_then(first_of),
            state: item_field("location_state").and_then(first_of),
            text: top.get("full_text").and_then(text_of),
        })
    }

    /// Builds the document for a listing slot recovered on retry
    pub fn recovered(full_text: Option<String>, name: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            text: full_text,
            ..Self::default()
        }
    }
}

/// One output slot of a content fetch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemRecord {
    /// The document was fetched; individual fields may still be absent
    Document(Document),

    /// The document could not be fetched; every field is a missing value
    Placeholder,
}

impl ItemRecord {
    /// Returns true for the missing-value placeholder
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    /// Returns the document, if one was fetched
    pub fn document(&self) -> Option<&Document> {
        match self {
            Self::Document(doc) => Some(doc),
            Self::Placeholder => None,
        }
    }
}

impl From<Document> for ItemRecord {
    fn from(doc: Document) -> Self {
        Self::Document(doc)
    }
}

/// Reads a scalar JSON value as text
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads the first element of a non-empty JSON array as text
fn first_of(value: &Value) -> Option<String> {
    value.as_array()?.first().and_then(text_of)
}

use serde_json::{Map, Value};
use std::sync::Arc;

/// Extracts a human readable message from the text of an error body.
pub trait ErrorAdapter {
    fn adapt(&self, raw: &str) -> Result<String, ParseError>;
}

impl<F> ErrorAdapter for F
where
    F: Fn(&str) -> Result<String, ParseError>,
{
    fn adapt(&self, raw: &str) -> Result<String, ParseError> {
        self(raw)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Json(serde_json::Error),
    #[error("malformed error body: {0}")]
    Malformed(String),
}

impl ParseError {
    pub fn malformed<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Self::Malformed(message.into())
    }
}

const FIELDS: [&str; 5] = ["reason", "message", "error_description", "error", "detail"];

/// Reads the message from a JSON error body.
///
/// The first configured field holding a string wins. A field holding an object
/// is searched with the same fields, which covers `{"error": {"message": ..}}`.
/// A well formed body with no such field falls back to its raw text.
#[derive(Clone, Debug)]
pub struct JsonErrorAdapter {
    fields: Arc<[String]>,
}

impl Default for JsonErrorAdapter {
    fn default() -> Self {
        Self::with_fields(FIELDS)
    }
}

impl JsonErrorAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields<I>(fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    fn find<'a>(&self, object: &'a Map<String, Value>) -> Option<&'a str> {
        self.fields
            .iter()
            .filter_map(|field| object.get(field))
            .find_map(|value| match value {
                Value::String(message) => Some(message.as_str()),
                Value::Object(object) => self.find(object),
                _ => None,
            })
    }
}

impl ErrorAdapter for JsonErrorAdapter {
    fn adapt(&self, raw: &str) -> Result<String, ParseError> {
        let value = serde_json::from_str::<Value>(raw).map_err(ParseError::Json)?;
        let message = match &value {
            Value::String(message) => Some(message.as_str()),
            Value::Object(object) => self.find(object),
            _ => None,
        };
        Ok(message.unwrap_or_else(|| raw.trim()).to_owned())
    }
}

/// Uses the whole error body as the message.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainTextErrorAdapter;

impl ErrorAdapter for PlainTextErrorAdapter {
    fn adapt(&self, raw: &str) -> Result<String, ParseError> {
        Ok(raw.trim().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorAdapter, JsonErrorAdapter, ParseError, PlainTextErrorAdapter};

    #[test]
    fn test_json_adapt() {
        let adapter = JsonErrorAdapter::new();
        assert_eq!(
            adapter.adapt(r#"{"reason":"invalid token"}"#).unwrap(),
            "invalid token",
        );
        assert_eq!(
            adapter.adapt(r#"{"code":7,"message":"quota exceeded"}"#).unwrap(),
            "quota exceeded",
        );
        assert_eq!(
            adapter
                .adapt(r#"{"error":{"code":404,"message":"No such object"}}"#)
                .unwrap(),
            "No such object",
        );
        assert_eq!(adapter.adapt(r#""gone""#).unwrap(), "gone");
    }

    #[test]
    fn test_json_adapt_field_order() {
        let adapter = JsonErrorAdapter::new();
        assert_eq!(
            adapter
                .adapt(r#"{"message":"generic","reason":"specific"}"#)
                .unwrap(),
            "specific",
        );
        // a field of the wrong type does not shadow the next one
        assert_eq!(
            adapter.adapt(r#"{"reason":42,"message":"quota exceeded"}"#).unwrap(),
            "quota exceeded",
        );
    }

    #[test]
    fn test_json_adapt_fallback() {
        let adapter = JsonErrorAdapter::new();
        assert_eq!(adapter.adapt(r#" {"code":500} "#).unwrap(), r#"{"code":500}"#);
        assert_eq!(adapter.adapt("[1,2]").unwrap(), "[1,2]");
    }

    #[test]
    fn test_json_adapt_malformed() {
        let adapter = JsonErrorAdapter::new();
        assert!(matches!(
            adapter.adapt("not json at all"),
            Err(ParseError::Json(_)),
        ));
        assert!(matches!(adapter.adapt(""), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_json_adapt_with_fields() {
        let adapter = JsonErrorAdapter::with_fields(["title"]);
        assert_eq!(adapter.fields().collect::<Vec<_>>(), ["title"]);
        assert_eq!(
            adapter
                .adapt(r#"{"message":"ignored","title":"Bad Request"}"#)
                .unwrap(),
            "Bad Request",
        );
    }

    #[test]
    fn test_plain_text_adapt() {
        assert_eq!(
            PlainTextErrorAdapter.adapt("  not json at all\n").unwrap(),
            "not json at all",
        );
    }

    #[test]
    fn test_fn_adapt() {
        let adapter = |raw: &str| {
            raw.strip_prefix("error: ")
                .map(str::to_owned)
                .ok_or_else(|| ParseError::malformed("missing prefix"))
        };
        assert_eq!(adapter.adapt("error: denied").unwrap(), "denied");
        assert_eq!(
            adapter.adapt("denied").unwrap_err().to_string(),
            "malformed error body: missing prefix",
        );
    }
}

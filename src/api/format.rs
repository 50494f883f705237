//! Body formatters
//!
//! Request bodies go through an [`InputFormatter`] before dispatch and
//! response text through an [`OutputFormatter`] after. Status codes are not
//! inspected; whatever the body parses to is what the caller gets.

use crate::error::Result;
use serde_json::Value;

pub trait InputFormatter: Send + Sync {
    fn format(&self, body: &Value) -> Result<String>;
}

pub trait OutputFormatter: Send + Sync {
    fn parse(&self, text: &str) -> Result<Value>;
}

/// JSON in both directions. The default for both slots.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatter;

impl InputFormatter for JsonFormatter {
    fn format(&self, body: &Value) -> Result<String> {
        Ok(serde_json::to_string(body)?)
    }
}

impl OutputFormatter for JsonFormatter {
    fn parse(&self, text: &str) -> Result<Value> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Passes the body text through as a JSON string.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn parse(&self, text: &str) -> Result<Value> {
        Ok(Value::String(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn test_json_output_propagates_malformed_body() {
        let result = OutputFormatter::parse(&JsonFormatter, "<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_json_input() {
        let text = JsonFormatter.format(&json!({ "message": "hi" })).unwrap();
        assert_eq!(text, r#"{"message":"hi"}"#);
    }

    #[test]
    fn test_text_output_accepts_anything() {
        assert_eq!(TextFormatter.parse("ok").unwrap(), json!("ok"));
        assert_eq!(TextFormatter.parse("").unwrap(), json!(""));
    }
}

//! Field schemas for payload validation.

use serde::{Deserialize, Serialize};

/// Supported field types for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    List,
    Object,
    Email,
    Url,
    Any,
}

impl FieldType {
    /// Checks whether a JSON value matches this field type.
    pub fn matches(&self, value: &serde_json::Value) -> bool {
        use serde_json::Value;

        match self {
            FieldType::Any => true,
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Float => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::List => value.is_array(),
            FieldType::Object => value.is_object(),
            FieldType::Email => match value {
                Value::String(s) => is_valid_email(s),
                _ => false,
            },
            FieldType::Url => match value {
                Value::String(s) => is_valid_url(s),
                _ => false,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::List => "list",
            FieldType::Object => "object",
            FieldType::Email => "email",
            FieldType::Url => "url",
            FieldType::Any => "any",
        }
    }
}

/// Basic email shape check: local part plus a dotted domain.
fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

fn is_valid_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Schema definition for a single expected field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub required: bool,
    pub field_type: FieldType,
    #[serde(default)]
    pub description: String,
}

impl FieldSchema {
    /// A required field of any type.
    pub fn required<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            required: true,
            field_type: FieldType::Any,
            description: String::new(),
        }
    }

    /// An optional field of any type.
    pub fn optional<S: Into<String>>(name: S) -> Self {
        Self {
            required: false,
            ..Self::required(name)
        }
    }

    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    pub fn description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }
}

/// Fluent helper for building validation schemas.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldSchema>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> Vec<FieldSchema> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_matching() {
        assert!(FieldType::String.matches(&json!("hello")));
        assert!(!FieldType::String.matches(&json!(42)));
        assert!(FieldType::Integer.matches(&json!(42)));
        assert!(!FieldType::Integer.matches(&json!(4.2)));
        assert!(FieldType::Float.matches(&json!(4.2)));
        assert!(FieldType::Boolean.matches(&json!(true)));
        assert!(FieldType::List.matches(&json!([1, 2])));
        assert!(FieldType::Object.matches(&json!({"a": 1})));
        assert!(FieldType::Any.matches(&json!(null)));
    }

    #[test]
    fn test_email_and_url() {
        assert!(FieldType::Email.matches(&json!("user@example.com")));
        assert!(!FieldType::Email.matches(&json!("not-an-email")));
        assert!(!FieldType::Email.matches(&json!("user@nodot")));
        assert!(FieldType::Url.matches(&json!("https://example.com")));
        assert!(!FieldType::Url.matches(&json!("ftp://example.com")));
    }

    #[test]
    fn test_schema_builder() {
        let schema = SchemaBuilder::new()
            .field(FieldSchema::required("username").field_type(FieldType::String))
            .field(FieldSchema::optional("website").field_type(FieldType::Url))
            .build();

        assert_eq!(schema.len(), 2);
        assert!(schema[0].required);
        assert!(!schema[1].required);
    }
}

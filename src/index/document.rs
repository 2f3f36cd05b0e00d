//! Document values written by [`Index::add`](super::Index::add).
//!
//! The same value encodes differently per storage type:
//!
//! | Value   | HASH                     | JSON                 |
//! |---------|--------------------------|----------------------|
//! | Text    | as is                    | string               |
//! | Number  | decimal text             | number               |
//! | Tags    | joined by the separator  | array of strings     |
//! | Geo     | `lon,lat`                | `"lon,lat"` string   |
//! | Vector  | little-endian blob       | array of numbers     |

use serde_json::{json, Value as JsonValue};
use std::fmt;

use crate::channel::{f32_blob, Arg};
use crate::error::ValidationError;
use crate::schema::{Field, FieldKind, VectorType};

/// A single field value of a document
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Tags(Vec<String>),
    Geo { lon: f64, lat: f64 },
    Vector(Vec<f32>),
}

impl FieldValue {
    /// Numeric view used for NUMERIC fields: numbers, or text that parses
    /// as a finite float.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Check this value against the schema field it is written to.
    pub(crate) fn validate(&self, field: &Field) -> Result<(), ValidationError> {
        if field.is_numeric() && self.as_number().is_none() {
            return Err(ValidationError::NonNumericValue {
                field: field.name().to_string(),
                value: self.to_string(),
            });
        }
        Ok(())
    }

    /// HSET value. `field` is the schema field, when the document field is
    /// declared at all.
    pub(crate) fn to_hash_arg(&self, field: Option<&Field>) -> Arg {
        match self {
            FieldValue::Text(s) => s.as_str().into(),
            FieldValue::Number(n) => n.to_string().into(),
            FieldValue::Tags(tags) => {
                let separator = match field.map(Field::kind) {
                    Some(FieldKind::Tag(opts)) => opts.separator.unwrap_or(','),
                    _ => ',',
                };
                tags.join(&separator.to_string()).into()
            }
            FieldValue::Geo { lon, lat } => format!("{},{}", lon, lat).into(),
            FieldValue::Vector(v) => match field.map(Field::kind) {
                Some(FieldKind::Vector(opts)) if opts.vector_type == VectorType::Float64 => {
                    f64_blob(v).into()
                }
                _ => f32_blob(v).into(),
            },
        }
    }

    pub(crate) fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Text(s) => json!(s),
            FieldValue::Number(n) => json!(n),
            FieldValue::Tags(tags) => json!(tags),
            FieldValue::Geo { lon, lat } => json!(format!("{},{}", lon, lat)),
            FieldValue::Vector(v) => json!(v),
        }
    }
}

fn f64_blob(vector: &[f32]) -> Vec<u8> {
    vector
        .iter()
        .flat_map(|v| f64::from(*v).to_le_bytes())
        .collect()
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Tags(tags) => write!(f, "{}", tags.join(",")),
            FieldValue::Geo { lon, lat } => write!(f, "{},{}", lon, lat),
            FieldValue::Vector(v) => write!(f, "<vector of {}>", v.len()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(tags: Vec<String>) -> Self {
        FieldValue::Tags(tags)
    }
}

impl From<Vec<f32>> for FieldValue {
    fn from(v: Vec<f32>) -> Self {
        FieldValue::Vector(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        DistanceMetric, NumericFieldOptions, TagFieldOptions, TextFieldOptions, VectorFieldOptions,
    };

    #[test]
    fn test_numeric_text_accepted() {
        let price = Field::numeric("price", NumericFieldOptions::new()).unwrap();
        assert!(FieldValue::from("12.5").validate(&price).is_ok());
        assert!(FieldValue::from(3.0).validate(&price).is_ok());
    }

    #[test]
    fn test_non_numeric_rejected_with_field_and_value() {
        let price = Field::numeric("price", NumericFieldOptions::new()).unwrap();
        assert_eq!(
            FieldValue::from("cheap").validate(&price),
            Err(ValidationError::NonNumericValue {
                field: "price".into(),
                value: "cheap".into(),
            })
        );
        assert!(FieldValue::Number(f64::NAN).validate(&price).is_err());
        assert!(FieldValue::Tags(vec!["1".into()]).validate(&price).is_err());
    }

    #[test]
    fn test_non_numeric_fields_not_checked() {
        let title = Field::text("title", TextFieldOptions::new()).unwrap();
        assert!(FieldValue::from("anything").validate(&title).is_ok());
    }

    #[test]
    fn test_tags_use_schema_separator() {
        let tags = Field::tag("tags", TagFieldOptions::new().separator(';')).unwrap();
        let value = FieldValue::from(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(value.to_hash_arg(Some(&tags)), "a;b");
        assert_eq!(value.to_hash_arg(None), "a,b");
    }

    #[test]
    fn test_vector_blob_width_follows_schema() {
        let v32 = Field::vector(
            "v",
            VectorFieldOptions::flat(VectorType::Float32, 2, DistanceMetric::L2),
        )
        .unwrap();
        let v64 = Field::vector(
            "v",
            VectorFieldOptions::flat(VectorType::Float64, 2, DistanceMetric::L2),
        )
        .unwrap();
        let value = FieldValue::from(vec![1.0f32, 2.0]);
        assert_eq!(value.to_hash_arg(Some(&v32)).as_bytes().len(), 8);
        assert_eq!(value.to_hash_arg(Some(&v64)).as_bytes().len(), 16);
    }

    #[test]
    fn test_json_encoding() {
        assert_eq!(FieldValue::from(10.0).to_json(), json!(10.0));
        assert_eq!(
            FieldValue::from(vec!["x".to_string()]).to_json(),
            json!(["x"])
        );
        assert_eq!(FieldValue::Geo { lon: 1.5, lat: 2.0 }.to_json(), json!("1.5,2"));
    }
}

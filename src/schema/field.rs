// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Field descriptors and their schema clause.
//!
//! ```text
//! name [AS alias] TEXT [WEIGHT w] [NOSTEM] [SORTABLE] [NOINDEX] [PHONETIC dm:en]
//! name [AS alias] TAG [SEPARATOR s] [CASESENSITIVE] [SORTABLE] [NOINDEX]
//! name [AS alias] NUMERIC [SORTABLE] [NOINDEX]
//! name [AS alias] GEO [NOINDEX]
//! name [AS alias] VECTOR algorithm count attr value ...
//! ```

use serde::Serialize;
use std::fmt;

use super::vector::{DistanceMetric, VectorAlgorithm, VectorFieldOptions, VectorType};
use crate::channel::Arg;
use crate::error::SchemaError;

/// Search field types supported by the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldType {
    /// Full-text searchable field
    Text,
    /// Exact-match tag field
    Tag,
    /// Numeric field (supports range queries)
    Numeric,
    /// Geographic field (longitude, latitude)
    Geo,
    /// Vector field (for similarity search)
    Vector,
}

impl FieldType {
    fn label(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Tag => "tag",
            FieldType::Numeric => "numeric",
            FieldType::Geo => "geo",
            FieldType::Vector => "vector",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text => write!(f, "TEXT"),
            FieldType::Tag => write!(f, "TAG"),
            FieldType::Numeric => write!(f, "NUMERIC"),
            FieldType::Geo => write!(f, "GEO"),
            FieldType::Vector => write!(f, "VECTOR"),
        }
    }
}

/// Phonetic matchers accepted on text fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PhoneticMatcher {
    /// Double metaphone, English (`dm:en`)
    English,
    /// `dm:fr`
    French,
    /// `dm:pt`
    Portuguese,
    /// `dm:es`
    Spanish,
}

impl PhoneticMatcher {
    /// Parse a matcher name, reporting `field` on failure.
    pub fn parse(field: &str, matcher: &str) -> Result<Self, SchemaError> {
        match matcher {
            "dm:en" => Ok(PhoneticMatcher::English),
            "dm:fr" => Ok(PhoneticMatcher::French),
            "dm:pt" => Ok(PhoneticMatcher::Portuguese),
            "dm:es" => Ok(PhoneticMatcher::Spanish),
            _ => Err(SchemaError::InvalidPhonetic {
                field: field.to_string(),
                matcher: matcher.to_string(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PhoneticMatcher::English => "dm:en",
            PhoneticMatcher::French => "dm:fr",
            PhoneticMatcher::Portuguese => "dm:pt",
            PhoneticMatcher::Spanish => "dm:es",
        }
    }
}

/// Options of a text field
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextFieldOptions {
    pub weight: Option<f64>,
    pub no_stem: bool,
    pub sortable: bool,
    pub no_index: bool,
    pub phonetic: Option<PhoneticMatcher>,
}

impl TextFieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn no_stem(mut self) -> Self {
        self.no_stem = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn no_index(mut self) -> Self {
        self.no_index = true;
        self
    }

    pub fn phonetic(mut self, matcher: PhoneticMatcher) -> Self {
        self.phonetic = Some(matcher);
        self
    }
}

/// Options of a tag field
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TagFieldOptions {
    pub separator: Option<char>,
    pub case_sensitive: bool,
    pub sortable: bool,
    pub no_index: bool,
}

impl TagFieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn separator(mut self, separator: char) -> Self {
        self.separator = Some(separator);
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn no_index(mut self) -> Self {
        self.no_index = true;
        self
    }
}

/// Options of a numeric field
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericFieldOptions {
    pub sortable: bool,
    pub no_index: bool,
}

impl NumericFieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn no_index(mut self) -> Self {
        self.no_index = true;
        self
    }
}

/// Options of a geo field
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeoFieldOptions {
    pub no_index: bool,
}

impl GeoFieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_index(mut self) -> Self {
        self.no_index = true;
        self
    }
}

/// Field kind with the options that kind understands
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldKind {
    Text(TextFieldOptions),
    Tag(TagFieldOptions),
    Numeric(NumericFieldOptions),
    Geo(GeoFieldOptions),
    Vector(VectorFieldOptions),
}

impl FieldKind {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::Text(_) => FieldType::Text,
            FieldKind::Tag(_) => FieldType::Tag,
            FieldKind::Numeric(_) => FieldType::Numeric,
            FieldKind::Geo(_) => FieldType::Geo,
            FieldKind::Vector(_) => FieldType::Vector,
        }
    }
}

/// Untyped option value used when options arrive as name/value pairs
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self {
        OptionValue::Number(n)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Number(n as f64)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Text(s)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Number(n) => write!(f, "{}", n),
            OptionValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Typed accessors that report the offending option on mismatch.
struct OptionReader<'a> {
    field: &'a str,
    option: &'a str,
    value: OptionValue,
}

impl OptionReader<'_> {
    fn mismatch(&self) -> SchemaError {
        SchemaError::InvalidOptionValue {
            field: self.field.to_string(),
            option: self.option.to_string(),
            value: self.value.to_string(),
        }
    }

    fn flag(&self) -> Result<bool, SchemaError> {
        match self.value {
            OptionValue::Bool(b) => Ok(b),
            _ => Err(self.mismatch()),
        }
    }

    fn number(&self) -> Result<f64, SchemaError> {
        match self.value {
            OptionValue::Number(n) => Ok(n),
            _ => Err(self.mismatch()),
        }
    }

    fn count(&self) -> Result<usize, SchemaError> {
        let n = self.number()?;
        if n >= 0.0 && n.fract() == 0.0 {
            Ok(n as usize)
        } else {
            Err(self.mismatch())
        }
    }

    fn text(&self) -> Result<&str, SchemaError> {
        match &self.value {
            OptionValue::Text(s) => Ok(s),
            _ => Err(self.mismatch()),
        }
    }

    fn single_char(&self) -> Result<char, SchemaError> {
        let s = self.text()?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(self.mismatch()),
        }
    }
}

/// One indexed attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    name: String,
    alias: Option<String>,
    kind: FieldKind,
}

impl Field {
    /// Create a field, validating its name and options.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Result<Self, SchemaError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SchemaError::EmptyFieldName);
        }

        match &kind {
            FieldKind::Text(opts) => {
                if let Some(weight) = opts.weight {
                    if !weight.is_finite() || weight < 0.0 {
                        return Err(SchemaError::InvalidOptionValue {
                            field: name,
                            option: "weight".to_string(),
                            value: weight.to_string(),
                        });
                    }
                }
            }
            FieldKind::Vector(opts) => opts.validate(&name)?,
            FieldKind::Tag(_) | FieldKind::Numeric(_) | FieldKind::Geo(_) => {}
        }

        Ok(Self {
            name,
            alias: None,
            kind,
        })
    }

    pub fn text(name: impl Into<String>, options: TextFieldOptions) -> Result<Self, SchemaError> {
        Self::new(name, FieldKind::Text(options))
    }

    pub fn tag(name: impl Into<String>, options: TagFieldOptions) -> Result<Self, SchemaError> {
        Self::new(name, FieldKind::Tag(options))
    }

    pub fn numeric(name: impl Into<String>, options: NumericFieldOptions) -> Result<Self, SchemaError> {
        Self::new(name, FieldKind::Numeric(options))
    }

    pub fn geo(name: impl Into<String>, options: GeoFieldOptions) -> Result<Self, SchemaError> {
        Self::new(name, FieldKind::Geo(options))
    }

    pub fn vector(name: impl Into<String>, options: VectorFieldOptions) -> Result<Self, SchemaError> {
        Self::new(name, FieldKind::Vector(options))
    }

    /// Create a field from name/value option pairs.
    ///
    /// Option names are checked against what `field_type` understands;
    /// anything else is a declaration error.
    pub fn from_options<I, K>(
        name: impl Into<String>,
        field_type: FieldType,
        options: I,
    ) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (K, OptionValue)>,
        K: AsRef<str>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(SchemaError::EmptyFieldName);
        }

        let mut alias = None;
        let mut text = TextFieldOptions::default();
        let mut tag = TagFieldOptions::default();
        let mut numeric = NumericFieldOptions::default();
        let mut geo = GeoFieldOptions::default();
        let mut vector = VectorDraft::default();

        for (key, value) in options {
            let option = key.as_ref();
            let reader = OptionReader {
                field: &name,
                option,
                value,
            };

            match (field_type, option) {
                (_, "as") => alias = Some(reader.text()?.to_string()),
                (FieldType::Text, "weight") => text.weight = Some(reader.number()?),
                (FieldType::Text, "no_stem") => text.no_stem = reader.flag()?,
                (FieldType::Text, "sortable") => text.sortable = reader.flag()?,
                (FieldType::Text, "no_index") => text.no_index = reader.flag()?,
                (FieldType::Text, "phonetic") => {
                    text.phonetic = Some(PhoneticMatcher::parse(&name, reader.text()?)?)
                }
                (FieldType::Tag, "separator") => tag.separator = Some(reader.single_char()?),
                (FieldType::Tag, "case_sensitive") => tag.case_sensitive = reader.flag()?,
                (FieldType::Tag, "sortable") => tag.sortable = reader.flag()?,
                (FieldType::Tag, "no_index") => tag.no_index = reader.flag()?,
                (FieldType::Numeric, "sortable") => numeric.sortable = reader.flag()?,
                (FieldType::Numeric, "no_index") => numeric.no_index = reader.flag()?,
                (FieldType::Geo, "no_index") => geo.no_index = reader.flag()?,
                (FieldType::Vector, "algorithm") => {
                    vector.algorithm = Some(VectorAlgorithm::parse(&name, reader.text()?)?)
                }
                (FieldType::Vector, "type") => {
                    vector.vector_type = Some(VectorType::parse(&name, reader.text()?)?)
                }
                (FieldType::Vector, "dim") => vector.dim = Some(reader.count()?),
                (FieldType::Vector, "distance_metric") => {
                    vector.distance_metric = Some(DistanceMetric::parse(&name, reader.text()?)?)
                }
                (FieldType::Vector, "initial_cap") => vector.initial_cap = Some(reader.count()?),
                (FieldType::Vector, "block_size") => vector.block_size = Some(reader.count()?),
                (FieldType::Vector, "m") => vector.m = Some(reader.count()?),
                (FieldType::Vector, "ef_construction") => vector.ef_construction = Some(reader.count()?),
                (FieldType::Vector, "ef_runtime") => vector.ef_runtime = Some(reader.count()?),
                (FieldType::Vector, "epsilon") => vector.epsilon = Some(reader.number()?),
                (_, other) => {
                    return Err(SchemaError::UnknownOption {
                        field: name.clone(),
                        kind: field_type.label(),
                        option: other.to_string(),
                    })
                }
            }
        }

        let kind = match field_type {
            FieldType::Text => FieldKind::Text(text),
            FieldType::Tag => FieldKind::Tag(tag),
            FieldType::Numeric => FieldKind::Numeric(numeric),
            FieldType::Geo => FieldKind::Geo(geo),
            FieldType::Vector => FieldKind::Vector(vector.finish(&name)?),
        };

        let field = Self::new(name, kind)?;
        Ok(match alias {
            Some(alias) => field.with_alias(alias),
            None => field,
        })
    }

    /// Expose the attribute under a different name (`AS alias`).
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Name used to reference the field in queries (alias if set)
    pub fn query_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, FieldKind::Numeric(_))
    }

    /// Schema clause for this field.
    pub fn serialize(&self) -> Vec<Arg> {
        let mut args: Vec<Arg> = vec![self.name.as_str().into()];
        if let Some(alias) = &self.alias {
            args.push("AS".into());
            args.push(alias.into());
        }
        args.push(self.field_type().to_string().into());

        match &self.kind {
            FieldKind::Text(opts) => {
                if let Some(weight) = opts.weight {
                    args.push("WEIGHT".into());
                    args.push(format_weight(weight).into());
                }
                push_flag(&mut args, opts.no_stem, "NOSTEM");
                push_flag(&mut args, opts.sortable, "SORTABLE");
                push_flag(&mut args, opts.no_index, "NOINDEX");
                if let Some(matcher) = opts.phonetic {
                    args.push("PHONETIC".into());
                    args.push(matcher.as_str().into());
                }
            }
            FieldKind::Tag(opts) => {
                if let Some(separator) = opts.separator {
                    args.push("SEPARATOR".into());
                    args.push(separator.to_string().into());
                }
                push_flag(&mut args, opts.case_sensitive, "CASESENSITIVE");
                push_flag(&mut args, opts.sortable, "SORTABLE");
                push_flag(&mut args, opts.no_index, "NOINDEX");
            }
            FieldKind::Numeric(opts) => {
                push_flag(&mut args, opts.sortable, "SORTABLE");
                push_flag(&mut args, opts.no_index, "NOINDEX");
            }
            FieldKind::Geo(opts) => {
                push_flag(&mut args, opts.no_index, "NOINDEX");
            }
            FieldKind::Vector(opts) => {
                let attrs = opts.attributes();
                args.push(opts.algorithm.to_string().into());
                args.push((attrs.len() * 2).into());
                for (key, value) in attrs {
                    args.push(key.to_ascii_uppercase().into());
                    args.push(value.into());
                }
            }
        }
        args
    }
}

fn push_flag(args: &mut Vec<Arg>, set: bool, flag: &str) {
    if set {
        args.push(flag.into());
    }
}

/// Weights keep their decimal point on the wire (`5.0`, not `5`).
fn format_weight(weight: f64) -> String {
    format!("{:?}", weight)
}

#[derive(Default)]
struct VectorDraft {
    algorithm: Option<VectorAlgorithm>,
    vector_type: Option<VectorType>,
    dim: Option<usize>,
    distance_metric: Option<DistanceMetric>,
    initial_cap: Option<usize>,
    block_size: Option<usize>,
    m: Option<usize>,
    ef_construction: Option<usize>,
    ef_runtime: Option<usize>,
    epsilon: Option<f64>,
}

impl VectorDraft {
    fn finish(self, field: &str) -> Result<VectorFieldOptions, SchemaError> {
        let missing = |attribute: &'static str| SchemaError::InvalidVectorAttribute {
            field: field.to_string(),
            attribute,
            reason: "missing".to_string(),
        };

        let mut opts = VectorFieldOptions::new(
            self.algorithm.ok_or_else(|| missing("ALGORITHM"))?,
            self.vector_type.ok_or_else(|| missing("TYPE"))?,
            self.dim.ok_or_else(|| missing("DIM"))?,
            self.distance_metric.ok_or_else(|| missing("DISTANCE_METRIC"))?,
        );
        opts.initial_cap = self.initial_cap;
        opts.block_size = self.block_size;
        opts.m = self.m;
        opts.ef_construction = self.ef_construction;
        opts.ef_runtime = self.ef_runtime;
        opts.epsilon = self.epsilon;
        Ok(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_field_with_weight() {
        let field = Field::text("title", TextFieldOptions::new().weight(5.0)).unwrap();
        assert_eq!(field.serialize(), ["title", "TEXT", "WEIGHT", "5.0"]);
    }

    #[test]
    fn test_alias_follows_name() {
        let field = Field::numeric("$.price", NumericFieldOptions::new().sortable())
            .unwrap()
            .with_alias("price");
        assert_eq!(field.serialize(), ["$.price", "AS", "price", "NUMERIC", "SORTABLE"]);
        assert_eq!(field.query_name(), "price");
    }

    #[test]
    fn test_false_flags_are_omitted() {
        let field = Field::tag("category", TagFieldOptions::new()).unwrap();
        assert_eq!(field.serialize(), ["category", "TAG"]);
    }

    #[test]
    fn test_tag_options() {
        let field = Field::tag(
            "labels",
            TagFieldOptions::new().separator(';').case_sensitive().no_index(),
        )
        .unwrap();
        assert_eq!(
            field.serialize(),
            ["labels", "TAG", "SEPARATOR", ";", "CASESENSITIVE", "NOINDEX"]
        );
    }

    #[test]
    fn test_phonetic_is_last() {
        let field = Field::text(
            "name",
            TextFieldOptions::new()
                .phonetic(PhoneticMatcher::French)
                .sortable()
                .weight(2.5),
        )
        .unwrap();
        let args = field.serialize();
        assert_eq!(args, ["name", "TEXT", "WEIGHT", "2.5", "SORTABLE", "PHONETIC", "dm:fr"]);
    }

    #[test]
    fn test_phonetic_whitelist() {
        for matcher in ["dm:en", "dm:fr", "dm:pt", "dm:es"] {
            let parsed = PhoneticMatcher::parse("name", matcher).unwrap();
            assert_eq!(parsed.as_str(), matcher);
        }
        let err = PhoneticMatcher::parse("name", "dm:de").unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidPhonetic {
                field: "name".into(),
                matcher: "dm:de".into()
            }
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        assert_eq!(
            Field::geo("", GeoFieldOptions::new()).unwrap_err(),
            SchemaError::EmptyFieldName
        );
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = Field::text("title", TextFieldOptions::new().weight(-1.0)).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidOptionValue { .. }));
    }

    #[test]
    fn test_vector_field_clause() {
        let field = Field::vector(
            "embedding",
            VectorFieldOptions::flat(VectorType::Float32, 4, DistanceMetric::L2).initial_cap(100),
        )
        .unwrap();
        assert_eq!(
            field.serialize(),
            [
                "embedding", "VECTOR", "FLAT", "8", "TYPE", "FLOAT32", "DIM", "4",
                "DISTANCE_METRIC", "L2", "INITIAL_CAP", "100",
            ]
        );
    }

    #[test]
    fn test_from_options_text() {
        let field = Field::from_options(
            "title",
            FieldType::Text,
            [
                ("weight", OptionValue::from(5.0)),
                ("sortable", true.into()),
                ("no_index", false.into()),
                ("phonetic", "dm:en".into()),
            ],
        )
        .unwrap();
        assert_eq!(
            field.serialize(),
            ["title", "TEXT", "WEIGHT", "5.0", "SORTABLE", "PHONETIC", "dm:en"]
        );
    }

    #[test]
    fn test_from_options_alias() {
        let field = Field::from_options("$.tags", FieldType::Tag, [("as", OptionValue::from("tags"))]).unwrap();
        assert_eq!(field.alias(), Some("tags"));
    }

    #[test]
    fn test_from_options_rejects_unknown_option() {
        let err = Field::from_options("price", FieldType::Numeric, [("weight", OptionValue::from(1.0))])
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownOption {
                field: "price".into(),
                kind: "numeric",
                option: "weight".into()
            }
        );
    }

    #[test]
    fn test_from_options_rejects_bad_phonetic() {
        let err = Field::from_options("name", FieldType::Text, [("phonetic", OptionValue::from("soundex"))])
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPhonetic { .. }));
    }

    #[test]
    fn test_from_options_rejects_wrong_value_type() {
        let err = Field::from_options("title", FieldType::Text, [("sortable", OptionValue::from("yes"))])
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidOptionValue { .. }));
    }

    #[test]
    fn test_from_options_vector_requires_mandatory_attributes() {
        let err = Field::from_options(
            "embedding",
            FieldType::Vector,
            [("algorithm", OptionValue::from("HNSW")), ("dim", 128i64.into())],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidVectorAttribute { attribute: "TYPE", .. }
        ));

        let field = Field::from_options(
            "embedding",
            FieldType::Vector,
            [
                ("algorithm", OptionValue::from("hnsw")),
                ("type", "float32".into()),
                ("dim", 128i64.into()),
                ("distance_metric", "cosine".into()),
                ("m", 16i64.into()),
            ],
        )
        .unwrap();
        assert_eq!(
            field.serialize(),
            [
                "embedding", "VECTOR", "HNSW", "8", "TYPE", "FLOAT32", "DIM", "128",
                "DISTANCE_METRIC", "COSINE", "M", "16",
            ]
        );
    }
}

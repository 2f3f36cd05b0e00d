// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Index schema declaration.
//!
//! A [`Schema`] is an ordered list of uniquely named [`Field`]s, built once
//! through a [`SchemaDefinition`] and immutable afterwards. Declaration
//! problems surface as [`SchemaError`] while fields are declared, long before
//! the schema is sent anywhere.
//!
//! # Example
//!
//! ```rust
//! use search_index_client::schema::{Schema, TextFieldOptions, TagFieldOptions, NumericFieldOptions};
//!
//! # fn main() -> Result<(), search_index_client::SchemaError> {
//! let schema = Schema::builder()
//!     .text("title", TextFieldOptions::new().weight(5.0))?
//!     .tag("category", TagFieldOptions::new())?
//!     .numeric("price", NumericFieldOptions::new().sortable())?
//!     .build();
//!
//! assert_eq!(schema.serialize()[0], "SCHEMA");
//! assert!(schema.get("price").unwrap().is_numeric());
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//!
//! - **Closed field kinds**: each kind carries its own option struct, so a
//!   numeric field cannot be given a weight at all
//! - **Name/value declarations**: [`SchemaDefinition::declare`] accepts
//!   options as pairs (e.g. read from config) and rejects names the kind
//!   does not understand

mod field;
mod vector;

pub use field::{
    Field, FieldKind, FieldType, GeoFieldOptions, NumericFieldOptions, OptionValue,
    PhoneticMatcher, TagFieldOptions, TextFieldOptions,
};
pub use vector::{DistanceMetric, VectorAlgorithm, VectorFieldOptions, VectorType};

use serde::Serialize;

use crate::channel::Arg;
use crate::error::SchemaError;

/// Ordered, immutable collection of fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Start declaring a schema.
    #[must_use]
    pub fn builder() -> SchemaDefinition {
        SchemaDefinition::new()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look a field up by name or alias.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.name() == name || f.alias() == Some(name))
    }

    pub fn numeric_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_numeric())
    }

    /// A new schema with `field` appended.
    pub fn with_field(&self, field: Field) -> Result<Schema, SchemaError> {
        let mut definition = SchemaDefinition {
            fields: self.fields.clone(),
        };
        definition.push(field)?;
        Ok(definition.build())
    }

    /// `SCHEMA` clause: the keyword followed by every field clause in
    /// declaration order.
    pub fn serialize(&self) -> Vec<Arg> {
        let mut args: Vec<Arg> = vec!["SCHEMA".into()];
        for field in &self.fields {
            args.extend(field.serialize());
        }
        args
    }
}

/// Mutable accumulator used while a schema is being declared.
#[derive(Debug, Default)]
pub struct SchemaDefinition {
    fields: Vec<Field>,
}

impl SchemaDefinition {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an already constructed field.
    pub fn field(mut self, field: Field) -> Result<Self, SchemaError> {
        self.push(field)?;
        Ok(self)
    }

    pub fn text(self, name: impl Into<String>, options: TextFieldOptions) -> Result<Self, SchemaError> {
        self.field(Field::text(name, options)?)
    }

    pub fn tag(self, name: impl Into<String>, options: TagFieldOptions) -> Result<Self, SchemaError> {
        self.field(Field::tag(name, options)?)
    }

    pub fn numeric(self, name: impl Into<String>, options: NumericFieldOptions) -> Result<Self, SchemaError> {
        self.field(Field::numeric(name, options)?)
    }

    pub fn geo(self, name: impl Into<String>, options: GeoFieldOptions) -> Result<Self, SchemaError> {
        self.field(Field::geo(name, options)?)
    }

    pub fn vector(self, name: impl Into<String>, options: VectorFieldOptions) -> Result<Self, SchemaError> {
        self.field(Field::vector(name, options)?)
    }

    /// Declare a field from name/value option pairs.
    ///
    /// ```rust
    /// use search_index_client::schema::{FieldType, OptionValue, Schema};
    /// use search_index_client::SchemaError;
    ///
    /// let err = Schema::builder()
    ///     .declare("title", FieldType::Text, [("boost", OptionValue::from(2.0))])
    ///     .unwrap_err();
    /// assert!(matches!(err, SchemaError::UnknownOption { .. }));
    /// ```
    pub fn declare<I, K>(
        self,
        name: impl Into<String>,
        field_type: FieldType,
        options: I,
    ) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (K, OptionValue)>,
        K: AsRef<str>,
    {
        self.field(Field::from_options(name, field_type, options)?)
    }

    /// Names and aliases share one namespace; any clash is a duplicate.
    fn push(&mut self, field: Field) -> Result<(), SchemaError> {
        let taken = |key: &str| {
            self.fields
                .iter()
                .any(|f| f.name() == key || f.alias() == Some(key))
        };
        if let Some(clash) = [Some(field.name()), field.alias()]
            .into_iter()
            .flatten()
            .find(|key| taken(*key))
        {
            return Err(SchemaError::DuplicateField(clash.to_string()));
        }
        self.fields.push(field);
        Ok(())
    }

    /// Freeze the declared fields.
    #[must_use]
    pub fn build(self) -> Schema {
        Schema { fields: self.fields }
    }
}

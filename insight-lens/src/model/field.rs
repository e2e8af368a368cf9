//! Logical column definitions and the tables that own them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a logical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Date,
    Boolean,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical, named column of a table.
///
/// `column_name` points at the physical column in source rows. A field without
/// one still participates in grouping, contributing a null key part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Marks a field as a row identifier regardless of its statistics.
    #[serde(default)]
    pub is_identifier: bool,
    /// Marks a field as a foreign reference to another table.
    #[serde(default)]
    pub is_reference: bool,
}

impl Field {
    /// Creates a field whose physical column has the same name as the field.
    pub fn new(id: impl Into<String>, name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            column_name: Some(name.clone()),
            name,
            field_type,
            is_identifier: false,
            is_reference: false,
        }
    }

    /// Sets the physical column name.
    pub fn with_column_name(mut self, column_name: Option<String>) -> Self {
        self.column_name = column_name;
        self
    }

    /// Flags the field as an identifier.
    pub fn identifier(mut self) -> Self {
        self.is_identifier = true;
        self
    }

    /// Flags the field as a reference.
    pub fn reference(mut self) -> Self {
        self.is_reference = true;
        self
    }
}

/// A table definition owning its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: String,
    pub name: String,
    pub fields: Vec<Field>,
}

impl Table {
    pub fn new(id: impl Into<String>, name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields,
        }
    }

    /// Looks up a field by id.
    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Looks up a field by its physical column name.
    pub fn field_by_column(&self, column_name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.column_name.as_deref() == Some(column_name))
    }

    /// Field ids in declaration order.
    pub fn field_ids(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.id.as_str()).collect()
    }
}

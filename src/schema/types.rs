use crate::error::{Error, Result, datatype_error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical column types shared by every dialect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum FieldType {
    #[default]
    Undefined,
    Integer,
    String,
    Float,
    Decimal,
    Datetime,
    Boolean,
    /// Reference to another entity, never a column of its own
    Item,
    /// Reference to a list of entities, never a column of its own
    ListOfItem,
}

impl FieldType {
    /// Parse a type token; matching is case-insensitive and accepts synonyms.
    ///
    /// Width is not part of the type: `tinyint` and `bigint` are both `Integer`.
    pub fn get_fieldtype(value: &str) -> Result<FieldType> {
        match value.trim().to_lowercase().as_str() {
            "integer" | "int" | "bigint" | "tinyint" | "smallint" | "mediumint" => {
                Ok(FieldType::Integer)
            }
            "string" | "varchar" | "char" | "text" => Ok(FieldType::String),
            "float" | "real" | "double" => Ok(FieldType::Float),
            "datetime" | "date" | "timestamp" => Ok(FieldType::Datetime),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            "decimal" | "numeric" | "money" => Ok(FieldType::Decimal),
            "__item__" => Ok(FieldType::Item),
            "[__item__]" => Ok(FieldType::ListOfItem),
            "none" => Ok(FieldType::Undefined),
            other => Err(datatype_error(format!("Unknown field type {}", other))),
        }
    }

    /// Canonical spelling, the inverse of [`FieldType::get_fieldtype`]
    pub const fn as_str(&self) -> &'static str {
        match self {
            FieldType::Undefined => "None",
            FieldType::Integer => "Integer",
            FieldType::String => "String",
            FieldType::Float => "Float",
            FieldType::Decimal => "Decimal",
            FieldType::Datetime => "Datetime",
            FieldType::Boolean => "Boolean",
            FieldType::Item => "__Item__",
            FieldType::ListOfItem => "[__Item__]",
        }
    }

    /// Whether the type is a stored column rather than an entity reference
    pub const fn is_persisted(&self) -> bool {
        !matches!(self, FieldType::Item | FieldType::ListOfItem)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FieldType::get_fieldtype(s)
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for FieldType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        FieldType::get_fieldtype(&value)
    }
}

/// Kinds of table keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum KeyType {
    #[default]
    Undefined,
    PrimaryKey,
    Index,
    Unique,
    ForeignKey,
    Lookup,
}

impl KeyType {
    /// Parse a key-type token, case-insensitive, with or without the inner space.
    pub fn get_keytype(value: &str) -> Result<KeyType> {
        match value.trim().to_lowercase().as_str() {
            "undefined" => Ok(KeyType::Undefined),
            "primarykey" | "primary key" => Ok(KeyType::PrimaryKey),
            "index" => Ok(KeyType::Index),
            "unique" => Ok(KeyType::Unique),
            "foreignkey" | "foreign key" => Ok(KeyType::ForeignKey),
            "lookup" => Ok(KeyType::Lookup),
            other => Err(datatype_error(format!("Unknown key type {}", other))),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            KeyType::Undefined => "Undefined",
            KeyType::PrimaryKey => "PrimaryKey",
            KeyType::Index => "Index",
            KeyType::Unique => "Unique",
            KeyType::ForeignKey => "ForeignKey",
            KeyType::Lookup => "Lookup",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        KeyType::get_keytype(s)
    }
}

impl From<KeyType> for String {
    fn from(value: KeyType) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for KeyType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        KeyType::get_keytype(&value)
    }
}

/// Value transform applied to a custom query result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TransformType {
    #[default]
    Undefined,
    Map,
    IntToBool,
}

impl TransformType {
    pub fn get_transformtype(value: &str) -> Result<TransformType> {
        match value.trim().to_lowercase().as_str() {
            "undefined" | "none" => Ok(TransformType::Undefined),
            "map" => Ok(TransformType::Map),
            "inttobool" => Ok(TransformType::IntToBool),
            other => Err(datatype_error(format!("Unknown transform type {}", other))),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            TransformType::Undefined => "Undefined",
            TransformType::Map => "Map",
            TransformType::IntToBool => "IntToBool",
        }
    }
}

impl fmt::Display for TransformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TransformType::get_transformtype(s)
    }
}

impl From<TransformType> for String {
    fn from(value: TransformType) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for TransformType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        TransformType::get_transformtype(&value)
    }
}

/// How a custom query is executed and what it returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum QueryType {
    #[default]
    Undefined,
    FetchScalar,
    FetchOne,
    FetchAll,
    Execute,
}

impl QueryType {
    pub fn get_querytype(value: &str) -> Result<QueryType> {
        match value.trim().to_lowercase().as_str() {
            "undefined" => Ok(QueryType::Undefined),
            "fetchscalar" => Ok(QueryType::FetchScalar),
            "fetchone" => Ok(QueryType::FetchOne),
            "fetchall" => Ok(QueryType::FetchAll),
            "execute" => Ok(QueryType::Execute),
            other => Err(datatype_error(format!("Unknown query type {}", other))),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            QueryType::Undefined => "Undefined",
            QueryType::FetchScalar => "FetchScalar",
            QueryType::FetchOne => "FetchOne",
            QueryType::FetchAll => "FetchAll",
            QueryType::Execute => "Execute",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        QueryType::get_querytype(s)
    }
}

impl From<QueryType> for String {
    fn from(value: QueryType) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for QueryType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        QueryType::get_querytype(&value)
    }
}

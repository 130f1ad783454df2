use crate::error::{Result, data_error};
use crate::naming::Name;
use crate::schema::types::{FieldType, KeyType, QueryType, TransformType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column definition for a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Column name
    pub name: Name,
    /// Logical column type
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Byte width for numbers, character length for strings, precision for decimals
    #[serde(default)]
    pub size: u32,
    /// Digits after the decimal point
    #[serde(default)]
    pub scale: u32,
    #[serde(default)]
    pub auto_increment: bool,
    /// Default value as an opaque literal
    #[serde(default)]
    pub default: Option<String>,
    /// NOT NULL
    #[serde(default)]
    pub required: bool,
}

impl Field {
    pub fn new(name: impl Into<Name>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            size: 0,
            scale: 0,
            auto_increment: false,
            default: None,
            required: false,
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({},{}) ",
            self.name, self.field_type, self.size, self.scale
        )?;
        if self.auto_increment {
            f.write_str("AUTOINC ")?;
        }
        if let Some(default) = &self.default {
            write!(f, "DEFAULT {} ", default)?;
        }
        f.write_str(if self.required { "NOT NULL" } else { "NULL" })
    }
}

/// Primary key, index, unique constraint or foreign key of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub name: Name,
    #[serde(default)]
    pub key_type: KeyType,
    /// Local field names, in key order
    pub fields: Vec<String>,
    /// Referenced table (foreign keys only)
    #[serde(default)]
    pub primary_table: String,
    /// Referenced field names, positionally matching `fields` (foreign keys only)
    #[serde(default)]
    pub primary_fields: Vec<String>,
    /// Table that declared this key
    #[serde(default)]
    pub referenced_table: String,
}

impl Key {
    pub fn new(name: impl Into<Name>, key_type: KeyType, fields: Vec<String>) -> Self {
        Self {
            name: name.into(),
            key_type,
            fields,
            primary_table: String::new(),
            primary_fields: Vec::new(),
            referenced_table: String::new(),
        }
    }

    pub fn primary_key(name: impl Into<Name>, fields: Vec<String>) -> Self {
        Self::new(name, KeyType::PrimaryKey, fields)
    }

    pub fn foreign_key(
        name: impl Into<Name>,
        fields: Vec<String>,
        primary_table: impl Into<String>,
        primary_fields: Vec<String>,
    ) -> Self {
        Self {
            primary_table: primary_table.into(),
            primary_fields,
            ..Self::new(name, KeyType::ForeignKey, fields)
        }
    }

    pub fn is_foreign_key(&self) -> bool {
        self.key_type == KeyType::ForeignKey
    }

    /// Check the structural invariants of the key
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(data_error(format!("Key {} has no fields", self.name)));
        }
        if self.is_foreign_key() {
            if self.primary_table.is_empty() {
                return Err(data_error(format!(
                    "Foreign key {} has no primary table",
                    self.name
                )));
            }
            if self.primary_fields.len() != self.fields.len() {
                return Err(data_error(format!(
                    "Foreign key {} maps {} fields onto {} primary fields",
                    self.name,
                    self.fields.len(),
                    self.primary_fields.len()
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.key_type, self.fields.join(","))?;
        if self.is_foreign_key() {
            write!(
                f,
                " -> {}({})",
                self.primary_table,
                self.primary_fields.join(",")
            )?;
        }
        Ok(())
    }
}

/// Typed parameter of a custom query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: Name,
    #[serde(rename = "type", default)]
    pub param_type: FieldType,
}

impl Parameter {
    pub fn new(name: impl Into<Name>, param_type: FieldType) -> Self {
        Self {
            name: name.into(),
            param_type,
        }
    }
}

/// Hand-written query carried alongside a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomQuery {
    pub name: Name,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub return_type: FieldType,
    #[serde(default)]
    pub transform: TransformType,
    #[serde(default)]
    pub query_type: QueryType,
    /// Query text with `::name::` placeholders
    #[serde(default)]
    pub query: String,
}

impl CustomQuery {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: FieldType::Undefined,
            transform: TransformType::Undefined,
            query_type: QueryType::Undefined,
            query: String::new(),
        }
    }
}

/// Table definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: Name,
    /// Columns in DDL order
    #[serde(default)]
    pub fields: Vec<Field>,
    /// The single primary key, if any
    #[serde(default)]
    pub pk: Option<Key>,
    /// Indexes, unique keys and this table's outgoing foreign keys
    #[serde(default)]
    pub keys: Vec<Key>,
    /// Incoming foreign keys from other tables, filled by the back-link pass
    #[serde(skip)]
    pub foreign_keys: Vec<Key>,
    #[serde(default)]
    pub custom_queries: Vec<CustomQuery>,
}

impl Table {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            pk: None,
            keys: Vec::new(),
            foreign_keys: Vec::new(),
            custom_queries: Vec::new(),
        }
    }

    /// Find a field by raw name, ignoring case
    pub fn find_field(&self, name: &str) -> Result<&Field> {
        self.fields
            .iter()
            .find(|f| f.name.raw().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                data_error(format!(
                    "Could not find field {} in table {}",
                    name, self.name
                ))
            })
    }

    pub fn find_field_mut(&mut self, name: &str) -> Result<&mut Field> {
        let table_name = self.name.raw().to_string();
        self.fields
            .iter_mut()
            .find(|f| f.name.raw().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                data_error(format!(
                    "Could not find field {} in table {}",
                    name, table_name
                ))
            })
    }

    /// Fields stored as columns; entity references are left out
    pub fn persisted_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.field_type.is_persisted())
    }

    /// Persisted fields a caller supplies on insert
    pub fn insertable_fields(&self) -> impl Iterator<Item = &Field> {
        self.persisted_fields().filter(|f| !f.auto_increment)
    }

    /// Persisted fields an update can set: neither generated nor part of the primary key
    pub fn updatable_fields(&self) -> impl Iterator<Item = &Field> {
        self.persisted_fields()
            .filter(|f| !f.auto_increment && !self.is_pk_field(f.name.raw()))
    }

    /// Foreign keys declared by this table
    pub fn outgoing_foreign_keys(&self) -> impl Iterator<Item = &Key> {
        self.keys.iter().filter(|k| k.is_foreign_key())
    }

    /// Whether `field` is part of the primary key
    pub fn is_pk_field(&self, field: &str) -> bool {
        self.pk
            .as_ref()
            .is_some_and(|pk| pk.fields.iter().any(|f| f.eq_ignore_ascii_case(field)))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.raw())
    }
}

/// A named, ordered collection of tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub name: Name,
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Database {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    /// Look up a table by its exact raw name
    pub fn get_table(&self, table_name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name.raw() == table_name)
    }

    pub fn get_table_mut(&mut self, table_name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.name.raw() == table_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_table() -> Table {
        let mut table = Table::new("test_table");
        table.fields = vec![
            Field::new("id", FieldType::Integer)
                .with_size(4)
                .auto_increment()
                .required(),
            Field::new("name", FieldType::String).with_size(50),
            Field::new("children", FieldType::ListOfItem),
        ];
        table.pk = Some(Key::primary_key("pk_id", vec!["id".into()]));
        table
    }

    #[test]
    fn test_find_field_ignores_case() {
        let table = test_table();
        assert_eq!(table.find_field("NAME").unwrap().size, 50);
        let err = table.find_field("missing").unwrap_err();
        assert!(err.is_data_error());
    }

    #[test]
    fn test_persisted_fields_skip_references() {
        let table = test_table();
        let names: Vec<&str> = table.persisted_fields().map(|f| f.name.raw()).collect();
        assert_eq!(names, ["id", "name"]);
        assert!(table.is_pk_field("ID"));
        assert!(!table.is_pk_field("name"));
    }

    #[test]
    fn test_key_validation() {
        assert!(Key::new("ix", KeyType::Index, vec![]).validate().is_err());
        let fk = Key::foreign_key("fk", vec!["a".into(), "b".into()], "parent", vec!["x".into()]);
        assert!(fk.validate().is_err());
        let fk = Key::foreign_key(
            "fk",
            vec!["a".into(), "b".into()],
            "parent",
            vec!["x".into(), "y".into()],
        );
        assert!(fk.validate().is_ok());
        assert_eq!(fk.to_string(), "fk ForeignKey a,b -> parent(x,y)");
    }

    #[test]
    fn test_database_lookup_is_case_sensitive() {
        let mut db = Database::new("test");
        db.tables.push(test_table());
        assert!(db.get_table("test_table").is_some());
        assert!(db.get_table("TEST_TABLE").is_none());
    }

    #[test]
    fn test_field_display() {
        let field = Field::new("name", FieldType::String)
            .with_size(20)
            .with_default("x");
        assert_eq!(field.to_string(), "name String (20,0) DEFAULT x NULL");
    }

    #[test]
    fn test_foreign_keys_are_not_serialized() {
        let mut table = test_table();
        table
            .foreign_keys
            .push(Key::foreign_key("fk", vec!["a".into()], "test_table", vec!["id".into()]));
        let json = serde_json::to_string(&table).unwrap();
        let back: Table = serde_json::from_str(&json).unwrap();
        assert!(back.foreign_keys.is_empty());
        assert_eq!(back.fields, table.fields);
        assert_eq!(back.pk, table.pk);
    }
}

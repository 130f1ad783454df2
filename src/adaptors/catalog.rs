//! Schema import shared by the catalog-introspecting dialects.
//!
//! Each dialect supplies three metadata queries whose result columns use the
//! aliases read here, plus a lookup from native type names to logical types.

use crate::database::{DatabaseConnection, DatabaseRow, DatabaseValue};
use crate::error::{Result, data_error};
use crate::naming::Naming;
use crate::schema::{Database, Field, FieldType, Key, KeyType, Table};
use tracing::{debug, info};

/// Metadata queries of one dialect.
///
/// `tables` binds the schema; `columns` and `keys` bind schema then table,
/// `keys` repeating the pair `key_param_pairs` times.
pub(crate) struct CatalogQueries {
    pub tables: &'static str,
    pub columns: &'static str,
    pub keys: &'static str,
    pub key_param_pairs: usize,
}

/// A column as reported by the catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub char_length: u32,
    pub precision: u32,
    pub scale: u32,
    pub nullable: bool,
    pub default: Option<String>,
    pub auto_increment: bool,
}

/// Resolved logical type of a catalog column
pub(crate) type TypeLookup = fn(&ColumnInfo) -> Result<(FieldType, u32, u32)>;

impl ColumnInfo {
    /// Read `column_name, data_type, char_length, numeric_precision, numeric_scale,
    /// is_nullable, column_default, extra`
    pub fn from_row(row: &dyn DatabaseRow) -> Result<Self> {
        let extra = row.try_get_string("extra")?.unwrap_or_default();
        Ok(Self {
            name: row.get_string("column_name")?,
            data_type: row.get_string("data_type")?.to_lowercase(),
            char_length: non_negative(row.try_get_i64("char_length")?),
            precision: non_negative(row.try_get_i64("numeric_precision")?),
            scale: non_negative(row.try_get_i64("numeric_scale")?),
            nullable: row
                .try_get_string("is_nullable")?
                .is_some_and(|v| v.eq_ignore_ascii_case("yes")),
            default: row.try_get_string("column_default")?,
            auto_increment: extra.to_lowercase().contains("auto_increment"),
        })
    }

    pub fn into_field(self, naming: &dyn Naming, lookup: TypeLookup) -> Result<Field> {
        let (field_type, size, scale) = lookup(&self)?;
        Ok(Field {
            name: naming.string_to_name(&self.name),
            field_type,
            size,
            scale,
            auto_increment: self.auto_increment,
            default: self.default,
            required: !self.nullable,
        })
    }
}

fn non_negative(value: Option<i64>) -> u32 {
    value
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or_default()
}

/// Split a comma-joined column list
fn split_columns(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

/// Read `constraint_name, key_type, local_columns, primary_table, reference_columns`
pub(crate) fn key_from_row(
    row: &dyn DatabaseRow,
    naming: &dyn Naming,
    table_name: &str,
) -> Result<Key> {
    let key_type = KeyType::get_keytype(&row.get_string("key_type")?)?;
    let mut key = Key::new(
        naming.string_to_name(&row.get_string("constraint_name")?),
        key_type,
        split_columns(&row.get_string("local_columns")?),
    );
    key.referenced_table = table_name.to_string();
    if key_type == KeyType::ForeignKey {
        key.primary_table = row.try_get_string("primary_table")?.unwrap_or_default();
        key.primary_fields = split_columns(
            &row.try_get_string("reference_columns")?.unwrap_or_default(),
        );
    }
    Ok(key)
}

/// Attach a key to its table: the primary key replaces `pk`, everything else is appended.
pub(crate) fn attach_key(table: &mut Table, key: Key) -> Result<()> {
    key.validate()?;
    for field in &key.fields {
        table.find_field(field)?;
    }
    if key.key_type == KeyType::PrimaryKey {
        if let Some(existing) = &table.pk {
            return Err(data_error(format!(
                "Table {} has two primary keys: {} and {}",
                table.name, existing.name, key.name
            )));
        }
        table.pk = Some(key);
    } else {
        table.keys.push(key);
    }
    Ok(())
}

/// Enumerate tables, then columns and keys per table.
pub(crate) async fn import_catalog(
    connection: &dyn DatabaseConnection,
    naming: &dyn Naming,
    queries: &CatalogQueries,
    lookup: TypeLookup,
    schema: &str,
    db_name: &str,
) -> Result<Database> {
    let mut database = Database::new(naming.string_to_name(db_name));

    info!(schema, "processing tables");
    let rows = connection
        .query(queries.tables, &[DatabaseValue::from(schema)])
        .await?;
    for row in rows {
        database
            .tables
            .push(Table::new(naming.string_to_name(&row.get_string("table_name")?)));
    }

    for table in &mut database.tables {
        let table_name = table.name.raw().to_string();
        let pair = [DatabaseValue::from(schema), DatabaseValue::from(table_name.as_str())];

        info!(table = %table_name, "processing fields");
        let rows = connection.query(queries.columns, &pair).await?;
        for row in rows {
            let column = ColumnInfo::from_row(row.as_ref())?;
            debug!(table = %table_name, column = %column.name, data_type = %column.data_type, "column");
            table.fields.push(column.into_field(naming, lookup)?);
        }

        info!(table = %table_name, "processing indexes and keys");
        let params: Vec<DatabaseValue> = pair
            .iter()
            .cycle()
            .take(pair.len() * queries.key_param_pairs)
            .cloned()
            .collect();
        let rows = connection.query(queries.keys, &params).await?;
        for row in rows {
            let key = key_from_row(row.as_ref(), naming, &table_name)?;
            attach_key(table, key)?;
        }
    }

    Ok(database)
}

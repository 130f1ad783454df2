use crate::adaptors::Adaptor;
use crate::adaptors::sqlite_parser::SqliteParser;
use crate::adaptors::trait_def::quote_literal;
use crate::connection::{SqliteTarget, split_scheme};
use crate::database::DatabaseConnection;
#[cfg(feature = "sqlite")]
use crate::database::SqliteConnection;
use crate::error::{Result, datatype_error};
#[cfg(not(feature = "sqlite"))]
use crate::error::unsupported_error;
use crate::factory::Dialect;
use crate::naming::Naming;
use crate::schema::{Database, FieldType, Table};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Stored DDL of every table and index, tables first. Automatic indexes have no text.
const MASTER_QUERY: &str = "SELECT type, name, tbl_name, sql FROM sqlite_master \
    WHERE type IN ('table', 'index') AND sql IS NOT NULL \
    ORDER BY CASE type WHEN 'table' THEN 0 ELSE 1 END, rowid";

/// SQLite adaptor. Connection string is `sqlite://<file>` or `sqlite://memory`.
pub struct SqliteAdaptor {
    target: SqliteTarget,
    naming: Arc<dyn Naming>,
}

impl SqliteAdaptor {
    /// Connection string used when the adaptor is selected by dialect name
    pub const BLANK_CONNECTION: &'static str = "sqlite://memory";

    pub fn new(connection_string: &str, naming: Arc<dyn Naming>) -> Result<Self> {
        let (_, rest) = split_scheme(connection_string)?;
        Ok(Self {
            target: SqliteTarget::parse(rest)?,
            naming,
        })
    }

    pub fn target(&self) -> &SqliteTarget {
        &self.target
    }

    /// Parse schema text directly, as stored in `sqlite_master`
    pub fn import_script(&self, script: &str, db_name: &str) -> Result<Database> {
        let mut database = Database::new(self.naming.string_to_name(db_name));
        database.tables = SqliteParser::new(self.naming.as_ref()).parse_script(script)?;
        Ok(database)
    }
}

#[async_trait]
impl Adaptor for SqliteAdaptor {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn naming(&self) -> &dyn Naming {
        self.naming.as_ref()
    }

    fn default_database_name(&self) -> String {
        self.target.default_database_name()
    }

    async fn import_schema(&self, db_name: &str) -> Result<Database> {
        #[cfg(feature = "sqlite")]
        {
            let connection = SqliteConnection::connect(&self.target).await?;
            let result = self.import_schema_from(&connection, db_name).await;
            connection.close().await?;
            result
        }
        #[cfg(not(feature = "sqlite"))]
        {
            let _ = db_name;
            Err(unsupported_error(
                "SQLite support is not enabled. Enable the 'sqlite' feature.",
            ))
        }
    }

    async fn import_schema_from(
        &self,
        connection: &dyn DatabaseConnection,
        db_name: &str,
    ) -> Result<Database> {
        info!(source = ?self.target, "reading sqlite_master");
        let rows = connection.query(MASTER_QUERY, &[]).await?;
        let mut script = String::new();
        for row in rows {
            let sql = row.get_string("sql")?;
            debug!(
                kind = %row.get_string("type")?,
                name = %row.get_string("name")?,
                "schema entry"
            );
            script.push_str(&sql);
            script.push_str("\n;\n");
        }
        self.import_script(&script, db_name)
    }

    fn get_field_type(&self, field_type: FieldType, _size: u32, _scale: u32) -> Result<String> {
        let name = match field_type {
            FieldType::Integer => "INTEGER",
            FieldType::String => "TEXT",
            FieldType::Float => "REAL",
            FieldType::Decimal => "DECIMAL",
            FieldType::Datetime => "DATETIME",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Undefined | FieldType::Item | FieldType::ListOfItem => {
                return Err(datatype_error(format!(
                    "Field type {} has no SQLite column type",
                    field_type
                )));
            }
        };
        Ok(name.to_string())
    }

    fn must_remap_field(&self, field_type: FieldType) -> (bool, FieldType) {
        match field_type {
            FieldType::Boolean => (true, FieldType::Integer),
            FieldType::Datetime | FieldType::Decimal => (true, FieldType::Float),
            other => (false, other),
        }
    }

    fn identifier_quote_char_start(&self) -> char {
        '"'
    }

    fn identifier_quote_char_end(&self) -> char {
        '"'
    }

    fn parameter_placeholder(&self, name: &str) -> String {
        format!(":{}", name)
    }

    fn generate_table_exists_script(&self, table: &Table, _db_name: &str) -> Result<String> {
        Ok(format!(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = {};",
            quote_literal(table.name.raw())
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptors::testing::{FakeConnection, FakeRow};
    use crate::database::DatabaseType;
    use crate::naming::DefaultNaming;
    use crate::schema::{Field, Key, KeyType};

    fn adaptor() -> SqliteAdaptor {
        SqliteAdaptor::new("sqlite://memory", Arc::new(DefaultNaming)).unwrap()
    }

    #[test]
    fn test_connection_targets() {
        assert_eq!(adaptor().target(), &SqliteTarget::Memory);
        assert_eq!(adaptor().default_database_name(), "memory");

        let file = SqliteAdaptor::new("sqlite:///var/data/shop.db", Arc::new(DefaultNaming))
            .unwrap();
        assert_eq!(file.default_database_name(), "shop");

        let err = SqliteAdaptor::new("sqlite://", Arc::new(DefaultNaming))
            .err()
            .unwrap();
        assert!(err.is_data_error());
    }

    #[test]
    fn test_types_and_placeholders() {
        let adaptor = adaptor();
        assert_eq!(adaptor.get_field_type(FieldType::String, 50, 0).unwrap(), "TEXT");
        assert_eq!(adaptor.get_field_type(FieldType::Decimal, 10, 2).unwrap(), "DECIMAL");
        assert!(adaptor.get_field_type(FieldType::ListOfItem, 0, 0).unwrap_err().is_datatype_error());
        assert_eq!(adaptor.must_remap_field(FieldType::Datetime), (true, FieldType::Float));
        assert_eq!(adaptor.must_remap_field(FieldType::String), (false, FieldType::String));
        assert_eq!(adaptor.replace_parameters("a = ::a::"), "a = :a");
        assert_eq!(
            adaptor.generate_table_exists_script(&Table::new("users"), "x").unwrap(),
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'users';"
        );
    }

    #[test]
    fn test_create_script_uses_double_quotes() {
        let mut table = Table::new("users");
        table.fields = vec![
            Field::new("id", FieldType::Integer).auto_increment().required(),
            Field::new("name", FieldType::String).with_size(50),
        ];
        table.pk = Some(Key::primary_key("pk_users", vec!["id".into()]));
        let sql = adaptor().generate_create_script(&table).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE \"users\" (\n\t\"id\" INTEGER NOT NULL,\n\t\"name\" TEXT,\n\t\
             CONSTRAINT \"pk_users\" PRIMARY KEY (\"id\")\n);\n"
        );
    }

    #[tokio::test]
    async fn test_import_from_master() {
        let connection = FakeConnection::new(DatabaseType::Sqlite, |_, _| {
            vec![
                FakeRow::new()
                    .text("type", "table")
                    .text("name", "users")
                    .text("sql", "CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL)"),
                FakeRow::new()
                    .text("type", "table")
                    .text("name", "sqlite_sequence")
                    .text("sql", "CREATE TABLE sqlite_sequence(name,seq)"),
                FakeRow::new()
                    .text("type", "index")
                    .text("name", "ux_email")
                    .text("sql", "CREATE UNIQUE INDEX ux_email ON users (email)"),
            ]
        });
        let db = adaptor().import_schema_from(&connection, "memory").await.unwrap();
        assert_eq!(db.name.raw(), "memory");
        assert_eq!(db.tables.len(), 1);
        let users = &db.tables[0];
        assert!(users.find_field("id").unwrap().auto_increment);
        assert_eq!(users.keys[0].key_type, KeyType::Unique);
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_import_sees_shared_memory_database() {
        let writer = SqliteConnection::connect(&SqliteTarget::Memory).await.unwrap();
        writer
            .query(
                "CREATE TABLE IF NOT EXISTS shared_items (id INTEGER PRIMARY KEY, label TEXT)",
                &[],
            )
            .await
            .unwrap();

        let adaptor = crate::factory::AdaptorFactory::from_connection_string(
            "sqlite://memory",
            Arc::new(DefaultNaming),
        )
        .unwrap();
        let db = adaptor.import_schema("memory").await.unwrap();
        writer.close().await.unwrap();

        let items = db.get_table("shared_items").unwrap();
        assert!(items.find_field("id").unwrap().auto_increment);
        assert!(items.find_field("label").is_ok());
    }
}

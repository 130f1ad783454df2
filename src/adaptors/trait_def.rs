use crate::database::DatabaseConnection;
use crate::error::{Result, data_error};
use crate::factory::Dialect;
use crate::naming::Naming;
use crate::schema::{Database, Field, FieldType, Key, KeyType, Table};
use async_trait::async_trait;

/// Per-dialect schema import and SQL generation.
///
/// Only the import methods touch the outside world; every `generate_*` method is a
/// pure function of the table it is given. Shared statement shapes live in the
/// provided methods and are specialised through quoting, placeholders and types.
#[async_trait]
pub trait Adaptor: Send + Sync {
    /// The dialect this adaptor speaks
    fn dialect(&self) -> Dialect;

    /// Identifier service used for every name created during import
    fn naming(&self) -> &dyn Naming;

    /// Database name used when the caller does not supply one
    fn default_database_name(&self) -> String;

    /// Reverse-engineer the full schema from the adaptor's own data source
    async fn import_schema(&self, db_name: &str) -> Result<Database>;

    /// Reverse-engineer the schema through an already open connection
    async fn import_schema_from(
        &self,
        connection: &dyn DatabaseConnection,
        db_name: &str,
    ) -> Result<Database>;

    /// Map a logical type with its size and scale to the dialect's type name
    fn get_field_type(&self, field_type: FieldType, size: u32, scale: u32) -> Result<String>;

    /// Whether values of `field_type` are stored as a different physical type, and which
    fn must_remap_field(&self, field_type: FieldType) -> (bool, FieldType);

    /// Get the character used to quote identifiers at the start
    fn identifier_quote_char_start(&self) -> char;

    /// Get the character used to quote identifiers at the end
    fn identifier_quote_char_end(&self) -> char;

    /// Native bound-parameter token for `name`
    fn parameter_placeholder(&self, name: &str) -> String;

    /// Statement returning a single count, non-zero when the table exists
    fn generate_table_exists_script(&self, table: &Table, db_name: &str) -> Result<String>;

    /// Quote an identifier (table, column name) for the database
    fn quote_identifier(&self, identifier: &str) -> String {
        let start = self.identifier_quote_char_start();
        let end = self.identifier_quote_char_end();
        let escaped = identifier.replace(end, &format!("{}{}", end, end));
        format!("{}{}{}", start, escaped, end)
    }

    fn escape_field_list(&self, names: &[String]) -> Vec<String> {
        names.iter().map(|name| self.quote_identifier(name)).collect()
    }

    /// Rewrite `::name::` markers into native placeholders
    fn replace_parameters(&self, query: &str) -> String {
        let mut result = String::with_capacity(query.len());
        let mut rest = query;
        while let Some(start) = rest.find("::") {
            let after = &rest[start + 2..];
            let len = after
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            if len > 0 && after[len..].starts_with("::") {
                result.push_str(&rest[..start]);
                result.push_str(&self.parameter_placeholder(&after[..len]));
                rest = &after[len + 2..];
            } else {
                result.push_str(&rest[..start + 1]);
                rest = &rest[start + 1..];
            }
        }
        result.push_str(rest);
        result
    }

    /// Column type as rendered in a column definition
    fn column_type(&self, field: &Field) -> Result<String> {
        self.get_field_type(field.field_type, field.size, field.scale)
    }

    /// Column modifier marking an auto-increment column, if the dialect has one
    fn auto_increment_clause(&self) -> Option<&'static str> {
        None
    }

    fn generate_column_definition(&self, field: &Field) -> Result<String> {
        let mut sql = format!(
            "{} {}",
            self.quote_identifier(field.name.raw()),
            self.column_type(field)?
        );
        if field.required {
            sql.push_str(" NOT NULL");
        }
        if field.auto_increment {
            if let Some(clause) = self.auto_increment_clause() {
                sql.push(' ');
                sql.push_str(clause);
            }
        }
        if let Some(default) = &field.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&render_default(field.field_type, default));
        }
        Ok(sql)
    }

    /// `CREATE TABLE` with columns, primary key and outgoing foreign keys, followed by
    /// one `CREATE [UNIQUE] INDEX` per index or unique key.
    fn generate_create_script(&self, table: &Table) -> Result<String> {
        check_keys(table)?;

        let mut clauses = Vec::new();
        for field in table.persisted_fields() {
            clauses.push(self.generate_column_definition(field)?);
        }
        if clauses.is_empty() {
            return Err(data_error(format!("Table {} has no columns", table.name)));
        }

        if let Some(pk) = &table.pk {
            clauses.push(format!(
                "{}PRIMARY KEY ({})",
                self.constraint_prefix(pk),
                self.escape_field_list(&pk.fields).join(",")
            ));
        }
        for fk in table.outgoing_foreign_keys() {
            clauses.push(format!(
                "{}FOREIGN KEY ({}) REFERENCES {}({})",
                self.constraint_prefix(fk),
                self.escape_field_list(&fk.fields).join(","),
                self.quote_identifier(&fk.primary_table),
                self.escape_field_list(&fk.primary_fields).join(",")
            ));
        }

        let mut script = format!(
            "CREATE TABLE {} (\n\t{}\n);\n",
            self.quote_identifier(table.name.raw()),
            clauses.join(",\n\t")
        );

        for key in &table.keys {
            let unique = match key.key_type {
                KeyType::Unique => "UNIQUE ",
                KeyType::Index => "",
                _ => continue,
            };
            script.push_str(&format!(
                "CREATE {}INDEX {} ON {} ({});\n",
                unique,
                self.quote_identifier(key.name.raw()),
                self.quote_identifier(table.name.raw()),
                self.escape_field_list(&key.fields).join(",")
            ));
        }
        Ok(script)
    }

    /// `CONSTRAINT <name> ` for named keys, empty otherwise
    fn constraint_prefix(&self, key: &Key) -> String {
        if key.name.raw().is_empty() {
            String::new()
        } else {
            format!("CONSTRAINT {} ", self.quote_identifier(key.name.raw()))
        }
    }

    fn generate_drop_script(&self, table: &Table) -> Result<String> {
        Ok(format!(
            "DROP TABLE IF EXISTS {};",
            self.quote_identifier(table.name.raw())
        ))
    }

    fn generate_count_script(&self, table: &Table) -> Result<String> {
        Ok(format!(
            "SELECT COUNT(*) FROM {};",
            self.quote_identifier(table.name.raw())
        ))
    }

    /// Insert every persisted field except auto-increment ones
    fn generate_insert_script(&self, table: &Table) -> Result<String> {
        let fields: Vec<&str> = table
            .insertable_fields()
            .map(|f| f.name.raw())
            .collect();
        if fields.is_empty() {
            return Err(data_error(format!(
                "Table {} has no insertable fields",
                table.name
            )));
        }
        let columns: Vec<String> = fields.iter().map(|f| self.quote_identifier(f)).collect();
        let values: Vec<String> = fields.iter().map(|f| self.parameter_placeholder(f)).collect();
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({});",
            self.quote_identifier(table.name.raw()),
            columns.join(", "),
            values.join(", ")
        ))
    }

    /// Update every non-key, non-auto-increment field, matching on the primary key
    fn generate_update_script(&self, table: &Table) -> Result<String> {
        let pk = require_pk(table)?;
        let assignments: Vec<String> = table
            .updatable_fields()
            .map(|f| self.assignment(f.name.raw()))
            .collect();
        if assignments.is_empty() {
            return Err(data_error(format!(
                "Table {} has no updatable fields",
                table.name
            )));
        }
        Ok(format!(
            "UPDATE {} SET {} WHERE {};",
            self.quote_identifier(table.name.raw()),
            assignments.join(", "),
            self.key_condition(pk)
        ))
    }

    fn generate_delete_script(&self, table: &Table) -> Result<String> {
        let pk = require_pk(table)?;
        Ok(format!(
            "DELETE FROM {} WHERE {};",
            self.quote_identifier(table.name.raw()),
            self.key_condition(pk)
        ))
    }

    fn generate_fetch_by_id_script(&self, table: &Table) -> Result<String> {
        let pk = require_pk(table)?;
        let columns: Vec<String> = table
            .persisted_fields()
            .map(|f| self.quote_identifier(f.name.raw()))
            .collect();
        Ok(format!(
            "SELECT {} FROM {} WHERE {};",
            columns.join(", "),
            self.quote_identifier(table.name.raw()),
            self.key_condition(pk)
        ))
    }

    fn generate_item_exists_script(&self, table: &Table) -> Result<String> {
        let pk = require_pk(table)?;
        Ok(format!(
            "SELECT COUNT(*) FROM {} WHERE {};",
            self.quote_identifier(table.name.raw()),
            self.key_condition(pk)
        ))
    }

    /// `<column> = <placeholder>`
    fn assignment(&self, field: &str) -> String {
        format!(
            "{} = {}",
            self.quote_identifier(field),
            self.parameter_placeholder(field)
        )
    }

    /// Conjunction of assignments over the key's fields
    fn key_condition(&self, key: &Key) -> String {
        key.fields
            .iter()
            .map(|f| self.assignment(f))
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

/// Single-quote a string literal
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Render a default value; text-like types are quoted unless already quoted or a keyword.
pub fn render_default(field_type: FieldType, value: &str) -> String {
    let keyword = matches!(
        value.to_uppercase().as_str(),
        "NULL" | "CURRENT_TIMESTAMP" | "CURRENT_DATE" | "CURRENT_TIME"
    );
    let quoted = value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'');
    match field_type {
        FieldType::String | FieldType::Datetime if !keyword && !quoted => quote_literal(value),
        _ => value.to_string(),
    }
}

fn require_pk(table: &Table) -> Result<&Key> {
    table
        .pk
        .as_ref()
        .ok_or_else(|| data_error(format!("Table {} has no primary key", table.name)))
}

/// Every key must be well formed and name existing fields
fn check_keys(table: &Table) -> Result<()> {
    for key in table.pk.iter().chain(table.keys.iter()) {
        key.validate()?;
        for field in &key.fields {
            table.find_field(field)?;
        }
    }
    Ok(())
}

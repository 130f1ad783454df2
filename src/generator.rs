use crate::adaptors::Adaptor;
use crate::error::Result;
use crate::resolver::get_ordered_table_list;
use crate::schema::{Database, Table};
use serde::Serialize;

/// Every generated statement for one table.
///
/// Statements that match on the primary key are `None` when the table has none.
/// `insert` and `update` are also `None` when there is no column to write, as for
/// a link table keyed on all of its columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableScripts {
    pub exists: String,
    pub count: String,
    pub create: String,
    pub insert: Option<String>,
    pub update: Option<String>,
    pub delete: Option<String>,
    pub drop: String,
    pub fetch_by_id: Option<String>,
    pub item_exists: Option<String>,
}

impl TableScripts {
    pub fn build(adaptor: &dyn Adaptor, table: &Table, db_name: &str) -> Result<Self> {
        let keyed = table.pk.is_some();
        let insertable = table.insertable_fields().next().is_some();
        let updatable = keyed && table.updatable_fields().next().is_some();
        Ok(Self {
            exists: adaptor.generate_table_exists_script(table, db_name)?,
            count: adaptor.generate_count_script(table)?,
            create: adaptor.generate_create_script(table)?,
            insert: insertable
                .then(|| adaptor.generate_insert_script(table))
                .transpose()?,
            update: updatable
                .then(|| adaptor.generate_update_script(table))
                .transpose()?,
            delete: keyed
                .then(|| adaptor.generate_delete_script(table))
                .transpose()?,
            drop: adaptor.generate_drop_script(table)?,
            fetch_by_id: keyed
                .then(|| adaptor.generate_fetch_by_id_script(table))
                .transpose()?,
            item_exists: keyed
                .then(|| adaptor.generate_item_exists_script(table))
                .transpose()?,
        })
    }
}

/// Whole-database scripts through one adaptor
pub struct SchemaGenerator {
    adaptor: Box<dyn Adaptor>,
}

impl SchemaGenerator {
    pub fn new(adaptor: Box<dyn Adaptor>) -> Self {
        Self { adaptor }
    }

    /// Create statements for every table, each after the tables it references
    pub fn generate_create_script(&self, database: &Database) -> Result<String> {
        let mut script = String::new();
        for table in get_ordered_table_list(database)? {
            script.push_str(&self.adaptor.generate_create_script(table)?);
            script.push('\n');
        }
        Ok(script)
    }

    /// Drop statements in reverse creation order
    pub fn generate_drop_script(&self, database: &Database) -> Result<String> {
        let mut script = String::new();
        for table in get_ordered_table_list(database)?.into_iter().rev() {
            script.push_str(&self.adaptor.generate_drop_script(table)?);
            script.push('\n');
        }
        Ok(script)
    }

    pub fn table_scripts(&self, table: &Table, db_name: &str) -> Result<TableScripts> {
        TableScripts::build(self.adaptor.as_ref(), table, db_name)
    }

    /// Get the adaptor used by this generator
    pub fn adaptor(&self) -> &dyn Adaptor {
        self.adaptor.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptors::MySqlAdaptor;
    use crate::naming::DefaultNaming;
    use crate::schema::{Field, FieldType, Key};
    use std::sync::Arc;

    fn mysql() -> Box<dyn Adaptor> {
        Box::new(
            MySqlAdaptor::new(MySqlAdaptor::BLANK_CONNECTION, Arc::new(DefaultNaming)).unwrap(),
        )
    }

    fn table(name: &str, parent: Option<&str>) -> Table {
        let mut table = Table::new(name);
        table.fields.push(Field::new("id", FieldType::Integer).auto_increment().required());
        table.fields.push(Field::new("label", FieldType::String).with_size(30));
        table.pk = Some(Key::primary_key(format!("pk_{}", name), vec!["id".into()]));
        if let Some(parent) = parent {
            table.fields.push(Field::new("parent_id", FieldType::Integer));
            table.keys.push(Key::foreign_key(
                format!("fk_{}_{}", name, parent),
                vec!["parent_id".into()],
                parent,
                vec!["id".into()],
            ));
        }
        table
    }

    #[test]
    fn test_table_scripts_without_primary_key() {
        let mut log = Table::new("log");
        log.fields.push(Field::new("message", FieldType::String));
        let scripts = TableScripts::build(mysql().as_ref(), &log, "d").unwrap();
        assert_eq!(
            scripts.insert.as_deref(),
            Some("INSERT INTO `log` (`message`) VALUES (%(message)s);")
        );
        assert_eq!(scripts.drop, "DROP TABLE IF EXISTS `log`;");
        assert!(scripts.update.is_none());
        assert!(scripts.delete.is_none());
        assert!(scripts.fetch_by_id.is_none());
        assert!(scripts.item_exists.is_none());
    }

    #[test]
    fn test_table_scripts_with_primary_key() {
        let scripts = TableScripts::build(mysql().as_ref(), &table("tag", None), "d").unwrap();
        assert_eq!(
            scripts.delete.as_deref(),
            Some("DELETE FROM `tag` WHERE `id` = %(id)s;")
        );
        assert_eq!(
            scripts.item_exists.as_deref(),
            Some("SELECT COUNT(*) FROM `tag` WHERE `id` = %(id)s;")
        );
        assert_eq!(scripts.count, "SELECT COUNT(*) FROM `tag`;");
    }

    #[test]
    fn test_link_table_has_no_update() {
        let mut post_tag = Table::new("post_tag");
        post_tag.fields = vec![
            Field::new("post_id", FieldType::Integer).required(),
            Field::new("tag_id", FieldType::Integer).required(),
        ];
        post_tag.pk = Some(Key::primary_key(
            "pk_post_tag",
            vec!["post_id".into(), "tag_id".into()],
        ));
        let scripts = TableScripts::build(mysql().as_ref(), &post_tag, "d").unwrap();
        assert!(scripts.update.is_none());
        assert_eq!(
            scripts.insert.as_deref(),
            Some("INSERT INTO `post_tag` (`post_id`, `tag_id`) VALUES (%(post_id)s, %(tag_id)s);")
        );
        assert_eq!(
            scripts.delete.as_deref(),
            Some("DELETE FROM `post_tag` WHERE `post_id` = %(post_id)s AND `tag_id` = %(tag_id)s;")
        );
    }

    #[test]
    fn test_counter_table_has_no_insert() {
        let mut ticket = Table::new("ticket");
        ticket.fields = vec![Field::new("id", FieldType::Integer).auto_increment().required()];
        ticket.pk = Some(Key::primary_key("pk_ticket", vec!["id".into()]));
        let scripts = TableScripts::build(mysql().as_ref(), &ticket, "d").unwrap();
        assert!(scripts.insert.is_none());
        assert!(scripts.update.is_none());
        assert!(scripts.fetch_by_id.is_some());
    }

    #[test]
    fn test_schema_scripts_follow_dependencies() {
        let mut db = Database::new("d");
        db.tables = vec![table("child", Some("parent")), table("parent", None)];
        let generator = SchemaGenerator::new(mysql());

        let create = generator.generate_create_script(&db).unwrap();
        let parent = create.find("CREATE TABLE `parent`").unwrap();
        let child = create.find("CREATE TABLE `child`").unwrap();
        assert!(parent < child);

        let drop = generator.generate_drop_script(&db).unwrap();
        assert_eq!(
            drop,
            "DROP TABLE IF EXISTS `child`;\nDROP TABLE IF EXISTS `parent`;\n"
        );
    }
}

//! Schema definition files: the model persisted as YAML or JSON.

use crate::error::Result;
use crate::resolver::process_foreign_keys;
use crate::schema::Database;
use std::fs;
use std::path::Path;
use tracing::info;

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// Serialize a database to text in the format chosen by the file extension
pub fn definition_to_string(database: &Database, path: &Path) -> Result<String> {
    if is_yaml(path) {
        Ok(serde_yaml::to_string(database)?)
    } else {
        Ok(serde_json::to_string_pretty(database)?)
    }
}

/// Write a definition file: YAML for `.yaml`/`.yml`, JSON otherwise
pub fn save_definition(database: &Database, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, definition_to_string(database, path)?)?;
    info!(path = %path.display(), tables = database.tables.len(), "definition saved");
    Ok(())
}

/// Read a definition file and rebuild the incoming foreign-key links
pub fn load_definition(path: impl AsRef<Path>) -> Result<Database> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let mut database: Database = if is_yaml(path) {
        serde_yaml::from_str(&text)?
    } else {
        serde_json::from_str(&text)?
    };
    process_foreign_keys(&mut database)?;
    info!(path = %path.display(), tables = database.tables.len(), "definition loaded");
    Ok(database)
}

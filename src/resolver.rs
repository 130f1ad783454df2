//! Foreign-key back-linking and creation ordering over a [`Database`].

use crate::error::{Error, Result, data_error};
use crate::schema::{Database, Key, Table};
use std::collections::HashSet;
use tracing::debug;

/// Rebuild every table's incoming `foreign_keys` list from the outgoing keys.
///
/// All lists are cleared first, so running the pass again yields the same result.
/// Each copied key records the declaring table in `referenced_table`.
pub fn process_foreign_keys(database: &mut Database) -> Result<()> {
    for table in &mut database.tables {
        table.foreign_keys.clear();
    }

    let links: Vec<(String, Key)> = database
        .tables
        .iter()
        .flat_map(|table| {
            table.outgoing_foreign_keys().map(move |key| {
                let mut key = key.clone();
                key.referenced_table = table.name.raw().to_string();
                (key.primary_table.clone(), key)
            })
        })
        .collect();

    for (primary_table, key) in links {
        let target = database.get_table_mut(&primary_table).ok_or_else(|| {
            data_error(format!(
                "Foreign key {} of table {} references unknown table {}",
                key.name, key.referenced_table, primary_table
            ))
        })?;
        debug!(key = %key.name, from = %key.referenced_table, to = %primary_table, "linking foreign key");
        target.foreign_keys.push(key);
    }
    Ok(())
}

/// Tables ordered so that every foreign key's primary table precedes the declaring table.
///
/// Depth-first over declaration order. Self-references do not constrain the order.
/// A cycle between distinct tables is reported as [`Error::ForeignKeyCycle`] with the
/// tables on the cycle, first table repeated at the end.
pub fn get_ordered_table_list(database: &Database) -> Result<Vec<&Table>> {
    let mut ordered: Vec<&Table> = Vec::with_capacity(database.tables.len());
    let mut done: HashSet<&str> = HashSet::new();
    let mut path: Vec<&str> = Vec::new();

    for table in &database.tables {
        visit(database, table, &mut ordered, &mut done, &mut path)?;
    }
    Ok(ordered)
}

fn visit<'a>(
    database: &'a Database,
    table: &'a Table,
    ordered: &mut Vec<&'a Table>,
    done: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Result<()> {
    let name = table.name.raw();
    if done.contains(name) {
        return Ok(());
    }
    if let Some(start) = path.iter().position(|p| *p == name) {
        let mut cycle: Vec<String> = path[start..].iter().map(|p| p.to_string()).collect();
        cycle.push(name.to_string());
        return Err(Error::ForeignKeyCycle(cycle));
    }

    path.push(name);
    for key in table.outgoing_foreign_keys() {
        if key.primary_table == name {
            continue;
        }
        let parent = database.get_table(&key.primary_table).ok_or_else(|| {
            data_error(format!(
                "Foreign key {} of table {} references unknown table {}",
                key.name, name, key.primary_table
            ))
        })?;
        visit(database, parent, ordered, done, path)?;
    }
    path.pop();

    done.insert(name);
    ordered.push(table);
    Ok(())
}

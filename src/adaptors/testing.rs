//! In-memory stand-ins for a live connection.

use crate::database::{
    DatabaseConnection, DatabaseError, DatabaseResult, DatabaseRow, DatabaseType, DatabaseValue,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Default)]
pub struct FakeRow {
    values: HashMap<String, DatabaseValue>,
}

impl FakeRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, column: &str, value: &str) -> Self {
        self.values
            .insert(column.to_string(), DatabaseValue::from(value));
        self
    }

    pub fn int(mut self, column: &str, value: i64) -> Self {
        self.values
            .insert(column.to_string(), DatabaseValue::Integer(value));
        self
    }

    pub fn null(mut self, column: &str) -> Self {
        self.values.insert(column.to_string(), DatabaseValue::Null);
        self
    }
}

impl DatabaseRow for FakeRow {
    fn get_string(&self, column: &str) -> DatabaseResult<String> {
        self.try_get_string(column)?
            .ok_or_else(|| DatabaseError::Query(format!("column {} is missing", column)))
    }

    fn try_get_string(&self, column: &str) -> DatabaseResult<Option<String>> {
        match self.values.get(column) {
            None | Some(DatabaseValue::Null) => Ok(None),
            Some(DatabaseValue::Text(s)) => Ok(Some(s.clone())),
            Some(DatabaseValue::Integer(i)) => Ok(Some(i.to_string())),
        }
    }

    fn try_get_i64(&self, column: &str) -> DatabaseResult<Option<i64>> {
        match self.values.get(column) {
            None | Some(DatabaseValue::Null) => Ok(None),
            Some(DatabaseValue::Integer(i)) => Ok(Some(*i)),
            Some(DatabaseValue::Text(s)) => s
                .parse()
                .map(Some)
                .map_err(|_| DatabaseError::Query(format!("column {} is not an integer", column))),
        }
    }
}

type Responder = Box<dyn Fn(&str, &[DatabaseValue]) -> Vec<FakeRow> + Send + Sync>;

/// Answers every query through a closure and records what was asked
pub struct FakeConnection {
    database_type: DatabaseType,
    responder: Responder,
    pub queries: Mutex<Vec<(String, Vec<DatabaseValue>)>>,
}

impl FakeConnection {
    pub fn new(
        database_type: DatabaseType,
        responder: impl Fn(&str, &[DatabaseValue]) -> Vec<FakeRow> + Send + Sync + 'static,
    ) -> Self {
        Self {
            database_type,
            responder: Box::new(responder),
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DatabaseConnection for FakeConnection {
    async fn query(
        &self,
        query: &str,
        params: &[DatabaseValue],
    ) -> DatabaseResult<Vec<Box<dyn DatabaseRow>>> {
        if let Ok(mut log) = self.queries.lock() {
            log.push((query.to_string(), params.to_vec()));
        }
        Ok((self.responder)(query, params)
            .into_iter()
            .map(|row| Box::new(row) as Box<dyn DatabaseRow>)
            .collect())
    }

    fn get_database_type(&self) -> DatabaseType {
        self.database_type
    }

    async fn close(&self) -> DatabaseResult<()> {
        Ok(())
    }
}

/// Text of a bound parameter, for routing fake responses
pub fn param_text(params: &[DatabaseValue], index: usize) -> &str {
    match params.get(index) {
        Some(DatabaseValue::Text(s)) => s,
        _ => "",
    }
}

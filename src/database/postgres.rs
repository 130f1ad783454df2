use async_trait::async_trait;
use sqlx::{Row, PgPool, postgres::PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;

use crate::connection::ServerConnection;
use crate::database::{
    DatabaseConnection, DatabaseError, DatabaseResult, DatabaseRow, DatabaseType, DatabaseValue,
};

/// PostgreSQL implementation of the database connection interface
pub struct PostgresConnection {
    pool: Arc<PgPool>,
}

impl PostgresConnection {
    /// Connect to the server described by `connection`
    pub async fn connect(connection: &ServerConnection) -> DatabaseResult<Self> {
        let database_url = connection
            .driver_url("postgres", 5432)
            .map_err(|e| DatabaseError::Configuration(e.to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&database_url)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

/// PostgreSQL implementation of the database row interface
pub struct PostgresRow {
    row: sqlx::postgres::PgRow,
}

impl DatabaseRow for PostgresRow {
    fn get_string(&self, column: &str) -> DatabaseResult<String> {
        self.row.try_get(column).map_err(|e| {
            DatabaseError::Query(format!("Failed to get string column {}: {}", column, e))
        })
    }

    fn try_get_string(&self, column: &str) -> DatabaseResult<Option<String>> {
        match self.row.try_get::<Option<String>, _>(column) {
            Ok(value) => Ok(value),
            Err(sqlx::Error::ColumnNotFound(_)) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!(
                "Failed to get string column {}: {}",
                column, e
            ))),
        }
    }

    fn try_get_i64(&self, column: &str) -> DatabaseResult<Option<i64>> {
        match self.row.try_get::<Option<i64>, _>(column) {
            Ok(value) => Ok(value),
            Err(sqlx::Error::ColumnNotFound(_)) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!(
                "Failed to get i64 column {}: {}",
                column, e
            ))),
        }
    }
}

#[async_trait]
impl DatabaseConnection for PostgresConnection {
    async fn query(
        &self,
        query: &str,
        params: &[DatabaseValue],
    ) -> DatabaseResult<Vec<Box<dyn DatabaseRow>>> {
        let mut query_builder = sqlx::query(query);

        for param in params {
            match param {
                DatabaseValue::Null => {
                    query_builder = query_builder.bind(None::<String>);
                }
                DatabaseValue::Integer(i) => {
                    query_builder = query_builder.bind(*i);
                }
                DatabaseValue::Text(s) => {
                    query_builder = query_builder.bind(s.clone());
                }
            }
        }

        let rows = query_builder
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| Box::new(PostgresRow { row }) as Box<dyn DatabaseRow>)
            .collect())
    }

    fn get_database_type(&self) -> DatabaseType {
        DatabaseType::Postgres
    }

    async fn close(&self) -> DatabaseResult<()> {
        self.pool.close().await;
        Ok(())
    }
}

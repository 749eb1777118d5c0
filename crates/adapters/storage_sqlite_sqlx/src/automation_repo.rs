//! `SQLite` implementation of [`AutomationRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use flowmail_app::ports::AutomationRepository;
use flowmail_domain::automation::{Automation, Connection, Step};
use flowmail_domain::error::{FlowMailError, NotFoundError};
use flowmail_domain::id::AutomationId;

use crate::error::StorageError;
use crate::{decode_timestamp, encode_timestamp};

struct Wrapper(Automation);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Automation> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let nodes_json: String = row.try_get("nodes")?;
        let edges_json: String = row.try_get("edges")?;
        let created_at: String = row.try_get("created_at")?;

        let id = AutomationId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let nodes: Vec<Step> =
            serde_json::from_str(&nodes_json).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let edges: Vec<Connection> =
            serde_json::from_str(&edges_json).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Automation {
            id,
            name,
            nodes,
            edges,
            created_at: decode_timestamp(&created_at)?,
        }))
    }
}

struct Encoded {
    nodes: String,
    edges: String,
}

fn encode_graph(automation: &Automation) -> Result<Encoded, StorageError> {
    Ok(Encoded {
        nodes: serde_json::to_string(&automation.nodes)?,
        edges: serde_json::to_string(&automation.edges)?,
    })
}

/// `SQLite`-backed automation repository.
pub struct SqliteAutomationRepository {
    pool: SqlitePool,
}

impl SqliteAutomationRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AutomationRepository for SqliteAutomationRepository {
    async fn create(&self, automation: Automation) -> Result<Automation, FlowMailError> {
        let encoded = encode_graph(&automation)?;

        sqlx::query(
            "INSERT INTO automations (id, name, nodes, edges, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(automation.id.to_string())
        .bind(&automation.name)
        .bind(&encoded.nodes)
        .bind(&encoded.edges)
        .bind(encode_timestamp(automation.created_at))
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(automation)
    }

    async fn get_by_id(&self, id: AutomationId) -> Result<Option<Automation>, FlowMailError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM automations WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<Automation>, FlowMailError> {
        let rows: Vec<Wrapper> =
            sqlx::query_as("SELECT * FROM automations ORDER BY created_at DESC, rowid DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Automation>, FlowMailError> {
        // `name` is declared COLLATE NOCASE, so `=` ignores ASCII case.
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM automations WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn update(&self, automation: Automation) -> Result<Automation, FlowMailError> {
        let encoded = encode_graph(&automation)?;

        let result = sqlx::query("UPDATE automations SET name = ?, nodes = ?, edges = ? WHERE id = ?")
            .bind(&automation.name)
            .bind(&encoded.nodes)
            .bind(&encoded.edges)
            .bind(automation.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError {
                entity: "Automation",
                id: automation.id.to_string(),
            }
            .into());
        }
        Ok(automation)
    }

    async fn delete(&self, id: AutomationId) -> Result<(), FlowMailError> {
        sqlx::query("DELETE FROM automations WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}

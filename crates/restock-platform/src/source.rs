use std::future::Future;

use async_trait::async_trait;
use restock_core::{InventoryRecord, PipelineError, SourceSnapshot, UsageRecord, UsageSource};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::db::connect_database;

/// Reads both views from the relational store over one short-lived pool.
pub struct SqlUsageSource {
    config: DatabaseConfig,
}

impl SqlUsageSource {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    async fn read_all(&self, pool: &PgPool) -> Result<SourceSnapshot, PipelineError> {
        let usage_relation = &self.config.usage_relation;
        let rows = self
            .bounded(usage_relation, sqlx::query(&usage_query(usage_relation)).fetch_all(pool))
            .await?;
        let usage = rows
            .iter()
            .map(usage_record)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| query_error(usage_relation, err))?;

        let inventory_relation = &self.config.inventory_relation;
        let rows = self
            .bounded(
                inventory_relation,
                sqlx::query(&inventory_query(inventory_relation)).fetch_all(pool),
            )
            .await?;
        let inventory = rows
            .iter()
            .map(inventory_record)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| query_error(inventory_relation, err))?;

        info!(
            usage = usage.len(),
            inventory = inventory.len(),
            "loaded source snapshot"
        );
        Ok(SourceSnapshot { usage, inventory })
    }

    async fn bounded<T, F>(&self, relation: &str, query: F) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.config.query_timeout, query).await {
            Ok(result) => result.map_err(|err| query_error(relation, err)),
            Err(_) => Err(PipelineError::Query {
                relation: relation.to_string(),
                reason: format!(
                    "timed out after {}s",
                    self.config.query_timeout.as_secs()
                ),
            }),
        }
    }
}

#[async_trait]
impl UsageSource for SqlUsageSource {
    async fn snapshot(&self) -> Result<SourceSnapshot, PipelineError> {
        let pool = connect_database(&self.config).await?;
        let snapshot = self.read_all(&pool).await;
        pool.close().await;
        snapshot
    }
}

pub fn usage_query(relation: &str) -> String {
    format!(
        r#"SELECT "CODIGO PRODUCTO"::text AS product_code,
                  fecha_llamada::text AS called_at,
                  COALESCE(cantidad, 0)::numeric AS quantity
           FROM {relation}"#
    )
}

pub fn inventory_query(relation: &str) -> String {
    format!(
        r#"SELECT "CodProd"::text AS product_code,
                  TRIM(codigo_bodega::text) AS warehouse_code,
                  COALESCE("DesProd"::text, '') AS description,
                  COALESCE(disponible_en_bodega, 0)::numeric AS quantity_on_hand
           FROM {relation}"#
    )
}

fn usage_record(row: &PgRow) -> Result<UsageRecord, sqlx::Error> {
    Ok(UsageRecord {
        product_code: row.try_get("product_code")?,
        called_at: row.try_get("called_at")?,
        quantity: row.try_get::<Decimal, _>("quantity")?,
    })
}

fn inventory_record(row: &PgRow) -> Result<InventoryRecord, sqlx::Error> {
    Ok(InventoryRecord {
        product_code: row.try_get("product_code")?,
        warehouse_code: row
            .try_get::<Option<String>, _>("warehouse_code")?
            .unwrap_or_default(),
        description: row.try_get("description")?,
        quantity_on_hand: row.try_get::<Decimal, _>("quantity_on_hand")?,
    })
}

fn query_error(relation: &str, err: sqlx::Error) -> PipelineError {
    PipelineError::Query {
        relation: relation.to_string(),
        reason: err.to_string(),
    }
}

// ==========================================
// 服务中心库存导入 - 库存 Repository 实现
// ==========================================
// 职责: 实现库存行 upsert / 查询（使用 rusqlite）
// 策略: INSERT ... ON CONFLICT(facility_id, item_code, location) DO UPDATE
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection};
use crate::domain::inventory::InventoryRow;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::inventory_repo::{InventoryRepository, INVENTORY_CONFLICT_KEY};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// InventoryRepositoryImpl
// ==========================================
pub struct InventoryRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl InventoryRepositoryImpl {
    /// 创建新的 Repository 实例（幂等建表）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从共享连接创建
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            ensure_schema(&guard)?;
        }

        Ok(Self { conn })
    }

    /// 校验冲突键与表唯一键一致（列名不拼接外部输入）
    fn validate_conflict_key(conflict_key: &[&str]) -> RepositoryResult<()> {
        let mut requested: Vec<&str> = conflict_key.to_vec();
        let mut expected: Vec<&str> = INVENTORY_CONFLICT_KEY.to_vec();
        requested.sort_unstable();
        expected.sort_unstable();

        if requested != expected {
            return Err(RepositoryError::ValidationError(format!(
                "不支持的冲突键: {:?}（仅支持 {:?}）",
                conflict_key, INVENTORY_CONFLICT_KEY
            )));
        }
        Ok(())
    }

    /// 在事务中批量 upsert
    fn upsert_tx(tx: &Transaction, rows: &[InventoryRow]) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO inventory_item (
                facility_id, item_code, description, quantity,
                location, bin_code, unit_cost, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(facility_id, item_code, location) DO UPDATE SET
                description = excluded.description,
                quantity = excluded.quantity,
                bin_code = excluded.bin_code,
                unit_cost = excluded.unit_cost,
                updated_at = excluded.updated_at
            "#,
        )?;

        let now = Utc::now();
        let mut count = 0;
        for row in rows {
            stmt.execute(params![
                row.facility_id,
                row.item_code,
                row.description,
                row.quantity,
                row.location,
                row.bin_code,
                row.unit_cost.to_string(),
                now,
            ])?;
            count += 1;
        }

        Ok(count)
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<InventoryRow> {
        let unit_cost_raw: String = row.get(6)?;
        let unit_cost = Decimal::from_str(&unit_cost_raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(InventoryRow {
            facility_id: row.get(0)?,
            item_code: row.get(1)?,
            description: row.get(2)?,
            quantity: row.get(3)?,
            location: row.get(4)?,
            bin_code: row.get(5)?,
            unit_cost,
        })
    }
}

#[async_trait]
impl InventoryRepository for InventoryRepositoryImpl {
    async fn upsert_inventory_rows(
        &self,
        rows: &[InventoryRow],
        conflict_key: &[&str],
    ) -> RepositoryResult<usize> {
        Self::validate_conflict_key(conflict_key)?;

        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let count = Self::upsert_tx(&tx, rows)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    async fn count_inventory_rows(&self) -> RepositoryResult<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM inventory_item", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn find_inventory_row(
        &self,
        facility_id: &str,
        item_code: &str,
        location: &str,
    ) -> RepositoryResult<Option<InventoryRow>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let row = conn
            .query_row(
                r#"
                SELECT facility_id, item_code, description, quantity,
                       location, bin_code, unit_cost
                FROM inventory_item
                WHERE facility_id = ?1 AND item_code = ?2 AND location = ?3
                "#,
                params![facility_id, item_code, location],
                Self::map_row,
            )
            .optional()?;

        Ok(row)
    }
}

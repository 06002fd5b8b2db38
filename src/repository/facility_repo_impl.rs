// ==========================================
// 服务中心库存导入 - 仓库 Repository 实现
// ==========================================
// 职责: 实现仓库数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection};
use crate::domain::facility::{Facility, NewFacility};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::facility_repo::FacilityRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// FacilityRepositoryImpl
// ==========================================
pub struct FacilityRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl FacilityRepositoryImpl {
    /// 创建新的 Repository 实例（幂等建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从共享连接创建（与库存仓储共用同一连接）
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

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Facility> {
        Ok(Facility {
            facility_id: row.get(0)?,
            name: row.get(1)?,
            code: row.get(2)?,
            active: row.get::<_, i32>(3)? != 0,
            created_at: row.get::<_, DateTime<Utc>>(4)?,
        })
    }
}

#[async_trait]
impl FacilityRepository for FacilityRepositoryImpl {
    async fn list_facilities(&self, active_only: bool) -> RepositoryResult<Vec<Facility>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT facility_id, name, code, active, created_at
            FROM facility
            WHERE (?1 = 0 OR active = 1)
            ORDER BY code
            "#,
        )?;

        let facilities = stmt
            .query_map(params![active_only as i32], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(facilities)
    }

    async fn create_facilities(
        &self,
        records: Vec<NewFacility>,
    ) -> RepositoryResult<Vec<Facility>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut created = Vec::with_capacity(records.len());
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO facility (facility_id, name, code, active, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;

            for record in records {
                let facility = Facility {
                    facility_id: Uuid::new_v4().to_string(),
                    name: record.name,
                    code: record.code,
                    active: record.active,
                    created_at: Utc::now(),
                };
                stmt.execute(params![
                    facility.facility_id,
                    facility.name,
                    facility.code,
                    facility.active as i32,
                    facility.created_at,
                ])?;
                created.push(facility);
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(created)
    }
}

// ==========================================
// 服务中心库存导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::import_config_trait::ImportConfigReader;
use crate::config::import_settings::{
    DEFAULT_BATCH_SIZE, DEFAULT_DUPLICATE_DETAIL_LIMIT, DEFAULT_ERROR_DETAIL_LIMIT,
    DEFAULT_KEEPALIVE_INTERVAL_SECS, DEFAULT_SUB_BATCH_SIZE,
};
use crate::db::{ensure_schema, open_sqlite_connection};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            ensure_schema(&guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 写入 global scope 配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取正数配置；缺失/非法/非正数时回退默认值
    fn get_positive_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr + PartialOrd + Default + Copy + std::fmt::Display,
    {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match raw.trim().parse::<T>() {
            Ok(v) if v > T::default() => Ok(v),
            _ => {
                warn!(key = key, value = %raw, default = %default, "配置值非法，使用默认值");
                Ok(default)
            }
        }
    }
}

// ==========================================
// ImportConfigReader 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_batch_size(&self) -> ConfigResult<usize> {
        self.get_positive_or_default(config_keys::BATCH_SIZE, DEFAULT_BATCH_SIZE)
    }

    async fn get_sub_batch_size(&self) -> ConfigResult<usize> {
        self.get_positive_or_default(config_keys::SUB_BATCH_SIZE, DEFAULT_SUB_BATCH_SIZE)
    }

    async fn get_keepalive_interval_secs(&self) -> ConfigResult<u64> {
        self.get_positive_or_default(
            config_keys::KEEPALIVE_INTERVAL_SECS,
            DEFAULT_KEEPALIVE_INTERVAL_SECS,
        )
    }

    async fn get_duplicate_detail_limit(&self) -> ConfigResult<usize> {
        self.get_positive_or_default(
            config_keys::DUPLICATE_DETAIL_LIMIT,
            DEFAULT_DUPLICATE_DETAIL_LIMIT,
        )
    }

    async fn get_error_detail_limit(&self) -> ConfigResult<usize> {
        self.get_positive_or_default(config_keys::ERROR_DETAIL_LIMIT, DEFAULT_ERROR_DETAIL_LIMIT)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const BATCH_SIZE: &str = "inventory_import/batch_size";
    pub const SUB_BATCH_SIZE: &str = "inventory_import/sub_batch_size";
    pub const KEEPALIVE_INTERVAL_SECS: &str = "inventory_import/keepalive_interval_secs";
    pub const DUPLICATE_DETAIL_LIMIT: &str = "inventory_import/duplicate_detail_limit";
    pub const ERROR_DETAIL_LIMIT: &str = "inventory_import/error_detail_limit";
}

// ==========================================
// 服务中心库存导入 - 导入 API
// ==========================================
// 职责: 封装导入控制器，向界面层提供 serde DTO
// 存储: SQLite（仓库 / 库存 / 配置共用同一连接）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{default_db_path, ConfigManager, ImportConfigReader, ImportSettings};
use crate::db::open_sqlite_connection;
use crate::domain::facility::Facility;
use crate::domain::inventory::{FacilityCodeSummaryEntry, ImportSummary};
use crate::domain::types::ImportPhase;
use crate::importer::{
    InventoryImporter, InventoryImporterImpl, NoopSessionRefresher, ProgressSnapshot,
    SessionRefresher, UniversalFileParser,
};
use crate::repository::{
    FacilityRepository, FacilityRepositoryImpl, InventoryRepository, InventoryRepositoryImpl,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::info;

type SqliteImporter =
    InventoryImporterImpl<FacilityRepositoryImpl, InventoryRepositoryImpl, dyn SessionRefresher>;

/// 预览响应（分析 / 切换选择 / 创建仓库后返回）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPreviewResponse {
    pub phase: ImportPhase,
    /// 文件来源
    pub source: String,
    /// 源文件数据行数
    pub total_rows: usize,
    /// 仓库编码汇总（行数降序）
    pub facility_summary: Vec<FacilityCodeSummaryEntry>,
    /// 未解析原始值数量
    pub unresolved_count: usize,
    /// 已选中待创建的原始值
    pub selected_for_creation: Vec<String>,
}

/// 仓库创建响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFacilitiesResponse {
    pub created: Vec<Facility>,
    pub preview: ImportPreviewResponse,
}

/// 状态响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportStatusResponse {
    /// 当前阶段（控制器忙时为 None）
    pub phase: Option<ImportPhase>,
    pub busy: bool,
    pub progress: ProgressSnapshot,
}

/// 库存导入 API
pub struct InventoryImportApi {
    importer: AsyncMutex<SqliteImporter>,
    facility_repo: Arc<FacilityRepositoryImpl>,
    inventory_repo: Arc<InventoryRepositoryImpl>,
    progress: watch::Receiver<ProgressSnapshot>,
}

impl InventoryImportApi {
    /// 打开数据库并创建 API 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    /// - session: 会话刷新器（导入期间定时调用）
    pub async fn open(db_path: &str, session: Arc<dyn SessionRefresher>) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        let conn = Arc::new(Mutex::new(conn));

        let config = ConfigManager::from_connection(conn.clone())?;
        let settings = config.load_import_settings().await?;

        let facility_repo = Arc::new(FacilityRepositoryImpl::from_connection(conn.clone())?);
        let inventory_repo = Arc::new(InventoryRepositoryImpl::from_connection(conn)?);

        info!(db_path = %db_path, settings = ?settings, "库存导入 API 已初始化");
        Ok(Self::with_parts(facility_repo, inventory_repo, session, settings))
    }

    /// 本地部署（无会话需要保活）
    pub async fn open_local(db_path: &str) -> ApiResult<Self> {
        Self::open(db_path, Arc::new(NoopSessionRefresher)).await
    }

    /// 使用默认数据库路径（SERVICE_CENTER_DB_PATH 或用户数据目录）
    pub async fn open_default(session: Arc<dyn SessionRefresher>) -> ApiResult<Self> {
        Self::open(&default_db_path(), session).await
    }

    fn with_parts(
        facility_repo: Arc<FacilityRepositoryImpl>,
        inventory_repo: Arc<InventoryRepositoryImpl>,
        session: Arc<dyn SessionRefresher>,
        settings: ImportSettings,
    ) -> Self {
        let importer = InventoryImporterImpl::new(
            facility_repo.clone(),
            inventory_repo.clone(),
            session,
            settings,
        );
        let progress = importer.subscribe_progress();
        Self {
            importer: AsyncMutex::new(importer),
            facility_repo,
            inventory_repo,
            progress,
        }
    }

    /// 选择文件并分析
    pub async fn analyze_file(&self, file_path: &str) -> ApiResult<ImportPreviewResponse> {
        let mut importer = self.importer.lock().await;
        importer.load_file(Path::new(file_path)).await?;
        preview_response(&importer)
    }

    /// 分析上传内容（按文件名扩展名解码）
    pub async fn analyze_upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<ImportPreviewResponse> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string();
        let rows = UniversalFileParser.parse_bytes(bytes, &extension)?;

        let mut importer = self.importer.lock().await;
        importer.analyze_rows(file_name.to_string(), rows).await?;
        preview_response(&importer)
    }

    /// 切换原始值的创建选择
    pub async fn toggle_facility_selection(
        &self,
        raw_value: &str,
    ) -> ApiResult<ImportPreviewResponse> {
        let mut importer = self.importer.lock().await;
        importer.toggle_selection(raw_value)?;
        preview_response(&importer)
    }

    /// 批量创建选中的缺失仓库
    pub async fn create_missing_facilities(&self) -> ApiResult<CreateFacilitiesResponse> {
        let mut importer = self.importer.lock().await;
        let created = importer.create_missing_facilities().await?;
        Ok(CreateFacilitiesResponse {
            created,
            preview: preview_response(&importer)?,
        })
    }

    /// 执行导入
    pub async fn start_import(&self) -> ApiResult<ImportSummary> {
        let mut importer = self.importer.lock().await;
        Ok(importer.run_import().await?)
    }

    /// 重置到 Idle
    pub async fn reset(&self) -> ApiResult<()> {
        let mut importer = self.importer.lock().await;
        Ok(importer.reset()?)
    }

    /// 当前阶段与进度（导入进行中不阻塞）
    pub fn status(&self) -> ImportStatusResponse {
        let progress = self.progress.borrow().clone();
        match self.importer.try_lock() {
            Ok(importer) => ImportStatusResponse {
                phase: Some(importer.phase()),
                busy: false,
                progress,
            },
            Err(_) => ImportStatusResponse {
                phase: None,
                busy: true,
                progress,
            },
        }
    }

    /// 订阅导入进度
    pub fn subscribe_progress(&self) -> watch::Receiver<ProgressSnapshot> {
        self.progress.clone()
    }

    /// 仓库列表
    pub async fn list_facilities(&self, active_only: bool) -> ApiResult<Vec<Facility>> {
        Ok(self.facility_repo.list_facilities(active_only).await?)
    }

    /// 已入库存行数
    pub async fn count_inventory_rows(&self) -> ApiResult<usize> {
        Ok(self.inventory_repo.count_inventory_rows().await?)
    }
}

fn preview_response(importer: &SqliteImporter) -> ApiResult<ImportPreviewResponse> {
    let preview = importer.state().preview().ok_or_else(|| ApiError::InvalidPhase {
        phase: importer.phase().to_string(),
        action: "PREVIEW".to_string(),
    })?;

    Ok(ImportPreviewResponse {
        phase: importer.phase(),
        source: preview.source.clone(),
        total_rows: preview.rows.len(),
        facility_summary: preview.summary.clone(),
        unresolved_count: preview.summary.iter().filter(|e| !e.is_resolved()).count(),
        selected_for_creation: preview.selected_for_creation.iter().cloned().collect(),
    })
}

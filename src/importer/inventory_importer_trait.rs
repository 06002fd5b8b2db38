// ==========================================
// 服务中心库存导入 - 导入器 Trait
// ==========================================
// 职责: 定义导入控制器与外部协作方接口（不包含实现）
// ==========================================

use crate::domain::facility::Facility;
use crate::domain::inventory::{FacilityCodeSummaryEntry, ImportSummary, RawImportRow};
use crate::domain::types::ImportPhase;
use crate::importer::error::ImportResult;
use crate::importer::progress::ProgressSnapshot;
use crate::importer::run_state::ImportRunState;
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::watch;

// ==========================================
// InventoryImporter Trait
// ==========================================
// 用途: 库存导入主接口（唯一持有运行状态的控制器）
// 实现者: InventoryImporterImpl
#[async_trait]
pub trait InventoryImporter: Send {
    /// 选择文件并分析
    ///
    /// # 返回
    /// - Ok(Vec<FacilityCodeSummaryEntry>): 仓库编码汇总，进入 Preview
    /// - Err: 阻断错误（空文件 / 缺列 / 解析失败），回到 Idle
    async fn load_file(&mut self, file_path: &Path) -> ImportResult<Vec<FacilityCodeSummaryEntry>>;

    /// 分析已解析的行（上传场景，由调用方完成解码）
    async fn analyze_rows(
        &mut self,
        source: String,
        rows: Vec<RawImportRow>,
    ) -> ImportResult<Vec<FacilityCodeSummaryEntry>>;

    /// 切换原始值是否纳入待创建集合（仅 Preview）
    fn toggle_selection(&mut self, raw_value: &str) -> ImportResult<()>;

    /// 为选中的未解析原始值批量创建仓库
    ///
    /// # 返回
    /// - Ok(Vec<Facility>): 新建仓库，回到 Preview（汇总已重新解析）
    /// - Err(FacilityCreationFailed): 回到 Preview，汇总不变，可重试
    async fn create_missing_facilities(&mut self) -> ImportResult<Vec<Facility>>;

    /// 执行导入（去重 → 分批写入 → 汇总），导入期间会话保活
    ///
    /// # 返回
    /// - Ok(ImportSummary): 进入 Done
    /// - Err: 回到 Preview
    async fn run_import(&mut self) -> ImportResult<ImportSummary>;

    /// 重置到 Idle（Importing 阶段不可重置）
    fn reset(&mut self) -> ImportResult<()>;

    fn phase(&self) -> ImportPhase;

    fn state(&self) -> &ImportRunState;

    /// 订阅导入进度
    fn subscribe_progress(&self) -> watch::Receiver<ProgressSnapshot>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 表格解码
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行（保持列顺序，跳过全空行）
    ///
    /// # 返回
    /// - Ok(Vec<RawImportRow>): 行记录列表
    /// - Err: 文件不存在 / 格式不支持 / 解码失败
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawImportRow>>;
}

// ==========================================
// SessionRefresher Trait
// ==========================================
// 用途: 导入期间刷新操作员会话
// 实现者: 宿主应用（本地部署使用 NoopSessionRefresher）
#[async_trait]
pub trait SessionRefresher: Send + Sync {
    async fn refresh_session(&self) -> anyhow::Result<()>;
}

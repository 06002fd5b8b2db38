// ==========================================
// 服务中心库存导入 - 导入控制器实现
// ==========================================
// 职责: 持有运行状态，串联整个导入管道
// 流程: 解析 → 分析（校验 + 仓库编码汇总）→（可选）创建缺失仓库
//       → 去重解析 → 分批写入（进度 + 会话保活）→ 汇总报告
// 约束: 批次严格串行；保活是唯一的并发活动，离开 Importing 时必定停止
// ==========================================

use crate::config::ImportSettings;
use crate::domain::facility::Facility;
use crate::domain::inventory::{FacilityCodeSummaryEntry, ImportSummary, RawImportRow};
use crate::domain::types::ImportPhase;
use crate::importer::batch_upserter::BatchUpserter;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::facility_code::FacilityIndex;
use crate::importer::facility_creator::MissingFacilityCreator;
use crate::importer::file_analyzer::FileAnalyzer;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::inventory_importer_trait::{FileParser, InventoryImporter, SessionRefresher};
use crate::importer::progress::{ProgressSnapshot, ProgressTracker};
use crate::importer::row_resolver::RowResolver;
use crate::importer::run_state::{ImportEvent, ImportRunState};
use crate::importer::session_keepalive::SessionKeepalive;
use crate::importer::summary_reporter::{ReportInput, SummaryReporter};
use crate::repository::facility_repo::FacilityRepository;
use crate::repository::inventory_repo::InventoryRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// InventoryImporterImpl - 导入控制器
// ==========================================
pub struct InventoryImporterImpl<F, I, S>
where
    F: FacilityRepository + ?Sized,
    I: InventoryRepository + ?Sized,
    S: SessionRefresher + ?Sized,
{
    // 数据访问层
    facility_repo: Arc<F>,
    inventory_repo: Arc<I>,

    // 会话刷新
    session: Arc<S>,

    // 导入参数
    settings: ImportSettings,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    analyzer: FileAnalyzer,

    // 运行期状态
    index: FacilityIndex,
    state: ImportRunState,
    progress: Arc<watch::Sender<ProgressSnapshot>>,
}

impl<F, I, S> InventoryImporterImpl<F, I, S>
where
    F: FacilityRepository + ?Sized,
    I: InventoryRepository + ?Sized,
    S: SessionRefresher + ?Sized + 'static,
{
    /// 创建导入控制器（默认按扩展名解析文件）
    pub fn new(
        facility_repo: Arc<F>,
        inventory_repo: Arc<I>,
        session: Arc<S>,
        settings: ImportSettings,
    ) -> Self {
        let (progress, _) = watch::channel(ProgressSnapshot::default());
        Self {
            facility_repo,
            inventory_repo,
            session,
            settings,
            file_parser: Box::new(UniversalFileParser),
            analyzer: FileAnalyzer::new(),
            index: FacilityIndex::default(),
            state: ImportRunState::default(),
            progress: Arc::new(progress),
        }
    }

    /// 替换文件解析器
    pub fn with_file_parser(mut self, file_parser: Box<dyn FileParser>) -> Self {
        self.file_parser = file_parser;
        self
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// 状态转换；非法转换时保留原状态
    fn transition(&mut self, event: ImportEvent) -> ImportResult<()> {
        let current = std::mem::take(&mut self.state);
        let from = current.phase();
        match current.try_apply(event) {
            Ok(next) => {
                debug!(from = %from, to = %next.phase(), "阶段转换");
                self.state = next;
                Ok(())
            }
            Err((original, err)) => {
                warn!(from = %from, error = %err, "拒绝阶段转换");
                self.state = original;
                Err(err)
            }
        }
    }

    /// Analyzing 阶段：校验 → 加载仓库 → 汇总
    async fn analyze_parsed(
        &mut self,
        rows: Vec<RawImportRow>,
    ) -> ImportResult<Vec<FacilityCodeSummaryEntry>> {
        // 空文件 / 缺列在查询仓库前拦截
        if let Err(e) = self.analyzer.validate(&rows) {
            warn!(error = %e, "文件校验未通过");
            self.transition(ImportEvent::AnalysisFailed)?;
            return Err(e);
        }

        let facilities = match self.facility_repo.list_facilities(false).await {
            Ok(list) => list,
            Err(e) => {
                error!(error = %e, "加载仓库列表失败");
                self.transition(ImportEvent::AnalysisFailed)?;
                return Err(e.into());
            }
        };
        self.index = FacilityIndex::build(&facilities);

        let summary = self.analyzer.analyze(&rows, &self.index);
        info!(
            rows = rows.len(),
            facilities = self.index.len(),
            groups = summary.len(),
            unresolved = summary.iter().filter(|e| !e.is_resolved()).count(),
            "文件分析完成"
        );

        self.transition(ImportEvent::AnalysisSucceeded {
            rows,
            summary: summary.clone(),
        })?;
        Ok(summary)
    }

    /// Importing 阶段主体：去重 → 分批写入 → 汇总
    async fn execute_import(
        &self,
        run_id: &str,
        started_at: DateTime<Utc>,
    ) -> ImportResult<ImportSummary> {
        let preview = self
            .state
            .preview()
            .ok_or_else(|| ImportError::InternalError("导入阶段缺少预览数据".to_string()))?;

        // === 步骤 1: 去重解析 ===
        let resolver = RowResolver::new(self.settings.duplicate_detail_limit);
        let resolved = resolver.resolve(&preview.rows, &self.index);

        // === 步骤 2: 分批写入 ===
        let mut progress = ProgressTracker::new(resolved.rows.len(), self.progress.clone());
        let upserter = BatchUpserter::new(self.inventory_repo.clone(), &self.settings);
        let upserted = upserter.upsert_all(&resolved.rows, &mut progress).await;

        // === 步骤 3: 汇总报告 ===
        let summary = SummaryReporter.build(ReportInput {
            run_id,
            total_rows: preview.rows.len(),
            facility_breakdown: &preview.summary,
            resolved: &resolved,
            upserted: &upserted,
            started_at,
            finished_at: Utc::now(),
        });

        Ok(summary)
    }
}

#[async_trait]
impl<F, I, S> InventoryImporter for InventoryImporterImpl<F, I, S>
where
    F: FacilityRepository + ?Sized + 'static,
    I: InventoryRepository + ?Sized + 'static,
    S: SessionRefresher + ?Sized + 'static,
{
    #[instrument(skip(self, file_path), fields(file = %file_path.display()))]
    async fn load_file(&mut self, file_path: &Path) -> ImportResult<Vec<FacilityCodeSummaryEntry>> {
        self.transition(ImportEvent::FileSelected {
            source: file_path.display().to_string(),
        })?;

        let rows = match self.file_parser.parse_to_raw_rows(file_path) {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, "文件解析失败");
                self.transition(ImportEvent::AnalysisFailed)?;
                return Err(e);
            }
        };
        info!(rows = rows.len(), "文件解析完成");

        self.analyze_parsed(rows).await
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn analyze_rows(
        &mut self,
        source: String,
        rows: Vec<RawImportRow>,
    ) -> ImportResult<Vec<FacilityCodeSummaryEntry>> {
        self.transition(ImportEvent::FileSelected { source })?;
        self.analyze_parsed(rows).await
    }

    fn toggle_selection(&mut self, raw_value: &str) -> ImportResult<()> {
        self.transition(ImportEvent::ToggleFacilitySelection {
            raw_value: raw_value.to_string(),
        })
    }

    #[instrument(skip(self))]
    async fn create_missing_facilities(&mut self) -> ImportResult<Vec<Facility>> {
        self.transition(ImportEvent::CreateFacilitiesRequested)?;

        let (selected, mut summary) = match self.state.preview() {
            Some(p) => (p.selected_for_creation.clone(), p.summary.clone()),
            None => {
                return Err(ImportError::InternalError(
                    "创建阶段缺少预览数据".to_string(),
                ))
            }
        };

        let creator = MissingFacilityCreator::new(self.facility_repo.clone());
        let mut index = self.index.clone();
        match creator.create_missing(&selected, &mut summary, &mut index).await {
            Ok(created) => {
                self.index = index;
                self.transition(ImportEvent::FacilitiesCreated { summary })?;
                Ok(created)
            }
            Err(e) => {
                self.transition(ImportEvent::FacilityCreationFailed)?;
                Err(e)
            }
        }
    }

    #[instrument(skip(self), fields(run_id))]
    async fn run_import(&mut self) -> ImportResult<ImportSummary> {
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());
        let started_at = Utc::now();

        self.transition(ImportEvent::ImportStarted { started_at })?;
        info!(run_id = %run_id, "开始导入库存");

        let keepalive =
            SessionKeepalive::start(self.session.clone(), self.settings.keepalive_interval());
        let result = self.execute_import(&run_id, started_at).await;
        keepalive.stop().await;

        match result {
            Ok(summary) => {
                info!(
                    run_id = %run_id,
                    total = summary.total_rows,
                    valid = summary.valid_rows,
                    imported = summary.imported,
                    errors = summary.errors,
                    duplicates = summary.duplicates,
                    skipped = summary.skipped_rows,
                    elapsed_ms = summary.elapsed_ms,
                    "库存导入完成"
                );
                self.transition(ImportEvent::ImportFinished {
                    summary: summary.clone(),
                })?;
                Ok(summary)
            }
            Err(e) => {
                error!(run_id = %run_id, error = %e, "库存导入失败");
                self.transition(ImportEvent::ImportFailed)?;
                Err(e)
            }
        }
    }

    fn reset(&mut self) -> ImportResult<()> {
        self.transition(ImportEvent::Reset)?;
        self.progress.send_replace(ProgressSnapshot::default());
        Ok(())
    }

    fn phase(&self) -> ImportPhase {
        self.state.phase()
    }

    fn state(&self) -> &ImportRunState {
        &self.state
    }

    fn subscribe_progress(&self) -> watch::Receiver<ProgressSnapshot> {
        self.progress.subscribe()
    }
}

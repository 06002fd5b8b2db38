// ==========================================
// 服务中心库存导入 - 导入层
// ==========================================
// 职责: 表格文件 → 规范库存行 → 分批写入
// 支持: Excel (.xlsx/.xls/.ods), CSV
// ==========================================

// 模块声明
pub mod batch_upserter;
pub mod data_cleaner;
pub mod error;
pub mod facility_code;
pub mod facility_creator;
pub mod field_mapper;
pub mod file_analyzer;
pub mod file_parser;
pub mod inventory_importer_impl;
pub mod inventory_importer_trait;
pub mod progress;
pub mod row_resolver;
pub mod run_state;
pub mod session_keepalive;
pub mod summary_reporter;
pub mod text_normalizer;

// 重导出核心类型
pub use batch_upserter::{BatchUpserter, UpsertOutcome};
pub use data_cleaner::{Cleaned, DataCleaner};
pub use error::{ImportError, ImportResult};
pub use facility_code::{to_canonical_code, FacilityIndex, FACILITY_CODE_PREFIX};
pub use facility_creator::MissingFacilityCreator;
pub use field_mapper::{extract, extract_opt, FieldMapper, ImportField};
pub use file_analyzer::{unresolved_entries, FileAnalyzer};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use inventory_importer_impl::InventoryImporterImpl;
pub use progress::{estimate_remaining, EtaEstimate, ProgressSnapshot, ProgressTracker};
pub use row_resolver::{ResolveOutcome, RowResolver};
pub use run_state::{ImportEvent, ImportRunState, PreviewData};
pub use session_keepalive::{KeepaliveHandle, NoopSessionRefresher, SessionKeepalive};
pub use summary_reporter::{ReportInput, SummaryReporter};
pub use text_normalizer::normalize_text;

// 重导出 Trait 接口
pub use inventory_importer_trait::{FileParser, InventoryImporter, SessionRefresher};

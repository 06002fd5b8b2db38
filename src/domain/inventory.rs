// ==========================================
// 服务中心库存导入 - 库存领域模型
// ==========================================
// 职责: 原始导入行 / 规范库存行 / 仓库编码汇总 / 导入汇总报告
// ==========================================

use crate::domain::facility::Facility;
use crate::domain::types::ResolutionStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// RawImportRow - 原始导入行
// ==========================================
// 用途: 文件解析产物（列名 → 标量值），保持列顺序
// 生命周期: 仅在单次导入内
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawImportRow {
    pub row_number: usize, // 表格物理行号（表头 = 1，首个数据行 = 2）
    pub columns: Vec<(String, String)>,
}

impl RawImportRow {
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            columns: Vec::new(),
        }
    }

    /// 由 (列名, 值) 对构造
    pub fn from_pairs<K, V, I>(row_number: usize, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            row_number,
            columns: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.columns.push((column.into(), value.into()));
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(k, _)| k.as_str())
    }

    /// 全部单元格为空白
    pub fn is_blank(&self) -> bool {
        self.columns.iter().all(|(_, v)| v.trim().is_empty())
    }
}

// ==========================================
// InventoryRow - 规范库存行
// ==========================================
// 唯一键: (facility_id, item_code, location)
// location 缺失时为空串，保证唯一索引生效
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub facility_id: String,         // 所属仓库
    pub item_code: String,           // 物料编码（必填，非空）
    pub description: Option<String>, // 描述
    pub quantity: i64,               // 数量（>= 0）
    pub location: String,            // 库位标签
    pub bin_code: String,            // 仓库本地编码（规范仓库编码）
    pub unit_cost: Decimal,          // 单位成本
}

impl InventoryRow {
    /// 去重键
    pub fn dedup_key(&self) -> InventoryKey {
        InventoryKey::new(&self.facility_id, &self.item_code, &self.location)
    }
}

// ==========================================
// InventoryKey - 库存唯一键
// ==========================================
// 与存储冲突键一致: 仓库 + 物料编码 + 库位（逐字段比较，不做拼接）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InventoryKey {
    pub facility_id: String,
    pub item_code: String,
    pub location: String,
}

impl InventoryKey {
    pub fn new(facility_id: &str, item_code: &str, location: &str) -> Self {
        Self {
            facility_id: facility_id.to_string(),
            item_code: item_code.to_string(),
            location: location.to_string(),
        }
    }
}

impl std::fmt::Display for InventoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:?}, {:?}, {:?})",
            self.facility_id, self.item_code, self.location
        )
    }
}

// ==========================================
// FacilityCodeSummaryEntry - 仓库编码汇总条目
// ==========================================
// 按原始值分组（不按规范编码合并），便于操作员核对源数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityCodeSummaryEntry {
    pub raw_value: String,          // 文件中的原始值
    pub canonical_code: String,     // 规范编码（B###）
    pub row_count: usize,           // 该原始值的行数
    pub status: ResolutionStatus,   // 解析状态
    pub facility: Option<Facility>, // 已解析仓库
}

impl FacilityCodeSummaryEntry {
    pub fn is_resolved(&self) -> bool {
        self.status == ResolutionStatus::Resolved
    }
}

// ==========================================
// UnresolvedFacility - 未解析仓库原始值
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedFacility {
    pub raw_value: String,
    pub row_count: usize,
}

// ==========================================
// ImportSummary - 导入汇总报告
// ==========================================
// 仅用于展示，不落库
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub run_id: String,

    // ===== 行数统计 =====
    pub total_rows: usize,           // 源文件行数
    pub valid_rows: usize,           // 去重后有效行数
    pub skipped_rows: usize,         // 跳过行数（无物料编码 + 无仓库）
    pub skipped_no_item_code: usize, // 无物料编码
    pub skipped_no_facility: usize,  // 仓库无法解析

    // ===== 写入结果 =====
    pub imported: usize,
    pub errors: usize,
    pub duplicates: usize,

    // ===== 默认值替换（数据质量审计）=====
    pub defaulted_quantity: usize,
    pub defaulted_unit_cost: usize,

    // ===== 明细 =====
    pub facility_breakdown: Vec<FacilityCodeSummaryEntry>,
    pub duplicate_details: Vec<String>,
    pub error_details: Vec<String>,
    pub unresolved_facilities: Vec<UnresolvedFacility>,

    // ===== 时间 =====
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

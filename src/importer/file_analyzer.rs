// ==========================================
// 服务中心库存导入 - 文件分析器
// ==========================================
// 职责: 必需列校验 + 按原始仓库标识分组汇总
// 流程:
//   1. 非空校验（不查询仓库数据）
//   2. 表头并集必须覆盖 CODIGO / CANTIDAD / CS
//   3. 逐行提取仓库标识，空值行不参与汇总
//   4. 按原始值（去首尾空白）分组，解析规范编码与仓库
//   5. 行数降序；同数按首次出现顺序
// ==========================================

use crate::domain::inventory::{FacilityCodeSummaryEntry, RawImportRow, UnresolvedFacility};
use crate::domain::types::ResolutionStatus;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::facility_code::{to_canonical_code, FacilityIndex};
use crate::importer::field_mapper::{FieldMapper, ImportField};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

pub struct FileAnalyzer {
    mapper: FieldMapper,
}

impl Default for FileAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl FileAnalyzer {
    pub fn new() -> Self {
        Self {
            mapper: FieldMapper,
        }
    }

    /// 阻断校验：空文件 / 缺少必需列
    pub fn validate(&self, rows: &[RawImportRow]) -> ImportResult<()> {
        if rows.is_empty() {
            return Err(ImportError::EmptyFile);
        }

        // 各行列名并集（保持首次出现顺序）
        let mut seen = BTreeSet::new();
        let mut headers: Vec<&str> = Vec::new();
        for name in rows.iter().flat_map(|r| r.column_names()) {
            if seen.insert(name) {
                headers.push(name);
            }
        }

        let missing = self.mapper.missing_required(headers.iter().copied());
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(
                missing.iter().map(|f| f.display_name().to_string()).collect(),
            ));
        }

        Ok(())
    }

    /// 构建仓库编码汇总
    pub fn analyze(
        &self,
        rows: &[RawImportRow],
        index: &FacilityIndex,
    ) -> Vec<FacilityCodeSummaryEntry> {
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();

        for row in rows {
            let raw = self.mapper.get_string(row, ImportField::Facility);
            if raw.is_empty() {
                continue;
            }
            let count = counts.entry(raw.clone()).or_insert_with(|| {
                order.push(raw.clone());
                0
            });
            *count += 1;
        }

        let mut entries: Vec<FacilityCodeSummaryEntry> = order
            .into_iter()
            .map(|raw_value| {
                let row_count = counts.get(&raw_value).copied().unwrap_or(0);
                let mut entry = FacilityCodeSummaryEntry {
                    canonical_code: to_canonical_code(&raw_value),
                    raw_value,
                    row_count,
                    status: ResolutionStatus::Unresolved,
                    facility: None,
                };
                resolve_entry(&mut entry, index);
                entry
            })
            .collect();

        // sort_by 为稳定排序：同数保持首次出现顺序
        entries.sort_by(|a, b| b.row_count.cmp(&a.row_count));

        debug!(
            groups = entries.len(),
            unresolved = entries.iter().filter(|e| !e.is_resolved()).count(),
            "仓库编码汇总完成"
        );
        entries
    }

    /// 仓库集合变化后原地重新解析
    pub fn re_resolve(&self, entries: &mut [FacilityCodeSummaryEntry], index: &FacilityIndex) {
        for entry in entries.iter_mut() {
            resolve_entry(entry, index);
        }
    }
}

fn resolve_entry(entry: &mut FacilityCodeSummaryEntry, index: &FacilityIndex) {
    match index.resolve(&entry.canonical_code) {
        Some(facility) => {
            entry.status = ResolutionStatus::Resolved;
            entry.facility = Some(facility.clone());
        }
        None => {
            entry.status = ResolutionStatus::Unresolved;
            entry.facility = None;
        }
    }
}

/// 汇总中未解析的原始值
pub fn unresolved_entries(entries: &[FacilityCodeSummaryEntry]) -> Vec<UnresolvedFacility> {
    entries
        .iter()
        .filter(|e| !e.is_resolved())
        .map(|e| UnresolvedFacility {
            raw_value: e.raw_value.clone(),
            row_count: e.row_count,
        })
        .collect()
}

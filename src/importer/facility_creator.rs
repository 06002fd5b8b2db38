// ==========================================
// 服务中心库存导入 - 缺失仓库批量创建
// ==========================================
// 职责: 为选中的未解析原始标识批量创建仓库，随后重建索引并原地重新解析汇总
// 约束:
//   - 默认选中全部未解析原始值
//   - 无数字的原始值（规范编码为空）忽略
//   - 多个原始值映射到同一规范编码时只创建一个仓库
//   - 索引中已存在的编码不重复创建
//   - 创建失败时汇总与索引保持不变，可重试
// ==========================================

use crate::domain::facility::{Facility, NewFacility};
use crate::domain::inventory::FacilityCodeSummaryEntry;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::facility_code::{to_canonical_code, FacilityIndex};
use crate::importer::file_analyzer::FileAnalyzer;
use crate::repository::facility_repo::FacilityRepository;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{error, info, instrument};

pub struct MissingFacilityCreator<F>
where
    F: FacilityRepository + ?Sized,
{
    facility_repo: Arc<F>,
    analyzer: FileAnalyzer,
}

impl<F> MissingFacilityCreator<F>
where
    F: FacilityRepository + ?Sized,
{
    pub fn new(facility_repo: Arc<F>) -> Self {
        Self {
            facility_repo,
            analyzer: FileAnalyzer::new(),
        }
    }

    /// 默认选择：全部未解析的原始值
    pub fn default_selection(entries: &[FacilityCodeSummaryEntry]) -> BTreeSet<String> {
        entries
            .iter()
            .filter(|e| !e.is_resolved())
            .map(|e| e.raw_value.clone())
            .collect()
    }

    /// 计算待创建仓库（纯函数，按规范编码去重）
    pub fn plan(selected: &BTreeSet<String>, index: &FacilityIndex) -> Vec<NewFacility> {
        let mut codes = BTreeSet::new();
        for raw in selected {
            let code = to_canonical_code(raw);
            if code.is_empty() || index.contains_code(&code) {
                continue;
            }
            codes.insert(code);
        }
        codes.iter().map(|code| NewFacility::for_code(code)).collect()
    }

    /// 批量创建并重新解析汇总
    ///
    /// # 返回
    /// - Ok(Vec<Facility>): 新建仓库（无需创建时为空）
    /// - Err(FacilityCreationFailed): summary / index 未被修改
    #[instrument(skip(self, summary, index), fields(selected = selected.len()))]
    pub async fn create_missing(
        &self,
        selected: &BTreeSet<String>,
        summary: &mut [FacilityCodeSummaryEntry],
        index: &mut FacilityIndex,
    ) -> ImportResult<Vec<Facility>> {
        let plan = Self::plan(selected, index);

        let created = if plan.is_empty() {
            info!("无需创建仓库");
            Vec::new()
        } else {
            let codes: Vec<String> = plan.iter().map(|f| f.code.clone()).collect();
            info!(count = plan.len(), codes = ?codes, "开始批量创建仓库");

            self.facility_repo
                .create_facilities(plan)
                .await
                .map_err(|e| {
                    error!(error = %e, "仓库批量创建失败");
                    ImportError::FacilityCreationFailed(e.to_string())
                })?
        };

        *index = index.rebuild_with(&created);
        self.analyzer.re_resolve(summary, index);

        info!(
            created = created.len(),
            unresolved = summary.iter().filter(|e| !e.is_resolved()).count(),
            "仓库创建完成，汇总已重新解析"
        );
        Ok(created)
    }
}

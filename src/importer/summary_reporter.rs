// ==========================================
// 服务中心库存导入 - 汇总报告
// ==========================================
// 职责: 汇集分析 / 去重 / 写入结果，生成展示用 ImportSummary
// 红线: 纯组装，不落库
// ==========================================

use crate::domain::inventory::{FacilityCodeSummaryEntry, ImportSummary, UnresolvedFacility};
use crate::importer::batch_upserter::UpsertOutcome;
use crate::importer::row_resolver::ResolveOutcome;
use chrono::{DateTime, Utc};

pub struct ReportInput<'a> {
    pub run_id: &'a str,
    pub total_rows: usize,
    pub facility_breakdown: &'a [FacilityCodeSummaryEntry],
    pub resolved: &'a ResolveOutcome,
    pub upserted: &'a UpsertOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct SummaryReporter;

impl SummaryReporter {
    pub fn build(&self, input: ReportInput<'_>) -> ImportSummary {
        let resolved = input.resolved;
        let upserted = input.upserted;

        ImportSummary {
            run_id: input.run_id.to_string(),
            total_rows: input.total_rows,
            valid_rows: resolved.rows.len(),
            skipped_rows: resolved.skipped_rows(),
            skipped_no_item_code: resolved.skipped_no_item_code,
            skipped_no_facility: resolved.skipped_no_facility,
            imported: upserted.imported,
            errors: upserted.errors,
            duplicates: resolved.duplicate_count,
            defaulted_quantity: resolved.defaulted_quantity,
            defaulted_unit_cost: resolved.defaulted_unit_cost,
            facility_breakdown: input.facility_breakdown.to_vec(),
            duplicate_details: resolved.duplicate_details.clone(),
            error_details: upserted.error_details.clone(),
            unresolved_facilities: unresolved_from(resolved),
            started_at: input.started_at,
            finished_at: input.finished_at,
            elapsed_ms: (input.finished_at - input.started_at)
                .num_milliseconds()
                .max(0) as u64,
        }
    }
}

/// 被跳过的未解析原始值（行数降序，同数按原始值升序）
fn unresolved_from(resolved: &ResolveOutcome) -> Vec<UnresolvedFacility> {
    let mut list: Vec<UnresolvedFacility> = resolved
        .skipped_by_raw_facility
        .iter()
        .filter(|(raw, _)| !raw.is_empty())
        .map(|(raw, count)| UnresolvedFacility {
            raw_value: raw.clone(),
            row_count: *count,
        })
        .collect();
    list.sort_by(|a, b| {
        b.row_count
            .cmp(&a.row_count)
            .then_with(|| a.raw_value.cmp(&b.raw_value))
    });
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_build_summary_totals() {
        let mut resolved = ResolveOutcome {
            skipped_no_item_code: 2,
            skipped_no_facility: 4,
            duplicate_count: 1,
            duplicate_details: vec!["dup".to_string()],
            defaulted_quantity: 3,
            ..Default::default()
        };
        resolved.skipped_by_raw_facility.insert("7".to_string(), 1);
        resolved.skipped_by_raw_facility.insert("99".to_string(), 2);
        resolved.skipped_by_raw_facility.insert("".to_string(), 1);

        let upserted = UpsertOutcome {
            imported: 90,
            errors: 10,
            error_details: vec!["err".to_string()],
            batches: 1,
            retried_batches: 1,
        };
        let started_at = Utc::now();
        let finished_at = started_at + Duration::milliseconds(1500);

        let summary = SummaryReporter.build(ReportInput {
            run_id: "run-1",
            total_rows: 107,
            facility_breakdown: &[],
            resolved: &resolved,
            upserted: &upserted,
            started_at,
            finished_at,
        });

        assert_eq!(summary.run_id, "run-1");
        assert_eq!(summary.skipped_rows, 6);
        assert_eq!(summary.imported, 90);
        assert_eq!(summary.errors, 10);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.defaulted_quantity, 3);
        assert_eq!(summary.elapsed_ms, 1500);
        let unresolved: Vec<(&str, usize)> = summary
            .unresolved_facilities
            .iter()
            .map(|u| (u.raw_value.as_str(), u.row_count))
            .collect();
        assert_eq!(unresolved, vec![("99", 2), ("7", 1)]);
    }
}

// ==========================================
// 服务中心库存导入 - 去重行解析器
// ==========================================
// 职责: 原始行 → 规范库存行（按唯一键去重，后出现者覆盖）
// 规则（按文件顺序逐行）:
//   1. 物料编码为空 → skipped_no_item_code
//   2. 仓库无法解析 → skipped_no_facility（按原始值计数）
//   3. 可选字段宽松解析（数量 / 单位成本失败回退 0）
//   4. 键 = 仓库 + 物料编码 + 库位
//   5. 重复键 → duplicate_count += 1，记录有限条明细，覆盖旧值
// 输出: 每键一行，按键首次出现顺序
// ==========================================

use crate::domain::inventory::{InventoryKey, InventoryRow, RawImportRow};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::facility_code::{to_canonical_code, FacilityIndex};
use crate::importer::field_mapper::{FieldMapper, ImportField};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, info};

// ==========================================
// ResolveOutcome - 解析结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveOutcome {
    pub rows: Vec<InventoryRow>,
    pub skipped_no_item_code: usize,
    pub skipped_no_facility: usize,
    pub skipped_by_raw_facility: HashMap<String, usize>,
    pub duplicate_count: usize,
    pub duplicate_details: Vec<String>,
    pub defaulted_quantity: usize,
    pub defaulted_unit_cost: usize,
}

impl ResolveOutcome {
    pub fn skipped_rows(&self) -> usize {
        self.skipped_no_item_code + self.skipped_no_facility
    }
}

pub struct RowResolver {
    mapper: FieldMapper,
    cleaner: DataCleaner,
    duplicate_detail_limit: usize,
}

impl RowResolver {
    pub fn new(duplicate_detail_limit: usize) -> Self {
        Self {
            mapper: FieldMapper,
            cleaner: DataCleaner,
            duplicate_detail_limit,
        }
    }

    pub fn resolve(&self, rows: &[RawImportRow], index: &FacilityIndex) -> ResolveOutcome {
        let mut outcome = ResolveOutcome::default();

        // 键 → (输出位置, 最近一次出现的行号)
        let mut positions: HashMap<InventoryKey, (usize, usize)> = HashMap::new();

        for row in rows {
            let item_code = self.mapper.get_string(row, ImportField::ItemCode);
            if item_code.is_empty() {
                outcome.skipped_no_item_code += 1;
                continue;
            }

            let raw_facility = self.mapper.get_string(row, ImportField::Facility);
            let canonical_code = to_canonical_code(&raw_facility);
            let facility = match index.resolve(&canonical_code) {
                Some(f) => f,
                None => {
                    outcome.skipped_no_facility += 1;
                    *outcome
                        .skipped_by_raw_facility
                        .entry(raw_facility)
                        .or_insert(0) += 1;
                    continue;
                }
            };

            let quantity = self
                .cleaner
                .parse_quantity(&self.mapper.get_string(row, ImportField::Quantity));
            let unit_cost = self
                .cleaner
                .parse_unit_cost(&self.mapper.get_string(row, ImportField::UnitCost));
            if quantity.defaulted {
                outcome.defaulted_quantity += 1;
            }
            if unit_cost.defaulted {
                outcome.defaulted_unit_cost += 1;
            }

            let inventory_row = InventoryRow {
                facility_id: facility.facility_id.clone(),
                item_code,
                description: self.mapper.get_opt(row, ImportField::Description),
                quantity: quantity.value,
                location: self.mapper.get_string(row, ImportField::Location),
                bin_code: facility.code.clone(),
                unit_cost: unit_cost.value,
            };

            let key = inventory_row.dedup_key();

            match positions.entry(key) {
                Entry::Occupied(mut slot) => {
                    let (pos, last_row_number) = *slot.get();
                    outcome.duplicate_count += 1;
                    if outcome.duplicate_details.len() < self.duplicate_detail_limit {
                        outcome.duplicate_details.push(format_duplicate(
                            &inventory_row,
                            last_row_number,
                            row.row_number,
                        ));
                    }
                    debug!(key = %slot.key(), row = row.row_number, "重复键，后者覆盖");
                    outcome.rows[pos] = inventory_row;
                    slot.insert((pos, row.row_number));
                }
                Entry::Vacant(slot) => {
                    slot.insert((outcome.rows.len(), row.row_number));
                    outcome.rows.push(inventory_row);
                }
            }
        }

        info!(
            valid = outcome.rows.len(),
            skipped_no_item_code = outcome.skipped_no_item_code,
            skipped_no_facility = outcome.skipped_no_facility,
            duplicates = outcome.duplicate_count,
            "去重解析完成"
        );
        outcome
    }
}

fn format_duplicate(row: &InventoryRow, previous_row: usize, current_row: usize) -> String {
    let location = if row.location.is_empty() {
        "(无库位)"
    } else {
        row.location.as_str()
    };
    format!(
        "物料 {} @ {} 库位 {}: 第 {} 行被第 {} 行覆盖",
        row.item_code, row.bin_code, location, previous_row, current_row
    )
}

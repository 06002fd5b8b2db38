// ==========================================
// 服务中心库存导入 - 仓库编码映射
// ==========================================
// 职责: 自由格式仓库标识 → 规范编码（B + 至少3位数字）；规范编码 → 仓库
// 约定: "08" / "8" / "0008" / "CS-8" 均映射为 B008（同数值合并为同一仓库）
// ==========================================

use crate::domain::facility::Facility;
use std::collections::HashMap;

/// 规范编码前缀
pub const FACILITY_CODE_PREFIX: char = 'B';

/// 转换为规范仓库编码
///
/// 仅保留数字并去掉前导零，左侧补零至 3 位，前缀 'B'；无数字时返回空串。
/// 超过 3 位的有效数字原样保留，全零视为 "0"。
pub fn to_canonical_code(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return String::new();
    }
    let significant = match digits.trim_start_matches('0') {
        "" => "0",
        rest => rest,
    };
    format!("{}{:0>3}", FACILITY_CODE_PREFIX, significant)
}

// ==========================================
// FacilityIndex - 规范编码 → 仓库
// ==========================================
// 仓库集合变化后需整体重建
#[derive(Debug, Clone, Default)]
pub struct FacilityIndex {
    by_code: HashMap<String, Facility>,
}

impl FacilityIndex {
    pub fn build(facilities: &[Facility]) -> Self {
        let by_code = facilities
            .iter()
            .filter(|f| !f.code.trim().is_empty())
            .map(|f| (index_key(&f.code), f.clone()))
            .collect();
        Self { by_code }
    }

    /// 按规范编码查找仓库
    pub fn resolve(&self, code: &str) -> Option<&Facility> {
        if code.trim().is_empty() {
            return None;
        }
        self.by_code.get(&index_key(code))
    }

    /// 原始标识 → 规范编码 → 仓库
    pub fn resolve_raw(&self, raw: &str) -> Option<&Facility> {
        self.resolve(&to_canonical_code(raw))
    }

    /// 合并新建仓库后重建索引
    pub fn rebuild_with(&self, created: &[Facility]) -> Self {
        let mut facilities: Vec<Facility> = self.by_code.values().cloned().collect();
        facilities.extend(created.iter().cloned());
        Self::build(&facilities)
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.resolve(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

fn index_key(code: &str) -> String {
    code.trim().to_uppercase()
}

// ==========================================
// 服务中心库存导入 - 字段映射器（别名字典）
// ==========================================
// 职责: 逻辑字段 → 表头别名列表；按别名从原始行提取值
// 约束: 比较前两侧均经过 normalize_text，大小写/重音/下划线不敏感
// ==========================================

use crate::domain::inventory::RawImportRow;
use crate::importer::text_normalizer::normalize_text;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ImportField - 逻辑字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportField {
    ItemCode,
    Quantity,
    Facility,
    Location,
    Description,
    UnitCost,
}

impl ImportField {
    /// 必需列（唯一的硬校验门槛）
    pub const REQUIRED: [ImportField; 3] = [
        ImportField::ItemCode,
        ImportField::Quantity,
        ImportField::Facility,
    ];

    /// 可接受的表头拼写（按优先级）
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            ImportField::ItemCode => &["SKU", "CODIGO", "CODIGO_REPUESTO"],
            ImportField::Quantity => &["CANTIDAD", "QTY", "STOCK"],
            ImportField::Facility => &[
                "CS",
                "BODEGA CS",
                "BODEGA_CS",
                "CENTRO DE SERVICIO",
                "CENTRO SERVICIO",
                "CENTRO_SERVICIO",
            ],
            ImportField::Location => &["UBICACION", "LOCALIZACION", "UBICACION BODEGA", "LOCATION"],
            ImportField::Description => &[
                "DESCRIPCION",
                "DESCRIPCION REPUESTO",
                "NOMBRE",
                "DESCRIPTION",
            ],
            ImportField::UnitCost => &[
                "COSTO",
                "COSTO UNITARIO",
                "PRECIO",
                "PRECIO UNITARIO",
                "VALOR UNITARIO",
                "UNIT COST",
            ],
        }
    }

    /// 面向操作员的列名（缺列提示使用）
    pub fn display_name(&self) -> &'static str {
        match self {
            ImportField::ItemCode => "CODIGO",
            ImportField::Quantity => "CANTIDAD",
            ImportField::Facility => "CS",
            ImportField::Location => "UBICACION",
            ImportField::Description => "DESCRIPCION",
            ImportField::UnitCost => "COSTO",
        }
    }

    /// 表头是否匹配本字段
    pub fn matches_header(&self, header: &str) -> bool {
        header_matches(header, self.aliases())
    }
}

impl fmt::Display for ImportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

fn header_matches(header: &str, aliases: &[&str]) -> bool {
    let normalized = normalize_text(header);
    !normalized.is_empty() && aliases.iter().any(|alias| normalize_text(alias) == normalized)
}

/// 按别名提取字段值
///
/// 按行内列顺序，返回第一个表头匹配任一别名的列值（已去首尾空白）；
/// 无匹配或值为空时返回空串。不报错，是否致命由调用方决定。
pub fn extract(row: &RawImportRow, aliases: &[&str]) -> String {
    row.columns
        .iter()
        .find(|(header, _)| header_matches(header, aliases))
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default()
}

/// 按别名提取字段值（空值为 None）
pub fn extract_opt(row: &RawImportRow, aliases: &[&str]) -> Option<String> {
    let value = extract(row, aliases);
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

// ==========================================
// FieldMapper - 逻辑字段提取
// ==========================================
pub struct FieldMapper;

impl FieldMapper {
    /// 提取逻辑字段（缺失为空串）
    pub fn get_string(&self, row: &RawImportRow, field: ImportField) -> String {
        extract(row, field.aliases())
    }

    /// 提取逻辑字段（缺失为 None）
    pub fn get_opt(&self, row: &RawImportRow, field: ImportField) -> Option<String> {
        extract_opt(row, field.aliases())
    }

    /// 表头集合中缺少的必需字段
    pub fn missing_required<'a, I>(&self, headers: I) -> Vec<ImportField>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let headers: Vec<&str> = headers.into_iter().collect();
        ImportField::REQUIRED
            .iter()
            .copied()
            .filter(|field| !headers.iter().any(|h| field.matches_header(h)))
            .collect()
    }
}

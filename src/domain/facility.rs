// ==========================================
// 服务中心库存导入 - 仓库（服务中心）领域模型
// ==========================================
// 职责: 仓库实体 + 导入期间新建仓库的入参
// 红线: 导入管道只创建仓库，不修改已有仓库
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Facility - 仓库 / 服务中心
// ==========================================
// 对齐: facility 表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub facility_id: String, // 不透明标识（UUID）
    pub name: String,        // 显示名称
    pub code: String,        // 规范编码（B + 零填充数字，如 B008）
    pub active: bool,        // 启用标记
    pub created_at: DateTime<Utc>,
}

// ==========================================
// NewFacility - 待创建仓库
// ==========================================
// 用途: MissingFacilityCreator → FacilityRepository::create_facilities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFacility {
    pub name: String,
    pub code: String,
    pub active: bool,
}

impl NewFacility {
    /// 按规范编码合成导入期新仓库（名称 "Bodega " + 编码，默认启用）
    pub fn for_code(code: &str) -> Self {
        Self {
            name: format!("Bodega {}", code),
            code: code.to_string(),
            active: true,
        }
    }
}

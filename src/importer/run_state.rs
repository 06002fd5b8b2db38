// ==========================================
// 服务中心库存导入 - 运行状态机
// ==========================================
// 流转:
//   Idle → Analyzing → Preview
//   Analyzing → Idle（阻断错误）
//   Preview → CreatingFacilities → Preview（成功或失败）
//   Preview → Importing → Done | Preview（致命错误）
//   Reset: 除 Importing 外任意阶段 → Idle
// 约束: apply 为纯函数；状态由唯一控制器持有
// ==========================================

use crate::domain::inventory::{FacilityCodeSummaryEntry, ImportSummary, RawImportRow};
use crate::domain::types::ImportPhase;
use crate::importer::error::{ImportError, ImportResult};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

// ==========================================
// PreviewData - 预览阶段数据
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewData {
    pub source: String,
    pub rows: Vec<RawImportRow>,
    pub summary: Vec<FacilityCodeSummaryEntry>,
    pub selected_for_creation: BTreeSet<String>, // 待创建仓库的原始值
}

impl PreviewData {
    fn unresolved_raw_values(summary: &[FacilityCodeSummaryEntry]) -> BTreeSet<String> {
        summary
            .iter()
            .filter(|e| !e.is_resolved())
            .map(|e| e.raw_value.clone())
            .collect()
    }
}

// ==========================================
// ImportRunState - 运行状态（带数据的阶段）
// ==========================================
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ImportRunState {
    #[default]
    Idle,
    Analyzing {
        source: String,
    },
    Preview(PreviewData),
    CreatingFacilities(PreviewData),
    Importing {
        preview: PreviewData,
        started_at: DateTime<Utc>,
    },
    Done {
        summary: ImportSummary,
    },
}

// ==========================================
// ImportEvent - 状态事件
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum ImportEvent {
    FileSelected {
        source: String,
    },
    AnalysisSucceeded {
        rows: Vec<RawImportRow>,
        summary: Vec<FacilityCodeSummaryEntry>,
    },
    AnalysisFailed,
    ToggleFacilitySelection {
        raw_value: String,
    },
    CreateFacilitiesRequested,
    FacilitiesCreated {
        summary: Vec<FacilityCodeSummaryEntry>,
    },
    FacilityCreationFailed,
    ImportStarted {
        started_at: DateTime<Utc>,
    },
    ImportFinished {
        summary: ImportSummary,
    },
    ImportFailed,
    Reset,
}

impl ImportEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ImportEvent::FileSelected { .. } => "FILE_SELECTED",
            ImportEvent::AnalysisSucceeded { .. } => "ANALYSIS_SUCCEEDED",
            ImportEvent::AnalysisFailed => "ANALYSIS_FAILED",
            ImportEvent::ToggleFacilitySelection { .. } => "TOGGLE_FACILITY_SELECTION",
            ImportEvent::CreateFacilitiesRequested => "CREATE_FACILITIES_REQUESTED",
            ImportEvent::FacilitiesCreated { .. } => "FACILITIES_CREATED",
            ImportEvent::FacilityCreationFailed => "FACILITY_CREATION_FAILED",
            ImportEvent::ImportStarted { .. } => "IMPORT_STARTED",
            ImportEvent::ImportFinished { .. } => "IMPORT_FINISHED",
            ImportEvent::ImportFailed => "IMPORT_FAILED",
            ImportEvent::Reset => "RESET",
        }
    }
}

impl ImportRunState {
    pub fn phase(&self) -> ImportPhase {
        match self {
            ImportRunState::Idle => ImportPhase::Idle,
            ImportRunState::Analyzing { .. } => ImportPhase::Analyzing,
            ImportRunState::Preview(_) => ImportPhase::Preview,
            ImportRunState::CreatingFacilities(_) => ImportPhase::CreatingFacilities,
            ImportRunState::Importing { .. } => ImportPhase::Importing,
            ImportRunState::Done { .. } => ImportPhase::Done,
        }
    }

    /// 预览数据（Preview / CreatingFacilities / Importing 阶段可用）
    pub fn preview(&self) -> Option<&PreviewData> {
        match self {
            ImportRunState::Preview(p) | ImportRunState::CreatingFacilities(p) => Some(p),
            ImportRunState::Importing { preview, .. } => Some(preview),
            _ => None,
        }
    }

    pub fn final_summary(&self) -> Option<&ImportSummary> {
        match self {
            ImportRunState::Done { summary } => Some(summary),
            _ => None,
        }
    }

    /// 状态转换（纯函数）
    pub fn apply(self, event: ImportEvent) -> ImportResult<Self> {
        self.try_apply(event).map_err(|(_, e)| e)
    }

    /// 状态转换；非法转换时连同原状态一并返回
    pub fn try_apply(self, event: ImportEvent) -> Result<Self, (Self, ImportError)> {
        use ImportEvent as E;
        use ImportRunState as S;

        match (self, event) {
            // ===== 选择文件 =====
            (S::Idle | S::Done { .. }, E::FileSelected { source }) => Ok(S::Analyzing { source }),

            // ===== 分析结果 =====
            (S::Analyzing { source }, E::AnalysisSucceeded { rows, summary }) => {
                let selected_for_creation = PreviewData::unresolved_raw_values(&summary);
                Ok(S::Preview(PreviewData {
                    source,
                    rows,
                    summary,
                    selected_for_creation,
                }))
            }
            (S::Analyzing { .. }, E::AnalysisFailed) => Ok(S::Idle),

            // ===== 预览期操作 =====
            (S::Preview(mut preview), E::ToggleFacilitySelection { raw_value }) => {
                let is_unresolved = preview
                    .summary
                    .iter()
                    .any(|e| e.raw_value == raw_value && !e.is_resolved());
                if !preview.selected_for_creation.remove(&raw_value) && is_unresolved {
                    preview.selected_for_creation.insert(raw_value);
                }
                Ok(S::Preview(preview))
            }
            (S::Preview(preview), E::CreateFacilitiesRequested) => {
                Ok(S::CreatingFacilities(preview))
            }

            // ===== 仓库创建结果 =====
            (S::CreatingFacilities(mut preview), E::FacilitiesCreated { summary }) => {
                preview.selected_for_creation = PreviewData::unresolved_raw_values(&summary);
                preview.summary = summary;
                Ok(S::Preview(preview))
            }
            (S::CreatingFacilities(preview), E::FacilityCreationFailed) => Ok(S::Preview(preview)),

            // ===== 导入 =====
            (S::Preview(preview), E::ImportStarted { started_at }) => Ok(S::Importing {
                preview,
                started_at,
            }),
            (S::Importing { .. }, E::ImportFinished { summary }) => Ok(S::Done { summary }),
            (S::Importing { preview, .. }, E::ImportFailed) => Ok(S::Preview(preview)),

            // ===== 重置（导入进行中不可重置）=====
            (state, E::Reset) if state.phase() != ImportPhase::Importing => Ok(S::Idle),

            (state, event) => {
                let err = ImportError::InvalidTransition {
                    from: state.phase(),
                    event: event.name().to_string(),
                };
                Err((state, err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ResolutionStatus;

    fn entry(raw: &str, resolved: bool) -> FacilityCodeSummaryEntry {
        FacilityCodeSummaryEntry {
            raw_value: raw.to_string(),
            canonical_code: crate::importer::facility_code::to_canonical_code(raw),
            row_count: 1,
            status: if resolved {
                ResolutionStatus::Resolved
            } else {
                ResolutionStatus::Unresolved
            },
            facility: None,
        }
    }

    fn preview_state() -> ImportRunState {
        ImportRunState::Idle
            .apply(ImportEvent::FileSelected {
                source: "inv.csv".to_string(),
            })
            .unwrap()
            .apply(ImportEvent::AnalysisSucceeded {
                rows: Vec::new(),
                summary: vec![entry("8", false), entry("1", true)],
            })
            .unwrap()
    }

    #[test]
    fn test_default_is_idle() {
        assert_eq!(ImportRunState::default().phase(), ImportPhase::Idle);
    }

    #[test]
    fn test_analysis_success_selects_unresolved() {
        let state = preview_state();
        assert_eq!(state.phase(), ImportPhase::Preview);
        let preview = state.preview().unwrap();
        assert_eq!(
            preview.selected_for_creation.iter().collect::<Vec<_>>(),
            vec!["8"]
        );
    }

    #[test]
    fn test_analysis_failure_returns_idle() {
        let state = ImportRunState::Idle
            .apply(ImportEvent::FileSelected {
                source: "x.csv".to_string(),
            })
            .unwrap()
            .apply(ImportEvent::AnalysisFailed)
            .unwrap();
        assert_eq!(state, ImportRunState::Idle);
    }

    #[test]
    fn test_toggle_selection() {
        let state = preview_state()
            .apply(ImportEvent::ToggleFacilitySelection {
                raw_value: "8".to_string(),
            })
            .unwrap();
        assert!(state.preview().unwrap().selected_for_creation.is_empty());

        let state = state
            .apply(ImportEvent::ToggleFacilitySelection {
                raw_value: "8".to_string(),
            })
            .unwrap();
        assert!(state.preview().unwrap().selected_for_creation.contains("8"));

        // 已解析的原始值不可选中
        let state = state
            .apply(ImportEvent::ToggleFacilitySelection {
                raw_value: "1".to_string(),
            })
            .unwrap();
        assert!(!state.preview().unwrap().selected_for_creation.contains("1"));
    }

    #[test]
    fn test_facility_creation_round_trip() {
        let creating = preview_state()
            .apply(ImportEvent::CreateFacilitiesRequested)
            .unwrap();
        assert_eq!(creating.phase(), ImportPhase::CreatingFacilities);

        let failed = creating
            .clone()
            .apply(ImportEvent::FacilityCreationFailed)
            .unwrap();
        assert_eq!(failed, preview_state());

        let created = creating
            .apply(ImportEvent::FacilitiesCreated {
                summary: vec![entry("8", true), entry("1", true)],
            })
            .unwrap();
        assert_eq!(created.phase(), ImportPhase::Preview);
        assert!(created.preview().unwrap().selected_for_creation.is_empty());
    }

    #[test]
    fn test_import_failure_returns_to_preview() {
        let state = preview_state()
            .apply(ImportEvent::ImportStarted {
                started_at: Utc::now(),
            })
            .unwrap();
        assert_eq!(state.phase(), ImportPhase::Importing);

        let state = state.apply(ImportEvent::ImportFailed).unwrap();
        assert_eq!(state.phase(), ImportPhase::Preview);
    }

    #[test]
    fn test_reset_rejected_while_importing() {
        let importing = preview_state()
            .apply(ImportEvent::ImportStarted {
                started_at: Utc::now(),
            })
            .unwrap();
        let result = importing.apply(ImportEvent::Reset);
        assert!(matches!(
            result,
            Err(ImportError::InvalidTransition {
                from: ImportPhase::Importing,
                ..
            })
        ));

        assert_eq!(
            preview_state().apply(ImportEvent::Reset).unwrap(),
            ImportRunState::Idle
        );
    }

    #[test]
    fn test_try_apply_returns_original_state() {
        let (state, err) = preview_state()
            .try_apply(ImportEvent::AnalysisFailed)
            .unwrap_err();
        assert_eq!(state, preview_state());
        assert!(matches!(err, ImportError::InvalidTransition { .. }));
    }

    #[test]
    fn test_invalid_transition() {
        let result = ImportRunState::Idle.apply(ImportEvent::CreateFacilitiesRequested);
        match result {
            Err(ImportError::InvalidTransition { from, event }) => {
                assert_eq!(from, ImportPhase::Idle);
                assert_eq!(event, "CREATE_FACILITIES_REQUESTED");
            }
            other => panic!("expected InvalidTransition, got {:?}", other),
        }
    }
}

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use floorplan_core::plan::{EntityRef, FloorPlan};
use thiserror::Error;
use tracing::debug;

pub mod resource;

pub use resource::{FileResourceLoader, ResourceLoader, ResourceRef};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse floor plan: {0}")]
    ParseFailure(#[source] serde_json::Error),
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),
}

/// 序列化为带缩进的 JSON 文档，字段名为 camelCase。
pub fn export_floor_plan(plan: &FloorPlan) -> Result<String, IoError> {
    serde_json::to_string_pretty(plan).map_err(|err| IoError::InvalidDocument(err.to_string()))
}

/// 解析平面文档。任何不符合格式的输入都整体失败，不会产生部分导入的结果。
pub fn import_floor_plan(source: &str) -> Result<FloorPlan, IoError> {
    let plan: FloorPlan = serde_json::from_str(source).map_err(IoError::ParseFailure)?;
    validate(&plan)?;
    Ok(plan)
}

fn validate(plan: &FloorPlan) -> Result<(), IoError> {
    let scale = plan.scale();
    if !scale.is_finite() || scale <= 0.0 {
        return Err(IoError::InvalidDocument(format!(
            "scale must be positive, got {scale}"
        )));
    }
    // ID 在各自集合内唯一，不同类别之间允许重名。
    let mut seen: HashSet<EntityRef> = HashSet::new();
    for entity in plan.entities() {
        if entity.id().is_empty() {
            return Err(IoError::InvalidDocument(format!(
                "{} entity is missing an id",
                entity.kind()
            )));
        }
        let entity_ref = entity.entity_ref();
        if !seen.insert(entity_ref) {
            return Err(IoError::InvalidDocument(format!(
                "duplicate {} id `{}`",
                entity.kind(),
                entity.id()
            )));
        }
    }
    Ok(())
}

pub trait PlanLoader {
    fn load(&self, path: &Path) -> Result<FloorPlan, IoError>;
}

pub trait PlanSaver {
    fn save(&self, plan: &FloorPlan, path: &Path) -> Result<(), IoError>;
}

pub struct JsonFacade;

impl JsonFacade {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanLoader for JsonFacade {
    fn load(&self, path: &Path) -> Result<FloorPlan, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let plan = import_floor_plan(&data)?;
        debug!(
            path = %path.display(),
            entities = plan.entity_count(),
            "已读取平面文件"
        );
        Ok(plan)
    }
}

impl PlanSaver for JsonFacade {
    fn save(&self, plan: &FloorPlan, path: &Path) -> Result<(), IoError> {
        let document = export_floor_plan(plan)?;
        fs::write(path, document).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "已写入平面文件");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorplan_core::geometry::Point2;
    use floorplan_core::plan::{PlanEntity, Wall};

    #[test]
    fn export_uses_camel_case_fields() {
        let plan = FloorPlan::new("Test").with_entity(PlanEntity::Wall(Wall::new(
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
        )));
        let document = export_floor_plan(&plan).unwrap();
        assert!(document.contains("\"showMeasurements\": true"));
        assert!(document.contains("\"createdAt\""));
        assert!(document.contains("\"walls\""));
        assert!(document.contains('\n'));
    }

    #[test]
    fn malformed_document_is_parse_failure() {
        let err = import_floor_plan("{ not json").unwrap_err();
        assert!(matches!(err, IoError::ParseFailure(_)));

        let err = import_floor_plan(r#"{"id": "plan-1"}"#).unwrap_err();
        assert!(matches!(err, IoError::ParseFailure(_)));
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        let mut plan = FloorPlan::new("Test");
        plan.metadata.scale = 0.0;
        let document = export_floor_plan(&plan).unwrap();
        let err = import_floor_plan(&document).unwrap_err();
        assert!(matches!(err, IoError::InvalidDocument(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = JsonFacade::new()
            .load(Path::new("/definitely/not/here.json"))
            .unwrap_err();
        match err {
            IoError::ReadError { path, .. } => {
                assert_eq!(path, PathBuf::from("/definitely/not/here.json"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

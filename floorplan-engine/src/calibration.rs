use floorplan_core::geometry::{Point2, distance};
use floorplan_core::plan::{FloorPlan, ScaleCalibration};
use floorplan_core::units::Unit;
use tracing::debug;

use crate::errors::EngineError;

/// 解析用户输入的实际长度，必须为有限正数。
pub fn parse_declared_length(raw: &str) -> Result<f64, EngineError> {
    let trimmed = raw.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| EngineError::InvalidInput(format!("`{trimmed}` is not a number")))?;
    validate_declared_length(value)?;
    Ok(value)
}

fn validate_declared_length(value: f64) -> Result<(), EngineError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "calibration distance must be positive, got {value}"
        )));
    }
    Ok(())
}

/// `像素长度 / 米数` 即新的像素/米比例。
pub fn derive_scale(
    point1: Point2,
    point2: Point2,
    value: f64,
    unit: Unit,
) -> Result<f64, EngineError> {
    validate_declared_length(value)?;
    let pixel_length = distance(point1, point2);
    if pixel_length <= 0.0 {
        return Err(EngineError::InvalidInput(
            "reference segment has zero length".to_string(),
        ));
    }
    Ok(pixel_length / unit.to_meters(value))
}

/// 以参考线段和用户声明的实际长度重新标定平面比例。
/// 成功时覆盖 `metadata.scale` 与 `metadata.unit`，已有几何保持像素坐标不变；
/// 失败时不产生新平面。
pub fn calibrate(
    plan: &FloorPlan,
    point1: Point2,
    point2: Point2,
    declared: &str,
    unit: Unit,
) -> Result<FloorPlan, EngineError> {
    let value = parse_declared_length(declared)?;
    calibrate_with_value(plan, point1, point2, value, unit)
}

pub fn calibrate_with_value(
    plan: &FloorPlan,
    point1: Point2,
    point2: Point2,
    value: f64,
    unit: Unit,
) -> Result<FloorPlan, EngineError> {
    let scale = derive_scale(point1, point2, value, unit)?;
    debug!(
        previous = plan.scale(),
        scale,
        unit = %unit,
        "平面比例已重新标定"
    );
    let calibration = ScaleCalibration {
        point1,
        point2,
        real_distance: value,
        unit,
    };
    Ok(plan.with_calibration(calibration, scale))
}

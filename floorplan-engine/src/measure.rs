//! 自动标注：平面没有显式标注时，为每面墙和每条房间边生成尺寸标注。

use std::borrow::Cow;

use floorplan_core::plan::{FloorPlan, Measurement};
use floorplan_core::units::format_measurement;

/// 为墙长与房间各边生成标注，标签按平面当前比例和单位预先格式化。
pub fn generate_measurements(plan: &FloorPlan) -> Vec<Measurement> {
    let scale = plan.scale();
    let unit = plan.unit();
    let mut measurements = Vec::with_capacity(plan.walls.len() + plan.rooms.len() * 4);

    for wall in plan.walls.iter() {
        measurements.push(Measurement {
            id: format!("{}-length", wall.id),
            start: wall.start,
            end: wall.end,
            label: Some(format_measurement(wall.length(), scale, unit)),
            visible: true,
        });
    }

    for room in plan.rooms.iter().filter(|room| room.is_renderable()) {
        for (index, (start, end)) in room.edges().enumerate() {
            measurements.push(Measurement {
                id: format!("{}-edge-{index}", room.id),
                start,
                end,
                label: Some(format_measurement(start.distance_to(end), scale, unit)),
                visible: true,
            });
        }
    }

    measurements
}

/// 显式标注整体优先，不与自动标注合并。
pub fn effective_measurements(plan: &FloorPlan) -> Cow<'_, [Measurement]> {
    if plan.measurements.is_empty() {
        Cow::Owned(generate_measurements(plan))
    } else {
        Cow::Borrowed(plan.measurements.as_slice())
    }
}

/// 需要绘制的标注：关闭显示时为空，缺少标签的显式标注按当前比例补齐。
pub fn visible_measurements(plan: &FloorPlan) -> Vec<Measurement> {
    if !plan.metadata.show_measurements {
        return Vec::new();
    }
    effective_measurements(plan)
        .iter()
        .filter(|measurement| measurement.visible)
        .map(|measurement| {
            let mut measurement = measurement.clone();
            if measurement.label.is_none() {
                measurement.label = Some(format_measurement(
                    measurement.length(),
                    plan.scale(),
                    plan.unit(),
                ));
            }
            measurement
        })
        .collect()
}

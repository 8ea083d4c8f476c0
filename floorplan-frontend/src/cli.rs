use std::fmt::Write as _;
use std::path::PathBuf;

use floorplan_config::{AppConfig, OutputFormat};
use floorplan_core::geometry::Point2;
use floorplan_core::units::{Unit, format_real, square_pixels_to_real};
use floorplan_engine::command::{CommandBus, CommandContext, CommandRequest};
use floorplan_engine::projection::{DescriptorKind, SceneDescription, Shape};
use floorplan_engine::scene::Scene;
use floorplan_io::{JsonFacade, PlanSaver};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::FrontendError;
use crate::loader::{LoadedScene, PlanSource, load_scene};

/// 命令行参数解析后的选项；`output` 为空时沿用配置。
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub plan: Option<PathBuf>,
    pub output: Option<OutputFormat>,
    pub commands: Vec<String>,
    pub save: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliReport {
    pub source: String,
    pub plan: PlanSummary,
    pub commands: Vec<CommandOutcome>,
    pub selection: Vec<String>,
    pub viewport: ViewportSummary,
    pub measurements: Vec<MeasurementLine>,
    pub missing_assets: Vec<String>,
    pub scene: SceneDescription,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub id: String,
    pub name: String,
    pub scale: f64,
    pub unit: Unit,
    pub walls: usize,
    pub rooms: Vec<RoomSummary>,
    pub doors: usize,
    pub windows: usize,
    pub cabinets: usize,
    pub models: usize,
    pub photos: usize,
}

#[derive(Debug, Serialize)]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub area: String,
}

#[derive(Debug, Serialize)]
pub struct CommandOutcome {
    pub command: String,
    pub success: bool,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ViewportSummary {
    pub center: Point2,
    pub zoom: f64,
}

#[derive(Debug, Serialize)]
pub struct MeasurementLine {
    pub id: String,
    pub label: String,
    pub start: Point2,
    pub end: Point2,
}

/// 加载平面、依次执行命令、按需保存，然后输出平面概览、标注与 3D 场景描述。
pub fn run(options: &CliOptions, config: &AppConfig) -> Result<(), FrontendError> {
    let LoadedScene {
        mut scene,
        source,
        missing_assets,
        ..
    } = load_scene(options.plan.as_deref(), config);

    let commands = run_commands(&mut scene, &options.commands);

    if let Some(path) = &options.save {
        JsonFacade::new().save(scene.plan(), path)?;
        info!(path = %path.display(), "平面已保存");
    }

    let report = build_report(&scene, &source, commands, missing_assets);
    info!(
        entities = scene.plan().entity_count(),
        descriptors = report.scene.descriptors.len(),
        "CLI 平面统计"
    );

    let rendered = match options.output.unwrap_or(config.frontend.output) {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => render_json(&report)?,
    };
    println!("{rendered}");
    Ok(())
}

pub fn run_commands(scene: &mut Scene, lines: &[String]) -> Vec<CommandOutcome> {
    let bus = CommandBus::new();
    let mut context = CommandContext { scene };
    let mut outcomes = Vec::with_capacity(lines.len());
    for line in lines {
        let Some(request) = CommandRequest::parse(line) else {
            continue;
        };
        let response = bus.dispatch(&request, &mut context);
        if !response.success {
            warn!(command = %line, message = ?response.message, "CLI 命令执行失败");
        }
        outcomes.push(CommandOutcome {
            command: line.clone(),
            success: response.success,
            message: response.message,
        });
    }
    outcomes
}

pub fn build_report(
    scene: &Scene,
    source: &PlanSource,
    commands: Vec<CommandOutcome>,
    missing_assets: Vec<String>,
) -> CliReport {
    let plan = scene.plan();
    let scale = plan.scale();
    let unit = plan.unit();

    let rooms = plan
        .rooms
        .iter()
        .map(|room| RoomSummary {
            id: room.id.clone(),
            name: room.name.clone(),
            area: format!(
                "{}²",
                format_real(square_pixels_to_real(room.area(), scale, unit), unit)
            ),
        })
        .collect();

    let mut selection: Vec<String> = scene.selection().map(ToString::to_string).collect();
    selection.sort();

    let measurements = scene
        .measurements()
        .into_iter()
        .map(|measurement| MeasurementLine {
            label: measurement.label.unwrap_or_default(),
            id: measurement.id,
            start: measurement.start,
            end: measurement.end,
        })
        .collect();

    let viewport = scene.viewport();

    CliReport {
        source: match source {
            PlanSource::File(path) => path.display().to_string(),
            PlanSource::Demo => "demo".to_string(),
        },
        plan: PlanSummary {
            id: plan.id.clone(),
            name: plan.name.clone(),
            scale,
            unit,
            walls: plan.walls.len(),
            rooms,
            doors: plan.doors.len(),
            windows: plan.windows.len(),
            cabinets: plan.cabinets.len(),
            models: plan.models.len(),
            photos: plan.photos.len(),
        },
        commands,
        selection,
        viewport: ViewportSummary {
            center: viewport.center,
            zoom: viewport.zoom,
        },
        measurements,
        missing_assets,
        scene: scene.project(),
    }
}

pub fn render_json(report: &CliReport) -> Result<String, FrontendError> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn render_text(report: &CliReport) -> String {
    let mut out = String::new();
    let plan = &report.plan;

    let _ = writeln!(out, "平面: {} ({})", plan.name, plan.id);
    let _ = writeln!(out, "来源: {}", report.source);
    let _ = writeln!(out, "比例: {:.4} 像素/米, 单位: {}", plan.scale, plan.unit);
    let _ = writeln!(
        out,
        "实体: 墙 {}, 房间 {}, 门 {}, 窗 {}, 橱柜 {}, 模型 {}, 照片 {}",
        plan.walls,
        plan.rooms.len(),
        plan.doors,
        plan.windows,
        plan.cabinets,
        plan.models,
        plan.photos
    );
    for room in &plan.rooms {
        let _ = writeln!(out, "  - 房间 {} [{}] 面积 {}", room.name, room.id, room.area);
    }

    if !report.commands.is_empty() {
        let _ = writeln!(out, "命令:");
        for outcome in &report.commands {
            let status = if outcome.success { "ok" } else { "失败" };
            let _ = writeln!(
                out,
                "  > {} [{status}] {}",
                outcome.command,
                outcome.message.as_deref().unwrap_or("")
            );
        }
    }

    if report.selection.is_empty() {
        let _ = writeln!(out, "当前尚未选中任何实体。");
    } else {
        let _ = writeln!(out, "选中: {}", report.selection.join(", "));
    }
    let _ = writeln!(
        out,
        "视口中心=({:.2}, {:.2}), 缩放={:.3}",
        report.viewport.center.x(),
        report.viewport.center.y(),
        report.viewport.zoom
    );

    let _ = writeln!(out, "标注 ({}):", report.measurements.len());
    for measurement in &report.measurements {
        let _ = writeln!(
            out,
            "  - {}: {} ({}) -> ({})",
            measurement.id,
            measurement.label,
            format_point(measurement.start),
            format_point(measurement.end)
        );
    }

    if !report.missing_assets.is_empty() {
        let _ = writeln!(out, "未解析的资源: {}", report.missing_assets.join(", "));
    }

    let scene = &report.scene;
    let _ = writeln!(
        out,
        "3D 场景 ({} 个描述符, 中心 {}, 换算 {:.4} 单位/像素):",
        scene.descriptors.len(),
        format_point(scene.center),
        scene.units_per_pixel
    );
    for descriptor in &scene.descriptors {
        let _ = writeln!(
            out,
            "  - {:<16} {:<40} {} @ ({:.2}, {:.2}, {:.2}) 偏航 {:.3}",
            kind_label(descriptor.kind),
            descriptor.id,
            describe_shape(&descriptor.shape),
            descriptor.position.x(),
            descriptor.position.y(),
            descriptor.position.z(),
            descriptor.rotation.y()
        );
    }

    out.trim_end().to_string()
}

fn kind_label(kind: DescriptorKind) -> &'static str {
    match kind {
        DescriptorKind::Wall => "wall",
        DescriptorKind::Floor => "floor",
        DescriptorKind::Ceiling => "ceiling",
        DescriptorKind::Door => "door",
        DescriptorKind::Window => "window",
        DescriptorKind::Cabinet => "cabinet",
        DescriptorKind::CabinetHandle => "cabinet_handle",
        DescriptorKind::ModelPlaceholder => "model_placeholder",
    }
}

fn describe_shape(shape: &Shape) -> String {
    match shape {
        Shape::Box {
            width,
            height,
            depth,
        } => format!("box {width:.2}×{height:.2}×{depth:.2}"),
        Shape::Outline { points } => format!("outline[{}]", points.len()),
        Shape::Cylinder { radius, length } => format!("cylinder r={radius:.3} l={length:.3}"),
    }
}

fn format_point(point: Point2) -> String {
    format!("{:.2}, {:.2}", point.x(), point.y())
}

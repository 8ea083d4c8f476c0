//! 平面 → 3D 场景描述。
//!
//! 以墙端点与房间顶点的包围盒中心为原点，把平面 `(x, y)` 映射到场景水平面 `(x, z)`：
//! `project(p) = ((p.x - cx) * K, (p.y - cy) * K)`，其中 `K = 0.1 * (scale / 20)`。
//! 场景 Y 轴向上，高度一律以米为单位（墙高、橱柜高、门窗标高）。
//!
//! 输出顺序固定：墙 → 房间（地面、天花板）→ 门 → 窗 → 橱柜（柜体、把手）→ 模型。
//! 派生描述符的 ID 以所属实体 ID 为前缀，例如 `<roomId>-ceiling`、`<cabinetId>-handle`。
//! 流水线只生成声明式描述，外部模型资源由渲染端异步加载。

use std::f64::consts::FRAC_PI_2;

use floorplan_core::geometry::{Bounds2D, Point2, Point3, Vector3};
use floorplan_core::plan::{
    Cabinet, CabinetKind, Door, FloorPlan, Model3D, Room, Wall, Window,
};
use floorplan_core::units::BASELINE_PIXELS_PER_METER;
use serde::Serialize;
use tracing::debug;

/// 基准比例下每像素对应的场景单位。
pub const SCENE_UNITS_PER_PIXEL: f64 = 0.1;
/// 天花板标高固定，与墙高无关。
pub const CEILING_HEIGHT: f64 = 2.7;
pub const DOOR_HEIGHT: f64 = 2.0;
pub const DOOR_THICKNESS: f64 = 0.1;
pub const WINDOW_CENTER_HEIGHT: f64 = 1.5;
pub const WINDOW_THICKNESS: f64 = 0.05;
/// 吊柜中心标高固定，与吊柜自身高度无关。
pub const WALL_CABINET_ELEVATION: f64 = 1.8;
pub const HANDLE_RADIUS: f64 = 0.01;
pub const HANDLE_LENGTH: f64 = 0.15;
/// 把手中心超出柜门表面的距离。
pub const HANDLE_STANDOFF: f64 = 0.02;
pub const MODEL_PLACEHOLDER_SIZE: f64 = 1.0;
/// 墙面贴图每重复一次覆盖的场景长度。
pub const TEXTURE_TILE_SIZE: f64 = 1.0;

const WALL_COLOR: &str = "#f5f5f5";
const CEILING_COLOR: &str = "#ffffff";
const DOOR_COLOR: &str = "#8B4513";
const GLASS_COLOR: &str = "#87CEEB";
const HANDLE_COLOR: &str = "#C0C0C0";
const PLACEHOLDER_COLOR: &str = "#4CAF50";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorKind {
    Wall,
    Floor,
    Ceiling,
    Door,
    Window,
    Cabinet,
    CabinetHandle,
    ModelPlaceholder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// 中心对齐的长方体。
    Box { width: f64, height: f64, depth: f64 },
    /// 水平面上的闭合轮廓，顶点为场景 `(x, z)`。
    Outline { points: Vec<[f64; 2]> },
    /// 圆柱，轴线默认沿 Y。
    Cylinder { radius: f64, length: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextureHint {
    pub url: String,
    pub repeat: [f64; 2],
}

/// 渲染端自行映射到具体材质实现。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialHint {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture: Option<TextureHint>,
    pub opacity: f64,
    pub roughness: f64,
    pub metalness: f64,
    pub double_sided: bool,
}

impl MaterialHint {
    pub fn flat(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            texture: None,
            opacity: 1.0,
            roughness: 0.8,
            metalness: 0.0,
            double_sided: false,
        }
    }

    fn textured(url: &str, repeat: [f64; 2]) -> Self {
        Self {
            texture: Some(TextureHint {
                url: url.to_string(),
                repeat,
            }),
            ..Self::flat(CEILING_COLOR)
        }
    }

    fn translucent(color: &str, opacity: f64) -> Self {
        Self {
            opacity,
            roughness: 0.1,
            ..Self::flat(color)
        }
    }

    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescriptor {
    pub id: String,
    pub entity_id: String,
    pub kind: DescriptorKind,
    pub shape: Shape,
    pub material: MaterialHint,
    pub position: Point3,
    /// 欧拉角（弧度）。
    pub rotation: Vector3,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescription {
    pub descriptors: Vec<SceneDescriptor>,
    pub bounds: Bounds2D,
    pub center: Point2,
    /// 像素 → 场景单位的换算系数 `K`。
    pub units_per_pixel: f64,
}

impl SceneDescription {
    pub fn by_kind(&self, kind: DescriptorKind) -> impl Iterator<Item = &SceneDescriptor> + '_ {
        self.descriptors
            .iter()
            .filter(move |descriptor| descriptor.kind == kind)
    }

    pub fn descriptor(&self, id: &str) -> Option<&SceneDescriptor> {
        self.descriptors.iter().find(|descriptor| descriptor.id == id)
    }
}

/// 平面坐标到场景水平面的统一变换。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanTransform {
    center: Point2,
    factor: f64,
}

impl PlanTransform {
    pub fn for_plan(plan: &FloorPlan) -> (Self, Bounds2D) {
        let bounds = plan.structural_bounds();
        let transform = Self {
            center: bounds.center(),
            factor: SCENE_UNITS_PER_PIXEL * (plan.scale() / BASELINE_PIXELS_PER_METER),
        };
        (transform, bounds)
    }

    #[inline]
    pub fn center(&self) -> Point2 {
        self.center
    }

    #[inline]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// 返回场景 `(x, z)`。
    #[inline]
    pub fn project(&self, point: Point2) -> [f64; 2] {
        [
            (point.x() - self.center.x()) * self.factor,
            (point.y() - self.center.y()) * self.factor,
        ]
    }

    #[inline]
    pub fn length(&self, pixels: f64) -> f64 {
        pixels * self.factor
    }

    #[inline]
    fn place(&self, point: Point2, elevation: f64) -> Point3 {
        let [x, z] = self.project(point);
        Point3::new(x, elevation, z)
    }
}

/// 生成整份平面的 3D 场景描述。不完整的实体（如少于三个顶点的房间）被静默跳过。
pub fn project_floor_plan(plan: &FloorPlan) -> SceneDescription {
    let (transform, bounds) = PlanTransform::for_plan(plan);
    let mut descriptors = Vec::new();

    for wall in plan.walls.iter() {
        descriptors.push(wall_descriptor(wall, &transform));
    }
    for room in plan.rooms.iter() {
        descriptors.extend(room_descriptors(room, &transform));
    }
    for door in plan.doors.iter() {
        descriptors.push(door_descriptor(door, &transform));
    }
    for window in plan.windows.iter() {
        descriptors.push(window_descriptor(window, &transform));
    }
    for cabinet in plan.cabinets.iter() {
        descriptors.extend(cabinet_descriptors(cabinet, &transform));
    }
    for model in plan.models.iter() {
        descriptors.push(model_descriptor(model, &transform));
    }

    debug!(
        descriptors = descriptors.len(),
        units_per_pixel = transform.factor(),
        "已生成 3D 场景描述"
    );

    SceneDescription {
        descriptors,
        bounds,
        center: transform.center(),
        units_per_pixel: transform.factor(),
    }
}

fn wall_descriptor(wall: &Wall, transform: &PlanTransform) -> SceneDescriptor {
    let length = transform.length(wall.length());
    let material = match &wall.texture {
        Some(url) => MaterialHint::textured(
            url,
            [length / TEXTURE_TILE_SIZE, wall.height / TEXTURE_TILE_SIZE],
        ),
        None => MaterialHint::flat(WALL_COLOR),
    };
    SceneDescriptor {
        id: wall.id.clone(),
        entity_id: wall.id.clone(),
        kind: DescriptorKind::Wall,
        shape: Shape::Box {
            width: length,
            height: wall.height,
            depth: transform.length(wall.thickness),
        },
        material,
        position: transform.place(wall.midpoint(), wall.height / 2.0),
        rotation: Vector3::yaw(wall.angle()),
        model_url: None,
    }
}

fn room_descriptors(room: &Room, transform: &PlanTransform) -> Vec<SceneDescriptor> {
    if !room.is_renderable() {
        return Vec::new();
    }
    let outline: Vec<[f64; 2]> = room
        .points
        .iter()
        .map(|point| transform.project(*point))
        .collect();

    let mut floor_material = match &room.floor_texture {
        Some(url) => {
            let extent = Bounds2D::from_points(room.points.iter().copied());
            MaterialHint::textured(
                url,
                [
                    transform.length(extent.width()) / TEXTURE_TILE_SIZE,
                    transform.length(extent.height()) / TEXTURE_TILE_SIZE,
                ],
            )
        }
        None => MaterialHint::flat(room.color.clone()),
    };
    floor_material.double_sided = true;

    let ceiling_material = MaterialHint {
        double_sided: true,
        ..MaterialHint::flat(CEILING_COLOR)
    };

    vec![
        SceneDescriptor {
            id: room.id.clone(),
            entity_id: room.id.clone(),
            kind: DescriptorKind::Floor,
            shape: Shape::Outline {
                points: outline.clone(),
            },
            material: floor_material,
            position: Point3::new(0.0, 0.0, 0.0),
            rotation: Vector3::ZERO,
            model_url: None,
        },
        SceneDescriptor {
            id: format!("{}-ceiling", room.id),
            entity_id: room.id.clone(),
            kind: DescriptorKind::Ceiling,
            shape: Shape::Outline { points: outline },
            material: ceiling_material,
            position: Point3::new(0.0, CEILING_HEIGHT, 0.0),
            rotation: Vector3::ZERO,
            model_url: None,
        },
    ]
}

fn door_descriptor(door: &Door, transform: &PlanTransform) -> SceneDescriptor {
    SceneDescriptor {
        id: door.id.clone(),
        entity_id: door.id.clone(),
        kind: DescriptorKind::Door,
        shape: Shape::Box {
            width: transform.length(door.width),
            height: DOOR_HEIGHT,
            depth: DOOR_THICKNESS,
        },
        material: MaterialHint {
            roughness: 0.7,
            ..MaterialHint::flat(DOOR_COLOR)
        },
        position: transform.place(door.position, DOOR_HEIGHT / 2.0),
        rotation: Vector3::yaw(door.angle),
        model_url: None,
    }
}

fn window_descriptor(window: &Window, transform: &PlanTransform) -> SceneDescriptor {
    SceneDescriptor {
        id: window.id.clone(),
        entity_id: window.id.clone(),
        kind: DescriptorKind::Window,
        shape: Shape::Box {
            width: transform.length(window.width),
            height: window.effective_height(),
            depth: WINDOW_THICKNESS,
        },
        material: MaterialHint {
            metalness: 0.1,
            ..MaterialHint::translucent(GLASS_COLOR, 0.3)
        },
        position: transform.place(window.position, WINDOW_CENTER_HEIGHT),
        rotation: Vector3::yaw(window.angle),
        model_url: None,
    }
}

fn cabinet_descriptors(cabinet: &Cabinet, transform: &PlanTransform) -> Vec<SceneDescriptor> {
    // 宽、深为像素需换算；高已是米，直接使用。
    let depth = transform.length(cabinet.depth);
    let elevation = match cabinet.kind {
        CabinetKind::Wall => WALL_CABINET_ELEVATION,
        _ => cabinet.height / 2.0,
    };
    let body_position = transform.place(cabinet.position, elevation);

    let mut descriptors = vec![SceneDescriptor {
        id: cabinet.id.clone(),
        entity_id: cabinet.id.clone(),
        kind: DescriptorKind::Cabinet,
        shape: Shape::Box {
            width: transform.length(cabinet.width),
            height: cabinet.height,
            depth,
        },
        material: MaterialHint {
            roughness: 0.6,
            ..MaterialHint::flat(cabinet.color.clone())
        },
        position: body_position,
        rotation: Vector3::yaw(cabinet.angle),
        model_url: None,
    }];

    if cabinet.kind != CabinetKind::Island {
        // 柜体局部 +Z（深度方向）绕 Y 旋转后为 (sin θ, cos θ)。
        let offset = depth / 2.0 + HANDLE_STANDOFF;
        let (sin, cos) = cabinet.angle.sin_cos();
        descriptors.push(SceneDescriptor {
            id: format!("{}-handle", cabinet.id),
            entity_id: cabinet.id.clone(),
            kind: DescriptorKind::CabinetHandle,
            shape: Shape::Cylinder {
                radius: HANDLE_RADIUS,
                length: HANDLE_LENGTH,
            },
            material: MaterialHint {
                roughness: 0.3,
                metalness: 0.8,
                ..MaterialHint::flat(HANDLE_COLOR)
            },
            position: Point3::new(
                body_position.x() + sin * offset,
                body_position.y(),
                body_position.z() + cos * offset,
            ),
            rotation: Vector3::new(0.0, cabinet.angle, FRAC_PI_2),
            model_url: None,
        });
    }

    descriptors
}

fn model_descriptor(model: &Model3D, transform: &PlanTransform) -> SceneDescriptor {
    let size = MODEL_PLACEHOLDER_SIZE * model.scale;
    SceneDescriptor {
        id: model.id.clone(),
        entity_id: model.id.clone(),
        kind: DescriptorKind::ModelPlaceholder,
        shape: Shape::Box {
            width: size,
            height: size,
            depth: size,
        },
        material: MaterialHint::translucent(PLACEHOLDER_COLOR, 0.5),
        position: transform.place(model.position, model.height + size / 2.0),
        rotation: Vector3::yaw(model.angle),
        model_url: Some(model.model_url.clone()),
    }
}

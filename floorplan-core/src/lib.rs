pub mod geometry {
    use glam::{DVec2, DVec3};
    use serde::{Deserialize, Serialize};
    use thiserror::Error;

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum GeometryError {
        #[error("invalid argument: {0}")]
        InvalidArgument(String),
    }

    /// 平面像素坐标点，内部以 `glam::DVec2` 表示，序列化为 `{x, y}` 对象。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    #[serde(from = "PointRepr", into = "PointRepr")]
    pub struct Point2(pub DVec2);

    #[derive(Serialize, Deserialize)]
    struct PointRepr {
        x: f64,
        y: f64,
    }

    impl From<PointRepr> for Point2 {
        fn from(value: PointRepr) -> Self {
            Self::new(value.x, value.y)
        }
    }

    impl From<Point2> for PointRepr {
        fn from(value: Point2) -> Self {
            Self {
                x: value.x(),
                y: value.y(),
            }
        }
    }

    impl Point2 {
        pub const ORIGIN: Point2 = Point2(DVec2::ZERO);

        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn translate(self, offset: Vector2) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn vector_to(self, other: Point2) -> Vector2 {
            Vector2(other.0 - self.0)
        }

        #[inline]
        pub fn midpoint(self, other: Point2) -> Point2 {
            Self((self.0 + other.0) * 0.5)
        }

        #[inline]
        pub fn distance_to(self, other: Point2) -> f64 {
            distance(self, other)
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self::from_vec(value)
        }
    }

    /// 二维向量，用于墙体方向等派生量。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_points(start: Point2, end: Point2) -> Self {
            Self(end.0 - start.0)
        }

        #[inline]
        pub fn length(self) -> f64 {
            self.0.length()
        }

        #[inline]
        pub fn length_squared(self) -> f64 {
            self.0.length_squared()
        }

        /// 相对 +X 轴的方向角（弧度），即 `atan2(dy, dx)`。
        #[inline]
        pub fn angle(self) -> f64 {
            self.0.y.atan2(self.0.x)
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }
    }

    impl From<DVec2> for Vector2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    /// 三维点，3D 场景描述使用 Y 轴向上的右手坐标系。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point3(pub DVec3);

    impl Point3 {
        #[inline]
        pub fn new(x: f64, y: f64, z: f64) -> Self {
            Self(DVec3::new(x, y, z))
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn z(self) -> f64 {
            self.0.z
        }

        #[inline]
        pub fn as_vec3(self) -> DVec3 {
            self.0
        }
    }

    impl From<DVec3> for Point3 {
        fn from(value: DVec3) -> Self {
            Self(value)
        }
    }

    /// 三维向量，描述符中用作欧拉角（弧度）。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector3(pub DVec3);

    impl Vector3 {
        pub const ZERO: Vector3 = Vector3(DVec3::ZERO);

        #[inline]
        pub fn new(x: f64, y: f64, z: f64) -> Self {
            Self(DVec3::new(x, y, z))
        }

        /// 仅绕竖直轴旋转。
        #[inline]
        pub fn yaw(angle: f64) -> Self {
            Self(DVec3::new(0.0, angle, 0.0))
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn z(self) -> f64 {
            self.0.z
        }

        #[inline]
        pub fn as_vec3(self) -> DVec3 {
            self.0
        }
    }

    impl From<DVec3> for Vector3 {
        fn from(value: DVec3) -> Self {
            Self(value)
        }
    }

    /// 轴对齐边界框，空框以 +∞/-∞ 反转表示。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn new(min: Point2, max: Point2) -> Self {
            Self { min, max }
        }

        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point2::new(f64::INFINITY, f64::INFINITY),
                max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        pub fn from_points<I>(points: I) -> Self
        where
            I: IntoIterator<Item = Point2>,
        {
            let mut bounds = Self::empty();
            for point in points {
                bounds.include_point(point);
            }
            bounds
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        #[inline]
        pub fn width(&self) -> f64 {
            if self.is_empty() {
                0.0
            } else {
                self.max.x() - self.min.x()
            }
        }

        #[inline]
        pub fn height(&self) -> f64 {
            if self.is_empty() {
                0.0
            } else {
                self.max.y() - self.min.y()
            }
        }

        pub fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            let min_vec = self.min.as_vec2().min(point.as_vec2());
            let max_vec = self.max.as_vec2().max(point.as_vec2());
            self.min = Point2::from_vec(min_vec);
            self.max = Point2::from_vec(max_vec);
        }

        pub fn include_bounds(&mut self, other: &Bounds2D) {
            if other.is_empty() {
                return;
            }
            self.include_point(other.min);
            self.include_point(other.max);
        }

        /// 闭区间包含测试。
        #[inline]
        pub fn contains(&self, point: Point2) -> bool {
            !self.is_empty()
                && point.x() >= self.min.x()
                && point.x() <= self.max.x()
                && point.y() >= self.min.y()
                && point.y() <= self.max.y()
        }

        /// 框中心；空框退化到原点。
        #[inline]
        pub fn center(&self) -> Point2 {
            if self.is_empty() {
                return Point2::ORIGIN;
            }
            let center = (self.min.as_vec2() + self.max.as_vec2()) * 0.5;
            Point2::from_vec(center)
        }
    }

    impl Default for Bounds2D {
        fn default() -> Self {
            Self::empty()
        }
    }

    #[inline]
    pub fn distance(a: Point2, b: Point2) -> f64 {
        a.as_vec2().distance(b.as_vec2())
    }

    /// 点到线段的距离：投影参数落在 [0, 1] 内时取垂距，否则取较近端点。
    /// 零长度线段的参数固定为 -1，因此总是回落到 `start`。
    pub fn point_to_segment_distance(point: Point2, start: Point2, end: Point2) -> f64 {
        let a = point.x() - start.x();
        let b = point.y() - start.y();
        let c = end.x() - start.x();
        let d = end.y() - start.y();

        let dot = a * c + b * d;
        let len_sq = c * c + d * d;
        let param = if len_sq != 0.0 { dot / len_sq } else { -1.0 };

        let nearest = if param < 0.0 {
            start
        } else if param > 1.0 {
            end
        } else {
            Point2::new(start.x() + param * c, start.y() + param * d)
        };
        distance(point, nearest)
    }

    /// 将坐标逐轴吸附到最近的网格线，`.5` 向正无穷取整。
    pub fn snap_to_grid(point: Point2, grid_size: f64) -> Result<Point2, GeometryError> {
        if !grid_size.is_finite() || grid_size <= 0.0 {
            return Err(GeometryError::InvalidArgument(format!(
                "grid size must be positive, got {grid_size}"
            )));
        }
        Ok(Point2::new(
            snap_value(point.x(), grid_size),
            snap_value(point.y(), grid_size),
        ))
    }

    #[inline]
    fn snap_value(value: f64, grid_size: f64) -> f64 {
        (value / grid_size + 0.5).floor() * grid_size
    }

    /// 返回严格位于阈值内的最近候选点；距离相同时保留先出现者。
    pub fn find_nearest_point(
        point: Point2,
        candidates: &[Point2],
        threshold: f64,
    ) -> Option<Point2> {
        let mut best = None;
        let mut best_distance = threshold;
        for candidate in candidates {
            let dist = distance(point, *candidate);
            if dist < best_distance {
                best_distance = dist;
                best = Some(*candidate);
            }
        }
        best
    }

    /// 奇偶射线法，多边形隐式闭合（末点连回首点）。
    pub fn is_point_in_polygon(point: Point2, polygon: &[Point2]) -> bool {
        if polygon.len() < 2 {
            return false;
        }
        let (x, y) = (point.x(), point.y());
        let mut inside = false;
        let mut j = polygon.len() - 1;
        for i in 0..polygon.len() {
            let (xi, yi) = (polygon[i].x(), polygon[i].y());
            let (xj, yj) = (polygon[j].x(), polygon[j].y());
            if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// 鞋带公式求面积（绝对值，单位为平方像素）。
    pub fn polygon_area(polygon: &[Point2]) -> f64 {
        if polygon.len() < 3 {
            return 0.0;
        }
        let mut twice_area = 0.0;
        for (i, current) in polygon.iter().enumerate() {
            let next = polygon[(i + 1) % polygon.len()];
            twice_area += current.x() * next.y() - next.x() * current.y();
        }
        (twice_area * 0.5).abs()
    }

}

pub mod units {
    use std::fmt;
    use std::str::FromStr;

    use serde::{Deserialize, Serialize};
    use thiserror::Error;

    /// 基准比例：20 像素 = 1 米。预设尺寸始终按该常量换算，与平面当前标定无关。
    pub const BASELINE_PIXELS_PER_METER: f64 = 20.0;
    pub const FEET_PER_METER: f64 = 3.28084;
    pub const INCHES_PER_METER: f64 = 39.3701;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Unit {
        #[default]
        Meters,
        Feet,
        Inches,
    }

    impl Unit {
        pub const ALL: [Unit; 3] = [Unit::Meters, Unit::Feet, Unit::Inches];

        /// 每米折合的该单位数量。
        #[inline]
        pub fn per_meter(self) -> f64 {
            match self {
                Unit::Meters => 1.0,
                Unit::Feet => FEET_PER_METER,
                Unit::Inches => INCHES_PER_METER,
            }
        }

        #[inline]
        pub fn to_meters(self, value: f64) -> f64 {
            value / self.per_meter()
        }

        #[inline]
        pub fn from_meters(self, meters: f64) -> f64 {
            meters * self.per_meter()
        }

        #[inline]
        pub fn suffix(self) -> &'static str {
            match self {
                Unit::Meters => "m",
                Unit::Feet => "ft",
                Unit::Inches => "in",
            }
        }

        /// 标注文字保留的小数位数。
        #[inline]
        pub fn precision(self) -> usize {
            match self {
                Unit::Meters | Unit::Feet => 2,
                Unit::Inches => 1,
            }
        }

        #[inline]
        pub fn name(self) -> &'static str {
            match self {
                Unit::Meters => "meters",
                Unit::Feet => "feet",
                Unit::Inches => "inches",
            }
        }
    }

    impl fmt::Display for Unit {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.name())
        }
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("unknown unit: {0}")]
    pub struct UnknownUnit(pub String);

    impl FromStr for Unit {
        type Err = UnknownUnit;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.trim().to_ascii_lowercase().as_str() {
                "m" | "meter" | "meters" | "metre" | "metres" => Ok(Unit::Meters),
                "ft" | "foot" | "feet" => Ok(Unit::Feet),
                "in" | "inch" | "inches" => Ok(Unit::Inches),
                other => Err(UnknownUnit(other.to_string())),
            }
        }
    }

    /// 像素长度 → 实际长度：先按 `scale`（像素/米）折算为米，再换算到目标单位。
    #[inline]
    pub fn pixels_to_real(pixels: f64, scale: f64, unit: Unit) -> f64 {
        unit.from_meters(pixels / scale)
    }

    #[inline]
    pub fn real_to_pixels(value: f64, scale: f64, unit: Unit) -> f64 {
        unit.to_meters(value) * scale
    }

    pub fn format_measurement(pixels: f64, scale: f64, unit: Unit) -> String {
        format_real(pixels_to_real(pixels, scale, unit), unit)
    }

    #[inline]
    pub fn format_real(value: f64, unit: Unit) -> String {
        format!("{:.*} {}", unit.precision(), value, unit.suffix())
    }

    /// 平方像素 → 目标单位的平方值。
    #[inline]
    pub fn square_pixels_to_real(area: f64, scale: f64, unit: Unit) -> f64 {
        let factor = pixels_to_real(1.0, scale, unit);
        area * factor * factor
    }

}

pub mod plan {
    use std::collections::HashSet;
    use std::fmt;
    use std::sync::Arc;

    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    use crate::geometry::{self, Bounds2D, Point2, Vector2};
    use crate::units::{BASELINE_PIXELS_PER_METER, Unit};

    pub const DEFAULT_WALL_THICKNESS: f64 = 10.0;
    pub const DEFAULT_WALL_HEIGHT: f64 = 2.7;
    pub const DEFAULT_DOOR_WIDTH_METERS: f64 = 0.9;
    pub const DEFAULT_WINDOW_WIDTH_METERS: f64 = 1.2;
    pub const DEFAULT_WINDOW_HEIGHT: f64 = 1.2;
    pub const DEFAULT_PHOTO_OPACITY: f64 = 0.5;
    /// 模型标记在平面上的基准边长（像素），实际边长再乘以标记缩放。
    pub const MODEL_MARKER_SIZE: f64 = 40.0;

    /// 生成新的不透明实体 ID，形如 `wall-3f2a…`。ID 一经删除不再复用。
    pub fn new_entity_id(prefix: &str) -> String {
        format!("{prefix}-{}", Uuid::new_v4().simple())
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Wall {
        pub id: String,
        pub start: Point2,
        pub end: Point2,
        pub thickness: f64,
        /// 墙高，单位为米。
        #[serde(default = "Wall::default_height")]
        pub height: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub texture: Option<String>,
    }

    impl Wall {
        pub fn new(start: Point2, end: Point2) -> Self {
            Self {
                id: new_entity_id("wall"),
                start,
                end,
                thickness: DEFAULT_WALL_THICKNESS,
                height: DEFAULT_WALL_HEIGHT,
                texture: None,
            }
        }

        fn default_height() -> f64 {
            DEFAULT_WALL_HEIGHT
        }

        #[inline]
        pub fn direction(&self) -> Vector2 {
            Vector2::from_points(self.start, self.end)
        }

        #[inline]
        pub fn length(&self) -> f64 {
            self.direction().length()
        }

        #[inline]
        pub fn angle(&self) -> f64 {
            self.direction().angle()
        }

        #[inline]
        pub fn midpoint(&self) -> Point2 {
            self.start.midpoint(self.end)
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Room {
        pub id: String,
        pub name: String,
        pub points: Vec<Point2>,
        pub color: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub floor_texture: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub wall_texture: Option<String>,
    }

    impl Room {
        /// 少于三个顶点的房间不参与命中测试、标注和投影。
        #[inline]
        pub fn is_renderable(&self) -> bool {
            self.points.len() >= 3
        }

        /// 依次返回各边（含末点回到首点的闭合边）。
        pub fn edges(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
            let count = if self.points.len() >= 2 {
                self.points.len()
            } else {
                0
            };
            (0..count).map(move |i| (self.points[i], self.points[(i + 1) % count]))
        }

        #[inline]
        pub fn area(&self) -> f64 {
            geometry::polygon_area(&self.points)
        }

        #[inline]
        pub fn contains(&self, point: Point2) -> bool {
            self.is_renderable() && geometry::is_point_in_polygon(point, &self.points)
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Door {
        pub id: String,
        pub position: Point2,
        pub angle: f64,
        pub width: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub wall_id: Option<String>,
    }

    impl Door {
        pub fn new(position: Point2, angle: f64) -> Self {
            Self {
                id: new_entity_id("door"),
                position,
                angle,
                width: DEFAULT_DOOR_WIDTH_METERS * BASELINE_PIXELS_PER_METER,
                wall_id: None,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Window {
        pub id: String,
        pub position: Point2,
        pub angle: f64,
        pub width: f64,
        /// 窗高（米），缺省时投影使用 [`DEFAULT_WINDOW_HEIGHT`]。
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub height: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub wall_id: Option<String>,
    }

    impl Window {
        pub fn new(position: Point2, angle: f64) -> Self {
            Self {
                id: new_entity_id("window"),
                position,
                angle,
                width: DEFAULT_WINDOW_WIDTH_METERS * BASELINE_PIXELS_PER_METER,
                height: Some(DEFAULT_WINDOW_HEIGHT),
                wall_id: None,
            }
        }

        #[inline]
        pub fn effective_height(&self) -> f64 {
            self.height.unwrap_or(DEFAULT_WINDOW_HEIGHT)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum CabinetKind {
        Base,
        Wall,
        Tall,
        Corner,
        Island,
    }

    impl CabinetKind {
        pub const ALL: [CabinetKind; 5] = [
            CabinetKind::Base,
            CabinetKind::Wall,
            CabinetKind::Tall,
            CabinetKind::Corner,
            CabinetKind::Island,
        ];

        pub fn name(self) -> &'static str {
            match self {
                CabinetKind::Base => "base",
                CabinetKind::Wall => "wall",
                CabinetKind::Tall => "tall",
                CabinetKind::Corner => "corner",
                CabinetKind::Island => "island",
            }
        }
    }

    impl fmt::Display for CabinetKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.name())
        }
    }

    /// 橱柜：宽、深为像素，高为米（投影直接使用米制高度）。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Cabinet {
        pub id: String,
        #[serde(rename = "type")]
        pub kind: CabinetKind,
        pub position: Point2,
        pub angle: f64,
        pub width: f64,
        pub depth: f64,
        pub height: f64,
        pub color: String,
    }

    impl Cabinet {
        /// 忽略旋转的轴对齐占位框。
        pub fn footprint(&self) -> Bounds2D {
            let half_width = self.width / 2.0;
            let half_depth = self.depth / 2.0;
            Bounds2D::new(
                Point2::new(self.position.x() - half_width, self.position.y() - half_depth),
                Point2::new(self.position.x() + half_width, self.position.y() + half_depth),
            )
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Model3D {
        pub id: String,
        pub name: String,
        pub position: Point2,
        pub angle: f64,
        pub scale: f64,
        /// 离地高度（米）。
        pub height: f64,
        pub model_url: String,
    }

    impl Model3D {
        pub fn new(name: impl Into<String>, model_url: impl Into<String>, position: Point2) -> Self {
            Self {
                id: new_entity_id("model"),
                name: name.into(),
                position,
                angle: 0.0,
                scale: 1.0,
                height: 0.0,
                model_url: model_url.into(),
            }
        }

        /// 平面标记：以位置为中心、边长 `40 × scale` 的正方形。
        pub fn marker_bounds(&self) -> Bounds2D {
            let half = MODEL_MARKER_SIZE * self.scale / 2.0;
            Bounds2D::new(
                Point2::new(self.position.x() - half, self.position.y() - half),
                Point2::new(self.position.x() + half, self.position.y() + half),
            )
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PhotoReference {
        pub id: String,
        pub name: String,
        pub url: String,
        /// 左上角。
        pub position: Point2,
        pub width: f64,
        pub height: f64,
        pub opacity: f64,
        #[serde(default)]
        pub locked: bool,
    }

    impl PhotoReference {
        pub fn new(
            name: impl Into<String>,
            url: impl Into<String>,
            position: Point2,
            width: f64,
            height: f64,
        ) -> Self {
            Self {
                id: new_entity_id("photo"),
                name: name.into(),
                url: url.into(),
                position,
                width,
                height,
                opacity: DEFAULT_PHOTO_OPACITY,
                locked: false,
            }
        }

        pub fn rect(&self) -> Bounds2D {
            Bounds2D::new(
                self.position,
                Point2::new(
                    self.position.x() + self.width,
                    self.position.y() + self.height,
                ),
            )
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Measurement {
        pub id: String,
        pub start: Point2,
        pub end: Point2,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub label: Option<String>,
        #[serde(default = "Measurement::default_visible")]
        pub visible: bool,
    }

    impl Measurement {
        pub fn new(start: Point2, end: Point2) -> Self {
            Self {
                id: new_entity_id("measure"),
                start,
                end,
                label: None,
                visible: true,
            }
        }

        fn default_visible() -> bool {
            true
        }

        #[inline]
        pub fn length(&self) -> f64 {
            geometry::distance(self.start, self.end)
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ScaleCalibration {
        pub point1: Point2,
        pub point2: Point2,
        pub real_distance: f64,
        pub unit: Unit,
    }

    impl ScaleCalibration {
        #[inline]
        pub fn pixel_length(&self) -> f64 {
            geometry::distance(self.point1, self.point2)
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PlanMetadata {
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        /// 像素/米，恒为正。
        pub scale: f64,
        pub unit: Unit,
        #[serde(default = "PlanMetadata::default_show_measurements")]
        pub show_measurements: bool,
    }

    impl PlanMetadata {
        fn default_show_measurements() -> bool {
            true
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum EntityKind {
        Photo,
        Model,
        Cabinet,
        Wall,
        Room,
        Door,
        Window,
        Measurement,
    }

    impl EntityKind {
        pub fn name(self) -> &'static str {
            match self {
                EntityKind::Photo => "photo",
                EntityKind::Model => "model",
                EntityKind::Cabinet => "cabinet",
                EntityKind::Wall => "wall",
                EntityKind::Room => "room",
                EntityKind::Door => "door",
                EntityKind::Window => "window",
                EntityKind::Measurement => "measurement",
            }
        }
    }

    impl fmt::Display for EntityKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.name())
        }
    }

    /// 按类别 + ID 定位实体，供命中测试与选中集使用。
    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EntityRef {
        pub kind: EntityKind,
        pub id: String,
    }

    impl EntityRef {
        #[inline]
        pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
            Self {
                kind,
                id: id.into(),
            }
        }
    }

    impl fmt::Display for EntityRef {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}#{}", self.kind, self.id)
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum PlanEntity {
        Wall(Wall),
        Room(Room),
        Door(Door),
        Window(Window),
        Cabinet(Cabinet),
        Model(Model3D),
        Photo(PhotoReference),
        Measurement(Measurement),
    }

    impl PlanEntity {
        pub fn kind(&self) -> EntityKind {
            match self {
                PlanEntity::Wall(_) => EntityKind::Wall,
                PlanEntity::Room(_) => EntityKind::Room,
                PlanEntity::Door(_) => EntityKind::Door,
                PlanEntity::Window(_) => EntityKind::Window,
                PlanEntity::Cabinet(_) => EntityKind::Cabinet,
                PlanEntity::Model(_) => EntityKind::Model,
                PlanEntity::Photo(_) => EntityKind::Photo,
                PlanEntity::Measurement(_) => EntityKind::Measurement,
            }
        }

        pub fn id(&self) -> &str {
            match self {
                PlanEntity::Wall(wall) => &wall.id,
                PlanEntity::Room(room) => &room.id,
                PlanEntity::Door(door) => &door.id,
                PlanEntity::Window(window) => &window.id,
                PlanEntity::Cabinet(cabinet) => &cabinet.id,
                PlanEntity::Model(model) => &model.id,
                PlanEntity::Photo(photo) => &photo.id,
                PlanEntity::Measurement(measurement) => &measurement.id,
            }
        }

        #[inline]
        pub fn entity_ref(&self) -> EntityRef {
            EntityRef::new(self.kind(), self.id())
        }

        /// 实体的 2D 范围；门窗以宽度为边长的方框近似。
        pub fn bounds(&self) -> Option<Bounds2D> {
            let bounds = match self {
                PlanEntity::Wall(wall) => Bounds2D::from_points([wall.start, wall.end]),
                PlanEntity::Room(room) => Bounds2D::from_points(room.points.iter().copied()),
                PlanEntity::Door(door) => square_around(door.position, door.width),
                PlanEntity::Window(window) => square_around(window.position, window.width),
                PlanEntity::Cabinet(cabinet) => cabinet.footprint(),
                PlanEntity::Model(model) => model.marker_bounds(),
                PlanEntity::Photo(photo) => photo.rect(),
                PlanEntity::Measurement(measurement) => {
                    Bounds2D::from_points([measurement.start, measurement.end])
                }
            };
            if bounds.is_empty() { None } else { Some(bounds) }
        }
    }

    fn square_around(center: Point2, size: f64) -> Bounds2D {
        let half = size / 2.0;
        Bounds2D::new(
            Point2::new(center.x() - half, center.y() - half),
            Point2::new(center.x() + half, center.y() + half),
        )
    }

    /// 平面聚合根。各集合通过 `Arc` 共享，修改总是产生新值（写时复制），
    /// 未改动的集合在新旧两份平面之间共享。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FloorPlan {
        pub id: String,
        pub name: String,
        #[serde(default)]
        pub walls: Arc<Vec<Wall>>,
        #[serde(default)]
        pub rooms: Arc<Vec<Room>>,
        #[serde(default)]
        pub doors: Arc<Vec<Door>>,
        #[serde(default)]
        pub windows: Arc<Vec<Window>>,
        #[serde(default)]
        pub cabinets: Arc<Vec<Cabinet>>,
        #[serde(default)]
        pub models: Arc<Vec<Model3D>>,
        #[serde(default)]
        pub photos: Arc<Vec<PhotoReference>>,
        #[serde(default)]
        pub measurements: Arc<Vec<Measurement>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub scale_calibration: Option<ScaleCalibration>,
        pub metadata: PlanMetadata,
    }

    impl FloorPlan {
        pub fn new(name: impl Into<String>) -> Self {
            let now = Utc::now();
            Self {
                id: new_entity_id("plan"),
                name: name.into(),
                walls: Arc::default(),
                rooms: Arc::default(),
                doors: Arc::default(),
                windows: Arc::default(),
                cabinets: Arc::default(),
                models: Arc::default(),
                photos: Arc::default(),
                measurements: Arc::default(),
                scale_calibration: None,
                metadata: PlanMetadata {
                    created_at: now,
                    updated_at: now,
                    scale: BASELINE_PIXELS_PER_METER,
                    unit: Unit::Meters,
                    show_measurements: true,
                },
            }
        }

        #[inline]
        pub fn scale(&self) -> f64 {
            self.metadata.scale
        }

        #[inline]
        pub fn unit(&self) -> Unit {
            self.metadata.unit
        }

        pub fn entity_count(&self) -> usize {
            self.walls.len()
                + self.rooms.len()
                + self.doors.len()
                + self.windows.len()
                + self.cabinets.len()
                + self.models.len()
                + self.photos.len()
                + self.measurements.len()
        }

        pub fn entity(&self, target: &EntityRef) -> Option<PlanEntity> {
            let id = target.id.as_str();
            match target.kind {
                EntityKind::Wall => {
                    find(self.walls.as_slice(), id, |w| &w.id).map(PlanEntity::Wall)
                }
                EntityKind::Room => {
                    find(self.rooms.as_slice(), id, |r| &r.id).map(PlanEntity::Room)
                }
                EntityKind::Door => {
                    find(self.doors.as_slice(), id, |d| &d.id).map(PlanEntity::Door)
                }
                EntityKind::Window => {
                    find(self.windows.as_slice(), id, |w| &w.id).map(PlanEntity::Window)
                }
                EntityKind::Cabinet => {
                    find(self.cabinets.as_slice(), id, |c| &c.id).map(PlanEntity::Cabinet)
                }
                EntityKind::Model => {
                    find(self.models.as_slice(), id, |m| &m.id).map(PlanEntity::Model)
                }
                EntityKind::Photo => {
                    find(self.photos.as_slice(), id, |p| &p.id).map(PlanEntity::Photo)
                }
                EntityKind::Measurement => {
                    find(self.measurements.as_slice(), id, |m| &m.id).map(PlanEntity::Measurement)
                }
            }
        }

        #[inline]
        pub fn entity_bounds(&self, target: &EntityRef) -> Option<Bounds2D> {
            self.entity(target).as_ref().and_then(PlanEntity::bounds)
        }

        /// 仅由墙端点与房间顶点构成的范围，3D 投影以其中心为原点。
        pub fn structural_bounds(&self) -> Bounds2D {
            let mut bounds = Bounds2D::empty();
            for wall in self.walls.iter() {
                bounds.include_point(wall.start);
                bounds.include_point(wall.end);
            }
            for room in self.rooms.iter() {
                for point in &room.points {
                    bounds.include_point(*point);
                }
            }
            bounds
        }

        /// 全部实体的范围。
        pub fn bounds(&self) -> Option<Bounds2D> {
            let mut bounds = Bounds2D::empty();
            for entity in self.entities() {
                if let Some(entity_bounds) = entity.bounds() {
                    bounds.include_bounds(&entity_bounds);
                }
            }
            if bounds.is_empty() { None } else { Some(bounds) }
        }

        /// 以命中测试优先级顺序遍历全部实体（拷贝）。
        pub fn entities(&self) -> impl Iterator<Item = PlanEntity> + '_ {
            let photos = self.photos.iter().cloned().map(PlanEntity::Photo);
            let models = self.models.iter().cloned().map(PlanEntity::Model);
            let cabinets = self.cabinets.iter().cloned().map(PlanEntity::Cabinet);
            let walls = self.walls.iter().cloned().map(PlanEntity::Wall);
            let rooms = self.rooms.iter().cloned().map(PlanEntity::Room);
            let doors = self.doors.iter().cloned().map(PlanEntity::Door);
            let windows = self.windows.iter().cloned().map(PlanEntity::Window);
            let measurements = self
                .measurements
                .iter()
                .cloned()
                .map(PlanEntity::Measurement);
            photos
                .chain(models)
                .chain(cabinets)
                .chain(walls)
                .chain(rooms)
                .chain(doors)
                .chain(windows)
                .chain(measurements)
        }

        /// 刷新 `updated_at`。所有派生新平面的方法都会调用。
        #[inline]
        pub fn touch(&mut self) {
            self.metadata.updated_at = Utc::now();
        }

        /// 追加实体，返回新平面。
        pub fn with_entity(&self, entity: PlanEntity) -> FloorPlan {
            let mut next = self.clone();
            match entity {
                PlanEntity::Wall(wall) => Arc::make_mut(&mut next.walls).push(wall),
                PlanEntity::Room(room) => Arc::make_mut(&mut next.rooms).push(room),
                PlanEntity::Door(door) => Arc::make_mut(&mut next.doors).push(door),
                PlanEntity::Window(window) => Arc::make_mut(&mut next.windows).push(window),
                PlanEntity::Cabinet(cabinet) => Arc::make_mut(&mut next.cabinets).push(cabinet),
                PlanEntity::Model(model) => Arc::make_mut(&mut next.models).push(model),
                PlanEntity::Photo(photo) => Arc::make_mut(&mut next.photos).push(photo),
                PlanEntity::Measurement(measurement) => {
                    Arc::make_mut(&mut next.measurements).push(measurement)
                }
            }
            next.touch();
            next
        }

        /// 以同 ID 的新实体整体替换旧实体；找不到时返回 `None`。
        pub fn replace_entity(&self, entity: PlanEntity) -> Option<FloorPlan> {
            let mut next = self.clone();
            let replaced = match entity {
                PlanEntity::Wall(wall) => replace_in(&mut next.walls, wall, |w| &w.id),
                PlanEntity::Room(room) => replace_in(&mut next.rooms, room, |r| &r.id),
                PlanEntity::Door(door) => replace_in(&mut next.doors, door, |d| &d.id),
                PlanEntity::Window(window) => replace_in(&mut next.windows, window, |w| &w.id),
                PlanEntity::Cabinet(cabinet) => {
                    replace_in(&mut next.cabinets, cabinet, |c| &c.id)
                }
                PlanEntity::Model(model) => replace_in(&mut next.models, model, |m| &m.id),
                PlanEntity::Photo(photo) => replace_in(&mut next.photos, photo, |p| &p.id),
                PlanEntity::Measurement(measurement) => {
                    replace_in(&mut next.measurements, measurement, |m| &m.id)
                }
            };
            if !replaced {
                return None;
            }
            next.touch();
            Some(next)
        }

        #[inline]
        pub fn without_entity(&self, target: &EntityRef) -> FloorPlan {
            self.without_entities(std::slice::from_ref(target))
        }

        /// 一次过滤掉多个实体；未受影响的集合保持共享。
        pub fn without_entities(&self, targets: &[EntityRef]) -> FloorPlan {
            let doomed = |kind: EntityKind| {
                targets
                    .iter()
                    .filter(|target| target.kind == kind)
                    .map(|target| target.id.as_str())
                    .collect::<HashSet<_>>()
            };
            let mut next = self.clone();
            retain_in(&mut next.walls, &doomed(EntityKind::Wall), |w| &w.id);
            retain_in(&mut next.rooms, &doomed(EntityKind::Room), |r| &r.id);
            retain_in(&mut next.doors, &doomed(EntityKind::Door), |d| &d.id);
            retain_in(&mut next.windows, &doomed(EntityKind::Window), |w| &w.id);
            retain_in(&mut next.cabinets, &doomed(EntityKind::Cabinet), |c| &c.id);
            retain_in(&mut next.models, &doomed(EntityKind::Model), |m| &m.id);
            retain_in(&mut next.photos, &doomed(EntityKind::Photo), |p| &p.id);
            retain_in(
                &mut next.measurements,
                &doomed(EntityKind::Measurement),
                |m| &m.id,
            );
            next.touch();
            next
        }

        pub fn with_measurements(&self, measurements: Vec<Measurement>) -> FloorPlan {
            let mut next = self.clone();
            next.measurements = Arc::new(measurements);
            next.touch();
            next
        }

        /// 写入标定记录并覆盖比例与单位；已有几何不做缩放。
        pub fn with_calibration(&self, calibration: ScaleCalibration, scale: f64) -> FloorPlan {
            let mut next = self.clone();
            next.metadata.scale = scale;
            next.metadata.unit = calibration.unit;
            next.scale_calibration = Some(calibration);
            next.touch();
            next
        }

        pub fn with_unit(&self, unit: Unit) -> FloorPlan {
            let mut next = self.clone();
            next.metadata.unit = unit;
            next.touch();
            next
        }

        pub fn with_show_measurements(&self, show: bool) -> FloorPlan {
            let mut next = self.clone();
            next.metadata.show_measurements = show;
            next.touch();
            next
        }

        pub fn renamed(&self, name: impl Into<String>) -> FloorPlan {
            let mut next = self.clone();
            next.name = name.into();
            next.touch();
            next
        }
    }

    fn find<T: Clone>(items: &[T], id: &str, id_of: impl Fn(&T) -> &String) -> Option<T> {
        items.iter().find(|item| id_of(item) == id).cloned()
    }

    fn replace_in<T: Clone>(
        items: &mut Arc<Vec<T>>,
        replacement: T,
        id_of: impl Fn(&T) -> &String,
    ) -> bool {
        let Some(index) = items
            .iter()
            .position(|item| id_of(item) == id_of(&replacement))
        else {
            return false;
        };
        Arc::make_mut(items)[index] = replacement;
        true
    }

    fn retain_in<T: Clone>(
        items: &mut Arc<Vec<T>>,
        doomed: &HashSet<&str>,
        id_of: impl Fn(&T) -> &String,
    ) {
        if doomed.is_empty() || !items.iter().any(|item| doomed.contains(id_of(item).as_str())) {
            return;
        }
        let kept: Vec<T> = items
            .iter()
            .filter(|item| !doomed.contains(id_of(item).as_str()))
            .cloned()
            .collect();
        *items = Arc::new(kept);
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn square_room() -> Room {
            Room {
                id: "room-a".to_string(),
                name: "Study".to_string(),
                points: vec![
                    Point2::new(0.0, 0.0),
                    Point2::new(100.0, 0.0),
                    Point2::new(100.0, 100.0),
                    Point2::new(0.0, 100.0),
                ],
                color: "#ffffff".to_string(),
                floor_texture: None,
                wall_texture: None,
            }
        }

        #[test]
        fn wall_derives_length_and_angle() {
            let wall = Wall::new(Point2::new(0.0, 0.0), Point2::new(0.0, 50.0));
            assert!((wall.length() - 50.0).abs() < 1e-12);
            assert!((wall.angle() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
            assert_eq!(wall.midpoint(), Point2::new(0.0, 25.0));
            assert!((wall.height - DEFAULT_WALL_HEIGHT).abs() < f64::EPSILON);
            assert!(wall.id.starts_with("wall-"));
        }

        #[test]
        fn room_edges_include_closing_edge() {
            let room = square_room();
            let edges: Vec<_> = room.edges().collect();
            assert_eq!(edges.len(), 4);
            assert_eq!(edges[3], (Point2::new(0.0, 100.0), Point2::new(0.0, 0.0)));
            assert!((room.area() - 10_000.0).abs() < 1e-9);
        }

        #[test]
        fn with_entity_shares_untouched_collections() {
            let plan = FloorPlan::new("Test");
            let next = plan.with_entity(PlanEntity::Room(square_room()));
            assert_eq!(plan.rooms.len(), 0);
            assert_eq!(next.rooms.len(), 1);
            assert!(Arc::ptr_eq(&plan.walls, &next.walls));
            assert!(!Arc::ptr_eq(&plan.rooms, &next.rooms));
            assert!(next.metadata.updated_at >= plan.metadata.updated_at);
        }

        #[test]
        fn without_entities_filters_each_kind() {
            let wall = Wall::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
            let door = Door::new(Point2::new(5.0, 0.0), 0.0);
            let plan = FloorPlan::new("Test")
                .with_entity(PlanEntity::Wall(wall.clone()))
                .with_entity(PlanEntity::Door(door.clone()))
                .with_entity(PlanEntity::Room(square_room()));

            let next = plan.without_entities(&[
                EntityRef::new(EntityKind::Wall, wall.id.clone()),
                EntityRef::new(EntityKind::Door, door.id.clone()),
            ]);
            assert!(next.walls.is_empty());
            assert!(next.doors.is_empty());
            assert_eq!(next.rooms.len(), 1);
            assert!(Arc::ptr_eq(&plan.rooms, &next.rooms));
            assert_eq!(plan.walls.len(), 1);
        }

        #[test]
        fn replace_entity_requires_existing_id() {
            let plan = FloorPlan::new("Test").with_entity(PlanEntity::Room(square_room()));
            let mut renamed = square_room();
            renamed.name = "Office".to_string();
            let next = plan
                .replace_entity(PlanEntity::Room(renamed))
                .expect("room should be replaced");
            assert_eq!(next.rooms[0].name, "Office");
            assert_eq!(plan.rooms[0].name, "Study");

            let mut stray = square_room();
            stray.id = "room-missing".to_string();
            assert!(plan.replace_entity(PlanEntity::Room(stray)).is_none());
        }

        #[test]
        fn entity_lookup_and_bounds() {
            let plan = FloorPlan::new("Test").with_entity(PlanEntity::Room(square_room()));
            let target = EntityRef::new(EntityKind::Room, "room-a");
            match plan.entity(&target) {
                Some(PlanEntity::Room(room)) => assert_eq!(room.name, "Study"),
                other => panic!("unexpected entity lookup result: {other:?}"),
            }
            let bounds = plan.entity_bounds(&target).expect("room bounds");
            assert_eq!(bounds.max(), Point2::new(100.0, 100.0));
            assert!(plan.entity(&EntityRef::new(EntityKind::Wall, "room-a")).is_none());
        }

        #[test]
        fn structural_bounds_ignore_furniture() {
            let mut plan = FloorPlan::new("Test");
            assert!(plan.structural_bounds().is_empty());
            plan = plan
                .with_entity(PlanEntity::Door(Door::new(Point2::new(500.0, 500.0), 0.0)))
                .with_entity(PlanEntity::Wall(Wall::new(
                    Point2::new(0.0, 0.0),
                    Point2::new(40.0, 20.0),
                )));
            let bounds = plan.structural_bounds();
            assert_eq!(bounds.min(), Point2::new(0.0, 0.0));
            assert_eq!(bounds.max(), Point2::new(40.0, 20.0));
            let all = plan.bounds().expect("plan bounds");
            assert!(all.max().x() > 500.0);
        }

        #[test]
        fn calibration_overwrites_scale_and_unit() {
            let plan = FloorPlan::new("Test");
            let calibration = ScaleCalibration {
                point1: Point2::new(0.0, 0.0),
                point2: Point2::new(200.0, 0.0),
                real_distance: 10.0,
                unit: Unit::Feet,
            };
            let next = plan.with_calibration(calibration, 65.6168);
            assert_eq!(next.unit(), Unit::Feet);
            assert!((next.scale() - 65.6168).abs() < 1e-12);
            assert!((plan.scale() - BASELINE_PIXELS_PER_METER).abs() < f64::EPSILON);
            assert!(next.scale_calibration.is_some());
        }
    }
}

pub mod presets {
    use std::fmt;
    use std::str::FromStr;

    use serde::{Deserialize, Serialize};
    use thiserror::Error;

    use crate::geometry::Point2;
    use crate::plan::{Cabinet, CabinetKind, FloorPlan, Room, new_entity_id};
    use crate::units::BASELINE_PIXELS_PER_METER;

    pub const DEFAULT_PLAN_NAME: &str = "Untitled Floor Plan";

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum RoomKind {
        Living,
        Bedroom,
        Kitchen,
        Bathroom,
    }

    impl RoomKind {
        pub const ALL: [RoomKind; 4] = [
            RoomKind::Living,
            RoomKind::Bedroom,
            RoomKind::Kitchen,
            RoomKind::Bathroom,
        ];

        pub fn preset(self) -> RoomPreset {
            match self {
                RoomKind::Living => RoomPreset {
                    width_meters: 5.0,
                    height_meters: 6.0,
                    name: "Living Room",
                    color: "#e3f2fd",
                },
                RoomKind::Bedroom => RoomPreset {
                    width_meters: 4.0,
                    height_meters: 4.0,
                    name: "Bedroom",
                    color: "#fff3e0",
                },
                RoomKind::Kitchen => RoomPreset {
                    width_meters: 4.0,
                    height_meters: 3.0,
                    name: "Kitchen",
                    color: "#f3e5f5",
                },
                RoomKind::Bathroom => RoomPreset {
                    width_meters: 2.0,
                    height_meters: 2.5,
                    name: "Bathroom",
                    color: "#e0f2f1",
                },
            }
        }

        pub fn name(self) -> &'static str {
            match self {
                RoomKind::Living => "living",
                RoomKind::Bedroom => "bedroom",
                RoomKind::Kitchen => "kitchen",
                RoomKind::Bathroom => "bathroom",
            }
        }
    }

    impl fmt::Display for RoomKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.name())
        }
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("unknown preset: {0}")]
    pub struct UnknownPreset(pub String);

    impl FromStr for RoomKind {
        type Err = UnknownPreset;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let key = s.trim().to_ascii_lowercase();
            RoomKind::ALL
                .into_iter()
                .find(|kind| kind.name() == key)
                .ok_or(UnknownPreset(key))
        }
    }

    impl FromStr for CabinetKind {
        type Err = UnknownPreset;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let key = s.trim().to_ascii_lowercase();
            CabinetKind::ALL
                .into_iter()
                .find(|kind| kind.name() == key)
                .ok_or(UnknownPreset(key))
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct RoomPreset {
        pub width_meters: f64,
        pub height_meters: f64,
        pub name: &'static str,
        pub color: &'static str,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct CabinetPreset {
        pub width_meters: f64,
        pub depth_meters: f64,
        pub height_meters: f64,
        pub color: &'static str,
    }

    pub fn cabinet_preset(kind: CabinetKind) -> CabinetPreset {
        match kind {
            CabinetKind::Base => CabinetPreset {
                width_meters: 0.6,
                depth_meters: 0.6,
                height_meters: 0.9,
                color: "#8B4513",
            },
            CabinetKind::Wall => CabinetPreset {
                width_meters: 0.6,
                depth_meters: 0.35,
                height_meters: 0.7,
                color: "#A0522D",
            },
            CabinetKind::Tall => CabinetPreset {
                width_meters: 0.6,
                depth_meters: 0.6,
                height_meters: 2.2,
                color: "#654321",
            },
            CabinetKind::Corner => CabinetPreset {
                width_meters: 0.9,
                depth_meters: 0.9,
                height_meters: 0.9,
                color: "#8B4513",
            },
            CabinetKind::Island => CabinetPreset {
                width_meters: 1.2,
                depth_meters: 0.9,
                height_meters: 0.9,
                color: "#A0522D",
            },
        }
    }

    /// 新建空白平面：比例 20 像素/米、公制、显示标注。
    pub fn create_default_floor_plan() -> FloorPlan {
        FloorPlan::new(DEFAULT_PLAN_NAME)
    }

    /// 按基准比例生成房间模板。
    #[inline]
    pub fn generate_room_template(kind: RoomKind, center_x: f64, center_y: f64) -> Room {
        generate_room_template_scaled(kind, center_x, center_y, BASELINE_PIXELS_PER_METER)
    }

    /// 以 `(center_x, center_y)` 为中心的轴对齐矩形，顶点自左上角顺时针排列。
    pub fn generate_room_template_scaled(
        kind: RoomKind,
        center_x: f64,
        center_y: f64,
        scale: f64,
    ) -> Room {
        let preset = kind.preset();
        let half_width = preset.width_meters * scale / 2.0;
        let half_height = preset.height_meters * scale / 2.0;
        Room {
            id: new_entity_id("room"),
            name: preset.name.to_string(),
            points: vec![
                Point2::new(center_x - half_width, center_y - half_height),
                Point2::new(center_x + half_width, center_y - half_height),
                Point2::new(center_x + half_width, center_y + half_height),
                Point2::new(center_x - half_width, center_y + half_height),
            ],
            color: preset.color.to_string(),
            floor_texture: None,
            wall_texture: None,
        }
    }

    /// 宽、深按固定基准比例换算为像素，高度保留米制。
    // NOTE: 与平面当前标定比例无关；标定后橱柜的平面尺寸与实际尺寸会出现偏差。
    pub fn create_cabinet(kind: CabinetKind, position: Point2, angle: f64) -> Cabinet {
        let preset = cabinet_preset(kind);
        Cabinet {
            id: new_entity_id("cabinet"),
            kind,
            position,
            angle,
            width: preset.width_meters * BASELINE_PIXELS_PER_METER,
            depth: preset.depth_meters * BASELINE_PIXELS_PER_METER,
            height: preset.height_meters,
            color: preset.color.to_string(),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::units::Unit;

        #[test]
        fn default_plan_is_empty_and_metric() {
            let plan = create_default_floor_plan();
            assert_eq!(plan.entity_count(), 0);
            assert!((plan.scale() - 20.0).abs() < f64::EPSILON);
            assert_eq!(plan.unit(), Unit::Meters);
            assert!(plan.metadata.show_measurements);
            assert_eq!(plan.metadata.created_at, plan.metadata.updated_at);
            assert!(plan.scale_calibration.is_none());
        }

        #[test]
        fn room_template_is_centered_clockwise_rectangle() {
            let room = generate_room_template(RoomKind::Kitchen, 100.0, 50.0);
            assert_eq!(room.name, "Kitchen");
            assert_eq!(room.color, "#f3e5f5");
            assert_eq!(
                room.points,
                vec![
                    Point2::new(60.0, 20.0),
                    Point2::new(140.0, 20.0),
                    Point2::new(140.0, 80.0),
                    Point2::new(60.0, 80.0),
                ]
            );
        }

        #[test]
        fn room_template_honours_custom_scale() {
            let room = generate_room_template_scaled(RoomKind::Bathroom, 0.0, 0.0, 40.0);
            assert_eq!(room.points[0], Point2::new(-40.0, -50.0));
            assert_eq!(room.points[2], Point2::new(40.0, 50.0));
        }

        #[test]
        fn island_cabinet_matches_preset_table() {
            let cabinet = create_cabinet(CabinetKind::Island, Point2::new(0.0, 0.0), 0.0);
            assert!((cabinet.width - 24.0).abs() < 1e-12);
            assert!((cabinet.depth - 18.0).abs() < 1e-12);
            assert!((cabinet.height - 0.9).abs() < 1e-12);
            assert_eq!(cabinet.color, "#A0522D");
        }

        #[test]
        fn wall_cabinet_keeps_meter_height() {
            let cabinet = create_cabinet(CabinetKind::Wall, Point2::new(10.0, 10.0), 1.0);
            assert!((cabinet.width - 12.0).abs() < 1e-12);
            assert!((cabinet.depth - 7.0).abs() < 1e-12);
            assert!((cabinet.height - 0.7).abs() < 1e-12);
            assert!((cabinet.angle - 1.0).abs() < f64::EPSILON);
        }

        #[test]
        fn presets_parse_from_names() {
            assert_eq!("Living".parse::<RoomKind>().unwrap(), RoomKind::Living);
            assert_eq!("tall".parse::<CabinetKind>().unwrap(), CabinetKind::Tall);
            assert!("garage".parse::<RoomKind>().is_err());
        }
    }
}

pub mod calibration;
pub mod command;
pub mod measure;
pub mod projection;

pub mod errors {
    use floorplan_core::geometry::GeometryError;
    use floorplan_core::plan::EntityRef;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum EngineError {
        #[error("invalid argument: {0}")]
        InvalidArgument(String),
        #[error("invalid input: {0}")]
        InvalidInput(String),
        #[error("entity {0} not found")]
        EntityNotFound(EntityRef),
        #[error(transparent)]
        Geometry(#[from] GeometryError),
    }
}

pub mod scene {
    use std::collections::HashSet;

    use floorplan_core::geometry::{self, Bounds2D, Point2, Vector2};
    use floorplan_core::plan::{
        Cabinet, CabinetKind, Door, EntityRef, FloorPlan, Measurement, Model3D, PlanEntity, Wall,
        Window,
    };
    use floorplan_core::presets::{
        RoomKind, create_cabinet, create_default_floor_plan, generate_room_template_scaled,
    };
    use floorplan_core::units::{BASELINE_PIXELS_PER_METER, Unit};
    use tracing::debug;

    use crate::calibration;
    use crate::errors::EngineError;
    use crate::hit_test;
    use crate::measure;
    use crate::projection::{self, SceneDescription};

    const DEFAULT_ZOOM: f64 = 1.0;
    const MIN_ZOOM: f64 = 0.01;
    const MAX_ZOOM: f64 = 1_000.0;
    pub const DEFAULT_GRID_SIZE: f64 = BASELINE_PIXELS_PER_METER;

    /// 记录视口状态（中心点与缩放）。
    #[derive(Debug, Clone, Copy)]
    pub struct ViewportState {
        pub center: Point2,
        pub zoom: f64,
    }

    impl ViewportState {
        #[inline]
        fn clamp_zoom(value: f64) -> f64 {
            value.clamp(MIN_ZOOM, MAX_ZOOM)
        }
    }

    impl Default for ViewportState {
        fn default() -> Self {
            Self {
                center: Point2::ORIGIN,
                zoom: DEFAULT_ZOOM,
            }
        }
    }

    /// 网格吸附设置，网格间距单位为像素。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct GridSettings {
        pub size: f64,
        pub snap_enabled: bool,
    }

    impl Default for GridSettings {
        fn default() -> Self {
            Self {
                size: DEFAULT_GRID_SIZE,
                snap_enabled: true,
            }
        }
    }

    /// 编辑会话：持有当前平面快照及运行时状态（选中集、视口、网格）。
    /// 每次编辑都以新平面替换旧快照，旧快照仍可被外部持有。
    #[derive(Debug)]
    pub struct Scene {
        plan: FloorPlan,
        selected: HashSet<EntityRef>,
        viewport: ViewportState,
        grid: GridSettings,
    }

    #[derive(Debug, Clone)]
    pub struct DemoEntities {
        pub living_room: EntityRef,
        pub kitchen: EntityRef,
        pub exterior_wall: EntityRef,
        pub door: EntityRef,
        pub window: EntityRef,
        pub cabinet: EntityRef,
        pub island: EntityRef,
        pub model: EntityRef,
    }

    impl Scene {
        pub fn new() -> Self {
            Self {
                plan: create_default_floor_plan(),
                selected: HashSet::new(),
                viewport: ViewportState::default(),
                grid: GridSettings::default(),
            }
        }

        /// 使用现有平面初始化场景。
        pub fn with_plan(plan: FloorPlan) -> Self {
            let mut scene = Self::new();
            scene.load_plan(plan);
            scene
        }

        /// 重置为空白平面，清空选中集与视口，保留网格设置。
        pub fn reset(&mut self) {
            self.plan = create_default_floor_plan();
            self.selected.clear();
            self.viewport = ViewportState::default();
        }

        /// 载入新平面（如导入文件），重置运行时状态并把视口对准平面范围中心。
        pub fn load_plan(&mut self, plan: FloorPlan) {
            self.plan = plan;
            self.selected.clear();
            self.viewport = ViewportState::default();

            if let Some(bounds) = self.plan.bounds() {
                self.viewport.center = bounds.center();
            }
        }

        /// 以编辑产生的新平面替换当前快照，选中集中已不存在的实体被剔除。
        pub fn replace_plan(&mut self, plan: FloorPlan) {
            self.plan = plan;
            let plan = &self.plan;
            self.selected.retain(|target| plan.entity(target).is_some());
        }

        #[inline]
        pub fn plan(&self) -> &FloorPlan {
            &self.plan
        }

        /// 返回当前快照的廉价拷贝（集合共享）。
        #[inline]
        pub fn snapshot(&self) -> FloorPlan {
            self.plan.clone()
        }

        #[inline]
        pub fn entity(&self, target: &EntityRef) -> Option<PlanEntity> {
            self.plan.entity(target)
        }

        #[inline]
        pub fn selection_len(&self) -> usize {
            self.selected.len()
        }

        #[inline]
        pub fn is_selected(&self, target: &EntityRef) -> bool {
            self.selected.contains(target)
        }

        /// 选中指定实体。若实体不存在则返回错误。
        pub fn select(&mut self, target: EntityRef) -> Result<(), EngineError> {
            if self.plan.entity(&target).is_none() {
                return Err(EngineError::EntityNotFound(target));
            }
            self.selected.insert(target);
            Ok(())
        }

        pub fn deselect(&mut self, target: &EntityRef) -> bool {
            self.selected.remove(target)
        }

        /// 切换实体选中状态，返回切换后的状态。
        pub fn toggle_selection(&mut self, target: EntityRef) -> Result<bool, EngineError> {
            if self.plan.entity(&target).is_none() {
                return Err(EngineError::EntityNotFound(target));
            }
            if self.selected.remove(&target) {
                Ok(false)
            } else {
                self.selected.insert(target);
                Ok(true)
            }
        }

        #[inline]
        pub fn clear_selection(&mut self) {
            self.selected.clear();
        }

        #[inline]
        pub fn selection(&self) -> impl Iterator<Item = &EntityRef> + '_ {
            self.selected.iter()
        }

        pub fn selection_bounds(&self) -> Option<Bounds2D> {
            let mut bounds = Bounds2D::empty();
            for target in &self.selected {
                if let Some(entity_bounds) = self.plan.entity_bounds(target) {
                    bounds.include_bounds(&entity_bounds);
                }
            }
            if bounds.is_empty() { None } else { Some(bounds) }
        }

        /// 点选：替换选中集为最高优先级的命中实体；无命中时清空选中集。
        pub fn select_at(&mut self, point: Point2) -> Option<EntityRef> {
            self.selected.clear();
            let hit = hit_test::hit_test(&self.plan, point)?;
            debug!(entity = %hit, x = point.x(), y = point.y(), "点选命中实体");
            self.selected.insert(hit.clone());
            Some(hit)
        }

        /// 删除该点处所有命中实体，返回被删除的实体。
        pub fn delete_at(&mut self, point: Point2) -> Vec<EntityRef> {
            let outcome = hit_test::delete_at(&self.plan, point);
            if outcome.removed.is_empty() {
                return outcome.removed;
            }
            debug!(removed = outcome.removed.len(), "已按点删除实体");
            self.replace_plan(outcome.plan);
            outcome.removed
        }

        /// 删除选中集中的全部实体，返回删除数量。
        pub fn delete_selection(&mut self) -> usize {
            if self.selected.is_empty() {
                return 0;
            }
            let targets: Vec<EntityRef> = self.selected.drain().collect();
            let next = self.plan.without_entities(&targets);
            debug!(removed = targets.len(), "已删除选中实体");
            self.replace_plan(next);
            targets.len()
        }

        #[inline]
        pub fn grid(&self) -> GridSettings {
            self.grid
        }

        pub fn set_grid_size(&mut self, size: f64) -> Result<(), EngineError> {
            if !size.is_finite() || size <= 0.0 {
                return Err(EngineError::InvalidArgument(format!(
                    "grid size must be positive, got {size}"
                )));
            }
            self.grid.size = size;
            Ok(())
        }

        #[inline]
        pub fn set_snap_enabled(&mut self, enabled: bool) {
            self.grid.snap_enabled = enabled;
        }

        /// 吸附开启时对齐到网格，否则原样返回。
        pub fn snap(&self, point: Point2) -> Result<Point2, EngineError> {
            if !self.grid.snap_enabled {
                return Ok(point);
            }
            Ok(geometry::snap_to_grid(point, self.grid.size)?)
        }

        /// 重新标定比例，返回新的像素/米值。失败时平面保持不变。
        pub fn calibrate(
            &mut self,
            point1: Point2,
            point2: Point2,
            declared: &str,
            unit: Unit,
        ) -> Result<f64, EngineError> {
            let next = calibration::calibrate(&self.plan, point1, point2, declared, unit)?;
            let scale = next.scale();
            self.replace_plan(next);
            Ok(scale)
        }

        pub fn set_unit(&mut self, unit: Unit) {
            let next = self.plan.with_unit(unit);
            self.replace_plan(next);
        }

        pub fn set_show_measurements(&mut self, show: bool) {
            let next = self.plan.with_show_measurements(show);
            self.replace_plan(next);
        }

        pub fn add_entity(&mut self, entity: PlanEntity) -> EntityRef {
            let target = entity.entity_ref();
            let next = self.plan.with_entity(entity);
            debug!(entity = %target, "已添加实体");
            self.replace_plan(next);
            target
        }

        /// 以当前比例在（吸附后的）中心点放置房间模板。
        pub fn add_room_template(
            &mut self,
            kind: RoomKind,
            center: Point2,
        ) -> Result<EntityRef, EngineError> {
            let center = self.snap(center)?;
            let room =
                generate_room_template_scaled(kind, center.x(), center.y(), self.plan.scale());
            Ok(self.add_entity(PlanEntity::Room(room)))
        }

        pub fn add_cabinet(
            &mut self,
            kind: CabinetKind,
            position: Point2,
            angle: f64,
        ) -> Result<EntityRef, EngineError> {
            let position = self.snap(position)?;
            Ok(self.add_entity(PlanEntity::Cabinet(create_cabinet(kind, position, angle))))
        }

        /// 当前需要绘制的标注。
        #[inline]
        pub fn measurements(&self) -> Vec<Measurement> {
            measure::visible_measurements(&self.plan)
        }

        #[inline]
        pub fn project(&self) -> SceneDescription {
            projection::project_floor_plan(&self.plan)
        }

        #[inline]
        pub fn viewport(&self) -> ViewportState {
            self.viewport
        }

        #[inline]
        pub fn reset_viewport(&mut self) {
            self.viewport = ViewportState::default();
        }

        #[inline]
        pub fn set_viewport_center(&mut self, center: Point2) {
            self.viewport.center = center;
        }

        pub fn pan_viewport(&mut self, delta: Vector2) {
            self.viewport.center = self.viewport.center.translate(delta);
        }

        /// 设置缩放倍数（自动限制在合法范围内）。
        pub fn set_viewport_zoom(&mut self, zoom: f64) {
            self.viewport.zoom = ViewportState::clamp_zoom(zoom);
        }

        pub fn scale_viewport_zoom(&mut self, factor: f64) {
            let current = self.viewport.zoom;
            let target = if factor.is_finite() {
                current * factor
            } else {
                current
            };
            self.set_viewport_zoom(target);
        }

        /// 聚焦当前选中实体，若为空则退化到整个平面范围。
        pub fn focus_on_selection(&mut self) {
            let target = self.selection_bounds().or_else(|| self.plan.bounds());
            if let Some(bounds) = target {
                self.viewport.center = bounds.center();
            }
        }

        /// 为 CLI / 快速验证构建一套带厨房的示例户型，返回关键实体。
        pub fn populate_demo(&mut self) -> DemoEntities {
            use std::f64::consts::FRAC_PI_2;

            self.load_plan(create_default_floor_plan().renamed("Demo Apartment"));
            let scale = self.plan.scale();

            let living =
                generate_room_template_scaled(RoomKind::Living, 150.0, 160.0, scale);
            let kitchen =
                generate_room_template_scaled(RoomKind::Kitchen, 290.0, 130.0, scale);
            let living_room = self.add_entity(PlanEntity::Room(living));
            let kitchen = self.add_entity(PlanEntity::Room(kitchen));

            let corners = [
                Point2::new(100.0, 100.0),
                Point2::new(370.0, 100.0),
                Point2::new(370.0, 220.0),
                Point2::new(100.0, 220.0),
            ];
            let mut walls = Vec::with_capacity(corners.len());
            for (index, start) in corners.iter().enumerate() {
                let end = corners[(index + 1) % corners.len()];
                walls.push(self.add_entity(PlanEntity::Wall(Wall::new(*start, end))));
            }
            let exterior_wall = walls.swap_remove(0);

            let door = self.add_entity(PlanEntity::Door(Door {
                wall_id: Some(exterior_wall.id.clone()),
                ..Door::new(Point2::new(150.0, 100.0), 0.0)
            }));
            let window = self.add_entity(PlanEntity::Window(Window::new(
                Point2::new(100.0, 160.0),
                FRAC_PI_2,
            )));

            let cabinet: Cabinet = create_cabinet(CabinetKind::Base, Point2::new(300.0, 110.0), 0.0);
            let cabinet = self.add_entity(PlanEntity::Cabinet(cabinet));
            let island = self.add_entity(PlanEntity::Cabinet(create_cabinet(
                CabinetKind::Island,
                Point2::new(290.0, 140.0),
                0.0,
            )));
            let model = self.add_entity(PlanEntity::Model(Model3D::new(
                "Sofa",
                "models/sofa.glb",
                Point2::new(150.0, 190.0),
            )));

            let ids = DemoEntities {
                living_room,
                kitchen,
                exterior_wall,
                door,
                window,
                cabinet,
                island,
                model,
            };

            if let Some(bounds) = self.plan.bounds() {
                self.viewport.center = bounds.center();
            }

            debug!(
                entities = self.plan.entity_count(),
                living_room = %ids.living_room,
                kitchen = %ids.kitchen,
                "已创建演示户型"
            );

            ids
        }
    }

    impl Default for Scene {
        fn default() -> Self {
            Self::new()
        }
    }

    #[cfg(test)]
    mod tests {
        use floorplan_core::plan::EntityKind;

        use super::*;

        #[test]
        fn demo_population_creates_entities() {
            let mut scene = Scene::new();
            let ids = scene.populate_demo();
            assert_eq!(scene.plan().name, "Demo Apartment");
            assert_eq!(scene.plan().walls.len(), 4);
            assert_eq!(scene.plan().rooms.len(), 2);
            assert_eq!(scene.plan().cabinets.len(), 2);
            assert!(scene.entity(&ids.kitchen).is_some());
            assert!(scene.entity(&ids.model).is_some());
            match scene.entity(&ids.door) {
                Some(PlanEntity::Door(door)) => {
                    assert_eq!(door.wall_id.as_deref(), Some(ids.exterior_wall.id.as_str()))
                }
                other => panic!("unexpected entity: {other:?}"),
            }
        }

        #[test]
        fn selection_operations_work() {
            let mut scene = Scene::new();
            let ids = scene.populate_demo();

            assert_eq!(scene.selection_len(), 0);
            assert!(!scene.is_selected(&ids.kitchen));

            scene.select(ids.kitchen.clone()).expect("select kitchen");
            assert!(scene.is_selected(&ids.kitchen));
            assert_eq!(scene.selection_len(), 1);

            let now_selected = scene
                .toggle_selection(ids.kitchen.clone())
                .expect("toggle existing selection");
            assert!(!now_selected);
            assert!(!scene.is_selected(&ids.kitchen));

            let now_selected = scene
                .toggle_selection(ids.kitchen.clone())
                .expect("toggle again");
            assert!(now_selected);

            assert!(scene.deselect(&ids.kitchen));
            assert!(!scene.deselect(&ids.kitchen));
            assert_eq!(scene.selection_len(), 0);

            let missing = EntityRef::new(EntityKind::Wall, "wall-missing");
            let err = scene.select(missing).unwrap_err();
            assert!(matches!(err, EngineError::EntityNotFound(_)));
        }

        #[test]
        fn select_at_prefers_wall_and_replaces_selection() {
            let mut scene = Scene::new();
            let ids = scene.populate_demo();
            scene.select(ids.kitchen.clone()).unwrap();

            let hit = scene.select_at(Point2::new(200.0, 104.0)).expect("wall hit");
            assert_eq!(hit, ids.exterior_wall);
            assert_eq!(scene.selection_len(), 1);
            assert!(scene.is_selected(&ids.exterior_wall));

            assert!(scene.select_at(Point2::new(-500.0, -500.0)).is_none());
            assert_eq!(scene.selection_len(), 0);
        }

        #[test]
        fn delete_at_prunes_selection() {
            let mut scene = Scene::new();
            let ids = scene.populate_demo();
            scene.select(ids.window.clone()).unwrap();
            let before = scene.snapshot();

            let removed = scene.delete_at(Point2::new(100.0, 160.0));
            assert!(removed.contains(&ids.window));
            assert!(scene.entity(&ids.window).is_none());
            assert_eq!(scene.selection_len(), 0);
            assert!(before.entity(&ids.window).is_some());
        }

        #[test]
        fn delete_selection_removes_selected_entities() {
            let mut scene = Scene::new();
            let ids = scene.populate_demo();
            scene.select(ids.cabinet.clone()).unwrap();
            scene.select(ids.model.clone()).unwrap();
            assert_eq!(scene.delete_selection(), 2);
            assert!(scene.plan().models.is_empty());
            assert_eq!(scene.plan().cabinets.len(), 1);
            assert_eq!(scene.delete_selection(), 0);
        }

        #[test]
        fn snapping_follows_grid_settings() {
            let mut scene = Scene::new();
            assert_eq!(
                scene.snap(Point2::new(29.0, 31.0)).unwrap(),
                Point2::new(20.0, 40.0)
            );
            scene.set_grid_size(5.0).unwrap();
            assert_eq!(
                scene.snap(Point2::new(29.0, 31.0)).unwrap(),
                Point2::new(30.0, 30.0)
            );
            scene.set_snap_enabled(false);
            assert_eq!(
                scene.snap(Point2::new(29.0, 31.0)).unwrap(),
                Point2::new(29.0, 31.0)
            );
            assert!(matches!(
                scene.set_grid_size(0.0),
                Err(EngineError::InvalidArgument(_))
            ));
            assert!((scene.grid().size - 5.0).abs() < f64::EPSILON);
        }

        #[test]
        fn failed_calibration_keeps_scale() {
            let mut scene = Scene::new();
            let err = scene
                .calibrate(Point2::ORIGIN, Point2::new(100.0, 0.0), "-1", Unit::Meters)
                .unwrap_err();
            assert!(matches!(err, EngineError::InvalidInput(_)));
            assert!((scene.plan().scale() - 20.0).abs() < f64::EPSILON);

            let scale = scene
                .calibrate(Point2::ORIGIN, Point2::new(100.0, 0.0), "2", Unit::Meters)
                .unwrap();
            assert!((scale - 50.0).abs() < 1e-12);
            assert!((scene.plan().scale() - 50.0).abs() < 1e-12);
        }

        #[test]
        fn room_template_uses_calibrated_scale() {
            let mut scene = Scene::new();
            scene
                .calibrate(Point2::ORIGIN, Point2::new(40.0, 0.0), "1", Unit::Meters)
                .unwrap();
            let target = scene
                .add_room_template(RoomKind::Bathroom, Point2::new(3.0, -2.0))
                .unwrap();
            match scene.entity(&target) {
                Some(PlanEntity::Room(room)) => {
                    assert_eq!(room.points[0], Point2::new(-40.0, -50.0));
                    assert_eq!(room.points[2], Point2::new(40.0, 50.0));
                }
                other => panic!("unexpected entity: {other:?}"),
            }
        }

        #[test]
        fn viewport_state_clamps_zoom() {
            let mut scene = Scene::new();
            let default = scene.viewport();
            assert!((default.zoom - 1.0).abs() < f64::EPSILON);

            scene.set_viewport_center(Point2::new(10.0, -5.0));
            scene.pan_viewport(Vector2::new(5.0, 5.0));
            assert_eq!(scene.viewport().center, Point2::new(15.0, 0.0));

            scene.set_viewport_zoom(0.0001);
            assert!((scene.viewport().zoom - MIN_ZOOM).abs() < f64::EPSILON);

            scene.set_viewport_zoom(10_000.0);
            assert!((scene.viewport().zoom - MAX_ZOOM).abs() < f64::EPSILON);

            scene.set_viewport_zoom(2.0);
            scene.scale_viewport_zoom(0.5);
            assert!((scene.viewport().zoom - 1.0).abs() < f64::EPSILON);

            scene.scale_viewport_zoom(f64::NAN);
            assert!((scene.viewport().zoom - 1.0).abs() < f64::EPSILON);

            scene.reset_viewport();
            assert_eq!(scene.viewport().center, Point2::ORIGIN);
        }

        #[test]
        fn focus_on_selection_recenters_viewport() {
            let mut scene = Scene::new();
            let ids = scene.populate_demo();
            scene.select(ids.kitchen.clone()).unwrap();

            scene.focus_on_selection();
            assert_eq!(scene.viewport().center, Point2::new(290.0, 130.0));

            scene.clear_selection();
            scene.set_viewport_center(Point2::ORIGIN);
            scene.focus_on_selection();
            let expected = scene.plan().bounds().unwrap().center();
            assert_eq!(scene.viewport().center, expected);
        }

        #[test]
        fn load_plan_resets_state() {
            let mut scene = Scene::new();
            let ids = scene.populate_demo();
            scene.select(ids.kitchen.clone()).unwrap();
            scene.set_viewport_zoom(42.0);

            let plan = FloorPlan::new("Other").with_entity(PlanEntity::Wall(Wall::new(
                Point2::new(-10.0, -10.0),
                Point2::new(10.0, 30.0),
            )));
            scene.load_plan(plan);

            assert_eq!(scene.selection_len(), 0);
            assert_eq!(scene.plan().name, "Other");
            assert!((scene.viewport().zoom - 1.0).abs() < f64::EPSILON);
            assert_eq!(scene.viewport().center, Point2::new(0.0, 10.0));
        }
    }
}

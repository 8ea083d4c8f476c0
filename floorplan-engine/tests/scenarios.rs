use floorplan_core::geometry::Point2;
use floorplan_core::plan::{CabinetKind, EntityKind, FloorPlan, PlanEntity, Wall};
use floorplan_core::presets::{RoomKind, create_cabinet, generate_room_template};
use floorplan_core::units::Unit;
use floorplan_engine::command::{CommandBus, CommandContext, CommandRequest};
use floorplan_engine::measure::generate_measurements;
use floorplan_engine::projection::{DescriptorKind, project_floor_plan};
use floorplan_engine::scene::Scene;
use std::sync::Arc;

#[test]
fn wall_label_at_baseline_scale() {
    let plan = FloorPlan::new("Scenario").with_entity(PlanEntity::Wall(Wall::new(
        Point2::new(0.0, 0.0),
        Point2::new(100.0, 0.0),
    )));
    let measurements = generate_measurements(&plan);
    assert_eq!(measurements.len(), 1);
    assert_eq!(measurements[0].label.as_deref(), Some("5.00 m"));
}

#[test]
fn island_cabinet_has_no_handle() {
    let cabinet = create_cabinet(CabinetKind::Island, Point2::new(0.0, 0.0), 0.0);
    assert!((cabinet.width - 24.0).abs() < 1e-12);
    assert!((cabinet.depth - 18.0).abs() < 1e-12);
    assert!((cabinet.height - 0.9).abs() < 1e-12);
    assert_eq!(cabinet.color, "#A0522D");

    let plan = FloorPlan::new("Scenario").with_entity(PlanEntity::Cabinet(cabinet));
    let scene = project_floor_plan(&plan);
    assert_eq!(scene.by_kind(DescriptorKind::Cabinet).count(), 1);
    assert_eq!(scene.by_kind(DescriptorKind::CabinetHandle).count(), 0);
}

#[test]
fn wall_wins_near_room_boundary() {
    let mut scene = Scene::new();
    let room = generate_room_template(RoomKind::Living, 100.0, 100.0);
    let top_left = room.points[0];
    let top_right = room.points[1];
    scene.add_entity(PlanEntity::Room(room));
    let wall = scene.add_entity(PlanEntity::Wall(Wall::new(top_left, top_right)));

    let hit = scene
        .select_at(Point2::new(100.0, top_left.y() + 6.0))
        .expect("should hit");
    assert_eq!(hit, wall);

    let deeper = scene.select_at(Point2::new(100.0, 100.0)).expect("room hit");
    assert_eq!(deeper.kind, EntityKind::Room);
}

#[test]
fn calibration_through_command_bus() {
    let mut scene = Scene::new();
    let bus = CommandBus::new();
    let mut context = CommandContext { scene: &mut scene };
    let response = bus.dispatch(
        &CommandRequest::new("calibrate", ["0", "0", "200", "0", "10", "feet"]),
        &mut context,
    );
    assert!(response.success);
    assert!((scene.plan().scale() - 65.6168).abs() < 1e-3);
    assert_eq!(scene.plan().unit(), Unit::Feet);
}

#[test]
fn edits_never_mutate_earlier_snapshots() {
    let mut scene = Scene::new();
    let ids = scene.populate_demo();
    let before = scene.snapshot();
    let before_updated = before.metadata.updated_at;

    scene.delete_at(Point2::new(150.0, 190.0));

    assert!(before.entity(&ids.model).is_some());
    assert!(scene.entity(&ids.model).is_none());
    assert_eq!(before.metadata.updated_at, before_updated);
    assert!(scene.plan().metadata.updated_at >= before_updated);
    // 未受影响的集合继续共享
    assert!(Arc::ptr_eq(&before.doors, &scene.plan().doors));
}

#[test]
fn demo_projects_every_category() {
    let mut scene = Scene::new();
    scene.populate_demo();
    let description = scene.project();
    for kind in [
        DescriptorKind::Wall,
        DescriptorKind::Floor,
        DescriptorKind::Ceiling,
        DescriptorKind::Door,
        DescriptorKind::Window,
        DescriptorKind::Cabinet,
        DescriptorKind::CabinetHandle,
        DescriptorKind::ModelPlaceholder,
    ] {
        assert!(
            description.by_kind(kind).next().is_some(),
            "missing {kind:?}"
        );
    }
    assert!(!scene.measurements().is_empty());
    let json = serde_json::to_value(&description).expect("serializable description");
    assert_eq!(json["descriptors"][0]["kind"], "wall");
    assert_eq!(json["descriptors"][0]["shape"]["type"], "box");
    assert!(json["descriptors"][0]["entityId"].is_string());
    assert!(json["descriptors"][0]["material"]["doubleSided"].is_boolean());
    assert!(json["unitsPerPixel"].is_number());

    let placeholder = json["descriptors"]
        .as_array()
        .expect("descriptor array")
        .iter()
        .find(|descriptor| descriptor["kind"] == "model_placeholder")
        .expect("placeholder descriptor");
    assert_eq!(placeholder["modelUrl"], "models/sofa.glb");
    assert!(placeholder.get("model_url").is_none());
}

use std::fs;
use std::path::PathBuf;

use floorplan_core::geometry::Point2;
use floorplan_core::plan::{CabinetKind, EntityKind, EntityRef, FloorPlan, PlanEntity, Wall};
use floorplan_core::presets::{RoomKind, create_cabinet, generate_room_template};
use floorplan_core::units::Unit;
use floorplan_io::{
    IoError, JsonFacade, PlanLoader, PlanSaver, export_floor_plan, import_floor_plan,
};
use tempfile::tempdir;

fn fixture() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/data/sample_plan.json");
    path
}

#[test]
fn load_sample_fixture() {
    let plan = JsonFacade::new().load(&fixture()).expect("读取示例平面失败");
    assert_eq!(plan.name, "Sample Flat");
    assert_eq!(plan.walls.len(), 2);
    assert_eq!(plan.unit(), Unit::Feet);
    assert!((plan.scale() - 65.61679790026247).abs() < f64::EPSILON);

    let east = plan
        .entity(&EntityRef::new(EntityKind::Wall, "wall-east"))
        .expect("east wall");
    match east {
        PlanEntity::Wall(wall) => {
            assert!((wall.height - 2.7).abs() < f64::EPSILON);
            assert!(wall.texture.is_none());
        }
        other => panic!("unexpected entity: {other:?}"),
    }
    assert_eq!(plan.cabinets[0].kind, CabinetKind::Base);
    assert_eq!(plan.windows[0].height, None);
    assert!(plan.photos[0].locked);
    assert_eq!(plan.doors[0].wall_id.as_deref(), Some("wall-north"));
}

#[test]
fn fixture_survives_export_and_import() {
    let plan = JsonFacade::new().load(&fixture()).unwrap();
    let document = export_floor_plan(&plan).unwrap();
    let restored = import_floor_plan(&document).unwrap();
    assert_eq!(restored, plan);
}

#[test]
fn edited_plan_round_trips_exactly() {
    let plan = FloorPlan::new("Round Trip")
        .with_entity(PlanEntity::Wall(Wall::new(
            Point2::new(0.1, 0.2),
            Point2::new(100.0 / 3.0, 1e-7),
        )))
        .with_entity(PlanEntity::Room(generate_room_template(
            RoomKind::Bathroom,
            17.3,
            -4.25,
        )))
        .with_entity(PlanEntity::Cabinet(create_cabinet(
            CabinetKind::Corner,
            Point2::new(1.0, 2.0),
            std::f64::consts::PI / 7.0,
        )))
        .with_unit(Unit::Inches);

    let restored = import_floor_plan(&export_floor_plan(&plan).unwrap()).unwrap();
    assert_eq!(restored, plan);
    assert_eq!(restored.metadata.updated_at, plan.metadata.updated_at);
}

#[test]
fn save_then_load_through_facade() {
    let dir = tempdir().expect("临时目录");
    let path = dir.path().join("plan.json");
    let plan = FloorPlan::new("Saved").with_entity(PlanEntity::Wall(Wall::new(
        Point2::new(0.0, 0.0),
        Point2::new(10.0, 0.0),
    )));

    let facade = JsonFacade::new();
    facade.save(&plan, &path).unwrap();
    let restored = facade.load(&path).unwrap();
    assert_eq!(restored, plan);
}

#[test]
fn failed_import_reports_parse_failure() {
    let dir = tempdir().expect("临时目录");
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"id\": \"plan\", \"walls\": [1, 2]}").unwrap();

    let err = JsonFacade::new().load(&path).unwrap_err();
    assert!(matches!(err, IoError::ParseFailure(_)));
}

#[test]
fn duplicate_ids_within_a_collection_are_rejected() {
    let mut first = Wall::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
    first.id = "wall-x".to_string();
    let mut second = Wall::new(Point2::new(10.0, 0.0), Point2::new(10.0, 10.0));
    second.id = "wall-x".to_string();
    let plan = FloorPlan::new("Duplicates")
        .with_entity(PlanEntity::Wall(first))
        .with_entity(PlanEntity::Wall(second));

    let document = export_floor_plan(&plan).unwrap();
    let err = import_floor_plan(&document).unwrap_err();
    assert!(matches!(err, IoError::InvalidDocument(message) if message.contains("wall-x")));
}

#[test]
fn shared_id_across_collections_is_accepted() {
    let mut wall = Wall::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
    wall.id = "shared".to_string();
    let mut cabinet = create_cabinet(CabinetKind::Base, Point2::new(5.0, 5.0), 0.0);
    cabinet.id = "shared".to_string();
    let plan = FloorPlan::new("Shared")
        .with_entity(PlanEntity::Wall(wall))
        .with_entity(PlanEntity::Cabinet(cabinet));

    let restored = import_floor_plan(&export_floor_plan(&plan).unwrap()).unwrap();
    assert_eq!(restored, plan);
}

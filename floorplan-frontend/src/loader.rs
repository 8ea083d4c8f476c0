use std::env;
use std::path::{Path, PathBuf};

use floorplan_config::AppConfig;
use floorplan_engine::scene::{DemoEntities, Scene};
use floorplan_io::{JsonFacade, PlanLoader};
use tracing::{info, warn};

use crate::resource_locator::{AssetLocator, resolve_plan_assets};

const PLAN_ENV: &str = "FLOORPLAN_CLI_PLAN";

/// 平面来源，便于前端呈现加载信息。
#[derive(Debug, Clone)]
pub enum PlanSource {
    File(PathBuf),
    Demo,
}

/// 统一封装加载后的场景与元信息。
#[derive(Debug)]
pub struct LoadedScene {
    pub scene: Scene,
    pub source: PlanSource,
    pub demo_entities: Option<DemoEntities>,
    pub missing_assets: Vec<String>,
}

/// 加载显式指定（或环境变量 `FLOORPLAN_CLI_PLAN` 指定）的平面文件，失败时回退到内置示例。
pub fn load_scene(plan_path: Option<&Path>, config: &AppConfig) -> LoadedScene {
    let mut scene = configured_scene(config);

    let requested = plan_path
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(PLAN_ENV).map(PathBuf::from));

    if let Some(path) = requested {
        match JsonFacade::new().load(&path) {
            Ok(plan) => {
                info!(path = %path.display(), "从 JSON 加载平面成功");
                let locator = AssetLocator::from_config(path.parent(), config);
                let resolution = resolve_plan_assets(&plan, &locator);
                if !resolution.missing.is_empty() {
                    warn!(missing = resolution.missing.len(), "部分资源引用未能解析");
                }
                scene.load_plan(resolution.plan);
                return LoadedScene {
                    scene,
                    source: PlanSource::File(path),
                    demo_entities: None,
                    missing_assets: resolution.missing,
                };
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "加载平面失败，回退到内置示例");
            }
        }
    }

    let demo_entities = scene.populate_demo();
    scene.set_unit(config.editor.default_unit);
    if let Err(err) = scene.select(demo_entities.kitchen.clone()) {
        warn!(error = %err, "示例厨房选中失败");
    }
    scene.focus_on_selection();

    LoadedScene {
        scene,
        source: PlanSource::Demo,
        demo_entities: Some(demo_entities),
        missing_assets: Vec::new(),
    }
}

fn configured_scene(config: &AppConfig) -> Scene {
    let mut scene = Scene::new();
    if let Err(err) = scene.set_grid_size(config.editor.grid_size) {
        warn!(error = %err, "网格配置无效，使用默认网格");
    }
    scene.set_snap_enabled(config.editor.snap_enabled);
    scene
}

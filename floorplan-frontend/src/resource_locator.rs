use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use floorplan_config::AppConfig;
use floorplan_core::plan::FloorPlan;
use floorplan_io::resource::is_uri;
use floorplan_io::{IoError, ResourceLoader, ResourceRef};
use futures::executor::block_on;
use futures::future::{self, BoxFuture, FutureExt};
use tracing::{debug, trace};

const ASSET_ROOTS_ENV: &str = "FLOORPLAN_ASSET_ROOTS";

/// 在若干根目录中查找照片、模型和贴图的相对路径。
#[derive(Debug, Clone, Default)]
pub struct AssetLocator {
    search_roots: Vec<PathBuf>,
}

impl AssetLocator {
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        // 去重，保持靠前优先级。
        let mut deduped: Vec<PathBuf> = Vec::new();
        for root in roots.into_iter().filter(|path| path.is_dir()) {
            if !deduped.iter().any(|existing| existing == &root) {
                deduped.push(root);
            }
        }
        Self {
            search_roots: deduped,
        }
    }

    /// 依次使用平面文件所在目录、配置中的 `asset_roots` 与环境变量 `FLOORPLAN_ASSET_ROOTS`。
    pub fn from_config(base_dir: Option<&Path>, config: &AppConfig) -> Self {
        let mut roots: Vec<PathBuf> = Vec::new();

        if let Some(dir) = base_dir {
            roots.push(dir.to_path_buf());
        }

        roots.extend(config.resources.asset_roots.iter().cloned());

        if let Some(env_paths) = env::var_os(ASSET_ROOTS_ENV) {
            roots.extend(env::split_paths(&env_paths));
        }

        Self::new(roots)
    }

    #[inline]
    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    /// 带协议的引用不做解析。
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        if is_uri(reference) {
            return None;
        }
        let raw_path = Path::new(reference);
        if raw_path.is_absolute() {
            if raw_path.is_file() {
                return Some(Self::canonicalize_or_clone(raw_path));
            }
            debug!(path = %raw_path.display(), "资源路径为绝对路径但未找到对应文件");
            return None;
        }

        for root in &self.search_roots {
            let candidate = root.join(raw_path);
            trace!(candidate = %candidate.display(), "asset locator candidate");
            if candidate.is_file() {
                return Some(Self::canonicalize_or_clone(&candidate));
            }
        }
        None
    }

    fn canonicalize_or_clone(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
    }
}

impl ResourceLoader for AssetLocator {
    fn load(&self, reference: &str) -> BoxFuture<'static, Result<ResourceRef, IoError>> {
        let result = if is_uri(reference) {
            Ok(ResourceRef::new(reference))
        } else {
            self.resolve(reference)
                .map(|path| ResourceRef::from_path(&path))
                .ok_or_else(|| IoError::ResourceUnavailable(reference.to_string()))
        };
        future::ready(result).boxed()
    }
}

#[derive(Debug, Clone)]
pub struct AssetResolution {
    pub plan: FloorPlan,
    pub resolved: usize,
    pub missing: Vec<String>,
}

/// 把平面中的相对资源引用替换为加载器给出的引用，找不到的保持原样并记入 `missing`。
pub fn resolve_plan_assets(plan: &FloorPlan, loader: &dyn ResourceLoader) -> AssetResolution {
    let mut next = plan.clone();
    let mut resolved = 0;
    let mut missing = Vec::new();

    let mut rewrite = |reference: &mut String| {
        if is_uri(reference) {
            return;
        }
        match block_on(loader.load(reference)) {
            Ok(resource) => {
                *reference = resource.into_string();
                resolved += 1;
            }
            Err(err) => {
                debug!(reference = %reference, error = %err, "资源引用无法解析");
                missing.push(reference.clone());
            }
        }
    };

    if !plan.photos.is_empty() {
        for photo in Arc::make_mut(&mut next.photos) {
            rewrite(&mut photo.url);
        }
    }
    if !plan.models.is_empty() {
        for model in Arc::make_mut(&mut next.models) {
            rewrite(&mut model.model_url);
        }
    }
    if plan.walls.iter().any(|wall| wall.texture.is_some()) {
        for wall in Arc::make_mut(&mut next.walls) {
            if let Some(texture) = wall.texture.as_mut() {
                rewrite(texture);
            }
        }
    }
    if plan
        .rooms
        .iter()
        .any(|room| room.floor_texture.is_some() || room.wall_texture.is_some())
    {
        for room in Arc::make_mut(&mut next.rooms) {
            if let Some(texture) = room.floor_texture.as_mut() {
                rewrite(texture);
            }
            if let Some(texture) = room.wall_texture.as_mut() {
                rewrite(texture);
            }
        }
    }

    AssetResolution {
        plan: next,
        resolved,
        missing,
    }
}

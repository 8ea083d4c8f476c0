//! 外部资源（照片、模型、贴图）的引用解析。
//!
//! 平面只保存不透明的资源引用字符串；把本地文件变成可供渲染端加载的引用属于异步能力，
//! 由调用方注入 [`ResourceLoader`] 实现。这里从不读取文件内容。

use std::fmt;
use std::path::{Path, PathBuf};

use futures::future::{self, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::IoError;

const REMOTE_SCHEMES: [&str; 5] = ["http://", "https://", "data:", "blob:", "file://"];

/// 渲染端可直接使用的资源引用。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceRef(String);

impl ResourceRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn from_path(path: &Path) -> Self {
        Self(format!("file://{}", path.display()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_local(&self) -> bool {
        self.0.starts_with("file://")
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 是否已经是带协议的引用（无需再解析）。
pub fn is_uri(reference: &str) -> bool {
    REMOTE_SCHEMES
        .iter()
        .any(|scheme| reference.starts_with(scheme))
}

pub trait ResourceLoader: Send + Sync {
    fn load(&self, reference: &str) -> BoxFuture<'static, Result<ResourceRef, IoError>>;
}

/// 基于本地文件系统的加载器：相对路径按根目录解析，只检查文件存在性。
#[derive(Debug, Clone, Default)]
pub struct FileResourceLoader {
    root: Option<PathBuf>,
}

impl FileResourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, reference: &str) -> Result<ResourceRef, IoError> {
        if is_uri(reference) {
            return Ok(ResourceRef::new(reference));
        }
        let candidate = match &self.root {
            Some(root) if Path::new(reference).is_relative() => root.join(reference),
            _ => PathBuf::from(reference),
        };
        trace!(candidate = %candidate.display(), "检查本地资源");
        if !candidate.is_file() {
            return Err(IoError::ResourceUnavailable(reference.to_string()));
        }
        let absolute = candidate.canonicalize().unwrap_or(candidate);
        Ok(ResourceRef::from_path(&absolute))
    }
}

impl ResourceLoader for FileResourceLoader {
    fn load(&self, reference: &str) -> BoxFuture<'static, Result<ResourceRef, IoError>> {
        future::ready(self.resolve(reference)).boxed()
    }
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use floorplan_core::units::{BASELINE_PIXELS_PER_METER, Unit};
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "FLOORPLAN_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub frontend: FrontendConfig,
    #[serde(default)]
    pub resources: ResourceConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// 自动发现配置文件：优先读取环境变量 `FLOORPLAN_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let grid = self.editor.grid_size;
        if !grid.is_finite() || grid <= 0.0 {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                message: format!("editor.grid_size 必须为正数，当前为 {grid}"),
            });
        }
        Ok(())
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 编辑器默认值：网格间距（像素）、是否吸附、新平面的显示单位。
#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_grid_size")]
    pub grid_size: f64,
    #[serde(default = "EditorConfig::default_snap")]
    pub snap_enabled: bool,
    #[serde(default)]
    pub default_unit: Unit,
}

impl EditorConfig {
    fn default_grid_size() -> f64 {
        BASELINE_PIXELS_PER_METER
    }

    fn default_snap() -> bool {
        true
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: Self::default_grid_size(),
            snap_enabled: Self::default_snap(),
            default_unit: Unit::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrontendConfig {
    #[serde(default)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceConfig {
    /// 解析照片、模型与贴图相对路径时依次尝试的根目录。
    #[serde(default)]
    pub asset_roots: Vec<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("配置文件 {path:?} 无效: {message}")]
    Invalid { path: PathBuf, message: String },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_returned_when_file_missing() {
        let cfg = AppConfig::discover().expect("discover should succeed");
        assert_eq!(cfg.logging.level, "info");
        assert!((cfg.editor.grid_size - 20.0).abs() < f64::EPSILON);
        assert!(cfg.editor.snap_enabled);
        assert_eq!(cfg.editor.default_unit, Unit::Meters);
        assert_eq!(cfg.frontend.output, OutputFormat::Text);
        assert!(cfg.resources.asset_roots.is_empty());
    }

    #[test]
    fn load_from_temp_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(
            file,
            r#"
            [logging]
            level = "debug"

            [editor]
            grid_size = 10.0
            snap_enabled = false
            default_unit = "feet"

            [frontend]
            output = "json"

            [resources]
            asset_roots = ["../assets", "../textures"]
            "#
        )
        .unwrap();

        let cfg = AppConfig::from_file(file.path()).expect("load config");
        assert_eq!(cfg.logging.level, "debug");
        assert!((cfg.editor.grid_size - 10.0).abs() < f64::EPSILON);
        assert!(!cfg.editor.snap_enabled);
        assert_eq!(cfg.editor.default_unit, Unit::Feet);
        assert_eq!(cfg.frontend.output, OutputFormat::Json);
        assert_eq!(cfg.resources.asset_roots.len(), 2);
        assert_eq!(cfg.resources.asset_roots[0], PathBuf::from("../assets"));
    }

    #[test]
    fn partial_file_keeps_section_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "[editor]\nsnap_enabled = false").unwrap();

        let cfg = AppConfig::from_file(file.path()).expect("load config");
        assert!(!cfg.editor.snap_enabled);
        assert!((cfg.editor.grid_size - 20.0).abs() < f64::EPSILON);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn non_positive_grid_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "[editor]\ngrid_size = 0.0").unwrap();
        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn malformed_toml_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "[frontend]\noutput = \"hologram\"").unwrap();
        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}

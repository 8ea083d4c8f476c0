use floorplan_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("序列化输出失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

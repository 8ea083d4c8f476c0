pub mod cli;
pub mod errors;
pub mod loader;
pub mod resource_locator;

pub use cli::CliOptions;

use errors::FrontendError;
use floorplan_config::AppConfig;
use tracing::info;

/// 启动 CLI 前端：加载平面（或内置示例）并输出概览。
pub fn run_cli(options: &CliOptions, config: &AppConfig) -> Result<(), FrontendError> {
    info!("启动 CLI 前端");
    cli::run(options, config)
}

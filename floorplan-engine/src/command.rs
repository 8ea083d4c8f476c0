use std::collections::HashMap;

use floorplan_core::geometry::Point2;
use floorplan_core::plan::CabinetKind;
use floorplan_core::presets::RoomKind;
use floorplan_core::units::Unit;

use crate::errors::EngineError;
use crate::scene::Scene;

#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// 解析空白分隔的命令行，例如 `select_at 120 80`。
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let name = parts.next()?;
        Some(Self::new(name, parts))
    }

    fn arg(&self, index: usize, label: &str) -> Result<&str, EngineError> {
        self.args
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| EngineError::InvalidArgument(format!("missing argument `{label}`")))
    }

    fn number(&self, index: usize, label: &str) -> Result<f64, EngineError> {
        let raw = self.arg(index, label)?;
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| {
                EngineError::InvalidArgument(format!("`{label}` must be a number, got `{raw}`"))
            })
    }

    fn point(&self, index: usize) -> Result<Point2, EngineError> {
        Ok(Point2::new(
            self.number(index, "x")?,
            self.number(index + 1, "y")?,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

impl From<Result<String, EngineError>> for CommandResponse {
    fn from(result: Result<String, EngineError>) -> Self {
        match result {
            Ok(message) => Self::ok(message),
            Err(err) => Self::err(err.to_string()),
        }
    }
}

pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse;
}

pub struct CommandContext<'a> {
    pub scene: &'a mut Scene,
}

pub struct CommandBus {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl CommandBus {
    pub fn new() -> Self {
        let mut bus = Self {
            handlers: HashMap::new(),
        };
        bus.register(FocusSelectionCommand);
        bus.register(ClearSelectionCommand);
        bus.register(SelectAtCommand);
        bus.register(DeleteAtCommand);
        bus.register(DeleteSelectionCommand);
        bus.register(CalibrateCommand);
        bus.register(AddRoomCommand);
        bus.register(AddCabinetCommand);
        bus
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) {
        self.handlers.insert(handler.name(), Box::new(handler));
    }

    pub fn dispatch(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        if let Some(handler) = self.handlers.get(request.name.as_str()) {
            handler.execute(request, context)
        } else {
            CommandResponse::err(format!("未知命令: {}", request.name))
        }
    }

    pub fn available_commands(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

struct FocusSelectionCommand;

impl CommandHandler for FocusSelectionCommand {
    fn name(&self) -> &'static str {
        "focus_selection"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        context.scene.focus_on_selection();
        CommandResponse::ok("视口已聚焦当前选中实体")
    }
}

struct ClearSelectionCommand;

impl CommandHandler for ClearSelectionCommand {
    fn name(&self) -> &'static str {
        "clear_selection"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        context.scene.clear_selection();
        CommandResponse::ok("选中集已清空")
    }
}

/// `select_at <x> <y>`
struct SelectAtCommand;

impl CommandHandler for SelectAtCommand {
    fn name(&self) -> &'static str {
        "select_at"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let point = match request.point(0) {
            Ok(point) => point,
            Err(err) => return CommandResponse::err(err.to_string()),
        };
        match context.scene.select_at(point) {
            Some(hit) => CommandResponse::ok(format!("已选中 {hit}")),
            None => CommandResponse::ok("未命中任何实体"),
        }
    }
}

/// `delete_at <x> <y>`
struct DeleteAtCommand;

impl CommandHandler for DeleteAtCommand {
    fn name(&self) -> &'static str {
        "delete_at"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        request
            .point(0)
            .map(|point| {
                let removed = context.scene.delete_at(point);
                format!("已删除 {} 个实体", removed.len())
            })
            .into()
    }
}

struct DeleteSelectionCommand;

impl CommandHandler for DeleteSelectionCommand {
    fn name(&self) -> &'static str {
        "delete_selection"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let removed = context.scene.delete_selection();
        CommandResponse::ok(format!("已删除 {removed} 个实体"))
    }
}

/// `calibrate <x1> <y1> <x2> <y2> <length> [unit]`
struct CalibrateCommand;

impl CommandHandler for CalibrateCommand {
    fn name(&self) -> &'static str {
        "calibrate"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        calibrate(request, context.scene).into()
    }
}

/// `add_room <living|bedroom|kitchen|bathroom> <x> <y>`
struct AddRoomCommand;

impl CommandHandler for AddRoomCommand {
    fn name(&self) -> &'static str {
        "add_room"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        add_room(request, context.scene).into()
    }
}

/// `add_cabinet <base|wall|tall|corner|island> <x> <y> [angle]`
struct AddCabinetCommand;

impl CommandHandler for AddCabinetCommand {
    fn name(&self) -> &'static str {
        "add_cabinet"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        add_cabinet(request, context.scene).into()
    }
}

fn calibrate(request: &CommandRequest, scene: &mut Scene) -> Result<String, EngineError> {
    let point1 = request.point(0)?;
    let point2 = request.point(2)?;
    let declared = request.arg(4, "length")?;
    let unit = match request.args.get(5) {
        Some(raw) => raw
            .parse::<Unit>()
            .map_err(|err| EngineError::InvalidArgument(err.to_string()))?,
        None => scene.plan().unit(),
    };
    let scale = scene.calibrate(point1, point2, declared, unit)?;
    Ok(format!("比例已更新为 {scale:.4} 像素/米"))
}

fn add_room(request: &CommandRequest, scene: &mut Scene) -> Result<String, EngineError> {
    let kind = request
        .arg(0, "kind")?
        .parse::<RoomKind>()
        .map_err(|err| EngineError::InvalidArgument(err.to_string()))?;
    let center = request.point(1)?;
    let target = scene.add_room_template(kind, center)?;
    Ok(format!("已添加 {target}"))
}

fn add_cabinet(request: &CommandRequest, scene: &mut Scene) -> Result<String, EngineError> {
    let kind = request
        .arg(0, "kind")?
        .parse::<CabinetKind>()
        .map_err(|err| EngineError::InvalidArgument(err.to_string()))?;
    let position = request.point(1)?;
    let angle = if request.args.len() > 3 {
        request.number(3, "angle")?
    } else {
        0.0
    };
    let target = scene.add_cabinet(kind, position, angle)?;
    Ok(format!("已添加 {target}"))
}

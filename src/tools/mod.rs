//! 工具层：注册表、类型化调用、执行器与结果封装

pub mod action;
pub mod executor;
pub mod registry;
pub mod result;

pub use action::{EventRange, ToolAction};
pub use executor::{is_valid_address, ToolExecutor};
pub use registry::{ParamKind, ParamSpec, ToolRegistry, ToolSpec};
pub use result::{ExecutionResult, StepOutcome};

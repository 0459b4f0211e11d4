//! 核心：状态定义、计划执行状态机、阶段计时与错误类型

mod error;
mod machine;
mod state;
mod timing;

pub use error::PlanError;
pub use machine::{PlanMachine, PlanRequest, PLANNING_FAILED_DIAGNOSTIC};
pub use state::{PlanState, PlanStatus, PlanStep, ProgressEvent, StepResult, StepStatus};
pub use timing::{PhaseTimer, PhaseTiming, TimingInfo};

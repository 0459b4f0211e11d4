//! 工具箱：本地工具注册表、能力描述与远端能力发现

mod clock;
mod discovery;
mod echo;
mod registry;

pub use clock::ClockTool;
pub use discovery::{
    discover_with_timeout, merge_capabilities, CapabilityProvider, ManifestProvider,
};
pub use echo::EchoTool;
pub use registry::{render_capabilities, Capability, Tool, ToolRegistry};

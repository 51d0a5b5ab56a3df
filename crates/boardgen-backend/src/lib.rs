//! External native-toolchain driver.
//!
//! Two independent paths over black-box external tools:
//!
//! - [`object::compile_module`] — direct IR→object: textual IR plus a target
//!   descriptor goes to the static compiler (`llc`), object bytes come back.
//! - [`pipeline::FirmwarePipeline`] — full source→firmware: the emitted C
//!   tree is compiled per file to bitcode, linked, lowered to an object, and
//!   linked into a final image (`clang`/`llvm-link`/`llc`/`clang`).
//!
//! Every tool call goes through the [`ToolInvoker`](invoke::ToolInvoker)
//! abstraction so tests can substitute a fake and assert on argument lists
//! without spawning processes.

mod error;
pub mod invoke;
pub mod object;
pub mod pipeline;

pub use error::BackendError;
pub use invoke::{SystemInvoker, ToolInvoker, ToolOutput};
pub use object::compile_module;
pub use pipeline::FirmwarePipeline;

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;

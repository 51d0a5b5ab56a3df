//! Source and device-tree emission for boardgen.
//!
//! Three pieces cooperate here:
//!
//! - a [`TemplateEngine`](template::TemplateEngine) that maps a template
//!   identifier plus a render context to text (missing identifiers are hard
//!   errors),
//! - a [`Registry`](registry::Registry) of peripheral generators, populated
//!   once at startup and iterated in registration order,
//! - the [`Emitter`](emitter::Emitter), which recreates the output tree and
//!   walks the registry to produce the full generated source layout.
//!
//! All writes land inside the output tree; any failure aborts the remaining
//! steps without cleanup of what was already written.

mod error;
pub mod emitter;
pub mod peripherals;
pub mod registry;
pub mod template;
mod templates;

pub use emitter::{Emitter, OutputDirs};
pub use error::EmitError;
pub use registry::{GeneratorContext, PeripheralGenerator, PeripheralMeta, Registry};
pub use template::{Engine, RenderContext, TemplateEngine};

/// Result type for emission operations.
pub type Result<T> = std::result::Result<T, EmitError>;

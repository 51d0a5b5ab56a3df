//! Peripheral generator trait and the plugin registry.
//!
//! The registry maps a peripheral-kind name to a generator constructor. It is
//! populated exactly once, by an explicit startup call, and iterated in
//! insertion order — that order determines the sequence peripheral metadata
//! reaches the shared templates, so it must stay deterministic across runs.

use std::path::Path;

use boardgen_config::BoardConfig;
use boardgen_targets::TargetSpec;

use crate::emitter::OutputDirs;
use crate::error::EmitError;
use crate::template::{RenderContext, TemplateEngine};

/// Metadata recorded for each peripheral that produced output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeripheralMeta {
    /// Peripheral kind name (registry key).
    pub name: String,
    /// Generated header filename (e.g., "gpio.h").
    pub header: String,
    /// Initialization function symbol (e.g., "gpio_init").
    pub init_fn: String,
}

impl PeripheralMeta {
    /// Derive the conventional metadata for a peripheral kind.
    pub fn for_kind(name: &str) -> Self {
        Self {
            name: name.to_string(),
            header: format!("{name}.h"),
            init_fn: format!("{name}_init"),
        }
    }
}

/// Borrowed state a generator works from: the immutable board model, a render
/// capability, the output-location table, and the generation timestamp.
#[derive(Clone, Copy)]
pub struct GeneratorContext<'a> {
    /// The validated board description.
    pub board: &'a BoardConfig,
    /// Template rendering capability.
    pub engine: &'a dyn TemplateEngine,
    /// Output directory table.
    pub dirs: &'a OutputDirs,
    /// The compilation target.
    pub target: &'a TargetSpec,
    /// Generation timestamp for file banners.
    pub generated: &'a str,
}

impl GeneratorContext<'_> {
    /// Render a template and write it to `dest`.
    pub fn render_to(&self, template: &str, dest: &Path) -> Result<(), EmitError> {
        let ctx = RenderContext {
            board: self.board,
            target: self.target,
            peripherals: &[],
            generated: self.generated,
        };
        let text = self.engine.render(template, &ctx)?;
        std::fs::write(dest, text)?;
        log::info!("generated {}", dest.display());
        Ok(())
    }
}

/// A peripheral code generator.
///
/// Stateless aside from the borrowed [`GeneratorContext`]; instantiated once
/// per generation run and discarded after. `generate` must be idempotent:
/// re-running over unchanged input overwrites with identical bytes.
pub trait PeripheralGenerator {
    /// Pure predicate: is this peripheral present in the board model?
    fn should_generate(&self) -> bool;

    /// Render this peripheral's header/source files.
    fn generate(&self) -> Result<(), EmitError>;
}

/// Constructor for a generator bound to a per-run context.
pub type GeneratorCtor = for<'a> fn(GeneratorContext<'a>) -> Box<dyn PeripheralGenerator + 'a>;

/// Insertion-ordered mapping from peripheral-kind name to constructor.
#[derive(Default)]
pub struct Registry {
    entries: Vec<(&'static str, GeneratorCtor)>,
}

impl Registry {
    /// Create an empty registry (useful for tests with synthetic generators).
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry with all built-in peripheral kinds, in the fixed
    /// GPIO, UART, Timer order the generated entry point relies on.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("gpio", crate::peripherals::gpio);
        registry.register("uart", crate::peripherals::uart);
        registry.register("timer", crate::peripherals::timer);
        registry
    }

    /// Register a generator constructor under `name`.
    ///
    /// Called only during startup. A duplicate name is a programming error,
    /// not a runtime condition.
    pub fn register(&mut self, name: &'static str, ctor: GeneratorCtor) {
        assert!(
            !self.entries.iter().any(|(n, _)| *n == name),
            "duplicate peripheral registration: {name}"
        );
        log::debug!("registered peripheral generator: {name}");
        self.entries.push((name, ctor));
    }

    /// Iterate entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, GeneratorCtor)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

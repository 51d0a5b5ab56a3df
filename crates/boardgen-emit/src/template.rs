//! Template engine interface and the production engine.
//!
//! A template is addressed by identifier (e.g., `shared/hal.h`) and rendered
//! against a [`RenderContext`]. The production [`Engine`] carries a built-in
//! template set rendered programmatically; an optional template directory can
//! override any identifier with an on-disk file, which is emitted verbatim
//! after scalar `{{key}}` substitution.

use std::path::PathBuf;

use boardgen_config::BoardConfig;
use boardgen_targets::TargetSpec;

use crate::error::EmitError;
use crate::registry::PeripheralMeta;
use crate::templates;

/// Everything a template may draw on while rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// The board being generated for.
    pub board: &'a BoardConfig,
    /// The compilation target.
    pub target: &'a TargetSpec,
    /// Metadata for peripherals that generated output, in registry order.
    /// Empty for templates rendered before the peripheral pass.
    pub peripherals: &'a [PeripheralMeta],
    /// Generation timestamp stamped into file banners.
    pub generated: &'a str,
}

/// Render capability handed to the emitter and peripheral generators.
pub trait TemplateEngine {
    /// Render the template registered under `name`.
    ///
    /// An unknown identifier is a hard error that aborts emission.
    fn render(&self, name: &str, ctx: &RenderContext<'_>) -> Result<String, EmitError>;
}

/// The production template engine.
#[derive(Debug, Default)]
pub struct Engine {
    template_dir: Option<PathBuf>,
}

impl Engine {
    /// Engine with built-in templates only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that checks `template_dir` for override files before falling
    /// back to the built-in set. A missing directory simply disables
    /// overrides; only identifiers present as files are overridden.
    pub fn with_template_dir(template_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: Some(template_dir.into()),
        }
    }

    fn override_for(&self, name: &str, ctx: &RenderContext<'_>) -> Result<Option<String>, EmitError> {
        let Some(ref dir) = self.template_dir else {
            return Ok(None);
        };
        let path = dir.join(name);
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path).map_err(|source| EmitError::OverrideRead {
            name: name.to_string(),
            source,
        })?;
        Ok(Some(substitute(&text, ctx)))
    }
}

impl TemplateEngine for Engine {
    fn render(&self, name: &str, ctx: &RenderContext<'_>) -> Result<String, EmitError> {
        if let Some(text) = self.override_for(name, ctx)? {
            log::debug!("template {name} rendered from override");
            return Ok(text);
        }
        templates::render_builtin(name, ctx)
    }
}

/// Scalar placeholder substitution for override templates.
fn substitute(text: &str, ctx: &RenderContext<'_>) -> String {
    text.replace("{{board}}", &ctx.board.name)
        .replace("{{target}}", ctx.target.name)
        .replace("{{generated}}", ctx.generated)
}

//! Source/DTS emitter — orchestrates one full generation run.

use std::fs;
use std::path::{Path, PathBuf};

use boardgen_config::BoardConfig;
use boardgen_targets::TargetSpec;

use crate::error::EmitError;
use crate::registry::{GeneratorContext, PeripheralMeta, Registry};
use crate::template::{RenderContext, TemplateEngine};

/// Output directory table for one generation run.
#[derive(Debug, Clone)]
pub struct OutputDirs {
    /// Root of the output tree (holds the Makefile).
    pub root: PathBuf,
    /// Generated C sources.
    pub src: PathBuf,
    /// Generated headers.
    pub include: PathBuf,
    /// Object files produced by the generated Makefile.
    pub build: PathBuf,
    /// Final firmware image.
    pub bin: PathBuf,
    /// Device-tree fragments.
    pub dts: PathBuf,
}

impl OutputDirs {
    /// Derive the directory table from an output root.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            src: root.join("src"),
            include: root.join("include"),
            build: root.join("build"),
            bin: root.join("bin"),
            dts: root.join("dts"),
        }
    }

    fn subdirs(&self) -> [&PathBuf; 5] {
        [&self.src, &self.include, &self.build, &self.bin, &self.dts]
    }

    /// Create the root and every subdirectory.
    pub fn create_all(&self) -> Result<(), EmitError> {
        fs::create_dir_all(&self.root)?;
        for dir in self.subdirs() {
            log::debug!("creating {}", dir.display());
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Remove every subdirectory that exists, then recreate the tree.
    ///
    /// Failure at any point is fatal; there is no partial-cleanup retry.
    pub fn reset(&self) -> Result<(), EmitError> {
        for dir in self.subdirs() {
            if dir.exists() {
                log::debug!("removing {}", dir.display());
                fs::remove_dir_all(dir)?;
            }
        }
        self.create_all()
    }
}

/// One-shot emitter for a board/target pair.
///
/// Runs the fixed operation sequence: reset the output tree, render shared
/// artifacts, walk the registry, then render the aggregate config header,
/// entry point, build file, and (where supported) device tree. Any failure
/// surfaces immediately and halts the remaining steps.
pub struct Emitter<'a> {
    board: &'a BoardConfig,
    engine: &'a dyn TemplateEngine,
    registry: &'a Registry,
    target: &'a TargetSpec,
    dirs: OutputDirs,
    generated: String,
}

impl<'a> Emitter<'a> {
    /// Bind an emitter to its collaborators and output root.
    pub fn new(
        board: &'a BoardConfig,
        engine: &'a dyn TemplateEngine,
        registry: &'a Registry,
        target: &'a TargetSpec,
        out_dir: &Path,
        generated: impl Into<String>,
    ) -> Self {
        Self {
            board,
            engine,
            registry,
            target,
            dirs: OutputDirs::new(out_dir),
            generated: generated.into(),
        }
    }

    /// The output directory table this emitter writes to.
    pub fn dirs(&self) -> &OutputDirs {
        &self.dirs
    }

    /// Run the full emission sequence.
    ///
    /// Returns metadata for the peripherals that generated output, in
    /// registry order filtered to present kinds — the same order their init
    /// calls appear in the generated entry point.
    pub fn generate(&self) -> Result<Vec<PeripheralMeta>, EmitError> {
        log::info!(
            "generating sources for board '{}' into {}",
            self.board.name,
            self.dirs.root.display()
        );
        self.dirs.reset()?;

        // Shared artifacts first; peripherals reference the HAL shims.
        self.render_to("shared/hal.h", &self.dirs.include.join("hal.h"), &[])?;
        self.render_to("shared/hal.c", &self.dirs.src.join("hal.c"), &[])?;
        if self.target.needs_syscalls {
            self.render_to("shared/syscalls.c", &self.dirs.src.join("syscalls.c"), &[])?;
        }

        let mut peripherals = Vec::new();
        for (name, ctor) in self.registry.iter() {
            let generator = ctor(GeneratorContext {
                board: self.board,
                engine: self.engine,
                dirs: &self.dirs,
                target: self.target,
                generated: &self.generated,
            });
            if generator.should_generate() {
                generator.generate()?;
                peripherals.push(PeripheralMeta::for_kind(name));
            } else {
                log::debug!("peripheral '{name}' absent, skipping");
            }
        }

        self.render_to(
            "shared/config.h",
            &self.dirs.include.join("config.h"),
            &peripherals,
        )?;
        self.render_to("shared/main.c", &self.dirs.src.join("main.c"), &peripherals)?;
        self.render_to(
            "shared/Makefile",
            &self.dirs.root.join("Makefile"),
            &peripherals,
        )?;

        if self.target.supports_dts {
            let template = format!("targets/{}/board.dts", self.target.name);
            let dest = self
                .dirs
                .dts
                .join(format!("{}_{}.dts", self.board.name, self.target.name));
            self.render_to(&template, &dest, &peripherals)?;
        }

        log::info!(
            "generation complete: {} peripheral(s), target {}",
            peripherals.len(),
            self.target.name
        );
        Ok(peripherals)
    }

    fn render_to(
        &self,
        template: &str,
        dest: &Path,
        peripherals: &[PeripheralMeta],
    ) -> Result<(), EmitError> {
        let ctx = RenderContext {
            board: self.board,
            target: self.target,
            peripherals,
            generated: &self.generated,
        };
        let text = self.engine.render(template, &ctx)?;
        fs::write(dest, text)?;
        log::info!("generated {}", dest.display());
        Ok(())
    }
}

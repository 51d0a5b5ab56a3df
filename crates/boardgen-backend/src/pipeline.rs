//! Full source→firmware pipeline over the emitted output tree.

use std::fs;
use std::path::{Path, PathBuf};

use boardgen_targets::TargetSpec;

use crate::error::BackendError;
use crate::invoke::{run_checked, ToolInvoker};
use crate::Result;

/// Drives the four-step external toolchain over an emitted source tree:
/// per-file C→bitcode, bitcode link, object lowering, final image link.
///
/// Strictly sequential; a non-zero exit at any step aborts the whole run
/// with that tool's captured stderr. No step is retried.
pub struct FirmwarePipeline<'a> {
    out_dir: &'a Path,
    target: &'a TargetSpec,
    invoker: &'a dyn ToolInvoker,
}

impl<'a> FirmwarePipeline<'a> {
    /// Bind the pipeline to an emitted output tree and a target.
    pub fn new(out_dir: &'a Path, target: &'a TargetSpec, invoker: &'a dyn ToolInvoker) -> Self {
        Self {
            out_dir,
            target,
            invoker,
        }
    }

    /// Run the pipeline; returns the path of the linked firmware image.
    pub fn run(&self) -> Result<PathBuf> {
        let src_dir = self.out_dir.join("src");
        let include_dir = self.out_dir.join("include");
        let bin_dir = self.out_dir.join("bin");

        // Recreate a clean staging directory so the link step sees exactly
        // the bitcode produced by this run.
        let ir_dir = self.out_dir.join("ir");
        if ir_dir.exists() {
            fs::remove_dir_all(&ir_dir)?;
        }
        fs::create_dir_all(&ir_dir)?;
        fs::create_dir_all(&bin_dir)?;

        let c_files = sorted_c_files(&src_dir)?;
        if c_files.is_empty() {
            return Err(BackendError::NoSources { dir: src_dir });
        }

        // Step 1: each C source to its own bitcode module.
        let mut bitcode = Vec::new();
        for c_file in &c_files {
            let stem = c_file.file_stem().unwrap_or_default().to_string_lossy();
            let bc = ir_dir.join(format!("{stem}.bc"));
            log::info!("compiling {} -> {}", c_file.display(), bc.display());
            run_checked(
                self.invoker,
                "clang",
                &[
                    "-target".to_string(),
                    self.target.triple.to_string(),
                    "-I".to_string(),
                    include_dir.display().to_string(),
                    "-emit-llvm".to_string(),
                    "-c".to_string(),
                    c_file.display().to_string(),
                    "-o".to_string(),
                    bc.display().to_string(),
                ],
            )?;
            bitcode.push(bc);
        }

        // Step 2: link the fresh bitcode modules into one.
        let linked = ir_dir.join("firmware.bc");
        log::info!("linking {} bitcode module(s)", bitcode.len());
        let mut link_args: Vec<String> =
            bitcode.iter().map(|p| p.display().to_string()).collect();
        link_args.push("-o".to_string());
        link_args.push(linked.display().to_string());
        run_checked(self.invoker, "llvm-link", &link_args)?;

        // Step 3: lower to a position-independent relocatable object.
        let object = ir_dir.join("firmware.o");
        log::info!("lowering {} -> {}", linked.display(), object.display());
        run_checked(
            self.invoker,
            "llc",
            &[
                "-filetype=obj".to_string(),
                format!("-mtriple={}", self.target.triple),
                "-relocation-model=pic".to_string(),
                linked.display().to_string(),
                "-o".to_string(),
                object.display().to_string(),
            ],
        )?;

        // Step 4: link the object into the final image.
        let image = bin_dir.join("firmware.elf");
        log::info!("linking image {}", image.display());
        run_checked(
            self.invoker,
            "clang",
            &[
                "-target".to_string(),
                self.target.triple.to_string(),
                "-o".to_string(),
                image.display().to_string(),
                object.display().to_string(),
            ],
        )?;

        Ok(image)
    }
}

/// The `.c` files under `dir`, sorted by name for deterministic ordering.
fn sorted_c_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "c") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeInvoker;
    use boardgen_targets::STM32;

    fn emitted_tree(files: &[&str]) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        fs::create_dir_all(tmp.path().join("include")).unwrap();
        for file in files {
            fs::write(tmp.path().join("src").join(file), "int x;\n").unwrap();
        }
        tmp
    }

    #[test]
    fn stages_run_in_order() {
        let tmp = emitted_tree(&["hal.c", "main.c"]);
        let invoker = FakeInvoker::new();
        let image = FirmwarePipeline::new(tmp.path(), &STM32, &invoker)
            .run()
            .unwrap();

        assert_eq!(
            invoker.tools_called(),
            vec!["clang", "clang", "llvm-link", "llc", "clang"]
        );
        assert_eq!(image, tmp.path().join("bin/firmware.elf"));
    }

    #[test]
    fn link_step_sees_exactly_the_fresh_bitcode() {
        let tmp = emitted_tree(&["main.c", "gpio.c", "hal.c"]);
        let invoker = FakeInvoker::new();
        FirmwarePipeline::new(tmp.path(), &STM32, &invoker)
            .run()
            .unwrap();

        let calls = invoker.calls.borrow();
        let (_, link_args) = calls
            .iter()
            .find(|(tool, _)| tool == "llvm-link")
            .unwrap();
        let inputs: Vec<_> = link_args
            .iter()
            .take_while(|a| *a != "-o")
            .map(|a| Path::new(a).file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        // Sorted by source name; the linked output itself is not an input.
        assert_eq!(inputs, vec!["gpio.bc", "hal.bc", "main.bc"]);
    }

    #[test]
    fn compile_failure_stops_the_pipeline() {
        let tmp = emitted_tree(&["main.c"]);
        let invoker = FakeInvoker::failing("clang");
        let err = FirmwarePipeline::new(tmp.path(), &STM32, &invoker)
            .run()
            .unwrap_err();

        assert!(err.to_string().contains("clang"));
        assert_eq!(invoker.tools_called(), vec!["clang"]);
    }

    #[test]
    fn lowering_failure_skips_final_link() {
        let tmp = emitted_tree(&["main.c"]);
        let invoker = FakeInvoker::failing("llc");
        FirmwarePipeline::new(tmp.path(), &STM32, &invoker)
            .run()
            .unwrap_err();

        let tools = invoker.tools_called();
        assert_eq!(tools, vec!["clang", "llvm-link", "llc"]);
    }

    #[test]
    fn empty_source_tree_is_an_error() {
        let tmp = emitted_tree(&[]);
        let invoker = FakeInvoker::new();
        let err = FirmwarePipeline::new(tmp.path(), &STM32, &invoker)
            .run()
            .unwrap_err();
        assert!(matches!(err, BackendError::NoSources { .. }));
    }

    #[test]
    fn stale_staging_directory_is_discarded() {
        let tmp = emitted_tree(&["main.c"]);
        fs::create_dir_all(tmp.path().join("ir")).unwrap();
        fs::write(tmp.path().join("ir/stale.bc"), b"old").unwrap();

        let invoker = FakeInvoker::new();
        FirmwarePipeline::new(tmp.path(), &STM32, &invoker)
            .run()
            .unwrap();

        assert!(!tmp.path().join("ir/stale.bc").exists());
        let calls = invoker.calls.borrow();
        let (_, link_args) = calls
            .iter()
            .find(|(tool, _)| tool == "llvm-link")
            .unwrap();
        assert!(!link_args.iter().any(|a| a.contains("stale")));
    }
}

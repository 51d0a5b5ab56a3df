//! Direct IR→object path.

use std::fs;

use boardgen_targets::TargetSpec;

use crate::invoke::{run_checked, ToolInvoker};
use crate::Result;

/// Compile textual IR to a relocatable object via the static compiler.
///
/// The IR is staged into a temporary `.ll` file, `llc` is invoked with the
/// target's triple/cpu/features, and the produced object is read back as
/// bytes. Both temporaries are removed on every exit path, success or
/// failure, so repeated calls in a long-lived process leak nothing.
pub fn compile_module(
    invoker: &dyn ToolInvoker,
    ir_text: &str,
    target: &TargetSpec,
) -> Result<Vec<u8>> {
    let ir_file = tempfile::Builder::new()
        .prefix("boardgen-")
        .suffix(".ll")
        .tempfile()?;
    fs::write(ir_file.path(), ir_text)?;

    let obj_file = tempfile::Builder::new()
        .prefix("boardgen-")
        .suffix(".o")
        .tempfile()?;

    let mut args = vec![
        "-filetype=obj".to_string(),
        format!("-mtriple={}", target.triple),
        format!("-mcpu={}", target.cpu),
    ];
    if !target.features.is_empty() {
        args.push(format!("-mattr={}", target.features));
    }
    args.push("-o".to_string());
    args.push(obj_file.path().display().to_string());
    args.push(ir_file.path().display().to_string());

    log::info!(
        "lowering IR for {} ({})",
        target.name,
        target.triple
    );
    run_checked(invoker, "llc", &args)?;

    Ok(fs::read(obj_file.path())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::testing::FakeInvoker;
    use boardgen_targets::{IMX7, STM32, X86};
    use std::path::Path;

    const IR: &str = "define i32 @main() {\nentry:\n  ret i32 0\n}\n";

    #[test]
    fn llc_receives_target_tuple() {
        let invoker = FakeInvoker::new();
        compile_module(&invoker, IR, &STM32).unwrap();

        let calls = invoker.calls.borrow();
        let (tool, args) = &calls[0];
        assert_eq!(tool, "llc");
        assert!(args.contains(&"-filetype=obj".to_string()));
        assert!(args.contains(&"-mtriple=armv7-none-eabi".to_string()));
        assert!(args.contains(&"-mcpu=cortex-m3".to_string()));
        assert!(args.contains(&"-mattr=+thumb2".to_string()));
    }

    #[test]
    fn mattr_omitted_for_empty_feature_string() {
        for target in [&X86, &IMX7] {
            let invoker = FakeInvoker::new();
            compile_module(&invoker, IR, target).unwrap();
            let calls = invoker.calls.borrow();
            let (_, args) = &calls[0];
            assert!(
                !args.iter().any(|a| a.starts_with("-mattr")),
                "{} should not pass -mattr",
                target.name
            );
        }
    }

    #[test]
    fn object_bytes_are_returned() {
        let invoker = FakeInvoker::new();
        let bytes = compile_module(&invoker, IR, &X86).unwrap();
        assert_eq!(bytes, b"fake-artifact");
    }

    #[test]
    fn temporaries_are_removed_after_success() {
        let invoker = FakeInvoker::new();
        compile_module(&invoker, IR, &X86).unwrap();

        let calls = invoker.calls.borrow();
        let (_, args) = &calls[0];
        // Last arg is the staged .ll path, the one before -o's value the .o.
        let ir_path = args.last().unwrap();
        let obj_path = &args[args.iter().position(|a| a == "-o").unwrap() + 1];
        assert!(!Path::new(ir_path).exists());
        assert!(!Path::new(obj_path).exists());
    }

    #[test]
    fn failure_carries_stderr_and_cleans_up() {
        let invoker = FakeInvoker::failing("llc");
        let err = compile_module(&invoker, IR, &X86).unwrap_err();
        assert!(matches!(err, BackendError::ToolFailed { .. }));
        assert!(err.to_string().contains("tool exploded"));

        let calls = invoker.calls.borrow();
        let (_, args) = &calls[0];
        let ir_path = args.last().unwrap();
        assert!(!Path::new(ir_path).exists(), "temp IR file must be removed");
    }
}

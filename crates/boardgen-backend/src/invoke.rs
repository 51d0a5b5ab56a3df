//! Tool-invocation abstraction.

use std::process::Command;

use crate::error::BackendError;
use crate::Result;

/// Captured result of one external tool run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
    /// Exit code; -1 when the process died to a signal.
    pub code: i32,
}

impl ToolOutput {
    /// Whether the tool exited zero.
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Stderr as lossy UTF-8, for error reporting.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Capability to run one external tool and capture its output.
pub trait ToolInvoker {
    /// Run `tool` with `args`, blocking until it exits.
    fn invoke(&self, tool: &str, args: &[String]) -> Result<ToolOutput>;
}

/// Production invoker: spawns the tool as a child process and waits.
#[derive(Debug, Default)]
pub struct SystemInvoker;

impl ToolInvoker for SystemInvoker {
    fn invoke(&self, tool: &str, args: &[String]) -> Result<ToolOutput> {
        log::debug!("invoking {tool} {}", args.join(" "));
        let output = Command::new(tool)
            .args(args)
            .output()
            .map_err(|source| BackendError::Spawn {
                tool: tool.to_string(),
                source,
            })?;

        Ok(ToolOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            code: output.status.code().unwrap_or(-1),
        })
    }
}

/// Run a tool and map a non-zero exit to a fatal error carrying stderr.
pub(crate) fn run_checked(
    invoker: &dyn ToolInvoker,
    tool: &str,
    args: &[String],
) -> Result<ToolOutput> {
    let output = invoker.invoke(tool, args)?;
    if !output.success() {
        return Err(BackendError::ToolFailed {
            tool: tool.to_string(),
            code: output.code,
            stderr: output.stderr_text(),
        });
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeInvoker;

    #[test]
    fn run_checked_passes_through_success() {
        let invoker = FakeInvoker::new();
        let output = run_checked(&invoker, "llc", &["-filetype=obj".into()]).unwrap();
        assert!(output.success());
    }

    #[test]
    fn run_checked_maps_nonzero_exit() {
        let invoker = FakeInvoker::failing("llc");
        let err = run_checked(&invoker, "llc", &[]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("llc"));
        assert!(message.contains("tool exploded"));
    }

    #[test]
    fn system_invoker_reports_missing_tool() {
        let invoker = SystemInvoker;
        let err = invoker
            .invoke("boardgen-no-such-tool", &[])
            .unwrap_err();
        assert!(matches!(err, BackendError::Spawn { .. }));
    }

    #[test]
    fn system_invoker_captures_output() {
        // `true` exits zero everywhere this crate builds.
        let invoker = SystemInvoker;
        let output = invoker.invoke("true", &[]).unwrap();
        assert!(output.success());
    }
}

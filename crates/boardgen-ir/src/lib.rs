//! Lowering of the program model to textual LLVM IR.
//!
//! The lowering is representation-agnostic about what the initializers do:
//! every call target is an opaque external symbol whose real body lives in
//! the separately generated C sources and is linked later. A lowered module
//! declares one no-arg/no-return extern per distinct callee and defines
//! `main` returning `i32 0` after calling each statement's target in order.

use std::fmt;

use boardgen_ast::{Module, Stmt};
use boardgen_targets::{data_layout, TargetError, TargetSpec};

/// Errors from IR lowering.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    /// Target descriptor resolution failed.
    #[error(transparent)]
    Target(#[from] TargetError),
}

/// Result type for lowering operations.
pub type Result<T> = std::result::Result<T, IrError>;

/// An IR module ready to dump as text or hand to the backend driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrModule {
    /// Module name (the board name).
    pub name: String,
    /// Target triple, present when a target was supplied.
    pub triple: Option<String>,
    /// Data layout string, present exactly when `triple` is.
    pub data_layout: Option<String>,
    /// External function declarations, in first-appearance order.
    pub externs: Vec<String>,
    /// Calls emitted in `main`, in program order.
    pub entry_calls: Vec<String>,
}

/// Lower a program model to an IR module.
///
/// When `target` is supplied, the triple and its data layout are attached;
/// layout resolution fails if the triple is unrecognized. Without a target
/// the module is still valid for an IR-text dump, just untargeted.
pub fn lower(module: &Module, name: &str, target: Option<&TargetSpec>) -> Result<IrModule> {
    let mut externs: Vec<String> = Vec::new();
    let mut entry_calls = Vec::new();

    for function in &module.functions {
        for stmt in &function.body {
            let Stmt::Call { function: callee, .. } = stmt;
            if !externs.iter().any(|e| e == callee) {
                externs.push(callee.clone());
            }
            if function.name == "main" {
                entry_calls.push(callee.clone());
            }
        }
    }

    let (triple, layout) = match target {
        Some(spec) => (
            Some(spec.triple.to_string()),
            Some(data_layout(spec.triple)?.to_string()),
        ),
        None => (None, None),
    };

    Ok(IrModule {
        name: name.to_string(),
        triple,
        data_layout: layout,
        externs,
        entry_calls,
    })
}

impl fmt::Display for IrModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        writeln!(f, "source_filename = \"{}\"", self.name)?;
        if let Some(ref layout) = self.data_layout {
            writeln!(f, "target datalayout = \"{layout}\"")?;
        }
        if let Some(ref triple) = self.triple {
            writeln!(f, "target triple = \"{triple}\"")?;
        }
        writeln!(f)?;
        for name in &self.externs {
            writeln!(f, "declare void @{name}()")?;
        }
        if !self.externs.is_empty() {
            writeln!(f)?;
        }
        writeln!(f, "define i32 @main() {{")?;
        writeln!(f, "entry:")?;
        for name in &self.entry_calls {
            writeln!(f, "  call void @{name}()")?;
        }
        writeln!(f, "  ret i32 0")?;
        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardgen_ast::{Function, Module};
    use boardgen_targets::STM32;

    fn call(name: &str) -> Stmt {
        Stmt::Call {
            function: name.to_string(),
            args: Vec::new(),
        }
    }

    fn module(calls: &[&str]) -> Module {
        Module {
            functions: vec![Function {
                name: "main".to_string(),
                params: Vec::new(),
                body: calls.iter().map(|c| call(c)).collect(),
            }],
        }
    }

    #[test]
    fn untargeted_module_has_no_triple() {
        let ir = lower(&module(&["gpio_init"]), "tst", None).unwrap();
        assert!(ir.triple.is_none());
        assert!(ir.data_layout.is_none());

        let text = ir.to_string();
        assert!(!text.contains("target triple"));
        assert!(!text.contains("target datalayout"));
        assert!(text.contains("declare void @gpio_init()"));
    }

    #[test]
    fn targeted_module_attaches_triple_and_layout() {
        let ir = lower(&module(&["gpio_init"]), "tst", Some(&STM32)).unwrap();
        assert_eq!(ir.triple.as_deref(), Some("armv7-none-eabi"));
        assert!(ir.data_layout.is_some());

        let text = ir.to_string();
        assert!(text.contains("target triple = \"armv7-none-eabi\""));
        assert!(text.contains("target datalayout = \""));
    }

    #[test]
    fn unknown_triple_propagates() {
        let bogus = TargetSpec {
            triple: "mips-unknown-elf",
            ..STM32
        };
        assert!(lower(&module(&["gpio_init"]), "tst", Some(&bogus)).is_err());
    }

    #[test]
    fn calls_render_in_program_order() {
        let ir = lower(
            &module(&["gpio_init", "uart_init", "timer_init"]),
            "tst",
            None,
        )
        .unwrap();
        let text = ir.to_string();

        let gpio = text.find("call void @gpio_init()").unwrap();
        let uart = text.find("call void @uart_init()").unwrap();
        let timer = text.find("call void @timer_init()").unwrap();
        assert!(gpio < uart && uart < timer);
        assert!(text.ends_with("  ret i32 0\n}\n"));
    }

    #[test]
    fn duplicate_callees_declared_once() {
        let ir = lower(&module(&["gpio_init", "gpio_init"]), "tst", None).unwrap();
        assert_eq!(ir.externs, vec!["gpio_init"]);
        assert_eq!(ir.entry_calls.len(), 2);
    }

    #[test]
    fn empty_body_still_returns_zero() {
        let ir = lower(&module(&[]), "tst", None).unwrap();
        let text = ir.to_string();
        assert!(!text.contains("declare"));
        assert!(text.contains("ret i32 0"));
    }

    #[test]
    fn lowering_is_deterministic() {
        let m = module(&["gpio_init", "uart_init"]);
        let a = lower(&m, "tst", Some(&STM32)).unwrap().to_string();
        let b = lower(&m, "tst", Some(&STM32)).unwrap().to_string();
        assert_eq!(a, b);
    }
}

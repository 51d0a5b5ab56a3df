//! Minimal program model for generated firmware.
//!
//! The model is deliberately tiny: a module holding functions, and a single
//! statement kind — a call to an opaque external function. The generated
//! firmware's control flow is exactly one entry function invoking one
//! initializer per present peripheral kind, so nothing richer is needed.

use boardgen_config::BoardConfig;
use serde::{Deserialize, Serialize};

/// Initializer symbol for the GPIO bank.
pub const GPIO_INIT: &str = "gpio_init";
/// Initializer symbol for the UART instances.
pub const UART_INIT: &str = "uart_init";
/// Initializer symbol for the timer instances.
pub const TIMER_INIT: &str = "timer_init";

/// A statement in a function body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Stmt {
    /// A call to a named function. Arguments are carried for forward
    /// compatibility; every initializer today takes none.
    Call {
        /// Callee symbol name.
        function: String,
        /// Argument list (currently always empty).
        args: Vec<String>,
    },
}

/// A function with parameters and a body of statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// Function name.
    pub name: String,
    /// Parameter names.
    pub params: Vec<String>,
    /// Body statements, in execution order.
    pub body: Vec<Stmt>,
}

/// A top-level module containing functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Module functions. For boardgen this is always a single `main`.
    pub functions: Vec<Function>,
}

impl Module {
    /// The entry function, if present.
    pub fn entry(&self) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == "main")
    }
}

/// Build the program model for a board.
///
/// Appends one initializer call per present peripheral kind, always in
/// GPIO → UART → Timer order regardless of declaration order in the board
/// document. Total over any valid `BoardConfig`.
pub fn build_module(board: &BoardConfig) -> Module {
    let mut body = Vec::new();
    if !board.gpio.is_empty() {
        body.push(call(GPIO_INIT));
    }
    if !board.uart.is_empty() {
        body.push(call(UART_INIT));
    }
    if !board.timer.is_empty() {
        body.push(call(TIMER_INIT));
    }

    Module {
        functions: vec![Function {
            name: "main".to_string(),
            params: Vec::new(),
            body,
        }],
    }
}

fn call(function: &str) -> Stmt {
    Stmt::Call {
        function: function.to_string(),
        args: Vec::new(),
    }
}

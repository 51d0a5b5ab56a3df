//! Target descriptor table for boardgen.
//!
//! A target descriptor ties a short target name to the triple, CPU, and
//! feature string handed to the external toolchain, plus the data layout the
//! IR lowering attaches to a targeted module. The table is fixed at three
//! entries and is never mutated at runtime.

use serde::Serialize;

/// Errors from target descriptor lookups.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// The triple is not known to the backend's layout table.
    #[error("unrecognized target triple: {triple}")]
    UnknownTriple {
        /// The triple that failed to resolve.
        triple: String,
    },
}

/// Result type for target operations.
pub type Result<T> = std::result::Result<T, TargetError>;

/// A complete target descriptor: name, toolchain tuple, and capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetSpec {
    /// Short target name used on the CLI (e.g., "stm32").
    pub name: &'static str,
    /// LLVM-style target triple.
    pub triple: &'static str,
    /// CPU identifier for `-mcpu`.
    pub cpu: &'static str,
    /// Comma-separated feature string for `-mattr` (may be empty).
    pub features: &'static str,
    /// Whether the emitter renders a device-tree fragment for this target.
    pub supports_dts: bool,
    /// Whether the emitter renders the newlib syscalls shim for this target.
    pub needs_syscalls: bool,
}

/// Generic 64-bit Linux host target.
pub const X86: TargetSpec = TargetSpec {
    name: "x86",
    triple: "x86_64-pc-linux-gnu",
    cpu: "generic",
    features: "",
    supports_dts: false,
    needs_syscalls: false,
};

/// STM32-class Cortex-M microcontroller target.
pub const STM32: TargetSpec = TargetSpec {
    name: "stm32",
    triple: "armv7-none-eabi",
    cpu: "cortex-m3",
    features: "+thumb2",
    supports_dts: true,
    needs_syscalls: true,
};

/// i.MX7-class embedded Linux target.
pub const IMX7: TargetSpec = TargetSpec {
    name: "imx7",
    triple: "aarch64-none-linux-gnu",
    cpu: "generic",
    features: "",
    supports_dts: true,
    needs_syscalls: false,
};

/// All supported targets, in CLI presentation order.
pub const TARGETS: [TargetSpec; 3] = [X86, STM32, IMX7];

/// Look up a target descriptor by its short name.
pub fn resolve(name: &str) -> Option<&'static TargetSpec> {
    TARGETS.iter().find(|t| t.name == name)
}

/// Resolve the data layout string for a triple.
///
/// This is the extent of the backend's target knowledge boardgen carries
/// itself; the real lowering of IR to machine code happens in the external
/// tools. A triple outside this table is an error, not a fallback.
pub fn data_layout(triple: &str) -> Result<&'static str> {
    match triple {
        "x86_64-pc-linux-gnu" | "x86_64-unknown-linux-gnu" => Ok(
            "e-m:e-p270:32:32-p271:32:32-p272:64:64-i64:64-i128:128-f80:128-n8:16:32:64-S128",
        ),
        "armv7-none-eabi" => Ok("e-m:e-p:32:32-Fi8-i64:64-v128:64:128-a:0:32-n32-S64"),
        "aarch64-none-linux-gnu" | "aarch64-unknown-linux-gnu" => Ok(
            "e-m:e-p270:32:32-p271:32:32-p272:64:64-i8:8:32-i16:16:32-i64:64-i128:128-n32:64-S128",
        ),
        other => Err(TargetError::UnknownTriple {
            triple: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_known_targets() {
        assert_eq!(resolve("x86").unwrap().triple, "x86_64-pc-linux-gnu");
        assert_eq!(resolve("stm32").unwrap().cpu, "cortex-m3");
        assert_eq!(resolve("imx7").unwrap().triple, "aarch64-none-linux-gnu");
    }

    #[test]
    fn resolve_unknown_target() {
        assert!(resolve("mips").is_none());
    }

    #[test]
    fn dts_capability() {
        assert!(!X86.supports_dts);
        assert!(STM32.supports_dts);
        assert!(IMX7.supports_dts);
    }

    #[test]
    fn syscalls_only_on_stm32() {
        assert!(STM32.needs_syscalls);
        assert!(!X86.needs_syscalls);
        assert!(!IMX7.needs_syscalls);
    }

    #[test]
    fn every_target_has_a_layout() {
        for target in &TARGETS {
            assert!(data_layout(target.triple).is_ok(), "{}", target.triple);
        }
    }

    #[test]
    fn unknown_triple_is_an_error() {
        let err = data_layout("mips-unknown-elf").unwrap_err();
        assert!(err.to_string().contains("mips-unknown-elf"));
    }

    #[test]
    fn feature_strings() {
        assert_eq!(STM32.features, "+thumb2");
        assert!(X86.features.is_empty());
    }
}

//! Board description model for boardgen.
//!
//! A board file is a TOML document naming the board and declaring its
//! peripherals as `[[gpio]]`, `[[uart]]`, and `[[timer]]` tables. The loader
//! parses and validates the document into an immutable [`BoardConfig`];
//! everything downstream (emitter, program builder, backend) consumes that
//! model and never re-reads the file.

mod error;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use error::ConfigError;

/// Result type for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A single GPIO pin declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpioPin {
    /// Pin identifier (e.g., "PA5").
    pub pin: String,
    /// Pin mode (e.g., "output", "input", "alternate").
    pub mode: String,
    /// Pull configuration.
    #[serde(default)]
    pub pull: Option<String>,
    /// Slew rate / drive speed.
    #[serde(default)]
    pub speed: Option<String>,
    /// Alternate function selector.
    #[serde(default)]
    pub alt_func: Option<String>,
}

/// A UART peripheral declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uart {
    /// Instance name (e.g., "usart2").
    pub name: String,
    /// TX pin identifier.
    pub tx: String,
    /// RX pin identifier.
    pub rx: String,
    /// Baud rate in bits per second.
    pub baudrate: u32,
}

/// A timer peripheral declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    /// Instance name (e.g., "tim3").
    pub name: String,
    /// Clock prescaler value.
    pub prescaler: u32,
    /// Auto-reload period.
    pub period: u32,
}

/// The validated, immutable description of a board.
///
/// Each peripheral list may be empty; an empty list means that peripheral
/// kind is absent and its generator must not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Board identifier, used in generated file headers and DTS names.
    pub name: String,
    /// Declared GPIO pins.
    #[serde(default)]
    pub gpio: Vec<GpioPin>,
    /// Declared UART instances.
    #[serde(default)]
    pub uart: Vec<Uart>,
    /// Declared timer instances.
    #[serde(default)]
    pub timer: Vec<Timer>,
}

impl BoardConfig {
    /// Parse a board description from a TOML string and validate it.
    pub fn parse(input: &str) -> Result<Self> {
        let config: BoardConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a board description from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::Validation {
                detail: "board name must not be empty".to_string(),
            });
        }
        for pin in &self.gpio {
            if pin.pin.is_empty() || pin.mode.is_empty() {
                return Err(ConfigError::Validation {
                    detail: format!("gpio entry '{}' needs pin and mode", pin.pin),
                });
            }
        }
        for uart in &self.uart {
            if uart.baudrate == 0 {
                return Err(ConfigError::Validation {
                    detail: format!("uart '{}' has zero baudrate", uart.name),
                });
            }
        }
        for timer in &self.timer {
            if timer.period == 0 {
                return Err(ConfigError::Validation {
                    detail: format!("timer '{}' has zero period", timer.name),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_BOARD: &str = r#"
name = "tst"

[[gpio]]
pin = "PA5"
mode = "output"
speed = "high"

[[uart]]
name = "usart2"
tx = "PA2"
rx = "PA3"
baudrate = 115200

[[timer]]
name = "tim3"
prescaler = 7199
period = 9999
"#;

    #[test]
    fn parse_full_board() {
        let config = BoardConfig::parse(FULL_BOARD).unwrap();
        assert_eq!(config.name, "tst");
        assert_eq!(config.gpio.len(), 1);
        assert_eq!(config.gpio[0].pin, "PA5");
        assert_eq!(config.gpio[0].pull, None);
        assert_eq!(config.uart[0].baudrate, 115200);
        assert_eq!(config.timer[0].prescaler, 7199);
    }

    #[test]
    fn missing_peripheral_sections_default_to_empty() {
        let config = BoardConfig::parse(r#"name = "bare""#).unwrap();
        assert!(config.gpio.is_empty());
        assert!(config.uart.is_empty());
        assert!(config.timer.is_empty());
    }

    #[test]
    fn rejects_empty_name() {
        let err = BoardConfig::parse(r#"name = """#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn rejects_zero_baudrate() {
        let input = r#"
name = "b"
[[uart]]
name = "u1"
tx = "PA2"
rx = "PA3"
baudrate = 0
"#;
        let err = BoardConfig::parse(input).unwrap_err();
        assert!(err.to_string().contains("baudrate"));
    }

    #[test]
    fn rejects_missing_required_field() {
        let input = r#"
name = "b"
[[timer]]
name = "tim1"
prescaler = 10
"#;
        assert!(matches!(
            BoardConfig::parse(input),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn rejects_non_table_document() {
        assert!(BoardConfig::parse("just some text").is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.toml");
        std::fs::write(&path, FULL_BOARD).unwrap();

        let config = BoardConfig::load(&path).unwrap();
        assert_eq!(config.name, "tst");
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = BoardConfig::load(Path::new("/nonexistent/board.toml")).unwrap_err();
        assert!(err.to_string().contains("board.toml"));
    }
}

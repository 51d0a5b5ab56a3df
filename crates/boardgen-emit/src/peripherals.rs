//! Built-in peripheral generators.
//!
//! Each generator gates on its own peripheral list in the board model and
//! renders one header into `include/` and one source into `src/`. Filenames
//! derive from the kind name, so generators write to disjoint files and never
//! interfere with each other.

use crate::error::EmitError;
use crate::registry::{GeneratorContext, PeripheralGenerator};

struct GpioGenerator<'a> {
    ctx: GeneratorContext<'a>,
}

impl PeripheralGenerator for GpioGenerator<'_> {
    fn should_generate(&self) -> bool {
        !self.ctx.board.gpio.is_empty()
    }

    fn generate(&self) -> Result<(), EmitError> {
        self.ctx.render_to(
            "shared/peripherals/gpio.h",
            &self.ctx.dirs.include.join("gpio.h"),
        )?;
        self.ctx
            .render_to("shared/peripherals/gpio.c", &self.ctx.dirs.src.join("gpio.c"))
    }
}

struct UartGenerator<'a> {
    ctx: GeneratorContext<'a>,
}

impl PeripheralGenerator for UartGenerator<'_> {
    fn should_generate(&self) -> bool {
        !self.ctx.board.uart.is_empty()
    }

    fn generate(&self) -> Result<(), EmitError> {
        self.ctx.render_to(
            "shared/peripherals/uart.h",
            &self.ctx.dirs.include.join("uart.h"),
        )?;
        self.ctx
            .render_to("shared/peripherals/uart.c", &self.ctx.dirs.src.join("uart.c"))
    }
}

struct TimerGenerator<'a> {
    ctx: GeneratorContext<'a>,
}

impl PeripheralGenerator for TimerGenerator<'_> {
    // Gates on the timer list itself. An earlier incarnation of this
    // generator keyed off the UART list; that was a copy-paste defect.
    fn should_generate(&self) -> bool {
        !self.ctx.board.timer.is_empty()
    }

    fn generate(&self) -> Result<(), EmitError> {
        self.ctx.render_to(
            "shared/peripherals/timer.h",
            &self.ctx.dirs.include.join("timer.h"),
        )?;
        self.ctx.render_to(
            "shared/peripherals/timer.c",
            &self.ctx.dirs.src.join("timer.c"),
        )
    }
}

/// Constructor for the GPIO generator.
pub fn gpio<'a>(ctx: GeneratorContext<'a>) -> Box<dyn PeripheralGenerator + 'a> {
    Box::new(GpioGenerator { ctx })
}

/// Constructor for the UART generator.
pub fn uart<'a>(ctx: GeneratorContext<'a>) -> Box<dyn PeripheralGenerator + 'a> {
    Box::new(UartGenerator { ctx })
}

/// Constructor for the timer generator.
pub fn timer<'a>(ctx: GeneratorContext<'a>) -> Box<dyn PeripheralGenerator + 'a> {
    Box::new(TimerGenerator { ctx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::OutputDirs;
    use crate::template::Engine;
    use boardgen_config::{BoardConfig, GpioPin, Timer, Uart};
    use boardgen_targets::X86;

    fn board_with(gpio_count: usize, uart_count: usize, timer_count: usize) -> BoardConfig {
        BoardConfig {
            name: "tst".into(),
            gpio: (0..gpio_count)
                .map(|i| GpioPin {
                    pin: format!("PA{i}"),
                    mode: "output".into(),
                    pull: None,
                    speed: None,
                    alt_func: None,
                })
                .collect(),
            uart: (0..uart_count)
                .map(|i| Uart {
                    name: format!("usart{i}"),
                    tx: "PA2".into(),
                    rx: "PA3".into(),
                    baudrate: 115200,
                })
                .collect(),
            timer: (0..timer_count)
                .map(|i| Timer {
                    name: format!("tim{i}"),
                    prescaler: 71,
                    period: 999,
                })
                .collect(),
        }
    }

    fn with_ctx<R>(board: &BoardConfig, f: impl FnOnce(GeneratorContext<'_>) -> R) -> R {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = OutputDirs::new(tmp.path());
        dirs.create_all().unwrap();
        let engine = Engine::new();
        f(GeneratorContext {
            board,
            engine: &engine,
            dirs: &dirs,
            target: &X86,
            generated: "2026-01-01T00:00:00Z",
        })
    }

    #[test]
    fn predicates_follow_their_own_lists() {
        let board = board_with(1, 0, 0);
        with_ctx(&board, |ctx| {
            assert!(gpio(ctx).should_generate());
            assert!(!uart(ctx).should_generate());
            assert!(!timer(ctx).should_generate());
        });
    }

    #[test]
    fn timer_predicate_ignores_uart_list() {
        // Board with UART but no timers: the timer generator must stay quiet.
        let board = board_with(0, 2, 0);
        with_ctx(&board, |ctx| {
            assert!(uart(ctx).should_generate());
            assert!(!timer(ctx).should_generate());
        });

        let board = board_with(0, 0, 1);
        with_ctx(&board, |ctx| {
            assert!(timer(ctx).should_generate());
            assert!(!uart(ctx).should_generate());
        });
    }

    #[test]
    fn gpio_writes_header_and_source() {
        let board = board_with(2, 0, 0);
        with_ctx(&board, |ctx| {
            gpio(ctx).generate().unwrap();
            assert!(ctx.dirs.include.join("gpio.h").is_file());
            assert!(ctx.dirs.src.join("gpio.c").is_file());

            let source = std::fs::read_to_string(ctx.dirs.src.join("gpio.c")).unwrap();
            assert!(source.contains("gpio_init"));
            assert!(source.contains("PA0"));
            assert!(source.contains("PA1"));
        });
    }

    #[test]
    fn generate_is_idempotent() {
        let board = board_with(1, 1, 1);
        with_ctx(&board, |ctx| {
            uart(ctx).generate().unwrap();
            let first = std::fs::read(ctx.dirs.src.join("uart.c")).unwrap();
            uart(ctx).generate().unwrap();
            let second = std::fs::read(ctx.dirs.src.join("uart.c")).unwrap();
            assert_eq!(first, second);
        });
    }
}

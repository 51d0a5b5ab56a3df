//! Built-in template set.
//!
//! Each template renders a complete generated file as lines of text. The
//! banner carries the board name, target, and generation timestamp; apart
//! from that timestamp the output is a pure function of the render context,
//! so re-rendering an unchanged board produces identical bytes.

use crate::error::EmitError;
use crate::template::RenderContext;

pub(crate) fn render_builtin(name: &str, ctx: &RenderContext<'_>) -> Result<String, EmitError> {
    let text = match name {
        "shared/hal.h" => hal_header(ctx),
        "shared/hal.c" => hal_source(ctx),
        "shared/syscalls.c" => syscalls_source(ctx),
        "shared/config.h" => config_header(ctx),
        "shared/main.c" => main_source(ctx),
        "shared/Makefile" => makefile(ctx),
        "shared/peripherals/gpio.h" => peripheral_header(ctx, "gpio", "GPIO pin setup"),
        "shared/peripherals/gpio.c" => gpio_source(ctx),
        "shared/peripherals/uart.h" => peripheral_header(ctx, "uart", "UART instance setup"),
        "shared/peripherals/uart.c" => uart_source(ctx),
        "shared/peripherals/timer.h" => peripheral_header(ctx, "timer", "Timer instance setup"),
        "shared/peripherals/timer.c" => timer_source(ctx),
        "targets/stm32/board.dts" => device_tree(ctx, "st,stm32f103", "soc"),
        "targets/imx7/board.dts" => device_tree(ctx, "fsl,imx7d", "soc"),
        _ => {
            return Err(EmitError::UnknownTemplate {
                name: name.to_string(),
            })
        }
    };
    Ok(text)
}

fn banner(ctx: &RenderContext<'_>, file: &str) -> Vec<String> {
    vec![
        "/*".to_string(),
        format!(
            " * {file} — generated by boardgen for board '{}' (target: {})",
            ctx.board.name, ctx.target.name
        ),
        format!(" * Generated: {}", ctx.generated),
        " * Do not edit; regeneration overwrites this file.".to_string(),
        " */".to_string(),
        String::new(),
    ]
}

fn hal_header(ctx: &RenderContext<'_>) -> String {
    let mut lines = banner(ctx, "hal.h");
    lines.push("#ifndef BOARDGEN_HAL_H".to_string());
    lines.push("#define BOARDGEN_HAL_H".to_string());
    lines.push(String::new());
    lines.push("#include <stdint.h>".to_string());
    lines.push(String::new());
    lines.push("/* Board-level bring-up: clocks, power domains. */".to_string());
    lines.push("void hal_init(void);".to_string());
    lines.push(String::new());
    lines.push("/* Peripheral configuration shims backed by the vendor HAL. */".to_string());
    lines.push(
        "void hal_gpio_config(const char *pin, const char *mode, const char *pull);".to_string(),
    );
    lines.push(
        "void hal_uart_config(const char *name, const char *tx, const char *rx, uint32_t baudrate);"
            .to_string(),
    );
    lines.push(
        "void hal_timer_config(const char *name, uint32_t prescaler, uint32_t period);"
            .to_string(),
    );
    lines.push(String::new());
    lines.push("#endif /* BOARDGEN_HAL_H */".to_string());
    finish(lines)
}

fn hal_source(ctx: &RenderContext<'_>) -> String {
    let mut lines = banner(ctx, "hal.c");
    lines.push("#include \"hal.h\"".to_string());
    lines.push(String::new());
    lines.push("void hal_init(void)".to_string());
    lines.push("{".to_string());
    lines.push(format!(
        "    /* Core clock and bus setup for '{}'. */",
        ctx.board.name
    ));
    lines.push("}".to_string());
    lines.push(String::new());
    lines.push("void hal_gpio_config(const char *pin, const char *mode, const char *pull)".to_string());
    lines.push("{".to_string());
    lines.push("    (void)pin;".to_string());
    lines.push("    (void)mode;".to_string());
    lines.push("    (void)pull;".to_string());
    lines.push("}".to_string());
    lines.push(String::new());
    lines.push(
        "void hal_uart_config(const char *name, const char *tx, const char *rx, uint32_t baudrate)"
            .to_string(),
    );
    lines.push("{".to_string());
    lines.push("    (void)name;".to_string());
    lines.push("    (void)tx;".to_string());
    lines.push("    (void)rx;".to_string());
    lines.push("    (void)baudrate;".to_string());
    lines.push("}".to_string());
    lines.push(String::new());
    lines.push("void hal_timer_config(const char *name, uint32_t prescaler, uint32_t period)".to_string());
    lines.push("{".to_string());
    lines.push("    (void)name;".to_string());
    lines.push("    (void)prescaler;".to_string());
    lines.push("    (void)period;".to_string());
    lines.push("}".to_string());
    finish(lines)
}

fn syscalls_source(ctx: &RenderContext<'_>) -> String {
    let mut lines = banner(ctx, "syscalls.c");
    lines.push("/* Minimal newlib syscall stubs for bare-metal targets. */".to_string());
    lines.push(String::new());
    lines.push("#include <sys/stat.h>".to_string());
    lines.push(String::new());
    lines.push("int _close(int fd)".to_string());
    lines.push("{".to_string());
    lines.push("    (void)fd;".to_string());
    lines.push("    return -1;".to_string());
    lines.push("}".to_string());
    lines.push(String::new());
    lines.push("int _fstat(int fd, struct stat *st)".to_string());
    lines.push("{".to_string());
    lines.push("    (void)fd;".to_string());
    lines.push("    st->st_mode = S_IFCHR;".to_string());
    lines.push("    return 0;".to_string());
    lines.push("}".to_string());
    lines.push(String::new());
    lines.push("int _write(int fd, const char *buf, int len)".to_string());
    lines.push("{".to_string());
    lines.push("    (void)fd;".to_string());
    lines.push("    (void)buf;".to_string());
    lines.push("    return len;".to_string());
    lines.push("}".to_string());
    lines.push(String::new());
    lines.push("void *_sbrk(int incr)".to_string());
    lines.push("{".to_string());
    lines.push("    extern char _end;".to_string());
    lines.push("    static char *heap_end = 0;".to_string());
    lines.push("    char *prev;".to_string());
    lines.push("    if (heap_end == 0)".to_string());
    lines.push("        heap_end = &_end;".to_string());
    lines.push("    prev = heap_end;".to_string());
    lines.push("    heap_end += incr;".to_string());
    lines.push("    return prev;".to_string());
    lines.push("}".to_string());
    finish(lines)
}

fn config_header(ctx: &RenderContext<'_>) -> String {
    let mut lines = banner(ctx, "config.h");
    lines.push("#ifndef BOARDGEN_CONFIG_H".to_string());
    lines.push("#define BOARDGEN_CONFIG_H".to_string());
    lines.push(String::new());
    for meta in ctx.peripherals {
        lines.push(format!("#define BOARD_HAS_{} 1", meta.name.to_uppercase()));
    }
    if ctx.peripherals.is_empty() {
        lines.push("/* No peripherals declared for this board. */".to_string());
    }
    lines.push(String::new());
    for meta in ctx.peripherals {
        lines.push(format!("#include \"{}\"", meta.header));
    }
    if !ctx.peripherals.is_empty() {
        lines.push(String::new());
    }
    lines.push("#endif /* BOARDGEN_CONFIG_H */".to_string());
    finish(lines)
}

fn main_source(ctx: &RenderContext<'_>) -> String {
    let mut lines = banner(ctx, "main.c");
    lines.push("#include \"hal.h\"".to_string());
    lines.push("#include \"config.h\"".to_string());
    lines.push(String::new());
    lines.push("int main(void)".to_string());
    lines.push("{".to_string());
    lines.push("    hal_init();".to_string());
    for meta in ctx.peripherals {
        lines.push(format!("    {}();", meta.init_fn));
    }
    lines.push("    return 0;".to_string());
    lines.push("}".to_string());
    finish(lines)
}

fn makefile(ctx: &RenderContext<'_>) -> String {
    let mut srcs = vec!["src/hal.c".to_string()];
    if ctx.target.needs_syscalls {
        srcs.push("src/syscalls.c".to_string());
    }
    for meta in ctx.peripherals {
        srcs.push(format!("src/{}.c", meta.name));
    }
    srcs.push("src/main.c".to_string());

    let mut lines = vec![
        format!(
            "# Makefile — generated by boardgen for board '{}' (target: {})",
            ctx.board.name, ctx.target.name
        ),
        format!("# Generated: {}", ctx.generated),
        String::new(),
        "CC      := clang".to_string(),
        format!("TRIPLE  := {}", ctx.target.triple),
        "CFLAGS  := -target $(TRIPLE) -Iinclude -Wall -O2".to_string(),
        format!("SRCS    := {}", srcs.join(" ")),
        "OBJS    := $(patsubst src/%.c,build/%.o,$(SRCS))".to_string(),
        String::new(),
        "all: bin/firmware.elf".to_string(),
        String::new(),
        "build/%.o: src/%.c".to_string(),
        "\t$(CC) $(CFLAGS) -c $< -o $@".to_string(),
        String::new(),
        "bin/firmware.elf: $(OBJS)".to_string(),
        "\t$(CC) -target $(TRIPLE) $(OBJS) -o $@".to_string(),
        String::new(),
        "clean:".to_string(),
        "\trm -f build/*.o bin/firmware.elf".to_string(),
        String::new(),
        ".PHONY: all clean".to_string(),
    ];
    lines.push(String::new());
    lines.join("\n")
}

fn peripheral_header(ctx: &RenderContext<'_>, kind: &str, summary: &str) -> String {
    let mut lines = banner(ctx, &format!("{kind}.h"));
    let guard = format!("BOARDGEN_{}_H", kind.to_uppercase());
    lines.push(format!("#ifndef {guard}"));
    lines.push(format!("#define {guard}"));
    lines.push(String::new());
    lines.push(format!("/* {summary}. */"));
    lines.push(format!("void {kind}_init(void);"));
    lines.push(String::new());
    lines.push(format!("#endif /* {guard} */"));
    finish(lines)
}

fn gpio_source(ctx: &RenderContext<'_>) -> String {
    let mut lines = banner(ctx, "gpio.c");
    lines.push("#include \"gpio.h\"".to_string());
    lines.push("#include \"hal.h\"".to_string());
    lines.push(String::new());
    lines.push("void gpio_init(void)".to_string());
    lines.push("{".to_string());
    for pin in &ctx.board.gpio {
        let pull = pin.pull.as_deref().unwrap_or("none");
        lines.push(format!(
            "    hal_gpio_config(\"{}\", \"{}\", \"{}\");",
            pin.pin, pin.mode, pull
        ));
    }
    lines.push("}".to_string());
    finish(lines)
}

fn uart_source(ctx: &RenderContext<'_>) -> String {
    let mut lines = banner(ctx, "uart.c");
    lines.push("#include \"uart.h\"".to_string());
    lines.push("#include \"hal.h\"".to_string());
    lines.push(String::new());
    lines.push("void uart_init(void)".to_string());
    lines.push("{".to_string());
    for uart in &ctx.board.uart {
        lines.push(format!(
            "    hal_uart_config(\"{}\", \"{}\", \"{}\", {}U);",
            uart.name, uart.tx, uart.rx, uart.baudrate
        ));
    }
    lines.push("}".to_string());
    finish(lines)
}

fn timer_source(ctx: &RenderContext<'_>) -> String {
    let mut lines = banner(ctx, "timer.c");
    lines.push("#include \"timer.h\"".to_string());
    lines.push("#include \"hal.h\"".to_string());
    lines.push(String::new());
    lines.push("void timer_init(void)".to_string());
    lines.push("{".to_string());
    for timer in &ctx.board.timer {
        lines.push(format!(
            "    hal_timer_config(\"{}\", {}U, {}U);",
            timer.name, timer.prescaler, timer.period
        ));
    }
    lines.push("}".to_string());
    finish(lines)
}

fn device_tree(ctx: &RenderContext<'_>, compatible: &str, bus: &str) -> String {
    let mut lines = vec![
        "/dts-v1/;".to_string(),
        String::new(),
        format!("/* Device tree for '{}' — generated by boardgen */", ctx.board.name),
        format!("/* Generated: {} */", ctx.generated),
        String::new(),
        "/ {".to_string(),
        format!("    model = \"{}\";", ctx.board.name),
        format!("    compatible = \"{compatible}\";"),
        String::new(),
        format!("    {bus} {{"),
    ];

    if !ctx.board.gpio.is_empty() {
        lines.push("        gpio {".to_string());
        for pin in &ctx.board.gpio {
            lines.push(format!(
                "            pin-{} {{ mode = \"{}\"; }};",
                pin.pin.to_lowercase(),
                pin.mode
            ));
        }
        lines.push("        };".to_string());
    }

    for uart in &ctx.board.uart {
        lines.push(format!("        serial-{} {{", uart.name));
        lines.push(format!("            current-speed = <{}>;", uart.baudrate));
        lines.push(format!("            tx-pin = \"{}\";", uart.tx));
        lines.push(format!("            rx-pin = \"{}\";", uart.rx));
        lines.push("        };".to_string());
    }

    for timer in &ctx.board.timer {
        lines.push(format!("        timer-{} {{", timer.name));
        lines.push(format!("            prescaler = <{}>;", timer.prescaler));
        lines.push(format!("            period = <{}>;", timer.period));
        lines.push("        };".to_string());
    }

    lines.push("    };".to_string());
    lines.push("};".to_string());
    finish(lines)
}

fn finish(mut lines: Vec<String>) -> String {
    lines.push(String::new());
    lines.join("\n")
}

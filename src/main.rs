use anyhow::{Context, Result};
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use status_block::{Console, Layout, StatusBlock};
use std::thread;
use std::time::Duration;

const DEFAULT_LINES: usize = 3;
const DEFAULT_STEPS: usize = 20;

fn parse_arg(args: &[String], index: usize, default: usize) -> Result<usize> {
    match args.get(index) {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("expected a number, got {arg:?}")),
        None => Ok(default),
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let lines = parse_arg(&args, 1, DEFAULT_LINES)?;
    let steps = parse_arg(&args, 2, DEFAULT_STEPS)?;

    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    let logger = TermLogger::new(
        LevelFilter::Info,
        config,
        TerminalMode::Stdout,
        ColorChoice::Auto,
    );
    let hook = Console::new(logger)
        .install(LevelFilter::Info)
        .context("failed to install logger")?;

    let mut block = StatusBlock::stdout(Layout::Fixed(lines));
    block.start(&hook)?;
    for step in 0..=steps {
        for line in 0..lines {
            let percent = (step * 100 / steps.max(1) + line * 7).min(100);
            block.update(line, format!("worker {line}: {percent:>3}%"))?;
        }
        if step % 5 == 0 {
            log::info!("checkpoint {step} of {steps}");
        }
        thread::sleep(Duration::from_millis(100));
    }
    block.stop();
    println!();
    log::info!("done");
    Ok(())
}

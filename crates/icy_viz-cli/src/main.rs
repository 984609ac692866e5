//! viz - Show images in the terminal
//!
//! A command-line tool for displaying PNG, JPEG and (animated) GIF images
//! with 256-color ANSI escapes, or exporting them as a shell script.

use clap::Parser;
use icy_viz::{render, RenderOptions, RenderTarget, ScriptSink, Sink, TerminalSink, Tput, Xterm256};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "viz")]
#[command(author = "Mike Krüger <mkrueger@posteo.de>")]
#[command(version)]
#[command(about = "Show images and animated GIFs in the terminal", long_about = None)]
struct Cli {
    /// Input image file (PNG, JPEG, GIF)
    input: PathBuf,

    /// Export to an executable shell script instead of drawing,
    /// e.g. to show the picture in a login banner
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// How often to play an animated GIF (0 shows the first picture only)
    #[arg(short, long, default_value = "1")]
    loop_count: u32,

    /// Speed up (< 1.0) or slow down (> 1.0) animations
    #[arg(short, long, default_value = "1.0")]
    delay_multiplier: f64,

    /// Output width in characters instead of fitting the terminal.
    /// Useful over SSH where resizes aren't picked up.
    #[arg(short, long, default_value = "0")]
    width: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let options = RenderOptions {
        loop_count: cli.loop_count,
        delay_multiplier: cli.delay_multiplier,
        user_width: cli.width,
    };

    let target = RenderTarget::open(&cli.input, &options, &Tput, &Xterm256)
        .map_err(|e| format!("Failed to load '{}': {}", cli.input.display(), e))?;

    log::info!(
        "Showing '{}' ({}x{}, {} frame(s), {} loop(s))",
        cli.input.display(),
        target.width(),
        target.height(),
        target.frames().len(),
        target.loop_count()
    );

    let mut sink: Box<dyn Sink> = match &cli.export {
        Some(path) => Box::new(ScriptSink::new(path)),
        None => Box::new(TerminalSink::new(io::stdout().lock())),
    };
    render(&target, sink.as_mut())?;

    if let Some(path) = &cli.export {
        eprintln!("Written script to '{}'", path.display());
    }

    Ok(())
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Chernomap simulation window.

mod config;
mod simulation;

use std::{
    io::{self, BufRead, Write},
    path::Path,
};

use anyhow::{Context, Result};
use chernomap_rendering::{BackgroundPresentation, Color, Presentation, RenderingBackend};
use chernomap_rendering_macroquad::MacroquadBackend;
use chernomap_system_bootstrap::{Bootstrap, BootstrapError, EXIT_PROMPT};
use chernomap_world::World;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use self::{
    config::{ConfigSource, CONFIG_FILE},
    simulation::SimulationDriver,
};

const WINDOW_TITLE: &str = "Chernomap";

/// Entry point for the Chernomap command-line interface.
fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let bootstrap = Bootstrap::default();
    let background = match bootstrap.locate_background() {
        Ok(path) => path.to_path_buf(),
        Err(failure) => {
            error!(%failure, "preflight failed");
            return report_and_wait(&failure);
        }
    };

    let (file_config, source) = config::load(Path::new(CONFIG_FILE))?;
    match &source {
        ConfigSource::Defaults => info!("using built-in configuration"),
        ConfigSource::File(path) => info!(path = %path.display(), "configuration loaded"),
    }

    let mut simulation = file_config.simulation;
    let seed = *simulation.seed.get_or_insert_with(rand::random);
    info!(seed, "simulation seeded");

    let presentation_config = file_config.presentation;
    let world = World::new(simulation).context("invalid simulation configuration")?;
    let mut driver = SimulationDriver::new(world, &presentation_config);

    let presentation = Presentation::new(
        WINDOW_TITLE,
        (
            presentation_config.window_width,
            presentation_config.window_height,
        ),
        Color::from_rgb_u8(255, 255, 255),
        driver.initial_scene(),
    )
    .with_background(BackgroundPresentation::new(background));

    MacroquadBackend::new()
        .with_vsync(presentation_config.vsync)
        .run(presentation, move |dt, scene| {
            let _ = driver.advance(dt, scene);
        })
}

fn report_and_wait(failure: &BootstrapError) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{failure}")?;
    write!(stdout, "{EXIT_PROMPT}")?;
    stdout.flush()?;

    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

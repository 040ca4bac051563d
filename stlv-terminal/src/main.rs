/// stlv - binary STL viewer for the terminal
///
/// Usage:
///   stlv                       prompt for a file
///   stlv model.stl             model on a bed of its own size
///   stlv model.stl MODE        render mode (1-6, -1 or a name), no bed
///   stlv model.stl X Y [Z]     model on a bed of the given size
use anyhow::{Context, Result};
use clap::Parser;
use stlv_core::load_scene;
use stlv_terminal::cli::{self, Cli};
use stlv_terminal::{TerminalApp, CONTROLS};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Logs go to stderr so they stay out of the rendered frame
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Cli::parse();
    let view = args.view_options()?;

    let path = match args.file.as_deref() {
        Some(name) => cli::require_model_path(name)?,
        None => {
            let stdin = std::io::stdin();
            cli::prompt_for_model(&mut stdin.lock(), &mut std::io::stdout())?
        }
    };

    println!("Reading.... {}", path.display());
    let scene = load_scene(&path, &view, &mut rand::rng())
        .with_context(|| format!("failed to load {}", path.display()))?;

    let dimensions = scene.dimensions();
    println!("Num. Faces: {}", scene.mesh.len());
    println!("xDim: {}\nyDim: {}\nzDim: {}", dimensions.x, dimensions.y, dimensions.z);
    println!("{CONTROLS}");
    info!(mode = ?scene.mode, bed = scene.bed.is_some(), "starting viewer");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(scene)?;
    app.run()?;

    Ok(())
}

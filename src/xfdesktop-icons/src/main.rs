//! xfdesktop-icons - desktop icon grid daemon
//!
//! Shows the entries of a desktop directory on an icon grid and keeps
//! their positions across restarts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xfdesktop_icons::config::Config;
use xfdesktop_icons::daemon::IconDaemon;
use xfdesktop_icons::positions::PositionStore;
use xfdesktop_icons::renderer::Painter;

/// xfdesktop-icons - Desktop icon grid
#[derive(Parser, Debug)]
#[command(name = "xfdesktop-icons")]
#[command(version)]
#[command(about = "Desktop icon grid with persistent icon positions")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Desktop directory to display icons for
    #[arg(short, long)]
    desktop: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Print the resolved grid and exit
    #[arg(long)]
    dump_layout: bool,

    /// Render one frame to a PNG file and exit
    #[arg(long, value_name = "PNG")]
    snapshot: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        "xfdesktop_icons=debug,warn"
    } else {
        "xfdesktop_icons=info,warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    info!("xfdesktop-icons v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load(args.config.as_deref())?;

    let desktop_dir = args
        .desktop
        .or_else(dirs::desktop_dir)
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join("Desktop"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
    info!("Desktop directory: {}", desktop_dir.display());

    let positions = match PositionStore::default_path() {
        Some(path) => PositionStore::open(path),
        None => PositionStore::empty(desktop_dir.join(".xfdesktop-icon-positions.toml")),
    };

    let mut daemon = IconDaemon::new(config, desktop_dir, positions, args.width, args.height)?;
    daemon.process_view_events();

    if args.dump_layout {
        dump_layout(&daemon);
        return Ok(());
    }

    if let Some(path) = args.snapshot {
        daemon.refresh_icons();
        let frame = Painter::new(daemon.config()).render_frame(daemon.view())?;
        frame
            .save_png(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {}", path.display());
        return Ok(());
    }

    daemon.run()
}

fn dump_layout(daemon: &IconDaemon) {
    let grid = daemon.view().grid();
    println!(
        "{} rows x {} columns, slot size {}",
        grid.nrows(),
        grid.ncols(),
        daemon.view().slot_size()
    );

    for (label, slot) in daemon.layout() {
        match slot {
            Some(slot) => println!("  ({:>3}, {:>3})  {}", slot.row, slot.col, label),
            None => println!("  (unplaced)  {}", label),
        }
    }
}

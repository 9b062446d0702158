use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use plot_locator::acquisition::{AcquisitionOutcome, AcquisitionSession, ReplaySource};
use plot_locator::config::Config;
use plot_locator::geography::ReferenceGeography;
use plot_locator::location::{
    check_coordinates, DetectedLocation, GeospatialResolver, LocateError, LocationAssembler, LocationSource,
    LocationStore,
};
use plot_locator::server::{self, AppState};

/// Plot Locator: farm plot location from GPS, photos or manual entry.
///
/// Resolves coordinates into region, district and locality with a
/// confidence score. The result is printed as JSON on stdout.
///
/// Examples:
///   plotloc --lat 17.385 --lon 78.4867
///   plotloc --image field.jpg
///   plotloc --fixes fixes.json --realtime
///   plotloc --stored
///   plotloc --serve --port 3000
#[derive(Parser)]
#[command(name = "plotloc", version, about, long_about = None)]
struct Cli {
    /// Latitude (-90 to 90) for a manual location.
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    lat: Option<f64>,

    /// Longitude (-180 to 180) for a manual location.
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,

    /// Read the location from a photo's EXIF GPS block.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Run a GPS session over a JSON file of fixes and errors.
    #[arg(long)]
    fixes: Option<PathBuf>,

    /// Deliver fixes at their timestamps instead of all at once.
    #[arg(long, requires = "fixes")]
    realtime: bool,

    /// Print the stored location.
    #[arg(long)]
    stored: bool,

    /// List the reference regions.
    #[arg(long)]
    regions: bool,

    /// Start the HTTP API.
    #[arg(long)]
    serve: bool,

    /// Server host (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides config).
    #[arg(long)]
    port: Option<u16>,

    /// Config file. Defaults to ~/.plot_locator/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Geography dataset (JSON) replacing the built-in one.
    #[arg(long)]
    geography: Option<PathBuf>,

    /// Do not save the result as the stored location.
    #[arg(long)]
    no_save: bool,
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // ── Config and logging ──────────────────────────────────────

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .unwrap_or_else(|e| fail(e));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // ── Geography ───────────────────────────────────────────────

    let geography = match cli.geography.as_ref().or(config.storage.geography.as_ref()) {
        Some(path) => ReferenceGeography::load_from(path).unwrap_or_else(|e| fail(e)),
        None => ReferenceGeography::builtin(),
    };

    if cli.regions {
        print_json(&geography.regions);
        return;
    }

    let assembler = LocationAssembler::new(Arc::new(GeospatialResolver::new(Arc::new(geography))));
    let store_path = config.storage.location.clone().unwrap_or_else(LocationStore::default_path);

    // ── Server mode ─────────────────────────────────────────────

    if cli.serve {
        let store = (!cli.no_save).then(|| LocationStore::load_from(store_path));
        let state = Arc::new(AppState::new(assembler, config.acquisition.clone(), store));
        let host = cli.host.as_deref().unwrap_or(&config.server.host);
        let port = cli.port.unwrap_or(config.server.port);
        if let Err(e) = server::start(host, port, state).await {
            fail(format!("Server on {}:{}: {}", host, port, e));
        }
        return;
    }

    // ── Detect ──────────────────────────────────────────────────

    let location = detect(&cli, &config, &assembler, &store_path).await;

    eprintln!("  {}", location.display_line());
    eprintln!("  {}", location.validation_note);

    if !cli.no_save && location.source != LocationSource::Stored {
        LocationStore::load_from(store_path).put(&location);
    }

    print_json(&location);
}

async fn detect(cli: &Cli, config: &Config, assembler: &LocationAssembler, store_path: &Path) -> DetectedLocation {
    // Priority: --image > --fixes > --stored > --lat/--lon

    if let Some(path) = &cli.image {
        return match assembler.from_image_file(path) {
            Ok(Some(loc)) => loc,
            Ok(None) => fail(format!("{} '{}'", LocateError::NoGpsInImage, path.display())),
            Err(e) => fail(e),
        };
    }

    if let Some(path) = &cli.fixes {
        let source = ReplaySource::load(path)
            .unwrap_or_else(|e| fail(format!("Cannot read fixes '{}': {}", path.display(), e)))
            .realtime(cli.realtime);
        debug!(path = %path.display(), events = source.events().len(), "Loaded GPS replay");
        return acquire(config, assembler, &source).await;
    }

    if cli.stored {
        return LocationStore::load_from(store_path.to_path_buf())
            .get()
            .unwrap_or_else(|| fail("No stored location (or it is older than 30 days)"));
    }

    if let (Some(lat), Some(lon)) = (cli.lat, cli.lon) {
        check_coordinates(lat, lon).unwrap_or_else(|e| fail(e));
        return assembler.manual(lat, lon);
    }

    eprintln!("Error: No location source specified.");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  plotloc --lat 17.385 --lon 78.4867");
    eprintln!("  plotloc --image field.jpg");
    eprintln!("  plotloc --fixes fixes.json [--realtime]");
    eprintln!("  plotloc --stored");
    eprintln!("  plotloc --serve");
    std::process::exit(1);
}

/// Run a GPS session with live progress on stderr; Ctrl+C cancels.
async fn acquire(config: &Config, assembler: &LocationAssembler, source: &ReplaySource) -> DetectedLocation {
    let mut session = AcquisitionSession::new(config.acquisition.clone());

    let mut updates = session.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(u) = updates.recv().await {
            eprintln!("  \u{1F6F0}\u{FE0F}  [{:>3}%] {:<11} {}", u.progress, u.status, u.message);
            if u.status.is_terminal() {
                break;
            }
        }
    });

    let canceller = session.canceller();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    let outcome = session.start(source).await;
    drop(session);
    let _ = printer.await;

    match outcome {
        AcquisitionOutcome::Ready(fix) => assembler.from_gps(&fix),
        AcquisitionOutcome::Failed(e) => fail(e),
        AcquisitionOutcome::Cancelled => {
            eprintln!("  Acquisition cancelled.");
            std::process::exit(130);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(e),
    }
}

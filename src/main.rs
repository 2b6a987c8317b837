use anyhow::{Context, Result};
use clap::Parser;
use proseflow_site::{
    config::Config,
    download::{
        DetectionResult, DownloadCatalog, DownloadPanel, FALLBACK_VERSION, RELEASE_NOTES_URL,
        build_recommendation,
    },
    galaxy::{GalaxyParams, GalaxyRenderer, PixelSurface, Rgba, TickScheduler},
    platform::{ClientEnvironment, FixedRendererProbe, GraphicsProbe, NoGraphicsProbe, Platform},
    release::{RepoId, fetch_latest_version},
};
use log::error;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;

/// proseflow-site - ProseFlow download site tooling
///
/// Runs the site's platform detection, download catalog, release lookup
/// and particle field outside a browser.
///
/// If the GITHUB_TOKEN environment variable is set, it is used to
/// authenticate release lookups.
#[derive(Parser, Debug)]
#[command(author, version = env!("PROSEFLOW_SITE_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    api_url: Option<String>,

    /// Repository the releases come from
    #[arg(
        long,
        env = "PROSEFLOW_REPO",
        value_name = "OWNER/REPO",
        global = true
    )]
    repo: Option<RepoId>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Recommend a download for a client platform
    Detect(DetectArgs),

    /// List every download
    Catalog(CatalogArgs),

    /// Print the latest released version
    Version,

    /// Render the particle field to a PNG image
    Galaxy(GalaxyArgs),
}

#[derive(clap::Args, Debug)]
struct DetectArgs {
    /// Reported platform string, e.g. "MacIntel" or "Linux x86_64"
    #[arg(long, default_value = "")]
    platform: String,

    /// Reported user-agent string
    #[arg(long = "user-agent", default_value = "")]
    user_agent: String,

    /// Renderer string of the client's graphics context, if known
    #[arg(long = "gpu-renderer", value_name = "RENDERER")]
    gpu_renderer: Option<String>,

    /// Override the detected architecture
    #[arg(long, value_name = "ARCH")]
    arch: Option<String>,

    /// Print the full detection result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args, Debug)]
struct CatalogArgs {
    /// Print the catalog as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args, Debug)]
struct GalaxyArgs {
    /// Container width in CSS pixels
    #[arg(long, default_value_t = 800, value_parser = clap::value_parser!(u32).range(16..=8192))]
    width: u32,

    /// Container height in CSS pixels
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u32).range(16..=8192))]
    height: u32,

    /// Device pixel ratio (0.25 to 4)
    #[arg(long, default_value_t = 1.0, value_parser = parse_device_pixel_ratio)]
    dpr: f64,

    /// Number of frames to run after the first paint
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Seed for the particle layout
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Output PNG file
    #[arg(long, value_name = "FILE")]
    out: PathBuf,
}

fn parse_device_pixel_ratio(s: &str) -> Result<f64, String> {
    let dpr: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if (0.25..=4.0).contains(&dpr) {
        Ok(dpr)
    } else {
        Err(format!("{} is not between 0.25 and 4", s))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Detect(args) => detect(args)?,
        Commands::Catalog(args) => catalog(args)?,
        Commands::Version => {
            let version = match Config::from_env(cli.api_url, cli.repo) {
                Ok(config) => fetch_latest_version(&config.source, &config.repo).await,
                Err(e) => {
                    error!("Release lookup unavailable: {:#}", e);
                    FALLBACK_VERSION.to_string()
                }
            };
            println!("{}", version);
        }
        Commands::Galaxy(args) => galaxy(args)?,
    }
    Ok(())
}

fn detect(args: DetectArgs) -> Result<()> {
    let env = ClientEnvironment::new(args.platform, args.user_agent);
    let probe: Box<dyn GraphicsProbe> = match args.gpu_renderer {
        Some(renderer) => Box::new(FixedRendererProbe::new(renderer)),
        None => Box::new(NoGraphicsProbe),
    };
    let catalog = DownloadCatalog::builtin();

    let result = match args.arch {
        Some(arch) => {
            let platform = Platform::detect(&env, probe.as_ref());
            build_recommendation(platform.os, &arch, catalog)
        }
        None => DetectionResult::detect(&env, probe.as_ref(), catalog),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let mut panel = DownloadPanel::new(catalog);
        panel.apply_detection(&result);
        println!("{}", panel.button_text());
        println!("{}", panel.button_link());
    }
    Ok(())
}

fn catalog(args: CatalogArgs) -> Result<()> {
    let catalog = DownloadCatalog::builtin();

    if args.json {
        println!("{}", serde_json::to_string_pretty(catalog)?);
        return Ok(());
    }

    for entry in catalog.entries() {
        println!("{} [{}]", entry.os, entry.icon);
        for variant in &entry.architectures {
            println!("  {} ({})", variant.name, variant.arch);
            for artifact in variant.downloads.values() {
                println!(
                    "    {} {}  {}",
                    artifact.label, artifact.extension, artifact.url
                );
            }
        }
    }
    println!("Release notes: {}", RELEASE_NOTES_URL);
    Ok(())
}

fn galaxy(args: GalaxyArgs) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let Some(mut renderer) = GalaxyRenderer::mount(
        Some(PixelSurface::new()),
        TickScheduler::default(),
        GalaxyParams::default(),
        &mut rng,
    ) else {
        return Ok(());
    };

    renderer.on_resize(f64::from(args.width), f64::from(args.height), args.dpr);
    for _ in 0..args.frames {
        let Some(handle) = renderer.pending_frame() else {
            break;
        };
        renderer.on_frame(handle);
    }

    renderer
        .surface()
        .save_png(&args.out, Rgba::rgb(0, 0, 0))
        .context("Failed to save the rendered frame")?;

    let (w, h) = renderer.surface().pixel_size();
    renderer.unmount();
    println!("Wrote {}x{} frame to {}", w, h, args.out.display());
    Ok(())
}

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use gameframe::{
    AiGateway, BoundingBox, CpuCompositor, DirectorySink, EnhancedImage, FrameResult,
    GeminiConfig, GeminiGateway, OfflineGateway, Studio, StudioConfig, Vec2,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gameframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Frame a photo and write the PNG.
    Compose(ComposeArgs),
    /// Print the detected face box as JSON (`null` when none is found).
    Detect(DetectArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Input photo (PNG, JPEG, WebP, ...).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path; must end in `.png`.
    #[arg(long)]
    out: PathBuf,

    /// Zoom factor, clamped to [1, max_zoom].
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,

    /// Horizontal pan in design pixels.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pan_x: f64,

    /// Vertical pan in design pixels.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pan_y: f64,

    /// Run the AI enhancement before exporting.
    #[arg(long, default_value_t = false)]
    enhance: bool,

    /// Skip face detection and use a center crop.
    #[arg(long, default_value_t = false)]
    no_detect: bool,

    /// Also write the preview-resolution render to this path.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Studio config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct DetectArgs {
    /// Input photo.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Studio config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Gateway wrapper that never asks for a face.
struct CenterCrop<G>(G);

impl<G: AiGateway> AiGateway for CenterCrop<G> {
    async fn detect_face(&self, _image: &[u8], _mime_type: &str) -> FrameResult<Option<BoundingBox>> {
        Ok(None)
    }

    async fn enhance(
        &self,
        image: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> FrameResult<EnhancedImage> {
        self.0.enhance(image, mime_type, instruction).await
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gameframe=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args).await,
        Command::Detect(args) => cmd_detect(args).await,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<StudioConfig> {
    Ok(match path {
        Some(path) => StudioConfig::load(path)?,
        None => StudioConfig::default(),
    })
}

fn gemini(config: &StudioConfig) -> anyhow::Result<GeminiGateway> {
    let gemini = GeminiConfig::from_env(&config.gateway)?;
    Ok(GeminiGateway::new(gemini)?)
}

async fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    let file_name = args
        .out
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("output path '{}' has no file name", args.out.display()))?;
    let is_png = args
        .out
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if !is_png {
        anyhow::bail!("output path '{}' must end in .png", args.out.display());
    }
    config.export_file_name = file_name.to_string();
    let out_dir = args
        .out
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let needs_network = args.enhance || !args.no_detect;
    match (needs_network, args.no_detect) {
        (false, _) => compose(args, config, out_dir, OfflineGateway).await,
        (true, true) => {
            let gateway = CenterCrop(gemini(&config)?);
            compose(args, config, out_dir, gateway).await
        }
        (true, false) => {
            let gateway = gemini(&config)?;
            compose(args, config, out_dir, gateway).await
        }
    }
}

async fn compose<G: AiGateway>(
    args: ComposeArgs,
    config: StudioConfig,
    out_dir: PathBuf,
    gateway: G,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(&args.in_path)
        .await
        .with_context(|| format!("read photo '{}'", args.in_path.display()))?;

    let compositor = CpuCompositor::new(config.render_settings()?, config.frame_graphic()?);
    let mut studio = Studio::new(
        config,
        gateway,
        Box::new(compositor),
        DirectorySink::new(out_dir),
    )
    .with_live_preview(false);

    studio.upload(bytes, None).await?;
    match studio.session().bbox() {
        Some(bbox) => tracing::info!(?bbox, "face found"),
        None => tracing::info!("no face found; using center crop"),
    }

    if args.enhance {
        studio.enhance().await?;
    }
    studio.set_zoom(args.zoom).await?;
    studio.set_pan(Vec2::new(args.pan_x, args.pan_y)).await?;

    if let Some(preview_path) = &args.preview {
        let Some(frame) = studio.preview()? else {
            anyhow::bail!("nothing to preview");
        };
        let file = gameframe::encode_png(frame, "preview.png")?;
        gameframe::export::sink::write_file(preview_path, &file.bytes)
            .with_context(|| format!("write preview '{}'", preview_path.display()))?;
        eprintln!("wrote {}", preview_path.display());
    }

    let report = studio.export().await?;
    match &report.path {
        Some(path) => eprintln!("wrote {} ({} bytes)", path.display(), report.byte_len),
        None => eprintln!("exported {} ({} bytes)", report.file_name, report.byte_len),
    }
    Ok(())
}

async fn cmd_detect(args: DetectArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let bytes = tokio::fs::read(&args.in_path)
        .await
        .with_context(|| format!("read photo '{}'", args.in_path.display()))?;
    let image = gameframe::SourceImage::from_bytes(bytes, None)?;

    let gateway = gemini(&config)?;
    let bbox = gateway
        .detect_face(image.bytes.as_slice(), &image.mime_type)
        .await?;
    println!("{}", serde_json::to_string(&bbox)?);
    Ok(())
}

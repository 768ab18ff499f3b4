use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "vesseltrace", version)]
struct Cli {
    /// Log at debug level unless VESSELTRACE_LOG or RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render a sequence of frames, moving the time window each frame.
    Sweep(SweepArgs),
    /// Print the assembled shader program of a layer.
    Shaders(ShadersArgs),
    /// Report the track segment under a pixel.
    Pick(PickArgs),
}

#[derive(Args, Debug, Clone, Copy, Default)]
struct WindowArgs {
    /// Override every layer's window start (epoch ms).
    #[arg(long = "start")]
    start_time: Option<i64>,

    /// Override every layer's window end (epoch ms).
    #[arg(long = "end")]
    end_time: Option<i64>,

    /// Override every layer's highlight start (epoch ms).
    #[arg(long)]
    highlight_start: Option<i64>,

    /// Override every layer's highlight end (epoch ms).
    #[arg(long)]
    highlight_end: Option<i64>,
}

impl WindowArgs {
    fn overrides(self) -> vesseltrace::SceneOverrides {
        vesseltrace::SceneOverrides {
            start_time: self.start_time,
            end_time: self.end_time,
            highlight_start: self.highlight_start,
            highlight_end: self.highlight_end,
        }
    }
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    window: WindowArgs,
}

#[derive(Parser, Debug)]
struct SweepArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory for `frame_NNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Number of frames.
    #[arg(long, default_value_t = 10)]
    frames: usize,

    /// Window shift per frame (ms).
    #[arg(long, default_value_t = 500_000_000)]
    step: i64,

    #[command(flatten)]
    window: WindowArgs,
}

#[derive(Parser, Debug)]
struct ShadersArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Layer id; defaults to the first layer.
    #[arg(long)]
    layer: Option<String>,

    #[arg(long, value_enum, default_value_t = DialectChoice::Wgsl)]
    dialect: DialectChoice,
}

#[derive(Parser, Debug)]
struct PickArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long)]
    x: f64,

    #[arg(long)]
    y: f64,

    /// Extra pick tolerance in pixels.
    #[arg(long, default_value_t = 0.0)]
    radius: f64,

    #[command(flatten)]
    window: WindowArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DialectChoice {
    Wgsl,
    Glsl,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Sweep(args) => cmd_sweep(args),
        Command::Shaders(args) => cmd_shaders(args),
        Command::Pick(args) => cmd_pick(args),
    }
}

fn init_logging(verbose: bool) {
    let filter = std::env::var("VESSELTRACE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| EnvFilter::new(if verbose { "debug" } else { "info" }),
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set global default subscriber: {err}");
    }
}

fn load_scene(path: &Path, window: WindowArgs) -> anyhow::Result<vesseltrace::Scene> {
    let mut scene = vesseltrace::Scene::from_path(path)
        .with_context(|| format!("load scene '{}'", path.display()))?;
    let overrides = window.overrides();
    if !overrides.is_empty() {
        overrides.apply(&mut scene)?;
    }
    Ok(scene)
}

fn build_layers(
    scene: &vesseltrace::Scene,
    scene_path: &Path,
) -> anyhow::Result<Vec<vesseltrace::VesselLayer>> {
    let base_dir = scene_path.parent().unwrap_or_else(|| Path::new("."));
    scene
        .build_layers(base_dir)
        .with_context(|| format!("load tracks for scene '{}'", scene_path.display()))
}

fn make_backend() -> anyhow::Result<Box<dyn vesseltrace::RenderBackend>> {
    Ok(vesseltrace::create_backend(
        vesseltrace::BackendKind::Cpu,
        &vesseltrace::RenderSettings::default(),
    )?)
}

fn write_png(path: &Path, frame: &vesseltrace::FrameRGBA) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let mut frame = frame.clone();
    frame.unpremultiply();
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scene = load_scene(&args.in_path, args.window)?;
    let mut layers = build_layers(&scene, &args.in_path)?;
    let mut backend = make_backend()?;

    let frame = vesseltrace::render_scene(&scene, &mut layers, backend.as_mut())?;
    write_png(&args.out, &frame)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sweep(args: SweepArgs) -> anyhow::Result<()> {
    if args.frames == 0 {
        anyhow::bail!("--frames must be > 0");
    }
    let scene = load_scene(&args.in_path, args.window)?;
    let mut layers = build_layers(&scene, &args.in_path)?;
    let mut backend = make_backend()?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    vesseltrace::render_sweep(
        &scene,
        &mut layers,
        backend.as_mut(),
        args.step,
        args.frames,
        |index, windows, frame| {
            let path = args.out_dir.join(format!("frame_{index:04}.png"));
            write_png(&path, frame).map_err(vesseltrace::VesselError::Other)?;
            if let Some(w) = windows.first() {
                eprintln!("wrote {} [{}, {}]", path.display(), w.start, w.end);
            } else {
                eprintln!("wrote {}", path.display());
            }
            Ok(())
        },
    )?;
    Ok(())
}

fn cmd_shaders(args: ShadersArgs) -> anyhow::Result<()> {
    let scene = load_scene(&args.in_path, WindowArgs::default())?;
    let config = match &args.layer {
        Some(id) => scene
            .layer(id)
            .with_context(|| format!("scene has no layer '{id}'"))?,
        None => scene.layers.first().context("scene has no layers")?,
    };

    let layer = vesseltrace::VesselLayer::vessel(
        config.id.clone(),
        config.path_props(),
        config.time_window_props(),
    );
    let dialect = match args.dialect {
        DialectChoice::Wgsl => vesseltrace::ShaderDialect::Wgsl,
        DialectChoice::Glsl => vesseltrace::ShaderDialect::Glsl,
    };
    let program = layer.shader_program(dialect)?;

    println!("// ---- vertex ({dialect}) ----");
    print!("{}", program.vertex);
    println!("// ---- fragment ({dialect}) ----");
    print!("{}", program.fragment);
    Ok(())
}

fn cmd_pick(args: PickArgs) -> anyhow::Result<()> {
    let scene = load_scene(&args.in_path, args.window)?;
    let mut layers = build_layers(&scene, &args.in_path)?;
    let plan = vesseltrace::plan_scene(&scene, &mut layers)?;

    match vesseltrace::pick(&plan, vesseltrace::Point::new(args.x, args.y), args.radius) {
        Some(info) => {
            let layer_id = layers.get(info.layer).map(|l| l.id()).unwrap_or("?");
            let track = layers
                .get(info.layer)
                .and_then(|l| l.data().tracks.get(info.track))
                .map(|t| t.name.as_str())
                .unwrap_or("?");
            let timestamp = info
                .timestamp
                .map(|t| format!("{t:.0}"))
                .unwrap_or_else(|| "-".to_owned());
            println!(
                "layer={layer_id} track={track} segment={} fraction={:.4} timestamp={timestamp}",
                info.segment, info.fraction
            );
        }
        None => println!("nothing"),
    }
    Ok(())
}

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use pickscene_assets::ModelLoader;
use pickscene_input::{Action, ActionMap, PointerState, Viewport};
use pickscene_pick::{HoverEdge, Intersection, PickingSession};
use pickscene_render::{DebugTextRenderer, OrbitCamera, Renderer};
use pickscene_scene::{Scene, SceneConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pickscene-cli", about = "Headless driver for the picking scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Scene configuration (YAML); the built-in demo when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ViewArgs {
    /// Viewport width in pixels
    #[arg(long, default_value = "1280")]
    width: u32,
    /// Viewport height in pixels
    #[arg(long, default_value = "720")]
    height: u32,
    /// Animation time in seconds
    #[arg(long, default_value = "0")]
    time: f32,
    /// Load and install the configured model before picking
    #[arg(long)]
    with_model: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, crate info and the scene
    Info,
    /// Pick at one pixel position and show what a click would do
    Pick {
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
        #[command(flatten)]
        view: ViewArgs,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move the pointer across one pixel row and report hover edges
    Sweep {
        /// Pixel row; the middle of the viewport when omitted
        #[arg(long)]
        row: Option<f64>,
        /// Number of pointer positions
        #[arg(long, default_value = "64")]
        steps: u32,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Check that a configuration file builds a valid scene
    Validate {
        /// Configuration to check
        path: PathBuf,
    },
}

#[derive(Serialize)]
struct HitOut {
    tag: String,
    distance: f32,
    point: [f32; 3],
}

impl From<&Intersection> for HitOut {
    fn from(hit: &Intersection) -> Self {
        Self {
            tag: hit.tag.to_string(),
            distance: hit.distance,
            point: hit.point.to_array(),
        }
    }
}

#[derive(Serialize)]
struct PickOut {
    ndc: [f32; 2],
    primary: Vec<HitOut>,
    model: Vec<HitOut>,
    model_tested: bool,
    hovered: Option<String>,
    hovered_model: Option<String>,
    click: String,
}

/// Everything a headless frame needs.
struct Headless {
    scene: Scene,
    session: PickingSession,
    actions: ActionMap,
    camera: OrbitCamera,
    viewport: Viewport,
}

impl Headless {
    fn new(config: &SceneConfig, view: &ViewArgs) -> anyhow::Result<Self> {
        let mut scene = Scene::from_config(config)?;
        if view.with_model {
            match &config.model {
                Some(model) => {
                    let model = ModelLoader::spawn(model.clone())
                        .wait()
                        .context("loading model")?;
                    scene.install_model(model)?;
                }
                None => tracing::warn!("--with-model given but the scene has no model"),
            }
        }
        scene.animate(view.time);

        let viewport = Viewport::new(view.width, view.height);
        let mut camera = OrbitCamera::from_config(&config.camera);
        camera.set_viewport(viewport.width, viewport.height);

        Ok(Self {
            scene,
            session: PickingSession::new(config.picking),
            actions: config.click_bindings().collect(),
            camera,
            viewport,
        })
    }

    fn pick_at(&mut self, x: f64, y: f64) -> (PointerState, pickscene_pick::FrameReport) {
        let mut pointer = PointerState::new();
        pointer.set_from_pixels(x, y, self.viewport);
        let ray = self.camera.pick_ray(pointer.ndc());
        let report = self.session.frame(&mut self.scene, &ray);
        (pointer, report)
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SceneConfig> {
    SceneConfig::load_or_default(path)
        .with_context(|| format!("reading config {}", path.map_or("<default>".into(), |p| p.display().to_string())))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            let config = load_config(cli.config.as_deref())?;
            println!("pickscene-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("assets: {}", pickscene_assets::crate_info());
            println!("render: {}", pickscene_render::crate_info());
            let scene = Scene::from_config(&config)?;
            let camera = OrbitCamera::from_config(&config.camera);
            print!("{}", DebugTextRenderer::new().render(&scene, &camera));
            match &config.model {
                Some(model) => println!(
                    "Model source: {}",
                    model
                        .path
                        .as_ref()
                        .map_or("built-in card".into(), |p| p.display().to_string())
                ),
                None => println!("Model source: none"),
            }
        }
        Commands::Pick { x, y, view, json } => {
            let config = load_config(cli.config.as_deref())?;
            let mut headless = Headless::new(&config, &view)?;
            let (pointer, report) = headless.pick_at(x, y);
            let action = headless.actions.dispatch(headless.session.clicked_tag());

            if json {
                let out = PickOut {
                    ndc: pointer.ndc().to_array(),
                    primary: report.primary_hits.iter().map(HitOut::from).collect(),
                    model: report.model_hits.iter().map(HitOut::from).collect(),
                    model_tested: report.model_tested,
                    hovered: headless.session.current_primary().map(|h| h.tag.to_string()),
                    hovered_model: headless.session.current_model().map(|h| h.tag.to_string()),
                    click: action.to_string(),
                };
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                let ndc = pointer.ndc();
                println!("Pointer ({x}, {y}) -> ndc ({:.3}, {:.3})", ndc.x, ndc.y);
                println!("Primary hits: {}", report.primary_hits.len());
                for hit in &report.primary_hits {
                    println!("  {} d={:.3}", hit.tag, hit.distance);
                }
                if report.model_tested {
                    println!("Model hits: {}", report.model_hits.len());
                    for hit in &report.model_hits {
                        println!("  {} d={:.3}", hit.tag, hit.distance);
                    }
                    match headless.session.current_model() {
                        Some(hit) => println!("Model hover: {}", hit.tag),
                        None => println!("Model hover: none"),
                    }
                }
                match action {
                    Action::NoSelection => println!("Click: no selection"),
                    other => println!("Click: {other}"),
                }
            }
        }
        Commands::Sweep { row, steps, view } => {
            let config = load_config(cli.config.as_deref())?;
            let mut headless = Headless::new(&config, &view)?;
            let row = row.unwrap_or(f64::from(headless.viewport.height) / 2.0);
            let steps = steps.max(2);
            let width = f64::from(headless.viewport.width);

            let mut edges = 0;
            for i in 0..steps {
                let x = width * f64::from(i) / f64::from(steps - 1);
                let (_, report) = headless.pick_at(x, row);
                for event in &report.events {
                    edges += 1;
                    let verb = match event.edge {
                        HoverEdge::Enter(_) => "enter",
                        HoverEdge::Leave(_) => "leave",
                    };
                    println!(
                        "x={x:7.1}  {} {verb:5} {}",
                        event.group,
                        event.edge.hit().tag
                    );
                }
            }
            println!("{edges} edges over {steps} positions at row {row}");
        }
        Commands::Validate { path } => {
            let config = SceneConfig::load(&path)
                .with_context(|| format!("reading config {}", path.display()))?;
            let scene = Scene::from_config(&config)?;
            let bindings = config.click_bindings().count();
            println!(
                "{}: ok ({} objects, {} click bindings, model {})",
                path.display(),
                scene.object_count(),
                bindings,
                if config.model.is_some() { "enabled" } else { "disabled" }
            );
        }
    }

    Ok(())
}

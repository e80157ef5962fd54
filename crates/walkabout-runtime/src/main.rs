use clap::Parser;
use walkabout_client::cli::{CliArgs, Command};
use walkabout_client::project_config::{self, ViewerSettings};
use walkabout_client::{replay, scene, viewer};
use walkabout_core::CameraMode;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    tracing::info!("walkabout v{}", env!("CARGO_PKG_VERSION"));

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => fail(format!("cannot read current directory: {}", e)),
    };
    let settings = match project_config::resolve(&args, &cwd) {
        Ok(s) => s,
        Err(e) => fail(e),
    };

    match &args.command {
        // walkabout replay <script> [--scene X]
        Some(Command::Replay { script }) => run_replay(&settings, &cwd.join(script), args.dry_run),

        // walkabout [view] [--first-person]
        Some(Command::View { first_person }) => {
            let mode = if *first_person {
                CameraMode::FirstPerson
            } else {
                settings.config.start_mode
            };
            run_viewer(settings, mode, args.dry_run);
        }
        None => {
            let mode = settings.config.start_mode;
            run_viewer(settings, mode, args.dry_run);
        }
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn run_replay(settings: &ViewerSettings, script_path: &std::path::Path, dry_run: bool) {
    let script = match replay::load_script(script_path) {
        Ok(s) => s,
        Err(e) => fail(e),
    };
    let scene = match &settings.scene_path {
        Some(path) => match scene::load_scene(path) {
            Ok(s) => Some(s),
            Err(e) => fail(format!("{}: {}", path.display(), e)),
        },
        None => None,
    };
    if dry_run {
        println!(
            "replay {} ({} steps) against scene {}",
            script_path.display(),
            script.steps.len(),
            viewer::describe_scene(settings)
        );
        return;
    }

    let report = match replay::run(&script, settings.config.locomotion.clone(), scene.as_ref()) {
        Ok(r) => r,
        Err(e) => fail(e),
    };
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(e),
    }
}

fn run_viewer(settings: ViewerSettings, mode: CameraMode, dry_run: bool) {
    tracing::info!(
        "Project '{}' scene {} starting in {:?}",
        settings.config.name,
        viewer::describe_scene(&settings),
        mode
    );
    if dry_run {
        println!("{:#?}", settings);
        return;
    }

    let event_loop = match winit::event_loop::EventLoop::new() {
        Ok(l) => l,
        Err(e) => fail(format!("failed to create event loop: {}", e)),
    };
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

    let mut app = viewer::Viewer::new(settings, mode);
    if let Err(e) = event_loop.run_app(&mut app) {
        fail(format!("event loop error: {}", e));
    }
}

use ballbox_core::{analyze_scene, parse_scene, run_scene};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

mod logging;
mod viewer;

#[derive(Parser)]
#[command(name = "ballbox")]
#[command(about = "ballbox - elastic disks bouncing in a box", long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scene to completion and print its detectors
    Run {
        /// Path to the scene file
        file: PathBuf,
    },
    /// Parse and analyze a scene without running it
    Check {
        /// Path to the scene file
        file: PathBuf,
    },
    /// Open the interactive viewer
    View {
        /// Path to the scene file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let outcome = match cli.command {
        Commands::Run { file } => run_file(&file),
        Commands::Check { file } => check_file(&file),
        Commands::View { file } => viewer::launch(file),
    };

    if let Err(e) = outcome {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run_file(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(file)?;
    let result = run_scene(&source)?;

    log::info!("ran {} frame(s)", result.frames);
    for detector in result.detectors {
        println!("{} = {}", detector.name, detector.value);
    }

    Ok(())
}

fn check_file(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(file)?;
    let scene = parse_scene(&source)?;
    let diagnostics = analyze_scene(&scene);

    for d in diagnostics.iter() {
        println!("{}", d.render(&source));
    }

    if diagnostics.has_errors() {
        let count = diagnostics.errors().count();
        return Err(format!("{}: {} error(s)", file.display(), count).into());
    }

    println!(
        "{}: ok ({} particle(s), {} detector(s))",
        file.display(),
        scene.requested_particles(),
        scene.detectors.len()
    );
    Ok(())
}

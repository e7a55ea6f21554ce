use clap::{Parser, Subcommand};
use lh2_calibration::codec::CalibrationPayload;
use lh2_calibration::io::CalibrationStore;
use lh2_calibration::session::{CalibrationSession, Command};
use lh2_calibration::visualization::log_calibration_points;
use log::{error, info};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "LH2 calibration tool")]
struct Cli {
    /// calibration file, defaults to ~/.dotbot/calibration.json
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored calibration
    Show,
    /// Run a calibration from a script of `frame <hex>`, `commit <corner>`,
    /// `reset` and `compute` lines
    Replay {
        script: PathBuf,

        /// record the collected points to this .rrd file
        #[arg(long = "rerun")]
        rerun_file: Option<PathBuf>,
    },
}

fn print_payload(payload: &CalibrationPayload) {
    println!("index: {}", payload.index);
    println!("homography:{}", payload.homography());
    let hex: String = payload.to_bytes().iter().map(|b| format!("{:02x}", b)).collect();
    println!("payload: {}", hex);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let store = match cli.store {
        Some(path) => CalibrationStore::with_path(path),
        None => CalibrationStore::new()?,
    };

    match cli.command {
        Commands::Show => match store.load()? {
            Some(payload) => print_payload(&payload),
            None => println!("no calibration stored at {}", store.path().display()),
        },
        Commands::Replay { script, rerun_file } => {
            let recording = rerun_file
                .map(|path| rerun::RecordingStreamBuilder::new("lh2-calibration").save(path))
                .transpose()?;
            let mut session = CalibrationSession::new(store);
            for (line_no, line) in std::fs::read_to_string(&script)?.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let command: Command = line.parse()?;
                match session.apply(&command) {
                    Ok(Some(payload)) => print_payload(&payload),
                    Ok(None) => {}
                    Err(e) => error!("line {}: {}", line_no + 1, e),
                }
                if let (Some(recording), Command::Commit(_)) = (&recording, &command) {
                    log_calibration_points(recording, "/camera", session.collector().points())?;
                }
            }
            info!("replay finished, {:?}", session.state());
        }
    }
    Ok(())
}

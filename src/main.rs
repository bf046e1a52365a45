//! triveni-fusion - Multi-IMU 2D position fusion daemon
//!
//! Runs a simulated IMU array, synchronizes the sample streams into
//! frames, and fuses the per-sensor dead-reckoned positions into a
//! single 2D estimate constrained by the rigid array geometry.

use std::fs;
use std::io::Write;
use std::sync::Arc;

use serde::Deserialize;

use triveni_fusion::utils::signal::setup_ctrl_c_handler;
use triveni_fusion::{
    AcquisitionConfig, FusionPipeline, FusionThread, PipelineConfig, Point2D, ReferenceGeometry,
    SampleSynchronizer, SimulatedImuArray,
};

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Deserialize, Default)]
struct Config {
    #[serde(default)]
    system: SystemConfig,
    #[serde(default)]
    acquisition: AcquisitionConfig,
    #[serde(default)]
    output: OutputConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SystemConfig {
    /// Number of IMUs in the array.
    imu_count: usize,
    /// Accelerometer noise level driving uncertainty growth (m/s^2).
    noise_level: f64,
    /// Side length of the default square layout (meters).
    reference_span: f64,
    /// Explicit sensor layout, one [x, y] per IMU. Overrides the
    /// square layout and is required when imu_count != 4.
    reference: Option<Vec<[f64; 2]>>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            imu_count: 4,
            noise_level: 0.1,
            reference_span: 1.0,
            reference: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct OutputConfig {
    /// Print one estimate out of every N.
    print_every: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { print_every: 100 }
    }
}

// ============================================================================
// CLI Arguments
// ============================================================================

struct Args {
    config_path: Option<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut result = Args { config_path: None };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    result.config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    result
}

fn print_help() {
    println!("triveni-fusion - multi-IMU 2D position fusion daemon");
    println!();
    println!("USAGE:");
    println!("    triveni-fusion [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <FILE>     Configuration file (default: triveni-fusion.toml)");
    println!("    -h, --help              Print help information");
    println!();
    println!("CONFIGURATION:");
    println!("    All settings are configured via the TOML config file:");
    println!("    - [system] imu_count, noise_level, reference layout");
    println!("    - [acquisition] sample_rate_hz, noise stddevs, seed");
    println!("    - [output] print_every");
}

fn load_config(args: &Args) -> Config {
    match &args.config_path {
        Some(path) => match fs::read_to_string(path) {
            Ok(contents) => match basic_toml::from_str(&contents) {
                Ok(cfg) => {
                    log::info!("Loaded config from {}", path);
                    cfg
                }
                Err(e) => {
                    log::warn!("Failed to parse config {}: {}", path, e);
                    Config::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read config {}: {}", path, e);
                Config::default()
            }
        },
        None => {
            for path in &["triveni-fusion.toml", "/etc/triveni-fusion.toml"] {
                if let Ok(contents) = fs::read_to_string(path) {
                    if let Ok(cfg) = basic_toml::from_str(&contents) {
                        log::info!("Loaded config from {}", path);
                        return cfg;
                    }
                }
            }
            Config::default()
        }
    }
}

fn build_reference(system: &SystemConfig) -> Result<ReferenceGeometry, Box<dyn std::error::Error>> {
    let geometry = match &system.reference {
        Some(points) => ReferenceGeometry::from_points(
            points.iter().map(|&[x, y]| Point2D::new(x, y)).collect(),
        )?,
        None if system.imu_count == 4 => ReferenceGeometry::square(system.reference_span),
        None => {
            return Err(format!(
                "imu_count = {} requires an explicit [system] reference layout",
                system.imu_count
            )
            .into())
        }
    };
    geometry.validate_count(system.imu_count)?;
    Ok(geometry)
}

// ============================================================================
// Entry Point
// ============================================================================

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let args = parse_args();
    let config = load_config(&args);

    log::info!("triveni-fusion starting");
    log::info!("  IMUs: {}", config.system.imu_count);
    log::info!("  Sample rate: {} Hz", config.acquisition.sample_rate_hz);
    log::info!("  Noise level: {} m/s^2", config.system.noise_level);

    if let Err(e) = run(&config) {
        log::error!("Daemon error: {}", e);
        std::process::exit(1);
    }

    log::info!("triveni-fusion shutdown complete");
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let reference = build_reference(&config.system)?;
    let running = setup_ctrl_c_handler()?;

    let sync = Arc::new(SampleSynchronizer::new(config.system.imu_count));
    let pipeline = FusionPipeline::new(PipelineConfig {
        noise_level: config.system.noise_level,
        reference,
    });

    let array = SimulatedImuArray::spawn(
        config.acquisition.clone(),
        Arc::clone(&sync),
        Arc::clone(&running),
    )?;
    let (fusion, estimates) = FusionThread::spawn(pipeline, Arc::clone(&sync), Arc::clone(&running))?;
    log::info!("  {} producer threads + fusion thread running", config.system.imu_count);

    let mut count: u64 = 0;
    // recv fails once the fusion thread exits and drops its sender.
    while let Ok(estimate) = estimates.recv() {
        count += 1;
        if config.output.print_every > 0 && count % config.output.print_every == 0 {
            println!(
                "t={}us fused position: ({:.4}, {:.4}) r={:.4}",
                estimate.timestamp_us, estimate.data.x, estimate.data.y, estimate.data.radius
            );
        }
    }

    fusion.join();
    array.join();
    log::info!("Processed {} frames", count);
    Ok(())
}

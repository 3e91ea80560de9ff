use clap::{ArgAction, Parser};
use nf_app::{AppResult, OsPlatform, RegulatorConfig, init_logging, run_regulator};
use nf_gateway::NvidiaSettingsGateway;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "nvfan")]
#[command(about = "nvfan - Control the fan speed of NVIDIA GPUs in software", long_about = None)]
struct Cli {
    /// YAML config file; flags given on the command line override its values
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// GPU target temperature in °C [default: 55]
    #[arg(short = 't', long, value_name = "TEMP", allow_negative_numbers = true)]
    target_temp: Option<f64>,

    /// Seconds between fan adjustments [default: 2.5]
    #[arg(short = 'i', long, value_name = "SECS")]
    regulation_interval: Option<f64>,

    /// ± °C around the target in which the fan is left alone [default: 3]
    #[arg(long, value_name = "TEMP")]
    regulation_deadzone: Option<f64>,

    /// Duty cycle in percent assumed on the fan at startup [default: 50]
    #[arg(long, value_name = "PERCENT")]
    initial_pwm: Option<f64>,

    /// Lowest fan duty in percent that is ever commanded [default: 20]
    #[arg(long, value_name = "PERCENT")]
    min_speed: Option<f64>,

    /// Highest fan duty in percent that is ever commanded [default: 100]
    #[arg(long, value_name = "PERCENT")]
    max_speed: Option<f64>,

    /// Fan to regulate [default: fan:0]
    #[arg(long, value_name = "FAN_ID")]
    fan: Option<String>,

    /// GPU to read and to switch between manual and automatic fan control [default: gpu:0]
    #[arg(long, value_name = "GPU_ID")]
    gpu: Option<String>,

    /// Fork into the background after claiming the fan. The child stays in the
    /// session, so it still stops when the X session ends.
    #[arg(long)]
    daemonize: bool,

    /// Be more verbose (-v: adjustments, -vv: every cycle)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Program used to talk to the GPU [default: nvidia-settings]
    #[arg(long, value_name = "PROGRAM")]
    nvidia_settings: Option<String>,

    /// Seconds before a hung nvidia-settings call is killed [default: 10]
    #[arg(long, value_name = "SECS")]
    command_timeout: Option<f64>,
}

impl Cli {
    /// Merge the optional config file with the flags given on the command line.
    fn into_config(self) -> AppResult<RegulatorConfig> {
        let mut config = match &self.config {
            Some(path) => RegulatorConfig::load(path)?,
            None => RegulatorConfig::default(),
        };

        if let Some(v) = self.target_temp {
            config.target_temp = v;
        }
        if let Some(v) = self.regulation_interval {
            config.regulation_interval = v;
        }
        if let Some(v) = self.regulation_deadzone {
            config.regulation_deadzone = v;
        }
        if let Some(v) = self.initial_pwm {
            config.initial_pwm = v;
        }
        if let Some(v) = self.min_speed {
            config.min_speed = v;
        }
        if let Some(v) = self.max_speed {
            config.max_speed = v;
        }
        if let Some(v) = self.fan {
            config.fan = v;
        }
        if let Some(v) = self.gpu {
            config.gpu = v;
        }
        if self.daemonize {
            config.daemonize = true;
        }
        if self.verbose > 0 {
            config.verbose = self.verbose;
        }
        if let Some(v) = self.nvidia_settings {
            config.nvidia_settings = v;
        }
        if let Some(v) = self.command_timeout {
            config.command_timeout = v;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            let mut cause = err.source();
            while let Some(inner) = cause {
                eprintln!("  caused by: {inner}");
                cause = inner.source();
            }
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> AppResult<()> {
    let config = cli.into_config()?;
    let settings = config.validate()?;
    init_logging(settings.verbosity)?;

    let mut gateway = NvidiaSettingsGateway::new(settings.gateway.clone());
    let summary = run_regulator(&settings, &mut gateway, &mut OsPlatform)?;

    info!(
        cycles = summary.cycles,
        adjustments = summary.adjustments,
        final_duty = %summary.final_duty,
        "stopped"
    );
    Ok(())
}

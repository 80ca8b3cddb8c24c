use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use heart_swarm::{ParameterSet, SimConfig, Viewport, POOL_SIZE};
use std::io;
use std::process::ExitCode;

/// Particle swarm that scatters across the window and gathers into a heart
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
  /// Number of particles in the pool
  #[arg(short, long, default_value_t = POOL_SIZE)]
  particles: usize,
  /// Initial viewport width in logical pixels
  #[arg(long, default_value_t = 960.0)]
  width: f32,
  /// Initial viewport height in logical pixels
  #[arg(long, default_value_t = 540.0)]
  height: f32,
  /// Seed for scatter targets (random if omitted)
  #[arg(long)]
  seed: Option<u64>,
  #[arg(long, default_value_t = ParameterSet::default().spring)]
  spring: f32,
  #[arg(long, default_value_t = ParameterSet::default().friction)]
  friction: f32,
  #[arg(long, default_value_t = ParameterSet::default().pointer_strength)]
  pointer_strength: f32,
  /// Play the heart transition right after start
  #[arg(long, default_value_t = false)]
  heart: bool,
  /// Run in headless mode (no window)
  #[arg(long, default_value_t = false)]
  headless: bool,
  /// Frames to simulate in headless mode (runs until Ctrl-C if omitted)
  #[arg(long, requires = "headless")]
  frames: Option<u64>,
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Generate shell completion scripts
  Completions {
    /// The shell to generate the script for
    #[arg(value_enum)]
    shell: Shell,
  },
}

impl Args {
  fn sim_config(&self) -> SimConfig {
    SimConfig {
      particle_count: self.particles,
      viewport: Viewport {
        width: self.width,
        height: self.height,
      },
      params: ParameterSet {
        spring: self.spring,
        friction: self.friction,
        pointer_strength: self.pointer_strength,
        ..ParameterSet::default()
      },
      seed: self.seed,
    }
  }
}

fn main() -> ExitCode {
  let args = Args::parse();

  if let Some(Commands::Completions { shell }) = args.command {
    let mut cmd = Args::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    return ExitCode::SUCCESS;
  }

  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let config = args.sim_config();
  let result = if args.headless {
    heart_swarm::state::run_headless(config, args.frames, args.heart).map(|_| ())
  } else {
    heart_swarm::state::run(config, args.heart)
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      log::error!("{err}");
      ExitCode::FAILURE
    }
  }
}

use clap::Parser;
use edgeroute::cli::{run_cli, Cli};
use edgeroute::logging::{init_logging_with_config, LogConfig};

fn main() {
    let cli = Cli::parse();
    let log_config = LogConfig::from_env().with_verbosity(cli.verbose, cli.quiet);
    if let Err(err) = init_logging_with_config(&log_config) {
        eprintln!("Warning: {err:#}");
    }

    if let Err(err) = run_cli(cli) {
        eprintln!("❌ {err:#}");
        std::process::exit(1);
    }
}

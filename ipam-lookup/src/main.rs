use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;

fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::parse_from_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => return cli::handle_parse_error(&err),
    };

    cli::run(cli)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

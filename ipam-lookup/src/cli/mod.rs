use std::ffi::OsString;
use std::process::ExitCode;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use ipam_lookup::IpamLookupError;
use ipam_lookup::config::Config;
use ipam_lookup::services::ResolverService;
use ipam_lookup::wapi::{Credentials, WapiClient};

mod lookup;

pub const USAGE: &str = "Usage: ipam-lookup <ip_address> <username> <password>";

#[derive(Parser)]
#[command(name = "ipam-lookup")]
#[command(about = "Resolve network and host metadata for an IPv4 address from IPAM")]
#[command(version)]
pub struct Cli {
    #[arg(help = "IPv4 address to look up (dotted quad)")]
    pub ip_address: String,

    #[arg(help = "IPAM username")]
    pub username: String,

    #[arg(help = "IPAM password")]
    pub password: String,
}

impl Cli {
    /// Three arguments are always the three positionals, even when they look
    /// like flags. `--help` and `--version` only work on their own.
    pub fn parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

        if let [_, ip_address, username, password] = args.as_slice() {
            return Ok(Self {
                ip_address: utf8(ip_address)?,
                username: utf8(username)?,
                password: utf8(password)?,
            });
        }
        if args.len() == 2 {
            return Self::try_parse_from(args);
        }
        Err(Self::command().error(ErrorKind::WrongNumberOfValues, USAGE))
    }
}

fn utf8(arg: &OsString) -> Result<String, clap::Error> {
    arg.to_str()
        .map(str::to_owned)
        .ok_or_else(|| Cli::command().error(ErrorKind::InvalidUtf8, USAGE))
}

/// Anything other than exactly three positionals is a usage error (exit 1).
pub fn handle_parse_error(err: &clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("{USAGE}");
            ExitCode::from(1)
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr().lock();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            lookup::report(&e, &mut stderr);
            return ExitCode::from(1);
        }
    };

    let credentials = Credentials::new(cli.username, cli.password);
    let client = match WapiClient::new(&config, credentials) {
        Ok(client) => client,
        Err(e) => {
            lookup::report(&e, &mut stderr);
            return if e.is_config() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            lookup::report(&IpamLookupError::from(e), &mut stderr);
            return ExitCode::SUCCESS;
        }
    };

    let resolver = ResolverService::new(Arc::new(client));
    runtime.block_on(lookup::run(
        &resolver,
        &cli.ip_address,
        &mut stdout,
        &mut stderr,
    ));

    ExitCode::SUCCESS
}

//! syslog - SONiC `config syslog` command
//!
//! Configures remote syslog servers, rate limits and log levels

use std::process::ExitCode;

use clap::Parser;
use sonic_cli_common::SystemRunner;
use sonic_syslogcfg::cli::Cli;
use sonic_syslogcfg::logging::init_logging;
use sonic_syslogcfg::{IpInspector, SyslogError, SyslogMgr};
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), SyslogError> {
    let platform = cli.settings.detect_platform()?;
    let dbs = cli.settings.connect(&platform).await?;
    debug!(?platform, "Running {:?}", cli.command);

    let mut mgr = SyslogMgr::new(
        dbs,
        SystemRunner,
        IpInspector::new(SystemRunner),
        platform,
    );
    cli.command.execute(&mut mgr).await
}

//! Command line surface of `syslog`

use clap::{Parser, Subcommand};
use sonic_cli_common::{CommandRunner, ConfigDb};

use crate::config::Settings;
use crate::error::Result;
use crate::netstate::NetworkInspector;
use crate::syslog_mgr::SyslogMgr;
use crate::types::{FeatureAction, LevelRequest, LogLevel, RateLimit, RATE_LIMIT_MAX};

fn rate_limit_parser() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(0..=i64::from(RATE_LIMIT_MAX))
}

/// Configure syslog servers, rate limits and log levels
#[derive(Parser, Debug)]
#[command(name = "syslog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a remote syslog server
    Add {
        /// Remote server address
        server_ip_address: String,

        /// Source address for outgoing messages
        #[arg(short = 's', long)]
        source: Option<String>,

        /// Server UDP port
        #[arg(short = 'p', long)]
        port: Option<u16>,

        /// VRF used to reach the server
        #[arg(short = 'r', long)]
        vrf: Option<String>,
    },

    /// Delete a remote syslog server
    Del {
        /// Remote server address
        server_ip_address: String,
    },

    /// Configure syslog rate limit for the host
    RateLimitHost {
        /// Rate limit interval in seconds
        #[arg(short = 'i', long, value_parser = rate_limit_parser())]
        interval: Option<u32>,

        /// Messages allowed per interval
        #[arg(short = 'b', long, value_parser = rate_limit_parser())]
        burst: Option<u32>,
    },

    /// Configure syslog rate limit for a container
    RateLimitContainer {
        /// Service (FEATURE table) name
        service_name: String,

        /// Rate limit interval in seconds
        #[arg(short = 'i', long, value_parser = rate_limit_parser())]
        interval: Option<u32>,

        /// Messages allowed per interval
        #[arg(short = 'b', long, value_parser = rate_limit_parser())]
        burst: Option<u32>,

        /// ASIC namespace or "default"
        #[arg(short = 'n', long)]
        namespace: Option<String>,
    },

    /// Enable or disable the containercfgd rate limit feature
    #[command(subcommand)]
    RateLimitFeature(FeatureCommand),

    /// Set the log level of a logger
    Level {
        /// Logger identifier (LOGGER table key)
        #[arg(short = 'i', long)]
        identifier: String,

        /// New log level
        #[arg(short = 'l', long, value_enum)]
        level: LogLevel,

        /// Container running the program
        #[arg(long)]
        container: Option<String>,

        /// Supervisor program to signal
        #[arg(long)]
        program: Option<String>,

        /// Process to signal
        #[arg(long)]
        pid: Option<u32>,

        /// ASIC namespace
        #[arg(short = 'n', long)]
        namespace: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum FeatureCommand {
    /// Enable the rate limit feature
    Enable {
        /// Service name; all capable services when omitted
        service_name: Option<String>,

        /// ASIC namespace or "default"
        #[arg(short = 'n', long)]
        namespace: Option<String>,
    },

    /// Disable the rate limit feature
    Disable {
        /// Service name; all capable services when omitted
        service_name: Option<String>,

        /// ASIC namespace or "default"
        #[arg(short = 'n', long)]
        namespace: Option<String>,
    },
}

impl Command {
    /// Run the command against `mgr`
    pub async fn execute<D, R, N>(self, mgr: &mut SyslogMgr<D, R, N>) -> Result<()>
    where
        D: ConfigDb,
        R: CommandRunner,
        N: NetworkInspector,
    {
        match self {
            Command::Add {
                server_ip_address,
                source,
                port,
                vrf,
            } => {
                mgr.add(
                    &server_ip_address,
                    source.as_deref(),
                    port,
                    vrf.as_deref(),
                )
                .await
            }
            Command::Del { server_ip_address } => mgr.del(&server_ip_address).await,
            Command::RateLimitHost { interval, burst } => {
                mgr.rate_limit_host(RateLimit::new(interval, burst)).await
            }
            Command::RateLimitContainer {
                service_name,
                interval,
                burst,
                namespace,
            } => {
                mgr.rate_limit_container(
                    &service_name,
                    RateLimit::new(interval, burst),
                    namespace.as_deref(),
                )
                .await
            }
            Command::RateLimitFeature(feature) => {
                let (action, service, namespace) = match feature {
                    FeatureCommand::Enable {
                        service_name,
                        namespace,
                    } => (FeatureAction::Enable, service_name, namespace),
                    FeatureCommand::Disable {
                        service_name,
                        namespace,
                    } => (FeatureAction::Disable, service_name, namespace),
                };
                mgr.rate_limit_feature(action, service.as_deref(), namespace.as_deref())
                    .await
            }
            Command::Level {
                identifier,
                level,
                container,
                program,
                pid,
                namespace,
            } => {
                let mut request = LevelRequest::new(identifier, level);
                request.container = container;
                request.program = program;
                request.pid = pid;
                request.namespace = namespace;
                mgr.level(request).await
            }
        }
    }
}

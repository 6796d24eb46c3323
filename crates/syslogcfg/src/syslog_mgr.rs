//! Syslog Manager - CONFIG_DB updates and process actions behind `config syslog`

use std::io::{self, Write};

use sonic_cli_common::platform::{container_name, namespace_name};
use sonic_cli_common::shell::{self, command_line};
use sonic_cli_common::{
    CommandRunner, ConfigDb, DbClients, FieldValuesExt, Platform, SonicError, DEFAULT_NAMESPACE,
};
use tracing::{debug, error, info, instrument, warn};

use crate::commands::*;
use crate::error::{Field, Result, SyslogError, ValidationError};
use crate::features::{self, FeatureScopes, FeatureTable};
use crate::netstate::NetworkInspector;
use crate::tables::*;
use crate::types::*;
use crate::validators::{self, VrfChoices};

/// Syslog Manager
///
/// Validates operator input, writes CONFIG_DB and drives the processes
/// that apply the new configuration.
pub struct SyslogMgr<D, R, N> {
    /// CONFIG_DB clients, default namespace first
    dbs: DbClients<D>,

    /// Process execution
    runner: R,

    /// Linux VRF and address state
    inspector: N,

    /// ASIC topology
    platform: Platform,

    /// Operator-facing progress messages
    out: Box<dyn Write + Send>,
}

impl<D, R, N> SyslogMgr<D, R, N>
where
    D: ConfigDb,
    R: CommandRunner,
    N: NetworkInspector,
{
    /// Create a new SyslogMgr writing progress to stdout
    pub fn new(dbs: DbClients<D>, runner: R, inspector: N, platform: Platform) -> Self {
        debug!(
            namespaces = dbs.len(),
            num_asics = platform.num_asics(),
            "SyslogMgr initialized"
        );
        Self {
            dbs,
            runner,
            inspector,
            platform,
            out: Box::new(io::stdout()),
        }
    }

    /// Redirect progress messages
    pub fn with_output(mut self, out: impl Write + Send + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    fn echo(&mut self, message: &str) {
        if let Err(e) = writeln!(self.out, "{}", message) {
            warn!("Failed to write output: {}", e);
        }
    }

    fn namespace_db(&self, namespace: &str) -> Result<&D> {
        self.dbs.get(namespace).ok_or_else(|| {
            SonicError::internal(format!("No CONFIG_DB client for namespace {}", namespace)).into()
        })
    }

    /// Runs a command, echoing it first, and fails on non-zero exit
    async fn run_displayed(&mut self, cmd: &[String]) -> Result<()> {
        self.echo(&format!("Running command: {}", command_line(cmd)));
        let result = self.runner.run(cmd).await?;
        shell::check(cmd, result)?;
        Ok(())
    }

    async fn restart_rsyslog(&mut self) -> Result<()> {
        self.run_displayed(&build_reset_failed_rsyslog_cmd()).await?;
        self.run_displayed(&build_restart_rsyslog_config_cmd()).await
    }

    /// Add a remote syslog server
    #[instrument(skip(self))]
    pub async fn add(
        &mut self,
        server: &str,
        source: Option<&str>,
        port: Option<u16>,
        vrf: Option<&str>,
    ) -> Result<()> {
        let mut entry = SyslogServer::new(validators::parse_ip(Field::ServerIpAddress, server)?);
        entry.source = source
            .map(|s| validators::parse_ip(Field::Source, s))
            .transpose()?;
        entry.port = port;
        entry.vrf = vrf.map(str::to_string);

        let db = self.dbs.default_db();
        validators::check_server(db, entry.server, false).await?;

        let choices = match vrf {
            Some(_) => VrfChoices::load(db).await?,
            None => VrfChoices::default(),
        };
        validators::validate_server_options(
            &choices,
            &self.inspector,
            entry.server,
            entry.source,
            vrf,
        )
        .await?;

        match self.store_server(&entry).await {
            Ok(()) => {
                info!("Added remote syslog logging: {}", entry.describe());
                Ok(())
            }
            Err(e) => {
                error!("Failed to add remote syslog logging: {}", e);
                Err(e)
            }
        }
    }

    async fn store_server(&mut self, entry: &SyslogServer) -> Result<()> {
        let fvs = entry.to_field_values();
        self.dbs
            .default_db()
            .set_entry(CFG_SYSLOG_SERVER_TABLE_NAME, &entry.key(), Some(&fvs))
            .await?;
        self.restart_rsyslog().await
    }

    /// Remove a remote syslog server
    #[instrument(skip(self))]
    pub async fn del(&mut self, server: &str) -> Result<()> {
        let server = validators::parse_ip(Field::ServerIpAddress, server)?;
        validators::check_server(self.dbs.default_db(), server, true).await?;

        match self.remove_server(&server.to_string()).await {
            Ok(()) => {
                info!("Removed remote syslog logging: server={}", server);
                Ok(())
            }
            Err(e) => {
                error!("Failed to remove remote syslog logging: {}", e);
                Err(e)
            }
        }
    }

    async fn remove_server(&mut self, key: &str) -> Result<()> {
        self.dbs
            .default_db()
            .set_entry(CFG_SYSLOG_SERVER_TABLE_NAME, key, None)
            .await?;
        self.restart_rsyslog().await
    }

    /// Configure the host rate limit
    #[instrument(skip(self))]
    pub async fn rate_limit_host(&mut self, limit: RateLimit) -> Result<()> {
        validators::validate_rate_limit(&limit)?;
        self.dbs
            .default_db()
            .mod_entry(
                CFG_SYSLOG_CONFIG_TABLE_NAME,
                SYSLOG_CONFIG_GLOBAL_KEY,
                &limit.to_field_values(),
            )
            .await?;
        info!("Configured syslog rate limit for host: {}", limit.describe());
        Ok(())
    }

    /// Configure the rate limit of a container
    ///
    /// Without a namespace every namespace running the service is updated.
    #[instrument(skip(self))]
    pub async fn rate_limit_container(
        &mut self,
        service: &str,
        limit: RateLimit,
        namespace: Option<&str>,
    ) -> Result<()> {
        validators::validate_rate_limit(&limit)?;
        let scope = validators::parse_namespace_scope(namespace, &self.platform)?;

        let table = FeatureTable::load(self.dbs.default_db()).await?;
        table.validate_service(service)?;
        let scopes = FeatureScopes::split(&table, self.platform.is_multi_asic());
        let fvs = limit.to_field_values();

        let targets: Vec<String> = match scope {
            NamespaceScope::All => self
                .dbs
                .iter()
                .filter(|(ns, _)| {
                    let feature_scope = if *ns == DEFAULT_NAMESPACE {
                        Scope::Global
                    } else {
                        Scope::PerAsic
                    };
                    scopes.contains(feature_scope, service)
                })
                .map(|(ns, _)| ns.to_string())
                .collect(),
            NamespaceScope::Default => {
                scopes.require(Scope::Global, service)?;
                vec![DEFAULT_NAMESPACE.to_string()]
            }
            NamespaceScope::Asic(id) => {
                scopes.require(Scope::PerAsic, service)?;
                vec![namespace_name(id)]
            }
        };

        for ns in &targets {
            self.namespace_db(ns)?
                .mod_entry(CFG_SYSLOG_CONFIG_FEATURE_TABLE_NAME, service, &fvs)
                .await?;
            info!(
                "Configured syslog rate limit for {} in namespace '{}': {}",
                service,
                ns,
                limit.describe()
            );
        }
        if targets.is_empty() {
            debug!("No namespace runs {}", service);
        }
        Ok(())
    }

    /// True if `docker ps` lists `container` as running
    async fn is_running(&self, container: &str) -> std::result::Result<bool, String> {
        let result = self
            .runner
            .run(&build_running_containers_cmd())
            .await
            .map_err(|e| e.to_string())?;
        if !result.success() {
            debug!(
                "Listing running containers failed: {}",
                result.combined_output()
            );
            return Ok(false);
        }
        Ok(result.stdout.lines().any(|line| line.trim() == container))
    }

    /// True unless supervisor reports containercfgd as unknown
    async fn containercfgd_installed(&self, container: &str) -> std::result::Result<bool, String> {
        let result = self
            .runner
            .run(&build_containercfgd_status_cmd(container))
            .await
            .map_err(|e| e.to_string())?;
        Ok(!result.combined_output().contains(NO_SUCH_PROCESS))
    }

    /// Enable or disable containercfgd in the selected containers
    ///
    /// Each container is handled independently; a failed step stops only
    /// that container's sequence.
    #[instrument(skip(self))]
    pub async fn rate_limit_feature(
        &mut self,
        action: FeatureAction,
        service: Option<&str>,
        namespace: Option<&str>,
    ) -> Result<()> {
        let scope = validators::parse_namespace_scope(namespace, &self.platform)?;
        let table = FeatureTable::load(self.dbs.default_db()).await?;
        let names = features::resolve(&table, service, scope, &self.platform)?;
        debug!("Resolved containers: {:?}", names);

        for name in &names {
            self.echo(&format!(
                "{} syslog rate limit feature for {}",
                action.progressive(),
                name
            ));

            let running = match self.is_running(name).await {
                Ok(running) => running,
                Err(output) => {
                    self.report_feature_failure(action, name, &output);
                    continue;
                }
            };
            if !running {
                self.echo(&format!("{} is not running, ignoring...", name));
                continue;
            }

            let installed = match self.containercfgd_installed(name).await {
                Ok(installed) => installed,
                Err(output) => {
                    self.report_feature_failure(action, name, &output);
                    continue;
                }
            };
            let wanted = action == FeatureAction::Enable;
            if installed == wanted {
                self.echo(&format!(
                    "Syslog rate limit feature is already {} in {}, ignoring...",
                    action.past().to_lowercase(),
                    name
                ));
                continue;
            }

            let steps = match action {
                FeatureAction::Enable => build_enable_containercfgd_cmds(name),
                FeatureAction::Disable => build_disable_containercfgd_cmds(name),
            };
            match self.run_steps(&steps).await {
                Ok(()) => {
                    self.echo(&format!(
                        "{} syslog rate limit feature for {}",
                        action.past(),
                        name
                    ));
                    info!("{} syslog rate limit feature for {}", action.past(), name);
                }
                Err(output) => self.report_feature_failure(action, name, &output),
            }
        }
        Ok(())
    }

    fn report_feature_failure(&mut self, action: FeatureAction, name: &str, output: &str) {
        self.echo(&format!(
            "{} syslog rate limit feature for {} failed - {}",
            action.imperative(),
            name,
            output
        ));
        warn!(
            "{} syslog rate limit feature for {} failed: {}",
            action.imperative(),
            name,
            output
        );
    }

    /// Runs `steps` in order, returning the output of the first failure
    async fn run_steps(&self, steps: &[Vec<String>]) -> std::result::Result<(), String> {
        for step in steps {
            match self.runner.run(step).await {
                Ok(result) if result.success() => {}
                Ok(result) => return Err(result.combined_output()),
                Err(e) => return Err(e.to_string()),
            }
        }
        Ok(())
    }

    /// Set a logger's level and optionally signal the process to reload
    #[instrument(skip(self))]
    pub async fn level(&mut self, request: LevelRequest) -> Result<()> {
        if request.program.is_some() && request.container.is_none() {
            return Err(ValidationError::ProgramWithoutContainer.into());
        }
        if request.container.is_some() && !request.wants_signal() {
            return Err(ValidationError::ContainerWithoutTarget.into());
        }

        let (db, container) = match request.namespace.as_deref() {
            None => (self.dbs.default_db(), request.container.clone()),
            Some(ns) => {
                let asic_id = validators::parse_asic_namespace(ns, &self.platform)?;
                let container = request
                    .container
                    .as_deref()
                    .map(|c| container_name(c, asic_id));
                (self.namespace_db(ns)?, container)
            }
        };

        let fvs = vec![(
            fields::LOGLEVEL.to_string(),
            request.level.as_str().to_string(),
        )];
        db.mod_entry(CFG_LOGGER_TABLE_NAME, &request.identifier, &fvs)
            .await?;
        info!(
            "Configured log level {} for {}",
            request.level, request.identifier
        );

        if !request.wants_signal() {
            return Ok(());
        }

        let entry = db
            .get_entry(CFG_LOGGER_TABLE_NAME, &request.identifier)
            .await?;
        let manual_refresh = entry
            .get_field(fields::REQUIRE_MANUAL_REFRESH)
            .is_some_and(|v| !v.is_empty());
        if !manual_refresh {
            debug!("{} reloads its log level without a signal", request.identifier);
            return Ok(());
        }

        let cmd = match (container.as_deref(), request.program.as_deref(), request.pid) {
            (Some(container), Some(program), _) => build_signal_program_cmd(container, program),
            (Some(container), None, Some(pid)) => build_signal_container_pid_cmd(container, pid),
            (None, _, Some(pid)) => build_signal_pid_cmd(pid),
            _ => return Ok(()),
        };
        let result = self.runner.run(&cmd).await?;
        if !result.success() {
            return Err(SyslogError::SignalFailed {
                output: result.combined_output(),
            });
        }
        debug!("Sent SIGHUP: {}", command_line(&cmd));
        Ok(())
    }
}

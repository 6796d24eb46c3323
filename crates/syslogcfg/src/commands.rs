//! Command builders for syslog operations
//!
//! Every builder returns an argument vector; nothing goes through a shell.

use sonic_cli_common::shell::{argv, DOCKER_CMD, KILL_CMD, SYSTEMCTL_CMD};

/// Service regenerating rsyslog configuration from CONFIG_DB
pub const RSYSLOG_CONFIG_SERVICE: &str = "rsyslog-config";

/// Host rsyslog service
pub const RSYSLOG_SERVICE: &str = "rsyslog";

/// Supervisor program enforcing container rate limits
pub const CONTAINERCFGD_PROGRAM: &str = "containercfgd";

/// Supervisor configuration template on the host
pub const CONTAINERCFGD_TEMPLATE: &str = "/usr/share/sonic/templates/containercfgd.conf";

/// Supervisor configuration directory inside a container
pub const SUPERVISOR_CONF_DIR: &str = "/etc/supervisor/conf.d/";

/// Installed supervisor configuration inside a container
pub const CONTAINERCFGD_CONF: &str = "/etc/supervisor/conf.d/containercfgd.conf";

/// Marker in `supervisorctl status` output for an unknown program
pub const NO_SUCH_PROCESS: &str = "no such process";

/// Build rsyslog failure-state reset command
pub fn build_reset_failed_rsyslog_cmd() -> Vec<String> {
    argv([
        SYSTEMCTL_CMD,
        "reset-failed",
        RSYSLOG_CONFIG_SERVICE,
        RSYSLOG_SERVICE,
    ])
}

/// Build rsyslog configuration restart command
pub fn build_restart_rsyslog_config_cmd() -> Vec<String> {
    argv([SYSTEMCTL_CMD, "restart", RSYSLOG_CONFIG_SERVICE])
}

/// Build running container listing command (one name per line)
pub fn build_running_containers_cmd() -> Vec<String> {
    argv([
        DOCKER_CMD,
        "ps",
        "-f",
        "status=running",
        "--format",
        "{{.Names}}",
    ])
}

fn docker_exec(container: &str, args: &[&str]) -> Vec<String> {
    let mut cmd = argv([DOCKER_CMD, "exec", "-i", container]);
    cmd.extend(args.iter().map(|a| a.to_string()));
    cmd
}

/// Build `supervisorctl` invocation inside `container`
pub fn build_supervisorctl_cmd(container: &str, args: &[&str]) -> Vec<String> {
    let mut full = vec!["supervisorctl"];
    full.extend_from_slice(args);
    docker_exec(container, &full)
}

/// Build containercfgd status query
pub fn build_containercfgd_status_cmd(container: &str) -> Vec<String> {
    build_supervisorctl_cmd(container, &["status", CONTAINERCFGD_PROGRAM])
}

/// Build the steps installing and starting containercfgd in `container`
pub fn build_enable_containercfgd_cmds(container: &str) -> Vec<Vec<String>> {
    vec![
        argv([
            DOCKER_CMD.to_string(),
            "cp".to_string(),
            CONTAINERCFGD_TEMPLATE.to_string(),
            format!("{}:{}", container, SUPERVISOR_CONF_DIR),
        ]),
        build_supervisorctl_cmd(container, &["reread"]),
        build_supervisorctl_cmd(container, &["update"]),
        build_supervisorctl_cmd(container, &["start", CONTAINERCFGD_PROGRAM]),
    ]
}

/// Build the steps stopping and removing containercfgd from `container`
pub fn build_disable_containercfgd_cmds(container: &str) -> Vec<Vec<String>> {
    vec![
        build_supervisorctl_cmd(container, &["stop", CONTAINERCFGD_PROGRAM]),
        docker_exec(container, &["rm", "-f", CONTAINERCFGD_CONF]),
        build_supervisorctl_cmd(container, &["reread"]),
        build_supervisorctl_cmd(container, &["update"]),
    ]
}

/// Build SIGHUP delivery to a supervisor program inside a container
pub fn build_signal_program_cmd(container: &str, program: &str) -> Vec<String> {
    build_supervisorctl_cmd(container, &["signal", "HUP", program])
}

/// Build SIGHUP delivery to a process inside a container
pub fn build_signal_container_pid_cmd(container: &str, pid: u32) -> Vec<String> {
    let pid = pid.to_string();
    docker_exec(container, &[KILL_CMD, "-s", "SIGHUP", &pid])
}

/// Build SIGHUP delivery to a host process
pub fn build_signal_pid_cmd(pid: u32) -> Vec<String> {
    argv([KILL_CMD.to_string(), "-s".to_string(), "SIGHUP".to_string(), pid.to_string()])
}

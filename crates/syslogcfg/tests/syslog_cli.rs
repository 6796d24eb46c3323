//! End-to-end tests of the `syslog` commands
//!
//! Commands are parsed from argument lists and executed against in-memory
//! CONFIG_DBs and a scripted process runner, including `ip --json` output.

use clap::Parser;
use pretty_assertions::assert_eq;
use sonic_cli_common::{DbClients, ExecResult, Platform};
use sonic_cli_test::{
    feature_fixtures, syslog_fixtures, CommandVerifier, ConfigChange, DbVerifier,
    MemoryConfigDb, ScriptedRunner, SharedBuffer,
};
use sonic_syslogcfg::cli::Cli;
use sonic_syslogcfg::{IpInspector, SyslogError, SyslogMgr, ValidationError};

const VRF_SHOW: &str = r#"[{"name":"Vrf_data","table":1001},{"name":"mgmt","table":5000}]"#;
const VRF_DATA_LINKS: &str = r#"[{"ifindex":8,"ifname":"Ethernet4","flags":["UP"],"master":"Vrf_data"}]"#;
const MGMT_LINKS: &str = r#"[{"ifindex":2,"ifname":"eth0","flags":["UP"],"master":"mgmt"}]"#;
const ADDRESS_SHOW: &str = r#"[
    {"ifindex":1,"ifname":"lo","addr_info":[{"family":"inet","local":"127.0.0.1","prefixlen":8}]},
    {"ifindex":2,"ifname":"eth0","addr_info":[{"family":"inet","local":"192.168.1.10","prefixlen":24}]},
    {"ifindex":8,"ifname":"Ethernet4","addr_info":[
        {"family":"inet","local":"10.0.0.1","prefixlen":31},
        {"family":"inet6","local":"fc00::1","prefixlen":126}
    ]},
    {"ifindex":9,"ifname":"Ethernet8","addr_info":[{"family":"inet","local":"10.0.0.8","prefixlen":31}]},
    {"ifindex":20,"ifname":"Vrf_data"}
]"#;

type Mgr = SyslogMgr<MemoryConfigDb, ScriptedRunner, IpInspector<ScriptedRunner>>;

struct Switch {
    host: MemoryConfigDb,
    asics: Vec<MemoryConfigDb>,
    runner: ScriptedRunner,
    out: SharedBuffer,
    mgr: Mgr,
}

impl Switch {
    fn new(num_asics: u32, host: MemoryConfigDb) -> Self {
        let runner = ScriptedRunner::new();
        runner
            .respond_ok(&["ip", "--json", "vrf", "show"], VRF_SHOW)
            .respond_ok(&["ip", "--json", "link", "show", "vrf", "Vrf_data"], VRF_DATA_LINKS)
            .respond_ok(&["ip", "--json", "link", "show", "vrf", "mgmt"], MGMT_LINKS)
            .respond_ok(&["ip", "--json", "address", "show"], ADDRESS_SHOW);

        let platform = Platform::new(num_asics);
        let mut dbs = DbClients::new(host.clone());
        let mut asics = Vec::new();
        for ns in platform.namespaces() {
            let db = MemoryConfigDb::new();
            dbs.insert(ns, db.clone());
            asics.push(db);
        }

        let out = SharedBuffer::new();
        let mgr = SyslogMgr::new(dbs, runner.clone(), IpInspector::new(runner.clone()), platform)
            .with_output(out.clone());
        Self {
            host,
            asics,
            runner,
            out,
            mgr,
        }
    }

    async fn run(&mut self, args: &[&str]) -> Result<(), SyslogError> {
        let cli = Cli::try_parse_from(std::iter::once("syslog").chain(args.iter().copied()))
            .expect("arguments should parse");
        cli.command.execute(&mut self.mgr).await
    }

    fn ip_queries(&self) -> Vec<String> {
        self.runner
            .command_lines()
            .into_iter()
            .filter(|c| c.starts_with("ip "))
            .collect()
    }
}

fn multi_asic_features() -> MemoryConfigDb {
    MemoryConfigDb::new().with_changes([
        feature_fixtures::global_feature("snmp"),
        feature_fixtures::per_asic_feature("bgp"),
        feature_fixtures::dual_scope_feature("database"),
        feature_fixtures::unsupported_feature("pmon"),
    ])
}

#[tokio::test]
async fn test_add_with_data_vrf_source() {
    let host = MemoryConfigDb::new().with_changes([syslog_fixtures::data_vrf("Vrf_data")]);
    let mut switch = Switch::new(1, host);

    switch
        .run(&["add", "2.2.2.2", "-s", "10.0.0.1", "-r", "Vrf_data"])
        .await
        .unwrap();

    let verifier = DbVerifier::new(&switch.host);
    verifier
        .assert_field_value("SYSLOG_SERVER", "2.2.2.2", "source", "10.0.0.1")
        .unwrap();
    verifier
        .assert_field_value("SYSLOG_SERVER", "2.2.2.2", "vrf", "Vrf_data")
        .unwrap();
    verifier
        .assert_field_absent("SYSLOG_SERVER", "2.2.2.2", "port")
        .unwrap();
    assert_eq!(
        switch.ip_queries(),
        vec![
            "ip --json vrf show",
            "ip --json link show vrf Vrf_data",
            "ip --json link show vrf mgmt",
            "ip --json address show",
        ]
    );
    CommandVerifier::from_runner(&switch.runner)
        .assert_command_executed("systemctl restart rsyslog-config")
        .unwrap();
}

#[tokio::test]
async fn test_add_source_in_default_vrf() {
    let mut switch = Switch::new(1, MemoryConfigDb::new());

    switch.run(&["add", "2.2.2.2", "-s", "10.0.0.8"]).await.unwrap();
    assert!(switch.host.entry("SYSLOG_SERVER", "2.2.2.2").is_some());

    let err = switch
        .run(&["add", "3.3.3.3", "-s", "10.0.0.1"])
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid value for '-s' / '--source': 10.0.0.1 IP doesn't exist in Linux default VRF"
    );
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_add_mgmt_vrf() {
    let host = MemoryConfigDb::new().with_changes([syslog_fixtures::mgmt_vrf(false)]);
    let mut switch = Switch::new(1, host);

    let err = switch
        .run(&["add", "2.2.2.2", "-r", "mgmt"])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid value for '-r' / '--vrf': mgmt VRF is not enabled");
    assert!(switch.ip_queries().is_empty());

    switch.host.apply(&syslog_fixtures::mgmt_vrf(true));
    switch
        .run(&["add", "2.2.2.2", "-s", "192.168.1.10", "-r", "mgmt", "-p", "5514"])
        .await
        .unwrap();
    DbVerifier::new(&switch.host)
        .assert_field_value("SYSLOG_SERVER", "2.2.2.2", "port", "5514")
        .unwrap();
}

#[tokio::test]
async fn test_add_rejects_before_querying_linux() {
    let mut switch = Switch::new(1, MemoryConfigDb::new());

    let err = switch
        .run(&["add", "2001:db8::5", "-s", "10.0.0.1"])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyslogError::Validation(ValidationError::FamilyMismatch { .. })
    ));

    let err = switch
        .run(&["add", "2.2.2.2", "-r", "Vrf_missing"])
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid value for '-r' / '--vrf': 'Vrf_missing' is not one of 'default'."
    );
    assert!(switch.runner.calls().is_empty());
}

#[tokio::test]
async fn test_add_fails_when_ip_query_fails() {
    let host = MemoryConfigDb::new().with_changes([syslog_fixtures::data_vrf("Vrf_data")]);
    let mut switch = Switch::new(1, host);
    switch.runner.respond(
        &["ip", "--json", "vrf", "show"],
        ExecResult::failed(255, "Error: ipv4: FIB table does not exist."),
    );

    let err = switch
        .run(&["add", "2.2.2.2", "-r", "Vrf_data"])
        .await
        .unwrap_err();
    assert!(matches!(err, SyslogError::SystemQuery { .. }));
    assert_eq!(err.exit_code(), 1);
    assert!(switch.host.keys("SYSLOG_SERVER").is_empty());
}

#[tokio::test]
async fn test_del_round_trip() {
    let mut switch = Switch::new(1, MemoryConfigDb::new());

    switch.run(&["add", "10.1.1.1"]).await.unwrap();
    DbVerifier::new(&switch.host)
        .assert_key_exists("SYSLOG_SERVER", "10.1.1.1")
        .unwrap();
    switch.run(&["del", "10.1.1.1"]).await.unwrap();
    assert!(switch.host.keys("SYSLOG_SERVER").is_empty());

    CommandVerifier::from_runner(&switch.runner)
        .assert_command_count(4)
        .unwrap();
}

#[tokio::test]
async fn test_rate_limit_container_all_namespaces() {
    let mut switch = Switch::new(2, multi_asic_features());

    switch
        .run(&["rate-limit-container", "database", "-i", "300", "-b", "20000"])
        .await
        .unwrap();
    for db in std::iter::once(&switch.host).chain(switch.asics.iter()) {
        let verifier = DbVerifier::new(db);
        verifier
            .assert_field_value("SYSLOG_CONFIG_FEATURE", "database", "rate_limit_interval", "300")
            .unwrap();
        verifier
            .assert_field_value("SYSLOG_CONFIG_FEATURE", "database", "rate_limit_burst", "20000")
            .unwrap();
    }

    switch
        .run(&["rate-limit-container", "bgp", "-b", "500"])
        .await
        .unwrap();
    assert!(switch.host.entry("SYSLOG_CONFIG_FEATURE", "bgp").is_none());
    for db in &switch.asics {
        DbVerifier::new(db)
            .assert_field_value("SYSLOG_CONFIG_FEATURE", "bgp", "rate_limit_burst", "500")
            .unwrap();
    }
}

#[tokio::test]
async fn test_rate_limit_container_single_namespace() {
    let mut switch = Switch::new(2, multi_asic_features());

    switch
        .run(&["rate-limit-container", "bgp", "-i", "10", "-n", "asic1"])
        .await
        .unwrap();
    assert!(switch.asics[0].entry("SYSLOG_CONFIG_FEATURE", "bgp").is_none());
    DbVerifier::new(&switch.asics[1])
        .assert_field_value("SYSLOG_CONFIG_FEATURE", "bgp", "rate_limit_interval", "10")
        .unwrap();

    let err = switch
        .run(&["rate-limit-container", "bgp", "-i", "10", "-n", "default"])
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid service name bgp for global scope, please choose from: snmp,database"
    );
    assert_eq!(err.exit_code(), 1);

    let err = switch
        .run(&["rate-limit-container", "snmp", "-i", "10", "-n", "asic7"])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyslogError::Validation(ValidationError::InvalidNamespace { .. })
    ));

    let err = switch
        .run(&["rate-limit-container", "bgp", "-i", "10", "-n", "asic01"])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyslogError::Validation(ValidationError::InvalidNamespace { .. })
    ));
}

#[tokio::test]
async fn test_rate_limit_feature_multi_asic() {
    let mut switch = Switch::new(2, multi_asic_features());
    switch
        .runner
        .respond_ok(&["docker", "ps"], "snmp\ndatabase\nbgp0\ndatabase0\ndatabase1")
        .respond_ok(
            &["docker", "exec", "-i", "database", "supervisorctl", "status"],
            "containercfgd: ERROR (no such process)",
        )
        .respond_ok(
            &["docker", "exec", "-i", "database0", "supervisorctl", "status"],
            "containercfgd RUNNING pid 12",
        )
        .respond_ok(
            &["docker", "exec", "-i", "database1", "supervisorctl", "status"],
            "containercfgd RUNNING pid 13",
        );

    switch
        .run(&["rate-limit-feature", "disable", "database"])
        .await
        .unwrap();

    assert_eq!(
        switch.out.lines(),
        vec![
            "Disabling syslog rate limit feature for database",
            "Syslog rate limit feature is already disabled in database, ignoring...",
            "Disabling syslog rate limit feature for database0",
            "Disabled syslog rate limit feature for database0",
            "Disabling syslog rate limit feature for database1",
            "Disabled syslog rate limit feature for database1",
        ]
    );
    let verifier = CommandVerifier::from_runner(&switch.runner);
    verifier
        .assert_command_executed("docker exec -i database1 supervisorctl stop containercfgd")
        .unwrap();
    verifier
        .assert_command_not_executed("docker exec -i database supervisorctl stop")
        .unwrap();
}

#[tokio::test]
async fn test_rate_limit_feature_asic_namespace() {
    let mut switch = Switch::new(2, multi_asic_features());
    switch.runner.respond_ok(&["docker", "ps"], "bgp0");

    switch
        .run(&["rate-limit-feature", "enable", "-n", "asic1"])
        .await
        .unwrap();
    assert_eq!(
        switch.out.lines(),
        vec![
            "Enabling syslog rate limit feature for bgp1",
            "bgp1 is not running, ignoring...",
            "Enabling syslog rate limit feature for database1",
            "database1 is not running, ignoring...",
        ]
    );

    let err = switch
        .run(&["rate-limit-feature", "enable", "snmp", "-n", "asic0"])
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid service name snmp for per-ASIC scope, please choose from: bgp,database"
    );
}

#[tokio::test]
async fn test_service_without_rate_limit_support() {
    let mut switch = Switch::new(2, multi_asic_features());
    switch.runner.respond_ok(&["docker", "ps"], "snmp\nbgp0");

    switch
        .run(&["rate-limit-container", "pmon", "-i", "5"])
        .await
        .unwrap();
    assert!(switch.host.entry("SYSLOG_CONFIG_FEATURE", "pmon").is_none());
    for db in &switch.asics {
        assert!(db.entry("SYSLOG_CONFIG_FEATURE", "pmon").is_none());
    }

    let err = switch
        .run(&["rate-limit-container", "pmon", "-i", "5", "-n", "default"])
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid service name pmon for global scope, please choose from: snmp,database"
    );

    switch
        .run(&["rate-limit-feature", "enable", "pmon"])
        .await
        .unwrap();
    assert_eq!(
        switch.out.lines(),
        vec![
            "Enabling syslog rate limit feature for pmon",
            "pmon is not running, ignoring...",
        ]
    );
}

#[tokio::test]
async fn test_level_in_asic_namespace() {
    let mut switch = Switch::new(2, MemoryConfigDb::new());
    switch.asics[1].apply(&syslog_fixtures::logger("orchagent", "NOTICE", true));

    switch
        .run(&[
            "level",
            "-i",
            "orchagent",
            "-l",
            "DEBUG",
            "--container",
            "swss",
            "--pid",
            "57",
            "-n",
            "asic1",
        ])
        .await
        .unwrap();

    DbVerifier::new(&switch.asics[1])
        .assert_field_value("LOGGER", "orchagent", "LOGLEVEL", "DEBUG")
        .unwrap();
    assert!(switch.host.entry("LOGGER", "orchagent").is_none());
    assert_eq!(
        switch.runner.command_lines(),
        vec!["docker exec -i swss1 kill -s SIGHUP 57"]
    );

    let err = switch
        .run(&["level", "-i", "orchagent", "-l", "INFO", "-n", "default"])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyslogError::Validation(ValidationError::InvalidNamespace { .. })
    ));

    let err = switch
        .run(&["level", "-i", "orchagent", "-l", "INFO", "-n", "asic01"])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyslogError::Validation(ValidationError::InvalidNamespace { .. })
    ));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_add_after_vrf_removed() {
    let host = MemoryConfigDb::new().with_changes([syslog_fixtures::data_vrf("Vrf_data")]);
    let mut switch = Switch::new(1, host);

    switch.host.apply(&ConfigChange::del("VRF", "Vrf_data"));
    let err = switch
        .run(&["add", "2.2.2.2", "-r", "Vrf_data"])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyslogError::Validation(ValidationError::InvalidVrfChoice { .. })
    ));
}

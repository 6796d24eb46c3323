//! Feature scope resolution
//!
//! Maps a FEATURE table, an optional service and a namespace selection to
//! the container names a rate-limit command operates on (`bgp`, `bgp0`,
//! `bgp1`, ...).

use sonic_cli_common::platform::container_name;
use sonic_cli_common::{ConfigDb, Platform, SonicResult, Table};

use crate::error::ValidationError;
use crate::tables::CFG_FEATURE_TABLE_NAME;
use crate::types::{FeatureDescriptor, NamespaceScope, Scope};

/// FEATURE table in CONFIG_DB order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureTable {
    features: Vec<FeatureDescriptor>,
}

impl FeatureTable {
    pub fn from_table(table: &Table) -> Self {
        Self {
            features: table
                .iter()
                .map(|(name, row)| FeatureDescriptor::from_row(name.as_str(), row))
                .collect(),
        }
    }

    /// Reads the FEATURE table.
    pub async fn load<D: ConfigDb + ?Sized>(db: &D) -> SonicResult<Self> {
        let table = db.get_table(CFG_FEATURE_TABLE_NAME).await?;
        Ok(Self::from_table(&table))
    }

    pub fn get(&self, name: &str) -> Option<&FeatureDescriptor> {
        self.features.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.features.iter().map(|f| f.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureDescriptor> {
        self.features.iter()
    }

    /// Checks `service` is listed in the table.
    pub fn validate_service(&self, service: &str) -> Result<&FeatureDescriptor, ValidationError> {
        self.get(service)
            .ok_or_else(|| ValidationError::UnknownService {
                service: service.to_string(),
                choices: self.names(),
            })
    }
}

/// Rate-limit capable features split by scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureScopes {
    global: Vec<String>,
    per_asic: Vec<String>,
}

impl FeatureScopes {
    /// Splits `table` by scope.
    ///
    /// On multi-ASIC platforms a feature lands in every scope it declares;
    /// on single-ASIC platforms every capable feature is global.
    pub fn split(table: &FeatureTable, is_multi_asic: bool) -> Self {
        let mut scopes = Self::default();
        for feature in table.iter().filter(|f| f.support_rate_limit) {
            if !is_multi_asic {
                scopes.global.push(feature.name.clone());
                continue;
            }
            if feature.in_scope(Scope::Global) {
                scopes.global.push(feature.name.clone());
            }
            if feature.in_scope(Scope::PerAsic) {
                scopes.per_asic.push(feature.name.clone());
            }
        }
        scopes
    }

    /// Feature names in `scope`.
    pub fn names(&self, scope: Scope) -> &[String] {
        match scope {
            Scope::Global => &self.global,
            Scope::PerAsic => &self.per_asic,
        }
    }

    pub fn contains(&self, scope: Scope, service: &str) -> bool {
        self.names(scope).iter().any(|n| n == service)
    }

    /// Checks `service` has an instance in `scope`.
    pub fn require(&self, scope: Scope, service: &str) -> Result<(), ValidationError> {
        if self.contains(scope, service) {
            Ok(())
        } else {
            Err(ValidationError::ServiceNotInScope {
                service: service.to_string(),
                scope,
                choices: self.names(scope).to_vec(),
            })
        }
    }
}

/// Resolves the container names a `rate-limit-feature` command applies to.
///
/// Names follow FEATURE table order; per-ASIC instances are listed by
/// ascending ASIC index.
pub fn resolve(
    table: &FeatureTable,
    service: Option<&str>,
    namespace: NamespaceScope,
    platform: &Platform,
) -> Result<Vec<String>, ValidationError> {
    let feature = service.map(|s| table.validate_service(s)).transpose()?;
    let scopes = FeatureScopes::split(table, platform.is_multi_asic());
    let asic_ids = || {
        let count = if platform.is_multi_asic() {
            platform.num_asics()
        } else {
            0
        };
        0..count
    };

    let names = match (namespace, service) {
        (NamespaceScope::All, None) => {
            let mut names = scopes.names(Scope::Global).to_vec();
            for id in asic_ids() {
                names.extend(
                    scopes
                        .names(Scope::PerAsic)
                        .iter()
                        .map(|name| container_name(name, id)),
                );
            }
            names
        }
        (NamespaceScope::All, Some(service)) => {
            // Own scope flags, regardless of rate-limit support.
            let mut names = Vec::new();
            if feature.is_some_and(|f| f.in_scope(Scope::Global)) {
                names.push(service.to_string());
            }
            if feature.is_some_and(|f| f.in_scope(Scope::PerAsic)) {
                names.extend(asic_ids().map(|id| container_name(service, id)));
            }
            names
        }
        (NamespaceScope::Default, None) => scopes.names(Scope::Global).to_vec(),
        (NamespaceScope::Default, Some(service)) => {
            scopes.require(Scope::Global, service)?;
            vec![service.to_string()]
        }
        (NamespaceScope::Asic(id), None) => scopes
            .names(Scope::PerAsic)
            .iter()
            .map(|name| container_name(name, id))
            .collect(),
        (NamespaceScope::Asic(id), Some(service)) => {
            scopes.require(Scope::PerAsic, service)?;
            vec![container_name(service, id)]
        }
    };
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sonic_cli_test::{feature_fixtures, ConfigChange, MemoryConfigDb};

    fn table(changes: impl IntoIterator<Item = ConfigChange>) -> FeatureTable {
        let rows: Table = changes.into_iter().map(|c| (c.key, c.fields)).collect();
        FeatureTable::from_table(&rows)
    }

    fn multi_asic_table() -> FeatureTable {
        table([
            feature_fixtures::global_feature("snmp"),
            feature_fixtures::per_asic_feature("bgp"),
            feature_fixtures::dual_scope_feature("database"),
            feature_fixtures::unsupported_feature("pmon"),
            feature_fixtures::per_asic_feature("swss"),
        ])
    }

    #[test]
    fn test_split_multi_asic() {
        let scopes = FeatureScopes::split(&multi_asic_table(), true);
        assert_eq!(scopes.names(Scope::Global), ["snmp", "database"]);
        assert_eq!(scopes.names(Scope::PerAsic), ["bgp", "database", "swss"]);
    }

    #[test]
    fn test_split_single_asic_is_all_global() {
        let scopes = FeatureScopes::split(&multi_asic_table(), false);
        assert_eq!(scopes.names(Scope::Global), ["snmp", "bgp", "database", "swss"]);
        assert!(scopes.names(Scope::PerAsic).is_empty());
    }

    #[test]
    fn test_single_asic_all_services() {
        let names = resolve(
            &multi_asic_table(),
            None,
            NamespaceScope::All,
            &Platform::single_asic(),
        )
        .unwrap();
        assert_eq!(names, vec!["snmp", "bgp", "database", "swss"]);
    }

    #[test]
    fn test_multi_asic_all_services() {
        let names = resolve(&multi_asic_table(), None, NamespaceScope::All, &Platform::new(2)).unwrap();
        assert_eq!(
            names,
            vec!["snmp", "database", "bgp0", "database0", "swss0", "bgp1", "database1", "swss1"]
        );
    }

    #[test]
    fn test_multi_asic_per_asic_service() {
        let names = resolve(
            &multi_asic_table(),
            Some("bgp"),
            NamespaceScope::All,
            &Platform::new(2),
        )
        .unwrap();
        assert_eq!(names, vec!["bgp0", "bgp1"]);

        let names = resolve(
            &multi_asic_table(),
            Some("database"),
            NamespaceScope::All,
            &Platform::new(2),
        )
        .unwrap();
        assert_eq!(names, vec!["database", "database0", "database1"]);
    }

    #[test]
    fn test_single_asic_service() {
        let platform = Platform::single_asic();
        let names = resolve(&multi_asic_table(), Some("snmp"), NamespaceScope::All, &platform).unwrap();
        assert_eq!(names, vec!["snmp"]);

        let names = resolve(&multi_asic_table(), Some("database"), NamespaceScope::All, &platform).unwrap();
        assert_eq!(names, vec!["database"]);
    }

    #[test]
    fn test_single_asic_per_asic_only_service_resolves_to_nothing() {
        let table = table([feature_fixtures::per_asic_feature("bgp")]);
        let names = resolve(&table, Some("bgp"), NamespaceScope::All, &Platform::single_asic()).unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn test_named_service_uses_own_scope_flags() {
        let table = table([
            ConfigChange::set("FEATURE", "snmp")
                .with_field("state", "enabled")
                .with_field("has_global_scope", "True")
                .with_field("has_per_asic_scope", "False"),
            feature_fixtures::per_asic_feature("bgp"),
        ]);
        let platform = Platform::new(2);

        let names = resolve(&table, Some("snmp"), NamespaceScope::All, &platform).unwrap();
        assert_eq!(names, vec!["snmp"]);

        let pmon = resolve(
            &multi_asic_table(),
            Some("pmon"),
            NamespaceScope::All,
            &platform,
        )
        .unwrap();
        assert_eq!(pmon, vec!["pmon"]);
    }

    #[test]
    fn test_asic_namespace() {
        let platform = Platform::new(2);
        let names = resolve(&multi_asic_table(), Some("bgp"), NamespaceScope::Asic(1), &platform).unwrap();
        assert_eq!(names, vec!["bgp1"]);

        let names = resolve(&multi_asic_table(), None, NamespaceScope::Asic(1), &platform).unwrap();
        assert_eq!(names, vec!["bgp1", "database1", "swss1"]);

        let err = resolve(&multi_asic_table(), Some("snmp"), NamespaceScope::Asic(1), &platform)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::ServiceNotInScope {
                service: "snmp".to_string(),
                scope: Scope::PerAsic,
                choices: vec!["bgp".to_string(), "database".to_string(), "swss".to_string()],
            }
        );
    }

    #[test]
    fn test_default_namespace() {
        let platform = Platform::new(2);
        let names = resolve(&multi_asic_table(), None, NamespaceScope::Default, &platform).unwrap();
        assert_eq!(names, vec!["snmp", "database"]);

        let names =
            resolve(&multi_asic_table(), Some("snmp"), NamespaceScope::Default, &platform).unwrap();
        assert_eq!(names, vec!["snmp"]);

        let err = resolve(&multi_asic_table(), Some("bgp"), NamespaceScope::Default, &platform)
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ServiceNotInScope {
                scope: Scope::Global,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_and_unsupported_services() {
        let platform = Platform::new(2);
        let err = resolve(&multi_asic_table(), Some("foo"), NamespaceScope::All, &platform).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownService {
                service: "foo".to_string(),
                choices: vec![
                    "snmp".to_string(),
                    "bgp".to_string(),
                    "database".to_string(),
                    "pmon".to_string(),
                    "swss".to_string(),
                ],
            }
        );

        // pmon exists but is missing from the rate-limit scope maps
        let err = resolve(&multi_asic_table(), Some("pmon"), NamespaceScope::Default, &platform)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::ServiceNotInScope {
                service: "pmon".to_string(),
                scope: Scope::Global,
                choices: vec!["snmp".to_string(), "database".to_string()],
            }
        );
    }

    #[test]
    fn test_empty_table() {
        let names = resolve(&FeatureTable::default(), None, NamespaceScope::All, &Platform::new(2)).unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn test_load_preserves_order() {
        let db = MemoryConfigDb::new().with_changes([
            feature_fixtures::per_asic_feature("swss"),
            feature_fixtures::global_feature("snmp"),
            feature_fixtures::per_asic_feature("bgp"),
        ]);
        let table = FeatureTable::load(&db).await.unwrap();
        assert_eq!(table.names(), vec!["swss", "snmp", "bgp"]);
        assert!(table.get("snmp").unwrap().has_global_scope);
    }
}

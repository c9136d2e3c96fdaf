// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory resource engine.
//!
//! `PlanEngine` records every declaration instead of calling AWS and hands back
//! deterministic identifiers derived from logical names, which makes it the
//! preview backend of the CLI and the engine used throughout the tests.

use crate::domain::{Result, StackError};
use crate::ports::{ResourceEngine, ResourceKind, ResourceRef, ResourceSpec};
use std::collections::{BTreeMap, HashMap};

/// Account id used when none is configured.
pub const DEFAULT_ACCOUNT_ID: &str = "000000000000";

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Placeholder for values only the real engine can compute.
pub const COMPUTED: &str = "(known after apply)";

/// Recording resource engine.
///
/// # Examples
///
/// ```rust
/// use stackcfg::adapters::PlanEngine;
/// use stackcfg::ports::{ResourceEngine, ResourceKind, ResourceSpec};
///
/// let mut engine = PlanEngine::new();
/// let vpc = engine.declare(ResourceSpec::new(ResourceKind::Vpc, "dev-vpc-vpc")).unwrap();
///
/// assert_eq!(vpc.id, "vpc-dev-vpc-vpc");
/// assert_eq!(engine.count(ResourceKind::Vpc), 1);
/// assert!(engine.lookup(ResourceKind::IamUser, "pulumi-dev-user").unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PlanEngine {
    account_id: String,
    region: String,
    zone_count: usize,
    declared: Vec<ResourceSpec>,
    refs: HashMap<String, ResourceRef>,
    existing: HashMap<(ResourceKind, String), ResourceRef>,
}

impl PlanEngine {
    /// Creates an engine for the default account and region with three zones.
    pub fn new() -> Self {
        Self {
            account_id: DEFAULT_ACCOUNT_ID.to_string(),
            region: DEFAULT_REGION.to_string(),
            zone_count: 3,
            declared: Vec::new(),
            refs: HashMap::new(),
            existing: HashMap::new(),
        }
    }

    /// Sets the account id used in ARNs.
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = account_id.into();
        self
    }

    /// Sets the region used in regional ARNs and endpoints.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sets how many availability zones every region reports.
    pub fn with_zone_count(mut self, zone_count: usize) -> Self {
        self.zone_count = zone_count;
        self
    }

    /// Seeds a pre-existing resource that `lookup` will find.
    pub fn with_existing(mut self, kind: ResourceKind, name: impl Into<String>) -> Self {
        let name = name.into();
        let existing = ResourceRef {
            kind,
            name: name.clone(),
            id: format!("{}-{}", kind.id_prefix(), name),
            arn: self.arn_for(kind, &name),
            attributes: BTreeMap::new(),
        };
        self.existing.insert((kind, name), existing);
        self
    }

    /// Declarations in the order they were made.
    pub fn resources(&self) -> &[ResourceSpec] {
        &self.declared
    }

    /// Declarations of one kind, in order.
    pub fn resources_of(&self, kind: ResourceKind) -> Vec<&ResourceSpec> {
        self.declared.iter().filter(|r| r.kind == kind).collect()
    }

    /// Number of declarations of one kind.
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.declared.iter().filter(|r| r.kind == kind).count()
    }

    /// Looks up a declaration by logical name.
    pub fn find(&self, name: &str) -> Option<&ResourceSpec> {
        self.declared.iter().find(|r| r.name == name)
    }

    /// Returns the handle issued for a logical name.
    pub fn handle(&self, name: &str) -> Option<&ResourceRef> {
        self.refs.get(name)
    }

    /// Per-kind declaration counts, ordered by kind.
    pub fn summary(&self) -> BTreeMap<ResourceKind, usize> {
        let mut summary = BTreeMap::new();
        for spec in &self.declared {
            *summary.entry(spec.kind).or_insert(0) += 1;
        }
        summary
    }

    fn arn_for(&self, kind: ResourceKind, name: &str) -> Option<String> {
        let account = &self.account_id;
        match kind {
            ResourceKind::IamUser => Some(format!("arn:aws:iam::{}:user/{}", account, name)),
            ResourceKind::IamPolicy => Some(format!("arn:aws:iam::{}:policy/{}", account, name)),
            ResourceKind::EksCluster => Some(format!(
                "arn:aws:eks:{}:{}:cluster/{}",
                self.region, account, name
            )),
            ResourceKind::OidcProvider => Some(format!(
                "arn:aws:iam::{}:oidc-provider/{}",
                account,
                name.trim_start_matches("https://")
            )),
            _ => None,
        }
    }

    /// Provider-side name: the `name` (or `url`) property when set, else the
    /// logical name.
    fn physical_name(spec: &ResourceSpec) -> String {
        ["name", "url"]
            .iter()
            .find_map(|prop| spec.property(prop).and_then(|v| v.as_str()))
            .unwrap_or(&spec.name)
            .to_string()
    }

    fn computed_attributes(&self, spec: &ResourceSpec, physical: &str) -> BTreeMap<String, String> {
        let mut attributes = BTreeMap::new();
        match spec.kind {
            ResourceKind::IamAccessKey => {
                attributes.insert("secret".to_string(), COMPUTED.to_string());
            }
            ResourceKind::EksCluster => {
                attributes.insert(
                    "endpoint".to_string(),
                    format!("https://{}.eks.{}.amazonaws.com", physical, self.region),
                );
                attributes.insert("certificate_authority".to_string(), COMPUTED.to_string());
            }
            ResourceKind::Vpc | ResourceKind::Subnet => {
                if let Some(cidr) = spec.property("cidrBlock").and_then(|v| v.as_str()) {
                    attributes.insert("cidr_block".to_string(), cidr.to_string());
                }
            }
            _ => {}
        }
        attributes
    }
}

impl Default for PlanEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceEngine for PlanEngine {
    fn name(&self) -> &str {
        "plan"
    }

    fn declare(&mut self, spec: ResourceSpec) -> Result<ResourceRef> {
        if self.refs.contains_key(&spec.name) {
            return Err(StackError::engine(
                self.name(),
                format!("duplicate resource name '{}'", spec.name),
            ));
        }

        let physical = Self::physical_name(&spec);
        let handle = ResourceRef {
            kind: spec.kind,
            name: spec.name.clone(),
            id: format!("{}-{}", spec.kind.id_prefix(), spec.name),
            arn: self.arn_for(spec.kind, &physical),
            attributes: self.computed_attributes(&spec, &physical),
        };

        if spec.kind.is_billable() {
            tracing::debug!("Planned billable resource {} '{}'", spec.kind, spec.name);
        }
        self.refs.insert(spec.name.clone(), handle.clone());
        self.declared.push(spec);
        Ok(handle)
    }

    fn lookup(&self, kind: ResourceKind, name: &str) -> Result<Option<ResourceRef>> {
        Ok(self.existing.get(&(kind, name.to_string())).cloned())
    }

    fn availability_zones(&self, region: &str) -> Result<Vec<String>> {
        if region.is_empty() {
            return Err(StackError::engine(self.name(), "region must not be empty"));
        }
        Ok((b'a'..)
            .take(self.zone_count.min(26))
            .map(|suffix| format!("{}{}", region, suffix as char))
            .collect())
    }
}

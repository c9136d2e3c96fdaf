// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource engine trait definition.
//!
//! The resource engine is the external infrastructure-as-code runtime. Modules
//! hand it declarations of desired state; it owns diffing, ordering, retries and
//! the actual cloud API calls. Existence probes are plain queries that return
//! `Ok(None)` when nothing is there.

use crate::domain::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// The AWS resource types the provisioning modules declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ResourceKind {
    /// `aws:ec2/vpc:Vpc`
    Vpc,
    /// `aws:ec2/internetGateway:InternetGateway`
    InternetGateway,
    /// `aws:ec2/routeTable:RouteTable`
    RouteTable,
    /// `aws:ec2/route:Route`
    Route,
    /// `aws:ec2/routeTableAssociation:RouteTableAssociation`
    RouteTableAssociation,
    /// `aws:ec2/subnet:Subnet`
    Subnet,
    /// `aws:ec2/eip:Eip`
    ElasticIp,
    /// `aws:ec2/natGateway:NatGateway`
    NatGateway,
    /// `aws:iam/user:User`
    IamUser,
    /// `aws:iam/accessKey:AccessKey`
    IamAccessKey,
    /// `aws:iam/policy:Policy`
    IamPolicy,
    /// `aws:iam/userPolicyAttachment:UserPolicyAttachment`
    IamUserPolicyAttachment,
    /// `eks:index:Cluster`
    EksCluster,
    /// `aws:iam/openIdConnectProvider:OpenIdConnectProvider`
    OidcProvider,
}

impl ResourceKind {
    /// The engine's type token for this kind.
    pub fn type_token(&self) -> &'static str {
        match self {
            ResourceKind::Vpc => "aws:ec2/vpc:Vpc",
            ResourceKind::InternetGateway => "aws:ec2/internetGateway:InternetGateway",
            ResourceKind::RouteTable => "aws:ec2/routeTable:RouteTable",
            ResourceKind::Route => "aws:ec2/route:Route",
            ResourceKind::RouteTableAssociation => {
                "aws:ec2/routeTableAssociation:RouteTableAssociation"
            }
            ResourceKind::Subnet => "aws:ec2/subnet:Subnet",
            ResourceKind::ElasticIp => "aws:ec2/eip:Eip",
            ResourceKind::NatGateway => "aws:ec2/natGateway:NatGateway",
            ResourceKind::IamUser => "aws:iam/user:User",
            ResourceKind::IamAccessKey => "aws:iam/accessKey:AccessKey",
            ResourceKind::IamPolicy => "aws:iam/policy:Policy",
            ResourceKind::IamUserPolicyAttachment => {
                "aws:iam/userPolicyAttachment:UserPolicyAttachment"
            }
            ResourceKind::EksCluster => "eks:index:Cluster",
            ResourceKind::OidcProvider => "aws:iam/openIdConnectProvider:OpenIdConnectProvider",
        }
    }

    /// Prefix of AWS identifiers of this kind (`vpc-`, `subnet-`, ...).
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ResourceKind::Vpc => "vpc",
            ResourceKind::InternetGateway => "igw",
            ResourceKind::RouteTable => "rtb",
            ResourceKind::Route => "r",
            ResourceKind::RouteTableAssociation => "rtbassoc",
            ResourceKind::Subnet => "subnet",
            ResourceKind::ElasticIp => "eipalloc",
            ResourceKind::NatGateway => "nat",
            ResourceKind::IamUser => "user",
            ResourceKind::IamAccessKey => "AKIA",
            ResourceKind::IamPolicy => "policy",
            ResourceKind::IamUserPolicyAttachment => "attach",
            ResourceKind::EksCluster => "cluster",
            ResourceKind::OidcProvider => "oidc",
        }
    }

    /// Returns true for kinds that are billed while they exist.
    pub fn is_billable(&self) -> bool {
        matches!(
            self,
            ResourceKind::ElasticIp | ResourceKind::NatGateway | ResourceKind::EksCluster
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_token())
    }
}

/// Desired state of one resource.
///
/// Properties are untyped JSON, in the engine's input naming.
///
/// # Examples
///
/// ```
/// use stackcfg::ports::{ResourceKind, ResourceSpec};
/// use serde_json::json;
///
/// let spec = ResourceSpec::new(ResourceKind::Vpc, "dev-vpc-vpc")
///     .with_property("cidrBlock", json!("10.10.0.0/16"))
///     .with_tag("Environment", "dev");
///
/// assert_eq!(spec.property("cidrBlock"), Some(&json!("10.10.0.0/16")));
/// assert_eq!(spec.tags.get("Environment").map(String::as_str), Some("dev"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSpec {
    /// Resource type
    pub kind: ResourceKind,
    /// Logical name, unique within a stack
    pub name: String,
    /// Logical name of the owning component, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Input properties
    pub properties: BTreeMap<String, serde_json::Value>,
    /// AWS tags
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl ResourceSpec {
    /// Creates an empty declaration.
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            parent: None,
            properties: BTreeMap::new(),
            tags: BTreeMap::new(),
        }
    }

    /// Sets an input property.
    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Adds a tag.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Parents the resource under a component.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Returns an input property.
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}

/// Handle to a declared or pre-existing resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRef {
    /// Resource type
    pub kind: ResourceKind,
    /// Logical name
    pub name: String,
    /// Provider identifier (`vpc-...`, `subnet-...`)
    pub id: String,
    /// ARN, for resources that have one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    /// Additional computed attributes
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl ResourceRef {
    /// Returns a computed attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns the ARN, or the id for resources without one.
    pub fn arn_or_id(&self) -> &str {
        self.arn.as_deref().unwrap_or(&self.id)
    }
}

/// The infrastructure engine that turns declarations into cloud resources.
///
/// Implementations must treat repeated identical declarations across runs as the
/// same resource. Within one run, logical names are unique.
pub trait ResourceEngine {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Declares a resource and returns its handle.
    fn declare(&mut self, spec: ResourceSpec) -> Result<ResourceRef>;

    /// Looks up an existing resource by provider-side name.
    ///
    /// Absence is `Ok(None)`, not an error.
    fn lookup(&self, kind: ResourceKind, name: &str) -> Result<Option<ResourceRef>>;

    /// Availability zones currently usable in `region`, in a stable order.
    fn availability_zones(&self, region: &str) -> Result<Vec<String>>;
}

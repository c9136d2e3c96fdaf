// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subnet groups.
//!
//! A group declares one `/24` subnet per availability zone, up to the requested
//! count. Subnet `i` of a group gets `<prefix>.<offset + i>.0/24`.

use crate::domain::{Result, StackError};
use crate::ports::{ProvisionContext, ResourceKind, ResourceRef, ResourceSpec};
use serde_json::json;
use std::fmt;

/// Third-octet offset of public subnets.
pub const PUBLIC_CIDR_OFFSET: u32 = 0;

/// Third-octet offset of private subnets.
pub const PRIVATE_CIDR_OFFSET: u32 = 100;

/// Whether a subnet group is internet-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubnetTier {
    /// Routed through the internet gateway, public IPs on launch
    Public,
    /// Routed through NAT gateways, if any
    Private,
}

impl SubnetTier {
    /// Tag value and name suffix.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubnetTier::Public => "public",
            SubnetTier::Private => "private",
        }
    }

    /// Default third-octet offset of the tier.
    pub fn cidr_offset(&self) -> u32 {
        match self {
            SubnetTier::Public => PUBLIC_CIDR_OFFSET,
            SubnetTier::Private => PRIVATE_CIDR_OFFSET,
        }
    }

    /// Tag that lets EKS place load balancers in the subnet.
    fn load_balancer_role_tag(&self) -> &'static str {
        match self {
            SubnetTier::Public => "kubernetes.io/role/elb",
            SubnetTier::Private => "kubernetes.io/role/internal-elb",
        }
    }
}

impl fmt::Display for SubnetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the first two octets of an IPv4 CIDR block (`10.10.0.0/16` gives
/// `10.10`).
///
/// ```
/// use stackcfg::modules::vpc::subnets::cidr_prefix;
///
/// assert_eq!(cidr_prefix("vpc:cidr_block", "10.30.0.0/16").unwrap(), "10.30");
/// assert!(cidr_prefix("vpc:cidr_block", "not-a-cidr").is_err());
/// ```
pub fn cidr_prefix(key: &str, cidr: &str) -> Result<String> {
    let invalid = || StackError::invalid_value(key, cidr, "IPv4 CIDR block");

    let (address, mask) = cidr.split_once('/').ok_or_else(invalid)?;
    let mask: u8 = mask.parse().map_err(|_| invalid())?;
    if mask > 32 {
        return Err(invalid());
    }

    let octets = address
        .split('.')
        .map(|octet| octet.parse::<u8>().map_err(|_| invalid()))
        .collect::<Result<Vec<u8>>>()?;
    if octets.len() != 4 {
        return Err(invalid());
    }
    Ok(format!("{}.{}", octets[0], octets[1]))
}

/// Inputs of a subnet group.
#[derive(Debug, Clone)]
pub struct SubnetGroupArgs<'a> {
    /// Public or private
    pub tier: SubnetTier,
    /// Requested number of subnets
    pub count: usize,
    /// Environment tag
    pub environment: &'a str,
    /// First two octets of every subnet CIDR
    pub cidr_prefix: &'a str,
    /// Zones to spread subnets over, in order
    pub availability_zones: &'a [String],
}

/// Declared subnets of one group.
#[derive(Debug, Clone, Default)]
pub struct SubnetGroup {
    /// Subnets in zone order
    pub subnets: Vec<ResourceRef>,
}

impl SubnetGroup {
    /// Declares subnets `<name>-1`, `<name>-2`, ... for `vpc_id`.
    ///
    /// Fewer subnets than requested are declared when there are not enough
    /// zones.
    pub fn declare(
        ctx: &mut ProvisionContext<'_>,
        name: &str,
        vpc_id: &str,
        args: &SubnetGroupArgs<'_>,
    ) -> Result<Self> {
        let zones = args.availability_zones;
        if args.count > zones.len() {
            tracing::warn!(
                "Requested {} {} subnets but only {} availability zones are available",
                args.count,
                args.tier,
                zones.len()
            );
        }

        let mut subnets = Vec::new();
        for (i, zone) in zones.iter().take(args.count).enumerate() {
            let subnet_name = format!("{}-{}", name, i + 1);
            let cidr = format!(
                "{}.{}.0/24",
                args.cidr_prefix,
                args.tier.cidr_offset() as usize + i
            );

            let subnet = ctx.declare(
                ResourceSpec::new(ResourceKind::Subnet, &subnet_name)
                    .with_parent(name)
                    .with_property("vpcId", json!(vpc_id))
                    .with_property("cidrBlock", json!(cidr))
                    .with_property("availabilityZone", json!(zone))
                    .with_property(
                        "mapPublicIpOnLaunch",
                        json!(args.tier == SubnetTier::Public),
                    )
                    .with_tag("Name", &subnet_name)
                    .with_tag("Environment", args.environment)
                    .with_tag("Type", args.tier.as_str())
                    .with_tag(args.tier.load_balancer_role_tag(), "1"),
            )?;
            subnets.push(subnet);
        }

        Ok(Self { subnets })
    }

    /// Subnet identifiers in zone order.
    pub fn ids(&self) -> Vec<String> {
        self.subnets.iter().map(|s| s.id.clone()).collect()
    }

    /// Number of declared subnets.
    pub fn len(&self) -> usize {
        self.subnets.len()
    }

    /// Returns true if no subnet was declared.
    pub fn is_empty(&self) -> bool {
        self.subnets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing::with_context;

    fn zones(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("us-east-1{}", (b'a' + i as u8) as char)).collect()
    }

    #[test]
    fn test_cidr_prefix() {
        assert_eq!(cidr_prefix("k", "10.10.0.0/16").unwrap(), "10.10");
        assert_eq!(cidr_prefix("k", "172.31.0.0/16").unwrap(), "172.31");
        for bad in ["10.10.0.0", "10.10.0/16", "10.10.0.0/33", "300.1.0.0/16", ""] {
            assert!(
                matches!(cidr_prefix("k", bad), Err(StackError::ConfigTypeError { .. })),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_private_group_cidrs_and_tags() {
        let zones = zones(3);
        let args = SubnetGroupArgs {
            tier: SubnetTier::Private,
            count: 2,
            environment: "staging",
            cidr_prefix: "10.20",
            availability_zones: &zones,
        };

        let (group, engine) = with_context("staging", &[], |ctx| {
            SubnetGroup::declare(ctx, "staging-vpc-private", "vpc-1", &args)
        });
        let group = group.unwrap();

        assert_eq!(group.len(), 2);
        let second = engine.find("staging-vpc-private-2").unwrap();
        assert_eq!(second.property("cidrBlock"), Some(&json!("10.20.101.0/24")));
        assert_eq!(second.property("availabilityZone"), Some(&json!("us-east-1b")));
        assert_eq!(second.property("mapPublicIpOnLaunch"), Some(&json!(false)));
        assert_eq!(
            second.tags.get("kubernetes.io/role/internal-elb").map(String::as_str),
            Some("1")
        );
        assert!(!second.tags.contains_key("kubernetes.io/role/elb"));
    }

    #[test]
    fn test_public_group_capped_by_zones() {
        let zones = zones(2);
        let args = SubnetGroupArgs {
            tier: SubnetTier::Public,
            count: 5,
            environment: "prod",
            cidr_prefix: "10.30",
            availability_zones: &zones,
        };

        let (group, engine) = with_context("prod", &[], |ctx| {
            SubnetGroup::declare(ctx, "prod-vpc-public", "vpc-1", &args)
        });
        let group = group.unwrap();

        assert_eq!(
            group.ids(),
            vec![
                "subnet-prod-vpc-public-1".to_string(),
                "subnet-prod-vpc-public-2".to_string()
            ]
        );
        let first = engine.find("prod-vpc-public-1").unwrap();
        assert_eq!(first.property("cidrBlock"), Some(&json!("10.30.0.0/24")));
        assert_eq!(first.property("mapPublicIpOnLaunch"), Some(&json!(true)));
        assert_eq!(first.tags.get("Type").map(String::as_str), Some("public"));
    }
}

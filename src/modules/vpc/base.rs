// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base network: the VPC, its internet gateway and the public route table.
//!
//! None of these resources are billed.

use crate::domain::Result;
use crate::modules::MANAGED_BY;
use crate::ports::{ProvisionContext, ResourceKind, ResourceRef, ResourceSpec};
use serde_json::json;

/// Destination of default routes.
pub const ANY_IPV4: &str = "0.0.0.0/0";

/// Inputs of the base network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseNetworkArgs {
    /// VPC CIDR block
    pub cidr_block: String,
    /// Environment tag
    pub environment: String,
    /// Enables the Amazon DNS server
    pub enable_dns_support: bool,
    /// Enables DNS hostnames for instances
    pub enable_dns_hostnames: bool,
}

/// Handles of the declared base network.
#[derive(Debug, Clone)]
pub struct BaseNetwork {
    /// The VPC
    pub vpc: ResourceRef,
    /// Internet gateway attached to the VPC
    pub internet_gateway: ResourceRef,
    /// Route table shared by public subnets
    pub public_route_table: ResourceRef,
    /// Default route of the public route table
    pub public_route: ResourceRef,
}

impl BaseNetwork {
    /// Declares the base network under `name`.
    pub fn declare(ctx: &mut ProvisionContext<'_>, name: &str, args: &BaseNetworkArgs) -> Result<Self> {
        let vpc_name = format!("{}-vpc", name);
        let vpc = ctx.declare(
            ResourceSpec::new(ResourceKind::Vpc, &vpc_name)
                .with_parent(name)
                .with_property("cidrBlock", json!(args.cidr_block))
                .with_property("enableDnsSupport", json!(args.enable_dns_support))
                .with_property("enableDnsHostnames", json!(args.enable_dns_hostnames))
                .with_tag("Name", &vpc_name)
                .with_tag("Environment", &args.environment)
                .with_tag("ManagedBy", MANAGED_BY),
        )?;

        let igw_name = format!("{}-igw", name);
        let internet_gateway = ctx.declare(
            ResourceSpec::new(ResourceKind::InternetGateway, &igw_name)
                .with_parent(name)
                .with_property("vpcId", json!(vpc.id))
                .with_tag("Name", &igw_name)
                .with_tag("Environment", &args.environment),
        )?;

        let rt_name = format!("{}-public-rt", name);
        let public_route_table = ctx.declare(
            ResourceSpec::new(ResourceKind::RouteTable, &rt_name)
                .with_parent(name)
                .with_property("vpcId", json!(vpc.id))
                .with_tag("Name", &rt_name)
                .with_tag("Environment", &args.environment),
        )?;

        let public_route = ctx.declare(
            ResourceSpec::new(ResourceKind::Route, format!("{}-public-route", name))
                .with_parent(name)
                .with_property("routeTableId", json!(public_route_table.id))
                .with_property("destinationCidrBlock", json!(ANY_IPV4))
                .with_property("gatewayId", json!(internet_gateway.id)),
        )?;

        Ok(Self {
            vpc,
            internet_gateway,
            public_route_table,
            public_route,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing::with_context;

    #[test]
    fn test_base_network_declarations() {
        let args = BaseNetworkArgs {
            cidr_block: "10.10.0.0/16".to_string(),
            environment: "dev".to_string(),
            enable_dns_support: true,
            enable_dns_hostnames: false,
        };

        let (base, engine) = with_context("dev", &[], |ctx| {
            BaseNetwork::declare(ctx, "dev-vpc", &args)
        });
        let base = base.unwrap();

        assert_eq!(base.vpc.name, "dev-vpc-vpc");
        assert_eq!(base.internet_gateway.name, "dev-vpc-igw");
        assert_eq!(base.public_route_table.name, "dev-vpc-public-rt");
        assert_eq!(engine.resources().len(), 4);

        let vpc = engine.find("dev-vpc-vpc").unwrap();
        assert_eq!(vpc.property("cidrBlock"), Some(&json!("10.10.0.0/16")));
        assert_eq!(vpc.property("enableDnsHostnames"), Some(&json!(false)));
        assert_eq!(vpc.tags.get("ManagedBy").map(String::as_str), Some("Pulumi"));

        let route = engine.find("dev-vpc-public-route").unwrap();
        assert_eq!(route.property("gatewayId"), Some(&json!("igw-dev-vpc-igw")));
        assert_eq!(route.property("destinationCidrBlock"), Some(&json!(ANY_IPV4)));
    }
}

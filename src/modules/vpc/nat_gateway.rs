// SPDX-License-Identifier: MIT OR Apache-2.0

//! NAT gateways, their Elastic IPs and the private route tables behind them.
//!
//! Everything declared here except the route tables is billed by the hour.

use crate::domain::{Result, StackError};
use crate::modules::vpc::base::ANY_IPV4;
use crate::ports::{ProvisionContext, ResourceKind, ResourceRef, ResourceSpec};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

/// Approximate monthly cost of one associated Elastic IP, in USD.
pub const EIP_MONTHLY_COST: f64 = 3.65;

/// Approximate monthly cost of one NAT gateway before data transfer, in USD.
pub const NAT_GATEWAY_MONTHLY_COST: f64 = 45.0;

/// How private subnets reach the internet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NatStrategy {
    /// No NAT gateways; private subnets have no egress
    None,
    /// One NAT gateway in the first public subnet, shared by every private subnet
    Single,
    /// One NAT gateway per public subnet
    MultiAz,
}

impl NatStrategy {
    /// Configuration spelling of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            NatStrategy::None => "none",
            NatStrategy::Single => "single",
            NatStrategy::MultiAz => "multi-az",
        }
    }

    /// Number of NAT gateways for `public_subnets` public subnets.
    pub fn gateway_count(&self, public_subnets: usize) -> usize {
        match self {
            NatStrategy::None => 0,
            NatStrategy::Single => public_subnets.min(1),
            NatStrategy::MultiAz => public_subnets,
        }
    }
}

impl FromStr for NatStrategy {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(NatStrategy::None),
            "single" => Ok(NatStrategy::Single),
            "multi-az" => Ok(NatStrategy::MultiAz),
            other => Err(StackError::invalid_value(
                "vpc:nat_strategy",
                other,
                "NAT strategy (none, single, multi-az)",
            )),
        }
    }
}

impl fmt::Display for NatStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs of a NAT gateway group.
#[derive(Debug, Clone)]
pub struct NatGatewayArgs<'a> {
    /// Placement strategy
    pub strategy: NatStrategy,
    /// Environment tag
    pub environment: &'a str,
    /// Number of private route tables to declare
    pub private_subnet_count: usize,
}

/// Declared NAT resources.
#[derive(Debug, Clone, Default)]
pub struct NatGatewayGroup {
    /// Elastic IPs, one per gateway
    pub eips: Vec<ResourceRef>,
    /// NAT gateways in public subnet order
    pub nat_gateways: Vec<ResourceRef>,
    /// Private route tables, one per private subnet
    pub private_route_tables: Vec<ResourceRef>,
}

impl NatGatewayGroup {
    /// Declares the group under `name`.
    ///
    /// With [`NatStrategy::None`] nothing is declared. Otherwise at least one
    /// public subnet is required.
    pub fn declare(
        ctx: &mut ProvisionContext<'_>,
        name: &str,
        vpc_id: &str,
        public_subnet_ids: &[String],
        args: &NatGatewayArgs<'_>,
    ) -> Result<Self> {
        let mut group = Self::default();
        if args.strategy == NatStrategy::None {
            tracing::info!("NAT gateway strategy is 'none', skipping NAT gateways");
            return Ok(group);
        }
        if public_subnet_ids.is_empty() {
            return Err(StackError::engine(
                ctx.engine().name(),
                format!(
                    "NAT strategy '{}' needs at least one public subnet",
                    args.strategy
                ),
            ));
        }

        for (i, subnet_id) in public_subnet_ids
            .iter()
            .take(args.strategy.gateway_count(public_subnet_ids.len()))
            .enumerate()
        {
            let eip_name = format!("{}-nat-eip-{}", name, i + 1);
            let eip = ctx.declare(
                ResourceSpec::new(ResourceKind::ElasticIp, &eip_name)
                    .with_parent(name)
                    .with_property("domain", json!("vpc"))
                    .with_tag("Name", &eip_name)
                    .with_tag("Environment", args.environment)
                    .with_tag("CostCenter", "networking"),
            )?;

            let nat_name = format!("{}-nat-{}", name, i + 1);
            let nat = ctx.declare(
                ResourceSpec::new(ResourceKind::NatGateway, &nat_name)
                    .with_parent(name)
                    .with_property("subnetId", json!(subnet_id))
                    .with_property("allocationId", json!(eip.id))
                    .with_tag("Name", &nat_name)
                    .with_tag("Environment", args.environment)
                    .with_tag("CostCenter", "networking"),
            )?;

            group.eips.push(eip);
            group.nat_gateways.push(nat);
        }

        for i in 0..args.private_subnet_count {
            let nat_index = match args.strategy {
                NatStrategy::Single => 0,
                _ => i.min(group.nat_gateways.len() - 1),
            };

            let rt_name = format!("{}-private-rt-{}", name, i + 1);
            let route_table = ctx.declare(
                ResourceSpec::new(ResourceKind::RouteTable, &rt_name)
                    .with_parent(name)
                    .with_property("vpcId", json!(vpc_id))
                    .with_tag("Name", &rt_name)
                    .with_tag("Environment", args.environment),
            )?;

            ctx.declare(
                ResourceSpec::new(ResourceKind::Route, format!("{}-private-route-{}", name, i + 1))
                    .with_parent(name)
                    .with_property("routeTableId", json!(route_table.id))
                    .with_property("destinationCidrBlock", json!(ANY_IPV4))
                    .with_property("natGatewayId", json!(group.nat_gateways[nat_index].id)),
            )?;

            group.private_route_tables.push(route_table);
        }

        let cost = group.estimated_monthly_cost();
        tracing::warn!(
            "NAT gateway estimated monthly cost: ${:.2} (EIPs: ${:.2}, NAT gateways: ${:.2})",
            cost,
            group.eips.len() as f64 * EIP_MONTHLY_COST,
            group.nat_gateways.len() as f64 * NAT_GATEWAY_MONTHLY_COST
        );
        Ok(group)
    }

    /// NAT gateway identifiers in declaration order.
    pub fn nat_gateway_ids(&self) -> Vec<String> {
        self.nat_gateways.iter().map(|n| n.id.clone()).collect()
    }

    /// Estimated monthly cost of the group, excluding data transfer.
    pub fn estimated_monthly_cost(&self) -> f64 {
        self.eips.len() as f64 * EIP_MONTHLY_COST
            + self.nat_gateways.len() as f64 * NAT_GATEWAY_MONTHLY_COST
    }
}

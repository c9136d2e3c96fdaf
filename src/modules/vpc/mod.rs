// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `vpc` component.
//!
//! Composes the base network, a public and a private subnet group, route table
//! associations and, depending on `vpc:nat_strategy`, a NAT gateway group.

pub mod base;
pub mod nat_gateway;
pub mod subnets;

use crate::domain::{Environment, ResourceOutputs, Resolver, Result, StackError};
use crate::modules::{log_origin, DEFAULT_REGION};
use crate::ports::{ProvisionContext, ProvisioningModule, ResourceKind, ResourceSpec};
use base::{BaseNetwork, BaseNetworkArgs};
use nat_gateway::{NatGatewayArgs, NatGatewayGroup, NatStrategy};
use serde_json::json;
use subnets::{cidr_prefix, SubnetGroup, SubnetGroupArgs, SubnetTier};

/// CIDR block used when neither configuration nor defaults provide one.
pub const FALLBACK_CIDR_BLOCK: &str = "10.0.0.0/16";

/// Subnets per tier when neither configuration nor defaults provide a count.
pub const FALLBACK_SUBNET_COUNT: i64 = 2;

/// Resolved inputs of the `vpc` component.
#[derive(Debug, Clone, PartialEq)]
pub struct VpcSettings {
    /// Base name of every resource
    pub name: String,
    /// AWS region
    pub region: String,
    /// VPC CIDR block
    pub cidr_block: String,
    /// Subnets per tier
    pub subnet_count: usize,
    /// NAT placement
    pub nat_strategy: NatStrategy,
    /// `enableDnsSupport`
    pub enable_dns_support: bool,
    /// `enableDnsHostnames`
    pub enable_dns_hostnames: bool,
}

impl VpcSettings {
    /// Resolves every `vpc:*` setting for `environment`.
    pub fn resolve(resolver: &Resolver<'_>, environment: &Environment) -> Result<Self> {
        let fallback_name = format!("{}-vpc", environment);
        let name = match resolver.get_optional_string("vpc:name")? {
            Some(name) if !name.is_empty() => name,
            _ => fallback_name,
        };

        let subnet_count = resolver.get_int("vpc:subnet_count", FALLBACK_SUBNET_COUNT)?;
        let subnet_count = usize::try_from(subnet_count).map_err(|_| {
            StackError::invalid_value(
                "vpc:subnet_count",
                &subnet_count.to_string(),
                "non-negative integer",
            )
        })?;

        Ok(Self {
            name,
            region: resolver.get_string("aws:region", DEFAULT_REGION)?,
            cidr_block: resolver.get_string("vpc:cidr_block", FALLBACK_CIDR_BLOCK)?,
            subnet_count,
            nat_strategy: resolver
                .get_string("vpc:nat_strategy", NatStrategy::None.as_str())?
                .parse()?,
            enable_dns_support: resolver.get_bool("vpc:enable_dns_support", true)?,
            enable_dns_hostnames: resolver.get_bool("vpc:enable_dns_hostnames", true)?,
        })
    }
}

/// Provisioning module for the `vpc` component.
#[derive(Debug, Clone, Copy, Default)]
pub struct VpcModule;

impl ProvisioningModule for VpcModule {
    fn component(&self) -> &str {
        "vpc"
    }

    fn description(&self) -> &str {
        "VPC with public/private subnets and optional NAT gateways"
    }

    fn run(&self, environment: &Environment, ctx: &mut ProvisionContext<'_>) -> Result<ResourceOutputs> {
        let settings = VpcSettings::resolve(ctx.resolver(), environment)?;
        tracing::info!("Loading VPC configuration for environment '{}'", environment);
        log_origin(ctx.resolver(), "vpc:cidr_block", &settings.cidr_block)?;
        log_origin(ctx.resolver(), "vpc:nat_strategy", settings.nat_strategy.as_str())?;

        let prefix = cidr_prefix("vpc:cidr_block", &settings.cidr_block)?;
        let zones = ctx.engine().availability_zones(&settings.region)?;
        let env = environment.as_str();
        let name = settings.name.as_str();

        let base = BaseNetwork::declare(
            ctx,
            name,
            &BaseNetworkArgs {
                cidr_block: settings.cidr_block.clone(),
                environment: env.to_string(),
                enable_dns_support: settings.enable_dns_support,
                enable_dns_hostnames: settings.enable_dns_hostnames,
            },
        )?;

        let public = SubnetGroup::declare(
            ctx,
            &format!("{}-public", name),
            &base.vpc.id,
            &SubnetGroupArgs {
                tier: SubnetTier::Public,
                count: settings.subnet_count,
                environment: env,
                cidr_prefix: &prefix,
                availability_zones: &zones,
            },
        )?;

        for (i, subnet) in public.subnets.iter().enumerate() {
            ctx.declare(
                ResourceSpec::new(
                    ResourceKind::RouteTableAssociation,
                    format!("{}-public-rta-{}", name, i + 1),
                )
                .with_property("subnetId", json!(subnet.id))
                .with_property("routeTableId", json!(base.public_route_table.id)),
            )?;
        }

        let private = SubnetGroup::declare(
            ctx,
            &format!("{}-private", name),
            &base.vpc.id,
            &SubnetGroupArgs {
                tier: SubnetTier::Private,
                count: settings.subnet_count,
                environment: env,
                cidr_prefix: &prefix,
                availability_zones: &zones,
            },
        )?;

        if settings.nat_strategy != NatStrategy::None {
            tracing::warn!(
                "Creating NAT gateways with strategy '{}', these are billed resources",
                settings.nat_strategy
            );
        }
        let nat = NatGatewayGroup::declare(
            ctx,
            name,
            &base.vpc.id,
            &public.ids(),
            &NatGatewayArgs {
                strategy: settings.nat_strategy,
                environment: env,
                private_subnet_count: private.len(),
            },
        )?;

        if settings.nat_strategy == NatStrategy::None {
            tracing::info!("Private subnets will have no internet access; set vpc:nat_strategy to 'single' or 'multi-az' to enable NAT");
        }
        for (i, (subnet, route_table)) in private
            .subnets
            .iter()
            .zip(&nat.private_route_tables)
            .enumerate()
        {
            ctx.declare(
                ResourceSpec::new(
                    ResourceKind::RouteTableAssociation,
                    format!("{}-private-rta-{}", name, i + 1),
                )
                .with_property("subnetId", json!(subnet.id))
                .with_property("routeTableId", json!(route_table.id)),
            )?;
        }

        let mut outputs = ResourceOutputs::new();
        outputs.export("vpc_id", base.vpc.id.as_str());
        outputs.export("vpc_cidr", settings.cidr_block.as_str());
        outputs.export("internet_gateway_id", base.internet_gateway.id.as_str());
        outputs.export("public_subnet_ids", public.ids());
        outputs.export("private_subnet_ids", private.ids());
        outputs.export("nat_gateway_ids", nat.nat_gateway_ids());
        outputs.export(
            "nat_gateway_monthly_cost_estimate",
            nat.estimated_monthly_cost(),
        );
        outputs.export("nat_strategy", settings.nat_strategy.as_str());
        outputs.export("environment", env);
        Ok(outputs)
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `eks` component: a managed Kubernetes control plane placed into subnets
//! of an existing VPC.
//!
//! The VPC is referenced through `eks:*` keys only; `vpc:*` keys are never
//! read here.

use crate::domain::{Environment, OutputValue, ResourceOutputs, Result, StackError};
use crate::ports::{ProvisionContext, ProvisioningModule, ResourceKind, ResourceRef, ResourceSpec};
use serde_json::json;

/// Provisioning module for the `eks` component.
#[derive(Debug, Clone, Copy, Default)]
pub struct EksModule;

/// Renders a kubeconfig for `cluster`, authenticating through `aws eks get-token`.
pub fn kubeconfig(cluster_name: &str, cluster: &ResourceRef) -> Result<String> {
    let endpoint = cluster.attribute("endpoint").unwrap_or_default();
    let certificate = cluster.attribute("certificate_authority").unwrap_or_default();
    let document = json!({
        "apiVersion": "v1",
        "kind": "Config",
        "clusters": [{
            "name": cluster_name,
            "cluster": {
                "server": endpoint,
                "certificate-authority-data": certificate,
            },
        }],
        "contexts": [{
            "name": "aws",
            "context": { "cluster": cluster_name, "user": "aws" },
        }],
        "current-context": "aws",
        "users": [{
            "name": "aws",
            "user": {
                "exec": {
                    "apiVersion": "client.authentication.k8s.io/v1beta1",
                    "command": "aws",
                    "args": ["eks", "get-token", "--cluster-name", cluster_name],
                },
            },
        }],
    });

    serde_json::to_string_pretty(&document).map_err(|e| StackError::ParseError {
        message: format!("Failed to render kubeconfig: {}", e),
        source: Some(Box::new(e)),
    })
}

impl ProvisioningModule for EksModule {
    fn component(&self) -> &str {
        "eks"
    }

    fn description(&self) -> &str {
        "EKS cluster without the default node group"
    }

    fn run(&self, environment: &Environment, ctx: &mut ProvisionContext<'_>) -> Result<ResourceOutputs> {
        let resolver = ctx.resolver();
        let role_arn = resolver.require_string("eks:role_arn")?;
        let vpc_id = resolver.require_string("eks:vpc_id")?;
        let public_subnet_ids = resolver.require_list("eks:public_subnet_ids")?;
        let private_subnet_ids = resolver.require_list("eks:private_subnet_ids")?;
        let cluster_name = resolver.get_string("eks:cluster_name", &format!("{}-eks", environment))?;

        tracing::info!(
            "Declaring EKS cluster '{}' in {} ({} public, {} private subnets)",
            cluster_name,
            vpc_id,
            public_subnet_ids.len(),
            private_subnet_ids.len()
        );

        let cluster = ctx.declare(
            ResourceSpec::new(ResourceKind::EksCluster, "eksCluster")
                .with_property("name", json!(cluster_name))
                .with_property("roleArn", json!(role_arn))
                .with_property("vpcId", json!(vpc_id))
                .with_property("publicSubnetIds", json!(public_subnet_ids))
                .with_property("privateSubnetIds", json!(private_subnet_ids))
                .with_property("skipDefaultNodeGroup", json!(true))
                .with_tag("Environment", environment.as_str()),
        )?;

        let mut outputs = ResourceOutputs::new();
        outputs.export("cluster_name", cluster_name.as_str());
        outputs.export("cluster_arn", cluster.arn_or_id());
        outputs.export(
            "kubeconfig",
            OutputValue::secret(kubeconfig(&cluster_name, &cluster)?),
        );
        Ok(outputs)
    }
}

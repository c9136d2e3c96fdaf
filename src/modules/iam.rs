// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `iam` component: a per-environment provisioning user with an access key
//! and the policies it needs to manage the other components.

use crate::domain::{Environment, OutputValue, ResourceOutputs, Result, StackError};
use crate::modules::{DEFAULT_REGION, MANAGED_BY};
use crate::ports::{ProvisionContext, ProvisioningModule, ResourceKind, ResourceRef, ResourceSpec};
use serde::Serialize;
use serde_json::json;

/// EC2 actions needed to manage the `vpc` component.
pub const VPC_MANAGEMENT_ACTIONS: &[&str] = &[
    "ec2:DescribeAvailabilityZones",
    "ec2:DescribeVpcs",
    "ec2:CreateVpc",
    "ec2:DeleteVpc",
    "ec2:ModifyVpcAttribute",
    "ec2:DescribeVpcAttribute",
    "ec2:DescribeInternetGateways",
    "ec2:CreateInternetGateway",
    "ec2:DeleteInternetGateway",
    "ec2:AttachInternetGateway",
    "ec2:DetachInternetGateway",
    "ec2:DescribeSubnets",
    "ec2:CreateSubnet",
    "ec2:DeleteSubnet",
    "ec2:ModifySubnetAttribute",
    "ec2:DescribeRouteTables",
    "ec2:CreateRouteTable",
    "ec2:DeleteRouteTable",
    "ec2:CreateRoute",
    "ec2:DeleteRoute",
    "ec2:ReplaceRoute",
    "ec2:AssociateRouteTable",
    "ec2:DisassociateRouteTable",
    "ec2:DescribeSecurityGroups",
    "ec2:CreateSecurityGroup",
    "ec2:DeleteSecurityGroup",
    "ec2:AuthorizeSecurityGroupIngress",
    "ec2:AuthorizeSecurityGroupEgress",
    "ec2:RevokeSecurityGroupIngress",
    "ec2:RevokeSecurityGroupEgress",
    "ec2:CreateTags",
    "ec2:DeleteTags",
    "ec2:DescribeTags",
    "ec2:DescribeNatGateways",
    "ec2:CreateNatGateway",
    "ec2:DeleteNatGateway",
    "ec2:AllocateAddress",
    "ec2:ReleaseAddress",
    "ec2:DescribeAddresses",
    "ec2:AssociateAddress",
    "ec2:DisassociateAddress",
];

/// Actions needed to manage the `eks` component.
pub const EKS_MANAGEMENT_ACTIONS: &[&str] = &[
    "eks:*",
    "iam:CreateRole",
    "iam:DeleteRole",
    "iam:GetRole",
    "iam:ListRoles",
    "iam:AttachRolePolicy",
    "iam:DetachRolePolicy",
    "iam:GetRolePolicy",
    "iam:PutRolePolicy",
    "iam:DeleteRolePolicy",
    "iam:ListRolePolicies",
    "iam:CreateServiceLinkedRole",
    "iam:PassRole",
];

const POLICY_VERSION: &str = "2012-10-17";

/// An IAM policy document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    /// Policy language version
    pub version: &'static str,
    /// Statements
    pub statement: Vec<PolicyStatement>,
}

/// One statement of a policy document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    /// Statement id
    pub sid: &'static str,
    /// `Allow` or `Deny`
    pub effect: &'static str,
    /// Actions covered
    pub action: Vec<&'static str>,
    /// Resources covered
    pub resource: Vec<&'static str>,
}

impl PolicyDocument {
    /// A document with a single `Allow` statement over every resource.
    pub fn allow_all_resources(sid: &'static str, actions: &[&'static str]) -> Self {
        Self {
            version: POLICY_VERSION,
            statement: vec![PolicyStatement {
                sid,
                effect: "Allow",
                action: actions.to_vec(),
                resource: vec!["*"],
            }],
        }
    }

    /// Renders the document as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| StackError::ParseError {
            message: format!("Failed to render policy document: {}", e),
            source: Some(Box::new(e)),
        })
    }
}

/// Provider-side name of the provisioning user of `environment`.
pub fn user_name(environment: &Environment) -> String {
    format!("pulumi-{}-user", environment)
}

/// Provisioning module for the `iam` component.
#[derive(Debug, Clone, Copy, Default)]
pub struct IamModule;

impl IamModule {
    fn declare_policy(
        ctx: &mut ProvisionContext<'_>,
        env: &str,
        user: &ResourceRef,
        user_name: &str,
        short: &str,
        label: &str,
        document: &PolicyDocument,
    ) -> Result<ResourceRef> {
        let policy = ctx.declare(
            ResourceSpec::new(ResourceKind::IamPolicy, format!("{}-{}-policy", env, short))
                .with_parent(&user.name)
                .with_property("name", json!(format!("{}-{}-management-policy", env, short)))
                .with_property(
                    "description",
                    json!(format!("Policy for managing {} in {} environment", label, env)),
                )
                .with_property("policy", json!(document.to_json()?)),
        )?;

        ctx.declare(
            ResourceSpec::new(
                ResourceKind::IamUserPolicyAttachment,
                format!("{}-{}-policy-attachment", env, short),
            )
            .with_parent(&user.name)
            .with_property("user", json!(user_name))
            .with_property("policyArn", json!(policy.arn_or_id())),
        )?;
        Ok(policy)
    }
}

impl ProvisioningModule for IamModule {
    fn component(&self) -> &str {
        "iam"
    }

    fn description(&self) -> &str {
        "Provisioning user, access key and management policies"
    }

    fn run(&self, environment: &Environment, ctx: &mut ProvisionContext<'_>) -> Result<ResourceOutputs> {
        let env = environment.as_str();
        let user_name = user_name(environment);
        let enable_eks = ctx.resolver().get_bool("iam:enable_eks_permissions", false)?;
        let region = ctx.resolver().get_string("aws:region", DEFAULT_REGION)?;

        match ctx.engine().lookup(ResourceKind::IamUser, &user_name)? {
            Some(existing) => tracing::info!(
                "User {} already exists ({})",
                user_name,
                existing.arn_or_id()
            ),
            None => tracing::info!("User {} does not exist, will create it", user_name),
        }

        let user = ctx.declare(
            ResourceSpec::new(ResourceKind::IamUser, format!("{}-pulumi-user", env))
                .with_property("name", json!(user_name))
                .with_tag("Environment", env)
                .with_tag("ManagedBy", MANAGED_BY)
                .with_tag("Purpose", "Infrastructure provisioning"),
        )?;

        let access_key = ctx.declare(
            ResourceSpec::new(ResourceKind::IamAccessKey, format!("{}-pulumi-access-key", env))
                .with_parent(&user.name)
                .with_property("user", json!(user_name)),
        )?;

        let vpc_policy = PolicyDocument::allow_all_resources("VPCManagement", VPC_MANAGEMENT_ACTIONS);
        Self::declare_policy(ctx, env, &user, &user_name, "vpc", "VPCs", &vpc_policy)?;

        if enable_eks {
            let eks_policy =
                PolicyDocument::allow_all_resources("EKSManagement", EKS_MANAGEMENT_ACTIONS);
            Self::declare_policy(ctx, env, &user, &user_name, "eks", "EKS", &eks_policy)?;
        }

        let user_arn = user.arn_or_id().to_string();
        let secret = access_key.attribute("secret").unwrap_or_default().to_string();

        let mut outputs = ResourceOutputs::new();
        outputs.export("iam_user_name", user_name.as_str());
        outputs.export("iam_user_arn", user_arn.as_str());
        outputs.export("access_key_id", OutputValue::secret(access_key.id.as_str()));
        outputs.export("secret_access_key", OutputValue::secret(secret));
        outputs.export(
            "setup_instructions",
            setup_instructions(env, &region, &user_arn),
        );
        Ok(outputs)
    }
}

fn setup_instructions(env: &str, region: &str, user_arn: &str) -> String {
    format!(
        "To use these credentials:\n\
         \n\
         1. Configure AWS CLI profile:\n   \
            aws configure --profile {env}-pulumi\n   \
            AWS Access Key ID: [run 'stackcfg up {env}-iam --show-secrets' to see]\n   \
            AWS Secret Access Key: [run 'stackcfg up {env}-iam --show-secrets' to see]\n   \
            Default region: {region}\n   \
            Default output format: json\n\
         \n\
         2. Update VPC stack to use this profile:\n   \
            pulumi config set aws:profile {env}-pulumi --stack {env}-vpc\n\
         \n\
         User ARN: {user_arn}\n",
        env = env,
        region = region,
        user_arn = user_arn,
    )
}

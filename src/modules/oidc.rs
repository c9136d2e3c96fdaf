// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `oidc` component: an IAM OpenID Connect provider trusting a cluster's
//! token issuer.

use crate::domain::{Environment, ResourceOutputs, Result};
use crate::ports::{ProvisionContext, ProvisioningModule, ResourceKind, ResourceSpec};
use serde_json::json;

/// Audience accepted when `oidc:client_ids` is not set.
pub const DEFAULT_CLIENT_ID: &str = "sts.amazonaws.com";

/// Root CA thumbprint used when `oidc:thumbprints` is not set.
pub const DEFAULT_THUMBPRINT: &str = "9e99a48a9960b14926bb7f3b02e22da0afd4e3e5";

/// Provisioning module for the `oidc` component.
#[derive(Debug, Clone, Copy, Default)]
pub struct OidcModule;

impl ProvisioningModule for OidcModule {
    fn component(&self) -> &str {
        "oidc"
    }

    fn description(&self) -> &str {
        "IAM OIDC provider for a cluster issuer"
    }

    fn run(&self, environment: &Environment, ctx: &mut ProvisionContext<'_>) -> Result<ResourceOutputs> {
        let resolver = ctx.resolver();
        let issuer_url = resolver.require_string("oidc:issuer_url")?;
        let client_ids = resolver.get_list("oidc:client_ids", &[DEFAULT_CLIENT_ID])?;
        let thumbprints = resolver.get_list("oidc:thumbprints", &[DEFAULT_THUMBPRINT])?;

        let provider = ctx.declare(
            ResourceSpec::new(ResourceKind::OidcProvider, "eks-oidc")
                .with_property("url", json!(issuer_url))
                .with_property("clientIdLists", json!(client_ids))
                .with_property("thumbprintLists", json!(thumbprints))
                .with_tag("Environment", environment.as_str()),
        )?;

        let mut outputs = ResourceOutputs::new();
        outputs.export("oidc_provider_arn", provider.arn_or_id());
        outputs.export("oidc_provider_url", issuer_url);
        Ok(outputs)
    }
}

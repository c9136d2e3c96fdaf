// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plans the `dev-vpc` and `prod-vpc` stacks against the in-memory engine and
//! prints what each would declare.
//!
//! Run with `cargo run --example plan_dev_vpc`.

use stackcfg::ports::ResourceKind;
use stackcfg::prelude::*;

fn plan(dispatcher: &StackDispatcher, stack: &str) -> Result<()> {
    let mut engine = PlanEngine::new();
    let outputs = dispatcher.dispatch(stack, &mut engine)?;

    println!("== {} ==", stack);
    for resource in engine.resources() {
        println!("  {:<50} {}", resource.name, resource.kind);
    }
    println!(
        "  subnets: {}, NAT gateways: {}",
        engine.count(ResourceKind::Subnet),
        engine.count(ResourceKind::NatGateway)
    );
    for (name, value) in outputs.iter() {
        println!("  {} = {}", name, value);
    }
    Ok(())
}

fn main() -> Result<()> {
    let dispatcher = StackDispatcher::builder().build();

    plan(&dispatcher, "dev-vpc")?;
    plan(&dispatcher, "prod-vpc")?;

    // Overrides win over the environment defaults.
    let store = StackConfigStore::builder()
        .with_cli_overrides(vec!["vpc:nat_strategy=single", "vpc:subnet_count=1"])?
        .build();
    let dispatcher = StackDispatcher::builder().with_store(store).build();
    plan(&dispatcher, "prod-vpc")?;

    Ok(())
}

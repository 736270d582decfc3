// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use qa_core::{AddOns, Subscription};
use qa_sync::{App, SubscriptionRequest};
use tracing::info;

use crate::cli::{OutputFormat, SubscriptionCommand};
use crate::display::format_subscription;
use crate::error::Result;

use super::{print_json, require_session, runtime};

pub fn run(app: &App, command: SubscriptionCommand) -> Result<()> {
    require_session(app)?;
    let rt = runtime()?;
    match command {
        SubscriptionCommand::Show { output } => {
            let subscription = rt.block_on(app.client.subscription())?;
            match (output, subscription) {
                (OutputFormat::Json, sub) => print_json(&sub),
                (OutputFormat::Text, Some(sub)) => {
                    println!("{}", format_subscription(&sub));
                    Ok(())
                }
                (OutputFormat::Text, None) => {
                    println!("No subscription");
                    Ok(())
                }
            }
        }
        SubscriptionCommand::Subscribe {
            plan,
            cycle,
            custom_templates,
            priority_support,
            api_access,
        } => {
            let request = SubscriptionRequest {
                plan,
                billing_cycle: cycle,
                add_ons: AddOns {
                    custom_templates,
                    priority_support,
                    api_access,
                },
            };
            let sub = rt.block_on(subscribe(app, &request))?;
            println!("Subscribed\n{}", format_subscription(&sub));
            Ok(())
        }
        SubscriptionCommand::Cancel => {
            rt.block_on(app.client.cancel_subscription())?;
            info!("subscription cancelled");
            println!("Subscription cancelled");
            Ok(())
        }
    }
}

pub(crate) async fn subscribe(app: &App, request: &SubscriptionRequest) -> Result<Subscription> {
    let sub = app.client.subscribe(request).await?;
    info!(plan = %sub.plan, status = %sub.status, "subscription updated");
    Ok(sub)
}

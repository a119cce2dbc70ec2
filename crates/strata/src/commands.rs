// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage subcommands.

use std::io::Read;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use strata_config::StrataConfig;
use strata_core::{StatQuery, StorageQuery, StrataError};
use strata_service::{
    RegisterRequest, RegistrationOrchestrator, StorageRef, UpdatePluginRequest, UpdateRequest,
};
use tracing::warn;

use crate::app::App;
use crate::{RequestArgs, StorageCommand};

/// Run one storage command against a freshly wired service.
pub async fn run(command: StorageCommand, config: &StrataConfig) -> Result<String, StrataError> {
    let app = App::build(config).await?;
    let result = execute(&app.orchestrator, command).await;
    if let Err(e) = app.shutdown().await {
        warn!(error = %e, "failed to close storage");
    }
    let value = result?;
    serde_json::to_string_pretty(&value).map_err(|e| StrataError::Internal(e.to_string()))
}

async fn execute(
    orchestrator: &RegistrationOrchestrator,
    command: StorageCommand,
) -> Result<Value, StrataError> {
    match command {
        StorageCommand::Register(args) => {
            let request: RegisterRequest = args.body()?;
            to_value(orchestrator.register(request).await?)
        }
        StorageCommand::Update(args) => {
            let request: UpdateRequest = args.body()?;
            to_value(orchestrator.update(request).await?)
        }
        StorageCommand::UpdatePlugin(args) => {
            let request: UpdatePluginRequest = args.body()?;
            to_value(orchestrator.update_plugin(request).await?)
        }
        StorageCommand::VerifyPlugin(args) => {
            let target: StorageRef = args.body()?;
            orchestrator.verify_plugin(&target).await?;
            Ok(json!({"storage_id": target.storage_id, "verified": true}))
        }
        StorageCommand::Enable(args) => to_value(orchestrator.enable(&args.body()?).await?),
        StorageCommand::Disable(args) => to_value(orchestrator.disable(&args.body()?).await?),
        StorageCommand::Deregister(args) => {
            let target: StorageRef = args.body()?;
            orchestrator.deregister(&target).await?;
            Ok(json!({"storage_id": target.storage_id, "deregistered": true}))
        }
        StorageCommand::Get(args) => to_value(orchestrator.get(&args.body()?).await?),
        StorageCommand::List(args) => {
            let query: StorageQuery = args.body()?;
            let (results, total_count) = orchestrator.list(&query).await?;
            Ok(json!({"results": results, "total_count": total_count}))
        }
        StorageCommand::Stat(args) => {
            let query: StatQuery = args.body()?;
            Ok(json!({"results": orchestrator.stat(&query).await?}))
        }
    }
}

impl RequestArgs {
    fn body<T: DeserializeOwned>(&self) -> Result<T, StrataError> {
        let text = match &self.json {
            Some(text) => text.clone(),
            None => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .map_err(|e| StrataError::InvalidRequest(format!("failed to read stdin: {e}")))?;
                buf
            }
        };
        parse_body(&text)
    }
}

fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, StrataError> {
    serde_json::from_str(text).map_err(|e| StrataError::InvalidRequest(e.to_string()))
}

fn to_value<T: Serialize>(value: T) -> Result<Value, StrataError> {
    serde_json::to_value(value).map_err(|e| StrataError::Internal(e.to_string()))
}

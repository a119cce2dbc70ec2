// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage registration orchestrator.
//!
//! [`RegistrationOrchestrator`] drives the storage lifecycle
//! (register, update, update-plugin, verify, enable, disable, deregister)
//! over the collaborator traits in `strata-core`. Mutating operations run
//! inside [`run_compensated`] so a failed call undoes its own repository
//! writes.

pub mod compensation;
pub mod orchestrator;
pub mod request;

pub use compensation::{Compensation, CompensationLog, run_compensated};
pub use orchestrator::{Collaborators, OrchestratorOptions, RegistrationOrchestrator};
pub use request::{
    RegisterPluginInfo, RegisterRequest, StorageRef, UpdatePluginRequest, UpdateRequest,
};

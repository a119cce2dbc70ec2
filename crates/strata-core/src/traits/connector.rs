// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by every long-lived collaborator.

use crate::types::ConnectorType;

/// Identity of a collaborator implementation.
///
/// Used for log fields and error messages; it carries no lifecycle.
pub trait Connector: Send + Sync + 'static {
    /// Human-readable name of this implementation (e.g. `"sqlite"`, `"http"`).
    fn name(&self) -> &str;

    /// Which external service this implementation talks to.
    fn connector_type(&self) -> ConnectorType;
}

//! Diffing a transaction's stored lines against an update request.

use std::collections::HashMap;

use uuid::Uuid;

use super::error::LedgerError;
use super::types::{EntityKind, LineInput, LineRecord};

/// Line mutations needed to turn the stored lines into the requested ones.
#[derive(Debug, Default)]
pub struct LinePlan<'a> {
    /// Stored lines absent from the request.
    pub removed: Vec<LineRecord>,
    /// Stored lines paired with their requested replacement.
    pub updated: Vec<(LineRecord, &'a LineInput)>,
    /// Requested lines without an ID.
    pub created: Vec<&'a LineInput>,
}

impl LinePlan<'_> {
    /// Returns true if the plan does not touch any line.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.updated.is_empty() && self.created.is_empty()
    }
}

/// Partitions the request against the stored lines.
///
/// # Errors
///
/// Returns `NotFound` if a requested line ID is not one of the stored lines.
pub fn plan_line_changes(
    existing: Vec<LineRecord>,
    incoming: &[LineInput],
) -> Result<LinePlan<'_>, LedgerError> {
    let mut stored: HashMap<Uuid, LineRecord> =
        existing.into_iter().map(|line| (line.id, line)).collect();

    let mut plan = LinePlan::default();
    for line in incoming {
        match line.id {
            Some(id) => {
                let current = stored
                    .remove(&id)
                    .ok_or_else(|| LedgerError::not_found(EntityKind::TransactionLine, id))?;
                plan.updated.push((current, line));
            }
            None => plan.created.push(line),
        }
    }

    plan.removed = stored.into_values().collect();
    plan.removed.sort_by_key(|line| line.id);
    Ok(plan)
}

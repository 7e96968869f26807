//! Ledger domain types.
//!
//! Requests flow in as [`TransactionInput`]; the store hands back
//! [`TransactionRecord`], [`LineRecord`] and [`AccountRecord`] rows.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::UserRole;

/// The authenticated caller of a ledger operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    /// User ID; owner of every record the caller creates.
    pub id: Uuid,
    /// The caller's role.
    pub role: UserRole,
}

impl Principal {
    /// Creates a principal.
    #[must_use]
    pub const fn new(id: Uuid, role: UserRole) -> Self {
        Self { id, role }
    }
}

/// Kinds of owner-scoped entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Chart-of-accounts group.
    Group,
    /// Master account.
    MasterAccount,
    /// Transaction header.
    Transaction,
    /// Transaction line.
    TransactionLine,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Group => write!(f, "group"),
            Self::MasterAccount => write!(f, "master account"),
            Self::Transaction => write!(f, "transaction"),
            Self::TransactionLine => write!(f, "transaction line"),
        }
    }
}

/// Transaction create/update request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionInput {
    /// Transaction date.
    pub date: NaiveDate,
    /// Free-text description.
    pub description: String,
    /// Debit/credit lines.
    pub lines: Vec<LineInput>,
}

impl TransactionInput {
    /// Returns the header part of the request.
    #[must_use]
    pub fn header(&self) -> TransactionHeader {
        TransactionHeader {
            date: self.date,
            description: self.description.trim().to_string(),
        }
    }
}

/// One requested line. Lines with an `id` update an existing line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineInput {
    /// Existing line ID (update) or `None` (create).
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Account the line posts to.
    pub master_account_id: Uuid,
    /// Debited amount.
    #[serde(default)]
    pub debited_amount: Decimal,
    /// Credited amount.
    #[serde(default)]
    pub credited_amount: Decimal,
    /// Optional comment.
    #[serde(default)]
    pub comment: Option<String>,
}

impl LineInput {
    /// Returns the storable fields of this line.
    #[must_use]
    pub fn fields(&self) -> LineFields {
        LineFields {
            master_account_id: self.master_account_id,
            debited_amount: self.debited_amount,
            credited_amount: self.credited_amount,
            comment: self.comment.clone(),
        }
    }
}

/// Header fields written by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionHeader {
    /// Transaction date.
    pub date: NaiveDate,
    /// Description.
    pub description: String,
}

/// Line fields written by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFields {
    /// Account the line posts to.
    pub master_account_id: Uuid,
    /// Debited amount.
    pub debited_amount: Decimal,
    /// Credited amount.
    pub credited_amount: Decimal,
    /// Optional comment.
    pub comment: Option<String>,
}

/// Persisted transaction header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction ID.
    pub id: Uuid,
    /// Owning user.
    pub owner_id: Uuid,
    /// Transaction date.
    pub date: NaiveDate,
    /// Description.
    pub description: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Persisted transaction line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    /// Line ID.
    pub id: Uuid,
    /// Parent transaction.
    pub transaction_id: Uuid,
    /// Account the line posts to.
    pub master_account_id: Uuid,
    /// Debited amount.
    pub debited_amount: Decimal,
    /// Credited amount.
    pub credited_amount: Decimal,
    /// Optional comment.
    pub comment: Option<String>,
}

/// Balance-relevant view of a master account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Account ID.
    pub id: Uuid,
    /// Owning user.
    pub owner_id: Uuid,
    /// Account name.
    pub name: String,
    /// Balance before any recorded lines.
    pub opening_amount: Decimal,
    /// Opening amount plus the signed delta of every attached line.
    pub closing_amount: Decimal,
}

/// A transaction header together with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionWithLines {
    /// Header.
    #[serde(flatten)]
    pub transaction: TransactionRecord,
    /// Lines.
    pub lines: Vec<LineRecord>,
}

impl TransactionWithLines {
    /// Sum of debited amounts.
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|l| l.debited_amount).sum()
    }

    /// Sum of credited amounts.
    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|l| l.credited_amount).sum()
    }
}

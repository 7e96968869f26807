//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chart::NormalBalance;

/// Kinds of report the service can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportType {
    /// Per-account debit and credit totals.
    #[serde(rename = "Trial Balance")]
    TrialBalance,
    /// Assets, liabilities and equity at a cutoff date.
    #[serde(rename = "Balance Sheet")]
    BalanceSheet,
    /// Revenue and expenses over a period.
    #[serde(rename = "Profit and Loss Statement")]
    ProfitAndLoss,
    /// Movement of cash accounts over a period.
    #[serde(rename = "Cash Flow Statement")]
    CashFlow,
}

impl ReportType {
    /// Returns the display name, identical to the wire name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::TrialBalance => "Trial Balance",
            Self::BalanceSheet => "Balance Sheet",
            Self::ProfitAndLoss => "Profit and Loss Statement",
            Self::CashFlow => "Cash Flow Statement",
        }
    }
}

/// Report generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    /// Which report to build.
    pub report_type: ReportType,
    /// Inclusive period start.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Inclusive period end.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Balance sheet cutoff; falls back to `end_date`.
    #[serde(default)]
    pub as_of_date: Option<NaiveDate>,
    /// Trial balance class filter, matched case-insensitively.
    #[serde(default)]
    pub account_filter: Option<String>,
}

/// Account classification derived from the account name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountClass {
    /// Name mentions "asset".
    Asset,
    /// Name mentions "liability" or "liabilities".
    Liability,
    /// Name mentions "equity".
    Equity,
    /// Name mentions "revenue".
    Revenue,
    /// Name mentions "expense".
    Expense,
    /// Anything else.
    Other,
}

impl AccountClass {
    const KEYWORDS: [(&'static str, Self); 5] = [
        ("asset", Self::Asset),
        ("liabilit", Self::Liability),
        ("equity", Self::Equity),
        ("revenue", Self::Revenue),
        ("expense", Self::Expense),
    ];

    /// Classifies an account by the first keyword found in its name.
    #[must_use]
    pub fn classify(name: &str) -> Self {
        let lower = name.to_lowercase();
        Self::KEYWORDS
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map_or(Self::Other, |(_, class)| *class)
    }

    /// Returns the class name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
            Self::Other => "other",
        }
    }

    /// Returns the section label used in statements and filters.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Asset => "Assets",
            Self::Liability => "Liabilities",
            Self::Equity => "Equity",
            Self::Revenue => "Revenue",
            Self::Expense => "Expenses",
            Self::Other => "Other",
        }
    }

    /// Side on which balances of this class grow.
    #[must_use]
    pub const fn normal_balance(&self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense | Self::Other => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }
}

/// Account as seen by the report service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportAccount {
    /// Account ID.
    pub id: Uuid,
    /// Account name.
    pub name: String,
}

/// Dated line amount as seen by the report service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    /// Account the line posts to.
    pub account_id: Uuid,
    /// Date of the owning transaction.
    pub date: NaiveDate,
    /// Debited amount.
    pub debited_amount: Decimal,
    /// Credited amount.
    pub credited_amount: Decimal,
}

/// Trial balance row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account ID.
    pub account_id: Uuid,
    /// Account name.
    pub account_name: String,
    /// Derived class.
    pub account_class: AccountClass,
    /// Total debited in range.
    pub total_debit: Decimal,
    /// Total credited in range.
    pub total_credit: Decimal,
}

/// Trial balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Period start, if bounded.
    pub start_date: Option<NaiveDate>,
    /// Period end, if bounded.
    pub end_date: Option<NaiveDate>,
    /// Non-zero account rows.
    pub accounts: Vec<TrialBalanceRow>,
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}

/// Account amount within a statement section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementRow {
    /// Account ID.
    pub account_id: Uuid,
    /// Account name.
    pub account_name: String,
    /// Signed amount.
    pub amount: Decimal,
}

/// Statement section (assets, revenue, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementSection {
    /// Section total.
    pub total: Decimal,
    /// Accounts in this section.
    pub accounts: Vec<StatementRow>,
}

impl StatementSection {
    pub(crate) fn push(&mut self, row: StatementRow) {
        self.total += row.amount;
        self.accounts.push(row);
    }
}

/// Balance sheet report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// Cutoff date (inclusive).
    pub as_of: NaiveDate,
    /// Asset accounts.
    pub assets: StatementSection,
    /// Liability accounts.
    pub liabilities: StatementSection,
    /// Equity accounts.
    pub equity: StatementSection,
}

/// Profit and loss statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitAndLossReport {
    /// Period start.
    pub period_start: NaiveDate,
    /// Period end.
    pub period_end: NaiveDate,
    /// Revenue accounts, credit-positive.
    pub revenue: StatementSection,
    /// Expense accounts, debit-positive.
    pub expenses: StatementSection,
    /// Revenue total minus expenses total.
    pub net_income: Decimal,
}

/// Cash flow statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowReport {
    /// Period start.
    pub period_start: NaiveDate,
    /// Period end.
    pub period_end: NaiveDate,
    /// Cash accounts' net movement.
    pub operating_activities: StatementSection,
    /// Total net movement.
    pub net_cash_flow: Decimal,
}

/// Generated report, tagged with its type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "report_type")]
pub enum Report {
    /// Trial balance.
    #[serde(rename = "Trial Balance")]
    TrialBalance(TrialBalanceReport),
    /// Balance sheet.
    #[serde(rename = "Balance Sheet")]
    BalanceSheet(BalanceSheetReport),
    /// Profit and loss statement.
    #[serde(rename = "Profit and Loss Statement")]
    ProfitAndLoss(ProfitAndLossReport),
    /// Cash flow statement.
    #[serde(rename = "Cash Flow Statement")]
    CashFlow(CashFlowReport),
}

//! Report generation service.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::ReportError;
use super::types::{
    AccountClass, BalanceSheetReport, CashFlowReport, ProfitAndLossReport, Report, ReportAccount,
    ReportLine, ReportRequest, ReportType, StatementRow, StatementSection, TrialBalanceReport,
    TrialBalanceRow,
};

/// Service for generating financial reports.
///
/// Works on an owner's accounts and dated lines; loading them is the
/// caller's job.
pub struct ReportService;

impl ReportService {
    /// Generates the requested report.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` if the start date is after the
    /// end date and `ReportError::MissingDate` if the report needs a date the
    /// request left out.
    pub fn generate(
        request: &ReportRequest,
        accounts: &[ReportAccount],
        lines: &[ReportLine],
    ) -> Result<Report, ReportError> {
        if let (Some(start), Some(end)) = (request.start_date, request.end_date)
            && start > end
        {
            return Err(ReportError::InvalidDateRange { start, end });
        }

        match request.report_type {
            ReportType::TrialBalance => Ok(Report::TrialBalance(Self::trial_balance(
                request, accounts, lines,
            ))),
            ReportType::BalanceSheet => {
                let as_of = request.as_of_date.or(request.end_date).ok_or(
                    ReportError::MissingDate {
                        report: ReportType::BalanceSheet.display_name(),
                        needs: "as_of_date or end_date",
                    },
                )?;
                Ok(Report::BalanceSheet(Self::balance_sheet(
                    as_of, accounts, lines,
                )))
            }
            ReportType::ProfitAndLoss => {
                let (start, end) = Self::period(request)?;
                Ok(Report::ProfitAndLoss(Self::profit_and_loss(
                    start, end, accounts, lines,
                )))
            }
            ReportType::CashFlow => {
                let (start, end) = Self::period(request)?;
                Ok(Report::CashFlow(Self::cash_flow(
                    start, end, accounts, lines,
                )))
            }
        }
    }

    /// Per-account debit and credit totals.
    ///
    /// The date range applies only when both bounds are present. Rows with
    /// no activity are omitted.
    #[must_use]
    pub fn trial_balance(
        request: &ReportRequest,
        accounts: &[ReportAccount],
        lines: &[ReportLine],
    ) -> TrialBalanceReport {
        let range = request.start_date.zip(request.end_date);
        let filter = request
            .account_filter
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_lowercase);

        let mut rows = Vec::new();
        for account in accounts {
            let class = AccountClass::classify(&account.name);
            if let Some(filter) = &filter
                && !class.label().to_lowercase().contains(filter.as_str())
            {
                continue;
            }

            let (total_debit, total_credit) = Self::totals(lines, account, |date| {
                range.is_none_or(|(start, end)| date >= start && date <= end)
            });
            if total_debit.is_zero() && total_credit.is_zero() {
                continue;
            }

            rows.push(TrialBalanceRow {
                account_id: account.id,
                account_name: account.name.clone(),
                account_class: class,
                total_debit,
                total_credit,
            });
        }

        let total_debit: Decimal = rows.iter().map(|r| r.total_debit).sum();
        let total_credit: Decimal = rows.iter().map(|r| r.total_credit).sum();

        TrialBalanceReport {
            start_date: request.start_date,
            end_date: request.end_date,
            accounts: rows,
            total_debit,
            total_credit,
            is_balanced: total_debit == total_credit,
        }
    }

    /// Assets, liabilities and equity from every line dated on or before `as_of`.
    #[must_use]
    pub fn balance_sheet(
        as_of: NaiveDate,
        accounts: &[ReportAccount],
        lines: &[ReportLine],
    ) -> BalanceSheetReport {
        let mut assets = StatementSection::default();
        let mut liabilities = StatementSection::default();
        let mut equity = StatementSection::default();

        for account in accounts {
            let class = AccountClass::classify(&account.name);
            let section = match class {
                AccountClass::Asset => &mut assets,
                AccountClass::Liability => &mut liabilities,
                AccountClass::Equity => &mut equity,
                _ => continue,
            };
            if let Some(row) = Self::statement_row(account, class, lines, |date| date <= as_of) {
                section.push(row);
            }
        }

        BalanceSheetReport {
            as_of,
            assets,
            liabilities,
            equity,
        }
    }

    /// Revenue and expenses over an inclusive period.
    #[must_use]
    pub fn profit_and_loss(
        start: NaiveDate,
        end: NaiveDate,
        accounts: &[ReportAccount],
        lines: &[ReportLine],
    ) -> ProfitAndLossReport {
        let mut revenue = StatementSection::default();
        let mut expenses = StatementSection::default();

        for account in accounts {
            let class = AccountClass::classify(&account.name);
            let section = match class {
                AccountClass::Revenue => &mut revenue,
                AccountClass::Expense => &mut expenses,
                _ => continue,
            };
            if let Some(row) =
                Self::statement_row(account, class, lines, |date| date >= start && date <= end)
            {
                section.push(row);
            }
        }

        let net_income = revenue.total - expenses.total;
        ProfitAndLossReport {
            period_start: start,
            period_end: end,
            revenue,
            expenses,
            net_income,
        }
    }

    /// Net movement of asset accounts named "cash" over an inclusive period.
    #[must_use]
    pub fn cash_flow(
        start: NaiveDate,
        end: NaiveDate,
        accounts: &[ReportAccount],
        lines: &[ReportLine],
    ) -> CashFlowReport {
        let mut operating_activities = StatementSection::default();

        for account in accounts {
            let class = AccountClass::classify(&account.name);
            if class != AccountClass::Asset || !account.name.to_lowercase().contains("cash") {
                continue;
            }
            if let Some(row) =
                Self::statement_row(account, class, lines, |date| date >= start && date <= end)
            {
                operating_activities.push(row);
            }
        }

        let net_cash_flow = operating_activities.total;
        CashFlowReport {
            period_start: start,
            period_end: end,
            operating_activities,
            net_cash_flow,
        }
    }

    fn period(request: &ReportRequest) -> Result<(NaiveDate, NaiveDate), ReportError> {
        request
            .start_date
            .zip(request.end_date)
            .ok_or(ReportError::MissingDate {
                report: request.report_type.display_name(),
                needs: "start_date and end_date",
            })
    }

    fn totals(
        lines: &[ReportLine],
        account: &ReportAccount,
        in_range: impl Fn(NaiveDate) -> bool,
    ) -> (Decimal, Decimal) {
        lines
            .iter()
            .filter(|line| line.account_id == account.id && in_range(line.date))
            .fold((Decimal::ZERO, Decimal::ZERO), |(debit, credit), line| {
                (debit + line.debited_amount, credit + line.credited_amount)
            })
    }

    fn statement_row(
        account: &ReportAccount,
        class: AccountClass,
        lines: &[ReportLine],
        in_range: impl Fn(NaiveDate) -> bool,
    ) -> Option<StatementRow> {
        let (debit, credit) = Self::totals(lines, account, in_range);
        let amount = class.normal_balance().balance_change(debit, credit);
        (!amount.is_zero()).then(|| StatementRow {
            account_id: account.id,
            account_name: account.name.clone(),
            amount,
        })
    }
}

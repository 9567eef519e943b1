//! Household expense ledger: expenses, monthly templates, and budget summaries.

pub mod calendar;
pub mod expense;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod recurring;

pub use calendar::{days_in_month, YearMonth, YearMonthParseError};
pub use expense::{parse_expense_date, Expense, ExpenseDraft};
pub use ledger::{BudgetSummary, BudgetWarning, CategoryTotal, ExpenseLedger, HIGH_SPENDING_RATIO};
pub use recurring::{
    apply_all_templates, apply_template, is_materialized, occurrence_date, Cadence,
    RecurringTemplate,
};

use chrono::NaiveDate;
use tracing::info;

use crate::errors::FinanceError;
use crate::ledger::{apply_all_templates, apply_template, Expense, ExpenseLedger, RecurringTemplate};

use super::ServiceResult;

pub struct RecurringService;

impl RecurringService {
    pub fn list(ledger: &ExpenseLedger) -> &[RecurringTemplate] {
        &ledger.recurring
    }

    /// Materializes every template not yet recorded for its next occurrence
    /// month and returns the new expenses, which are also prepended to the ledger.
    pub fn apply_due(ledger: &mut ExpenseLedger, reference: NaiveDate) -> Vec<Expense> {
        let created = apply_all_templates(&ledger.recurring, &ledger.expenses, reference);
        for expense in created.iter().rev() {
            ledger.add_expense(expense.clone());
        }
        info!(
            created = created.len(),
            templates = ledger.recurring.len(),
            %reference,
            "recurring templates applied"
        );
        created
    }

    /// Records the template's next occurrence even if it already exists.
    pub fn apply_now(
        ledger: &mut ExpenseLedger,
        template_id: &str,
        reference: NaiveDate,
    ) -> ServiceResult<Expense> {
        let template = ledger
            .template(template_id)
            .ok_or_else(|| FinanceError::NotFound(format!("recurring template `{template_id}`")))?;
        let expense = apply_template(template, reference);
        info!(template = %template_id, date = %expense.date, "recurring template applied now");
        ledger.add_expense(expense.clone());
        Ok(expense)
    }

    /// Deletes the template; expenses it generated are kept.
    pub fn remove_template(
        ledger: &mut ExpenseLedger,
        template_id: &str,
    ) -> ServiceResult<RecurringTemplate> {
        let removed = ledger
            .remove_template(template_id)
            .ok_or_else(|| FinanceError::NotFound(format!("recurring template `{template_id}`")))?;
        info!(template = %template_id, "recurring template removed");
        Ok(removed)
    }
}

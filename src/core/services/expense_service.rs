use chrono::Datelike;
use tracing::info;

use crate::errors::FinanceError;
use crate::ledger::{Expense, ExpenseDraft, ExpenseLedger, RecurringTemplate};
use crate::time::Clock;

use super::{ServiceError, ServiceResult};

pub struct ExpenseService;

impl ExpenseService {
    /// Records an expense dated today at the top of the list and returns its id.
    ///
    /// A recurring draft also registers a monthly template on today's day of
    /// month and links the new expense to it.
    pub fn add(
        ledger: &mut ExpenseLedger,
        draft: ExpenseDraft,
        clock: &dyn Clock,
    ) -> ServiceResult<String> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Invalid("Expense name is required".into()));
        }
        if !draft.amount.is_finite() || draft.amount <= 0.0 {
            return Err(ServiceError::Invalid(
                "Expense amount must be greater than zero".into(),
            ));
        }
        let category = draft
            .category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .map(str::to_string);

        let today = clock.today();
        let mut expense = Expense::new(name, draft.amount, category.clone(), today);
        if draft.recurring {
            let template = RecurringTemplate::new(name, draft.amount, category, today.day());
            expense = expense.with_recurring_id(ledger.add_template(template));
        }
        info!(
            expense = %expense.id,
            amount = expense.amount,
            recurring = draft.recurring,
            "expense added"
        );
        Ok(ledger.add_expense(expense))
    }

    pub fn remove(ledger: &mut ExpenseLedger, id: &str) -> ServiceResult<Expense> {
        let removed = ledger
            .remove_expense(id)
            .ok_or_else(|| FinanceError::NotFound(format!("expense `{id}`")))?;
        info!(expense = %id, "expense removed");
        Ok(removed)
    }

    pub fn list(ledger: &ExpenseLedger) -> &[Expense] {
        &ledger.expenses
    }

    pub fn set_income(ledger: &mut ExpenseLedger, income: f64) -> ServiceResult<()> {
        ledger.income = Self::non_negative(income, "Income")?;
        info!(income, "income updated");
        Ok(())
    }

    /// Zero clears the goal.
    pub fn set_savings_goal(ledger: &mut ExpenseLedger, goal: f64) -> ServiceResult<()> {
        ledger.savings_goal = Self::non_negative(goal, "Savings goal")?;
        info!(goal, "savings goal updated");
        Ok(())
    }

    fn non_negative(value: f64, label: &str) -> ServiceResult<f64> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(ServiceError::Invalid(format!(
                "{label} must be zero or more"
            )))
        }
    }
}

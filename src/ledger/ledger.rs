use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use super::{calendar::YearMonth, expense::Expense, recurring::RecurringTemplate};

/// Month spend at or above this share of income raises a warning.
pub const HIGH_SPENDING_RATIO: f64 = 0.8;

/// Household budget: income, expenses (newest first), savings goal, and
/// monthly templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExpenseLedger {
    pub income: f64,
    #[serde(alias = "savingsGoal")]
    pub savings_goal: f64,
    pub expenses: Vec<Expense>,
    pub recurring: Vec<RecurringTemplate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: Option<String>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSummary {
    pub month: YearMonth,
    pub income: f64,
    pub total_expenses: f64,
    pub month_expenses: f64,
    pub balance: f64,
    pub by_category: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BudgetWarning {
    Overspent { deficit: f64 },
    SavingsGoalAtRisk { goal: f64, available: f64 },
    HighSpendingRatio { ratio: f64 },
}

impl fmt::Display for BudgetWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetWarning::Overspent { deficit } => {
                write!(f, "expenses exceed income by {deficit:.2}")
            }
            BudgetWarning::SavingsGoalAtRisk { goal, available } => write!(
                f,
                "savings goal {goal:.2} at risk, only {available:.2} left after expenses"
            ),
            BudgetWarning::HighSpendingRatio { ratio } => {
                write!(f, "{:.0}% of income spent this month", ratio * 100.0)
            }
        }
    }
}

impl ExpenseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts at the front so the list stays newest first.
    pub fn add_expense(&mut self, expense: Expense) -> String {
        let id = expense.id.clone();
        self.expenses.insert(0, expense);
        id
    }

    pub fn expense(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    pub fn remove_expense(&mut self, id: &str) -> Option<Expense> {
        let index = self.expenses.iter().position(|expense| expense.id == id)?;
        Some(self.expenses.remove(index))
    }

    pub fn add_template(&mut self, template: RecurringTemplate) -> String {
        let id = template.id.clone();
        self.recurring.push(template);
        id
    }

    pub fn template(&self, id: &str) -> Option<&RecurringTemplate> {
        self.recurring.iter().find(|template| template.id == id)
    }

    /// Generated expenses stay in the ledger with a dangling link.
    pub fn remove_template(&mut self, id: &str) -> Option<RecurringTemplate> {
        let index = self.recurring.iter().position(|template| template.id == id)?;
        Some(self.recurring.remove(index))
    }

    pub fn total_expenses(&self) -> f64 {
        self.expenses.iter().map(|expense| expense.amount).sum()
    }

    pub fn balance(&self) -> f64 {
        self.income - self.total_expenses()
    }

    pub fn month_total(&self, month: YearMonth) -> f64 {
        self.month_expenses(month).map(|expense| expense.amount).sum()
    }

    fn month_expenses(&self, month: YearMonth) -> impl Iterator<Item = &Expense> + '_ {
        self.expenses
            .iter()
            .filter(move |expense| expense.in_month(month))
    }

    pub fn summary(&self, month: YearMonth) -> BudgetSummary {
        let mut totals: BTreeMap<Option<&str>, f64> = BTreeMap::new();
        for expense in self.month_expenses(month) {
            *totals.entry(expense.category.as_deref()).or_default() += expense.amount;
        }
        let mut by_category: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(category, total)| CategoryTotal {
                category: category.map(str::to_string),
                total,
            })
            .collect();
        by_category.sort_by(|a, b| b.total.total_cmp(&a.total));

        let total_expenses = self.total_expenses();
        BudgetSummary {
            month,
            income: self.income,
            total_expenses,
            month_expenses: self.month_total(month),
            balance: self.income - total_expenses,
            by_category,
        }
    }

    pub fn warnings(&self, month: YearMonth) -> Vec<BudgetWarning> {
        let mut warnings = Vec::new();
        let balance = self.balance();
        if balance < 0.0 {
            warnings.push(BudgetWarning::Overspent { deficit: -balance });
        }
        if self.savings_goal > 0.0 && balance < self.savings_goal {
            warnings.push(BudgetWarning::SavingsGoalAtRisk {
                goal: self.savings_goal,
                available: balance,
            });
        }
        if self.income > 0.0 {
            let ratio = self.month_total(month) / self.income;
            if ratio >= HIGH_SPENDING_RATIO {
                warnings.push(BudgetWarning::HighSpendingRatio { ratio });
            }
        }
        warnings
    }
}

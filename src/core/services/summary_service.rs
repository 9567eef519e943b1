use crate::ledger::{BudgetSummary, BudgetWarning, ExpenseLedger, YearMonth};
use crate::time::Clock;

pub struct SummaryService;

impl SummaryService {
    pub fn current_month(clock: &dyn Clock) -> YearMonth {
        YearMonth::from_date(clock.today())
    }

    pub fn summarize(ledger: &ExpenseLedger, month: YearMonth) -> BudgetSummary {
        ledger.summary(month)
    }

    pub fn warnings(ledger: &ExpenseLedger, month: YearMonth) -> Vec<BudgetWarning> {
        ledger.warnings(month)
    }

    pub fn current(ledger: &ExpenseLedger, clock: &dyn Clock) -> (BudgetSummary, Vec<BudgetWarning>) {
        let month = Self::current_month(clock);
        (ledger.summary(month), ledger.warnings(month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Expense;
    use crate::time::FixedClock;
    use chrono::NaiveDate;

    #[test]
    fn current_uses_clock_month() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        let mut ledger = ExpenseLedger::new();
        ledger.income = 100.0;
        ledger.add_expense(Expense::new("Market", 90.0, None, today));
        ledger.add_expense(Expense::new(
            "Old",
            5.0,
            None,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        ));

        let (summary, warnings) = SummaryService::current(&ledger, &FixedClock::on(today));
        assert_eq!(summary.month.to_string(), "2025-04");
        assert_eq!(summary.month_expenses, 90.0);
        assert_eq!(summary.balance, 5.0);
        assert_eq!(warnings, vec![BudgetWarning::HighSpendingRatio { ratio: 0.9 }]);
    }
}

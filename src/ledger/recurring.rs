//! Monthly recurring-expense templates and their materialization into ledger entries.
//!
//! Materialization is idempotent per template and month: [`apply_all_templates`]
//! skips any template already represented in the target month, so running it
//! repeatedly against its own output creates nothing new. [`apply_template`] is
//! the explicit "apply now" action and never checks for duplicates.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{calendar::YearMonth, expense::Expense};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    #[default]
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringTemplate {
    pub id: String,
    pub name: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub cadence: Cadence,
    /// Day of month in `1..=31`; clamped to the length of each target month.
    #[serde(alias = "dayOfMonth")]
    pub preferred_day: u32,
}

impl RecurringTemplate {
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        category: Option<String>,
        preferred_day: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            amount,
            category,
            cadence: Cadence::Monthly,
            preferred_day: preferred_day.clamp(1, 31),
        }
    }

    fn materialize(&self, date: NaiveDate) -> Expense {
        Expense::new(self.name.clone(), self.amount, self.category.clone(), date)
            .with_recurring_id(self.id.clone())
    }
}

/// Next occurrence of `template` on or after `reference`.
///
/// The preferred day is clamped into the reference month; if that date has
/// already passed, the same rule is applied to the following month.
pub fn occurrence_date(template: &RecurringTemplate, reference: NaiveDate) -> NaiveDate {
    match template.cadence {
        Cadence::Monthly => {
            let month = YearMonth::from_date(reference);
            let current = month
                .clamped_day(template.preferred_day)
                .unwrap_or(reference);
            if current >= reference {
                return current;
            }
            month
                .next()
                .and_then(|next| next.clamped_day(template.preferred_day))
                .unwrap_or(current)
        }
    }
}

/// Whether `existing` already holds this template's entry for the month of `occurrence`.
///
/// Linked expenses match on `recurring_id`. Unlinked ones (written before the
/// link existed) match on name and amount, which can give false positives for
/// unrelated same-name, same-amount expenses. Expenses with unreadable dates
/// never match.
pub fn is_materialized(
    template: &RecurringTemplate,
    existing: &[Expense],
    occurrence: NaiveDate,
) -> bool {
    let month = YearMonth::from_date(occurrence);
    existing.iter().any(|expense| {
        if !expense.in_month(month) {
            return false;
        }
        match expense.recurring_id.as_deref() {
            Some(id) => id == template.id,
            None => expense.name == template.name && expense.amount == template.amount,
        }
    })
}

/// Creates the template's next occurrence unconditionally.
///
/// Unlike [`apply_all_templates`] this takes no existing expenses and always
/// returns an entry: "apply now" records a payment even when the month is
/// already covered.
pub fn apply_template(template: &RecurringTemplate, reference: NaiveDate) -> Expense {
    let date = occurrence_date(template, reference);
    debug!(template = %template.id, %date, "applying recurring template");
    template.materialize(date)
}

/// Creates at most one expense per template for its next occurrence, skipping
/// templates already represented in `existing` for that month.
///
/// Every template is checked against the same `existing` snapshot; a template
/// id listed twice is only considered once.
pub fn apply_all_templates(
    templates: &[RecurringTemplate],
    existing: &[Expense],
    reference: NaiveDate,
) -> Vec<Expense> {
    let mut seen = HashSet::new();
    templates
        .iter()
        .filter(|template| seen.insert(template.id.as_str()))
        .filter_map(|template| {
            let date = occurrence_date(template, reference);
            if is_materialized(template, existing, date) {
                debug!(template = %template.id, %date, "occurrence already recorded");
                None
            } else {
                Some(template.materialize(date))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn template(day: u32) -> RecurringTemplate {
        RecurringTemplate::new("Internet", 99.9, Some("Utilities".into()), day)
    }

    #[test]
    fn occurrence_stays_in_month_when_not_passed() {
        let t = template(15);
        assert_eq!(occurrence_date(&t, date(2025, 4, 10)), date(2025, 4, 15));
        assert_eq!(occurrence_date(&t, date(2025, 4, 15)), date(2025, 4, 15));
    }

    #[test]
    fn passed_occurrence_moves_to_next_month() {
        let t = template(5);
        assert_eq!(occurrence_date(&t, date(2025, 4, 10)), date(2025, 5, 5));
        assert_eq!(occurrence_date(&t, date(2025, 12, 20)), date(2026, 1, 5));
    }

    #[test]
    fn day_31_clamps_to_short_months() {
        let t = template(31);
        assert_eq!(occurrence_date(&t, date(2025, 4, 10)), date(2025, 4, 30));
        assert_eq!(occurrence_date(&t, date(2025, 2, 1)), date(2025, 2, 28));
        assert_eq!(occurrence_date(&t, date(2024, 2, 1)), date(2024, 2, 29));
    }

    #[test]
    fn next_month_is_clamped_too() {
        // Jan 30 has passed on Jan 31; February only has 28 days.
        let t = template(30);
        assert_eq!(occurrence_date(&t, date(2025, 1, 31)), date(2025, 2, 28));
    }

    #[test]
    fn apply_template_links_the_expense() {
        let t = template(20);
        let expense = apply_template(&t, date(2025, 4, 10));
        assert_eq!(expense.recurring_id.as_deref(), Some(t.id.as_str()));
        assert_eq!(expense.date, "2025-04-20");
        assert_eq!(expense.name, "Internet");
        assert_eq!(expense.category.as_deref(), Some("Utilities"));
    }

    #[test]
    fn apply_template_ignores_existing_entries() {
        let t = template(20);
        let first = apply_template(&t, date(2025, 4, 10));
        let second = apply_template(&t, date(2025, 4, 10));
        assert_ne!(first.id, second.id);
        assert_eq!(first.date, second.date);
    }

    #[test]
    fn batch_is_idempotent() {
        let templates = vec![template(1), template(31), template(12)];
        let reference = date(2025, 4, 10);
        let mut existing = Vec::new();

        let first = apply_all_templates(&templates, &existing, reference);
        assert_eq!(first.len(), 3);
        existing.extend(first);

        let second = apply_all_templates(&templates, &existing, reference);
        assert!(second.is_empty());
    }

    #[test]
    fn duplicate_template_ids_materialize_once() {
        let t = template(12);
        let templates = vec![t.clone(), t];
        let created = apply_all_templates(&templates, &[], date(2025, 4, 10));
        assert_eq!(created.len(), 1);
    }

    #[test]
    fn unlinked_expense_with_same_name_and_amount_blocks_creation() {
        let t = template(12);
        let manual = Expense::new("Internet", 99.9, None, date(2025, 4, 2));
        let created = apply_all_templates(&[t], &[manual], date(2025, 4, 10));
        assert!(created.is_empty());
    }

    #[test]
    fn fallback_requires_matching_amount_and_month() {
        let t = template(12);
        let other_amount = Expense::new("Internet", 120.0, None, date(2025, 4, 2));
        let other_month = Expense::new("Internet", 99.9, None, date(2025, 3, 12));
        let created = apply_all_templates(
            std::slice::from_ref(&t),
            &[other_amount, other_month],
            date(2025, 4, 10),
        );
        assert_eq!(created.len(), 1);
    }

    #[test]
    fn linked_expense_for_other_template_does_not_block() {
        let t = template(12);
        let foreign = Expense::new("Internet", 99.9, None, date(2025, 4, 12))
            .with_recurring_id("someone-else");
        let created = apply_all_templates(&[t], &[foreign], date(2025, 4, 10));
        assert_eq!(created.len(), 1);
    }

    #[test]
    fn unreadable_dates_never_match() {
        let t = template(12);
        let mut stale = Expense::new("Internet", 99.9, None, date(2025, 4, 12))
            .with_recurring_id(t.id.clone());
        stale.date = "not a date".into();
        let created = apply_all_templates(&[t], &[stale], date(2025, 4, 10));
        assert_eq!(created.len(), 1);
    }

    #[test]
    fn dedup_targets_the_occurrence_month() {
        // The April 5 occurrence has passed, so May is the target month.
        let t = template(5);
        let april = Expense::new("Internet", 99.9, None, date(2025, 4, 5))
            .with_recurring_id(t.id.clone());
        let created = apply_all_templates(std::slice::from_ref(&t), &[april], date(2025, 4, 10));
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].date, "2025-05-05");
    }
}

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calendar::YearMonth;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single household expense.
///
/// `date` keeps the stored text: older documents hold full ISO timestamps,
/// new entries are written as `YYYY-MM-DD`. Use [`Expense::calendar_date`]
/// to read it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: String,
    pub name: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub date: String,
    /// Template this expense was generated from, if any. May dangle once the
    /// template is deleted.
    #[serde(
        default,
        alias = "recurringId",
        skip_serializing_if = "Option::is_none"
    )]
    pub recurring_id: Option<String>,
}

impl Expense {
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        category: Option<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            amount,
            category,
            date: date.format(DATE_FORMAT).to_string(),
            recurring_id: None,
        }
    }

    pub fn with_recurring_id(mut self, template_id: impl Into<String>) -> Self {
        self.recurring_id = Some(template_id.into());
        self
    }

    /// The calendar date of the expense, or `None` when the stored text is unreadable.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        parse_expense_date(&self.date)
    }

    /// False when the date cannot be read.
    pub fn in_month(&self, month: YearMonth) -> bool {
        self.calendar_date().is_some_and(|date| month.contains(date))
    }
}

/// Input for a manually entered expense.
#[derive(Debug, Clone, Default)]
pub struct ExpenseDraft {
    pub name: String,
    pub amount: f64,
    pub category: Option<String>,
    /// Also create a monthly template from this expense.
    pub recurring: bool,
}

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (date taken in the stated offset),
/// and zone-less ISO date-times.
pub fn parse_expense_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|stamp| stamp.date())
}

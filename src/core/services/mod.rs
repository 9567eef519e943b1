//! Stateless facades that validate input and mutate a [`UserData`](crate::core::UserData)
//! snapshot or its expense ledger.

pub mod expense_service;
pub mod recurring_service;
pub mod scenario_service;
pub mod summary_service;

pub use expense_service::ExpenseService;
pub use recurring_service::RecurringService;
pub use scenario_service::ScenarioService;
pub use summary_service::SummaryService;

use crate::errors::FinanceError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Finance(#[from] FinanceError),
    #[error("{0}")]
    Invalid(String),
}

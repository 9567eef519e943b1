//! Compound-interest scenarios: projection, goal solving, and progress tracking.
//!
//! Everything here is a pure function of its inputs; callers own persistence.

pub mod goal;
pub mod progress;
pub mod projection;
pub mod scenario;

pub use goal::{solve_required_daily_rate, GoalOutcome, GoalSolver};
pub use progress::CompletionMarkers;
pub use projection::{project, project_params, DayEntry, Projection, ProjectionTotals};
pub use scenario::{Scenario, ScenarioParams, ScenarioPatch, MAX_HORIZON_DAYS};

pub mod data_manager;
pub mod services;
pub mod user_data;

pub use data_manager::DataManager;
pub use user_data::{LegacyScenarioFields, UserData};

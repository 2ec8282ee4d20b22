pub mod alerts;
pub mod config;
pub mod estimate;
pub mod reconcile;

//! E2E test suite entry point.

mod default_data_workflow;
mod fixture;
mod theme_workflow;

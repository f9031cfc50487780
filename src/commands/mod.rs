pub mod completions;
pub mod config;
pub mod doctor;
pub mod operations;
pub mod run;
pub mod templates;

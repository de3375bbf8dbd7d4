//! CLI command implementations.

mod config;
mod doctor;
mod research;
mod tool;

pub use config::run_config;
pub use doctor::run_doctor;
pub use research::{run_research, ResearchOptions};
pub use tool::{run_list_tools, run_tool};

//! Structured research answers.
//!
//! Defines the fixed shape every research run must produce and the parser
//! that coerces free-text model output into it.

mod parser;
mod response;

pub use parser::ResearchParser;
pub use response::ResearchResponse;

//! The structured research response.

use serde::{Deserialize, Serialize};

/// A validated research answer.
///
/// All four fields are required when deserializing; a missing field is a
/// parse failure, never a partially populated record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchResponse {
    /// Normalized subject of the query.
    pub topic: String,
    /// The synthesized answer.
    pub summary: String,
    /// URLs or citations, in the order the model gave them.
    pub sources: Vec<String>,
    /// Names of the tools the model reports having used.
    pub tools_used: Vec<String>,
}

impl ResearchResponse {
    /// Render the response as a plain-text report for the output file.
    pub fn to_report(&self) -> String {
        let mut report = format!("Topic: {}\n\n{}\n", self.topic, self.summary.trim_end());

        if !self.sources.is_empty() {
            report.push_str("\nSources:\n");
            for (i, source) in self.sources.iter().enumerate() {
                report.push_str(&format!("{}. {}\n", i + 1, source));
            }
        }

        if !self.tools_used.is_empty() {
            report.push_str(&format!("\nTools used: {}\n", self.tools_used.join(", ")));
        }

        report.push('\n');
        report
    }
}

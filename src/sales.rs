//! The proactive sales agent panel: a farmer profile form and the parsed
//! log of the agent's last run.

use crate::agent_log::{self, Speaker, Turn};
use crate::client::FarmerProfile;

pub const AGENT_FAILURE: &str =
    "Failed to get a response from the agent. Please check the backend server.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Commodity,
    Grade,
    MinimumPrice,
    Location,
}

/// Numeric value of the price box; anything unparsable counts as zero.
pub fn coerce_price(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
        .unwrap_or(0.0)
}

#[derive(Debug)]
pub struct SalesAgent {
    profile: FarmerProfile,
    price_input: String,
    turns: Vec<Turn>,
    is_running: bool,
    revision: u64,
}

impl Default for SalesAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl SalesAgent {
    pub fn new() -> Self {
        SalesAgent {
            profile: FarmerProfile {
                name: String::new(),
                commodity: "Basmati Rice".to_string(),
                grade: "A".to_string(),
                minimum_price: 3500.0,
                location: "Karnal, Haryana".to_string(),
            },
            price_input: "3500".to_string(),
            turns: Vec::new(),
            is_running: false,
            revision: 0,
        }
    }

    pub fn profile(&self) -> &FarmerProfile {
        &self.profile
    }

    /// Raw text of the price box as typed.
    pub fn price_input(&self) -> &str {
        &self.price_input
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn edit(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.profile.name = value,
            Field::Commodity => self.profile.commodity = value,
            Field::Grade => self.profile.grade = value,
            Field::Location => self.profile.location = value,
            Field::MinimumPrice => {
                self.profile.minimum_price = coerce_price(&value);
                self.price_input = value;
            }
        }
    }

    /// Starts a run and returns the profile to post, or `None` while a run
    /// is already in progress.
    pub fn activate(&mut self) -> Option<FarmerProfile> {
        if self.is_running {
            return None;
        }
        self.is_running = true;
        self.turns.clear();
        self.revision += 1;
        Some(self.profile.clone())
    }

    /// Replaces the log with the parsed run, or a single failure notice.
    pub fn finish(&mut self, outcome: Result<String, String>) {
        if !self.is_running {
            tracing::warn!("agent run finished with no run in progress");
            return;
        }

        self.turns = match outcome {
            Ok(log) => {
                let turns = agent_log::segment(&log);
                tracing::info!(turns = turns.len(), "sales agent run completed");
                turns
            }
            Err(detail) => {
                tracing::error!(error = %detail, "error activating the sales agent");
                vec![Turn {
                    speaker: Speaker::System,
                    text: AGENT_FAILURE.to_string(),
                }]
            }
        };
        self.is_running = false;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_coercion_defaults_to_zero() {
        assert_eq!(coerce_price("3675"), 3675.0);
        assert_eq!(coerce_price(" 12.5 "), 12.5);
        assert_eq!(coerce_price(""), 0.0);
        assert_eq!(coerce_price("abc"), 0.0);
        assert_eq!(coerce_price("NaN"), 0.0);
    }

    #[test]
    fn edits_update_profile() {
        let mut agent = SalesAgent::new();
        agent.edit(Field::Name, "Ramesh".to_string());
        agent.edit(Field::MinimumPrice, "42x".to_string());

        assert_eq!(agent.profile().name, "Ramesh");
        assert_eq!(agent.profile().minimum_price, 0.0);
        assert_eq!(agent.price_input(), "42x");
    }

    #[test]
    fn only_one_run_at_a_time() {
        let mut agent = SalesAgent::new();
        assert!(agent.activate().is_some());
        assert!(agent.activate().is_none());
        assert!(agent.is_running());
    }

    #[test]
    fn successful_run_shows_segmented_log() {
        let mut agent = SalesAgent::new();
        agent.activate();
        agent.finish(Ok("Thought: scanning RFQs\nAction: search\nQuote submitted".to_string()));

        assert!(!agent.is_running());
        assert_eq!(agent.turns().len(), 2);
        assert_eq!(agent.turns()[0].speaker, Speaker::Agent);
        assert_eq!(agent.turns()[0].text, "scanning RFQs\nAction: search");
        assert_eq!(agent.turns()[1].speaker, Speaker::System);
    }

    #[test]
    fn failed_run_shows_one_notice_and_new_run_clears_it() {
        let mut agent = SalesAgent::new();
        agent.activate();
        agent.finish(Err("connection reset".to_string()));

        assert_eq!(
            agent.turns(),
            &[Turn {
                speaker: Speaker::System,
                text: AGENT_FAILURE.to_string(),
            }]
        );

        agent.activate();
        assert!(agent.turns().is_empty());
    }
}

//! Splits the sales agent's plain-text run log into conversation turns.

const TURN_MARKERS: [&str; 2] = ["Thought:", "Final Answer:"];
const ACTION_MARKERS: [&str; 2] = ["Action:", "Action Input:"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Agent,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    fn agent(text: String) -> Self {
        Turn {
            speaker: Speaker::Agent,
            text,
        }
    }

    fn system(text: &str) -> Self {
        Turn {
            speaker: Speaker::System,
            text: text.to_string(),
        }
    }
}

/// Line-oriented scan of a run log.
///
/// A line containing `Thought:` or `Final Answer:` opens a new agent turn with
/// the marker removed. `Action:` and `Action Input:` lines are appended to the
/// open agent turn, opening one if needed. Any other non-blank line closes the
/// open agent turn and becomes a system turn of its own. Blank lines are
/// skipped and an agent turn still open at the end is flushed.
pub fn segment(log: &str) -> Vec<Turn> {
    let mut turns = Vec::new();
    let mut current: Option<String> = None;

    for line in log.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(marker) = TURN_MARKERS.iter().find(|m| line.contains(*m)) {
            if let Some(text) = current.take() {
                turns.push(Turn::agent(text));
            }
            current = Some(line.replacen(marker, "", 1).trim().to_string());
        } else if ACTION_MARKERS.iter().any(|m| line.contains(m)) {
            match current.as_mut() {
                Some(text) if !text.is_empty() => {
                    text.push('\n');
                    text.push_str(line);
                }
                Some(text) => text.push_str(line),
                None => current = Some(line.to_string()),
            }
        } else {
            if let Some(text) = current.take() {
                turns.push(Turn::agent(text));
            }
            turns.push(Turn::system(line));
        }
    }

    if let Some(text) = current {
        turns.push(Turn::agent(text));
    }
    turns
}

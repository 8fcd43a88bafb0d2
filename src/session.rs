//! Conversation state for one mounted chat panel.
//!
//! A [`Session`] never talks to the network itself. [`Session::submit`] hands
//! back the [`Request`] to run, and the outcome is fed to
//! [`Session::resolve`] when it arrives.

use crate::attachment::Attachment;

pub const ADVISORY_FAILURE: &str = "Sorry, I couldn't get a response. Please try again.";
pub const ANALYSIS_FAILURE: &str = "Sorry, I couldn't analyze the image. Please try again.";
pub const MISSING_IMAGE: &str = "Please upload an image first.";

/// Name sent with every detection request.
pub const PLANT_NAME: &str = "Plant";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        ChatMessage {
            sender,
            text: text.into(),
        }
    }
}

/// Which backend operation a session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assistant {
    /// Text goes to the general advisory as the crop.
    Advisory,
    /// Text goes to the financial advisory as the goal.
    Finance,
    /// An attached image goes to disease detection, text as context.
    DiseaseDetection,
}

impl Assistant {
    fn failure_text(self) -> &'static str {
        match self {
            Assistant::DiseaseDetection => ANALYSIS_FAILURE,
            Assistant::Advisory | Assistant::Finance => ADVISORY_FAILURE,
        }
    }
}

/// Outbound call produced by a successful submit.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Advisory { crop: String },
    Finance { goal: String },
    Disease {
        image: Attachment,
        plant_name: String,
        context: String,
    },
}

#[derive(Debug)]
pub struct Session {
    assistant: Assistant,
    messages: Vec<ChatMessage>,
    input: String,
    is_loading: bool,
    attachment: Option<Attachment>,
    revision: u64,
}

impl Session {
    /// A fresh session seeded with the assistant's greeting.
    pub fn new(assistant: Assistant, greeting: impl Into<String>) -> Self {
        Session {
            assistant,
            messages: vec![ChatMessage::new(Sender::Assistant, greeting)],
            input: String::new(),
            is_loading: false,
            attachment: None,
            revision: 0,
        }
    }

    pub fn assistant(&self) -> Assistant {
        self.assistant
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Bumped on every change to the message log.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.revision += 1;
    }

    /// Selects the image for the next detection request. Ignored while a
    /// request is in flight so the pending upload is not swapped under it.
    pub fn attach(&mut self, attachment: Attachment) {
        if self.assistant != Assistant::DiseaseDetection || self.is_loading {
            return;
        }
        let notice = format!(
            "Selected file: **{}**. Add any context and press send.",
            attachment.file_name
        );
        self.attachment = Some(attachment);
        self.push(ChatMessage::new(Sender::Assistant, notice));
    }

    /// Starts a turn from the current input buffer.
    ///
    /// Returns `None` when nothing should be sent: a request is already in
    /// flight, the text is empty for a text assistant, or no image is attached
    /// for the disease detector (which also appends a prompt asking for one).
    pub fn submit(&mut self) -> Option<Request> {
        if self.is_loading {
            return None;
        }

        let request = match self.assistant {
            Assistant::Advisory | Assistant::Finance => {
                if self.input.trim().is_empty() {
                    return None;
                }
                let text = std::mem::take(&mut self.input);
                self.push(ChatMessage::new(Sender::User, text.clone()));
                if self.assistant == Assistant::Advisory {
                    Request::Advisory { crop: text }
                } else {
                    Request::Finance { goal: text }
                }
            }
            Assistant::DiseaseDetection => {
                let Some(image) = self.attachment.clone() else {
                    self.push(ChatMessage::new(Sender::Assistant, MISSING_IMAGE));
                    return None;
                };
                let context = std::mem::take(&mut self.input);
                let shown = if context.is_empty() {
                    format!("Analyzing image: {}", image.file_name)
                } else {
                    context.clone()
                };
                self.push(ChatMessage::new(Sender::User, shown));
                Request::Disease {
                    image,
                    plant_name: PLANT_NAME.to_string(),
                    context,
                }
            }
        };

        self.is_loading = true;
        Some(request)
    }

    /// Completes the in-flight turn. `Err` carries the failure detail, which
    /// is logged; the user only sees the fixed failure text.
    pub fn resolve(&mut self, outcome: Result<String, String>) {
        if !self.is_loading {
            tracing::warn!(assistant = ?self.assistant, "response arrived with no request in flight");
            return;
        }

        let reply = match outcome {
            Ok(text) => text,
            Err(detail) => {
                tracing::error!(assistant = ?self.assistant, error = %detail, "assistant request failed");
                self.assistant.failure_text().to_string()
            }
        };
        self.push(ChatMessage::new(Sender::Assistant, reply));

        self.is_loading = false;
        if self.assistant == Assistant::DiseaseDetection {
            self.attachment = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advisory() -> Session {
        Session::new(Assistant::Advisory, "Hello")
    }

    fn detector() -> Session {
        Session::new(Assistant::DiseaseDetection, "Upload a photo")
    }

    fn leaf() -> Attachment {
        Attachment::from_path("/photos/leaf.png").unwrap()
    }

    #[test]
    fn starts_with_greeting() {
        let session = advisory();
        assert_eq!(session.messages(), &[ChatMessage::new(Sender::Assistant, "Hello")]);
        assert!(!session.is_loading());
    }

    #[test]
    fn submit_appends_user_turn_before_response() {
        let mut session = advisory();
        session.set_input("wheat");

        let request = session.submit();

        assert_eq!(request, Some(Request::Advisory { crop: "wheat".to_string() }));
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1], ChatMessage::new(Sender::User, "wheat"));
        assert_eq!(session.input(), "");
        assert!(session.is_loading());

        session.resolve(Ok("Sow in **November**".to_string()));

        assert_eq!(session.messages().len(), 3);
        assert_eq!(
            session.messages()[2],
            ChatMessage::new(Sender::Assistant, "Sow in **November**")
        );
        assert!(!session.is_loading());
    }

    #[test]
    fn empty_submit_is_a_no_op() {
        let mut session = advisory();
        let revision = session.revision();

        assert_eq!(session.submit(), None);
        assert_eq!(session.messages().len(), 1);
        assert!(!session.is_loading());
        assert_eq!(session.revision(), revision);
    }

    #[test]
    fn failure_keeps_user_turn_and_adds_one_fixed_reply() {
        let mut session = advisory();
        session.set_input("cotton");
        session.submit();

        session.resolve(Err("connection refused".to_string()));

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], ChatMessage::new(Sender::User, "cotton"));
        assert_eq!(messages[2], ChatMessage::new(Sender::Assistant, ADVISORY_FAILURE));
        assert!(!session.is_loading());
    }

    #[test]
    fn submit_while_loading_changes_nothing() {
        let mut session = advisory();
        session.set_input("rice");
        assert!(session.submit().is_some());

        session.set_input("rice again");
        let before = session.messages().to_vec();

        assert_eq!(session.submit(), None);
        assert_eq!(session.messages(), before.as_slice());
        assert!(session.is_loading());
        assert_eq!(session.input(), "rice again");
    }

    #[test]
    fn finance_sends_goal() {
        let mut session = Session::new(Assistant::Finance, "Ask me about schemes");
        session.set_input("PM-KISAN eligibility");

        assert_eq!(
            session.submit(),
            Some(Request::Finance {
                goal: "PM-KISAN eligibility".to_string()
            })
        );
    }

    #[test]
    fn detector_without_image_prompts_and_sends_nothing() {
        let mut session = detector();
        session.set_input("yellow leaves");

        assert_eq!(session.submit(), None);

        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1], ChatMessage::new(Sender::Assistant, MISSING_IMAGE));
        assert!(!session.is_loading());
        assert_eq!(session.input(), "yellow leaves");
    }

    #[test]
    fn detector_uses_caption_when_text_is_empty() {
        let mut session = detector();
        session.attach(leaf());
        assert_eq!(
            session.messages()[1].text,
            "Selected file: **leaf.png**. Add any context and press send."
        );

        let request = session.submit().unwrap();

        assert_eq!(
            request,
            Request::Disease {
                image: leaf(),
                plant_name: "Plant".to_string(),
                context: String::new(),
            }
        );
        assert_eq!(
            session.messages()[2],
            ChatMessage::new(Sender::User, "Analyzing image: leaf.png")
        );
    }

    #[test]
    fn detector_clears_attachment_after_either_outcome() {
        let mut session = detector();
        session.attach(leaf());
        session.set_input("brown spots");
        assert!(session.submit().is_some());
        assert!(session.attachment().is_some());

        session.resolve(Err("timeout".to_string()));

        assert!(session.attachment().is_none());
        assert_eq!(
            session.messages().last(),
            Some(&ChatMessage::new(Sender::Assistant, ANALYSIS_FAILURE))
        );

        session.attach(leaf());
        session.submit();
        session.resolve(Ok("Leaf rust".to_string()));
        assert!(session.attachment().is_none());
    }

    #[test]
    fn attach_is_ignored_for_text_assistants_and_while_loading() {
        let mut session = advisory();
        session.attach(leaf());
        assert!(session.attachment().is_none());
        assert_eq!(session.messages().len(), 1);

        let mut session = detector();
        session.attach(leaf());
        session.submit();
        session.attach(Attachment::from_path("other.jpg").unwrap());
        assert_eq!(session.attachment(), Some(&leaf()));
    }

    #[test]
    fn stray_response_is_ignored() {
        let mut session = advisory();
        session.resolve(Ok("late".to_string()));
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn revision_tracks_log_changes() {
        let mut session = advisory();
        session.set_input("maize");
        assert_eq!(session.revision(), 0);

        session.submit();
        assert_eq!(session.revision(), 1);
        session.resolve(Ok("ok".to_string()));
        assert_eq!(session.revision(), 2);
    }
}

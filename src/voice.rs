//! Speech-to-text behind a small start/stop/transcript surface. The
//! recognizer itself is a platform capability supplied from outside.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    #[error("Speech recognition isn't supported on this device.")]
    Unsupported,
}

/// A platform speech recognizer.
pub trait SpeechToText: Send {
    /// Begin continuous recognition in `locale`.
    fn start(&mut self, locale: &str) -> Result<(), VoiceError>;
    fn stop(&mut self);
    /// Everything heard since the last reset.
    fn transcript(&self) -> String;
    fn reset(&mut self);
}

/// Used when no recognizer is available.
#[derive(Debug, Default)]
pub struct Unsupported;

impl SpeechToText for Unsupported {
    fn start(&mut self, _locale: &str) -> Result<(), VoiceError> {
        Err(VoiceError::Unsupported)
    }

    fn stop(&mut self) {}

    fn transcript(&self) -> String {
        String::new()
    }

    fn reset(&mut self) {}
}

pub struct VoiceCapture {
    engine: Box<dyn SpeechToText>,
    locale: String,
    listening: bool,
}

impl std::fmt::Debug for VoiceCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceCapture")
            .field("locale", &self.locale)
            .field("listening", &self.listening)
            .finish()
    }
}

impl VoiceCapture {
    pub fn new(engine: Box<dyn SpeechToText>, locale: impl Into<String>) -> Self {
        VoiceCapture {
            engine,
            locale: locale.into(),
            listening: false,
        }
    }

    pub fn listening(&self) -> bool {
        self.listening
    }

    pub fn start(&mut self) -> Result<(), VoiceError> {
        if self.listening {
            return Ok(());
        }
        self.engine.start(&self.locale)?;
        tracing::debug!(locale = %self.locale, "listening");
        self.listening = true;
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.listening {
            self.engine.stop();
            self.listening = false;
        }
    }

    pub fn toggle(&mut self) -> Result<(), VoiceError> {
        if self.listening {
            self.stop();
            Ok(())
        } else {
            self.start()
        }
    }

    pub fn transcript(&self) -> String {
        self.engine.transcript()
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Pn,
    Mr,
    Te,
    Kn,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::En,
        Language::Hi,
        Language::Pn,
        Language::Mr,
        Language::Te,
        Language::Kn,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Pn => "pn",
            Language::Mr => "mr",
            Language::Te => "te",
            Language::Kn => "kn",
        }
    }

    /// Label shown in the language picker, in the language itself.
    pub fn label(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "हिंदी",
            Language::Pn => "ਪੰਜਾਬੀ",
            Language::Mr => "मराठी",
            Language::Te => "తెలుగు",
            Language::Kn => "ಕನ್ನಡ",
        }
    }

    /// English name sent to the advisory backend.
    pub fn english_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
            Language::Pn => "Punjabi",
            Language::Mr => "Marathi",
            Language::Te => "Telugu",
            Language::Kn => "Kannada",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Language,
    HeroHeading,
    HeroParagraph,
    HeroButton,
    GeneralQueryGreeting,
    DiseaseDetectorGreeting,
    CropRecommenderGreeting,
    SchemeAdvisorGreeting,
}

/// Translated string for `key`, falling back to English when a language has
/// no entry.
pub fn t(language: Language, key: Key) -> &'static str {
    match language {
        Language::Hi => hindi(key).unwrap_or_else(|| english(key)),
        _ => english(key),
    }
}

fn english(key: Key) -> &'static str {
    match key {
        Key::Language => "Language",
        Key::HeroHeading => "Your farming companion, in your language",
        Key::HeroParagraph => {
            "Ask about your crops, check a sick plant from a photo, explore government \
             schemes and let an agent find buyers for your harvest."
        }
        Key::HeroButton => "Try the assistant",
        Key::GeneralQueryGreeting => {
            "Namaste! I am your farming assistant.\n\
             Type the name of your crop to get an advisory for your location.\n\
             You can also use the microphone to speak."
        }
        Key::DiseaseDetectorGreeting => {
            "Hello! I can help identify plant diseases.\n\
             **Step 1:** Drop a clear photo of the affected leaf or plant on the window, \
             or type its path and press Attach.\n\
             **Step 2:** Optionally describe the symptoms you see.\n\
             **Step 3:** Press Send.\n\
             Good lighting and a close-up give the best results.\n\
             Supported formats: JPEG, PNG, WebP.\n\
             Your photo is only used for this analysis."
        }
        Key::CropRecommenderGreeting => {
            "Welcome! Describe your soil, climate and location to get a crop recommendation."
        }
        Key::SchemeAdvisorGreeting => {
            "Ask me about financial aid, subsidies, or any government scheme for farmers."
        }
    }
}

fn hindi(key: Key) -> Option<&'static str> {
    let text = match key {
        Key::Language => "भाषा",
        Key::HeroHeading => "आपकी भाषा में, आपका खेती साथी",
        Key::HeroParagraph => {
            "अपनी फसलों के बारे में पूछें, फोटो से बीमार पौधे की जाँच करें, सरकारी योजनाएँ देखें \
             और एजेंट को अपनी उपज के खरीदार खोजने दें।"
        }
        Key::HeroButton => "सहायक आज़माएँ",
        Key::GeneralQueryGreeting => {
            "नमस्ते! मैं आपका खेती सहायक हूँ।\n\
             अपने स्थान के लिए सलाह पाने हेतु अपनी फसल का नाम लिखें।\n\
             आप माइक्रोफोन से बोल भी सकते हैं।"
        }
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_english() {
        assert_eq!(t(Language::Te, Key::HeroButton), "Try the assistant");
        assert_eq!(
            t(Language::Hi, Key::SchemeAdvisorGreeting),
            t(Language::En, Key::SchemeAdvisorGreeting)
        );
        assert_eq!(t(Language::Hi, Key::Language), "भाषा");
    }

    #[test]
    fn serializes_as_language_code() {
        for language in Language::ALL {
            let encoded = serde_json::to_string(&language).unwrap();
            assert_eq!(encoded, format!("\"{}\"", language.code()));
        }
    }
}

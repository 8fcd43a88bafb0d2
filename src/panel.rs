use crate::i18n::{self, Key, Language};
use crate::sales::SalesAgent;
use crate::session::{Assistant, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelId {
    GeneralQuery,
    DiseaseDetector,
    CropRecommender,
    SchemeAdvisor,
    SalesAgent,
}

impl PanelId {
    pub const ALL: [PanelId; 5] = [
        PanelId::GeneralQuery,
        PanelId::DiseaseDetector,
        PanelId::CropRecommender,
        PanelId::SchemeAdvisor,
        PanelId::SalesAgent,
    ];

    /// Menu entry.
    pub fn label(self) -> &'static str {
        match self {
            PanelId::GeneralQuery => "General Query",
            PanelId::DiseaseDetector => "Detect Disease",
            PanelId::CropRecommender => "Crop Recommender",
            PanelId::SchemeAdvisor => "Scheme Advisor",
            PanelId::SalesAgent => "Sales Agent",
        }
    }

    /// Heading of the mounted panel.
    pub fn title(self) -> &'static str {
        match self {
            PanelId::GeneralQuery => "General Advice",
            PanelId::DiseaseDetector => "Disease Detector",
            PanelId::CropRecommender => "Crop Recommender",
            PanelId::SchemeAdvisor => "Govt. Scheme Advisor",
            PanelId::SalesAgent => "Proactive Sales Agent",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            PanelId::GeneralQuery => "Type your crop name...",
            PanelId::DiseaseDetector => "Type symptoms here...",
            PanelId::CropRecommender => "e.g., Black soil, 28°C, low rainfall...",
            PanelId::SchemeAdvisor => "e.g., PM-KISAN eligibility",
            PanelId::SalesAgent => "",
        }
    }

    pub fn loading_text(self) -> &'static str {
        match self {
            PanelId::DiseaseDetector => "Assistant is analyzing...",
            _ => "Assistant is typing...",
        }
    }
}

/// A mounted panel and the state it owns.
#[derive(Debug)]
pub enum Panel {
    Chat(Session),
    Sales(SalesAgent),
}

impl Panel {
    pub fn mount(id: PanelId, language: Language) -> Self {
        let chat = |assistant, key| Panel::Chat(Session::new(assistant, i18n::t(language, key)));
        match id {
            PanelId::GeneralQuery => chat(Assistant::Advisory, Key::GeneralQueryGreeting),
            PanelId::DiseaseDetector => chat(Assistant::DiseaseDetection, Key::DiseaseDetectorGreeting),
            PanelId::CropRecommender => chat(Assistant::Advisory, Key::CropRecommenderGreeting),
            PanelId::SchemeAdvisor => chat(Assistant::Finance, Key::SchemeAdvisorGreeting),
            PanelId::SalesAgent => Panel::Sales(SalesAgent::new()),
        }
    }

    /// Changes whenever the panel's visible log changes.
    pub fn revision(&self) -> u64 {
        match self {
            Panel::Chat(session) => session.revision(),
            Panel::Sales(agent) => agent.revision(),
        }
    }
}

/// Which panel is mounted. Every selection mounts a fresh panel, and the
/// generation lets late responses for an unmounted panel be recognised.
#[derive(Debug)]
pub struct Switcher {
    selected: PanelId,
    panel: Panel,
    generation: u64,
}

impl Switcher {
    pub fn new(language: Language) -> Self {
        Switcher {
            selected: PanelId::GeneralQuery,
            panel: Panel::mount(PanelId::GeneralQuery, language),
            generation: 0,
        }
    }

    pub fn selected(&self) -> PanelId {
        self.selected
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut Panel {
        &mut self.panel
    }

    pub fn select(&mut self, id: PanelId, language: Language) {
        tracing::debug!(from = ?self.selected, to = ?id, "switching panel");
        self.selected = id;
        self.panel = Panel::mount(id, language);
        self.generation += 1;
    }

    /// The panel, but only if it is still the mount that `generation` names.
    pub fn current(&mut self, generation: u64) -> Option<&mut Panel> {
        if generation == self.generation {
            Some(&mut self.panel)
        } else {
            tracing::debug!(generation, current = self.generation, "dropping response for unmounted panel");
            None
        }
    }
}

mod agent_log;
mod attachment;
mod client;
mod config;
mod error;
mod i18n;
mod location;
mod markup;
mod panel;
mod sales;
mod session;
mod ui;
mod voice;

use anyhow::Context;
use iced::{
    event::{self, Event as IcedEvent},
    task,
    widget::{column, scrollable},
    window, Element, Size, Subscription, Task, Theme,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::attachment::Attachment;
use crate::client::{AdvisoryClient, FinanceClient, LocationData};
use crate::i18n::Language;
use crate::location::{Coordinates, Location, LocationProvider};
use crate::panel::{Panel, PanelId, Switcher};
use crate::sales::Field;
use crate::session::{Assistant, ChatMessage, Request, Sender};
use crate::voice::VoiceCapture;

fn setup_logging() {
    let level = if std::env::var("KRISHISETU_DEBUG").is_ok() {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    setup_logging();

    let config = config::Config::load();

    let services = Services {
        advisory: AdvisoryClient::new(config.backend.base_url.as_deref())
            .context("building the advisory client")?,
        finance: FinanceClient::new(config.backend.finance_url.as_deref())
            .context("building the finance client")?,
        locator: LocationProvider::new(&config.location).context("building the location provider")?,
    };

    let window_settings = window::Settings {
        size: Size::new(config.window.width as f32, config.window.height as f32),
        min_size: Some(Size::new(
            config.window.min_width as f32,
            config.window.min_height as f32,
        )),
        position: window::Position::Centered,
        ..Default::default()
    };

    iced::application("KrishiSetu", App::update, App::view)
        .theme(App::theme)
        .subscription(App::subscription)
        .window(window_settings)
        .run_with(move || App::new(config, services))?;

    Ok(())
}

/// Clients built once at startup and handed to the application.
struct Services {
    advisory: AdvisoryClient,
    finance: FinanceClient,
    locator: LocationProvider,
}

#[derive(Debug, Clone)]
pub enum Message {
    LanguageSelected(Language),
    Start,
    PanelSelected(PanelId),
    InputChanged(String),
    Submit,
    AttachPathChanged(String),
    AttachPath,
    FileDropped(PathBuf),
    ToggleVoice,
    VoiceTick,
    Located(Result<Coordinates, String>),
    Replied {
        generation: u64,
        outcome: Result<String, String>,
    },
    ProfileEdited(Field, String),
    ActivateAgent,
    AgentFinished {
        generation: u64,
        outcome: Result<String, String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Hero,
    Chat,
}

struct App {
    screen: Screen,
    language: Language,
    switcher: Switcher,
    location: Location,
    services: Services,
    voice: VoiceCapture,
    attach_path: String,
    messages_id: scrollable::Id,
    /// Aborts the mounted panel's request when replaced or dropped.
    in_flight: Option<task::Handle>,
}

impl App {
    fn new(config: config::Config, services: Services) -> (Self, Task<Message>) {
        let language = config.ui.language;
        let app = App {
            screen: Screen::Hero,
            language,
            switcher: Switcher::new(language),
            location: Location::default(),
            services,
            voice: VoiceCapture::new(Box::new(voice::Unsupported), config.voice.locale),
            attach_path: String::new(),
            messages_id: scrollable::Id::unique(),
            in_flight: None,
        };

        (app, Task::none())
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        let before = (self.switcher.generation(), self.switcher.panel().revision());
        let task = self.handle(message);
        let after = (self.switcher.generation(), self.switcher.panel().revision());

        if self.screen == Screen::Chat && before != after {
            Task::batch([
                task,
                scrollable::snap_to(self.messages_id.clone(), scrollable::RelativeOffset::END),
            ])
        } else {
            task
        }
    }

    fn handle(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::LanguageSelected(language) => {
                tracing::info!(language = language.code(), "language changed");
                self.language = language;
                Task::none()
            }
            Message::Start => {
                self.screen = Screen::Chat;
                self.locate()
            }
            Message::PanelSelected(id) => {
                self.in_flight = None;
                self.voice.stop();
                self.voice.reset();
                self.attach_path.clear();
                self.switcher.select(id, self.language);
                match id {
                    PanelId::GeneralQuery | PanelId::CropRecommender | PanelId::SchemeAdvisor => {
                        self.locate()
                    }
                    PanelId::DiseaseDetector | PanelId::SalesAgent => Task::none(),
                }
            }
            Message::InputChanged(value) => {
                if let Panel::Chat(session) = self.switcher.panel_mut() {
                    session.set_input(value);
                }
                Task::none()
            }
            Message::Submit => {
                let Panel::Chat(session) = self.switcher.panel_mut() else {
                    return Task::none();
                };
                let Some(request) = session.submit() else {
                    return Task::none();
                };
                self.voice.reset();
                self.dispatch(request)
            }
            Message::AttachPathChanged(value) => {
                self.attach_path = value;
                Task::none()
            }
            Message::AttachPath => {
                let path = PathBuf::from(self.attach_path.trim());
                if self.attach(path) {
                    self.attach_path.clear();
                }
                Task::none()
            }
            Message::FileDropped(path) => {
                self.attach(path);
                Task::none()
            }
            Message::ToggleVoice => {
                if let Err(e) = self.voice.toggle() {
                    tracing::warn!(error = %e, "voice capture unavailable");
                    if let Panel::Chat(session) = self.switcher.panel_mut() {
                        session.push(ChatMessage::new(Sender::System, e.to_string()));
                    }
                }
                Task::none()
            }
            Message::VoiceTick => {
                let transcript = self.voice.transcript();
                if let Panel::Chat(session) = self.switcher.panel_mut() {
                    if !transcript.is_empty() && transcript != session.input() {
                        session.set_input(transcript);
                    }
                }
                Task::none()
            }
            Message::Located(Ok(coordinates)) => {
                self.location.update(coordinates, Instant::now());
                Task::none()
            }
            Message::Located(Err(e)) => {
                tracing::warn!(error = %e, "could not determine location");
                Task::none()
            }
            Message::Replied {
                generation,
                outcome,
            } => {
                if let Some(Panel::Chat(session)) = self.switcher.current(generation) {
                    session.resolve(outcome);
                    self.in_flight = None;
                }
                Task::none()
            }
            Message::ProfileEdited(field, value) => {
                if let Panel::Sales(agent) = self.switcher.panel_mut() {
                    agent.edit(field, value);
                }
                Task::none()
            }
            Message::ActivateAgent => {
                let Panel::Sales(agent) = self.switcher.panel_mut() else {
                    return Task::none();
                };
                let Some(profile) = agent.activate() else {
                    return Task::none();
                };

                tracing::info!(commodity = %profile.commodity, "activating sales agent");
                let generation = self.switcher.generation();
                let client = self.services.advisory.clone();
                self.track(Task::perform(
                    async move {
                        client
                            .run_agent(&profile)
                            .await
                            .map(|run| run.agent_run_log)
                            .map_err(|e| e.to_string())
                    },
                    move |outcome| Message::AgentFinished {
                        generation,
                        outcome,
                    },
                ))
            }
            Message::AgentFinished {
                generation,
                outcome,
            } => {
                if let Some(Panel::Sales(agent)) = self.switcher.current(generation) {
                    agent.finish(outcome);
                    self.in_flight = None;
                }
                Task::none()
            }
        }
    }

    /// Runs `request` for the mounted panel; the reply is tagged with the
    /// mount generation so a late answer cannot reach a newer panel.
    fn dispatch(&mut self, request: Request) -> Task<Message> {
        let generation = self.switcher.generation();
        let reply = move |outcome| Message::Replied {
            generation,
            outcome,
        };

        let task = match request {
            Request::Advisory { crop } => {
                let coordinates = self.coordinates();
                let body = LocationData {
                    latitude: coordinates.latitude,
                    longitude: coordinates.longitude,
                    crop,
                    language: self.language.english_name().to_string(),
                };
                let client = self.services.advisory.clone();
                Task::perform(
                    async move {
                        client
                            .get_advisory(&body)
                            .await
                            .map(|advisory| advisory.advisory_report)
                            .map_err(|e| e.to_string())
                    },
                    reply,
                )
            }
            Request::Finance { goal } => {
                let coordinates = self.coordinates();
                let client = self.services.finance.clone();
                Task::perform(
                    async move {
                        client
                            .get_financial_advisory(&goal, coordinates.latitude, coordinates.longitude)
                            .await
                            .map_err(|e| e.to_string())
                    },
                    reply,
                )
            }
            Request::Disease {
                image,
                plant_name,
                context,
            } => {
                tracing::info!(file = %image.file_name, "requesting disease analysis");
                let client = self.services.advisory.clone();
                Task::perform(
                    async move {
                        client
                            .identify_disease(&image, &plant_name, &context)
                            .await
                            .map(|analysis| analysis.analysis)
                            .map_err(|e| e.to_string())
                    },
                    reply,
                )
            }
        };

        self.track(task)
    }

    fn track(&mut self, task: Task<Message>) -> Task<Message> {
        let (task, handle) = task.abortable();
        self.in_flight = Some(handle.abort_on_drop());
        task
    }

    fn coordinates(&self) -> Coordinates {
        if !self.location.is_resolved() {
            tracing::warn!("location not resolved yet, sending (0, 0)");
        }
        self.location.coordinates()
    }

    fn locate(&self) -> Task<Message> {
        if self
            .location
            .is_fresh(self.services.locator.max_age(), Instant::now())
        {
            return Task::none();
        }

        let locator = self.services.locator.clone();
        Task::perform(locator.locate(), |result| {
            Message::Located(result.map_err(|e| e.to_string()))
        })
    }

    /// Attaches `path` to the disease detector. Returns whether it was taken.
    fn attach(&mut self, path: PathBuf) -> bool {
        let Panel::Chat(session) = self.switcher.panel_mut() else {
            return false;
        };
        if session.assistant() != Assistant::DiseaseDetection || session.is_loading() {
            tracing::debug!(path = %path.display(), "ignoring attachment outside the disease detector");
            return false;
        }

        if !path.is_file() {
            session.push(ChatMessage::new(
                Sender::System,
                format!("No file found at {}.", path.display()),
            ));
            return false;
        }

        match Attachment::from_path(&path) {
            Some(image) => {
                tracing::info!(file = %image.file_name, mime = image.mime, "image attached");
                session.attach(image);
                true
            }
            None => {
                session.push(ChatMessage::new(
                    Sender::System,
                    format!("{} is not an image. Please choose a photo.", path.display()),
                ));
                false
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let transcript = if self.voice.listening() {
            iced::time::every(Duration::from_millis(250)).map(|_| Message::VoiceTick)
        } else {
            Subscription::none()
        };

        let drops = event::listen_with(|event, _status, _id| {
            if let IcedEvent::Window(window::Event::FileDropped(path)) = event {
                Some(Message::FileDropped(path))
            } else {
                None
            }
        });

        Subscription::batch([transcript, drops])
    }

    fn view(&self) -> Element<Message> {
        let body: Element<Message> = match self.screen {
            Screen::Hero => ui::hero(self.language),
            Screen::Chat => {
                let selected = self.switcher.selected();
                let panel = match self.switcher.panel() {
                    Panel::Chat(session) => ui::chat_panel(
                        selected,
                        session,
                        self.voice.listening(),
                        &self.attach_path,
                        self.messages_id.clone(),
                    ),
                    Panel::Sales(agent) => ui::sales_panel(agent, self.messages_id.clone()),
                };
                column![ui::menu(selected), panel]
                    .spacing(16)
                    .padding([0, 16])
                    .into()
            }
        };

        ui::root(self.language, body)
    }

    fn theme(&self) -> Theme {
        Theme::custom(
            "KrishiSetu".to_string(),
            iced::theme::Palette {
                primary: iced::Color::from_rgb8(0x4e, 0x7b, 0x28),
                ..iced::theme::Palette::LIGHT
            },
        )
    }
}

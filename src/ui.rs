//! Widgets for the header, hero screen, menu and panels.

use iced::widget::text::Span;
use iced::widget::{
    button, column, container, horizontal_space, pick_list, rich_text, row, scrollable, span, text,
    text_input, Column,
};
use iced::{alignment, font, Border, Color, Element, Font, Length, Shadow, Theme, Vector};

use crate::agent_log::Speaker;
use crate::i18n::{self, Key, Language};
use crate::markup;
use crate::panel::PanelId;
use crate::sales::{Field, SalesAgent};
use crate::session::{Assistant, Sender, Session};
use crate::Message;

type ButtonStyle = fn(&Theme, button::Status) -> button::Style;

fn bold() -> Font {
    Font {
        weight: font::Weight::Bold,
        ..Font::DEFAULT
    }
}

fn green() -> Color {
    Color::from_rgb8(0x4c, 0xaf, 0x50)
}

fn muted() -> Color {
    Color::from_rgb8(0x88, 0x88, 0x88)
}

fn card(theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Color::WHITE.into()),
        text_color: Some(theme.palette().text),
        border: Border {
            radius: 12.0.into(),
            ..Border::default()
        },
        shadow: Shadow {
            color: Color::from_rgba(0.0, 0.0, 0.0, 0.08),
            offset: Vector::new(0.0, 4.0),
            blur_radius: 12.0,
        },
        ..container::Style::default()
    }
}

pub fn root<'a>(language: Language, body: Element<'a, Message>) -> Element<'a, Message> {
    let page = column![header(language), body].spacing(16);

    container(page)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(|_theme: &Theme| container::Style {
            background: Some(Color::from_rgb8(0xf8, 0xfa, 0xfc).into()),
            ..container::Style::default()
        })
        .into()
}

fn header<'a>(language: Language) -> Element<'a, Message> {
    let logo = text("KrishiSetu").size(26).font(bold()).color(green());

    let picker = row![
        text(i18n::t(language, Key::Language)).size(14),
        pick_list(Language::ALL, Some(language), Message::LanguageSelected).text_size(14),
    ]
    .spacing(8)
    .align_y(alignment::Vertical::Center);

    container(
        row![logo, horizontal_space(), picker].align_y(alignment::Vertical::Center),
    )
    .padding([12, 16])
    .width(Length::Fill)
    .style(card)
    .into()
}

pub fn hero<'a>(language: Language) -> Element<'a, Message> {
    let content = column![
        text(i18n::t(language, Key::HeroHeading)).size(28).font(bold()),
        text(i18n::t(language, Key::HeroParagraph)).size(16),
        button(text(i18n::t(language, Key::HeroButton)).size(16).font(bold()))
            .padding([12, 20])
            .on_press(Message::Start),
    ]
    .spacing(16)
    .max_width(640)
    .align_x(alignment::Horizontal::Center);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(alignment::Horizontal::Center)
        .align_y(alignment::Vertical::Center)
        .into()
}

pub fn menu<'a>(selected: PanelId) -> Element<'a, Message> {
    let items = PanelId::ALL.into_iter().map(|id| {
        let style: ButtonStyle = if id == selected {
            button::primary
        } else {
            button::secondary
        };
        button(text(id.label()).size(15))
            .padding([8, 14])
            .style(style)
            .on_press(Message::PanelSelected(id))
            .into()
    });

    container(row(items).spacing(8))
        .padding(8)
        .width(Length::Fill)
        .align_x(alignment::Horizontal::Center)
        .style(card)
        .into()
}

/// One message, `**bold**` and newlines rendered.
fn bubble<'a>(sender: Sender, body: &str) -> Element<'a, Message> {
    let lines = markup::render(body).into_iter().map(|line| {
        let spans: Vec<Span<'a, Message, Font>> = line
            .into_iter()
            .map(|piece| {
                let fragment = span(piece.text);
                if piece.strong {
                    fragment.font(bold())
                } else {
                    fragment
                }
            })
            .collect();
        rich_text(spans).size(15).into()
    });

    let (background, foreground, side) = match sender {
        Sender::User => (green(), Color::WHITE, alignment::Horizontal::Right),
        Sender::Assistant => (
            Color::from_rgb8(0xf0, 0xf0, 0xf0),
            Color::from_rgb8(0x33, 0x33, 0x33),
            alignment::Horizontal::Left,
        ),
        Sender::System => (
            Color::from_rgb8(0xe8, 0xf5, 0xe9),
            Color::from_rgb8(0x2e, 0x7d, 0x32),
            alignment::Horizontal::Left,
        ),
    };

    let bubble = container(Column::with_children(lines).spacing(2))
        .padding([10, 14])
        .max_width(560)
        .style(move |_theme: &Theme| container::Style {
            background: Some(background.into()),
            text_color: Some(foreground),
            border: Border {
                radius: 18.0.into(),
                ..Border::default()
            },
            ..container::Style::default()
        });

    container(bubble).width(Length::Fill).align_x(side).into()
}

fn panel_title<'a>(title: &'a str) -> Element<'a, Message> {
    container(text(title).size(20).font(bold()).color(Color::from_rgb8(0x44, 0x44, 0x44)))
        .padding(16)
        .width(Length::Fill)
        .into()
}

pub fn chat_panel<'a>(
    id: PanelId,
    session: &'a Session,
    listening: bool,
    attach_path: &'a str,
    messages_id: scrollable::Id,
) -> Element<'a, Message> {
    let mut log = Column::with_children(
        session
            .messages()
            .iter()
            .map(|message| bubble(message.sender, &message.text)),
    )
    .spacing(12)
    .padding(16);

    if session.is_loading() {
        log = log.push(text(id.loading_text()).size(14).color(muted()));
    }

    let mut input = text_input(id.placeholder(), session.input()).padding(10).size(15);
    if !session.is_loading() {
        input = input
            .on_input(Message::InputChanged)
            .on_submit(Message::Submit);
    }

    let mic_style: ButtonStyle = if listening {
        button::danger
    } else {
        button::secondary
    };
    let mic = button(text(if listening { "Stop" } else { "Speak" }).size(14))
        .padding([10, 14])
        .style(mic_style)
        .on_press(Message::ToggleVoice);

    let send = button(text("Send").size(15))
        .padding([10, 18])
        .on_press_maybe((!session.is_loading()).then_some(Message::Submit));

    let mut content = column![
        panel_title(id.title()),
        scrollable(log).id(messages_id).height(Length::Fill),
    ];

    if session.assistant() == Assistant::DiseaseDetection {
        let status = match session.attachment() {
            Some(image) => format!("Attached: {}", image.file_name),
            None => "No image attached. Drop a photo on the window or enter its path.".to_string(),
        };
        let path = text_input("/path/to/leaf.jpg", attach_path)
            .on_input(Message::AttachPathChanged)
            .on_submit(Message::AttachPath)
            .padding(8)
            .size(14);
        let attach = button(text("Attach").size(14))
            .padding([8, 14])
            .style(button::secondary)
            .on_press(Message::AttachPath);

        content = content.push(
            column![
                text(status).size(13).color(muted()),
                row![path, attach].spacing(8),
            ]
            .spacing(6)
            .padding([0, 12]),
        );
    }

    content = content.push(
        row![input, mic, send]
            .spacing(8)
            .padding(12)
            .align_y(alignment::Vertical::Center),
    );

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(card)
        .into()
}

fn sender_of(speaker: Speaker) -> Sender {
    match speaker {
        Speaker::Agent => Sender::Assistant,
        Speaker::System => Sender::System,
    }
}

pub fn sales_panel<'a>(agent: &'a SalesAgent, messages_id: scrollable::Id) -> Element<'a, Message> {
    let running = agent.is_running();
    let profile = agent.profile();

    let status = container(text(if running { "Running" } else { "Idle" }).size(12))
        .padding([4, 12])
        .style(move |_theme: &Theme| container::Style {
            background: Some(
                if running {
                    Color::from_rgb8(0xff, 0x98, 0x00)
                } else {
                    Color::from_rgb8(0xf4, 0x43, 0x36)
                }
                .into(),
            ),
            text_color: Some(Color::WHITE),
            border: Border {
                radius: 12.0.into(),
                ..Border::default()
            },
            ..container::Style::default()
        });

    let labeled = |label: &'a str, value: &'a str, field: Field| {
        column![
            text(label).size(13).color(muted()),
            text_input(label, value)
                .on_input(move |value| Message::ProfileEdited(field, value))
                .padding(8)
                .size(15),
        ]
        .spacing(4)
    };

    let settings = column![
        text("Your Settings").size(18).font(bold()),
        labeled("Farmer name", &profile.name, Field::Name),
        labeled("Commodity", &profile.commodity, Field::Commodity),
        labeled("Grade", &profile.grade, Field::Grade),
        labeled("Minimum price (per quintal)", agent.price_input(), Field::MinimumPrice),
        labeled("Location", &profile.location, Field::Location),
        button(text(if running { "Searching..." } else { "Find Deals Now" }).size(15))
            .padding(12)
            .width(Length::Fill)
            .on_press_maybe((!running).then_some(Message::ActivateAgent)),
    ]
    .spacing(12)
    .padding(16)
    .width(Length::FillPortion(1));

    let mut log = Column::new().spacing(10).padding(16);
    if agent.turns().is_empty() && !running {
        log = log.push(
            text("Agent is idle. Click \"Find Deals Now\" to start.")
                .size(14)
                .color(muted()),
        );
    }
    for turn in agent.turns() {
        log = log.push(bubble(sender_of(turn.speaker), &turn.text));
    }
    if running {
        log = log.push(text("Agent is negotiating...").size(14).color(muted()));
    }

    let log_panel = column![
        text("Agent Log").size(18).font(bold()),
        scrollable(log).id(messages_id).height(Length::Fill),
    ]
    .spacing(8)
    .padding(16)
    .width(Length::FillPortion(2));

    let heading = row![
        panel_title(PanelId::SalesAgent.title()),
        container(status).padding(16),
    ]
    .align_y(alignment::Vertical::Center);

    container(column![heading, row![settings, log_panel].height(Length::Fill)])
        .width(Length::Fill)
        .height(Length::Fill)
        .style(card)
        .into()
}

//! Chat front end on top of the horoscope pipeline
//!
//! This module turns user interactions into replies without depending on any
//! particular chat network. A transport feeds it text messages (`/start`,
//! `/help`, `/horoscope`) and button presses carrying callback data such as
//! `zodiac:leo`, and renders the returned [`Reply`] values.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::data::{all_signs, Day, HoroscopeSource, SignInfo, TranslationBackend, ZodiacSign};
use crate::pipeline::HoroscopePipeline;

/// Prefix of callback data attached to sign buttons
pub const CALLBACK_PREFIX: &str = "zodiac:";

/// Number of sign buttons per keyboard row
pub const KEYBOARD_COLUMNS: usize = 3;

const WELCOME_MESSAGE: &str = "🌟 Добро пожаловать в Бот Гороскопов! 🌟\n\n\
    Я помогу узнать ваш ежедневный гороскоп.\n\n\
    Выберите ваш знак зодиака ниже:";

const HELP_MESSAGE: &str = "🔮 Бот Гороскопов - Справка\n\n\
    Доступные команды:\n\
    /start - Начать работу с ботом\n\
    /horoscope - Выбрать знак зодиака\n\
    /help - Показать эту справку\n\n\
    Просто выберите свой знак зодиака, и я расскажу вам ваш гороскоп на сегодня! ✨";

const CHOOSE_SIGN_MESSAGE: &str = "Выберите ваш знак зодиака:";

const UNKNOWN_COMMAND_MESSAGE: &str = "Неизвестная команда. Используйте /help";

const UNKNOWN_SIGN_MESSAGE: &str = "Ошибка: неизвестный знак зодиака";

const UNAVAILABLE_MESSAGE: &str = "😔 Извините, не удалось получить гороскоп.\n\
    Пожалуйста, попробуйте позже.";

const SEPARATOR: &str = "━━━━━━━━━━━━━━━";

/// An inline button shown under a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    /// Text on the button
    pub label: String,
    /// Data delivered back when the button is pressed
    pub callback_data: String,
}

/// Rows of inline buttons
pub type Keyboard = Vec<Vec<Button>>;

/// A message the transport should show to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    /// A plain text reply
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    /// A reply followed by the sign selection keyboard
    pub fn with_sign_keyboard(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(zodiac_keyboard()),
        }
    }
}

/// Commands the bot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Horoscope,
}

impl Command {
    /// Parses the command at the start of a message
    ///
    /// Accepts a `@botname` suffix and ignores trailing arguments.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        match name.to_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "horoscope" => Some(Command::Horoscope),
            _ => None,
        }
    }
}

/// What a transport should do with a button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// The callback data is not ours; show nothing
    Ignore,
    /// Show this reply and stop
    Reply(Reply),
    /// Show `loading`, then await [`HoroscopeBot::horoscope_reply`] for `sign`
    Fetch { sign: ZodiacSign, loading: Reply },
}

/// Builds the sign selection keyboard
///
/// One button per sign in catalog order, [`KEYBOARD_COLUMNS`] per row.
pub fn zodiac_keyboard() -> Keyboard {
    all_signs()
        .chunks(KEYBOARD_COLUMNS)
        .map(|row| row.iter().map(sign_button).collect())
        .collect()
}

fn sign_button(info: &SignInfo) -> Button {
    Button {
        label: format!("{} {}", info.glyph, info.display_name),
        callback_data: format!("{}{}", CALLBACK_PREFIX, info.id),
    }
}

/// Text shown while a horoscope is being fetched
pub fn loading_message(info: &SignInfo) -> String {
    format!("Получаю гороскоп для {} {}...", info.glyph, info.display_name)
}

/// Formats a horoscope for display
pub fn format_horoscope(info: &SignInfo, date: NaiveDate, horoscope: &str) -> String {
    format!(
        "{glyph} {name} {glyph}\n📅 {date}\n\n{horoscope}\n\n{SEPARATOR}\n🔮 Узнать гороскоп другого знака: /horoscope",
        glyph = info.glyph,
        name = info.display_name,
        date = date.format("%d.%m.%Y"),
    )
}

/// Chat bot serving horoscopes from a shared pipeline
pub struct HoroscopeBot<S, B> {
    pipeline: Arc<HoroscopePipeline<S, B>>,
}

impl<S, B> Clone for HoroscopeBot<S, B> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

impl<S, B> HoroscopeBot<S, B>
where
    S: HoroscopeSource,
    B: TranslationBackend,
{
    pub fn new(pipeline: Arc<HoroscopePipeline<S, B>>) -> Self {
        Self { pipeline }
    }

    /// The pipeline answering horoscope requests
    pub fn pipeline(&self) -> &Arc<HoroscopePipeline<S, B>> {
        &self.pipeline
    }

    /// Handles a text message from `user_id`
    pub fn handle_message(&self, user_id: i64, text: &str) -> Reply {
        match Command::parse(text) {
            Some(Command::Start) => {
                info!(user_id, "User started the bot");
                Reply::with_sign_keyboard(WELCOME_MESSAGE)
            }
            Some(Command::Help) => Reply::text(HELP_MESSAGE),
            Some(Command::Horoscope) => Reply::with_sign_keyboard(CHOOSE_SIGN_MESSAGE),
            None => Reply::text(UNKNOWN_COMMAND_MESSAGE),
        }
    }

    /// Decides how to answer a button press carrying `data`
    ///
    /// Unknown signs are rejected here, before anything is fetched.
    pub fn handle_callback(&self, user_id: i64, data: &str) -> CallbackAction {
        let Some(sign_id) = data.strip_prefix(CALLBACK_PREFIX) else {
            warn!(user_id, data, "Invalid callback data");
            return CallbackAction::Ignore;
        };

        info!(user_id, sign = sign_id, "User requested horoscope");

        match sign_id.parse::<ZodiacSign>() {
            Ok(sign) => CallbackAction::Fetch {
                sign,
                loading: Reply::text(loading_message(sign.info())),
            },
            Err(_) => CallbackAction::Reply(Reply::text(UNKNOWN_SIGN_MESSAGE)),
        }
    }

    /// Fetches today's horoscope for `sign` and renders it
    ///
    /// On failure the user gets a retry prompt with the sign keyboard.
    pub async fn horoscope_reply(&self, sign: ZodiacSign) -> Reply {
        match self.pipeline.get_horoscope(sign, Day::Today).await {
            Some(horoscope) => {
                let today = Local::now().date_naive();
                Reply::text(format_horoscope(sign.info(), today, &horoscope))
            }
            None => Reply::with_sign_keyboard(UNAVAILABLE_MESSAGE),
        }
    }
}

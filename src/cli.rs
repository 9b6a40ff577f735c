//! Command-line interface for horobot
//!
//! This module handles parsing of CLI arguments using clap and the plain-text
//! rendering used by the console chat transport.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::bot::Reply;
use crate::data::{all_signs, Day, ParseDayError};

/// horobot - Translated daily horoscopes
#[derive(Parser, Debug)]
#[command(name = "horobot")]
#[command(about = "Translated daily horoscopes for the twelve zodiac signs")]
#[command(version)]
pub struct Cli {
    /// Read settings from this env file instead of ./.env
    #[arg(long, value_name = "PATH", global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the translated horoscope for a sign
    ///
    /// Examples:
    ///   horobot get leo
    ///   horobot get pisces --day tomorrow
    Get {
        /// Zodiac sign id (aries, taurus, ..., pisces)
        sign: String,

        /// Which day: today, yesterday or tomorrow
        #[arg(long, default_value = "today", value_parser = parse_day_arg)]
        day: Day,
    },

    /// List the zodiac signs
    Signs,

    /// Talk to the bot over stdin/stdout
    ///
    /// Each line is either a command (/start, /help, /horoscope) or a button
    /// press: callback data such as "zodiac:leo", or just a sign id.
    Chat {
        /// Fetch today's horoscopes for all signs before the session starts
        #[arg(long)]
        prefetch: bool,
    },
}

/// Parses a day argument into a Day.
///
/// # Arguments
/// * `s` - The day string from CLI
///
/// # Returns
/// * `Ok(Day)` if the string is today, yesterday or tomorrow (any case)
/// * `Err(ParseDayError)` otherwise
pub fn parse_day_arg(s: &str) -> Result<Day, ParseDayError> {
    s.parse()
}

/// Renders the sign catalog, one sign per line
pub fn format_sign_list() -> String {
    all_signs()
        .iter()
        .map(|info| {
            format!(
                "{} {:<12} {} ({})\n",
                info.glyph, info.id, info.display_name, info.date_range
            )
        })
        .collect()
}

/// Renders a bot reply for a terminal
///
/// Keyboard buttons are listed below the text with the input that presses them.
pub fn render_reply(reply: &Reply) -> String {
    let mut out = reply.text.clone();
    if let Some(keyboard) = &reply.keyboard {
        out.push('\n');
        for row in keyboard {
            let buttons: Vec<String> = row
                .iter()
                .map(|button| format!("[{} → {}]", button.label, button.callback_data))
                .collect();
            out.push('\n');
            out.push_str(&buttons.join(" "));
        }
    }
    out
}

/// One line of console input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    /// Blank line
    Empty,
    /// Leave the chat
    Quit,
    /// A text message such as "/start"
    Message(String),
    /// Callback data of a pressed button
    Callback(String),
}

/// Classifies a line typed into the console chat
///
/// A bare word without a colon is taken as a sign id and turned into the
/// callback data of that sign's button.
pub fn parse_chat_input(line: &str) -> ChatInput {
    let line = line.trim();
    match line {
        "" => ChatInput::Empty,
        "quit" | "exit" | "/quit" => ChatInput::Quit,
        _ if line.starts_with('/') => ChatInput::Message(line.to_string()),
        _ if line.contains(':') => ChatInput::Callback(line.to_string()),
        _ => ChatInput::Callback(format!("{}{}", crate::bot::CALLBACK_PREFIX, line)),
    }
}

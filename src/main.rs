//! horobot - Translated daily horoscopes
//!
//! Fetches daily horoscopes for the twelve zodiac signs, translates them and
//! caches the result. Runs single commands or a console chat session.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use horobot::bot::{CallbackAction, HoroscopeBot};
use horobot::cache::{HoroscopeCache, SweepHandle};
use horobot::cli::{format_sign_list, parse_chat_input, render_reply, ChatInput, Cli, Commands};
use horobot::config::{Config, DEFAULT_LOG_LEVEL};
use horobot::data::{
    Day, GoogleTranslator, HoroscopeClient, HoroscopeSource, TranslationBackend, Translator,
};
use horobot::HoroscopePipeline;

/// User id reported for the console chat
const CONSOLE_USER_ID: i64 = 0;

/// Initializes tracing from the configured log level
///
/// Logs go to stderr so stdout carries only horoscopes.
fn init_tracing(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the console chat transport until stdin closes or the user quits
async fn run_chat<S, B>(bot: HoroscopeBot<S, B>) -> std::io::Result<()>
where
    S: HoroscopeSource,
    B: TranslationBackend,
{
    println!("{}", render_reply(&bot.handle_message(CONSOLE_USER_ID, "/start")));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_chat_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Quit => break,
            ChatInput::Message(text) => {
                println!("{}", render_reply(&bot.handle_message(CONSOLE_USER_ID, &text)));
            }
            ChatInput::Callback(data) => match bot.handle_callback(CONSOLE_USER_ID, &data) {
                CallbackAction::Ignore => {}
                CallbackAction::Reply(reply) => println!("{}", render_reply(&reply)),
                CallbackAction::Fetch { sign, loading } => {
                    println!("{}", render_reply(&loading));
                    println!("{}", render_reply(&bot.horoscope_reply(sign).await));
                }
            },
        }
        println!();
    }

    Ok(())
}

/// Builds the pipeline the commands share from the loaded configuration
fn build_pipeline(
    config: &Config,
) -> Result<Arc<HoroscopePipeline<HoroscopeClient, GoogleTranslator>>, Box<dyn std::error::Error>> {
    let cache = Arc::new(HoroscopeCache::with_ttl_seconds(config.cache_ttl_seconds));
    let source = HoroscopeClient::new(config.horoscope_api_url.as_str(), config.fetch_timeout)?;
    let translator = Translator::new(
        GoogleTranslator::new(config.translate_api_url.as_str()),
        config.target_language.as_str(),
    )
    .with_timeout(config.translate_timeout);
    Ok(Arc::new(HoroscopePipeline::new(cache, source, translator)))
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = match &cli.env_file {
        Some(path) => Config::from_env_file(path),
        None => Config::from_env(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    init_tracing(&config.log_level);

    match cli.command {
        Commands::Signs => print!("{}", format_sign_list()),
        Commands::Get { sign, day } => {
            let pipeline = build_pipeline(&config)?;
            match pipeline.get_horoscope_by_id(&sign, day).await {
                Ok(horoscope) => println!("{}", horoscope),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Chat { prefetch } => {
            let pipeline = build_pipeline(&config)?;
            info!(
                ttl_seconds = config.cache_ttl_seconds,
                api = %config.horoscope_api_url,
                language = %config.target_language,
                "Starting console chat"
            );
            if prefetch {
                pipeline.prefetch_all(Day::Today).await;
            }
            let sweeper = SweepHandle::spawn(Arc::clone(pipeline.cache()), config.sweep_config());
            run_chat(HoroscopeBot::new(pipeline)).await?;
            sweeper.shutdown().await;
        }
    }

    Ok(ExitCode::SUCCESS)
}

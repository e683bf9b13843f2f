//! Chanakya: Discord bots that forward slash-command prompts to locally hosted models and
//! relay the answers back into the channel.

use std::sync::Arc;

pub mod bot;
pub mod commands;
pub mod config;
pub mod delivery;
pub mod error;
pub mod runtime;
pub mod segment;
pub mod utils;

use config::Config;
use runtime::{ImageRuntime, ModelRuntime};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// User data, which is stored and accessible in all command invocations.
///
/// Built once at startup; the runtimes are shared by every concurrent invocation.
pub struct Data {
    pub config: Config,
    pub model: Arc<dyn ModelRuntime>,
    /// `None` for the chat-only bot.
    pub images: Option<Arc<dyn ImageRuntime>>,
}

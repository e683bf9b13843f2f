//! This module aggregates all the command modules for the bot.

/// Commands that forward prompts to local AI models.
pub mod ai;
/// General purpose commands (e.g., help).
pub mod general;

use crate::{CommandResult, Context};

/// Show what the bot can do
#[poise::command(slash_command, category = "General")]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            extra_text_at_bottom: "Prompts are answered by models running on the bot's own machine.",
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

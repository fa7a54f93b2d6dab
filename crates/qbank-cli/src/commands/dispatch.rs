use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Question { action } => commands::question::handle(&action, ctx, flags).await,
        Commands::Variant { action } => commands::variant::handle(&action, ctx, flags).await,
    }
}

pub mod ask;
pub mod chat;
pub mod history;
pub mod inspect;
pub mod schema;

use crate::cli::{Commands, GlobalFlags};
use crate::context::AppContext;

/// Route a parsed command to its handler.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Ask(args) => ask::handle(&args, ctx, flags).await,
        Commands::Inspect(args) => inspect::handle(&args, ctx, flags).await,
        Commands::Chat => chat::handle(ctx, flags).await,
        Commands::Schema => schema::handle(flags),
    }
}

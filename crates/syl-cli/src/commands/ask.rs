use crate::cli::{GlobalFlags, QueryArgs};
use crate::commands::history::load_history;
use crate::context::AppContext;
use crate::output::output;

/// Handle `syl ask`.
pub async fn handle(args: &QueryArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let history = load_history(args.history.as_deref())?;
    let response = ctx
        .pipeline
        .answer(&args.query, &history, &ctx.namespace)
        .await?;
    output(&response, flags.format)
}

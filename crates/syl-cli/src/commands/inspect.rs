use crate::cli::{GlobalFlags, QueryArgs};
use crate::commands::history::load_history;
use crate::context::AppContext;
use crate::output::output;

/// Handle `syl inspect`.
pub async fn handle(args: &QueryArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let history = load_history(args.history.as_deref())?;
    let inspection = ctx
        .pipeline
        .inspect(&args.query, &history, &ctx.namespace)
        .await?;
    output(&inspection, flags.format)
}

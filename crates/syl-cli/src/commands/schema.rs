use schemars::schema_for;
use syl_core::responses::ChatResponse;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Handle `syl schema`.
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = serde_json::to_value(schema_for!(ChatResponse))?;
    output(&schema, flags.format)
}

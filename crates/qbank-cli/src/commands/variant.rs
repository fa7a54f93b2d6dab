use qbank_core::enums::VariantKind;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::VariantCommands;
use crate::commands::shared::parse::{parse_enum, parse_id, parse_variant_input};
use crate::context::AppContext;
use crate::output::output;

/// Handle `qbank variant`.
pub async fn handle(
    action: &VariantCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        VariantCommands::Add { question_id, json } => {
            let input = parse_variant_input(json)?;
            let change = ctx.service.add_variant(parse_id(question_id)?, input).await?;
            output(
                &json!({ "row": change.row, "question": change.detail, "sync": change.report }),
                flags.format,
            )
        }
        VariantCommands::Update { kind, id, json } => {
            let kind = parse_enum::<VariantKind>(kind, "kind")?;
            let input = parse_variant_input(json)?;
            let change = ctx
                .service
                .update_variant(kind, parse_id(id)?, input)
                .await?;
            output(
                &json!({ "row": change.row, "question": change.detail, "sync": change.report }),
                flags.format,
            )
        }
        VariantCommands::Delete { kind, id } => {
            let kind = parse_enum::<VariantKind>(kind, "kind")?;
            let change = ctx.service.delete_variant(kind, parse_id(id)?).await?;
            output(
                &json!({ "deleted": change.row, "question": change.detail, "sync": change.report }),
                flags.format,
            )
        }
        VariantCommands::Get { kind, id } => {
            let kind = parse_enum::<VariantKind>(kind, "kind")?;
            let row = ctx.service.get_variant(kind, parse_id(id)?).await?;
            output(&row, flags.format)
        }
        VariantCommands::List { question_id, kind } => {
            let kind = parse_enum::<VariantKind>(kind, "kind")?;
            let rows = ctx
                .service
                .list_variants(parse_id(question_id)?, kind)
                .await?;
            output(&rows, flags.format)
        }
    }
}

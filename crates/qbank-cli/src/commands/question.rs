use qbank_core::enums::{CompletionStatus, QuestionType, Skill};
use qbank_core::inputs::NewQuestion;
use qbank_core::search::SearchFilter;
use qbank_db::updates::question::{QuestionUpdate, QuestionUpdateBuilder};
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::QuestionCommands;
use crate::commands::shared::parse::{parse_enum, parse_id, parse_known_version};
use crate::context::AppContext;
use crate::output::output;

/// Parent fields given to `question update`. An empty list leaves the field
/// unchanged unless its `--clear-*` flag is set.
struct UpdateFlags<'a> {
    instruction: Option<&'a str>,
    topic: &'a [String],
    clear_topic: bool,
    image_url: &'a [String],
    clear_image_urls: bool,
    max_time: Option<u32>,
}

impl UpdateFlags<'_> {
    fn into_update(self) -> QuestionUpdate {
        let mut builder = QuestionUpdateBuilder::new();
        if let Some(instruction) = self.instruction {
            builder = builder.instruction(instruction);
        }
        if self.clear_topic || !self.topic.is_empty() {
            builder = builder.topic(self.topic.to_vec());
        }
        if self.clear_image_urls || !self.image_url.is_empty() {
            builder = builder.image_urls(self.image_url.to_vec());
        }
        if let Some(max_time) = self.max_time {
            builder = builder.max_time(max_time);
        }
        builder.build()
    }
}

/// Handle `qbank question`.
pub async fn handle(
    action: &QuestionCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        QuestionCommands::Create {
            question_type,
            instruction,
            topic,
            image_url,
            max_time,
        } => {
            let input = NewQuestion {
                question_type: parse_enum::<QuestionType>(question_type, "type")?,
                topic: topic.clone(),
                instruction: instruction.clone(),
                image_urls: image_url.clone(),
                max_time: *max_time,
            };
            let created = ctx.service.create_question(input).await?;
            output(
                &json!({ "question": created.detail, "sync": created.report }),
                flags.format,
            )
        }
        QuestionCommands::Get { id } => {
            let detail = ctx.service.get_question(parse_id(id)?).await?;
            output(&detail, flags.format)
        }
        QuestionCommands::Update {
            id,
            instruction,
            topic,
            clear_topic,
            image_url,
            clear_image_urls,
            max_time,
        } => {
            let update = UpdateFlags {
                instruction: instruction.as_deref(),
                topic,
                clear_topic: *clear_topic,
                image_url,
                clear_image_urls: *clear_image_urls,
                max_time: *max_time,
            }
            .into_update();
            let updated = ctx
                .service
                .update_question(parse_id(id)?, &update)
                .await?;
            output(
                &json!({ "question": updated.detail, "sync": updated.report }),
                flags.format,
            )
        }
        QuestionCommands::Delete { id } => {
            let deletion = ctx.service.delete_question(parse_id(id)?).await?;
            output(
                &json!({ "deleted": deletion.question, "retract": deletion.report }),
                flags.format,
            )
        }
        QuestionCommands::List => {
            let limit = flags.limit.unwrap_or(ctx.config.search.default_page_size);
            let questions = ctx.service.list_questions(limit).await?;
            output(&questions, flags.format)
        }
        QuestionCommands::Search {
            text,
            question_type,
            skill,
            status,
            topic,
            page,
            page_size,
        } => {
            let filter = SearchFilter {
                text: text.clone(),
                question_type: question_type
                    .as_deref()
                    .map(|v| parse_enum::<QuestionType>(v, "type"))
                    .transpose()?,
                skill: skill
                    .as_deref()
                    .map(|v| parse_enum::<Skill>(v, "skill"))
                    .transpose()?,
                status: status
                    .as_deref()
                    .map(|v| parse_enum::<CompletionStatus>(v, "status"))
                    .transpose()?,
                topic: topic.clone(),
                page: *page,
                page_size: page_size.or(flags.limit),
            };
            let page = ctx.service.search(&filter).await?;
            output(&page, flags.format)
        }
        QuestionCommands::ChangedSince { pairs } => {
            let known = pairs
                .iter()
                .map(|p| parse_known_version(p))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let changed = ctx.service.get_changed_since(&known).await?;
            output(&changed, flags.format)
        }
        QuestionCommands::Reindex => {
            let report = ctx.service.reindex_all().await?;
            output(&report, flags.format)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn flags<'a>(topic: &'a [String], image_url: &'a [String]) -> UpdateFlags<'a> {
        UpdateFlags {
            instruction: None,
            topic,
            clear_topic: false,
            image_url,
            clear_image_urls: false,
            max_time: None,
        }
    }

    #[test]
    fn empty_lists_leave_fields_unchanged() {
        let update = flags(&[], &[]).into_update();
        assert!(update.is_empty());
    }

    #[test]
    fn clear_flags_set_empty_lists() {
        let update = UpdateFlags {
            clear_topic: true,
            clear_image_urls: true,
            ..flags(&[], &[])
        }
        .into_update();
        assert_eq!(update.topic, Some(Vec::new()));
        assert_eq!(update.image_urls, Some(Vec::new()));
    }

    #[test]
    fn given_topics_replace_the_list() {
        let topics = vec!["travel".to_string()];
        let update = flags(&topics, &[]).into_update();
        assert_eq!(update.topic, Some(topics));
        assert_eq!(update.image_urls, None);
    }
}

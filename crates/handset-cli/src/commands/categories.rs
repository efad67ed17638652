use anyhow::anyhow;
use handset_api_models::{Category, CategoryInput};
use handset_sync::{Mutation, ResourceEndpoints, Submission, ViewKind};

use crate::cli::{CategoryCommand, CategoryFields};
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::{list, load_record, mutate, non_blank, show};

const RESOURCE: &str = "category";

pub(crate) async fn handle(ctx: &AppContext, command: CategoryCommand) -> CliResult<()> {
    let endpoints = ResourceEndpoints::categories();
    match command {
        CategoryCommand::Ls(args) => {
            list::<Category>(ctx, endpoints, ViewKind::Active, &args).await
        }
        CategoryCommand::Deleted(args) => {
            list::<Category>(ctx, endpoints, ViewKind::Deleted, &args).await
        }
        CategoryCommand::Show(args) => show::<Category>(ctx, &endpoints, args.id).await,
        CategoryCommand::Create(fields) => {
            let input = create_input(fields)?;
            let submission = json_submission(&input)?;
            mutate::<Category>(ctx, endpoints, RESOURCE, Mutation::Create(submission)).await
        }
        CategoryCommand::Update(args) => {
            if args.fields.name.is_none() && args.fields.description.is_none() {
                return Err(CliError::validation(
                    "nothing to update (pass --name and/or --description)",
                ));
            }
            let existing: Category = load_record(ctx, &endpoints, args.id).await?;
            let input = merge_input(&existing, args.fields)?;
            let submission = json_submission(&input)?;
            mutate::<Category>(
                ctx,
                endpoints,
                RESOURCE,
                Mutation::Update {
                    id: args.id,
                    submission,
                },
            )
            .await
        }
        CategoryCommand::Delete(args) => {
            mutate::<Category>(ctx, endpoints, RESOURCE, Mutation::Delete { id: args.id }).await
        }
        CategoryCommand::Restore(args) => {
            mutate::<Category>(ctx, endpoints, RESOURCE, Mutation::Restore { id: args.id }).await
        }
    }
}

fn create_input(fields: CategoryFields) -> CliResult<CategoryInput> {
    let name = non_blank(fields.name).ok_or_else(|| CliError::validation("--name is required"))?;
    Ok(CategoryInput {
        name,
        description: non_blank(fields.description),
    })
}

/// Overlay the given flags on the stored record. An empty `--description`
/// clears the description.
fn merge_input(existing: &Category, fields: CategoryFields) -> CliResult<CategoryInput> {
    let name = fields
        .name
        .map_or_else(|| Some(existing.name.clone()), |name| non_blank(Some(name)))
        .ok_or_else(|| CliError::validation("--name must not be empty"))?;
    let description = fields
        .description
        .map_or_else(|| existing.description.clone(), |text| non_blank(Some(text)));
    Ok(CategoryInput { name, description })
}

fn json_submission(input: &CategoryInput) -> CliResult<Submission> {
    serde_json::to_value(input)
        .map(Submission::Json)
        .map_err(|err| CliError::failure(anyhow!("failed to encode category: {err}")))
}

use std::path::Path;

use anyhow::anyhow;
use handset_api_models::{EntityId, Phone, PhoneInput};
use handset_sync::{
    AttachmentSet, AttachmentSlot, DEFAULT_ASSET_MIME, FormSubmission, Mutation,
    ResourceEndpoints, Submission, ViewKind, find_category_id,
};

use crate::cli::{PhoneCommand, PhoneFields};
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::{list, load_record, mutate, non_blank, show};

const RESOURCE: &str = "phone";

pub(crate) async fn handle(ctx: &AppContext, command: PhoneCommand) -> CliResult<()> {
    let endpoints = ResourceEndpoints::phones();
    match command {
        PhoneCommand::Ls(args) => list::<Phone>(ctx, endpoints, ViewKind::Active, &args).await,
        PhoneCommand::Deleted(args) => {
            list::<Phone>(ctx, endpoints, ViewKind::Deleted, &args).await
        }
        PhoneCommand::Show(args) => show::<Phone>(ctx, &endpoints, args.id).await,
        PhoneCommand::Create(fields) => {
            let category_id = resolve_category(ctx, &fields, None).await?;
            let input = build_input(&Phone::default(), &fields, category_id)?;
            let attachments = AttachmentSet {
                avatar: fields.avatar.as_deref().map(slot_from_arg).transpose()?,
                gallery: gallery_slots(&fields.files)?,
            };
            let submission = form_submission(&input, attachments);
            mutate::<Phone>(ctx, endpoints, RESOURCE, Mutation::Create(submission)).await
        }
        PhoneCommand::Update(args) => {
            let existing: Phone = load_record(ctx, &endpoints, args.id).await?;
            let category_id = resolve_category(ctx, &args.fields, Some(&existing)).await?;
            let input = build_input(&existing, &args.fields, category_id)?;

            let stored_gallery = if args.replace_gallery {
                Vec::new()
            } else {
                existing.image_urls.clone()
            };
            let mut attachments =
                AttachmentSet::from_existing(existing.avatar_url.as_deref(), &stored_gallery);
            if let Some(avatar) = args.fields.avatar.as_deref() {
                attachments.avatar = Some(slot_from_arg(avatar)?);
            }
            attachments.gallery.extend(gallery_slots(&args.fields.files)?);

            let submission = form_submission(&input, attachments);
            mutate::<Phone>(
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
        PhoneCommand::Delete(args) => {
            mutate::<Phone>(ctx, endpoints, RESOURCE, Mutation::Delete { id: args.id }).await
        }
        PhoneCommand::Restore(args) => {
            mutate::<Phone>(ctx, endpoints, RESOURCE, Mutation::Restore { id: args.id }).await
        }
    }
}

fn form_submission(input: &PhoneInput, attachments: AttachmentSet) -> Submission {
    Submission::Form(FormSubmission {
        fields: input.form_fields(),
        attachments,
    })
}

/// Category id from `--category-id`, from `--category NAME`, or from the
/// stored record, in that order.
async fn resolve_category(
    ctx: &AppContext,
    fields: &PhoneFields,
    existing: Option<&Phone>,
) -> CliResult<EntityId> {
    if let Some(id) = fields.category_id {
        return Ok(id);
    }
    let name = match (non_blank(fields.category.clone()), existing) {
        (Some(name), _) => name,
        (None, Some(phone)) => {
            if let Some(id) = phone.category_id {
                return Ok(id);
            }
            phone.category_name.clone().ok_or_else(|| {
                CliError::validation("stored phone has no category; pass --category-id")
            })?
        }
        (None, None) => {
            return Err(CliError::validation(
                "--category-id or --category is required",
            ));
        }
    };

    find_category_id(ctx.transport.as_ref(), &name)
        .await
        .map_err(|err| CliError::failure(anyhow!("failed to look up category '{name}': {err}")))?
        .ok_or_else(|| CliError::validation(format!("no category named '{name}'")))
}

/// Overlay the flags on `base`; unset flags keep the stored value.
fn build_input(base: &Phone, fields: &PhoneFields, category_id: EntityId) -> CliResult<PhoneInput> {
    let text = |flag: &Option<String>, stored: &Option<String>| {
        flag.clone()
            .map_or_else(|| stored.clone(), |value| non_blank(Some(value)))
    };
    let name = non_blank(Some(
        fields.name.clone().unwrap_or_else(|| base.name.clone()),
    ))
    .ok_or_else(|| CliError::validation("--name is required"))?;

    let input = PhoneInput {
        name,
        category_id,
        model: text(&fields.model, &base.model),
        os: text(&fields.os, &base.os),
        color: text(&fields.color, &base.color),
        ram: fields.ram.or(base.ram).unwrap_or_default(),
        rom: fields.rom.or(base.rom).unwrap_or_default(),
        screen: text(&fields.screen, &base.screen),
        camera: text(&fields.camera, &base.camera),
        price_import: fields.price_import.or(base.price_import).unwrap_or_default(),
        price_sale: fields.price_sale.or(base.price_sale).unwrap_or_default(),
        quantity_in_stock: fields
            .quantity
            .or(base.quantity_in_stock)
            .unwrap_or_default(),
        description: text(&fields.description, &base.description),
        status: fields.listed.or(base.status).unwrap_or(true),
    };
    if input.price_import < 0.0 || input.price_sale < 0.0 {
        return Err(CliError::validation("prices must not be negative"));
    }
    Ok(input)
}

fn gallery_slots(values: &[String]) -> CliResult<Vec<AttachmentSlot>> {
    values.iter().map(|value| slot_from_arg(value)).collect()
}

/// `http(s)` URLs become stored-asset slots; anything else is read from disk.
fn slot_from_arg(value: &str) -> CliResult<AttachmentSlot> {
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        return Ok(AttachmentSlot::remote(value));
    }

    let path = Path::new(value);
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| CliError::validation(format!("'{value}' does not name a file")))?;
    let bytes = std::fs::read(path).map_err(|err| {
        CliError::failure(anyhow!("failed to read image '{}': {err}", path.display()))
    })?;
    let mime_type = mime_guess::from_path(path)
        .first()
        .map_or_else(|| DEFAULT_ASSET_MIME.to_string(), |mime| mime.to_string());
    Ok(AttachmentSlot::NewBinary {
        bytes,
        filename,
        mime_type,
    })
}

//! `PUT /pet` scenarios.

use serde_json::{json, Value};

use super::{expect, Scenario, ScenarioContext, ScenarioFuture, ScenarioGroup, OVERFLOW_ID};
use crate::errors::{PetstoreResult, PET_NOT_FOUND, VALIDATION_EXCEPTION};
use crate::services::WriteRequest;
use crate::types::{project_known_fields, Category, Pet, PetStatus, Tag};

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            ScenarioGroup::Update,
            "existing_pet_is_replaced",
            "replacing every field of an existing pet is echoed and readable",
            existing_pet_is_replaced,
        ),
        Scenario::new(
            ScenarioGroup::Update,
            "absent_pet_is_not_found",
            "updating an identity the store does not hold answers 404 \"Pet not found\"",
            absent_pet_is_not_found,
        ),
        Scenario::new(
            ScenarioGroup::Update,
            "empty_object_is_rejected",
            "an empty object answers 405 \"Validation exception\"",
            empty_object_is_rejected,
        ),
        Scenario::new(
            ScenarioGroup::Update,
            "invalid_nested_field_is_rejected",
            "a non-numeric tag id answers 405 \"Validation exception\"",
            invalid_nested_field_is_rejected,
        ),
        Scenario::new(
            ScenarioGroup::Update,
            "unexpected_fields_are_ignored",
            "fields outside the pet schema are accepted and ignored",
            unexpected_fields_are_ignored,
        ),
        Scenario::new(
            ScenarioGroup::Update,
            "overflowing_id_is_rejected",
            "an id past i64::MAX is rejected with a validation error",
            overflowing_id_is_rejected,
        ),
    ]
}

fn bulldog(id: i64) -> Pet {
    Pet::builder()
        .id(id)
        .category(Category::new(1, "Dog"))
        .name("Bulldog")
        .photo_url("url")
        .tag(Tag::new(1, "my_dog_tag"))
        .status(PetStatus::Sold)
        .build()
}

async fn put_and_confirm(ctx: &ScenarioContext, id: i64, body: &Value) -> PetstoreResult<()> {
    let expected = project_known_fields(body);

    let updated = ctx.pets().update_raw(WriteRequest::json(body)).await?;
    expect::status(&updated, 200)?;
    expect::json_content_type(&updated)?;
    expect::subset(&expect::json_body(&updated)?, &expected)?;

    let read = ctx.pets().get_raw(&id.to_string()).await?;
    expect::status(&read, 200)?;
    expect::subset(&expect::json_body(&read)?, &expected)
}

fn existing_pet_is_replaced(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let fixture = ctx.fresh_fixture(Pet::reference(0)).await?;
        let id = fixture.id.unwrap_or_default();

        put_and_confirm(ctx, id, &bulldog(id).to_value()).await
    })
}

fn absent_pet_is_not_found(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let id = ctx.fresh_id();
        ctx.ensure_absent(id).await?;

        let response = ctx
            .pets()
            .update_raw(WriteRequest::json(&Pet::reference(id).to_value()))
            .await?;
        expect::status(&response, 404)?;
        expect::message(&response, PET_NOT_FOUND)
    })
}

fn empty_object_is_rejected(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        ctx.fresh_fixture(Pet::reference(0)).await?;

        let response = ctx.pets().update_raw(WriteRequest::json(&json!({}))).await?;
        expect::status(&response, 405)?;
        expect::message(&response, VALIDATION_EXCEPTION)
    })
}

fn invalid_nested_field_is_rejected(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let fixture = ctx.fresh_fixture(Pet::reference(0)).await?;
        let mut body = fixture.to_value();
        body["tags"][0]["id"] = json!("ABC");

        let response = ctx.pets().update_raw(WriteRequest::json(&body)).await?;
        expect::status(&response, 405)?;
        expect::message(&response, VALIDATION_EXCEPTION)
    })
}

fn unexpected_fields_are_ignored(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let fixture = ctx.fresh_fixture(Pet::reference(0)).await?;
        let id = fixture.id.unwrap_or_default();
        let mut body = bulldog(id).to_value();
        body["test"] = json!("test");

        put_and_confirm(ctx, id, &body).await
    })
}

fn overflowing_id_is_rejected(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let body = format!(r#"{{"id":{OVERFLOW_ID},"name":"Pet","photoUrls":["url"]}}"#);

        let response = ctx.pets().update_raw(WriteRequest::raw(body)).await?;
        expect::status_in(&response, &[400, 405])
    })
}

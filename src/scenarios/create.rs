//! `POST /pet` scenarios.

use serde_json::{json, Value};

use super::{expect, track_if_created, Scenario, ScenarioContext, ScenarioFuture, ScenarioGroup};
use crate::errors::{INVALID_INPUT, PET_NOT_FOUND};
use crate::services::WriteRequest;
use crate::types::Pet;

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            ScenarioGroup::Create,
            "all_fields_round_trip",
            "a complete pet is echoed, readable, deletable, and then not found",
            all_fields_round_trip,
        ),
        Scenario::new(
            ScenarioGroup::Create,
            "empty_object_gets_server_id",
            "an empty object is accepted and given a numeric id",
            empty_object_gets_server_id,
        ),
        Scenario::new(
            ScenarioGroup::Create,
            "duplicate_id_is_rejected",
            "creating an id that already exists answers 405 \"Invalid input\"",
            duplicate_id_is_rejected,
        ),
        Scenario::new(
            ScenarioGroup::Create,
            "missing_body_is_rejected",
            "a create without a body is unsuccessful",
            missing_body_is_rejected,
        ),
        Scenario::new(
            ScenarioGroup::Create,
            "non_json_content_type_is_rejected",
            "a create declaring application/xml is unsuccessful",
            non_json_content_type_is_rejected,
        ),
        Scenario::new(
            ScenarioGroup::Create,
            "unexpected_fields_are_ignored",
            "fields outside the pet schema are accepted and ignored",
            unexpected_fields_are_ignored,
        ),
        Scenario::new(
            ScenarioGroup::Create,
            "negative_id_is_rejected",
            "a negative id answers 405 \"Invalid input\"",
            negative_id_is_rejected,
        ),
        Scenario::new(
            ScenarioGroup::Create,
            "overflowing_id_is_rejected",
            "an id past i64::MAX answers 405 \"Invalid input\"",
            overflowing_id_is_rejected,
        ),
        Scenario::new(
            ScenarioGroup::Create,
            "malformed_json_is_rejected",
            "a body that is not JSON is unsuccessful",
            malformed_json_is_rejected,
        ),
        Scenario::new(
            ScenarioGroup::Create,
            "id_in_path_is_rejected",
            "posting a JSON pet to /pet/{id} is unsuccessful",
            id_in_path_is_rejected,
        ),
    ]
}

fn all_fields_round_trip(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let id = ctx.fresh_id();
        ctx.ensure_absent(id).await?;
        let shape = Pet::reference(id).to_value();

        let created = ctx.pets().create_raw(WriteRequest::json(&shape)).await?;
        expect::status(&created, 200)?;
        expect::json_content_type(&created)?;
        expect::subset(&expect::json_body(&created)?, &shape)?;

        let read = ctx.pets().get_raw(&id.to_string()).await?;
        expect::status(&read, 200)?;
        expect::subset(&expect::json_body(&read)?, &shape)?;

        let deleted = ctx.pets().delete_raw(&id.to_string(), false).await?;
        expect::status_in(&deleted, &[200, 404])?;

        let gone = ctx.pets().get_raw(&id.to_string()).await?;
        expect::status(&gone, 404)?;
        expect::message(&gone, PET_NOT_FOUND)?;
        ctx.mark_absent(id);
        Ok(())
    })
}

fn empty_object_gets_server_id(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let created = ctx.pets().create_raw(WriteRequest::json(&json!({}))).await?;
        track_if_created(ctx, &created);
        expect::status(&created, 200)?;
        expect::integer_field(&expect::json_body(&created)?, "id")?;
        Ok(())
    })
}

fn duplicate_id_is_rejected(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let id = ctx.fresh_id();
        ctx.ensure_absent(id).await?;
        let shape = Pet::reference(id).to_value();

        let first = ctx.pets().create_raw(WriteRequest::json(&shape)).await?;
        expect::status(&first, 200)?;

        let second = ctx.pets().create_raw(WriteRequest::json(&shape)).await?;
        expect::status(&second, 405)?;
        expect::message(&second, INVALID_INPUT)
    })
}

fn missing_body_is_rejected(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let response = ctx.pets().create_raw(WriteRequest::empty()).await?;
        track_if_created(ctx, &response);
        expect::status_at_least(&response, 400)
    })
}

fn non_json_content_type_is_rejected(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let id = ctx.fresh_id();
        let request =
            WriteRequest::json(&Pet::reference(id).to_value()).content_type("application/xml");

        let response = ctx.pets().create_raw(request).await?;
        expect::status_at_least(&response, 400)
    })
}

fn unexpected_fields_are_ignored(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        ctx.create_and_capture(&json!({"test": "test"})).await?;
        Ok(())
    })
}

fn negative_id_is_rejected(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let mut shape = Pet::reference(0).to_value();
        shape["id"] = json!(-1);
        shape["name"] = json!("Pet1");

        let response = ctx.pets().create_raw(WriteRequest::json(&shape)).await?;
        track_if_created(ctx, &response);
        expect::status(&response, 405)?;
        expect::message(&response, INVALID_INPUT)
    })
}

fn overflowing_id_is_rejected(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let mut shape = Pet::reference(0).to_value();
        shape["id"] = Value::from(9_223_372_036_854_775_808_u64);

        let response = ctx.pets().create_raw(WriteRequest::json(&shape)).await?;
        track_if_created(ctx, &response);
        expect::status(&response, 405)?;
        expect::message(&response, INVALID_INPUT)
    })
}

fn malformed_json_is_rejected(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let response = ctx.pets().create_raw(WriteRequest::raw("{Invalid json}")).await?;
        expect::status_at_least(&response, 400)
    })
}

fn id_in_path_is_rejected(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let id = ctx.fresh_id();
        let request = WriteRequest::json(&Pet::reference(id).to_value()).path_segment(id.to_string());

        let response = ctx.pets().create_raw(request).await?;
        expect::status_at_least(&response, 400)
    })
}

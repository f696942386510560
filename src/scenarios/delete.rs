//! `DELETE /pet/{petId}` scenarios.

use super::{expect, Scenario, ScenarioContext, ScenarioFuture, ScenarioGroup, OVERFLOW_ID};
use crate::errors::PET_NOT_FOUND;
use crate::types::Pet;

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            ScenarioGroup::Delete,
            "with_api_key",
            "deleting an existing pet with an api_key answers 200 JSON, then reads as not found",
            with_api_key,
        ),
        Scenario::new(
            ScenarioGroup::Delete,
            "without_api_key",
            "the api_key header is optional",
            without_api_key,
        ),
        Scenario::new(
            ScenarioGroup::Delete,
            "absent_pet_is_not_found",
            "deleting an identity the store does not hold answers 404 \"Pet not found\"",
            absent_pet_is_not_found,
        ),
        Scenario::new(
            ScenarioGroup::Delete,
            "repeated_delete_is_tolerated",
            "deleting twice answers 200 or 404 both times",
            repeated_delete_is_tolerated,
        ),
        Scenario::new(
            ScenarioGroup::Delete,
            "overflowing_id_is_rejected",
            "deleting an id past i64::MAX answers 400",
            overflowing_id_is_rejected,
        ),
    ]
}

fn with_api_key(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let fixture = ctx.fresh_fixture(Pet::reference(0)).await?;
        let id = fixture.id.unwrap_or_default();

        let response = ctx.pets().delete_raw(&id.to_string(), true).await?;
        expect::status(&response, 200)?;
        expect::json_content_type(&response)?;

        let gone = ctx.pets().get_raw(&id.to_string()).await?;
        expect::status(&gone, 404)?;
        expect::message(&gone, PET_NOT_FOUND)?;
        ctx.mark_absent(id);
        Ok(())
    })
}

fn without_api_key(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let fixture = ctx.fresh_fixture(Pet::reference(0)).await?;
        let id = fixture.id.unwrap_or_default();

        let response = ctx.pets().delete_raw(&id.to_string(), false).await?;
        expect::status(&response, 200)?;
        ctx.mark_absent(id);
        Ok(())
    })
}

fn absent_pet_is_not_found(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let id = ctx.fresh_id();
        ctx.ensure_absent(id).await?;

        let response = ctx.pets().delete_raw(&id.to_string(), true).await?;
        expect::status(&response, 404)?;
        expect::message(&response, PET_NOT_FOUND)
    })
}

fn repeated_delete_is_tolerated(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let fixture = ctx.fresh_fixture(Pet::reference(0)).await?;
        let id = fixture.id.unwrap_or_default();

        for _ in 0..2 {
            let response = ctx.pets().delete_raw(&id.to_string(), false).await?;
            expect::status_in(&response, &[200, 404])?;
        }
        ctx.mark_absent(id);
        Ok(())
    })
}

fn overflowing_id_is_rejected(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let response = ctx.pets().delete_raw(OVERFLOW_ID, true).await?;
        expect::status(&response, 400)
    })
}

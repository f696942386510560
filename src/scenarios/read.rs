//! `GET /pet/{petId}` scenarios.

use super::{expect, Scenario, ScenarioContext, ScenarioFuture, ScenarioGroup, OVERFLOW_ID};
use crate::errors::{INVALID_ID_SUPPLIED, PET_NOT_FOUND};

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            ScenarioGroup::Read,
            "absent_pet_is_not_found",
            "reading an identity the store does not hold answers 404 \"Pet not found\", repeatably",
            absent_pet_is_not_found,
        ),
        Scenario::new(
            ScenarioGroup::Read,
            "empty_id_segment_is_rejected",
            "reading with an empty id segment answers 404 or 405",
            empty_id_segment_is_rejected,
        ),
        Scenario::new(
            ScenarioGroup::Read,
            "non_numeric_id_is_rejected",
            "reading a non-numeric id answers 400 \"Invalid ID supplied\"",
            non_numeric_id_is_rejected,
        ),
        Scenario::new(
            ScenarioGroup::Read,
            "overflowing_id_is_rejected",
            "reading an id past i64::MAX answers 400 \"Invalid ID supplied\"",
            overflowing_id_is_rejected,
        ),
    ]
}

fn absent_pet_is_not_found(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let id = ctx.fresh_id();
        ctx.ensure_absent(id).await?;

        for _ in 0..2 {
            let response = ctx.pets().get_raw(&id.to_string()).await?;
            expect::status(&response, 404)?;
            expect::message(&response, PET_NOT_FOUND)?;
        }
        Ok(())
    })
}

fn empty_id_segment_is_rejected(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        // Deployments disagree on 404 versus 405 here.
        let response = ctx.pets().get_raw("").await?;
        expect::status_in(&response, &[404, 405])
    })
}

fn non_numeric_id_is_rejected(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let response = ctx.pets().get_raw("ABC").await?;
        expect::status(&response, 400)?;
        expect::message(&response, INVALID_ID_SUPPLIED)
    })
}

fn overflowing_id_is_rejected(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let response = ctx.pets().get_raw(OVERFLOW_ID).await?;
        expect::status(&response, 400)?;
        expect::message(&response, INVALID_ID_SUPPLIED)
    })
}

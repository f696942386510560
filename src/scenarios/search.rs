//! `GET /pet/findByStatus` scenarios.

use rand::Rng;
use serde_json::Value;

use super::{expect, Scenario, ScenarioContext, ScenarioFuture, ScenarioGroup};
use crate::types::{Pet, PetStatus, PET_FIELDS};

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            ScenarioGroup::Search,
            "available_status_lists_fixture",
            "searching by \"available\" answers 200 with an array holding a complete record of the fixture",
            available_status_lists_fixture,
        ),
        Scenario::new(
            ScenarioGroup::Search,
            "status_filter_excludes_other_statuses",
            "a sold fixture is listed under \"sold\" and not under \"available\"",
            status_filter_excludes_other_statuses,
        ),
        Scenario::new(
            ScenarioGroup::Search,
            "unknown_status_is_empty",
            "searching by a status no record has answers 200 with an empty array",
            unknown_status_is_empty,
        ),
    ]
}

fn find<'a>(records: &'a [Value], id: i64) -> Option<&'a Value> {
    records
        .iter()
        .find(|record| record.get("id").and_then(Value::as_i64) == Some(id))
}

async fn search(ctx: &ScenarioContext, status: &str) -> crate::errors::PetstoreResult<Vec<Value>> {
    let response = ctx.pets().find_by_status_raw(status).await?;
    expect::status(&response, 200)?;
    match expect::json_body(&response)? {
        Value::Array(records) => Ok(records),
        other => Err(crate::errors::PetstoreError::assertion(format!(
            "expected an array, got {other}"
        ))),
    }
}

fn available_status_lists_fixture(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let fixture = ctx.fresh_fixture(Pet::reference(0)).await?;
        let id = fixture.id.unwrap_or_default();

        let records = search(ctx, PetStatus::Available.as_str()).await?;
        expect::that(!records.is_empty(), "expected at least one available pet")?;

        let record = find(&records, id)
            .ok_or_else(|| crate::errors::PetstoreError::assertion(format!("pet {id} not listed")))?;
        for field in PET_FIELDS {
            expect::that(record.get(*field).is_some(), format!("record lacks {field:?}: {record}"))?;
        }
        expect::subset(record, &fixture.to_value())
    })
}

fn status_filter_excludes_other_statuses(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let shape = Pet {
            status: Some(PetStatus::Sold),
            ..Pet::reference(0)
        };
        let fixture = ctx.fresh_fixture(shape).await?;
        let id = fixture.id.unwrap_or_default();

        let sold = search(ctx, PetStatus::Sold.as_str()).await?;
        expect::that(find(&sold, id).is_some(), format!("pet {id} not listed as sold"))?;

        let available = search(ctx, PetStatus::Available.as_str()).await?;
        expect::that(
            find(&available, id).is_none(),
            format!("sold pet {id} listed as available"),
        )
    })
}

fn unknown_status_is_empty(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let status = format!("{:08x}", rand::thread_rng().gen::<u32>());

        let records = search(ctx, &status).await?;
        expect::that(
            records.is_empty(),
            format!("expected no pets with status {status:?}, got {}", records.len()),
        )
    })
}

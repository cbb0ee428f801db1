use diesel::{Connection, ExpressionMethods, QueryDsl, RunQueryDsl, SelectableHelper};
use uuid::Uuid;

use crate::{
    auth::authorization::load_grants,
    domain::WeeklyHours,
    models::OperatingHours,
    schema::operating_hours,
    telemetry::spawn_blocking_with_tracing,
    utils::DbConnection,
};

use super::{branches::find_branch, StoreError};

#[tracing::instrument("Getting operating hours", skip(conn))]
pub async fn get_operating_hours(
    mut conn: DbConnection,
    branch_id: Uuid,
) -> Result<Vec<OperatingHours>, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        find_branch(&mut conn, branch_id)?;

        operating_hours::table
            .filter(operating_hours::branch_id.eq(branch_id))
            .order(operating_hours::day_of_week.asc())
            .select(OperatingHours::as_select())
            .load::<OperatingHours>(&mut conn)
            .map_err(StoreError::from)
    })
    .await??;

    Ok(res)
}

// Replaces the whole week so days left out of the submission are removed
#[tracing::instrument("Replacing operating hours", skip(conn, week))]
pub async fn replace_operating_hours(
    mut conn: DbConnection,
    actor: Uuid,
    branch_id: Uuid,
    week: WeeklyHours,
) -> Result<Vec<OperatingHours>, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Vec<OperatingHours>, StoreError, _>(|conn| {
            let branch = find_branch(conn, branch_id)?;
            load_grants(conn, actor)?.require_shop_owner(branch.shop_id)?;

            diesel::delete(operating_hours::table.filter(operating_hours::branch_id.eq(branch_id)))
                .execute(conn)?;

            let rows = week.into_rows(branch_id);
            if !rows.is_empty() {
                diesel::insert_into(operating_hours::table)
                    .values(&rows)
                    .execute(conn)?;
            }

            Ok(rows)
        })
    })
    .await??;

    Ok(res)
}

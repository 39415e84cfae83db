use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::Serialize;

use crate::schema::rating_change as rating_change_column;
use crate::schema::rating_change;
use crate::schema::rating_change::dsl::rating_change as rating_change_table;

/// One rating delta for a (handle, contest) pair.
#[derive(Queryable, Serialize)]
pub struct RatingChange {
    pub handle: String,
    pub contest_id: i32,
    pub division: String,
    pub old_rating: i32,
    pub new_rating: i32,
}

#[derive(Insertable)]
#[table_name = "rating_change"]
pub struct NewRatingChange<'a> {
    pub handle: &'a str,
    pub contest_id: i32,
    pub division: &'a str,
    pub old_rating: i32,
    pub new_rating: i32,
}

pub fn upsert_rating_change(
    connection: &SqliteConnection,
    new_rating_change: &NewRatingChange,
) -> QueryResult<()> {
    diesel::replace_into(rating_change_table)
        .values(new_rating_change)
        .execute(connection)?;
    Ok(())
}

pub fn get_rating_changes_for_handle(
    connection: &SqliteConnection,
    handle: &str,
) -> QueryResult<Vec<RatingChange>> {
    rating_change_table
        .filter(rating_change_column::handle.eq(handle))
        .order(rating_change_column::contest_id.asc())
        .load::<RatingChange>(connection)
}

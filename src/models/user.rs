use chrono::prelude::*;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::schema::user as user_column;
use crate::schema::user;
use crate::schema::user::dsl::user as user_table;

#[derive(Queryable)]
pub struct User {
    pub handle: String,
    pub organization: String,
    pub college: String,
    pub rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub ingest_instant: NaiveDateTime,
}

#[derive(Insertable)]
#[table_name = "user"]
pub struct NewUser<'a> {
    pub handle: &'a str,
    pub organization: &'a str,
    pub college: &'a str,
    pub rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub ingest_instant: NaiveDateTime,
}

/// Last-write-wins upsert keyed on the handle: a fresh ingestion pass
/// overwrites the stored record wholesale.
pub fn upsert_user(connection: &SqliteConnection, new_user: &NewUser) -> QueryResult<()> {
    diesel::replace_into(user_table)
        .values(new_user)
        .execute(connection)?;
    Ok(())
}

pub fn get_users(connection: &SqliteConnection) -> QueryResult<Vec<User>> {
    user_table.load::<User>(connection)
}

pub fn get_user_by_handle(connection: &SqliteConnection, handle: &str) -> QueryResult<User> {
    user_table
        .filter(user_column::handle.eq(handle))
        .first::<User>(connection)
}

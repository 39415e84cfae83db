use std::collections::HashMap;

use chrono::prelude::*;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::division::Division;
use crate::schema::contest;
use crate::schema::contest::dsl::contest as contest_table;

#[derive(Queryable)]
pub struct Contest {
    pub id: i32,
    pub name: String,
    pub division: String,
    pub start_instant: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[table_name = "contest"]
pub struct NewContest<'a> {
    pub id: i32,
    pub name: &'a str,
    pub division: &'a str,
    pub start_instant: Option<NaiveDateTime>,
}

pub fn upsert_contest(connection: &SqliteConnection, new_contest: &NewContest) -> QueryResult<()> {
    diesel::replace_into(contest_table)
        .values(new_contest)
        .execute(connection)?;
    Ok(())
}

pub fn get_contests(connection: &SqliteConnection) -> QueryResult<Vec<Contest>> {
    contest_table.load::<Contest>(connection)
}

/// Contest id -> division lookup for the aggregation pass. Rows whose
/// stored label no longer parses are left out, which downstream treats the
/// same as an unknown contest.
pub fn get_division_map(connection: &SqliteConnection) -> QueryResult<HashMap<i32, Division>> {
    let contests = get_contests(connection)?;
    Ok(contests
        .iter()
        .filter_map(|contest| {
            Division::parse(&contest.division).map(|division| (contest.id, division))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> SqliteConnection {
        let connection = SqliteConnection::establish(":memory:").unwrap();
        crate::setup::create_schema(&connection).unwrap();
        connection
    }

    #[test]
    fn division_map_reflects_stored_labels() {
        let connection = connection();
        upsert_contest(
            &connection,
            &NewContest {
                id: 1922,
                name: "Codeforces Round 922 (Div. 2)",
                division: Division::Div2.as_str(),
                start_instant: None,
            },
        )
        .unwrap();
        upsert_contest(
            &connection,
            &NewContest {
                id: 1950,
                name: "Educational Round 50",
                division: Division::Div0.as_str(),
                start_instant: None,
            },
        )
        .unwrap();

        let divisions = get_division_map(&connection).unwrap();
        assert_eq!(divisions.get(&1922), Some(&Division::Div2));
        assert_eq!(divisions.get(&1950), Some(&Division::Div0));
        assert_eq!(divisions.get(&1), None);
    }

    #[test]
    fn upsert_replaces_the_row() {
        let connection = connection();
        for division in [Division::Div1, Division::Div2].iter() {
            upsert_contest(
                &connection,
                &NewContest {
                    id: 1,
                    name: "Renamed Round",
                    division: division.as_str(),
                    start_instant: None,
                },
            )
            .unwrap();
        }
        let contests = get_contests(&connection).unwrap();
        assert_eq!(contests.len(), 1);
        assert_eq!(contests[0].division, "Div 2");
    }
}

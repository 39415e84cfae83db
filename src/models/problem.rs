use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::Serialize;

use crate::schema::problem_solve;
use crate::schema::problem_solve::dsl::problem_solve as problem_solve_table;

/// Per-(problem, college) solve aggregate. Tags are stored comma-joined,
/// the way the upstream feed lists them.
#[derive(Queryable, Serialize)]
pub struct ProblemSolve {
    pub problem_id: String,
    pub college: String,
    pub solves: i32,
    pub tags: String,
}

#[derive(Insertable)]
#[table_name = "problem_solve"]
struct NewProblemSolve<'a> {
    problem_id: &'a str,
    college: &'a str,
    solves: i32,
    tags: &'a str,
}

/// Bumps the solve counter for one (problem, college) pair, creating the
/// row on first sight. Callers deduplicate per user, so one accepted
/// problem bumps the pair at most once per aggregation pass.
pub fn bump_solve(
    connection: &SqliteConnection,
    problem_id: &str,
    college: &str,
    tags: &[String],
) -> QueryResult<()> {
    let existing = problem_solve_table
        .find((problem_id, college))
        .first::<ProblemSolve>(connection)
        .optional()?;

    let solves = existing.map(|row| row.solves).unwrap_or(0) + 1;
    let joined = tags.join(",");
    diesel::replace_into(problem_solve_table)
        .values(&NewProblemSolve {
            problem_id,
            college,
            solves,
            tags: &joined,
        })
        .execute(connection)?;
    Ok(())
}

pub fn get_problem_solves(connection: &SqliteConnection) -> QueryResult<Vec<ProblemSolve>> {
    problem_solve_table.load::<ProblemSolve>(connection)
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
    fn counter_accumulates_per_problem_and_college() {
        let connection = connection();
        let tags = vec!["greedy".to_string(), "dp".to_string()];
        bump_solve(&connection, "1922A", "IITBHU", &tags).unwrap();
        bump_solve(&connection, "1922A", "IITBHU", &tags).unwrap();
        bump_solve(&connection, "1922A", "IITDELHI", &tags).unwrap();

        let mut rows = get_problem_solves(&connection).unwrap();
        rows.sort_by(|a, b| a.college.cmp(&b.college));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].college, "IITBHU");
        assert_eq!(rows[0].solves, 2);
        assert_eq!(rows[0].tags, "greedy,dp");
        assert_eq!(rows[1].college, "IITDELHI");
        assert_eq!(rows[1].solves, 1);
    }
}

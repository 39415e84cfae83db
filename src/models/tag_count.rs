use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::schema::tag_count;
use crate::schema::tag_count::dsl::tag_count as tag_count_table;
use crate::tags::TagVector;

/// One stored tag-count row, keyed by (handle, division). Columns follow
/// [`crate::tags::TRACKED_TAGS`] order.
#[derive(Queryable)]
pub struct TagCountRow {
    pub handle: String,
    pub division: String,
    pub implementation: i32,
    pub math: i32,
    pub greedy: i32,
    pub dp: i32,
    pub data_structures: i32,
    pub brute_force: i32,
    pub constructive_algorithms: i32,
    pub graphs: i32,
    pub sortings: i32,
    pub binary_search: i32,
}

impl TagCountRow {
    pub fn vector(&self) -> TagVector {
        TagVector::from_counts([
            self.implementation,
            self.math,
            self.greedy,
            self.dp,
            self.data_structures,
            self.brute_force,
            self.constructive_algorithms,
            self.graphs,
            self.sortings,
            self.binary_search,
        ])
    }
}

#[derive(Insertable)]
#[table_name = "tag_count"]
struct NewTagCount<'a> {
    handle: &'a str,
    division: &'a str,
    implementation: i32,
    math: i32,
    greedy: i32,
    dp: i32,
    data_structures: i32,
    brute_force: i32,
    constructive_algorithms: i32,
    graphs: i32,
    sortings: i32,
    binary_search: i32,
}

pub fn upsert_tag_counts(
    connection: &SqliteConnection,
    handle: &str,
    division: &str,
    vector: &TagVector,
) -> QueryResult<()> {
    let counts = vector.counts();
    diesel::replace_into(tag_count_table)
        .values(&NewTagCount {
            handle,
            division,
            implementation: counts[0],
            math: counts[1],
            greedy: counts[2],
            dp: counts[3],
            data_structures: counts[4],
            brute_force: counts[5],
            constructive_algorithms: counts[6],
            graphs: counts[7],
            sortings: counts[8],
            binary_search: counts[9],
        })
        .execute(connection)?;
    Ok(())
}

pub fn get_tag_counts(connection: &SqliteConnection) -> QueryResult<Vec<TagCountRow>> {
    tag_count_table.load::<TagCountRow>(connection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::division::Division;

    fn connection() -> SqliteConnection {
        let connection = SqliteConnection::establish(":memory:").unwrap();
        crate::setup::create_schema(&connection).unwrap();
        connection
    }

    #[test]
    fn vectors_round_trip_through_the_store() {
        let connection = connection();
        let mut vector = TagVector::new();
        vector.increment("dp");
        vector.increment("dp");
        vector.increment("binary search");

        upsert_tag_counts(&connection, "wreckker", Division::Div2.as_str(), &vector).unwrap();

        let rows = get_tag_counts(&connection).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].handle, "wreckker");
        assert_eq!(rows[0].division, "Div 2");
        assert_eq!(rows[0].vector(), vector);
    }

    #[test]
    fn upsert_replaces_the_division_row() {
        let connection = connection();
        let mut first = TagVector::new();
        first.increment("greedy");
        let mut second = TagVector::new();
        second.increment("math");

        upsert_tag_counts(&connection, "wreckker", "Div 2", &first).unwrap();
        upsert_tag_counts(&connection, "wreckker", "Div 2", &second).unwrap();
        upsert_tag_counts(&connection, "wreckker", "Div 3", &first).unwrap();

        let rows = get_tag_counts(&connection).unwrap();
        assert_eq!(rows.len(), 2);
        let div2 = rows.iter().find(|row| row.division == "Div 2").unwrap();
        assert_eq!(div2.vector(), second);
    }
}

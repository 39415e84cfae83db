use diesel::connection::SimpleConnection;
use diesel::r2d2::ConnectionManager;
use diesel::sqlite::SqliteConnection;
use diesel::Connection;
use diesel::QueryResult;
use dotenv::dotenv;
use std::env;

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

pub fn setup_dotenv() {
    dotenv().ok();
}

pub fn establish_connection() -> SqliteConnection {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    SqliteConnection::establish(&database_url)
        .unwrap_or_else(|_| panic!("Error connecting to {}", database_url))
}

pub fn create_pool() -> DbPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    r2d2::Pool::builder()
        .build(ConnectionManager::<SqliteConnection>::new(database_url))
        .expect("Error building the connection pool")
}

// Keep in sync with schema.rs.
const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS user (
    handle TEXT PRIMARY KEY NOT NULL,
    organization TEXT NOT NULL,
    college TEXT NOT NULL,
    rating INTEGER,
    max_rating INTEGER,
    ingest_instant TIMESTAMP NOT NULL
);
CREATE TABLE IF NOT EXISTS contest (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    division TEXT NOT NULL,
    start_instant TIMESTAMP
);
CREATE TABLE IF NOT EXISTS problem_solve (
    problem_id TEXT NOT NULL,
    college TEXT NOT NULL,
    solves INTEGER NOT NULL,
    tags TEXT NOT NULL,
    PRIMARY KEY (problem_id, college)
);
CREATE TABLE IF NOT EXISTS tag_count (
    handle TEXT NOT NULL,
    division TEXT NOT NULL,
    implementation INTEGER NOT NULL,
    math INTEGER NOT NULL,
    greedy INTEGER NOT NULL,
    dp INTEGER NOT NULL,
    data_structures INTEGER NOT NULL,
    brute_force INTEGER NOT NULL,
    constructive_algorithms INTEGER NOT NULL,
    graphs INTEGER NOT NULL,
    sortings INTEGER NOT NULL,
    binary_search INTEGER NOT NULL,
    PRIMARY KEY (handle, division)
);
CREATE TABLE IF NOT EXISTS rating_change (
    handle TEXT NOT NULL,
    contest_id INTEGER NOT NULL,
    division TEXT NOT NULL,
    old_rating INTEGER NOT NULL,
    new_rating INTEGER NOT NULL,
    PRIMARY KEY (handle, contest_id)
);
";

/// Idempotent schema bootstrap; both binaries run it on startup.
pub fn create_schema(connection: &SqliteConnection) -> QueryResult<()> {
    connection.batch_execute(SCHEMA_SQL)
}

use std::collections::BTreeSet;
use std::env;
use std::time::Duration;

use chrono::NaiveDateTime;
use chrono::Utc;
use diesel::sqlite::SqliteConnection;
use log::{error, info, warn};
use thiserror::Error;
use tokio::time::sleep;

mod api;

use api::{ApiError, CfClient, CfContest, CfSubmission};
use collegeforces::college::{CollegeMatcher, UNKNOWN_COLLEGE};
use collegeforces::division::Division;
use collegeforces::models::contest::{self, NewContest};
use collegeforces::models::problem;
use collegeforces::models::rating::{self, NewRatingChange};
use collegeforces::models::tag_count;
use collegeforces::models::user::{self, NewUser};
use collegeforces::setup;
use collegeforces::tags::{aggregate_tags, distinct_accepted, SubmissionEntry};

// Pause between consecutive API calls; the public API throttles
// aggressively without it.
const API_DELAY: Duration = Duration::from_millis(500);
const STANDINGS_DEPTH: u32 = 5000;
const USER_INFO_BATCH: usize = 1000;

#[derive(Error, Debug)]
enum IngestError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] diesel::result::Error),
}

#[tokio::main]
async fn main() {
    setup::setup_dotenv();
    env_logger::init();

    let connection = setup::establish_connection();
    setup::create_schema(&connection).expect("Couldn't create the schema");

    let contest_depth: usize = env::var("CONTEST_DEPTH")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(10);

    let client = CfClient::new();
    let matcher = CollegeMatcher::with_default_rules();

    if let Err(error) = ingest(&client, &connection, &matcher, contest_depth).await {
        error!("Ingestion aborted: {}", error);
        std::process::exit(1);
    }
}

async fn ingest(
    client: &CfClient,
    connection: &SqliteConnection,
    matcher: &CollegeMatcher,
    contest_depth: usize,
) -> Result<(), IngestError> {
    let contests = recent_finished_contests(client, contest_depth).await?;
    info!("Ingesting {} finished contests", contests.len());

    let participants = ingest_contests(client, connection, &contests).await?;
    info!("Collected {} distinct participants", participants.len());

    let enrolled = ingest_participants(client, connection, matcher, participants).await?;
    info!("{} participants map to a known college", enrolled.len());

    ingest_submissions(client, connection, &enrolled).await?;
    info!("Ingestion finished");
    Ok(())
}

async fn recent_finished_contests(
    client: &CfClient,
    contest_depth: usize,
) -> Result<Vec<CfContest>, IngestError> {
    let contests = client.contest_list().await?;
    sleep(API_DELAY).await;
    Ok(contests
        .into_iter()
        .filter(|contest| contest.phase == "FINISHED")
        .take(contest_depth)
        .collect())
}

/// Contest pass: store each contest with its inferred division, record
/// rating changes, and collect participant handles from the standings.
/// A failing call skips that contest, never the pass.
async fn ingest_contests(
    client: &CfClient,
    connection: &SqliteConnection,
    contests: &[CfContest],
) -> Result<BTreeSet<String>, IngestError> {
    let mut participants = BTreeSet::new();

    for cf_contest in contests {
        let division = Division::from_contest_name(&cf_contest.name);
        contest::upsert_contest(
            connection,
            &NewContest {
                id: cf_contest.id,
                name: &cf_contest.name,
                division: division.as_str(),
                start_instant: cf_contest
                    .start_time_seconds
                    .and_then(|seconds| NaiveDateTime::from_timestamp_opt(seconds, 0)),
            },
        )?;

        match client.contest_standings(cf_contest.id, STANDINGS_DEPTH).await {
            Ok(standings) => {
                for row in standings.rows {
                    if row.party.participant_type.as_deref() != Some("CONTESTANT") {
                        continue;
                    }
                    for member in row.party.members {
                        participants.insert(member.handle);
                    }
                }
            }
            Err(error) => warn!(
                "Skipping standings for contest {}: {}",
                cf_contest.id, error
            ),
        }
        sleep(API_DELAY).await;

        match client.contest_rating_changes(cf_contest.id).await {
            Ok(changes) => {
                for change in &changes {
                    rating::upsert_rating_change(
                        connection,
                        &NewRatingChange {
                            handle: &change.handle,
                            contest_id: cf_contest.id,
                            division: division.as_str(),
                            old_rating: change.old_rating,
                            new_rating: change.new_rating,
                        },
                    )?;
                    participants.insert(change.handle.clone());
                }
            }
            Err(error) => warn!(
                "Skipping rating changes for contest {}: {}",
                cf_contest.id, error
            ),
        }
        sleep(API_DELAY).await;
    }

    Ok(participants)
}

/// Participant pass: resolve organizations to canonical colleges and
/// store every handle that maps to a known one.
async fn ingest_participants(
    client: &CfClient,
    connection: &SqliteConnection,
    matcher: &CollegeMatcher,
    participants: BTreeSet<String>,
) -> Result<Vec<(String, &'static str)>, IngestError> {
    let handles: Vec<String> = participants.into_iter().collect();
    let mut enrolled = Vec::new();

    for batch in handles.chunks(USER_INFO_BATCH) {
        let users = match client.user_info(batch).await {
            Ok(users) => users,
            Err(error) => {
                warn!("Skipping a user.info batch of {}: {}", batch.len(), error);
                sleep(API_DELAY).await;
                continue;
            }
        };

        for cf_user in users {
            let organization = cf_user.organization.unwrap_or_default();
            let college = matcher.resolve(&organization);
            if college == UNKNOWN_COLLEGE {
                continue;
            }
            user::upsert_user(
                connection,
                &NewUser {
                    handle: &cf_user.handle,
                    organization: &organization,
                    college,
                    rating: cf_user.rating,
                    max_rating: cf_user.max_rating,
                    ingest_instant: Utc::now().naive_utc(),
                },
            )?;
            enrolled.push((cf_user.handle, college));
        }
        sleep(API_DELAY).await;
    }

    Ok(enrolled)
}

fn submission_entries(submissions: &[CfSubmission]) -> Vec<SubmissionEntry> {
    submissions
        .iter()
        .map(|submission| SubmissionEntry {
            verdict: submission.verdict.clone(),
            contest_id: submission.contest_id.or(submission.problem.contest_id),
            problem_index: submission.problem.index.clone(),
            tags: submission.problem.tags.clone(),
        })
        .collect()
}

/// Submission pass: aggregate each stored user's history into per-division
/// tag counts and bump the per-college solve aggregates. A failing user is
/// skipped, not the pass.
async fn ingest_submissions(
    client: &CfClient,
    connection: &SqliteConnection,
    enrolled: &[(String, &'static str)],
) -> Result<(), IngestError> {
    let divisions = contest::get_division_map(connection)?;

    for (handle, college) in enrolled {
        let submissions = match client.user_status(handle).await {
            Ok(submissions) => submissions,
            Err(error) => {
                warn!("Skipping submissions for {}: {}", handle, error);
                sleep(API_DELAY).await;
                continue;
            }
        };

        let entries = submission_entries(&submissions);
        for (division, vector) in aggregate_tags(&entries, &divisions) {
            tag_count::upsert_tag_counts(connection, handle, division.as_str(), &vector)?;
        }
        for solved in distinct_accepted(&entries) {
            problem::bump_solve(connection, &solved.problem_id, college, &solved.tags)?;
        }
        sleep(API_DELAY).await;
    }

    Ok(())
}

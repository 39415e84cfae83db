use std::collections::{BTreeSet, HashMap, HashSet};

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use diesel::sqlite::SqliteConnection;
use diesel::QueryResult;
use handlebars::Handlebars;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::college::CollegeMatcher;
use crate::models::{contest, tag_count, user};
use crate::ranking::{
    rank_colleges, rank_users, CollegeFilter, CollegeMetric, RankedUser, RankingQuery,
    SortDirection, SortKey, Title,
};
use crate::setup::DbPool;
use crate::tags::{TagVector, TRACKED_TAGS};

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("storage error: {0}")]
    Store(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("template error: {0}")]
    Template(#[from] handlebars::RenderError),
    #[error("blocking worker canceled")]
    Canceled,
}

impl ResponseError for DashboardError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Query parameters of the user-vs-user view. Everything is optional;
/// omitted parameters fall back to "all colleges, no tags, rating
/// descending".
#[derive(Debug, Deserialize)]
pub struct RankingParams {
    pub colleges: Option<String>,
    pub tags: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

fn split_list(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

impl RankingParams {
    pub fn to_query(&self) -> RankingQuery {
        let selected = split_list(&self.colleges);
        let colleges = if selected.is_empty() || selected.iter().any(|college| college == "All") {
            CollegeFilter::All
        } else {
            CollegeFilter::Colleges(selected.into_iter().collect::<HashSet<String>>())
        };
        let sort_key = match self.sort.as_deref() {
            Some("maxRating") => SortKey::MaxRating,
            _ => SortKey::Rating,
        };
        let direction = match self.order.as_deref() {
            Some("asc") => SortDirection::Ascending,
            _ => SortDirection::Descending,
        };
        RankingQuery {
            colleges,
            tags: split_list(&self.tags),
            sort_key,
            direction,
        }
    }
}

/// Query parameters of the college-vs-college view.
#[derive(Debug, Deserialize)]
pub struct CollegeParams {
    pub metric: Option<String>,
    pub tags: Option<String>,
}

impl CollegeParams {
    pub fn metric(&self) -> CollegeMetric {
        match self.metric.as_deref() {
            Some("members") => CollegeMetric::Members,
            Some("tagTotal") => CollegeMetric::TagTotal,
            _ => CollegeMetric::MeanRating,
        }
    }
}

/// Assembles engine input records from the stores: user rows joined with
/// their tag counts summed across divisions.
pub fn load_ranked_users(connection: &SqliteConnection) -> QueryResult<Vec<RankedUser>> {
    let users = user::get_users(connection)?;
    let tag_rows = tag_count::get_tag_counts(connection)?;

    let mut totals: HashMap<String, TagVector> = HashMap::new();
    for row in &tag_rows {
        totals
            .entry(row.handle.clone())
            .or_insert_with(TagVector::new)
            .add(&row.vector());
    }

    Ok(users
        .into_iter()
        .map(|record| {
            let tags = totals.remove(&record.handle).unwrap_or_default();
            RankedUser {
                handle: record.handle,
                college: record.college,
                rating: record.rating,
                max_rating: record.max_rating,
                tags,
            }
        })
        .collect())
}

async fn load_users_blocking(pool: &web::Data<DbPool>) -> Result<Vec<RankedUser>, DashboardError> {
    let pool = pool.get_ref().clone();
    web::block(move || -> Result<Vec<RankedUser>, DashboardError> {
        let connection = pool.get()?;
        Ok(load_ranked_users(&connection)?)
    })
    .await
    .map_err(|_| DashboardError::Canceled)?
}

fn distinct_colleges(users: &[RankedUser]) -> Vec<String> {
    users
        .iter()
        .map(|user| user.college.clone())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

fn user_rows(users: &[RankedUser], selected_tags: &[String]) -> Vec<serde_json::Value> {
    users
        .iter()
        .enumerate()
        .map(|(position, user)| {
            json!({
                "rank": position + 1,
                "handle": user.handle,
                "college": user.college,
                "rating": user.rating.unwrap_or(0),
                "max_rating": user.max_rating.unwrap_or(0),
                "title": user
                    .rating
                    .map(|rating| Title::for_rating(rating).as_str())
                    .unwrap_or("Unrated"),
                "tag_sum": user.tags.sum_over(selected_tags.iter().map(String::as_str)),
            })
        })
        .collect()
}

pub async fn index(
    pool: web::Data<DbPool>,
    hb: web::Data<Handlebars<'_>>,
    matcher: web::Data<CollegeMatcher>,
) -> Result<HttpResponse, DashboardError> {
    let pool_handle = pool.get_ref().clone();
    let (user_total, contest_total) =
        web::block(move || -> Result<(usize, usize), DashboardError> {
            let connection = pool_handle.get()?;
            let users = user::get_users(&connection)?;
            let contests = contest::get_contests(&connection)?;
            Ok((users.len(), contests.len()))
        })
        .await
        .map_err(|_| DashboardError::Canceled)??;

    let body = hb.render(
        "index",
        &json!({
            "user_total": user_total,
            "contest_total": contest_total,
            "tracked_tags": TRACKED_TAGS,
            "colleges": matcher.colleges().collect::<Vec<&str>>(),
        }),
    )?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

pub async fn rankings(
    pool: web::Data<DbPool>,
    hb: web::Data<Handlebars<'_>>,
    params: web::Query<RankingParams>,
) -> Result<HttpResponse, DashboardError> {
    let query = params.to_query();
    let users = load_users_blocking(&pool).await?;
    let colleges = distinct_colleges(&users);
    let ranked = rank_users(users, &query);

    let body = hb.render(
        "rankings",
        &json!({
            "rows": user_rows(&ranked, &query.tags),
            "colleges": colleges,
            "tracked_tags": TRACKED_TAGS,
            "selected_colleges": params.colleges.as_deref().unwrap_or("All"),
            "selected_tags": params.tags.as_deref().unwrap_or(""),
            "tag_sorted": !query.tags.is_empty(),
            "sort_rating": query.sort_key == SortKey::Rating,
            "sort_max_rating": query.sort_key == SortKey::MaxRating,
            "order_desc": query.direction == SortDirection::Descending,
            "order_asc": query.direction == SortDirection::Ascending,
        }),
    )?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

pub async fn colleges(
    pool: web::Data<DbPool>,
    hb: web::Data<Handlebars<'_>>,
    params: web::Query<CollegeParams>,
) -> Result<HttpResponse, DashboardError> {
    let selected_tags = split_list(&params.tags);
    let users = load_users_blocking(&pool).await?;
    let standings = rank_colleges(&users, params.metric(), &selected_tags);

    let rows: Vec<serde_json::Value> = standings
        .iter()
        .enumerate()
        .map(|(position, standing)| {
            json!({
                "rank": position + 1,
                "college": standing.college,
                "members": standing.members,
                "mean_rating": format!("{:.1}", standing.mean_rating),
                "tag_total": standing.tag_total,
            })
        })
        .collect();

    let metric = params.metric();
    let body = hb.render(
        "colleges",
        &json!({
            "rows": rows,
            "metric_mean_rating": metric == CollegeMetric::MeanRating,
            "metric_members": metric == CollegeMetric::Members,
            "metric_tag_total": metric == CollegeMetric::TagTotal,
            "selected_tags": params.tags.as_deref().unwrap_or(""),
        }),
    )?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

pub async fn rankings_json(
    pool: web::Data<DbPool>,
    params: web::Query<RankingParams>,
) -> Result<HttpResponse, DashboardError> {
    let query = params.to_query();
    let users = load_users_blocking(&pool).await?;
    let ranked = rank_users(users, &query);
    Ok(HttpResponse::Ok().json(&ranked))
}

pub async fn colleges_json(
    pool: web::Data<DbPool>,
    params: web::Query<CollegeParams>,
) -> Result<HttpResponse, DashboardError> {
    let selected_tags = split_list(&params.tags);
    let users = load_users_blocking(&pool).await?;
    let standings = rank_colleges(&users, params.metric(), &selected_tags);
    Ok(HttpResponse::Ok().json(&standings))
}

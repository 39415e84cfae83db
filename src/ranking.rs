use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::tags::TagVector;

/// College filter: everything, or an explicit subset of canonical
/// identifiers.
#[derive(Debug, Clone)]
pub enum CollegeFilter {
    All,
    Colleges(HashSet<String>),
}

impl CollegeFilter {
    fn accepts(&self, college: &str) -> bool {
        match self {
            CollegeFilter::All => true,
            CollegeFilter::Colleges(selected) => selected.contains(college),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Rating,
    MaxRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Filter/sort criteria for the user ranking view. When `tags` is
/// non-empty the selected-label sum dominates and `sort_key`/`direction`
/// are ignored.
#[derive(Debug, Clone)]
pub struct RankingQuery {
    pub colleges: CollegeFilter,
    pub tags: Vec<String>,
    pub sort_key: SortKey,
    pub direction: SortDirection,
}

impl Default for RankingQuery {
    fn default() -> RankingQuery {
        RankingQuery {
            colleges: CollegeFilter::All,
            tags: Vec::new(),
            sort_key: SortKey::Rating,
            direction: SortDirection::Descending,
        }
    }
}

/// One user record as consumed by the engine. Missing numeric fields sort
/// as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedUser {
    pub handle: String,
    pub college: String,
    pub rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub tags: TagVector,
}

impl RankedUser {
    fn sort_value(&self, key: SortKey) -> i32 {
        match key {
            SortKey::Rating => self.rating.unwrap_or(0),
            SortKey::MaxRating => self.max_rating.unwrap_or(0),
        }
    }
}

/// Filters and orders user records.
///
/// Selected tags take precedence: the view is sorted descending by the sum
/// of the selected labels' counts. Otherwise the numeric sort key applies
/// in the requested direction. All sorts are stable, so equal keys keep
/// their input order.
pub fn rank_users(mut users: Vec<RankedUser>, query: &RankingQuery) -> Vec<RankedUser> {
    users.retain(|user| query.colleges.accepts(&user.college));

    if !query.tags.is_empty() {
        users.sort_by_key(|user| {
            Reverse(user.tags.sum_over(query.tags.iter().map(String::as_str)))
        });
        return users;
    }

    match query.direction {
        SortDirection::Ascending => {
            users.sort_by_key(|user| user.sort_value(query.sort_key));
        }
        SortDirection::Descending => {
            users.sort_by_key(|user| Reverse(user.sort_value(query.sort_key)));
        }
    }
    users
}

/// Metric the college view is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollegeMetric {
    Members,
    MeanRating,
    TagTotal,
}

/// Per-college aggregate over the user records belonging to it.
#[derive(Debug, Clone, Serialize)]
pub struct CollegeStanding {
    pub college: String,
    pub members: usize,
    pub mean_rating: f64,
    pub tag_total: i64,
    pub tags: TagVector,
}

/// Aggregates user records per canonical college and orders the colleges
/// by the chosen metric, descending. `selected` scopes the tag total; an
/// empty selection totals every tracked label. Unrated members contribute
/// zero to the rating mean.
pub fn rank_colleges(
    users: &[RankedUser],
    metric: CollegeMetric,
    selected: &[String],
) -> Vec<CollegeStanding> {
    let mut grouped: BTreeMap<&str, Vec<&RankedUser>> = BTreeMap::new();
    for user in users {
        grouped.entry(&user.college).or_insert_with(Vec::new).push(user);
    }

    let mut standings: Vec<CollegeStanding> = grouped
        .into_iter()
        .map(|(college, members)| {
            let mut tags = TagVector::new();
            let mut rating_sum: i64 = 0;
            for member in &members {
                tags.add(&member.tags);
                rating_sum += i64::from(member.rating.unwrap_or(0));
            }
            let tag_total = if selected.is_empty() {
                tags.total()
            } else {
                tags.sum_over(selected.iter().map(String::as_str))
            };
            CollegeStanding {
                college: college.to_string(),
                members: members.len(),
                mean_rating: rating_sum as f64 / members.len() as f64,
                tag_total,
                tags,
            }
        })
        .collect();

    match metric {
        CollegeMetric::Members => standings.sort_by_key(|standing| Reverse(standing.members)),
        CollegeMetric::MeanRating => standings.sort_by(|a, b| {
            b.mean_rating
                .partial_cmp(&a.mean_rating)
                .unwrap_or(Ordering::Equal)
        }),
        CollegeMetric::TagTotal => standings.sort_by_key(|standing| Reverse(standing.tag_total)),
    }
    standings
}

/// Rating title band. Bands partition the rating axis, so every rating
/// lands in exactly one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Title {
    Newbie,
    Pupil,
    Specialist,
    Expert,
    CandidateMaster,
    Master,
    InternationalMaster,
    Grandmaster,
}

impl Title {
    pub fn for_rating(rating: i32) -> Title {
        match rating {
            r if r <= 1199 => Title::Newbie,
            r if r <= 1399 => Title::Pupil,
            r if r <= 1599 => Title::Specialist,
            r if r <= 1899 => Title::Expert,
            r if r <= 2099 => Title::CandidateMaster,
            r if r <= 2299 => Title::Master,
            r if r <= 2399 => Title::InternationalMaster,
            _ => Title::Grandmaster,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Title::Newbie => "Newbie",
            Title::Pupil => "Pupil",
            Title::Specialist => "Specialist",
            Title::Expert => "Expert",
            Title::CandidateMaster => "Candidate Master",
            Title::Master => "Master",
            Title::InternationalMaster => "International Master",
            Title::Grandmaster => "Grandmaster",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(handle: &str, college: &str, rating: Option<i32>, max_rating: Option<i32>) -> RankedUser {
        RankedUser {
            handle: handle.into(),
            college: college.into(),
            rating,
            max_rating,
            tags: TagVector::new(),
        }
    }

    fn user_with_tags(handle: &str, college: &str, rating: Option<i32>, labels: &[&str]) -> RankedUser {
        let mut tags = TagVector::new();
        for label in labels {
            tags.increment(label);
        }
        RankedUser {
            handle: handle.into(),
            college: college.into(),
            rating,
            max_rating: rating,
            tags,
        }
    }

    #[test]
    fn sorts_by_rating_descending_by_default() {
        let users = vec![
            user("low", "IITBHU", Some(1200), Some(1300)),
            user("high", "IITBHU", Some(2400), Some(2500)),
        ];
        let ranked = rank_users(users, &RankingQuery::default());
        assert_eq!(ranked[0].handle, "high");
        assert_eq!(ranked[1].handle, "low");
    }

    #[test]
    fn missing_ratings_sort_as_zero() {
        let users = vec![
            user("rated", "IITBHU", Some(800), Some(900)),
            user("unrated", "IITBHU", None, None),
        ];
        let query = RankingQuery {
            direction: SortDirection::Ascending,
            ..RankingQuery::default()
        };
        let ranked = rank_users(users, &query);
        assert_eq!(ranked[0].handle, "unrated");
    }

    #[test]
    fn college_filter_keeps_only_the_subset() {
        let users = vec![
            user("a", "IITBHU", Some(1500), Some(1500)),
            user("b", "BITSPILANI", Some(1600), Some(1600)),
            user("c", "IITDELHI", Some(1700), Some(1700)),
        ];
        let mut selected = HashSet::new();
        selected.insert("IITBHU".to_string());
        selected.insert("IITDELHI".to_string());
        let query = RankingQuery {
            colleges: CollegeFilter::Colleges(selected),
            ..RankingQuery::default()
        };
        let ranked = rank_users(users, &query);
        let handles: Vec<&str> = ranked.iter().map(|u| u.handle.as_str()).collect();
        assert_eq!(handles, vec!["c", "a"]);
    }

    #[test]
    fn selected_tags_override_the_sort_key() {
        let users = vec![
            user_with_tags("strong_rating", "IITBHU", Some(2600), &["greedy"]),
            user_with_tags("strong_tags", "IITBHU", Some(1000), &["dp", "dp", "dp"]),
        ];
        let query = RankingQuery {
            tags: vec!["dp".into()],
            ..RankingQuery::default()
        };
        let ranked = rank_users(users, &query);
        assert_eq!(ranked[0].handle, "strong_tags");
    }

    #[test]
    fn equal_tag_sums_keep_both_users_once_in_input_order() {
        let users = vec![
            user_with_tags("first", "IITBHU", Some(1200), &["dp"]),
            user_with_tags("second", "IITBHU", Some(2600), &["dp"]),
        ];
        let query = RankingQuery {
            tags: vec!["dp".into()],
            ..RankingQuery::default()
        };
        let ranked = rank_users(users.clone(), &query);
        assert_eq!(ranked.len(), 2);
        // Stable sort: the tie keeps input order regardless of ratings.
        assert_eq!(ranked[0].handle, "first");
        assert_eq!(ranked[1].handle, "second");
    }

    #[test]
    fn ranking_is_idempotent() {
        let users = vec![
            user("a", "IITBHU", Some(1400), Some(1500)),
            user("b", "IITDELHI", Some(1400), Some(1600)),
            user("c", "BITSGOA", None, Some(1200)),
        ];
        let query = RankingQuery::default();
        let first = rank_users(users.clone(), &query);
        let second = rank_users(users, &query);
        assert_eq!(first, second);
    }

    #[test]
    fn college_aggregates_count_mean_and_tags() {
        let users = vec![
            user_with_tags("a", "IITBHU", Some(1000), &["dp"]),
            user_with_tags("b", "IITBHU", Some(2000), &["dp", "greedy"]),
            user_with_tags("c", "IITDELHI", Some(3000), &["math"]),
        ];
        let standings = rank_colleges(&users, CollegeMetric::MeanRating, &[]);
        assert_eq!(standings[0].college, "IITDELHI");
        assert_eq!(standings[0].members, 1);
        let bhu = standings.iter().find(|s| s.college == "IITBHU").unwrap();
        assert_eq!(bhu.members, 2);
        assert!((bhu.mean_rating - 1500.0).abs() < f64::EPSILON);
        assert_eq!(bhu.tag_total, 3);
        assert_eq!(bhu.tags.count("dp"), 2);
    }

    #[test]
    fn college_tag_total_scopes_to_the_selection() {
        let users = vec![user_with_tags("a", "IITBHU", Some(1000), &["dp", "greedy"])];
        let standings =
            rank_colleges(&users, CollegeMetric::TagTotal, &["greedy".to_string()]);
        assert_eq!(standings[0].tag_total, 1);
    }

    #[test]
    fn title_bands_partition_ratings() {
        assert_eq!(Title::for_rating(1199), Title::Newbie);
        assert_eq!(Title::for_rating(1200), Title::Pupil);
        assert_eq!(Title::for_rating(1399), Title::Pupil);
        assert_eq!(Title::for_rating(2400), Title::Grandmaster);
        assert_eq!(Title::for_rating(1400), Title::Specialist);
        assert_eq!(Title::for_rating(1899), Title::Expert);
        assert_eq!(Title::for_rating(1900), Title::CandidateMaster);
        assert_eq!(Title::for_rating(2299), Title::Master);
        assert_eq!(Title::for_rating(2399), Title::InternationalMaster);
        assert_eq!(Title::for_rating(3500), Title::Grandmaster);
    }
}

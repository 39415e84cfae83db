table! {
    user (handle) {
        handle -> Text,
        organization -> Text,
        college -> Text,
        rating -> Nullable<Integer>,
        max_rating -> Nullable<Integer>,
        ingest_instant -> Timestamp,
    }
}

table! {
    contest (id) {
        id -> Integer,
        name -> Text,
        division -> Text,
        start_instant -> Nullable<Timestamp>,
    }
}

table! {
    problem_solve (problem_id, college) {
        problem_id -> Text,
        college -> Text,
        solves -> Integer,
        tags -> Text,
    }
}

table! {
    tag_count (handle, division) {
        handle -> Text,
        division -> Text,
        implementation -> Integer,
        math -> Integer,
        greedy -> Integer,
        dp -> Integer,
        data_structures -> Integer,
        brute_force -> Integer,
        constructive_algorithms -> Integer,
        graphs -> Integer,
        sortings -> Integer,
        binary_search -> Integer,
    }
}

table! {
    rating_change (handle, contest_id) {
        handle -> Text,
        contest_id -> Integer,
        division -> Text,
        old_rating -> Integer,
        new_rating -> Integer,
    }
}

allow_tables_to_appear_in_same_query!(user, contest, problem_solve, tag_count, rating_change,);

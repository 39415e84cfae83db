#[macro_use]
extern crate diesel;

pub mod college;
pub mod dashboard;
pub mod division;
pub mod models;
pub mod ranking;
pub mod schema;
pub mod setup;
pub mod tags;

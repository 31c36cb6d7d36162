//! Puzzle domain: template catalog, weekly batch sampling, answer judgment
//! and leaderboard aggregation. Everything here is pure; persistence lives in
//! `store` and orchestration in `services::puzzle_set`.

pub mod answer;
pub mod catalog;
pub mod period;
pub mod sampler;
pub mod scoring;
pub mod types;

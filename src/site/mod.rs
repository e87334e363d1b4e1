//! Site navigation: route table, per-request navigator, auth gating, and
//! the HTML views they resolve to.

pub mod auth;
pub mod guard;
pub mod pages;
pub mod router;

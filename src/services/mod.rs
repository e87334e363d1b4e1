//! Domain services used by HTTP routes and page rendering.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on protocol translation and auth plumbing.

pub mod booking;
pub mod catalog;
pub mod like;
pub mod otp;
pub mod product;
pub mod review;
pub mod session;

//! carbonwise: vehicle lifecycle emissions explorer.
//!
//! A typed client for the CarbonWise emissions API, the per-page
//! dashboard logic built on it, and two front ends: a terminal CLI and a
//! small local web dashboard.

pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod diagnostics;
pub mod format;
pub mod web;

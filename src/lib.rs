//! Ficha intake and review server library.
//!
//! Tracks student clinical-placement records (fichas) through their
//! lifecycle: draft editing, submission, per-field and per-document review,
//! and finalization with a consolidated rejection report.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;

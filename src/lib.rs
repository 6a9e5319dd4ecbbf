//! # fresh-repos
//!
//! A small service that snapshots the public GitHub repositories created in
//! the last few minutes, enriches each with its per-language byte counts,
//! and serves filtered views of that snapshot over HTTP.
//!
//! ## Architecture
//!
//! ```text
//!        ┌──────────────────────┐
//!        │  GitHub search API   │  is:public created:<start>..<end>
//!        └──────────┬───────────┘
//!                   │ sequential pages (100 per page)
//!                   ▼
//!        ┌──────────────────────┐
//!        │  Collect candidates  │  skip empty language, dedupe,
//!        │                      │  stop at target or short page
//!        └──────────┬───────────┘
//!                   │
//!     ┌─────────────┼─────────────┐   semaphore-gated tasks,
//!     ▼             ▼             ▼   joined before continuing
//!  languages     languages     languages   (failure → empty map)
//!     └─────────────┼─────────────┘
//!                   ▼
//!        ┌──────────────────────┐
//!        │ Sort newest first +  │  any transform error aborts
//!        │ transform            │  the whole cycle
//!        └──────────┬───────────┘
//!                   ▼
//!        ┌──────────────────────┐        GET /api/search
//!        │   Snapshot cache     │ ◄───── read ─► filter ─► JSON
//!        │  (Arc swap publish)  │
//!        └──────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration (token, port, ingestion knobs)
//! - [`models`] - Raw GitHub payloads, cached `Repository` records, response types
//! - [`source`] - `RepositorySource` trait and the GitHub REST backend
//! - [`ingest`] - The ingestion cycle and the raw → cached transform
//! - [`cache`] - The single atomically replaced snapshot
//! - [`filter`] - Predicate parsing and matching for search requests
//! - [`api`] - Axum router and handlers for `/ping` and `/api/search`
//! - [`state`] - Shared application state
//! - [`error`] - Ingestion cycle failures

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod models;
pub mod source;
pub mod state;

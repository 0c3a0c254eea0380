//! # catx
//!
//! Export tooling for a category-taxonomy database: a 7-level category
//! hierarchy plus hard-logic word rules, soft-logic keywords, and free-text
//! explanations, serialized into a single JSON document.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────┐   ┌──────────────────┐
//! │ SchemaSource │──▶│ Path Assembler │──▶│ Document Builder │
//! │ Postgres /   │   │ rows → paths   │   │ sections + stats │
//! │ in-memory    │   └────────────────┘   └────────┬─────────┘
//! └──────────────┘                                 │
//!        ▲                                         ▼
//! ┌──────────────┐                          ┌─────────────┐
//! │  SSH tunnel  │                          │ JSON file   │
//! │  (optional)  │                          │ + summary   │
//! └──────────────┘                          └─────────────┘
//! ```
//!
//! Data flows one way: database rows are assembled into paths and records,
//! accumulated into an in-memory document, serialized once, and discarded.
//! Each run is a fresh connection and a fresh document; any failure aborts
//! the whole run rather than emitting a partial export.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration: database descriptor, tunnel, output |
//! | [`db`] | Postgres pool from an injected descriptor |
//! | [`error`] | Terminal error taxonomy with per-kind exit codes |
//! | [`models`] | Export document types |
//! | [`path`] | Pure path assembly (gap policies, depth) |
//! | [`schema`] | `SchemaSource` trait, Postgres and in-memory readers |
//! | [`export`] | Full export document builder and writer |
//! | [`sample`] | Lighter per-level + 3-level sample export |
//! | [`stats`] | Table row counts |
//! | [`check`] | Connectivity probe |
//! | [`tunnel`] | SSH port-forward management |
//! | [`progress`] | Stderr progress reporting (human/JSON/off) |

pub mod check;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod path;
pub mod progress;
pub mod sample;
pub mod schema;
pub mod stats;
pub mod tunnel;

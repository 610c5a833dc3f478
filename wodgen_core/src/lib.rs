#![forbid(unsafe_code)]

//! Core domain model and planning logic for the wodgen workout planner.
//!
//! This crate provides:
//! - Domain types (profiles, movements, history, plans)
//! - The built-in movement library
//! - Fatigue analysis, eligibility and scoring
//! - Session assembly and the plan engine
//! - Input loading and plan rendering

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod rng;
pub mod normalize;
pub mod library;
pub mod fatigue;
pub mod scoring;
pub mod assembler;
pub mod engine;
pub mod loader;
pub mod history;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use library::{get_default_library, MovementLibrary};
pub use normalize::normalize_profile;
pub use engine::{generate_plan, seed_for_date, PlanInputs};
pub use loader::{load_library, load_library_or_default, load_profile, DataPaths};
pub use history::load_history;
pub use render::{render, render_json, render_text, write_plan, OutputFormat};

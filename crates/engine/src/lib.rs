//! Dice Tally Engine library.
//!
//! Server-side code for tracking how often each face of a dice set comes up.
//!
//! ## Structure
//!
//! - `stores/` - In-memory tally state and debounced persistence
//! - `use_cases/` - User story orchestration
//! - `infrastructure/` - Ports, SQLite adapters, configuration
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

pub use app::App;

//! ProbRank Server
//!
//! HTTP front end for the prediction pipeline.
//!
//! `POST /predict` accepts a JSON object mapping instance ids to feature
//! objects and answers with the same ids, in the same order, each mapped to
//! its labels ranked by descending probability.
//!
//! Uses structured logging via [`tracing`]. Set `RUST_LOG` to control
//! verbosity (e.g. `RUST_LOG=probrank=debug`).

pub mod cli;
pub mod config;
pub mod routes;
pub mod state;

pub use cli::Cli;
pub use config::{LabelsSpec, ServerConfig};
pub use routes::{create_router, ApiError};
pub use state::AppState;

//! Trivia quiz server.
//!
//! Clients start a session, fetch questions one at a time, post answers, and
//! ask for a score summary. All state is held in memory for the lifetime of
//! the process.
//!
//! - [`question`] loads the read-only question bank.
//! - [`session`] owns live sessions: creation, scoring, and time-based
//!   eviction.
//! - [`api`] maps the JSON-over-HTTP protocol onto the session store.
//! - [`server`] binds the listener, runs the eviction sweeper, and handles
//!   shutdown.
//! - [`cli`] parses configuration from flags and the environment.
//! - [`error`] defines the error taxonomy and its HTTP rendering.

pub mod api;
pub mod cli;
pub mod error;
pub mod question;
pub mod server;
pub mod session;

//! gangplankd — the Gangplank scheduling daemon.
//!
//! Assembles the scheduler with standalone collaborators:
//! - Node inventory from the configuration file
//! - Pending units as JSON lines from a file or stdin
//! - Bindings and events recorded in the log
//! - Prometheus metrics over HTTP

pub mod collab;
pub mod daemon;
pub mod server;
pub mod units;

pub use collab::{LoggingBindSink, LoggingEventSink, StaticNodeSource};
pub use daemon::{Daemon, DaemonReport};
pub use server::{build_router, serve_metrics};
pub use units::{FeedStats, feed_units};

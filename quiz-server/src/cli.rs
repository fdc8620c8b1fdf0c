use std::{net::IpAddr, path::PathBuf, time::Duration};

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Serve a trivia quiz over HTTP", long_about = None)]
pub struct Cli {
    /// Address to bind the HTTP listener to.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on. Use 0 for an ephemeral port.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// JSON file with the question bank. Built-in questions are used when it
    /// is missing or invalid.
    #[arg(long, env = "QUIZ_QUESTIONS", default_value = "questions.json")]
    pub questions: PathBuf,

    /// Directory holding the browser client, served at `/`.
    #[arg(long, env = "QUIZ_STATIC_DIR", default_value = "public")]
    pub static_dir: PathBuf,

    /// Sessions older than this many seconds are evicted.
    #[arg(long, default_value_t = 3600)]
    pub session_ttl_secs: u64,

    /// Seconds between eviction sweeps.
    #[arg(long, default_value_t = 3600, value_parser = clap::value_parser!(u64).range(1..))]
    pub sweep_interval_secs: u64,

    /// Questions per quiz when the client does not ask for a specific count.
    #[arg(long, default_value_t = 10)]
    pub default_question_count: usize,
}

impl Cli {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

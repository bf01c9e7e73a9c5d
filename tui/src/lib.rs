//! Interactive terminal front end for the tag-exploration session.
//!
//! The event loop owns all user-visible state; fetches run as spawned tasks
//! that race their ticket's cancellation against the HTTP call and report
//! back over the app event channel.

use clap::Parser;
use tagscope_api_client::DEFAULT_API_BASE;

mod app;
mod app_event;
mod app_event_sender;
mod chart;
pub mod logging;
mod terminal;
mod views;

pub use app::run_main;

#[derive(Parser, Debug)]
#[command(
    name = "tagscope",
    about = "Explore tag correlations and post counts over time",
    version
)]
pub struct Cli {
    /// Base URL of the tag-exploration API.
    #[arg(long, env = "TAGSCOPE_API_URL", default_value = DEFAULT_API_BASE)]
    pub api_url: String,

    /// Start the session with this tag already committed.
    #[arg(long)]
    pub tag: Option<String>,

    /// Start from a shared-link query string, e.g. "tag=1girl".
    #[arg(long, conflicts_with = "tag")]
    pub link: Option<String>,
}

use std::time::Duration;

use clap::Parser;
use meal_map_lib::places::http::DEFAULT_BASE_URL;
use meal_map_lib::{Coordinate, SearchConfig, SessionConfig};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Meal Map - search a restaurant, pick it and see where the map lands
pub struct Settings {
    /// Text to type into the search box, one keystroke per character
    #[clap(short, long)]
    pub query: String,

    /// Index of the suggestion to pick
    #[clap(short, long, default_value = "0")]
    pub pick: usize,

    /// Simulated device latitude (omit to simulate a denied permission)
    #[clap(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Simulated device longitude
    #[clap(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Place search API key
    #[clap(long, env = "PLACES_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Place search API base URL
    #[clap(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Language hint for suggestions and details
    #[clap(long, default_value = "ko")]
    pub language: String,

    /// Quiet period after the last keystroke before searching
    #[clap(long, default_value = "300")]
    pub debounce_ms: u64,

    /// Shortest query (in characters) that is searched
    #[clap(long, default_value = "2")]
    pub min_query_chars: usize,

    /// Delay between simulated keystrokes
    #[clap(long, default_value = "80")]
    pub keystroke_ms: u64,

    /// Bound on the device location fetch
    #[clap(long, default_value = "6")]
    pub location_timeout_secs: u64,

    /// Span in degrees shown around the picked place
    #[clap(long, default_value = "0.008")]
    pub focus_span: f64,

    /// How long to wait for suggestions and for the picked place
    #[clap(long, default_value = "15")]
    pub wait_secs: u64,

    /// Pretty-print the JSON report
    #[clap(long, default_value = "false")]
    pub pretty: bool,
}

impl Settings {
    /// Parse the command line, exiting with usage on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// Engine configuration derived from the flags
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            search: SearchConfig {
                debounce: Duration::from_millis(self.debounce_ms),
                min_query_chars: self.min_query_chars,
                language: self.language.clone(),
            },
            location_timeout: Duration::from_secs(self.location_timeout_secs),
            focus_span: self.focus_span,
            ..SessionConfig::default()
        }
    }

    /// The simulated device position, if one was given
    pub fn device_position(&self) -> meal_map_lib::Result<Option<Coordinate>> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Coordinate::new(lat, lon).map(Some),
            _ => Ok(None),
        }
    }

    pub fn keystroke_delay(&self) -> Duration {
        Duration::from_millis(self.keystroke_ms)
    }

    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }
}

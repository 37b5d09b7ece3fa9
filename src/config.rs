//! Command-line / environment configuration

use clap::Parser;

/// Terminal client for the Waves music-library server.
#[derive(Debug, Parser)]
#[command(name = "waves", version, about)]
pub struct Cli {
    /// Base URL of the Waves server.
    #[arg(long, env = "WAVES_SERVER", default_value = "http://localhost:5000")]
    pub server: String,

    /// Account to log in as.
    #[arg(long, env = "WAVES_USERNAME")]
    pub username: String,

    /// Password; prompted interactively when unset.
    #[arg(long, env = "WAVES_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl Cli {
    /// Server URL without a trailing slash, ready for path concatenation.
    pub fn base_url(&self) -> String {
        self.server.trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_strips_trailing_slash() {
        let cli = Cli::parse_from(["waves", "--server", "http://host:5000/", "--username", "u"]);
        assert_eq!(cli.base_url(), "http://host:5000");
    }
}

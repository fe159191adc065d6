//! Runtime configuration.
//!
//! Every setting comes from a CLI flag with an environment fallback:
//!
//! | Flag              | Env                     | Default                     |
//! |-------------------|-------------------------|-----------------------------|
//! | `--service-url`   | `TAPECRAFT_SERVICE_URL` | `http://localhost:8000`     |
//! | `--library`       | `TAPECRAFT_LIBRARY`     | `tapecraft-templates.json`  |
//! | `--timeout-secs`  | `TAPECRAFT_TIMEOUT`     | none (transport default)    |
//! | `--listen`        |                         | `127.0.0.1:8080`            |
//! | `--poll-secs`     |                         | `30`                        |

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";
pub const DEFAULT_LIBRARY_PATH: &str = "tapecraft-templates.json";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_POLL_SECS: u64 = 30;

/// Settings shared by every command that talks to the print service or the
/// template library.
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// Base URL of the label print service
    #[arg(long, env = "TAPECRAFT_SERVICE_URL", default_value = DEFAULT_SERVICE_URL)]
    pub service_url: String,

    /// Saved-template library file
    #[arg(long, env = "TAPECRAFT_LIBRARY", default_value = DEFAULT_LIBRARY_PATH)]
    pub library: PathBuf,

    /// Request timeout in seconds for print service calls
    #[arg(long, env = "TAPECRAFT_TIMEOUT")]
    pub timeout_secs: Option<u64>,
}

impl Default for ServiceArgs {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            library: PathBuf::from(DEFAULT_LIBRARY_PATH),
            timeout_secs: None,
        }
    }
}

impl ServiceArgs {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    pub service: ServiceArgs,
    /// How often to poll the printer status endpoint.
    pub poll_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            service: ServiceArgs::default(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        service: ServiceArgs,
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = TestCli::parse_from([
            "tapecraft",
            "--service-url",
            "http://printer:9000",
            "--library",
            "/tmp/lib.json",
            "--timeout-secs",
            "5",
        ]);
        assert_eq!(cli.service.service_url, "http://printer:9000");
        assert_eq!(cli.service.library, PathBuf::from("/tmp/lib.json"));
        assert_eq!(cli.service.request_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let args = ServiceArgs {
            timeout_secs: Some(0),
            ..ServiceArgs::default()
        };
        assert_eq!(args.request_timeout(), None);
    }
}

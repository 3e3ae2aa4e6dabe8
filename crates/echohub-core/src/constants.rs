//! Application-wide constants
//!
//! Wire paths, envelope codes and fallbacks shared by the directory,
//! prober and aggregator.

/// Envelope `code` value hubs use to signal success
pub const SUCCESS_CODE: i64 = 1;

/// Probe endpoint, relative to a hub's base address
pub const CONNECT_PATH: &str = "/api/connect";

/// Paginated echo query endpoint, relative to a hub's base address
pub const ECHO_PAGE_PATH: &str = "/api/echo/page";

/// Prefix joined between a hub address and a local image path
pub const IMAGE_API_PREFIX: &str = "/api";

// Feed defaults
pub const DEFAULT_PAGE_SIZE: usize = 3;
pub const DEFAULT_FIRST_PAGE: u32 = 0;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Logo stamped on echoes whose hub reports an empty logo
pub const DEFAULT_LOGO: &str = "/favicon.ico";

/// Display name stamped on echoes whose hub reports an empty name
pub const DEFAULT_SERVER_NAME: &str = "Ech0";

/// Environment variable overriding the configured directory source
pub const DIRECTORY_SOURCE_ENV: &str = "ECHOHUB_DIRECTORY_SOURCE";

/// Environment variable enabling the debug file log
pub const LOG_FILE_ENV: &str = "ECHOHUB_LOG_FILE";

// Extension types carried in `extension_type`
pub mod extension_types {
    pub const MUSIC: &str = "MUSIC";
    pub const VIDEO: &str = "VIDEO";
    pub const GITHUB_PROJECT: &str = "GITHUBPROJ";
    pub const WEBSITE: &str = "WEBSITE";
}

//! Shared constants for the Aleph CLI.

/// Name of the optional project config file.
pub const CONFIG_FILE: &str = ".alephrc.toml";

/// Query endpoint used when neither flag, env nor config names one.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:7878/query";

/// Timeout for each SPARQL request, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Spinner tick interval in milliseconds.
pub const SPINNER_TICK_MS: u64 = 100;

/// Longest label shown in table cells before truncation.
pub const MAX_LABEL_WIDTH: usize = 40;

/// Defaults for `aleph sparql`.
pub const OXIGRAPH_BINARY: &str = "oxigraph";
pub const DEFAULT_SPARQL_PORT: u16 = 7878;
pub const DEFAULT_SPARQL_HOST: &str = "127.0.0.1";
pub const DEFAULT_DATA_DIR: &str = "./data/oxigraph";

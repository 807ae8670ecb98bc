//! Configuration for bufsync
//!
//! Centralized configuration with sensible defaults. Everything that used to
//! be a process-wide toggle (checksum verification, cross-origin headers)
//! lives here and is handed to the components that need it at startup.

/// Main configuration for a bufsync device
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Integrity Configuration
    // -------------------------------------------------------------------------
    /// Verify and produce Fletcher-16 checksums.
    /// When false every checksum computes to `NO_CHECKSUM` and is never compared.
    pub use_checksum: bool,

    // -------------------------------------------------------------------------
    // Request/Response Configuration
    // -------------------------------------------------------------------------
    /// Emit `Access-Control-*` headers on every reply
    pub allow_cross_origin: bool,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address for the streaming transport
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    /// Largest single fragment the transport codec accepts (in bytes)
    pub max_fragment_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_checksum: true,
            allow_cross_origin: false,
            listen_addr: "127.0.0.1:8080".to_string(),
            max_connections: 8,
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
            max_fragment_len: 64 * 1024, // 64 KB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Enable or disable checksum verification
    pub fn use_checksum(mut self, enabled: bool) -> Self {
        self.config.use_checksum = enabled;
        self
    }

    /// Enable or disable cross-origin reply headers
    pub fn allow_cross_origin(mut self, enabled: bool) -> Self {
        self.config.allow_cross_origin = enabled;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the largest accepted fragment (in bytes)
    pub fn max_fragment_len(mut self, len: usize) -> Self {
        self.config.max_fragment_len = len;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

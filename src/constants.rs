/// `tracing` targets used by pipeline stages and remote submitters.
pub mod targets {
    /// Record builder stage.
    pub const BUILDER: &str = "recordflow::record::builder";
    /// Configuration generator stage.
    pub const GENERATOR: &str = "recordflow::record::generator";
    /// Validator stage and validator implementations.
    pub const VALIDATOR: &str = "recordflow::record::validator";
    /// Model submission and result polling.
    pub const SUBMITTER: &str = "recordflow::record::submitter";
    /// Dataset upload and training control.
    pub const UPLOADER: &str = "recordflow::record::uploader";
}

/// Accessibility diagnostics written into unstructured data during validation.
pub mod access {
    /// The referenced data can be opened for reading.
    pub const OK: &str = "OK";
    /// A `file://` URI points at nothing.
    pub const FILE_MISSING: &str = "file missing";
    /// A `file://` URI points at a directory or other non-regular file.
    pub const NOT_A_FILE: &str = "not a file";
    /// Recorded for `http(s)://` URIs when the `http` feature is disabled.
    pub const HTTP_NOT_PROBED: &str = "not probed (http feature disabled)";
}

/// Required structured item names for geospatial datasets.
pub mod geospatial {
    /// Latitude field name.
    pub const LATITUDE: &str = "latitude";
    /// Longitude field name.
    pub const LONGITUDE: &str = "longitude";
}

/// Result polling defaults, in seconds.
pub mod polling {
    /// First backoff delay.
    pub const INITIAL_BACKOFF_SECS: u64 = 1;
    /// Largest backoff delay that is still slept; polling stops past it.
    pub const BACKOFF_CUTOFF_SECS: u64 = 64;
    /// Multiplier applied to the delay after every round.
    pub const BACKOFF_FACTOR: u32 = 2;
}

/// Record report layout.
pub mod format {
    /// Maximum rendered table width before the widest column is shrunk.
    pub const MAX_TABLE_WIDTH: usize = 132;
}

/// Deepest nesting allowed for temporal file contexts (a context plus one level of subcontexts).
pub const MAX_FILE_CONTEXT_DEPTH: usize = 1;

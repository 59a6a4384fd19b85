use thiserror::Error;

/// Core error type shared across vitalgen crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A field name outside the catalog was referenced.
    #[error("unknown field '{0}'")]
    UnknownField(String),
    /// A percentage token did not match `field=N%`.
    #[error("malformed specifier '{0}': expected <field>=<0-100>%")]
    MalformedSpecifier(String),
    /// A negative count was requested.
    #[error("invalid count {0}: must not be negative")]
    InvalidCount(i64),
    /// The catalog definition violates its invariants.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}

/// Convenience alias for results returned by vitalgen crates.
pub type Result<T> = std::result::Result<T, Error>;

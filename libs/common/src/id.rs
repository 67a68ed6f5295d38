use ulid::Ulid;

/// Generates a new ULID-based ID with the given prefix.
///
/// # Examples
/// ```
/// let id = bitacora_common::id::prefixed_ulid("req");
/// assert!(id.starts_with("req_"));
/// ```
pub fn prefixed_ulid(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new())
}

/// Marker trait for types that represent a prefixed ID.
pub trait PrefixedId {
    const PREFIX: &'static str;

    fn generate() -> String {
        prefixed_ulid(Self::PREFIX)
    }
}

/// Well-known ID prefixes.
pub mod prefix {
    /// Inbound HTTP request, echoed in `X-Request-Id`.
    pub const REQUEST: &str = "req";
    /// Invocation of the local CLI.
    pub const CLI: &str = "cli";
}

/// ID attached to every inbound request for log correlation.
pub struct RequestId;

impl PrefixedId for RequestId {
    const PREFIX: &'static str = prefix::REQUEST;
}

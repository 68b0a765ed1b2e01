//! HTTP cache control module
//!
//! Picks the `Cache-Control` value for a response from the class of path it served.

/// Cache control policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Short-lived: the index shell (fresh nonce every time) and `/config.json`
    /// (changes between deploys through the environment)
    Revalidate,
    /// Build artifacts whose file names never change within a build
    Immutable,
}

impl CachePolicy {
    /// Convert to Cache-Control header value
    pub const fn to_header_value(self) -> &'static str {
        match self {
            Self::Revalidate => "public, max-age: 60",
            Self::Immutable => "public, max-age: 604800, immutable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_policy() {
        assert_eq!(
            CachePolicy::Revalidate.to_header_value(),
            "public, max-age: 60"
        );
        assert_eq!(
            CachePolicy::Immutable.to_header_value(),
            "public, max-age: 604800, immutable"
        );
    }
}

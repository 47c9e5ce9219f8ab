//! Shared DTO types used across multiple endpoints.

use serde::Deserialize;

/// Query parameter for list endpoints (`?limit=`).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LimitParams {
    /// Maximum number of rows to return; endpoint-specific default,
    /// clamped to 100.
    pub limit: Option<usize>,
}

impl LimitParams {
    /// Resolves the effective limit against an endpoint default.
    #[must_use]
    pub fn resolve(&self, default: usize) -> usize {
        self.limit.unwrap_or(default).clamp(1, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_applies_default_and_clamp() {
        assert_eq!(LimitParams { limit: None }.resolve(20), 20);
        assert_eq!(LimitParams { limit: Some(5) }.resolve(20), 5);
        assert_eq!(LimitParams { limit: Some(0) }.resolve(20), 1);
        assert_eq!(LimitParams { limit: Some(5000) }.resolve(20), 100);
    }
}

use super::PaginationParams;

pub const DEFAULT_PAGE_LIMIT: u64 = 10;
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Normalize raw `limit`/`offset` query values.
///
/// A missing or non-positive limit falls back to [`DEFAULT_PAGE_LIMIT`] and is
/// capped at [`MAX_PAGE_LIMIT`]; a missing or negative offset becomes 0.
pub fn validate_pagination(limit: Option<i64>, offset: Option<i64>) -> PaginationParams {
    let limit = match limit {
        Some(l) if l > 0 => (l as u64).min(MAX_PAGE_LIMIT),
        _ => DEFAULT_PAGE_LIMIT,
    };
    let offset = match offset {
        Some(o) if o >= 0 => o as u64,
        _ => 0,
    };
    PaginationParams { limit, offset }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_missing() {
        let p = validate_pagination(None, None);
        assert_eq!(p, PaginationParams { limit: 10, offset: 0 });
    }

    #[test]
    fn rejects_non_positive_limit_and_negative_offset() {
        let p = validate_pagination(Some(0), Some(-3));
        assert_eq!(p, PaginationParams { limit: 10, offset: 0 });
        let p = validate_pagination(Some(-1), Some(7));
        assert_eq!(p, PaginationParams { limit: 10, offset: 7 });
    }

    #[test]
    fn caps_large_limit() {
        let p = validate_pagination(Some(5_000), Some(20));
        assert_eq!(p, PaginationParams { limit: 100, offset: 20 });
    }
}

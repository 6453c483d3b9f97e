/// Offset/limit window over an ordered collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    pub limit: u64,
    pub offset: u64,
}

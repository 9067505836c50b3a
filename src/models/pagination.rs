use serde::{Deserialize, Serialize};

const MAX_SKIP: u64 = i64::MAX as u64;

/// Normalized `page`/`limit` pair for offset pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Absent, non-numeric or non-positive values fall back to page 1 and
    /// `default_limit`; `limit` never exceeds `max_limit`. `page` is capped so
    /// that `skip()` still fits in the i64 the driver sends.
    pub fn from_query(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: u64,
        max_limit: u64,
    ) -> Self {
        let limit = parse_positive(limit)
            .unwrap_or(default_limit)
            .min(max_limit)
            .max(1);
        let max_page = MAX_SKIP / limit + 1;
        let page = parse_positive(page).unwrap_or(1).min(max_page);

        PageRequest { page, limit }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

fn parse_positive(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub total_users: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total_users: u64) -> Self {
        Pagination {
            page: request.page,
            limit: request.limit,
            total_pages: total_users.div_ceil(request.limit),
            total_users,
        }
    }
}

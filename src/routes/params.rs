use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

// Pagination fields are inlined rather than flattened: serde's query-string
// deserializer buffers flattened values as strings, which rejects the
// Option<i64> fields on a request like `?page=2`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ShowListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub emission_id: Option<Uuid>,
    pub status: Option<String>,
}

impl ShowListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_page_and_size() {
        let p = Pagination {
            page: Some(0),
            per_page: Some(1000),
        };
        assert_eq!(p.normalize(), (1, 100, 0));

        let p = Pagination {
            page: None,
            per_page: None,
        };
        assert_eq!(p.normalize(), (1, 20, 0));

        let p = Pagination {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(p.normalize(), (3, 10, 20));
    }

    #[test]
    fn show_list_query_accepts_page_params() {
        let uri: axum::http::Uri = "/api/shows?page=2&per_page=10&status=preparation"
            .parse()
            .unwrap();
        let axum::extract::Query(q) =
            axum::extract::Query::<ShowListQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(q.pagination().normalize(), (2, 10, 10));
        assert_eq!(q.status.as_deref(), Some("preparation"));
        assert!(q.emission_id.is_none());
    }
}

use serde::{Deserialize, Serialize};

use crate::constants::SUCCESS_CODE;
use crate::error::HubError;

/// `{code, msg, data}` wrapper every hub endpoint responds with
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the payload, turning a non-success code or missing data into
    /// `HubError::Rejected`
    pub fn into_data(self) -> Result<T, HubError> {
        if self.code != SUCCESS_CODE {
            return Err(HubError::Rejected {
                code: self.code,
                msg: self.msg,
            });
        }
        let code = self.code;
        self.data.ok_or_else(|| HubError::Rejected {
            code,
            msg: "response carried no data".to_string(),
        })
    }
}

/// Body of a paginated echo query
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page: u32,
    pub page_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct PaginationResult<T> {
    #[serde(default)]
    pub items: Option<Vec<T>>,
    #[serde(default)]
    pub total: u64,
}

impl<T> PaginationResult<T> {
    /// Items of the page; hubs send `null` for an empty page
    pub fn into_items(self) -> Vec<T> {
        self.items.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let resp: ApiResponse<Vec<String>> =
            serde_json::from_str(r#"{"code": 1, "msg": "ok", "data": ["a"]}"#).unwrap();
        assert_eq!(resp.into_data().unwrap(), vec!["a"]);
    }

    #[test]
    fn test_failure_code_is_rejected() {
        let resp: ApiResponse<Vec<String>> =
            serde_json::from_str(r#"{"code": 0, "msg": "nope", "data": null}"#).unwrap();
        match resp.into_data() {
            Err(HubError::Rejected { code, msg }) => {
                assert_eq!(code, 0);
                assert_eq!(msg, "nope");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_page_request_wire_shape() {
        let body = serde_json::to_value(PageRequest { page: 2, page_size: 3 }).unwrap();
        assert_eq!(body, serde_json::json!({"page": 2, "pageSize": 3}));
    }

    #[test]
    fn test_null_items_default() {
        let result: PaginationResult<u32> =
            serde_json::from_str(r#"{"items": null, "total": 0}"#).unwrap();
        assert!(result.into_items().is_empty());

        let result: PaginationResult<u32> = serde_json::from_str(r#"{"total": 0}"#).unwrap();
        assert_eq!(result.total, 0);
        assert!(result.into_items().is_empty());
    }
}

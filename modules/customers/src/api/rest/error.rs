use api_ingress::AppError;

use crate::domain::error::DomainError;

pub const CUSTOMER_NOT_FOUND: &str = "Customer not found";

pub const CREATE_FAILED: &str = "Failed to create customer";
pub const LIST_FAILED: &str = "Failed to get customers";
pub const GET_FAILED: &str = "Failed to get customer";
pub const CHECK_FAILED: &str = "Failed to check customer";
pub const UPDATE_FAILED: &str = "Failed to update customer";
pub const DELETE_FAILED: &str = "Failed to delete customer";

/// Maps a domain error to its HTTP form. `failure` is the message shown for
/// storage errors; their detail only goes to the log.
pub fn map_domain_error(error: DomainError, failure: &str) -> AppError {
    match error {
        DomainError::CustomerNotFound { .. } => AppError::NotFound(CUSTOMER_NOT_FOUND.to_owned()),
        DomainError::Validation { .. } => AppError::BadRequest(error.to_string()),
        DomainError::Database { .. } => AppError::internal(failure, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn statuses() {
        let cases = [
            (DomainError::customer_not_found("x"), StatusCode::NOT_FOUND),
            (
                DomainError::validation("email", "is required"),
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::database("timeout"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (domain, status) in cases {
            assert_eq!(map_domain_error(domain, GET_FAILED).status(), status);
        }
    }

    #[test]
    fn database_detail_stays_out_of_message() {
        let err = map_domain_error(DomainError::database("secret host 10.1.2.3"), UPDATE_FAILED);
        assert_eq!(err.to_string(), UPDATE_FAILED);
    }

    #[test]
    fn not_found_uses_fixed_message() {
        let err = map_domain_error(DomainError::customer_not_found("abc"), GET_FAILED);
        assert_eq!(err.to_string(), CUSTOMER_NOT_FOUND);
    }
}

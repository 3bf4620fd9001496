use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found with id: {0}")]
    NotFound(i64),

    #[error("{0}")]
    Validation(String),

    #[error("Total stock value exceeds the supported range")]
    StockValueOverflow,

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(_) => AppError::NotFound(err.to_string()),
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            ProductError::StockValueOverflow => AppError::InternalServerError(err.to_string()),
            ProductError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use sea_orm::ConnAcquireErr;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_not_found_message_names_the_id() {
        assert_eq!(
            ProductError::NotFound(42).to_string(),
            "Product not found with id: 42"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ProductError::NotFound(1).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ProductError::Validation("No property 'colour' found for sorting".into())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProductError::StockValueOverflow.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_database_errors_keep_their_kind() {
        let response = ProductError::from(DbErr::Custom("connection reset".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "DATABASE_ERROR");
        assert_eq!(body["message"], "Database error occurred");

        let response =
            ProductError::from(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout)).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["error"], "DATABASE_UNAVAILABLE");
    }
}

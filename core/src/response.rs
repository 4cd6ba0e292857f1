use axum::{Json, http::StatusCode, response::IntoResponse};

/// Response with a typed body per status code.
pub enum CoreResponse<T, N, I>
where
    T: serde::Serialize,
    N: serde::Serialize,
    I: serde::Serialize,
{
    Ok(T),
    NotFound(N),
    InternalServerError(I),
}

impl<T, N, I> IntoResponse for CoreResponse<T, N, I>
where
    T: serde::Serialize,
    N: serde::Serialize,
    I: serde::Serialize,
{
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Ok(data) => (StatusCode::OK, Json(data)).into_response(),
            Self::NotFound(error) => (StatusCode::NOT_FOUND, Json(error)).into_response(),
            Self::InternalServerError(error) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            }
        }
    }
}

/// Plain `{ "error": "..." }` body.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorBody { error: error.into() }
    }

    pub fn not_found() -> Self {
        ErrorBody::new("Not found")
    }

    pub fn internal() -> Self {
        ErrorBody::new("Internal server error")
    }
}

/// Fallback handler answering every unmatched request with 404.
pub async fn not_found() -> CoreResponse<(), ErrorBody, ()> {
    CoreResponse::NotFound(ErrorBody::not_found())
}

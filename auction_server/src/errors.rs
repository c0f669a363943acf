use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use auction_engine::{AuthApiError, BidFlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Payload deserialization error")]
    CouldNotDeserializePayload,
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Could not serialize access token. {0}")]
    CouldNotSerializeAccessToken(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Bid rejected. {0}")]
    BidRejected(String),
    #[error("The auction has already reached a final state. {0}")]
    AlreadyFinal(String),
    #[error("The auction is under heavy contention. Try again in a moment.")]
    Contention,
    #[error("A user with that name already exists")]
    UserAlreadyExists,
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::CouldNotDeserializePayload => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::BAD_REQUEST,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CouldNotSerializeAccessToken(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::BidRejected(_) => StatusCode::BAD_REQUEST,
            Self::AlreadyFinal(_) => StatusCode::CONFLICT,
            Self::Contention => StatusCode::SERVICE_UNAVAILABLE,
            Self::UserAlreadyExists => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("The username or password is incorrect.")]
    InvalidCredentials,
    #[error("Access token signature is invalid. {0}")]
    ValidationError(String),
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
}

impl From<BidFlowError> for ServerError {
    fn from(e: BidFlowError) -> Self {
        match e {
            BidFlowError::NotFound(id) => Self::NoRecordFound(format!("Auction {id} does not exist")),
            BidFlowError::Rejected(reason) => Self::BidRejected(reason.to_string()),
            BidFlowError::NotAuthorized => {
                Self::InsufficientPermissions("Only the auction owner may do that".to_string())
            },
            BidFlowError::AlreadyFinal => Self::AlreadyFinal(e.to_string()),
            BidFlowError::InvalidAuction(msg) => Self::InvalidRequestBody(msg),
            BidFlowError::Contention => Self::Contention,
            BidFlowError::Backend(msg) => Self::BackendError(msg),
        }
    }
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::InvalidCredentials => Self::AuthenticationError(AuthError::InvalidCredentials),
            AuthApiError::UserAlreadyExists(_) => Self::UserAlreadyExists,
            AuthApiError::InvalidUsername(name) => Self::InvalidRequestBody(format!("{name} is not a valid username")),
            AuthApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

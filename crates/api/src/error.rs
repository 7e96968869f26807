//! Error to response mapping.
//!
//! Every failing handler ends up here. The body is always
//! `{"error": "<CODE>", "message": "<text>"}`. Ledger failures keep their own
//! codes; everything else is expressed as an [`AppError`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use tracing::{debug, error};

use ifinance_core::auth::PasswordError;
use ifinance_core::ledger::LedgerError;
use ifinance_db::repositories::{
    CategoryError, GroupError, MasterAccountError, ReportRepositoryError, UserError,
};
use ifinance_shared::AppError;

/// Handler error.
#[derive(Debug)]
pub enum ApiError {
    /// Application error.
    App(AppError),
    /// Transaction engine failure.
    Ledger(LedgerError),
}

impl ApiError {
    /// 403 for callers lacking the admin role.
    #[must_use]
    pub fn admin_only() -> Self {
        Self::App(AppError::Forbidden(
            "Administrator role is required".to_string(),
        ))
    }

    fn parts(&self) -> (u16, &'static str, String) {
        match self {
            // Internal details stay in the log.
            Self::App(AppError::Internal(_)) => {
                (500, "INTERNAL_ERROR", "An error occurred".to_string())
            }
            Self::App(e) => (e.status_code(), e.error_code(), e.message().to_string()),
            Self::Ledger(e) => (e.http_status_code(), e.error_code(), e.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::App(e) => e.fmt(f),
            Self::Ledger(e) => e.fmt(f),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            debug!(error = %self, "Request rejected");
        }

        (
            status,
            Json(json!({
                "error": code,
                "message": message
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::App(AppError::Internal(err.to_string()))
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort => Self::App(AppError::Validation(err.to_string())),
            PasswordError::HashError(_) | PasswordError::InvalidHash => {
                Self::App(AppError::Internal(err.to_string()))
            }
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let message = err.to_string();
        Self::App(match err {
            UserError::NotFound(_) => AppError::NotFound(message),
            UserError::DuplicateUsername(_) => AppError::Conflict(message),
            UserError::EmailRequired | UserError::MissingField(_) => AppError::Validation(message),
            UserError::Database(_) => AppError::Internal(message),
        })
    }
}

impl From<CategoryError> for ApiError {
    fn from(err: CategoryError) -> Self {
        let message = err.to_string();
        Self::App(match err {
            CategoryError::NotFound(_) => AppError::NotFound(message),
            CategoryError::DuplicateName(_) => AppError::Conflict(message),
            CategoryError::InUse(_) | CategoryError::Invalid(_) => AppError::Validation(message),
            CategoryError::Database(_) => AppError::Internal(message),
        })
    }
}

impl From<GroupError> for ApiError {
    fn from(err: GroupError) -> Self {
        let message = err.to_string();
        Self::App(match err {
            GroupError::NotFound(_)
            | GroupError::CategoryNotFound(_)
            | GroupError::ParentNotFound(_) => AppError::NotFound(message),
            GroupError::DuplicateName(_) => AppError::Conflict(message),
            GroupError::HasAccounts(_) | GroupError::HasChildren(_) | GroupError::Invalid(_) => {
                AppError::Validation(message)
            }
            GroupError::Database(_) => AppError::Internal(message),
        })
    }
}

impl From<MasterAccountError> for ApiError {
    fn from(err: MasterAccountError) -> Self {
        let message = err.to_string();
        Self::App(match err {
            MasterAccountError::NotFound(_) => AppError::NotFound(message),
            MasterAccountError::GroupNotOwned(_) => AppError::Forbidden(message),
            MasterAccountError::HasLines(_) | MasterAccountError::Invalid(_) => {
                AppError::Validation(message)
            }
            MasterAccountError::Database(_) => AppError::Internal(message),
        })
    }
}

impl From<ReportRepositoryError> for ApiError {
    fn from(err: ReportRepositoryError) -> Self {
        match err {
            ReportRepositoryError::Report(e) => Self::App(e.into()),
            ReportRepositoryError::Database(e) => e.into(),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String, Option<serde_json::Value>),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into(), None)
    }

    /// 400 with a structured detail payload (e.g. the offending product on
    /// an insufficient-stock rejection).
    pub fn bad_request_with_details(
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::BadRequest(message.into(), Some(details))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(message, _) => message.as_str(),
            Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::Internal(message) => message.as_str(),
        }
    }

    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            Self::BadRequest(_, details) => details.as_ref(),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

impl From<crate::db::dao::DaoLayerError> for AppError {
    fn from(err: crate::db::dao::DaoLayerError) -> Self {
        match err {
            crate::db::dao::DaoLayerError::NotFound { .. } => {
                AppError::not_found(err.to_string())
            }
            crate::db::dao::DaoLayerError::InvalidPagination { .. } => {
                AppError::bad_request(err.to_string())
            }
            crate::db::dao::DaoLayerError::Db(_) => AppError::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn message_is_preserved_across_variants() {
        assert_eq!(AppError::bad_request("nope").message(), "nope");
        assert_eq!(AppError::conflict("dup").message(), "dup");
        assert!(AppError::bad_request("nope").details().is_none());
    }

    #[test]
    fn propagates_through_anyhow() {
        fn boot_step() -> Result<(), AppError> {
            Err(AppError::internal("boom"))
        }
        let result: anyhow::Result<()> = (|| {
            boot_step()?;
            Ok(())
        })();
        assert_eq!(result.unwrap_err().to_string(), "boom");
    }

    #[test]
    fn bad_request_can_carry_details() {
        let err = AppError::bad_request_with_details(
            "Insufficient stock",
            serde_json::json!({ "availableStock": 2 }),
        );
        assert_eq!(err.message(), "Insufficient stock");
        assert_eq!(err.details().unwrap()["availableStock"], 2);
    }
}

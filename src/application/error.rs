use thiserror::Error;

use crate::{
    application::{query::QueryError, repos::RepoError},
    domain::{error::DomainError, slug::SlugError},
    infra::error::InfraError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("{entity} `{key}` not found")]
    NotFound { entity: &'static str, key: String },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::NotFound { .. } | AppError::Repo(RepoError::NotFound { .. })
        )
    }

    /// Rejected caller input, including writes the store refuses.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::Domain(DomainError::Invariant { .. })
                | AppError::Repo(
                    RepoError::Duplicate { .. }
                        | RepoError::Domain(DomainError::Invariant { .. })
                        | RepoError::Slug(
                            SlugError::EmptyInput
                                | SlugError::Unrepresentable { .. }
                                | SlugError::Invalid { .. }
                        )
                )
        )
    }

    /// Process exit code reported by the command-line front end.
    pub fn exit_code(&self) -> i32 {
        if self.is_validation() {
            2
        } else if self.is_not_found() {
            3
        } else {
            1
        }
    }
}

impl From<QueryError> for AppError {
    fn from(error: QueryError) -> Self {
        match error {
            QueryError::Validation(message) => AppError::Validation(message),
            QueryError::Source(err) => AppError::Repo(err),
            QueryError::Key(err) => AppError::unexpected(format!("cache key derivation: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_validation_maps_to_validation() {
        let error = AppError::from(QueryError::validation("page must be at least 1"));
        assert!(error.is_validation());
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn rejected_writes_exit_as_invalid_input() {
        let duplicate = AppError::from(RepoError::Duplicate {
            entity: "post",
            field: "slug",
            value: "hello".to_string(),
        });
        let bad_slug = AppError::from(RepoError::from(SlugError::Invalid {
            slug: "Hello World".to_string(),
        }));
        let transition = AppError::from(RepoError::from(DomainError::invariant(
            "post `hello` is archived and cannot be republished",
        )));

        for error in [duplicate, bad_slug, transition] {
            assert!(error.is_validation(), "{error}");
            assert_eq!(error.exit_code(), 2);
        }
    }

    #[test]
    fn exhausted_slug_space_is_not_caller_input() {
        let error = AppError::from(RepoError::from(SlugError::Exhausted {
            base: "hello".to_string(),
        }));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn repo_not_found_is_reported_as_not_found() {
        let error = AppError::from(RepoError::not_found("post", "missing"));
        assert!(error.is_not_found());
        assert_eq!(error.exit_code(), 3);
    }
}

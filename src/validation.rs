use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use chrono::{NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::{ApiError, FieldError};

/// `YYYY-MM-DD`, the only date format the API accepts.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| {
            ValidationError::new("date").with_message(Cow::Borrowed("Data inválida (use AAAA-MM-DD)"))
        })
}

pub fn validate_time(value: &str) -> Result<(), ValidationError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map(|_| ())
        .map_err(|_| {
            ValidationError::new("time").with_message(Cow::Borrowed("Horário inválido (use HH:MM)"))
        })
}

/// Page content keys: lowercase ASCII letters, digits and dashes.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 100
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// field_errors
///
/// Flattens `validator`'s nested report into `{path, message}` pairs, sorted by
/// path. Nested structs are joined with `.`, list items with `[i]`.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect(None, errors, &mut out);
    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}

fn collect(prefix: Option<&str>, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|e| FieldError::new(path.clone(), message_for(e))));
            }
            ValidationErrorsKind::Struct(inner) => collect(Some(&path), inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(Some(&format!("{path}[{index}]")), inner, out);
                }
            }
        }
    }
}

fn message_for(error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => match error.code.as_ref() {
            "required" => "Campo obrigatório".to_string(),
            "email" => "Email inválido".to_string(),
            "url" => "URL inválida".to_string(),
            code => format!("Valor inválido ({code})"),
        },
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(field_errors(&errors))
    }
}

/// ValidatedJson
///
/// JSON body extractor that runs `Validate` before the handler sees the value.
/// Malformed JSON and rule violations both become `ApiError::Validation`, so
/// nothing reaches storage unless the whole payload is valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::field("body", rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string extractor reporting failures in the uniform error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::field("query", rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Path extractor reporting failures (e.g. a malformed UUID) in the uniform error body.
#[derive(Debug, Clone, Copy)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::field("path", rejection.body_text()))?;
        Ok(Self(value))
    }
}

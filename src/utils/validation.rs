use crate::error::{AppError, FieldError};

/// Collects field checks for a request body and reports them all at once.
///
/// ```ignore
/// let mut v = Validator::default();
/// v.length("title", &req.title, 1, 32, "Title must be at most 32 characters");
/// v.finish()?;
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    /// Record `message` against `field` unless `ok` holds.
    pub fn check(&mut self, field: &str, ok: bool, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError {
                field: field.to_string(),
                message: message.to_string(),
            });
        }
        self
    }

    /// Non-blank after trimming.
    pub fn required(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        self.check(field, !value.trim().is_empty(), message)
    }

    /// Trimmed character count within `min..=max`.
    pub fn length(
        &mut self,
        field: &str,
        value: &str,
        min: usize,
        max: usize,
        message: &str,
    ) -> &mut Self {
        let n = value.trim().chars().count();
        self.check(field, (min..=max).contains(&n), message)
    }

    /// Trimmed character count of at least `min`.
    pub fn min_length(&mut self, field: &str, value: &str, min: usize, message: &str) -> &mut Self {
        self.check(field, value.trim().chars().count() >= min, message)
    }

    pub fn email(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        self.check(field, is_email(value), message)
    }

    pub fn not_empty<T>(&mut self, field: &str, values: &[T], message: &str) -> &mut Self {
        self.check(field, !values.is_empty(), message)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// # Errors
    ///
    /// Returns [`AppError::Validation`] listing every failed check.
    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// Loose address check: one `@`, a non-empty local part, a dotted domain, no whitespace.
#[must_use]
pub fn is_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

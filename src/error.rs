// ⚠️ Input Validation Errors
// The only failure class in the generator: bad form input.
// Everything downstream of a validated BirthRecord is total.

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// FORM FIELDS
// ============================================================================

/// Form field an error is attached to (for inline messages)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    BirthDate,
    BirthTime,
    Latitude,
    Longitude,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Name,
        FormField::BirthDate,
        FormField::BirthTime,
        FormField::Latitude,
        FormField::Longitude,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::BirthDate => "Birth Date (YYYY-MM-DD)",
            FormField::BirthTime => "Birth Time (HH:MM)",
            FormField::Latitude => "Latitude (° N)",
            FormField::Longitude => "Longitude (° E)",
        }
    }
}

// ============================================================================
// VALIDATION ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputValidationError {
    #[error("Name must not be empty")]
    EmptyName,

    #[error("Could not read birth date '{input}' (expected YYYY-MM-DD)")]
    UnparsableDate { input: String },

    #[error("Birth year {year} is outside {min}-{max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },

    #[error("Could not read birth time '{input}' (expected HH:MM)")]
    UnparsableTime { input: String },

    #[error("Could not read {field:?} '{input}' as a number")]
    UnparsableCoordinate { field: FormField, input: String },

    #[error("{field:?} must be a finite number")]
    NonFiniteCoordinate { field: FormField },

    #[error("Latitude {value} is outside -90..90")]
    LatitudeOutOfRange { value: f64 },

    #[error("Longitude {value} is outside -180..180")]
    LongitudeOutOfRange { value: f64 },
}

impl InputValidationError {
    /// Which form field should display this message
    pub fn field(&self) -> FormField {
        match self {
            InputValidationError::EmptyName => FormField::Name,
            InputValidationError::UnparsableDate { .. } => FormField::BirthDate,
            InputValidationError::YearOutOfRange { .. } => FormField::BirthDate,
            InputValidationError::UnparsableTime { .. } => FormField::BirthTime,
            InputValidationError::UnparsableCoordinate { field, .. } => *field,
            InputValidationError::NonFiniteCoordinate { field } => *field,
            InputValidationError::LatitudeOutOfRange { .. } => FormField::Latitude,
            InputValidationError::LongitudeOutOfRange { .. } => FormField::Longitude,
        }
    }
}

/// Serializable view of a validation error for API responses
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

impl From<&InputValidationError> for FieldError {
    fn from(err: &InputValidationError) -> Self {
        FieldError {
            field: err.field(),
            message: err.to_string(),
        }
    }
}

/// Result of validating a whole form: every failing rule is reported
pub type ValidationResult<T> = Result<T, Vec<InputValidationError>>;

// 🎂 Birth Record - the single input to the generator
// BirthForm is raw user input; BirthRecord only exists once validated.

use crate::error::{FormField, InputValidationError, ValidationResult};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MIN_BIRTH_YEAR: i32 = 1900;
pub const MAX_BIRTH_YEAR: i32 = 2100;

// ============================================================================
// BIRTH FORM (raw input)
// ============================================================================

/// Raw form input, every field as typed by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BirthForm {
    pub name: String,
    pub birth_date: String,
    pub birth_time: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for BirthForm {
    fn default() -> Self {
        BirthForm {
            name: "Mahan H R Gowda".to_string(),
            birth_date: "1993-07-12".to_string(),
            birth_time: "12:26".to_string(),
            latitude: "13.32".to_string(),
            longitude: "75.77".to_string(),
        }
    }
}

impl BirthForm {
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::BirthDate => &self.birth_date,
            FormField::BirthTime => &self.birth_time,
            FormField::Latitude => &self.latitude,
            FormField::Longitude => &self.longitude,
        }
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::BirthDate => &mut self.birth_date,
            FormField::BirthTime => &mut self.birth_time,
            FormField::Latitude => &mut self.latitude,
            FormField::Longitude => &mut self.longitude,
        }
    }

    /// Validate every field, collecting all errors rather than stopping at the first
    pub fn validate(&self) -> ValidationResult<BirthRecord> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(InputValidationError::EmptyName);
        }

        let date = match NaiveDate::parse_from_str(self.birth_date.trim(), "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                errors.push(InputValidationError::UnparsableDate {
                    input: self.birth_date.clone(),
                });
                None
            }
        };

        let time = match parse_time(self.birth_time.trim()) {
            Some(time) => Some(time),
            None => {
                errors.push(InputValidationError::UnparsableTime {
                    input: self.birth_time.clone(),
                });
                None
            }
        };

        let latitude = parse_coordinate(&self.latitude, FormField::Latitude, &mut errors);
        let longitude = parse_coordinate(&self.longitude, FormField::Longitude, &mut errors);

        match (date, time, latitude, longitude) {
            (Some(date), Some(time), Some(latitude), Some(longitude)) if errors.is_empty() => {
                BirthRecord::new(name, date, time, latitude, longitude)
            }
            (Some(date), _, latitude, longitude) => {
                // Surface range errors alongside parse errors
                errors.extend(check_ranges(date, latitude, longitude));
                debug!(count = errors.len(), "birth form rejected");
                Err(errors)
            }
            (None, _, latitude, longitude) => {
                errors.extend(check_coordinate_ranges(latitude, longitude));
                debug!(count = errors.len(), "birth form rejected");
                Err(errors)
            }
        }
    }
}

fn parse_time(input: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(input, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
        .ok()
}

fn parse_coordinate(
    input: &str,
    field: FormField,
    errors: &mut Vec<InputValidationError>,
) -> Option<f64> {
    match input.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        Ok(_) => {
            errors.push(InputValidationError::NonFiniteCoordinate { field });
            None
        }
        Err(_) => {
            errors.push(InputValidationError::UnparsableCoordinate {
                field,
                input: input.to_string(),
            });
            None
        }
    }
}

fn check_ranges(
    date: NaiveDate,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Vec<InputValidationError> {
    let mut errors = Vec::new();
    if !(MIN_BIRTH_YEAR..=MAX_BIRTH_YEAR).contains(&date.year()) {
        errors.push(InputValidationError::YearOutOfRange {
            year: date.year(),
            min: MIN_BIRTH_YEAR,
            max: MAX_BIRTH_YEAR,
        });
    }
    errors.extend(check_coordinate_ranges(latitude, longitude));
    errors
}

fn check_coordinate_ranges(latitude: Option<f64>, longitude: Option<f64>) -> Vec<InputValidationError> {
    let mut errors = Vec::new();
    if let Some(value) = latitude {
        if !(-90.0..=90.0).contains(&value) {
            errors.push(InputValidationError::LatitudeOutOfRange { value });
        }
    }
    if let Some(value) = longitude {
        if !(-180.0..=180.0).contains(&value) {
            errors.push(InputValidationError::LongitudeOutOfRange { value });
        }
    }
    errors
}

// ============================================================================
// BIRTH RECORD (validated)
// ============================================================================

/// Validated birth details; immutable once built
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BirthRecord {
    name: String,
    birth_date: NaiveDate,
    birth_time: NaiveTime,
    latitude: f64,
    longitude: f64,
}

impl BirthRecord {
    /// Build a record from typed values. Seconds on `birth_time` are snapped
    /// down to the minute.
    pub fn new(
        name: &str,
        birth_date: NaiveDate,
        birth_time: NaiveTime,
        latitude: f64,
        longitude: f64,
    ) -> ValidationResult<Self> {
        let mut errors = Vec::new();

        let name = name.trim();
        if name.is_empty() {
            errors.push(InputValidationError::EmptyName);
        }
        for (value, field) in [(latitude, FormField::Latitude), (longitude, FormField::Longitude)] {
            if !value.is_finite() {
                errors.push(InputValidationError::NonFiniteCoordinate { field });
            }
        }
        let finite = |v: f64| if v.is_finite() { Some(v) } else { None };
        errors.extend(check_ranges(birth_date, finite(latitude), finite(longitude)));

        if !errors.is_empty() {
            debug!(count = errors.len(), "birth record rejected");
            return Err(errors);
        }

        Ok(BirthRecord {
            name: name.to_string(),
            birth_date,
            birth_time: snap_to_minute(birth_time),
            latitude,
            longitude,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// First word of the name, used for greetings
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    pub fn birth_time(&self) -> NaiveTime {
        self.birth_time
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Civil date and time, no timezone applied
    pub fn birth_datetime(&self) -> NaiveDateTime {
        self.birth_date.and_time(self.birth_time)
    }

    /// Seed for chat flavor when none is configured
    pub fn default_flavor_seed(&self) -> u64 {
        let d = self.birth_date;
        let t = self.birth_time;
        (d.day() + d.month() + t.hour() + t.minute()) as u64 + d.year() as u64
    }

    /// Back to a form, e.g. to pre-fill the UI after a reading
    pub fn to_form(&self) -> BirthForm {
        BirthForm {
            name: self.name.clone(),
            birth_date: self.birth_date.format("%Y-%m-%d").to_string(),
            birth_time: self.birth_time.format("%H:%M").to_string(),
            latitude: self.latitude.to_string(),
            longitude: self.longitude.to_string(),
        }
    }
}

/// Drop seconds and sub-seconds: the form works in 60-second steps
pub fn snap_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

// ============================================================================
// TESTS
// ============================================================================

//! Field-level validation for the data-entry forms.
//!
//! A form with errors never produces a payload, so an invalid submission
//! costs no network round-trip. Fields hidden by the form's conditional
//! rules are left out of the payload instead of being reported.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::LazyLock;

static VIN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-HJ-NPR-Z0-9]{17}$").expect("valid VIN pattern"));
static PLATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| {
        Regex::new(r"^[A-Z0-9][A-Z0-9 -]{0,8}[A-Z0-9]$").expect("valid plate pattern")
    });
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

/// Trailers above this weight need their own brakes.
pub const BRAKES_REQUIRED_GVWR_LBS: u32 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect::<Vec<String>>()
            .join("; ");
        f.write_str(&joined)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrailerType {
    #[default]
    Utility,
    Enclosed,
    Flatbed,
    Dump,
    Boat,
    Rv,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrailerForm {
    pub name: String,
    pub trailer_type: TrailerType,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub gvwr_lbs: Option<u32>,
    pub length_ft: Option<f64>,
    pub hitch_type: Option<String>,
    pub brake_type: Option<String>,
    pub fresh_water_gal: Option<u32>,
    pub propane_lbs: Option<u32>,
    pub notes: Option<String>,
}

impl TrailerForm {
    pub fn brakes_required(&self) -> bool {
        self.gvwr_lbs
            .is_some_and(|gvwr| gvwr >= BRAKES_REQUIRED_GVWR_LBS)
    }

    pub fn shows_rv_fields(&self) -> bool {
        self.trailer_type == TrailerType::Rv
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.name.trim().is_empty() {
            errors.push("name", "Name is required");
        }
        if let Some(vin) = non_blank(&self.vin) {
            if !VIN_PATTERN.is_match(&vin.to_uppercase()) {
                errors.push("vin", "VIN must be 17 characters without I, O or Q");
            }
        }
        if let Some(plate) = non_blank(&self.license_plate) {
            if !PLATE_PATTERN.is_match(&plate.to_uppercase()) {
                errors.push("licensePlate", "License plate is not valid");
            }
        }
        if self.gvwr_lbs == Some(0) {
            errors.push("gvwrLbs", "GVWR must be greater than zero");
        }
        if let Some(length) = self.length_ft {
            if !(length > 0.0 && length.is_finite()) {
                errors.push("lengthFt", "Length must be greater than zero");
            }
        }
        if self.brakes_required() && non_blank(&self.brake_type).is_none() {
            errors.push(
                "brakeType",
                format!("Brake type is required at {} lbs GVWR and above", BRAKES_REQUIRED_GVWR_LBS),
            );
        }
        errors.into_result()
    }

    /// Validated JSON body for `POST`/`PATCH /api/v1/fleet/trailers`.
    pub fn to_payload(&self) -> Result<Value, FieldErrors> {
        self.validate()?;
        let mut payload = Map::new();
        payload.insert("name".to_string(), Value::from(self.name.trim()));
        payload.insert(
            "trailerType".to_string(),
            serde_json::to_value(self.trailer_type).unwrap_or(Value::Null),
        );
        insert_text(&mut payload, "vin", self.vin.as_ref().map(|v| v.to_uppercase()));
        insert_text(
            &mut payload,
            "licensePlate",
            self.license_plate.as_ref().map(|v| v.to_uppercase()),
        );
        if let Some(gvwr) = self.gvwr_lbs {
            payload.insert("gvwrLbs".to_string(), Value::from(gvwr));
        }
        if let Some(length) = self.length_ft {
            payload.insert("lengthFt".to_string(), Value::from(length));
        }
        insert_text(&mut payload, "hitchType", self.hitch_type.clone());
        if self.brakes_required() {
            insert_text(&mut payload, "brakeType", self.brake_type.clone());
        }
        if self.shows_rv_fields() {
            if let Some(water) = self.fresh_water_gal {
                payload.insert("freshWaterGal".to_string(), Value::from(water));
            }
            if let Some(propane) = self.propane_lbs {
                payload.insert("propaneLbs".to_string(), Value::from(propane));
            }
        }
        insert_text(&mut payload, "notes", self.notes.clone());
        Ok(Value::Object(payload))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingForm {
    pub property_id: String,
    pub spot_id: String,
    pub guest_name: String,
    pub guest_email: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub provider_ids: Vec<String>,
}

impl BookingForm {
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.spot_id.trim().is_empty() {
            errors.push("spotId", "Choose a spot");
        }
        if self.guest_name.trim().is_empty() {
            errors.push("guestName", "Guest name is required");
        }
        if !EMAIL_PATTERN.is_match(self.guest_email.trim()) {
            errors.push("guestEmail", "Enter a valid email address");
        }
        if self.nights() < 1 {
            errors.push("checkOut", "Check-out must be after check-in");
        }
        errors.into_result()
    }

    /// Validated JSON body for `POST /api/staging/bookings`.
    pub fn to_payload(&self) -> Result<Value, FieldErrors> {
        self.validate()?;
        Ok(serde_json::json!({
            "propertyId": self.property_id,
            "spotId": self.spot_id,
            "guestName": self.guest_name.trim(),
            "guestEmail": self.guest_email.trim(),
            "checkIn": self.check_in.format("%Y-%m-%d").to_string(),
            "checkOut": self.check_out.format("%Y-%m-%d").to_string(),
            "providerIds": self.provider_ids,
        }))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn insert_text(payload: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(text) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        payload.insert(key.to_string(), Value::from(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trailer() -> TrailerForm {
        TrailerForm {
            name: "Flatbed 2".to_string(),
            trailer_type: TrailerType::Flatbed,
            vin: Some("1FUJA6CK14LM94383".to_string()),
            license_plate: Some("ab 1234".to_string()),
            gvwr_lbs: Some(2500),
            length_ft: Some(16.0),
            ..TrailerForm::default()
        }
    }

    fn booking() -> BookingForm {
        BookingForm {
            property_id: "p-1".to_string(),
            spot_id: "s-4".to_string(),
            guest_name: "Robin Vale".to_string(),
            guest_email: "robin@example.com".to_string(),
            check_in: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 7, 4).unwrap(),
            provider_ids: vec![],
        }
    }

    #[test]
    fn valid_trailer_passes() {
        assert_eq!(trailer().validate(), Ok(()));
    }

    #[test]
    fn missing_name_and_bad_vin_are_field_errors() {
        let form = TrailerForm {
            name: "  ".to_string(),
            vin: Some("1FUJA6CK14LM9438O".to_string()),
            ..trailer()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.for_field("name").is_some());
        assert!(errors.for_field("vin").is_some());
        assert_eq!(errors.0.len(), 2);
    }

    #[test]
    fn heavy_trailer_requires_brakes() {
        let form = TrailerForm {
            gvwr_lbs: Some(7000),
            ..trailer()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.for_field("brakeType").is_some());

        let braked = TrailerForm {
            brake_type: Some("electric".to_string()),
            ..form
        };
        assert_eq!(braked.validate(), Ok(()));
    }

    #[test]
    fn hidden_rv_fields_are_dropped_from_payload() {
        let form = TrailerForm {
            fresh_water_gal: Some(40),
            ..trailer()
        };
        let payload = form.to_payload().unwrap();
        assert!(payload.get("freshWaterGal").is_none());
        assert_eq!(payload["licensePlate"], "AB 1234");

        let rv = TrailerForm {
            trailer_type: TrailerType::Rv,
            ..form
        };
        assert_eq!(rv.to_payload().unwrap()["freshWaterGal"], 40);
    }

    #[test]
    fn booking_requires_checkout_after_checkin() {
        let form = BookingForm {
            check_out: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            ..booking()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.for_field("checkOut"),
            Some("Check-out must be after check-in")
        );
    }

    #[test]
    fn booking_payload_uses_iso_dates() {
        let payload = booking().to_payload().unwrap();
        assert_eq!(payload["checkIn"], "2026-07-01");
        assert_eq!(payload["checkOut"], "2026-07-04");
        assert_eq!(booking().nights(), 3);
    }
}

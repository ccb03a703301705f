//! The patient feature vector.
//!
//! The classifier consumes ten measurements positionally. [`FEATURE_NAMES`]
//! fixes both the JSON keys accepted on the wire and the column order the
//! scaler and model were fitted on.

use serde::Serialize;
use serde_json::Value;

use crate::{DiabetestError, Result};

/// Number of measurements in a patient record.
pub const NUM_FEATURES: usize = 10;

/// JSON keys in model column order.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "Pregnancies",
    "Glucose",
    "BloodPressure",
    "SkinThickness",
    "Insulin",
    "BMI",
    "DPF",
    "Age",
    "HrsSleep",
    "Cholesterol",
];

/// Ten clinical measurements for one patient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatientRecord {
    #[serde(rename = "Pregnancies")]
    pub pregnancies: f64,
    #[serde(rename = "Glucose")]
    pub glucose: f64,
    #[serde(rename = "BloodPressure")]
    pub blood_pressure: f64,
    #[serde(rename = "SkinThickness")]
    pub skin_thickness: f64,
    #[serde(rename = "Insulin")]
    pub insulin: f64,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    #[serde(rename = "DPF")]
    pub dpf: f64,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "HrsSleep")]
    pub hrs_sleep: f64,
    #[serde(rename = "Cholesterol")]
    pub cholesterol: f64,
}

impl PatientRecord {
    /// Fixed-order input vector for the scaler.
    pub fn to_vector(&self) -> [f64; NUM_FEATURES] {
        [
            self.pregnancies,
            self.glucose,
            self.blood_pressure,
            self.skin_thickness,
            self.insulin,
            self.bmi,
            self.dpf,
            self.age,
            self.hrs_sleep,
            self.cholesterol,
        ]
    }

    /// Inverse of [`to_vector`](Self::to_vector).
    pub fn from_vector(v: [f64; NUM_FEATURES]) -> Self {
        Self {
            pregnancies: v[0],
            glucose: v[1],
            blood_pressure: v[2],
            skin_thickness: v[3],
            insulin: v[4],
            bmi: v[5],
            dpf: v[6],
            age: v[7],
            hrs_sleep: v[8],
            cholesterol: v[9],
        }
    }

    /// Extract a record from a JSON object.
    ///
    /// Each field may be a JSON number or a numeric string (browser forms
    /// post `"5"` rather than `5`). `null` counts as missing. Fields are
    /// checked in column order, so the first offending one is reported.
    pub fn from_json(body: &Value) -> Result<Self> {
        let obj = body
            .as_object()
            .ok_or_else(|| DiabetestError::NotAnObject(body.to_string()))?;

        let mut v = [0.0; NUM_FEATURES];
        for (slot, &name) in v.iter_mut().zip(FEATURE_NAMES.iter()) {
            *slot = match obj.get(name) {
                None | Some(Value::Null) => return Err(DiabetestError::MissingField(name)),
                Some(value) => parse_measurement(name, value)?,
            };
        }
        Ok(Self::from_vector(v))
    }
}

fn parse_measurement(field: &'static str, value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(x) if x.is_finite() => Ok(x),
        _ => Err(DiabetestError::NonNumeric {
            field,
            value: value.to_string(),
        }),
    }
}

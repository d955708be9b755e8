//! Domain layer: Core business types and logic.
//!
//! Pure Rust types with no I/O. Patient fields are validated value objects;
//! assessment results are immutable once built.

mod assessment;
mod patient;

pub use assessment::{
    GaugeBand, GaugeSpec, Rgb, RiskResult, RiskVerdict, ThresholdMarker, GAUGE_BANDS,
    HIGH_RISK_THRESHOLD,
};
pub use patient::{
    Age, ChestPainType, FeatureVector, FieldError, FieldId, MajorVessels, MaxHeartRate, Oldpeak,
    PatientRecord, RestingBloodPressure, RestingEcg, SerumCholesterol, Sex, StSlope, Thalassemia,
    FEATURE_COUNT, FEATURE_NAMES,
};

//! Patient record types for heart-disease risk prediction.
//!
//! Based on the UCI Cleveland heart-disease features (13 clinical measurements).
//! Every field is a value object whose constructor enforces its domain, so a
//! `PatientRecord` can only exist with in-domain values.

use serde::{Deserialize, Serialize};

/// Number of features the classifier was trained on.
pub const FEATURE_COUNT: usize = 13;

/// Fixed-order numeric vector submitted to the classifier.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Feature names in training order.
///
/// The loaded model artifact must declare exactly this sequence; reordering
/// silently corrupts predictions.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// A field value outside its declared domain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("{field} {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be a whole number, got {value}")]
    NotInteger { field: &'static str, value: f64 },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

macro_rules! coded_field {
    ($(#[$meta:meta])* $name:ident, $field:literal, $min:literal, $max:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u16", into = "u16")]
        pub struct $name(u16);

        impl $name {
            pub const MIN: u16 = $min;
            pub const MAX: u16 = $max;

            /// # Errors
            /// Returns `FieldError::OutOfRange` outside the declared domain.
            pub fn new(value: u16) -> Result<Self, FieldError> {
                if (Self::MIN..=Self::MAX).contains(&value) {
                    Ok(Self(value))
                } else {
                    Err(FieldError::OutOfRange {
                        field: $field,
                        value: f64::from(value),
                        min: f64::from(Self::MIN),
                        max: f64::from(Self::MAX),
                    })
                }
            }

            #[must_use]
            pub fn get(self) -> u16 {
                self.0
            }
        }

        impl TryFrom<u16> for $name {
            type Error = FieldError;

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for u16 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

coded_field!(
    /// Age in years, [20, 100].
    Age, "age", 20, 100
);
coded_field!(
    /// Chest pain type: 0 = typical angina .. 3 = asymptomatic.
    ChestPainType, "chest pain type", 0, 3
);
coded_field!(
    /// Resting blood pressure in mmHg, [80, 200].
    RestingBloodPressure, "resting blood pressure", 80, 200
);
coded_field!(
    /// Serum cholesterol in mg/dl, [100, 600].
    SerumCholesterol, "serum cholesterol", 100, 600
);
coded_field!(
    /// Resting ECG: 0 = normal, 1 = ST-T abnormality, 2 = hypertrophy.
    RestingEcg, "resting ECG", 0, 2
);
coded_field!(
    /// Maximum heart rate achieved, [60, 220].
    MaxHeartRate, "max heart rate", 60, 220
);
coded_field!(
    /// Slope of the peak exercise ST segment: 0 = upsloping .. 2 = downsloping.
    StSlope, "ST slope", 0, 2
);
coded_field!(
    /// Number of major vessels colored by fluoroscopy, [0, 4].
    MajorVessels, "major vessels", 0, 4
);
coded_field!(
    /// Thalassemia: 0 = normal, 1 = fixed defect, 2 = reversible defect.
    Thalassemia, "thalassemia", 0, 2
);

/// ST depression induced by exercise relative to rest, [0.0, 6.0].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Oldpeak(f64);

impl Oldpeak {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 6.0;

    /// # Errors
    /// Returns error if the value is not finite or outside [0.0, 6.0].
    pub fn new(value: f64) -> Result<Self, FieldError> {
        if !value.is_finite() {
            return Err(FieldError::NotFinite { field: "oldpeak" });
        }
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(FieldError::OutOfRange {
                field: "oldpeak",
                value,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Oldpeak {
    type Error = FieldError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Oldpeak> for f64 {
    fn from(value: Oldpeak) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[default]
    Female,
    Male,
}

impl Sex {
    /// Training-time encoding: male = 1, female = 0.
    #[must_use]
    pub fn code(self) -> f64 {
        match self {
            Self::Female => 0.0,
            Self::Male => 1.0,
        }
    }
}

/// One submission's worth of clinical measurements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub age: Age,
    pub sex: Sex,
    pub chest_pain_type: ChestPainType,
    pub resting_blood_pressure: RestingBloodPressure,
    pub serum_cholesterol: SerumCholesterol,
    /// Fasting blood sugar > 120 mg/dl
    pub fasting_blood_sugar_high: bool,
    pub resting_ecg: RestingEcg,
    pub max_heart_rate: MaxHeartRate,
    pub exercise_induced_angina: bool,
    pub oldpeak: Oldpeak,
    pub st_slope: StSlope,
    pub major_vessels: MajorVessels,
    pub thalassemia: Thalassemia,
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

impl PatientRecord {
    /// Convert the record to the classifier's feature vector.
    ///
    /// Order matches `FEATURE_NAMES`.
    #[must_use]
    pub fn to_feature_vector(&self) -> FeatureVector {
        [
            f64::from(self.age.get()),
            self.sex.code(),
            f64::from(self.chest_pain_type.get()),
            f64::from(self.resting_blood_pressure.get()),
            f64::from(self.serum_cholesterol.get()),
            flag(self.fasting_blood_sugar_high),
            f64::from(self.resting_ecg.get()),
            f64::from(self.max_heart_rate.get()),
            flag(self.exercise_induced_angina),
            self.oldpeak.get(),
            f64::from(self.st_slope.get()),
            f64::from(self.major_vessels.get()),
            f64::from(self.thalassemia.get()),
        ]
    }

    /// Build a record from raw values laid out in feature order.
    ///
    /// `sex` and the two flags are encoded as 0/1. Integer-coded fields must be
    /// whole numbers.
    ///
    /// # Errors
    /// Returns the first field that falls outside its domain.
    pub fn from_values(values: &FeatureVector) -> Result<Self, FieldError> {
        Ok(Self {
            age: Age::new(whole(FieldId::Age, values[0])?)?,
            sex: if binary(FieldId::Sex, values[1])? {
                Sex::Male
            } else {
                Sex::Female
            },
            chest_pain_type: ChestPainType::new(whole(FieldId::ChestPainType, values[2])?)?,
            resting_blood_pressure: RestingBloodPressure::new(whole(
                FieldId::RestingBloodPressure,
                values[3],
            )?)?,
            serum_cholesterol: SerumCholesterol::new(whole(
                FieldId::SerumCholesterol,
                values[4],
            )?)?,
            fasting_blood_sugar_high: binary(FieldId::FastingBloodSugar, values[5])?,
            resting_ecg: RestingEcg::new(whole(FieldId::RestingEcg, values[6])?)?,
            max_heart_rate: MaxHeartRate::new(whole(FieldId::MaxHeartRate, values[7])?)?,
            exercise_induced_angina: binary(FieldId::ExerciseAngina, values[8])?,
            oldpeak: Oldpeak::new(values[9])?,
            st_slope: StSlope::new(whole(FieldId::StSlope, values[10])?)?,
            major_vessels: MajorVessels::new(whole(FieldId::MajorVessels, values[11])?)?,
            thalassemia: Thalassemia::new(whole(FieldId::Thalassemia, values[12])?)?,
        })
    }
}

fn whole(field: FieldId, value: f64) -> Result<u16, FieldError> {
    let name = field.label();
    if !value.is_finite() {
        return Err(FieldError::NotFinite { field: name });
    }
    if value.fract() != 0.0 {
        return Err(FieldError::NotInteger { field: name, value });
    }
    if !(0.0..=f64::from(u16::MAX)).contains(&value) {
        return Err(FieldError::OutOfRange {
            field: name,
            value,
            min: 0.0,
            max: f64::from(u16::MAX),
        });
    }
    Ok(value as u16)
}

fn binary(field: FieldId, value: f64) -> Result<bool, FieldError> {
    match whole(field, value)? {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(FieldError::OutOfRange {
            field: field.label(),
            value,
            min: 0.0,
            max: 1.0,
        }),
    }
}

impl Default for PatientRecord {
    /// The form's starting values.
    fn default() -> Self {
        Self {
            age: Age(50),
            sex: Sex::Female,
            chest_pain_type: ChestPainType(0),
            resting_blood_pressure: RestingBloodPressure(120),
            serum_cholesterol: SerumCholesterol(200),
            fasting_blood_sugar_high: false,
            resting_ecg: RestingEcg(0),
            max_heart_rate: MaxHeartRate(150),
            exercise_induced_angina: false,
            oldpeak: Oldpeak(1.0),
            st_slope: StSlope(0),
            major_vessels: MajorVessels(0),
            thalassemia: Thalassemia(0),
        }
    }
}

/// Identifies one of the thirteen inputs, in feature order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    Age,
    Sex,
    ChestPainType,
    RestingBloodPressure,
    SerumCholesterol,
    FastingBloodSugar,
    RestingEcg,
    MaxHeartRate,
    ExerciseAngina,
    Oldpeak,
    StSlope,
    MajorVessels,
    Thalassemia,
}

impl FieldId {
    pub const ALL: [FieldId; FEATURE_COUNT] = [
        Self::Age,
        Self::Sex,
        Self::ChestPainType,
        Self::RestingBloodPressure,
        Self::SerumCholesterol,
        Self::FastingBloodSugar,
        Self::RestingEcg,
        Self::MaxHeartRate,
        Self::ExerciseAngina,
        Self::Oldpeak,
        Self::StSlope,
        Self::MajorVessels,
        Self::Thalassemia,
    ];

    /// Position in the feature vector.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name the model artifact uses for this feature.
    #[must_use]
    pub fn feature_name(self) -> &'static str {
        FEATURE_NAMES[self.index()]
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Sex => "Gender",
            Self::ChestPainType => "Chest Pain Type",
            Self::RestingBloodPressure => "Resting Blood Pressure",
            Self::SerumCholesterol => "Serum Cholesterol",
            Self::FastingBloodSugar => "Fasting Blood Sugar > 120 mg/dl",
            Self::RestingEcg => "Resting ECG",
            Self::MaxHeartRate => "Max Heart Rate Achieved",
            Self::ExerciseAngina => "Exercise-Induced Angina",
            Self::Oldpeak => "Oldpeak (ST depression)",
            Self::StSlope => "Slope of ST segment",
            Self::MajorVessels => "Number of Major Vessels",
            Self::Thalassemia => "Thalassemia",
        }
    }

    #[must_use]
    pub fn help(self) -> &'static str {
        match self {
            Self::Age => "Patient's age in years",
            Self::Sex => "Male = 1, Female = 0",
            Self::ChestPainType => "0 = Typical Angina, 3 = Asymptomatic",
            Self::RestingBloodPressure => "In mm Hg",
            Self::SerumCholesterol => "In mg/dl",
            Self::FastingBloodSugar => "1 = Yes, 0 = No",
            Self::RestingEcg => "0 = Normal, 2 = Hypertrophy",
            Self::MaxHeartRate => "Maximum HR during exercise",
            Self::ExerciseAngina => "1 = Yes, 0 = No",
            Self::Oldpeak => "ST depression induced by exercise",
            Self::StSlope => "0 = Upsloping, 2 = Downsloping",
            Self::MajorVessels => "Colored by fluoroscopy",
            Self::Thalassemia => "0 = Normal, 1 = Fixed Defect, 2 = Reversible Defect",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The worked example record (male, oldpeak 1.0).
    fn example_record() -> PatientRecord {
        PatientRecord {
            age: Age::new(50).unwrap(),
            sex: Sex::Male,
            chest_pain_type: ChestPainType::new(0).unwrap(),
            resting_blood_pressure: RestingBloodPressure::new(120).unwrap(),
            serum_cholesterol: SerumCholesterol::new(200).unwrap(),
            fasting_blood_sugar_high: false,
            resting_ecg: RestingEcg::new(0).unwrap(),
            max_heart_rate: MaxHeartRate::new(150).unwrap(),
            exercise_induced_angina: false,
            oldpeak: Oldpeak::new(1.0).unwrap(),
            st_slope: StSlope::new(0).unwrap(),
            major_vessels: MajorVessels::new(0).unwrap(),
            thalassemia: Thalassemia::new(0).unwrap(),
        }
    }

    /// Every field set to a distinct value so each position is identifiable.
    fn distinct_record() -> PatientRecord {
        PatientRecord {
            age: Age::new(63).unwrap(),
            sex: Sex::Male,
            chest_pain_type: ChestPainType::new(3).unwrap(),
            resting_blood_pressure: RestingBloodPressure::new(145).unwrap(),
            serum_cholesterol: SerumCholesterol::new(233).unwrap(),
            fasting_blood_sugar_high: true,
            resting_ecg: RestingEcg::new(2).unwrap(),
            max_heart_rate: MaxHeartRate::new(171).unwrap(),
            exercise_induced_angina: false,
            oldpeak: Oldpeak::new(2.3).unwrap(),
            st_slope: StSlope::new(1).unwrap(),
            major_vessels: MajorVessels::new(4).unwrap(),
            thalassemia: Thalassemia::new(2).unwrap(),
        }
    }

    #[test]
    fn test_feature_vector_order() {
        let v = distinct_record().to_feature_vector();
        assert_eq!(v[0], 63.0, "age");
        assert_eq!(v[1], 1.0, "sex");
        assert_eq!(v[2], 3.0, "chest pain type");
        assert_eq!(v[3], 145.0, "resting blood pressure");
        assert_eq!(v[4], 233.0, "cholesterol");
        assert_eq!(v[5], 1.0, "fasting blood sugar");
        assert_eq!(v[6], 2.0, "resting ECG");
        assert_eq!(v[7], 171.0, "max heart rate");
        assert_eq!(v[8], 0.0, "exercise angina");
        assert!((v[9] - 2.3).abs() < f64::EPSILON, "oldpeak");
        assert_eq!(v[10], 1.0, "ST slope");
        assert_eq!(v[11], 4.0, "major vessels");
        assert_eq!(v[12], 2.0, "thalassemia");
    }

    #[test]
    fn test_field_ids_follow_feature_names() {
        let names: Vec<&str> = FieldId::ALL.iter().map(|f| f.feature_name()).collect();
        assert_eq!(names, FEATURE_NAMES);
        for (i, field) in FieldId::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }

    #[test]
    fn test_sex_mapping() {
        let male = example_record();
        let female = PatientRecord {
            sex: Sex::Female,
            ..male
        };

        let vm = male.to_feature_vector();
        let vf = female.to_feature_vector();
        assert_eq!(vm[1], 1.0);
        assert_eq!(vf[1], 0.0);
        for i in (0..FEATURE_COUNT).filter(|&i| i != 1) {
            assert_eq!(vm[i], vf[i], "position {i} must not depend on sex");
        }
    }

    #[test]
    fn test_booleans_encode_as_flags() {
        let record = PatientRecord {
            fasting_blood_sugar_high: true,
            exercise_induced_angina: true,
            ..PatientRecord::default()
        };
        let v = record.to_feature_vector();
        assert_eq!(v[5], 1.0);
        assert_eq!(v[8], 1.0);

        let v = PatientRecord::default().to_feature_vector();
        assert_eq!(v[5], 0.0);
        assert_eq!(v[8], 0.0);
    }

    #[test]
    fn test_domains_enforced_at_construction() {
        assert!(Age::new(19).is_err());
        assert!(Age::new(20).is_ok());
        assert!(Age::new(100).is_ok());
        assert!(Age::new(101).is_err());
        assert!(ChestPainType::new(4).is_err());
        assert!(RestingBloodPressure::new(79).is_err());
        assert!(SerumCholesterol::new(601).is_err());
        assert!(RestingEcg::new(3).is_err());
        assert!(MaxHeartRate::new(59).is_err());
        assert!(MaxHeartRate::new(221).is_err());
        assert!(StSlope::new(3).is_err());
        assert!(MajorVessels::new(5).is_err());
        assert!(Thalassemia::new(3).is_err());

        assert!(Oldpeak::new(0.0).is_ok());
        assert!(Oldpeak::new(6.0).is_ok());
        assert!(Oldpeak::new(-0.1).is_err());
        assert!(Oldpeak::new(6.1).is_err());
        assert_eq!(
            Oldpeak::new(f64::NAN),
            Err(FieldError::NotFinite { field: "oldpeak" })
        );
    }

    #[test]
    fn test_field_error_message() {
        let err = Age::new(10).unwrap_err();
        assert_eq!(err.to_string(), "age 10 out of range [20, 100]");
    }

    #[test]
    fn test_default_record_matches_form_defaults() {
        let v = PatientRecord::default().to_feature_vector();
        assert_eq!(
            v,
            [50.0, 0.0, 0.0, 120.0, 200.0, 0.0, 0.0, 150.0, 0.0, 1.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_from_values_rebuilds_record() {
        let record = distinct_record();
        let rebuilt = PatientRecord::from_values(&record.to_feature_vector()).expect("in domain");
        assert_eq!(rebuilt, record);
    }

    #[test]
    fn test_from_values_rejects_fractional_and_non_binary() {
        let mut v = PatientRecord::default().to_feature_vector();
        v[0] = 50.5;
        assert!(matches!(
            PatientRecord::from_values(&v),
            Err(FieldError::NotInteger { .. })
        ));

        let mut v = PatientRecord::default().to_feature_vector();
        v[5] = 2.0;
        assert!(matches!(
            PatientRecord::from_values(&v),
            Err(FieldError::OutOfRange { max, .. }) if max == 1.0
        ));
    }

    #[test]
    fn test_serde_rejects_out_of_domain() {
        let json = serde_json::to_string(&PatientRecord::default()).expect("serialize");
        let bad = json.replace("\"age\":50", "\"age\":5");
        assert!(serde_json::from_str::<PatientRecord>(&bad).is_err());
        let good: PatientRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(good, PatientRecord::default());
    }
}

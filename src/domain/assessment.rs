//! Risk assessment result types.
//!
//! Represents the interpreted output of the heart-disease classifier together
//! with the parameters the UI needs to draw the risk gauge.

use serde::{Deserialize, Serialize};

/// Probability (in percent) above which a patient is reported as high risk.
///
/// Fixed and uncalibrated: this matches the threshold the model was shipped
/// with. A probability of exactly 50.0 is low risk.
pub const HIGH_RISK_THRESHOLD: f64 = 50.0;

/// RGB color used in the gauge payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const RED: Self = Self(255, 0, 0);
    pub const GREEN: Self = Self(0, 128, 0);
    pub const BLACK: Self = Self(0, 0, 0);
}

/// Binary verdict derived from the positive-class probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskVerdict {
    HighRisk,
    LowRisk,
}

impl RiskVerdict {
    /// Classify a percentage against `HIGH_RISK_THRESHOLD` (strict `>`).
    #[must_use]
    pub fn from_percentage(probability: f64) -> Self {
        if probability > HIGH_RISK_THRESHOLD {
            Self::HighRisk
        } else {
            Self::LowRisk
        }
    }

    #[must_use]
    pub fn is_high_risk(&self) -> bool {
        matches!(self, Self::HighRisk)
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::HighRisk => "High risk of Heart Disease detected!",
            Self::LowRisk => "No significant risk detected.",
        }
    }

    /// Color of the gauge bar for this verdict.
    #[must_use]
    pub fn bar_color(&self) -> Rgb {
        match self {
            Self::HighRisk => Rgb::RED,
            Self::LowRisk => Rgb::GREEN,
        }
    }
}

impl std::fmt::Display for RiskVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HighRisk => write!(f, "HIGH RISK"),
            Self::LowRisk => write!(f, "LOW RISK"),
        }
    }
}

/// A colored segment of the gauge axis, `[from, to)` in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeBand {
    pub from: f64,
    pub to: f64,
    pub color: Rgb,
}

/// The three fixed risk bands: green-ish, yellow, red.
pub const GAUGE_BANDS: [GaugeBand; 3] = [
    GaugeBand {
        from: 0.0,
        to: 50.0,
        color: Rgb(0xb7, 0xe4, 0xc7),
    },
    GaugeBand {
        from: 50.0,
        to: 75.0,
        color: Rgb(0xff, 0xe0, 0x66),
    },
    GaugeBand {
        from: 75.0,
        to: 100.0,
        color: Rgb(0xf0, 0x3e, 0x3e),
    },
];

/// Marker line drawn at the computed probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdMarker {
    pub value: f64,
    pub color: Rgb,
    pub width: u8,
    /// Fraction of the gauge thickness the marker spans.
    pub thickness: f64,
}

/// Everything needed to draw the radial risk gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeSpec {
    pub value: f64,
    pub axis: (f64, f64),
    pub bar_color: Rgb,
    pub bands: Vec<GaugeBand>,
    pub threshold: ThresholdMarker,
    /// Reference the delta indicator is measured against.
    pub delta_reference: f64,
}

impl GaugeSpec {
    #[must_use]
    pub fn new(value: f64, verdict: RiskVerdict) -> Self {
        Self {
            value,
            axis: (0.0, 100.0),
            bar_color: verdict.bar_color(),
            bands: GAUGE_BANDS.to_vec(),
            threshold: ThresholdMarker {
                value,
                color: Rgb::BLACK,
                width: 4,
                thickness: 0.75,
            },
            delta_reference: HIGH_RISK_THRESHOLD,
        }
    }

    /// Signed distance from the delta reference.
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.value - self.delta_reference
    }

    /// Band containing `value` (the last band is closed at 100).
    #[must_use]
    pub fn band_for(&self, value: f64) -> Option<&GaugeBand> {
        self.bands
            .iter()
            .find(|b| value >= b.from && value < b.to)
            .or_else(|| self.bands.last().filter(|b| value == b.to))
    }
}

/// Result of one risk evaluation. Computed once per submission, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    /// Positive-class probability in percent, [0, 100].
    pub probability: f64,
    pub verdict: RiskVerdict,
    pub gauge: GaugeSpec,
}

impl RiskResult {
    /// Build a result from a positive-class probability in percent.
    #[must_use]
    pub fn from_percentage(probability: f64) -> Self {
        let verdict = RiskVerdict::from_percentage(probability);
        Self {
            probability,
            verdict,
            gauge: GaugeSpec::new(probability, verdict),
        }
    }

    /// Percentage to one decimal place, e.g. `73.0%`.
    #[must_use]
    pub fn percentage_label(&self) -> String {
        format!("{:.1}%", self.probability)
    }

    /// Verdict line shown to the user.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "{} ({})",
            self.verdict.description(),
            self.percentage_label()
        )
    }
}

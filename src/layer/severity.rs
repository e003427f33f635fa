use serde::{Deserialize, Serialize};

use crate::common::normalize_name;
use super::attributes::AttrValue;

/// Canonical hazard severity of a polygon (Nivel 1..4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low = 1,      // Nivel 1, verde
    Medium = 2,   // Nivel 2, amarillo
    High = 3,     // Nivel 3, naranja
    Critical = 4, // Nivel 4, rojo
}

impl Severity {
    #[inline] pub fn level(self) -> u8 { self as u8 }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            4 => Some(Self::Critical),
            _ => None,
        }
    }

    /// High and Critical make up the high-severity set used for area and exposure.
    #[inline] pub fn is_high(self) -> bool { self >= Self::High }

    /// Map a raw attribute value onto the canonical scale.
    pub fn normalize(value: &AttrValue) -> Option<Self> {
        match value {
            AttrValue::Number(n) if n.fract() == 0.0 && (1.0..=4.0).contains(n) => Self::from_level(*n as u8),
            AttrValue::Text(text) => Self::parse_label(text),
            _ => None,
        }
    }

    /// Parse labels like "Nivel 3", "3", "Naranja", "rojo" or "critical".
    pub fn parse_label(text: &str) -> Option<Self> {
        let label = normalize_name(text);
        let label = label.strip_prefix("NIVEL").map(str::trim).unwrap_or(&label);

        if let Ok(n) = label.parse::<f64>() {
            return if n.fract() == 0.0 && (1.0..=4.0).contains(&n) { Self::from_level(n as u8) } else { None };
        }
        match label {
            "ROJO" | "ROJA" | "RED" | "CRITICAL" | "CRITICO" | "MUY ALTO" => Some(Self::Critical),
            "NARANJA" | "ORANGE" | "HIGH" | "ALTO" => Some(Self::High),
            "AMARILLO" | "AMARILLA" | "YELLOW" | "MEDIUM" | "MEDIO" | "MODERADO" => Some(Self::Medium),
            "VERDE" | "GREEN" | "LOW" | "BAJO" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Risk label assigned to a customer. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Unclassified,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    /// All tiers, most severe first (report order).
    pub const DESCENDING: [RiskTier; 5] = [
        RiskTier::Critical,
        RiskTier::High,
        RiskTier::Medium,
        RiskTier::Low,
        RiskTier::Unclassified,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            RiskTier::Critical => "critical",
            RiskTier::High => "high",
            RiskTier::Medium => "medium",
            RiskTier::Low => "low",
            RiskTier::Unclassified => "unclassified",
        }
    }

    /// Color label used in advisory reports.
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Critical => "Rojo",
            RiskTier::High => "Naranja",
            RiskTier::Medium => "Amarillo",
            RiskTier::Low => "Verde",
            RiskTier::Unclassified => "Sin zona",
        }
    }

    #[inline] pub fn is_high(&self) -> bool { *self >= RiskTier::High }
}

impl From<Severity> for RiskTier {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Critical => RiskTier::Critical,
            Severity::High => RiskTier::High,
            Severity::Medium => RiskTier::Medium,
            Severity::Low => RiskTier::Low,
        }
    }
}

impl From<Option<Severity>> for RiskTier {
    fn from(severity: Option<Severity>) -> Self {
        severity.map_or(RiskTier::Unclassified, RiskTier::from)
    }
}

//! Serde adapters for the model parameter wire format.
//!
//! Durations travel as fractional seconds. JSON has no infinity, so an
//! unbounded limit travels as `null` and is restored to the matching
//! infinity on the way back in.

pub mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

fn to_wire(bounds: &[f64]) -> Vec<Option<f64>> {
    bounds
        .iter()
        .map(|b| if b.is_finite() { Some(*b) } else { None })
        .collect()
}

fn from_wire(bounds: Vec<Option<f64>>, unbounded: f64) -> Vec<f64> {
    bounds.into_iter().map(|b| b.unwrap_or(unbounded)).collect()
}

pub mod lower_bounds {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(b: &[f64], s: S) -> Result<S::Ok, S::Error> {
        super::to_wire(b).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
        Ok(super::from_wire(Vec::deserialize(d)?, f64::NEG_INFINITY))
    }
}

pub mod upper_bounds {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(b: &[f64], s: S) -> Result<S::Ok, S::Error> {
        super::to_wire(b).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
        Ok(super::from_wire(Vec::deserialize(d)?, f64::INFINITY))
    }
}

//! Zones and the connections between them, as stored by the backing store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What a zone is used for, with variant-specific attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoneKind {
    /// Neighbourhood or district served by deliveries.
    Standard {
        /// Free-form category such as "residential" or "commercial".
        category: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        population: Option<u32>,
    },
    /// Logistics hub that dispatches vehicles.
    DistributionCenter { vehicle_capacity: u32 },
}

impl ZoneKind {
    /// Short label used in storage and listings.
    pub fn label(&self) -> &str {
        match self {
            ZoneKind::Standard { category, .. } => category,
            ZoneKind::DistributionCenter { .. } => "distribution_center",
        }
    }
}

/// Node of the delivery network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    #[serde(flatten)]
    pub kind: ZoneKind,
}

impl Zone {
    pub fn standard(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ZoneKind::Standard {
                category: category.into(),
                population: None,
            },
        }
    }

    pub fn distribution_center(name: impl Into<String>, vehicle_capacity: u32) -> Self {
        Self {
            name: name.into(),
            kind: ZoneKind::DistributionCenter { vehicle_capacity },
        }
    }

    pub fn is_distribution_center(&self) -> bool {
        matches!(self.kind, ZoneKind::DistributionCenter { .. })
    }

    /// Reject zones that cannot be stored, such as a blank name.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidZone {
                name: self.name.clone(),
                reason: "zone name is required".to_string(),
            });
        }
        Ok(())
    }
}

/// Whether a connection may be travelled in both directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    OneWay,
    TwoWay,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Direction::OneWay => "one_way",
            Direction::TwoWay => "two_way",
        };
        f.write_str(value)
    }
}

/// Street between two zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub source: String,
    pub target: String,
    pub travel_minutes: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default = "default_accessible")]
    pub accessible: bool,
}

fn default_accessible() -> bool {
    true
}

impl Connection {
    /// Open one-way connection without traffic annotations.
    pub fn new(source: impl Into<String>, target: impl Into<String>, travel_minutes: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            travel_minutes,
            traffic: None,
            capacity: None,
            direction: Direction::OneWay,
            accessible: true,
        }
    }

    pub fn two_way(mut self) -> Self {
        self.direction = Direction::TwoWay;
        self
    }

    pub fn closed(mut self) -> Self {
        self.accessible = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidConnection {
            from: self.source.clone(),
            to: self.target.clone(),
            reason: reason.to_string(),
        };

        if self.source.trim().is_empty() || self.target.trim().is_empty() {
            return Err(invalid("source and target are required"));
        }
        if self.source == self.target {
            return Err(invalid("a zone cannot connect to itself"));
        }
        if !self.travel_minutes.is_finite() || self.travel_minutes < 0.0 {
            return Err(invalid("travel time must be a finite, non-negative number"));
        }
        Ok(())
    }

    /// Directed arcs this connection contributes to the graph.
    pub fn arcs(&self) -> Vec<(&str, &str)> {
        match self.direction {
            Direction::OneWay => vec![(self.source.as_str(), self.target.as_str())],
            Direction::TwoWay => vec![
                (self.source.as_str(), self.target.as_str()),
                (self.target.as_str(), self.source.as_str()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_kind_is_tagged() {
        let zone = Zone::distribution_center("Hub Norte", 12);
        let json = serde_json::to_value(&zone).unwrap();
        assert_eq!(json["kind"], "distribution_center");
        assert_eq!(json["vehicle_capacity"], 12);
        assert_eq!(json["name"], "Hub Norte");

        let parsed: Zone = serde_json::from_value(serde_json::json!({
            "name": "Centro",
            "kind": "standard",
            "category": "commercial",
            "population": 5400
        }))
        .unwrap();
        assert_eq!(
            parsed.kind,
            ZoneKind::Standard {
                category: "commercial".to_string(),
                population: Some(5400)
            }
        );
        assert!(!parsed.is_distribution_center());
    }

    #[test]
    fn connection_defaults_to_open_one_way() {
        let conn: Connection = serde_json::from_str(
            r#"{"source":"A","target":"B","travel_minutes":4.5}"#,
        )
        .unwrap();
        assert!(conn.accessible);
        assert_eq!(conn.direction, Direction::OneWay);
        assert_eq!(conn.arcs(), vec![("A", "B")]);
    }

    #[test]
    fn two_way_connection_yields_both_arcs() {
        let conn = Connection::new("A", "B", 2.0).two_way();
        assert_eq!(conn.arcs(), vec![("A", "B"), ("B", "A")]);
    }

    #[test]
    fn validation_rejects_bad_connections() {
        assert!(Connection::new("A", "A", 1.0).validate().is_err());
        assert!(Connection::new("", "B", 1.0).validate().is_err());
        assert!(Connection::new("A", "B", -2.0).validate().is_err());
        assert!(Connection::new("A", "B", 0.0).validate().is_ok());
    }
}

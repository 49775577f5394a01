//! Engine scale factors and balance constants.
//!
//! None of these are physical constants. They were measured against the
//! game and can change between patches, so each one has a test pinning the
//! value currently in use.

use crate::descriptors::keys;
use crate::error::ErrorKind;
use crate::error::IResult;
use crate::ndf::Node;

/// One metre in engine distance units.
pub const METRE: f64 = 1.0 / 2.83;

/// Fuel units refilled per second by an airfield.
pub const AIR_FUEL_PER_SECOND: f64 = 10.0;
/// Health points repaired per second by an airfield.
pub const AIR_HEALTH_PER_SECOND: f64 = 0.018;
/// Supply points rearmed per second by an airfield.
pub const AIR_SUPPLY_PER_SECOND: f64 = 1.0;

/// Subtracted from kinetic penetration to get the armor killed outright at max range.
pub const KINETIC_INSTANT_KILL_OFFSET: f64 = 18.0;
/// Subtracted from heat penetration to get the armor killed outright at max range.
pub const HEAT_INSTANT_KILL_OFFSET: f64 = 14.0;

/// Distance over which kinetic penetration loses one point, per damage curve token.
pub const DROP_OFF: &[(&str, f64)] = &[
    ("DamageTypeEvolutionOverRangeDescriptor_AP1_1Km", 175.0),
    ("DamageTypeEvolutionOverRangeDescriptor_Balle_500", 500.0),
    ("DamageTypeEvolutionOverRangeDescriptor_DCA", 700.0),
];

pub fn drop_off(token: &str) -> Option<f64> {
    DROP_OFF
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, value)| *value)
}

/// Accuracy breakpoints as `(fraction of max range, accuracy bonus percent)`.
pub const ACCURACY_BONUS_OVER_RANGE: &[(f64, f64)] = &[
    (0.05, 1000.0),
    (0.17, 100.0),
    (0.33, 75.0),
    (0.5, 50.0),
    (0.67, 25.0),
    (1.0, 0.0),
];

/// Which generation of the ammunition schema a descriptor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmmoSchema {
    Legacy,
    Current,
}

impl AmmoSchema {
    pub fn detect(ammunition: &Node) -> Self {
        if keys::CURRENT_RANGE_KEYS
            .iter()
            .any(|key| ammunition.find_first(key).is_some())
        {
            AmmoSchema::Current
        } else {
            AmmoSchema::Legacy
        }
    }

    /// Added to kinetic penetration after range falloff.
    pub const fn kinetic_adjustment(&self) -> f64 {
        match self {
            AmmoSchema::Legacy => 0.0,
            AmmoSchema::Current => 1.0,
        }
    }
}

/// Constants read from the hit roll constants file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRollConstants {
    bonus_precision: f64,
}

impl HitRollConstants {
    pub fn new(bonus_precision: f64) -> Self {
        Self { bonus_precision }
    }

    /// The file stores `bonusPrecision` as a percentage.
    pub fn from_nodes(nodes: &[Node]) -> IResult<Self> {
        let percentage = nodes
            .iter()
            .find(|node| node.name() == Some(keys::BONUS_PRECISION))
            .and_then(Node::first_value)
            .and_then(Node::number)
            .ok_or_else(|| ErrorKind::MalformedDescriptorFile {
                category: "hit roll constants",
                detail: format!("no numeric {}", keys::BONUS_PRECISION),
            })?;
        Ok(Self::new(percentage / 100.0))
    }

    /// Accuracy gained per successive hit, as a fraction of base accuracy.
    pub fn bonus_precision(&self) -> f64 {
        self.bonus_precision
    }
}

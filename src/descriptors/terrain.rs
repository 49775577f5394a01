use tracing::debug;

use crate::descriptors::fields::Fields;
use crate::descriptors::fields::round;
use crate::descriptors::keys;
use crate::descriptors::types::DamageFamilyModifiers;
use crate::descriptors::types::ResistanceModifier;
use crate::descriptors::types::SpeedOnTerrain;
use crate::descriptors::types::TerrainResistance;
use crate::ndf::Node;
use crate::ndf::last_path_token;
use crate::recognized::Token;

/// Terrains that slow units down, as `(descriptor name, display name)`.
pub const SLOW_TERRAINS: &[(&str, &str)] = &[("ForetLegere", "forest"), ("Batiment", "building"), ("Ruin", "ruins")];

/// Movement classes a terrain speed modifier distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveType {
    AllTerrainWheel,
    Infantry,
    Track,
}

impl MoveType {
    pub fn modifier_key(&self) -> &'static str {
        match self {
            MoveType::AllTerrainWheel => keys::SPEED_MODIFIER_WHEEL,
            MoveType::Infantry => keys::SPEED_MODIFIER_INFANTRY,
            MoveType::Track => keys::SPEED_MODIFIER_TRACK,
        }
    }

    /// The first move type named inside a `UnitMovingType` token, e.g.
    /// `EGameplayBehaviorMoveType/Track`.
    pub fn from_moving_type(moving_type: &str) -> Option<Self> {
        let token = last_path_token(moving_type);
        Self::ALL.iter().find(|move_type| token.contains(move_type.token())).copied()
    }
}

impl Token for MoveType {
    const ALL: &'static [Self] = &[Self::AllTerrainWheel, Self::Infantry, Self::Track];

    fn token(&self) -> &'static str {
        match self {
            Self::AllTerrainWheel => "AllTerrainWheel",
            Self::Infantry => "Infantry",
            Self::Track => "Track",
        }
    }
}

/// Speed multipliers of one slow terrain, resolved once per dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainSpeedModifier {
    pub name: &'static str,
    pub descriptor_name: &'static str,
    modifiers: Vec<(MoveType, Option<f64>)>,
}

impl TerrainSpeedModifier {
    pub fn modifier(&self, move_type: MoveType) -> Option<f64> {
        self.modifiers
            .iter()
            .find(|(known, _)| *known == move_type)
            .and_then(|(_, modifier)| *modifier)
    }
}

fn slow_terrain(terrain: &Node) -> Option<(&'static str, &'static str)> {
    let name = terrain.name()?;
    SLOW_TERRAINS
        .iter()
        .find(|(descriptor, _)| *descriptor == name)
        .copied()
}

/// Speed modifiers of the slow terrains, in terrain file order.
pub fn speed_modifiers(terrains: &[Node]) -> Vec<TerrainSpeedModifier> {
    terrains
        .iter()
        .filter(|terrain| terrain.is_object())
        .filter_map(|terrain| {
            let (descriptor_name, name) = slow_terrain(terrain)?;
            let fields = Fields::new(terrain);
            let modifiers = MoveType::ALL
                .iter()
                .map(|move_type| (*move_type, fields.raw_number(move_type.modifier_key())))
                .collect();
            Some(TerrainSpeedModifier {
                name,
                descriptor_name,
                modifiers,
            })
        })
        .collect()
}

/// Speed of a unit on each slow terrain. Terrains without a modifier for the
/// unit's move type are left out.
pub fn speeds_for_terrains(modifiers: &[TerrainSpeedModifier], moving_type: &str, speed: f64) -> Vec<SpeedOnTerrain> {
    let Some(move_type) = MoveType::from_moving_type(moving_type) else {
        debug!(moving_type, "no terrain speed modifiers for move type");
        return Vec::new();
    };

    modifiers
        .iter()
        .filter_map(|terrain| {
            let modifier = terrain.modifier(move_type)?;
            Some(SpeedOnTerrain {
                name: terrain.name.to_string(),
                speed: round(speed * modifier),
            })
        })
        .collect()
}

/// Per damage family resistance modifiers of the slow terrains.
pub fn terrain_resistances(terrains: &[Node]) -> Vec<TerrainResistance> {
    terrains
        .iter()
        .filter(|terrain| terrain.is_object())
        .filter_map(|terrain| {
            let (descriptor_name, _) = slow_terrain(terrain)?;
            let damage_families = terrain
                .find_first(keys::DAMAGE_MODIFIER_PER_FAMILY)
                .map(|modifiers| modifiers.pairs().into_iter().map(damage_family_modifiers).collect())
                .unwrap_or_default();
            Some(TerrainResistance {
                name: descriptor_name.to_string(),
                damage_families,
            })
        })
        .collect()
}

fn damage_family_modifiers((family, resistances): (&Node, &Node)) -> DamageFamilyModifiers {
    let damage_family = family
        .text()
        .map(|family| strip_family(family, keys::DAMAGE_FAMILY_PREFIX))
        .unwrap_or_default();
    let resistances = resistances
        .pairs()
        .into_iter()
        .map(|(family, value)| ResistanceModifier {
            family: family
                .text()
                .map(|family| strip_family(family, keys::RESISTANCE_FAMILY_PREFIX))
                .unwrap_or_default(),
            value: value.number(),
        })
        .collect();
    DamageFamilyModifiers {
        damage_family,
        resistances,
    }
}

pub(crate) fn strip_family(raw: &str, prefix: &str) -> String {
    let token = last_path_token(raw);
    token.strip_prefix(prefix).unwrap_or(token).to_string()
}

use tracing::debug;
use tracing::warn;

use crate::descriptors::constants::AIR_FUEL_PER_SECOND;
use crate::descriptors::constants::AIR_HEALTH_PER_SECOND;
use crate::descriptors::constants::AIR_SUPPLY_PER_SECOND;
use crate::descriptors::division::DeckIds;
use crate::descriptors::fields::Fields;
use crate::descriptors::fields::family_index;
use crate::descriptors::fields::round;
use crate::descriptors::fields::scale;
use crate::descriptors::index::DescriptorIndex;
use crate::descriptors::keys;
use crate::descriptors::keys::AltitudeBand;
use crate::descriptors::keys::ArmorFamily;
use crate::descriptors::keys::InfoPanelType;
use crate::descriptors::keys::UnitKind;
use crate::descriptors::names::UnitCatalog;
use crate::descriptors::names::unit_name;
use crate::descriptors::terrain::TerrainSpeedModifier;
use crate::descriptors::terrain::speeds_for_terrains;
use crate::descriptors::types::Armor;
use crate::descriptors::types::ArmorProfile;
use crate::descriptors::types::BandValues;
use crate::descriptors::types::BombStrategy;
use crate::descriptors::types::MovementType;
use crate::descriptors::types::SensorProfile;
use crate::descriptors::types::UnitRecord;
use crate::descriptors::types::UnitType;
use crate::descriptors::weapon::ResolvedWeapons;
use crate::descriptors::weapon::WeaponResolver;
use crate::ndf::Node;
use crate::ndf::last_path_token;
use crate::recognized::Recognized;
use crate::recognized::Token;

/// Resolves unit (and building) descriptors.
pub struct UnitResolver<'a> {
    speed_modifiers: &'a [TerrainSpeedModifier],
    weapon_managers: &'a DescriptorIndex,
    weapons: WeaponResolver<'a>,
    ids: &'a DeckIds,
    catalog: &'a dyn UnitCatalog,
}

impl<'a> UnitResolver<'a> {
    pub fn new(
        speed_modifiers: &'a [TerrainSpeedModifier],
        weapon_managers: &'a DescriptorIndex,
        weapons: WeaponResolver<'a>,
        ids: &'a DeckIds,
        catalog: &'a dyn UnitCatalog,
    ) -> Self {
        Self {
            speed_modifiers,
            weapon_managers,
            weapons,
            ids,
            catalog,
        }
    }

    pub fn resolve(&self, unit: &Node) -> UnitRecord {
        let fields = Fields::new(unit);
        let descriptor_name = unit.name().unwrap_or_default().to_string();
        let (name, category) = unit_name(&descriptor_name, self.catalog);

        let movement_type = movement_type(&fields);
        let travel_time = fields.number(&keys::TRAVEL_DURATION).filter(|time| *time != 0.0);
        let is_plane = travel_time.is_some() || movement_type == MovementType::Plane;

        let speed = fields.rounded(&keys::UNIT_SPEED);
        let speeds_for_terrains = fields
            .text(keys::UNIT_MOVING_TYPE)
            .zip(speed)
            .map(|(moving_type, speed)| speeds_for_terrains(self.speed_modifiers, moving_type, speed));

        let sensors = sensor_profile(&fields, is_plane);
        let specialities = specialities(&fields);
        let is_command = specialities
            .iter()
            .any(|speciality| speciality.contains(keys::LEADER_SPECIALTY))
            .then_some(true);
        let experience_pack = fields.text(keys::EXPERIENCE_PACK).unwrap_or_default();

        let ResolvedWeapons {
            weapons,
            has_defensive_smoke,
        } = self.resolve_weapons(&descriptor_name, &fields);

        let fuel = fields.number(&keys::FUEL_CAPACITY);
        let max_damage = fields.number(&keys::MAX_DAMAGE);
        let (max_refuel_time, max_repair_time, max_rearm_time) = if is_plane {
            let max_supply_cost = weapons
                .iter()
                .filter_map(|weapon| weapon.supply_cost)
                .fold(0.0, f64::max);
            (
                fuel.map(|fuel| round(fuel / AIR_FUEL_PER_SECOND)),
                max_damage.map(|damage| round(damage / AIR_HEALTH_PER_SECOND)),
                Some(round(max_supply_cost / AIR_SUPPLY_PER_SECOND)),
            )
        } else {
            (None, None, None)
        };

        debug!(unit = %descriptor_name, weapons = weapons.len(), ?movement_type, "resolved unit");

        UnitRecord {
            id: self.ids.unit(&descriptor_name),
            name,
            category,
            unit_type: unit_type(unit),
            command_points: command_points(&fields),
            info_panel_type: fields
                .unquoted(keys::INFO_PANEL_TOKEN)
                .and_then(|token| InfoPanelType::from_token(&token)),
            factory_descriptor: fields.text(keys::FACTORY).map(str::to_string),
            armor: armor_profile(&fields),
            era: fields.flag(keys::EXPLOSIVE_REACTIVE_ARMOR),
            max_damage,
            speed,
            speeds_for_terrains,
            road_speed: fields.rounded(&keys::ROAD_SPEED),
            rotation_time: fields.number(&keys::ROTATION_TIME),
            optics: sensors.optics.standard,
            air_optics: sensors.optics.high_altitude,
            sensors,
            bomb_strategy: bomb_strategy(&fields),
            stealth: fields.number(&keys::STEALTH),
            advanced_deployment: fields.rounded(&keys::DEPLOYMENT_SHIFT).unwrap_or(0.0),
            fuel,
            fuel_move: fields.number(&keys::FUEL_MOVE_DURATION),
            supply: fields.number(&keys::SUPPLY_CAPACITY),
            ecm: fields.number(&keys::ECM),
            agility: fields.rounded(&keys::AGILITY_RADIUS),
            travel_time,
            flying_altitude: fields.rounded(&keys::FLYING_ALTITUDE),
            max_refuel_time,
            max_repair_time,
            max_rearm_time,
            specialities,
            is_command,
            dangerousness: fields.number(&keys::DANGEROUSNESS),
            movement_type,
            occupiable_terrains: occupiable_terrains(&fields),
            is_special_forces: experience_pack.contains(keys::SPECIAL_FORCES_PACK),
            xp_bonuses: experience_pack
                .strip_prefix(keys::LOCAL_PATH_PREFIX)
                .unwrap_or(experience_pack)
                .to_string(),
            has_defensive_smoke,
            is_sellable: fields.has(keys::SELL_MODULE),
            weapons,
            divisions: Vec::new(),
            descriptor_name,
        }
    }

    /// A unit whose weapon manager does not resolve keeps no weapons.
    fn resolve_weapons(&self, unit: &str, fields: &Fields) -> ResolvedWeapons {
        let Some(path) = fields
            .value(keys::WEAPON_MANAGER)
            .and_then(|manager| manager.first_value().or(Some(manager)))
            .and_then(Node::text)
        else {
            return ResolvedWeapons::default();
        };

        match self.weapon_managers.resolve(path) {
            Ok(manager) => self.weapons.resolve(manager),
            Err(err) => {
                warn!(unit, %err, "weapon manager not resolved");
                ResolvedWeapons::default()
            }
        }
    }
}

fn movement_type(fields: &Fields) -> MovementType {
    if fields.has(keys::LAND_MOVEMENT) {
        MovementType::Land
    } else if fields.has(keys::AIRPLANE_MOVEMENT) {
        MovementType::Plane
    } else if fields.has(keys::HELICOPTER_MOVEMENT) {
        MovementType::Helicopter
    } else {
        MovementType::Land
    }
}

fn bomb_strategy(fields: &Fields) -> Option<BombStrategy> {
    if fields.has(keys::DIVE_BOMB_STRATEGY) {
        Some(BombStrategy::Dive)
    } else if fields.has(keys::BOMB_STRATEGY) {
        Some(BombStrategy::Normal)
    } else {
        None
    }
}

fn unit_type(unit: &Node) -> UnitType {
    let Some(module) = unit.find_first(keys::UNIT_TYPE_MODULE) else {
        return UnitType::default();
    };
    let member = |key: &str| {
        module
            .member(key)
            .and_then(Node::text)
            .map(|value| value.replace('\'', ""))
            .unwrap_or_default()
    };
    UnitType {
        nationality: member(keys::NATIONALITY),
        mother_country: member(keys::MOTHER_COUNTRY),
        formation: member(keys::FORMATION),
    }
}

fn command_points(fields: &Fields) -> Option<f64> {
    fields
        .value(keys::PRODUCTION_RESOURCES)?
        .pairs()
        .into_iter()
        .find(|(resource, _)| {
            resource
                .text()
                .is_some_and(|resource| resource.contains(keys::COMMAND_POINTS_RESOURCE))
        })
        .and_then(|(_, points)| points.number())
}

fn specialities(fields: &Fields) -> Vec<String> {
    fields
        .value(keys::SPECIALTIES_LIST)
        .map(|list| {
            list.items()
                .iter()
                .filter_map(Node::text)
                .map(|speciality| speciality.trim_matches(['"', '\'']).to_string())
                .filter(|speciality| !speciality.is_empty() && speciality != keys::SUPPORT_SPECIALTY)
                .collect()
        })
        .unwrap_or_default()
}

fn occupiable_terrains(fields: &Fields) -> Vec<String> {
    let Some(terrains) = fields
        .value(keys::TERRAIN_LIST)
        .and_then(|list| list.items().first())
        .and_then(Node::text)
    else {
        return Vec::new();
    };

    terrains
        .trim()
        .split(", ")
        .map(|terrain| last_path_token(terrain).replace(',', ""))
        .filter(|terrain| !keys::UNOCCUPIABLE_TERRAINS.contains(&terrain.as_str()))
        .collect()
}

/// Displayed armor for a family and raw strength.
///
/// Infantry never has armor. Vehicles, helicopters and planes show one
/// below their strength, with 0.5 standing in for anything under one.
pub fn armor_value(family: &Recognized<ArmorFamily>, strength: f64) -> f64 {
    match family.known() {
        Some(ArmorFamily::Infanterie) => 0.0,
        Some(family) if family.is_vehicle() => {
            if strength - 1.0 >= 1.0 {
                strength - 1.0
            } else {
                0.5
            }
        }
        _ => strength,
    }
}

/// Current schema, `Resistance*` holding a resistance family and its index.
fn resistance_armor(resistance: &Node) -> Option<Armor> {
    let (family_token, strength) = family_index(resistance, keys::RESISTANCE_FAMILY_PREFIX, keys::INDEX)?;
    let family = Recognized::<ArmorFamily>::parse(&family_token);
    let tag = match strength {
        Some(strength) => format!("{family_token}-{strength}"),
        None => family_token.clone(),
    };
    let value = match strength {
        Some(strength) => Some(armor_value(&family, strength)),
        None => family.is_known_and(|family| *family == ArmorFamily::Infanterie).then_some(0.0),
    };
    Some(Armor { family, tag, value })
}

/// Legacy schema, an `ArmorDescriptor_<family>_<strength>` token.
fn legacy_armor(token: &str) -> Option<Armor> {
    let mut parts = last_path_token(token).split('_').skip(1);
    let family_token = parts.next()?;
    let strength = parts.next().unwrap_or_default();
    let family = Recognized::<ArmorFamily>::parse(family_token);

    let value = if strength == keys::LIGHT_ARMOR_STRENGTH {
        Some(0.5)
    } else if family.is_known_and(|family| *family == ArmorFamily::Infanterie) {
        Some(0.0)
    } else {
        strength.parse::<f64>().ok().map(|strength| armor_value(&family, strength))
    };

    Some(Armor {
        family,
        tag: family_token.to_string(),
        value,
    })
}

/// Armor on every facing. Units with a legacy front armor token use the
/// legacy schema for all facings.
pub fn armor_profile(fields: &Fields) -> Option<ArmorProfile> {
    if fields.has(keys::ARMOR_FRONT) {
        let facing = |key: &str| fields.text(key).and_then(legacy_armor);
        return Some(ArmorProfile {
            front: facing(keys::ARMOR_FRONT)?,
            side: facing(keys::ARMOR_SIDES)?,
            rear: facing(keys::ARMOR_REAR)?,
            top: facing(keys::ARMOR_TOP)?,
        });
    }

    let facing = |key: &str| fields.value(key).and_then(resistance_armor);
    Some(ArmorProfile {
        front: facing(keys::RESISTANCE_FRONT)?,
        side: facing(keys::RESISTANCE_SIDES)?,
        rear: facing(keys::RESISTANCE_REAR)?,
        top: facing(keys::RESISTANCE_TOP)?,
    })
}

fn band_values(entries: &Node, unit: UnitKind) -> BandValues {
    let mut bands = BandValues::default();
    for (band, value) in entries.pairs() {
        let Some(band) = band.text().and_then(|band| AltitudeBand::from_token(last_path_token(band))) else {
            continue;
        };
        let value = value.number().map(|value| scale(value, unit));
        let value = match unit {
            UnitKind::Length => value.map(round),
            _ => value,
        };
        match band {
            AltitudeBand::Standard => bands.standard = value,
            AltitudeBand::LowAltitude => bands.low_altitude = value,
            AltitudeBand::HighAltitude => bands.high_altitude = value,
        }
    }
    bands
}

/// Optics and vision ranges per altitude band.
pub fn sensor_profile(fields: &Fields, is_plane: bool) -> SensorProfile {
    if let Some(optics) = fields.value(keys::OPTICAL_STRENGTHS) {
        return SensorProfile {
            optics: band_values(optics, UnitKind::Plain),
            vision_ranges: fields
                .value(keys::VISION_RANGES)
                .map(|ranges| band_values(ranges, UnitKind::Length))
                .unwrap_or_default(),
        };
    }

    let optics = |band| fields.raw_number(keys::legacy_optics_key(band, is_plane));
    let vision = |band| {
        fields
            .raw_number(keys::legacy_vision_key(band, is_plane))
            .map(|range| round(scale(range, UnitKind::Length)))
    };
    SensorProfile {
        optics: BandValues {
            standard: optics(AltitudeBand::Standard),
            low_altitude: optics(AltitudeBand::LowAltitude),
            high_altitude: optics(AltitudeBand::HighAltitude),
        },
        vision_ranges: BandValues {
            standard: vision(AltitudeBand::Standard),
            low_altitude: vision(AltitudeBand::LowAltitude),
            high_altitude: vision(AltitudeBand::HighAltitude),
        },
    }
}

use bon::Builder;
use serde::Serialize;

use crate::descriptors::keys::ArmorFamily;
use crate::descriptors::keys::InfoPanelType;
use crate::recognized::Recognized;

/// Replaces non-finite numbers with "not present" across a record graph.
///
/// Derived statistics are computed from fields that may be absent or zero,
/// so a division can produce NaN or infinity. Those must never reach the
/// serialized output.
pub trait Sanitize {
    fn sanitize(&mut self);
}

fn sanitize_stat(value: &mut Option<f64>) {
    if value.is_some_and(|v| !v.is_finite()) {
        *value = None;
    }
}

impl<T: Sanitize> Sanitize for Option<T> {
    fn sanitize(&mut self) {
        if let Some(inner) = self {
            inner.sanitize();
        }
    }
}

impl<T: Sanitize> Sanitize for Vec<T> {
    fn sanitize(&mut self) {
        for item in self {
            item.sanitize();
        }
    }
}

macro_rules! sanitize_fields {
    ($ty:ty { stats: [$($stat:ident),* $(,)?] $(, nested: [$($nested:ident),* $(,)?])? }) => {
        impl Sanitize for $ty {
            fn sanitize(&mut self) {
                $(sanitize_stat(&mut self.$stat);)*
                $($(self.$nested.sanitize();)*)?
            }
        }
    };
}

#[derive(Clone, Builder, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmokeRecord {
    altitude: Option<f64>,
    life_span: Option<f64>,
    radius: Option<f64>,
}

impl SmokeRecord {
    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }

    pub fn life_span(&self) -> Option<f64> {
        self.life_span
    }

    pub fn radius(&self) -> Option<f64> {
        self.radius
    }
}

sanitize_fields!(SmokeRecord { stats: [altitude, life_span, radius] });

#[derive(Clone, Builder, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissileRecord {
    max_missile_speed: Option<f64>,
    max_missile_acceleration: Option<f64>,
}

impl MissileRecord {
    pub fn max_missile_speed(&self) -> Option<f64> {
        self.max_missile_speed
    }

    pub fn max_missile_acceleration(&self) -> Option<f64> {
        self.max_missile_acceleration
    }
}

sanitize_fields!(MissileRecord { stats: [max_missile_speed, max_missile_acceleration] });

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AccuracyPoint {
    pub distance: f64,
    pub accuracy: f64,
}

/// Accuracy at fixed fractions of max range, per target altitude band.
/// A band without range has no curve.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AccuracyCurves {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground: Option<Vec<AccuracyPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helicopter: Option<Vec<AccuracyPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plane: Option<Vec<AccuracyPoint>>,
}

/// One ammunition descriptor as seen through one mounted weapon.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmmunitionRecord {
    pub name: String,
    pub descriptor_name: String,
    pub texture_id: String,
    pub he_damage: Option<f64>,
    pub he_damage_radius: Option<f64>,
    pub suppress: Option<f64>,
    pub suppress_damages_radius: Option<f64>,
    pub fires_left_to_right: bool,
    pub ground_max_range: f64,
    pub ground_min_range: f64,
    pub heli_max_range: f64,
    pub heli_min_range: f64,
    pub plane_max_range: f64,
    pub plane_min_range: f64,
    pub aiming_time: Option<f64>,
    pub reload_time: Option<f64>,
    pub salvo_length: Option<f64>,
    pub time_between_salvos: Option<f64>,
    pub ammunition_per_salvo: Option<f64>,
    pub rate_of_fire: Option<f64>,
    pub true_rate_of_fire: Option<f64>,
    pub supply_cost_per_salvo: Option<f64>,
    pub static_accuracy: Option<f64>,
    pub moving_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_accuracy_over_distance: Option<AccuracyCurves>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moving_accuracy_over_distance: Option<AccuracyCurves>,
    pub distance_to_target: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_successive_hit_count: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_precision_bonus_per_shot: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moving_precision_bonus_per_shot: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_static_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_moving_accuracy: Option<f64>,
    pub damage_drop_off: Option<f64>,
    pub damage_family: Option<String>,
    pub damage_index: Option<f64>,
    pub piercing_weapon: bool,
    pub is_kinetic: bool,
    #[serde(rename = "kineticAP")]
    pub kinetic_ap: Option<f64>,
    #[serde(rename = "heatAP")]
    pub heat_ap: Option<f64>,
    pub penetration: Option<f64>,
    pub insta_kill_at_max_range_armour: Option<f64>,
    pub noise_malus: Option<f64>,
    pub shots_before_max_noise: Option<f64>,
    pub dispersion_at_max_range: Option<f64>,
    pub dispersion_at_min_range: Option<f64>,
    pub min_max_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missile: Option<MissileRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smoke: Option<SmokeRecord>,
    pub traits: Vec<String>,
}

sanitize_fields!(AmmunitionRecord {
    stats: [
        he_damage,
        he_damage_radius,
        suppress,
        suppress_damages_radius,
        aiming_time,
        reload_time,
        salvo_length,
        time_between_salvos,
        ammunition_per_salvo,
        rate_of_fire,
        true_rate_of_fire,
        supply_cost_per_salvo,
        static_accuracy,
        moving_accuracy,
        max_successive_hit_count,
        static_precision_bonus_per_shot,
        moving_precision_bonus_per_shot,
        max_static_accuracy,
        max_moving_accuracy,
        damage_drop_off,
        damage_index,
        kinetic_ap,
        heat_ap,
        penetration,
        insta_kill_at_max_range_armour,
        noise_malus,
        shots_before_max_noise,
        dispersion_at_max_range,
        dispersion_at_min_range,
    ],
    nested: [missile, smoke]
});

/// Rotation metadata of the turret a weapon is mounted on.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Turret {
    pub has_turret: bool,
    pub rotation_speed: Option<f64>,
}

/// One resolved `TMountedWeaponDescriptor`.
#[derive(Clone, Debug, PartialEq)]
pub struct MountedWeapon {
    pub show_interface: bool,
    pub number_of_weapons: f64,
    pub salvo_index: Option<usize>,
    pub ammo: AmmunitionRecord,
    pub turret: Turret,
}

/// Everything mounted on one salvo slot, merged into a single weapon.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponRecord {
    pub weapon_name: String,
    pub ammo_descriptor_name: String,
    pub image_texture: String,
    pub salvo_index: usize,
    pub show_in_interface: bool,
    pub has_turret: bool,
    pub turret_rotation_speed: Option<f64>,
    pub number_of_weapons: f64,
    pub number_of_salvos: f64,
    pub supply_cost: Option<f64>,
    pub he: Option<f64>,
    pub he_damage_radius: Option<f64>,
    pub total_he_damage: Option<f64>,
    pub total_he_per_salvo: Option<f64>,
    pub suppress: Option<f64>,
    pub suppress_damages_radius: Option<f64>,
    pub penetration: f64,
    pub piercing_weapon: bool,
    pub insta_kill_at_max_range_armour: Option<f64>,
    pub ground_range: f64,
    pub ground_min_range: f64,
    pub helicopter_range: f64,
    pub helicopter_min_range: f64,
    pub plane_range: f64,
    pub plane_min_range: f64,
    pub aiming_time: Option<f64>,
    pub reload_time: Option<f64>,
    pub salvo_length: Option<f64>,
    pub time_between_salvos: Option<f64>,
    pub ammunition_per_salvo: Option<f64>,
    pub rate_of_fire: Option<f64>,
    pub true_rate_of_fire: Option<f64>,
    pub static_accuracy: Option<f64>,
    pub moving_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_accuracy_scaling: Option<AccuracyCurves>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moving_accuracy_scaling: Option<AccuracyCurves>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_static_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_moving_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_precision_bonus_per_shot: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moving_precision_bonus_per_shot: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_successive_hit_count: Option<f64>,
    pub fires_left_to_right: bool,
    pub noise_malus: Option<f64>,
    pub shots_before_max_noise: Option<f64>,
    pub dispersion_at_max_range: Option<f64>,
    pub dispersion_at_min_range: Option<f64>,
    pub min_max_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missile_properties: Option<MissileRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smoke_properties: Option<SmokeRecord>,
    pub traits: Vec<String>,
}

sanitize_fields!(WeaponRecord {
    stats: [
        turret_rotation_speed,
        supply_cost,
        he,
        he_damage_radius,
        total_he_damage,
        total_he_per_salvo,
        suppress,
        suppress_damages_radius,
        insta_kill_at_max_range_armour,
        aiming_time,
        reload_time,
        salvo_length,
        time_between_salvos,
        ammunition_per_salvo,
        rate_of_fire,
        true_rate_of_fire,
        static_accuracy,
        moving_accuracy,
        max_static_accuracy,
        max_moving_accuracy,
        static_precision_bonus_per_shot,
        moving_precision_bonus_per_shot,
        max_successive_hit_count,
        noise_malus,
        shots_before_max_noise,
        dispersion_at_max_range,
        dispersion_at_min_range,
    ],
    nested: [missile_properties, smoke_properties]
});

/// Armor on one facing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Armor {
    #[serde(rename = "type")]
    pub family: Recognized<ArmorFamily>,
    /// `<family>-<strength>` for resistance descriptors, the bare family for
    /// legacy armor tokens.
    pub tag: String,
    pub value: Option<f64>,
}

sanitize_fields!(Armor { stats: [value] });

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArmorProfile {
    pub front: Armor,
    pub side: Armor,
    pub rear: Armor,
    pub top: Armor,
}

sanitize_fields!(ArmorProfile { stats: [], nested: [front, side, rear, top] });

/// One value per sensor altitude band.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandValues {
    pub standard: Option<f64>,
    pub low_altitude: Option<f64>,
    pub high_altitude: Option<f64>,
}

sanitize_fields!(BandValues { stats: [standard, low_altitude, high_altitude] });

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorProfile {
    pub optics: BandValues,
    pub vision_ranges: BandValues,
}

sanitize_fields!(SensorProfile { stats: [], nested: [optics, vision_ranges] });

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitType {
    pub nationality: String,
    pub mother_country: String,
    pub formation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpeedOnTerrain {
    pub name: String,
    pub speed: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    #[default]
    Land,
    Helicopter,
    Plane,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BombStrategy {
    Dive,
    Normal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRecord {
    pub descriptor_name: String,
    pub name: String,
    pub category: String,
    pub id: Option<u32>,
    pub unit_type: UnitType,
    pub command_points: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_panel_type: Option<InfoPanelType>,
    pub factory_descriptor: Option<String>,
    pub armor: Option<ArmorProfile>,
    pub era: bool,
    pub max_damage: Option<f64>,
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speeds_for_terrains: Option<Vec<SpeedOnTerrain>>,
    pub road_speed: Option<f64>,
    pub rotation_time: Option<f64>,
    pub optics: Option<f64>,
    pub air_optics: Option<f64>,
    pub sensors: SensorProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bomb_strategy: Option<BombStrategy>,
    pub stealth: Option<f64>,
    pub advanced_deployment: f64,
    pub fuel: Option<f64>,
    pub fuel_move: Option<f64>,
    pub supply: Option<f64>,
    pub ecm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agility: Option<f64>,
    pub travel_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flying_altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_refuel_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_repair_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rearm_time: Option<f64>,
    pub specialities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_command: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dangerousness: Option<f64>,
    pub movement_type: MovementType,
    pub occupiable_terrains: Vec<String>,
    pub is_special_forces: bool,
    pub xp_bonuses: String,
    pub has_defensive_smoke: bool,
    pub is_sellable: bool,
    pub weapons: Vec<WeaponRecord>,
    pub divisions: Vec<String>,
}

sanitize_fields!(UnitRecord {
    stats: [
        command_points,
        max_damage,
        speed,
        road_speed,
        rotation_time,
        optics,
        air_optics,
        stealth,
        fuel,
        fuel_move,
        supply,
        ecm,
        agility,
        travel_time,
        flying_altitude,
        max_refuel_time,
        max_repair_time,
        max_rearm_time,
        dangerousness,
    ],
    nested: [armor, sensors, weapons]
});

/// One entry of a division's unit rule list.
#[derive(Clone, Builder, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRule {
    unit_descriptor: String,
    available_transport_list: Option<Vec<String>>,
    available_without_transport: Option<bool>,
    number_of_units_in_pack: Option<u32>,
    #[builder(default)]
    number_of_unit_in_pack_xp_multiplier: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_pack_number: Option<u32>,
}

impl UnitRule {
    pub fn unit_descriptor(&self) -> &str {
        &self.unit_descriptor
    }

    pub fn available_transport_list(&self) -> Option<&[String]> {
        self.available_transport_list.as_deref()
    }

    pub fn available_without_transport(&self) -> Option<bool> {
        self.available_without_transport
    }

    pub fn number_of_units_in_pack(&self) -> Option<u32> {
        self.number_of_units_in_pack
    }

    pub fn number_of_unit_in_pack_xp_multiplier(&self) -> &[f64] {
        &self.number_of_unit_in_pack_xp_multiplier
    }

    pub fn max_pack_number(&self) -> Option<u32> {
        self.max_pack_number
    }
}

/// A division's pack, with the matching unit rule folded in.
#[derive(Clone, Builder, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackRecord {
    pack_descriptor: String,
    unit_descriptor: String,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    rule: Option<PackRuleFields>,
    number_of_cards: u32,
}

impl PackRecord {
    pub fn pack_descriptor(&self) -> &str {
        &self.pack_descriptor
    }

    pub fn unit_descriptor(&self) -> &str {
        &self.unit_descriptor
    }

    pub fn rule(&self) -> Option<&PackRuleFields> {
        self.rule.as_ref()
    }

    pub fn number_of_cards(&self) -> u32 {
        self.number_of_cards
    }
}

/// The rule fields a pack carries, without the duplicated unit descriptor.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackRuleFields {
    pub available_transport_list: Option<Vec<String>>,
    pub available_without_transport: Option<bool>,
    pub number_of_units_in_pack: Option<u32>,
    pub number_of_unit_in_pack_xp_multiplier: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pack_number: Option<u32>,
}

impl From<&UnitRule> for PackRuleFields {
    fn from(rule: &UnitRule) -> Self {
        Self {
            available_transport_list: rule.available_transport_list.clone(),
            available_without_transport: rule.available_without_transport,
            number_of_units_in_pack: rule.number_of_units_in_pack,
            number_of_unit_in_pack_xp_multiplier: rule.number_of_unit_in_pack_xp_multiplier.clone(),
            max_pack_number: rule.max_pack_number,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostMatrixRow {
    pub name: String,
    pub activation_costs: Vec<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CostMatrixRecord {
    pub name: String,
    pub matrix: Vec<CostMatrixRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionRecord {
    pub descriptor: String,
    pub id: Option<u32>,
    pub name: String,
    pub alliance: Option<String>,
    pub country: Option<String>,
    pub tags: Vec<String>,
    pub max_activation_points: Option<i64>,
    pub cost_matrix: Option<CostMatrixRecord>,
    pub packs: Vec<PackRecord>,
}

impl DivisionRecord {
    /// Whether any pack of this division fields `unit_descriptor`.
    pub fn fields_unit(&self, unit_descriptor: &str) -> bool {
        self.packs
            .iter()
            .any(|pack| pack.unit_descriptor() == unit_descriptor)
    }
}

/// Damage multiplier a terrain applies to one resistance family.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResistanceModifier {
    #[serde(rename = "type")]
    pub family: String,
    pub value: Option<f64>,
}

sanitize_fields!(ResistanceModifier { stats: [value] });

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageFamilyModifiers {
    pub damage_family: String,
    pub resistances: Vec<ResistanceModifier>,
}

sanitize_fields!(DamageFamilyModifiers { stats: [], nested: [resistances] });

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainResistance {
    pub name: String,
    pub damage_families: Vec<DamageFamilyModifiers>,
}

sanitize_fields!(TerrainResistance { stats: [], nested: [damage_families] });

/// `DamageFamily_<family> MaxIndex=<n>` and its resistance counterpart.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyDefinition {
    pub family: String,
    pub max_index: Option<f64>,
}

sanitize_fields!(FamilyDefinition { stats: [max_index] });

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SuppressionException {
    pub exception: String,
    pub suppression: Option<FamilyDefinition>,
}

sanitize_fields!(SuppressionException { stats: [], nested: [suppression] });

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IgnoredArmor {
    pub damage_family: String,
    pub resistances: Vec<String>,
}

/// Everything the damage calculator needs besides unit and weapon stats.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageTable {
    pub resistance_family_with_indexes: Vec<FamilyDefinition>,
    pub damage_family_with_indexes: Vec<FamilyDefinition>,
    pub damage_table: Vec<Vec<Option<f64>>>,
    pub bonus_precision: f64,
    pub terrain_resistances: Vec<TerrainResistance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_suppress_damage: Option<FamilyDefinition>,
    pub suppression_damage_exceptions: Vec<SuppressionException>,
    pub armor_to_ignore_for_damage_families: Vec<IgnoredArmor>,
}

impl Sanitize for DamageTable {
    fn sanitize(&mut self) {
        self.resistance_family_with_indexes.sanitize();
        self.damage_family_with_indexes.sanitize();
        for row in &mut self.damage_table {
            row.iter_mut().for_each(sanitize_stat);
        }
        self.terrain_resistances.sanitize();
        self.default_suppress_damage.sanitize();
        self.suppression_damage_exceptions.sanitize();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sanitize_replaces_non_finite_stats() {
        let mut smoke = SmokeRecord::builder()
            .altitude(f64::NAN)
            .life_span(12.0)
            .radius(f64::INFINITY)
            .build();
        smoke.sanitize();
        assert_eq!(smoke.altitude(), None);
        assert_eq!(smoke.life_span(), Some(12.0));
        assert_eq!(smoke.radius(), None);
        assert_eq!(
            serde_json::to_string(&smoke).unwrap(),
            r#"{"altitude":null,"lifeSpan":12.0,"radius":null}"#
        );
    }

    #[test]
    fn sanitize_walks_nested_records() {
        let mut bands = vec![SensorProfile {
            optics: BandValues {
                standard: Some(f64::NAN),
                low_altitude: Some(80.0),
                high_altitude: None,
            },
            vision_ranges: BandValues::default(),
        }];
        bands.sanitize();
        assert_eq!(bands[0].optics.standard, None);
        assert_eq!(bands[0].optics.low_altitude, Some(80.0));
    }

    #[test]
    fn pack_flattens_rule_fields() {
        let rule = UnitRule::builder()
            .unit_descriptor("Descriptor_Unit_M1A1".to_string())
            .available_without_transport(true)
            .number_of_units_in_pack(4)
            .number_of_unit_in_pack_xp_multiplier(vec![1.0, 0.75])
            .build();
        let pack = PackRecord::builder()
            .pack_descriptor("Descriptor_Deck_Pack_M1A1".to_string())
            .unit_descriptor(rule.unit_descriptor().to_string())
            .rule(PackRuleFields::from(&rule))
            .number_of_cards(2)
            .build();
        let json = serde_json::to_value(&pack).unwrap();
        assert_eq!(json["unitDescriptor"], "Descriptor_Unit_M1A1");
        assert_eq!(json["numberOfUnitsInPack"], 4);
        assert_eq!(json["numberOfCards"], 2);
        assert!(json.get("maxPackNumber").is_none());
    }
}

use tracing::debug;
use tracing::warn;

use crate::descriptors::constants;
use crate::descriptors::constants::ACCURACY_BONUS_OVER_RANGE;
use crate::descriptors::constants::AmmoSchema;
use crate::descriptors::constants::HEAT_INSTANT_KILL_OFFSET;
use crate::descriptors::constants::HitRollConstants;
use crate::descriptors::constants::KINETIC_INSTANT_KILL_OFFSET;
use crate::descriptors::fields::Fields;
use crate::descriptors::fields::family_index;
use crate::descriptors::fields::round;
use crate::descriptors::fields::round_to;
use crate::descriptors::index::DescriptorIndex;
use crate::descriptors::keys;
use crate::descriptors::names::LocalizationTable;
use crate::descriptors::names::ammunition_name;
use crate::descriptors::types::AccuracyCurves;
use crate::descriptors::types::AccuracyPoint;
use crate::descriptors::types::AmmunitionRecord;
use crate::descriptors::types::MissileRecord;
use crate::descriptors::types::SmokeRecord;
use crate::ndf::Node;
use crate::ndf::last_path_token;
use crate::ndf::parse_number;
use crate::ndf::strip_quotes;

/// Resolves ammunition descriptors, following their smoke and missile links.
pub struct AmmunitionResolver<'a> {
    smoke: &'a DescriptorIndex,
    missiles: &'a DescriptorIndex,
    hit_roll: HitRollConstants,
    localization: &'a dyn LocalizationTable,
}

impl<'a> AmmunitionResolver<'a> {
    pub fn new(
        smoke: &'a DescriptorIndex,
        missiles: &'a DescriptorIndex,
        hit_roll: HitRollConstants,
        localization: &'a dyn LocalizationTable,
    ) -> Self {
        Self {
            smoke,
            missiles,
            hit_roll,
            localization,
        }
    }

    pub fn resolve(&self, ammunition: &Node) -> AmmunitionRecord {
        let fields = Fields::new(ammunition);
        let descriptor_name = ammunition.name().unwrap_or_default().to_string();
        let schema = AmmoSchema::detect(ammunition);

        let name = ammunition_name(&descriptor_name, fields.text(keys::NAME_TOKEN), self.localization);
        let texture_id = fields
            .text(keys::INTERFACE_WEAPON_TEXTURE)
            .map(|texture| strip_quotes(texture).replace(keys::TEXTURE_PREFIX, ""))
            .unwrap_or_default();
        let traits = fields
            .value(keys::TRAITS_TOKEN)
            .map(|traits| traits.items().iter().filter_map(Node::text).map(strip_quotes).collect())
            .unwrap_or_default();

        let ground_max_range = fields.rounded(&keys::GROUND_MAX_RANGE).unwrap_or(0.0);
        let heli_max_range = fields.rounded(&keys::HELI_MAX_RANGE).unwrap_or(0.0);
        let plane_max_range = fields.rounded(&keys::PLANE_MAX_RANGE).unwrap_or(0.0);

        let salvo_length = fields.number(&keys::SALVO_LENGTH);
        let reload_time = fields.number(&keys::RELOAD_TIME);
        let time_between_salvos = fields.number(&keys::TIME_BETWEEN_SHOTS);
        let ammunition_per_salvo = fields.number(&keys::AMMO_PER_SALVO);
        let cycle = firing_cycle(salvo_length, time_between_salvos, reload_time);

        let modifiers = fields
            .value(keys::BASE_HIT_VALUE_MODIFIERS)
            .map(hit_value_modifiers)
            .unwrap_or_default();
        let static_accuracy = modifier(&modifiers, keys::HIT_MODIFIER_IDLING);
        let moving_accuracy = modifier(&modifiers, keys::HIT_MODIFIER_MOVING);
        let distance_to_target = fields.has(keys::DISTANCE_TO_TARGET_FLAG);

        let max_successive_hit_count = fields.number(&keys::MAX_SUCCESSIVE_HITS);
        let bonus_per_shot = |accuracy: Option<f64>| {
            max_successive_hit_count.and(accuracy.map(|accuracy| accuracy * self.hit_roll.bonus_precision()))
        };
        let static_precision_bonus_per_shot = bonus_per_shot(static_accuracy);
        let moving_precision_bonus_per_shot = bonus_per_shot(moving_accuracy);
        let max_accuracy = |accuracy: Option<f64>, bonus: Option<f64>| {
            let count = max_successive_hit_count?;
            Some(accuracy? + bonus? * count)
        };

        let damage_drop_off = fields
            .text(keys::DAMAGE_DROP_OFF)
            .map(last_path_token)
            .and_then(constants::drop_off);
        let (damage_family, damage_index) = fields
            .value(keys::DAMAGE_TYPE)
            .or_else(|| fields.value(keys::DAMAGE_WEAPON))
            .and_then(|damage| family_index(damage, keys::DAMAGE_FAMILY_PREFIX, keys::INDEX))
            .map(|(family, index)| (Some(family), index))
            .unwrap_or_default();
        let piercing_weapon = fields.flag(keys::PIERCING_WEAPON);
        let is_kinetic = piercing_weapon && damage_family.as_deref() == Some(keys::ARMOR_PIERCING_FAMILY);
        let kinetic_ap = damage_index
            .zip(damage_drop_off)
            .map(|(index, drop_off)| round(index - ground_max_range / drop_off) + schema.kinetic_adjustment());
        let heat_ap = damage_index;
        let (penetration, insta_kill_at_max_range_armour) = if is_kinetic {
            (kinetic_ap, kinetic_ap.map(|ap| ap - KINETIC_INSTANT_KILL_OFFSET))
        } else {
            (heat_ap, heat_ap.map(|ap| ap - HEAT_INSTANT_KILL_OFFSET))
        };

        let smoke = fields
            .text(keys::SMOKE_DESCRIPTOR)
            .filter(|path| *path != keys::NIL)
            .and_then(|path| self.resolve_smoke(&descriptor_name, path));
        let missile = fields
            .text(keys::MISSILE_DESCRIPTOR)
            .filter(|path| *path != keys::NIL)
            .and_then(|path| self.resolve_missile(&descriptor_name, path));

        debug!(ammunition = %descriptor_name, ?schema, ?penetration, "resolved ammunition");

        AmmunitionRecord {
            name,
            descriptor_name,
            texture_id,
            he_damage: fields.number(&keys::HE_DAMAGE).map(|damage| round_to(damage, 2)),
            he_damage_radius: fields.rounded(&keys::HE_RADIUS),
            suppress: fields.number(&keys::SUPPRESS_DAMAGE),
            suppress_damages_radius: fields.rounded(&keys::SUPPRESS_RADIUS),
            fires_left_to_right: fields.flag(keys::DISPERSION_WITHOUT_SORTING),
            ground_max_range,
            ground_min_range: fields.rounded(&keys::GROUND_MIN_RANGE).unwrap_or(0.0),
            heli_max_range,
            heli_min_range: fields.rounded(&keys::HELI_MIN_RANGE).unwrap_or(0.0),
            plane_max_range,
            plane_min_range: fields.rounded(&keys::PLANE_MIN_RANGE).unwrap_or(0.0),
            aiming_time: fields.number(&keys::AIMING_TIME),
            reload_time,
            salvo_length,
            time_between_salvos,
            ammunition_per_salvo,
            rate_of_fire: ammunition_per_salvo
                .zip(cycle)
                .map(|(ammunition, cycle)| round(ammunition / cycle * 60.0)),
            true_rate_of_fire: salvo_length
                .zip(cycle)
                .map(|(shots, cycle)| round_to(shots / cycle * 60.0, 2)),
            supply_cost_per_salvo: fields.number(&keys::SUPPLY_COST),
            static_accuracy,
            moving_accuracy,
            static_accuracy_over_distance: distance_to_target.then(|| {
                accuracy_curves(static_accuracy, ground_max_range, heli_max_range, plane_max_range)
            }),
            moving_accuracy_over_distance: distance_to_target.then(|| {
                accuracy_curves(moving_accuracy, ground_max_range, heli_max_range, plane_max_range)
            }),
            distance_to_target,
            max_successive_hit_count,
            static_precision_bonus_per_shot,
            moving_precision_bonus_per_shot,
            max_static_accuracy: max_accuracy(static_accuracy, static_precision_bonus_per_shot),
            max_moving_accuracy: max_accuracy(moving_accuracy, moving_precision_bonus_per_shot),
            damage_drop_off,
            damage_family,
            damage_index,
            piercing_weapon,
            is_kinetic,
            kinetic_ap,
            heat_ap,
            penetration,
            insta_kill_at_max_range_armour,
            noise_malus: fields.number(&keys::NOISE_MALUS),
            shots_before_max_noise: fields.number(&keys::SHOTS_BEFORE_MAX_NOISE),
            dispersion_at_max_range: fields.rounded(&keys::DISPERSION_AT_MAX_RANGE),
            dispersion_at_min_range: fields.rounded(&keys::DISPERSION_AT_MIN_RANGE),
            min_max_category: fields
                .text(keys::MIN_MAX_CATEGORY)
                .map(|category| last_path_token(category).to_string()),
            missile,
            smoke,
            traits,
        }
    }

    fn resolve_smoke(&self, ammunition: &str, path: &str) -> Option<SmokeRecord> {
        match self.smoke.resolve(path) {
            Ok(node) => Some(smoke_record(node)),
            Err(err) => {
                warn!(ammunition, %err, "smoke descriptor not resolved");
                None
            }
        }
    }

    fn resolve_missile(&self, ammunition: &str, path: &str) -> Option<MissileRecord> {
        match self.missiles.resolve(path) {
            Ok(node) => Some(missile_record(node)),
            Err(err) => {
                warn!(ammunition, %err, "missile descriptor not resolved");
                None
            }
        }
    }
}

pub fn smoke_record(smoke: &Node) -> SmokeRecord {
    let fields = Fields::new(smoke);
    SmokeRecord::builder()
        .maybe_altitude(fields.rounded(&keys::SMOKE_ALTITUDE))
        .maybe_life_span(fields.rounded(&keys::SMOKE_LIFETIME))
        .maybe_radius(fields.rounded(&keys::SMOKE_RADIUS))
        .build()
}

/// Flight characteristics come from the missile's `DefaultConfig`.
pub fn missile_record(missile: &Node) -> MissileRecord {
    let config = missile.find_first(keys::MISSILE_DEFAULT_CONFIG).unwrap_or(missile);
    let fields = Fields::new(config);
    MissileRecord::builder()
        .maybe_max_missile_speed(fields.rounded(&keys::MISSILE_MAX_SPEED))
        .maybe_max_missile_acceleration(fields.rounded(&keys::MISSILE_MAX_ACCELERATION))
        .build()
}

/// Seconds from the first shot of one salvo to the first shot of the next.
/// A single-shot salvo has no inter-shot interval to wait for.
fn firing_cycle(salvo_length: Option<f64>, time_between_shots: Option<f64>, reload: Option<f64>) -> Option<f64> {
    let shots = salvo_length?;
    let between = time_between_shots.or((shots <= 1.0).then_some(0.0))?;
    Some((shots - 1.0) * between + reload?)
}

/// Reads `(modifier, value)` pairs from a `BaseHitValueModifiers` list.
///
/// Accepts a list of tuples, the same pairs flattened into one list, and the
/// older encoding where the `EBaseHitValueModifier` namespace was a separate
/// entry ahead of each modifier name.
pub fn hit_value_modifiers(modifiers: &Node) -> Vec<(String, f64)> {
    let mut tokens = Vec::new();
    for item in modifiers.items() {
        match item {
            Node::Literal(text) => tokens.push(text.as_str()),
            Node::Tuple(pair) | Node::List(pair) => tokens.extend(pair.iter().filter_map(Node::text)),
            _ => {}
        }
    }

    let mut resolved = Vec::new();
    let mut pending: Option<&str> = None;
    for token in tokens {
        match parse_number(token) {
            Some(value) => {
                if let Some(name) = pending.take() {
                    resolved.push((name.to_string(), value));
                }
            }
            None => pending = Some(last_path_token(token)),
        }
    }
    resolved
}

fn modifier(modifiers: &[(String, f64)], name: &str) -> Option<f64> {
    modifiers
        .iter()
        .find(|(modifier, _)| modifier == name)
        .map(|(_, value)| *value)
}

/// Accuracy at each range breakpoint, per band with a non-zero max range.
/// No base accuracy means no curves at all.
pub fn accuracy_curves(base: Option<f64>, ground: f64, helicopter: f64, plane: f64) -> AccuracyCurves {
    let Some(base) = base.filter(|base| *base != 0.0) else {
        return AccuracyCurves::default();
    };

    let curve = |range: f64| {
        (range != 0.0).then(|| {
            ACCURACY_BONUS_OVER_RANGE
                .iter()
                .map(|(fraction, bonus)| AccuracyPoint {
                    distance: round(fraction * range),
                    accuracy: base * (1.0 + bonus / 100.0),
                })
                .collect()
        })
    };

    AccuracyCurves {
        ground: curve(ground),
        helicopter: curve(helicopter),
        plane: curve(plane),
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::descriptors::names::CsvLocalization;

    pub(crate) fn ammo(name: &str, members: Vec<(&str, Node)>) -> Node {
        Node::named_object(name, "TAmmunitionDescriptor", members)
    }

    pub(crate) fn damage_type(family: &str, index: &str) -> Node {
        Node::new_object(
            "TDamageTypeRTTI",
            [("Family", Node::scalar(family)), ("Index", Node::scalar(index))],
        )
    }

    fn resolve_with(smoke: &DescriptorIndex, missiles: &DescriptorIndex, ammunition: &Node) -> AmmunitionRecord {
        let localization = CsvLocalization::default();
        AmmunitionResolver::new(smoke, missiles, HitRollConstants::new(0.1), &localization).resolve(ammunition)
    }

    fn resolve(ammunition: &Node) -> AmmunitionRecord {
        let empty = DescriptorIndex::new("smoke", []);
        resolve_with(&empty, &empty, ammunition)
    }

    #[test]
    fn single_shot_rate_of_fire() {
        let node = ammo(
            "Ammo_ATGM_Milan_2",
            vec![
                ("NbTirParSalves", Node::scalar("1")),
                ("TempsEntreDeuxSalves", Node::scalar("5")),
                ("AffichageMunitionParSalve", Node::scalar("1")),
            ],
        );
        let record = resolve(&node);
        assert_eq!(record.rate_of_fire, Some(12.0));
        assert_eq!(record.true_rate_of_fire, Some(12.0));
        assert_eq!(record.name, "Milan 2");
    }

    #[test]
    fn salvo_rate_of_fire() {
        let node = ammo(
            "Ammo_MMG_7_62mm",
            vec![
                ("ShotsCountPerSalvo", Node::scalar("10")),
                ("TimeBetweenTwoShots", Node::scalar("0.5")),
                ("TimeBetweenTwoSalvos", Node::scalar("(3.5 * Seconde)")),
                ("DisplayedAmmunitionPerSalvo", Node::scalar("50")),
            ],
        );
        let record = resolve(&node);
        // cycle = 9 * 0.5 + 3.5 = 8 seconds
        assert_eq!(record.rate_of_fire, Some(375.0));
        assert_eq!(record.true_rate_of_fire, Some(75.0));
    }

    #[test]
    fn kinetic_penetration_depends_on_schema() {
        let current = ammo(
            "Ammo_Canon_AP_120mm_M829A1",
            vec![
                ("PorteeMaximaleGRU", Node::scalar("4952.5")),
                ("PiercingWeapon", Node::scalar("True")),
                ("Arme", damage_type("DamageFamily_ap", "20")),
                (
                    "DamageTypeEvolutionOverRangeDescriptor",
                    Node::scalar("~/DamageTypeEvolutionOverRangeDescriptor_AP1_1Km"),
                ),
            ],
        );
        let record = resolve(&current);
        assert_eq!(record.ground_max_range, 1750.0);
        assert_eq!(record.damage_family.as_deref(), Some("ap"));
        assert!(record.is_kinetic);
        assert_eq!(record.damage_drop_off, Some(175.0));
        assert_eq!(record.kinetic_ap, Some(11.0));
        assert_eq!(record.penetration, Some(11.0));
        assert_eq!(record.insta_kill_at_max_range_armour, Some(-7.0));

        let legacy = ammo(
            "Ammo_Canon_AP_120mm_M829A1",
            vec![
                ("PorteeMaximale", Node::scalar("(4952.5 * Metre)")),
                ("PiercingWeapon", Node::scalar("True")),
                ("Arme", Node::scalar("DamageFamily_ap Index=20")),
                (
                    "DamageTypeEvolutionOverRangeDescriptor",
                    Node::scalar("~/DamageTypeEvolutionOverRangeDescriptor_AP1_1Km"),
                ),
            ],
        );
        assert_eq!(resolve(&legacy).penetration, Some(10.0));
    }

    #[test]
    fn heat_penetration_is_the_damage_index() {
        let node = ammo(
            "Ammo_ATGM_Milan_2",
            vec![
                ("PiercingWeapon", Node::scalar("True")),
                ("Arme", damage_type("\"DamageFamily_heat\"", "22")),
            ],
        );
        let record = resolve(&node);
        assert!(!record.is_kinetic);
        assert_eq!(record.kinetic_ap, None);
        assert_eq!(record.heat_ap, Some(22.0));
        assert_eq!(record.penetration, Some(22.0));
        assert_eq!(record.insta_kill_at_max_range_armour, Some(8.0));
    }

    #[test]
    fn hit_value_modifier_encodings() {
        let tuples = Node::new_list([
            Node::new_tuple([Node::scalar("EBaseHitValueModifier/Idling"), Node::scalar("45")]),
            Node::new_tuple([Node::scalar("EBaseHitValueModifier/Moving"), Node::scalar("20")]),
        ]);
        let flattened = Node::new_list(
            ["EBaseHitValueModifier/Idling", "45", "EBaseHitValueModifier/Moving", "20"].map(Node::scalar),
        );
        let triples = Node::new_list(
            [
                "EBaseHitValueModifier",
                "Idling",
                "45",
                "EBaseHitValueModifier",
                "Moving",
                "20",
            ]
            .map(Node::scalar),
        );

        let expected = vec![("Idling".to_string(), 45.0), ("Moving".to_string(), 20.0)];
        assert_eq!(hit_value_modifiers(&tuples), expected);
        assert_eq!(hit_value_modifiers(&flattened), expected);
        assert_eq!(hit_value_modifiers(&triples), expected);
    }

    #[test]
    fn accuracy_curves_follow_distance_flag() {
        let modifiers = Node::new_list(["EBaseHitValueModifier/Idling", "30"].map(Node::scalar));
        let without_flag = ammo(
            "Ammo_Canon_HE_105mm",
            vec![
                ("PorteeMaximaleGRU", Node::scalar("2830")),
                ("BaseHitValueModifiers", modifiers.clone()),
            ],
        );
        let record = resolve(&without_flag);
        assert_eq!(record.static_accuracy, Some(30.0));
        assert!(!record.distance_to_target);
        assert!(record.static_accuracy_over_distance.is_none());

        let with_flag = ammo(
            "Ammo_Canon_HE_105mm",
            vec![
                ("PorteeMaximaleGRU", Node::scalar("2830")),
                ("BaseHitValueModifiers", modifiers),
                (
                    "HitModifierList",
                    Node::new_list([Node::scalar("EDiceHitModifier/DistanceToTarget")]),
                ),
            ],
        );
        let record = resolve(&with_flag);
        let curves = record.static_accuracy_over_distance.unwrap();
        let ground = curves.ground.unwrap();
        assert_eq!(ground.len(), 6);
        assert_eq!(ground[0], AccuracyPoint { distance: 50.0, accuracy: 330.0 });
        assert_eq!(ground[5], AccuracyPoint { distance: 1000.0, accuracy: 30.0 });
        assert!(curves.helicopter.is_none());
        assert_eq!(record.moving_accuracy_over_distance, Some(AccuracyCurves::default()));
    }

    #[test]
    fn successive_hits_raise_accuracy() {
        let node = ammo(
            "Ammo_AutoCanon_AP_30mm",
            vec![
                (
                    "BaseHitValueModifiers",
                    Node::new_list(
                        ["EBaseHitValueModifier/Idling", "40", "EBaseHitValueModifier/Moving", "20"]
                            .map(Node::scalar),
                    ),
                ),
                ("MaxSuccessiveHitCount", Node::scalar("5")),
            ],
        );
        let record = resolve(&node);
        assert_eq!(record.static_precision_bonus_per_shot, Some(4.0));
        assert_eq!(record.max_static_accuracy, Some(60.0));
        assert_eq!(record.moving_precision_bonus_per_shot, Some(2.0));
        assert_eq!(record.max_moving_accuracy, Some(30.0));

        let without = ammo("Ammo_AutoCanon_AP_30mm", vec![]);
        assert_eq!(resolve(&without).max_static_accuracy, None);
    }

    #[test]
    fn links_smoke_and_missile_descriptors() {
        let smoke = DescriptorIndex::new(
            "smoke",
            [Node::named_object(
                "Descriptor_Smoke_Vehicle",
                "TSmokeDescriptor",
                [
                    ("AltitudeGRU", Node::scalar("283")),
                    ("TimeToLive", Node::scalar("(30 * Seconde)")),
                    ("RadiusGRU", Node::scalar("566")),
                ],
            )],
        );
        let missiles = DescriptorIndex::new(
            "missiles",
            [Node::named_object(
                "Descriptor_Missile_Milan",
                "TEntityDescriptor",
                [(
                    "DefaultConfig",
                    Node::new_object(
                        "TMissileConfiguration",
                        [
                            ("MaxSpeed", Node::scalar("(566 * Metre)")),
                            ("MaxAcceleration", Node::scalar("(283 * Metre)")),
                        ],
                    ),
                )],
            )],
        );
        let node = ammo(
            "Ammo_ATGM_Milan",
            vec![
                ("SmokeDescriptor", Node::scalar("~/Descriptor_Smoke_Vehicle")),
                ("MissileDescriptor", Node::scalar("$/GFX/Weapon/Descriptor_Missile_Milan")),
                ("TraitsToken", Node::new_list(["'MOTION'", "'HEAT'"].map(Node::scalar))),
                ("InterfaceWeaponTexture", Node::scalar("\"Texture_Interface_Weapon_Milan\"")),
            ],
        );

        let record = resolve_with(&smoke, &missiles, &node);
        let smoke = record.smoke.unwrap();
        assert_eq!(smoke.altitude(), Some(100.0));
        assert_eq!(smoke.life_span(), Some(30.0));
        assert_eq!(smoke.radius(), Some(200.0));
        let missile = record.missile.unwrap();
        assert_eq!(missile.max_missile_speed(), Some(200.0));
        assert_eq!(missile.max_missile_acceleration(), Some(100.0));
        assert_eq!(record.traits, vec!["MOTION", "HEAT"]);
        assert_eq!(record.texture_id, "Milan");
    }

    #[test]
    fn nil_and_unresolved_links_are_absent() {
        let node = ammo(
            "Ammo_ATGM_Milan",
            vec![
                ("SmokeDescriptor", Node::scalar("nil")),
                ("MissileDescriptor", Node::scalar("~/Descriptor_Missile_Missing")),
            ],
        );
        let record = resolve(&node);
        assert!(record.smoke.is_none());
        assert!(record.missile.is_none());
        assert!(record.traits.is_empty());
    }
}

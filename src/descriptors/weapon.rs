use tracing::debug;
use tracing::warn;

use crate::descriptors::ammunition::AmmunitionResolver;
use crate::descriptors::fields::Fields;
use crate::descriptors::fields::round_to;
use crate::descriptors::index::DescriptorIndex;
use crate::descriptors::keys;
use crate::descriptors::types::MountedWeapon;
use crate::descriptors::types::Turret;
use crate::descriptors::types::WeaponRecord;
use crate::error::IResult;
use crate::ndf::Node;

/// Weapons of one weapon manager, merged per salvo slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedWeapons {
    pub weapons: Vec<WeaponRecord>,
    pub has_defensive_smoke: bool,
}

pub struct WeaponResolver<'a> {
    ammunition: &'a DescriptorIndex,
    resolver: AmmunitionResolver<'a>,
}

impl<'a> WeaponResolver<'a> {
    pub fn new(ammunition: &'a DescriptorIndex, resolver: AmmunitionResolver<'a>) -> Self {
        Self { ammunition, resolver }
    }

    /// Resolves every mounted weapon of a `TWeaponManagerModuleDescriptor`
    /// and merges them into one record per used salvo slot.
    pub fn resolve(&self, weapon_manager: &Node) -> ResolvedWeapons {
        let salvos: Vec<f64> = weapon_manager
            .find_first(keys::SALVOS)
            .map(|salvos| salvos.items().iter().filter_map(Node::number).collect())
            .unwrap_or_default();

        let mut has_defensive_smoke = false;
        let mut mounted = Vec::new();
        let turrets = weapon_manager
            .find_first(keys::TURRET_DESCRIPTOR_LIST)
            .map(Node::items)
            .unwrap_or_default();
        for turret_node in turrets {
            let turret = turret(turret_node);
            let mounts = turret_node
                .find_first(keys::MOUNTED_WEAPON_DESCRIPTOR_LIST)
                .map(Node::items)
                .unwrap_or_default();
            for mount in mounts {
                if is_smoke_launcher(mount) {
                    has_defensive_smoke = true;
                    continue;
                }
                match self.mounted_weapon(mount, turret) {
                    Ok(weapon) => mounted.push(weapon),
                    Err(err) => warn!(
                        weapon_manager = weapon_manager.name().unwrap_or_default(),
                        %err,
                        "skipping mounted weapon"
                    ),
                }
            }
        }

        let shown: Vec<&MountedWeapon> = mounted.iter().filter(|weapon| weapon.show_interface).collect();
        let used_slots = salvos.iter().filter(|salvo| **salvo != -1.0).count();

        let weapons = (0..used_slots)
            .filter_map(|slot| {
                let members: Vec<&MountedWeapon> = shown
                    .iter()
                    .copied()
                    .filter(|weapon| weapon.salvo_index == Some(slot))
                    .collect();
                merge_salvo_slot(slot, salvos[slot], &members)
            })
            .collect();

        ResolvedWeapons {
            weapons,
            has_defensive_smoke,
        }
    }

    pub fn mounted_weapon(&self, mount: &Node, turret: Turret) -> IResult<MountedWeapon> {
        let fields = Fields::new(mount);
        let path = fields.text(keys::AMMUNITION).unwrap_or_default();
        let ammunition = self.ammunition.resolve(path)?;

        Ok(MountedWeapon {
            show_interface: fields.flag(keys::SHOW_IN_INTERFACE),
            number_of_weapons: fields.raw_number(keys::NB_WEAPONS).unwrap_or(0.0),
            salvo_index: fields
                .raw_number(keys::SALVO_STOCK_INDEX)
                .filter(|index| *index >= 0.0)
                .map(|index| index as usize),
            ammo: self.resolver.resolve(ammunition),
            turret,
        })
    }
}

/// Rotation speed of a turret. A turret that cannot rotate is a fixed mount.
pub fn turret(turret: &Node) -> Turret {
    let rotation_speed = Fields::new(turret).number(&keys::TURRET_ROTATION);
    Turret {
        has_turret: rotation_speed.is_some_and(|speed| speed != 0.0),
        rotation_speed,
    }
}

fn is_smoke_launcher(mount: &Node) -> bool {
    Fields::new(mount)
        .text(keys::AMMUNITION)
        .is_some_and(|path| path.contains(keys::SMOKE_VEHICLE_AMMO))
}

fn best(merged: Option<f64>, candidate: Option<f64>) -> Option<f64> {
    match (merged, candidate) {
        (Some(merged), Some(candidate)) => Some(merged.max(candidate)),
        (merged, candidate) => merged.or(candidate),
    }
}

fn he_totals(weapon: &MountedWeapon) -> (Option<f64>, Option<f64>) {
    let total = weapon
        .ammo
        .he_damage
        .map(|he| round_to(he * weapon.number_of_weapons, 2));
    let per_salvo = weapon
        .ammo
        .salvo_length
        .zip(total)
        .map(|(length, total)| round_to(length * total, 2));
    (total, per_salvo)
}

/// Merges the mounted weapons sharing one salvo slot. The first member seeds
/// the record, the others fold in by ammunition tag.
pub fn merge_salvo_slot(slot: usize, salvos: f64, members: &[&MountedWeapon]) -> Option<WeaponRecord> {
    let (first, rest) = members.split_first()?;
    let ammo = &first.ammo;
    let (total_he_damage, total_he_per_salvo) = he_totals(first);

    let mut penetration = ammo.penetration;
    let mut merged = WeaponRecord {
        weapon_name: ammo.name.clone(),
        ammo_descriptor_name: ammo.descriptor_name.clone(),
        image_texture: ammo.texture_id.clone(),
        salvo_index: slot,
        show_in_interface: first.show_interface,
        has_turret: first.turret.has_turret,
        turret_rotation_speed: first.turret.rotation_speed,
        number_of_weapons: first.number_of_weapons,
        number_of_salvos: salvos,
        supply_cost: ammo.supply_cost_per_salvo.map(|cost| cost * salvos),
        he: ammo.he_damage,
        he_damage_radius: ammo.he_damage_radius,
        total_he_damage,
        total_he_per_salvo,
        suppress: ammo.suppress,
        suppress_damages_radius: ammo.suppress_damages_radius,
        penetration: 0.0,
        piercing_weapon: ammo.piercing_weapon,
        insta_kill_at_max_range_armour: ammo.insta_kill_at_max_range_armour,
        ground_range: ammo.ground_max_range,
        ground_min_range: ammo.ground_min_range,
        helicopter_range: ammo.heli_max_range,
        helicopter_min_range: ammo.heli_min_range,
        plane_range: ammo.plane_max_range,
        plane_min_range: ammo.plane_min_range,
        aiming_time: ammo.aiming_time,
        reload_time: ammo.reload_time,
        salvo_length: ammo.salvo_length,
        time_between_salvos: ammo.time_between_salvos,
        ammunition_per_salvo: ammo.ammunition_per_salvo,
        rate_of_fire: ammo.rate_of_fire,
        true_rate_of_fire: ammo.true_rate_of_fire,
        static_accuracy: ammo.static_accuracy,
        moving_accuracy: ammo.moving_accuracy,
        static_accuracy_scaling: ammo.static_accuracy_over_distance.clone(),
        moving_accuracy_scaling: ammo.moving_accuracy_over_distance.clone(),
        max_static_accuracy: ammo.max_static_accuracy,
        max_moving_accuracy: ammo.max_moving_accuracy,
        static_precision_bonus_per_shot: ammo.static_precision_bonus_per_shot,
        moving_precision_bonus_per_shot: ammo.moving_precision_bonus_per_shot,
        max_successive_hit_count: ammo.max_successive_hit_count,
        fires_left_to_right: ammo.fires_left_to_right,
        noise_malus: ammo.noise_malus,
        shots_before_max_noise: ammo.shots_before_max_noise,
        dispersion_at_max_range: ammo.dispersion_at_max_range,
        dispersion_at_min_range: ammo.dispersion_at_min_range,
        min_max_category: ammo.min_max_category.clone(),
        missile_properties: ammo.missile.clone(),
        smoke_properties: ammo.smoke.clone(),
        traits: ammo.traits.clone(),
    };

    for member in rest {
        let ammo = &member.ammo;
        let name = ammo.descriptor_name.as_str();
        let armor_piercing = name.contains(keys::AP_TAG);

        if name == merged.ammo_descriptor_name {
            merged.number_of_weapons += member.number_of_weapons;
        }

        if armor_piercing {
            penetration = ammo.penetration;
        }

        if name.contains(keys::HE_TAG) {
            merged.he = ammo.he_damage;
            merged.he_damage_radius = ammo.he_damage_radius;
            (merged.total_he_damage, merged.total_he_per_salvo) = he_totals(member);
        } else if !armor_piercing && keys::GATLING_TAGS.iter().any(|tag| name.contains(tag)) {
            merged.he = ammo.he_damage;
        }

        if ammo.smoke.is_some() {
            merged.smoke_properties = ammo.smoke.clone();
        }

        merged.suppress = best(merged.suppress, ammo.suppress);
        merged.ground_range = merged.ground_range.max(ammo.ground_max_range);
        merged.helicopter_range = merged.helicopter_range.max(ammo.heli_max_range);
        merged.plane_range = merged.plane_range.max(ammo.plane_max_range);
        merged.piercing_weapon |= ammo.piercing_weapon;
    }

    merged.penetration = if merged.piercing_weapon {
        penetration.map_or(1.0, |penetration| penetration.max(1.0))
    } else {
        0.0
    };

    debug!(
        weapon = %merged.ammo_descriptor_name,
        slot,
        members = members.len(),
        penetration = merged.penetration,
        "merged salvo slot"
    );

    Some(merged)
}

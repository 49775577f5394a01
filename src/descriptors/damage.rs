//! The damage table export: family definitions, the damage matrix, terrain
//! resistances and the weapon constants that tweak suppression and armor.

use tracing::debug;

use crate::descriptors::constants::HitRollConstants;
use crate::descriptors::fields::family_index;
use crate::descriptors::keys;
use crate::descriptors::terrain::strip_family;
use crate::descriptors::terrain::terrain_resistances;
use crate::descriptors::types::DamageTable;
use crate::descriptors::types::FamilyDefinition;
use crate::descriptors::types::IgnoredArmor;
use crate::descriptors::types::SuppressionException;
use crate::error::ErrorKind;
use crate::error::IResult;
use crate::ndf::Node;

const CATEGORY: &str = "damage resistance";

fn family_definition(definition: &Node, prefix: &str) -> Option<FamilyDefinition> {
    family_index(definition, prefix, keys::MAX_INDEX).map(|(family, max_index)| FamilyDefinition { family, max_index })
}

fn family_definitions(list: &Node, prefix: &str) -> Vec<FamilyDefinition> {
    list.items()
        .iter()
        .filter_map(|definition| family_definition(definition, prefix))
        .collect()
}

/// Builds the damage table. The damage resistance tree is mandatory, the
/// weapon constants are not.
pub fn damage_table(
    damage_resistance: &[Node],
    hit_roll: HitRollConstants,
    terrains: &[Node],
    weapon_constants: Option<&[Node]>,
) -> IResult<DamageTable> {
    let root = damage_resistance
        .first()
        .ok_or_else(|| ErrorKind::MalformedDescriptorFile {
            category: CATEGORY,
            detail: "no descriptors".to_string(),
        })?;
    let (resistance_families, damage_families) = match root.members() {
        [resistances, damages, ..] => (&resistances.value, &damages.value),
        _ => {
            return Err(ErrorKind::MalformedDescriptorFile {
                category: CATEGORY,
                detail: "expected resistance and damage family lists".to_string(),
            });
        }
    };

    let damage_table = root
        .find_first(keys::DAMAGE_TABLE_VALUES)
        .map(|rows| {
            rows.items()
                .iter()
                .map(|row| row.items().iter().map(Node::number).collect())
                .collect()
        })
        .unwrap_or_default();

    let constants = weapon_constants.and_then(<[Node]>::first);
    let table = DamageTable {
        resistance_family_with_indexes: family_definitions(resistance_families, keys::RESISTANCE_FAMILY_PREFIX),
        damage_family_with_indexes: family_definitions(damage_families, keys::DAMAGE_FAMILY_PREFIX),
        damage_table,
        bonus_precision: hit_roll.bonus_precision(),
        terrain_resistances: terrain_resistances(terrains),
        default_suppress_damage: constants.and_then(default_suppress_damage),
        suppression_damage_exceptions: constants.map(suppression_exceptions).unwrap_or_default(),
        armor_to_ignore_for_damage_families: constants.map(ignored_armor).unwrap_or_default(),
    };

    debug!(
        resistance_families = table.resistance_family_with_indexes.len(),
        damage_families = table.damage_family_with_indexes.len(),
        rows = table.damage_table.len(),
        "built damage table"
    );

    Ok(table)
}

fn default_suppress_damage(constants: &Node) -> Option<FamilyDefinition> {
    let definition = constants.find_first(keys::DEFAULT_SUPPRESS_DAMAGE)?;
    family_definition(definition, keys::DAMAGE_FAMILY_PREFIX)
}

fn suppression_exceptions(constants: &Node) -> Vec<SuppressionException> {
    let Some(per_family) = constants.find_first(keys::SUPPRESS_DAMAGE_PER_FAMILY) else {
        return Vec::new();
    };
    per_family
        .pairs()
        .into_iter()
        .filter_map(|(family, suppression)| {
            Some(SuppressionException {
                exception: strip_family(family.text()?, keys::DAMAGE_FAMILY_PREFIX),
                suppression: family_definition(suppression, keys::DAMAGE_FAMILY_PREFIX),
            })
        })
        .collect()
}

fn ignored_armor(constants: &Node) -> Vec<IgnoredArmor> {
    let Some(blindages) = constants.find_first(keys::BLINDAGES_TO_IGNORE) else {
        return Vec::new();
    };
    blindages
        .pairs()
        .into_iter()
        .filter_map(|(family, resistances)| {
            Some(IgnoredArmor {
                damage_family: strip_family(family.text()?, keys::DAMAGE_FAMILY_PREFIX),
                resistances: resistances
                    .items()
                    .iter()
                    .filter_map(Node::text)
                    .map(|resistance| strip_family(resistance, keys::RESISTANCE_FAMILY_PREFIX))
                    .collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::descriptors::terrain::test::terrain;

    fn definition(text: &str) -> Node {
        Node::new_object("TFamilyDefinition", [("Definition", Node::scalar(text))])
    }

    fn damage_resistance() -> Vec<Node> {
        vec![Node::named_object(
            "DamageResistance",
            "TDamageResistanceContainer",
            [
                (
                    "ResistanceFamilyDefinitionList",
                    Node::new_list([
                        definition("ResistanceFamily_blindage MaxIndex=20"),
                        definition("ResistanceFamily_infanterie MaxIndex=1"),
                    ]),
                ),
                (
                    "DamageFamilyDefinitionList",
                    Node::new_list([definition("DamageFamily_ap MaxIndex=30")]),
                ),
                (
                    "Values",
                    Node::new_list([
                        Node::new_list([Node::scalar("1"), Node::scalar("0.5")]),
                        Node::new_list([Node::scalar("0"), Node::scalar("nil")]),
                    ]),
                ),
            ],
        )]
    }

    fn weapon_constants() -> Vec<Node> {
        vec![Node::named_object(
            "WeaponConstantes",
            "TWeaponConstantes",
            [
                ("DefaultSuppressDamage", definition("DamageFamily_suppress MaxIndex=1")),
                (
                    "SuppressDamagePerFamily",
                    Node::new_list([Node::new_tuple([
                        Node::scalar("DamageFamily_flamme"),
                        definition("DamageFamily_suppress_flamme MaxIndex=1"),
                    ])]),
                ),
                (
                    "BlindagesToIgnoreForDamageFamilies",
                    Node::new_list([Node::new_tuple([
                        Node::scalar("DamageFamily_sniper"),
                        Node::new_list([Node::scalar("ResistanceFamily_blindage"), Node::scalar("ResistanceFamily_helico")]),
                    ])]),
                ),
            ],
        )]
    }

    #[test]
    fn reads_families_and_matrix() {
        let terrains = vec![terrain("Batiment", "0.5", "0.5", "0.5")];
        let constants = weapon_constants();
        let table = damage_table(
            &damage_resistance(),
            HitRollConstants::new(0.1),
            &terrains,
            Some(constants.as_slice()),
        )
        .unwrap();

        assert_eq!(table.resistance_family_with_indexes.len(), 2);
        assert_eq!(table.resistance_family_with_indexes[0].family, "blindage");
        assert_eq!(table.resistance_family_with_indexes[0].max_index, Some(20.0));
        assert_eq!(table.damage_family_with_indexes[0].family, "ap");
        assert_eq!(table.damage_table, vec![vec![Some(1.0), Some(0.5)], vec![Some(0.0), None]]);
        assert_eq!(table.bonus_precision, 0.1);
        assert_eq!(table.terrain_resistances[0].name, "Batiment");

        assert_eq!(table.default_suppress_damage.as_ref().unwrap().family, "suppress");
        assert_eq!(table.suppression_damage_exceptions[0].exception, "flamme");
        assert_eq!(
            table.suppression_damage_exceptions[0].suppression.as_ref().unwrap().family,
            "suppress_flamme"
        );
        assert_eq!(table.armor_to_ignore_for_damage_families[0].damage_family, "sniper");
        assert_eq!(
            table.armor_to_ignore_for_damage_families[0].resistances,
            vec!["blindage", "helico"]
        );
    }

    #[test]
    fn weapon_constants_are_optional() {
        let table = damage_table(&damage_resistance(), HitRollConstants::new(0.1), &[], None).unwrap();
        assert!(table.default_suppress_damage.is_none());
        assert!(table.suppression_damage_exceptions.is_empty());
        assert!(table.armor_to_ignore_for_damage_families.is_empty());
        let json = serde_json::to_value(&table).unwrap();
        assert!(json.get("defaultSuppressDamage").is_none());
        assert_eq!(json["armorToIgnoreForDamageFamilies"], serde_json::json!([]));
    }

    #[test]
    fn missing_family_lists_are_fatal() {
        let err = damage_table(&[], HitRollConstants::new(0.1), &[], None).unwrap_err();
        assert!(err.is_fatal());

        let bare = vec![Node::named_object("DamageResistance", "TDamageResistanceContainer", [])];
        let err = damage_table(&bare, HitRollConstants::new(0.1), &[], None).unwrap_err();
        assert!(matches!(err, ErrorKind::MalformedDescriptorFile { category: "damage resistance", .. }));
    }
}

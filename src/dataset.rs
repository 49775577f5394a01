//! Loading one dataset's descriptor files and assembling the published
//! documents from them.
//!
//! Resolution order matters only for the back-references: divisions are
//! resolved first so every unit can list the divisions that field it.

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::descriptors::ammunition::AmmunitionResolver;
use crate::descriptors::constants::HitRollConstants;
use crate::descriptors::damage::damage_table;
use crate::descriptors::division::DeckIds;
use crate::descriptors::division::DivisionResolver;
use crate::descriptors::division::parse_rules;
use crate::descriptors::index::DescriptorIndex;
use crate::descriptors::names::LocalizationTable;
use crate::descriptors::names::UnitCatalog;
use crate::descriptors::terrain::speed_modifiers;
use crate::descriptors::types::DamageTable;
use crate::descriptors::types::DivisionRecord;
use crate::descriptors::types::Sanitize;
use crate::descriptors::types::UnitRecord;
use crate::descriptors::unit::UnitResolver;
use crate::descriptors::weapon::WeaponResolver;
use crate::error::ErrorKind;
use crate::error::IResult;
use crate::ndf::Node;
use crate::ndf::parser::DescriptorFileLoader;
use crate::ndf::parser::TreeParser;

/// File name of every descriptor category, relative to the dataset root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatasetLayout {
    pub units: String,
    pub ammunition: String,
    pub ammunition_missiles: String,
    pub weapons: String,
    pub rules: String,
    pub divisions: String,
    pub cost_matrix: String,
    pub packs: String,
    pub division_packs: String,
    pub terrain: String,
    pub smoke: String,
    pub missiles: String,
    pub buildings: String,
    pub deck_serializer: String,
    pub hit_roll_constants: String,
    pub damage_resistance: String,
    pub weapon_constants: String,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            units: "UniteDescriptor.ndf.json".to_string(),
            ammunition: "Ammunition.ndf.json".to_string(),
            ammunition_missiles: "AmmunitionMissiles.ndf.json".to_string(),
            weapons: "WeaponDescriptor.ndf.json".to_string(),
            rules: "DivisionRules.ndf.json".to_string(),
            divisions: "Divisions.ndf.json".to_string(),
            cost_matrix: "DivisionCostMatrix.ndf.json".to_string(),
            packs: "Packs.ndf.json".to_string(),
            division_packs: "DivisionPacks.ndf.json".to_string(),
            terrain: "Terrains.ndf.json".to_string(),
            smoke: "SmokeDescriptor.ndf.json".to_string(),
            missiles: "MissileDescriptors.ndf.json".to_string(),
            buildings: "BuildingDescriptors.ndf.json".to_string(),
            deck_serializer: "DeckSerializer.ndf.json".to_string(),
            hit_roll_constants: "HitRollConstants.ndf.json".to_string(),
            damage_resistance: "DamageResistance.ndf.json".to_string(),
            weapon_constants: "WeaponConstantes.ndf.json".to_string(),
        }
    }
}

impl DatasetLayout {
    /// Reads a layout override. Categories the file leaves out keep their
    /// default file name.
    pub fn from_toml(text: &str) -> IResult<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// The parsed trees of one dataset.
#[derive(Debug, Clone, Default)]
pub struct DescriptorFiles {
    pub units: Vec<Node>,
    pub ammunition: Vec<Node>,
    pub ammunition_missiles: Vec<Node>,
    pub weapons: Vec<Node>,
    pub rules: Vec<Node>,
    pub divisions: Vec<Node>,
    pub cost_matrices: Vec<Node>,
    pub packs: Vec<Node>,
    pub division_packs: Vec<Node>,
    pub terrains: Vec<Node>,
    pub smoke: Vec<Node>,
    pub missiles: Vec<Node>,
    pub buildings: Vec<Node>,
    pub deck_serializer: Vec<Node>,
    pub hit_roll_constants: Vec<Node>,
    pub damage_resistance: Vec<Node>,
    pub weapon_constants: Option<Vec<Node>>,
}

struct TreeReader<'a, L: ?Sized> {
    loader: &'a L,
    parser: &'a dyn TreeParser,
}

impl<L: DescriptorFileLoader + ?Sized> TreeReader<'_, L> {
    fn optional(&self, category: &'static str, path: &str) -> IResult<Option<Vec<Node>>> {
        let Some(text) = self.loader.get(path)? else {
            debug!(category, path, "optional descriptor file not present");
            return Ok(None);
        };
        let nodes = self.parser.parse(&text)?;
        debug!(category, path, descriptors = nodes.len(), "loaded descriptor file");
        Ok(Some(nodes))
    }

    fn required(&self, category: &'static str, path: &str) -> IResult<Vec<Node>> {
        self.optional(category, path)?
            .ok_or_else(|| ErrorKind::MissingDescriptorFile {
                category,
                path: path.to_string(),
            })
    }
}

impl DescriptorFiles {
    /// Reads and parses every file of `layout`. A missing mandatory file
    /// aborts the load.
    pub fn load<L: DescriptorFileLoader + ?Sized>(
        loader: &L,
        parser: &dyn TreeParser,
        layout: &DatasetLayout,
    ) -> IResult<Self> {
        let reader = TreeReader { loader, parser };
        Ok(Self {
            units: reader.required("units", &layout.units)?,
            ammunition: reader.required("ammunition", &layout.ammunition)?,
            ammunition_missiles: reader
                .optional("ammunition missiles", &layout.ammunition_missiles)?
                .unwrap_or_default(),
            weapons: reader.required("weapons", &layout.weapons)?,
            rules: reader.required("rules", &layout.rules)?,
            divisions: reader.required("divisions", &layout.divisions)?,
            cost_matrices: reader.required("cost matrix", &layout.cost_matrix)?,
            packs: reader.optional("packs", &layout.packs)?.unwrap_or_default(),
            division_packs: reader
                .optional("division packs", &layout.division_packs)?
                .unwrap_or_default(),
            terrains: reader.required("terrain", &layout.terrain)?,
            smoke: reader.required("smoke", &layout.smoke)?,
            missiles: reader.required("missiles", &layout.missiles)?,
            buildings: reader.optional("buildings", &layout.buildings)?.unwrap_or_default(),
            deck_serializer: reader.required("deck serializer", &layout.deck_serializer)?,
            hit_roll_constants: reader.required("hit roll constants", &layout.hit_roll_constants)?,
            damage_resistance: reader.required("damage resistance", &layout.damage_resistance)?,
            weapon_constants: reader.optional("weapon constants", &layout.weapon_constants)?,
        })
    }
}

/// The full dataset document.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub units: Vec<UnitRecord>,
    pub divisions: Vec<DivisionRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrippedUnit<'a> {
    pub descriptor_name: &'a str,
    pub id: Option<u32>,
    pub factory_descriptor_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_command: Option<bool>,
    pub divisions: &'a [String],
}

/// The reduced document the deck builder loads: unit identities and the
/// full divisions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StrippedDataset<'a> {
    pub units: Vec<StrippedUnit<'a>>,
    pub divisions: &'a [DivisionRecord],
}

impl Dataset {
    pub fn stripped(&self) -> StrippedDataset<'_> {
        StrippedDataset {
            units: self
                .units
                .iter()
                .map(|unit| StrippedUnit {
                    descriptor_name: &unit.descriptor_name,
                    id: unit.id,
                    factory_descriptor_name: unit.factory_descriptor.as_deref(),
                    is_command: unit.is_command,
                    divisions: &unit.divisions,
                })
                .collect(),
            divisions: &self.divisions,
        }
    }

    pub fn unit(&self, descriptor: &str) -> Option<&UnitRecord> {
        self.units.iter().find(|unit| unit.descriptor_name == descriptor)
    }

    pub fn division(&self, descriptor: &str) -> Option<&DivisionRecord> {
        self.divisions.iter().find(|division| division.descriptor == descriptor)
    }
}

impl Sanitize for Dataset {
    fn sanitize(&mut self) {
        self.units.sanitize();
    }
}

/// Everything produced from one dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct AssembledDataset {
    pub dataset: Dataset,
    pub damage_table: DamageTable,
}

/// Name sources used while resolving.
#[derive(Clone, Copy)]
pub struct NameSources<'a> {
    pub catalog: &'a dyn UnitCatalog,
    pub localization: &'a dyn LocalizationTable,
}

/// Resolves every division and unit of `files`.
///
/// Only the deck serializer, hit roll constants and damage resistance trees
/// can fail the assembly. Every other problem is confined to the entity it
/// occurs in and logged.
pub fn assemble(files: DescriptorFiles, names: NameSources<'_>) -> IResult<AssembledDataset> {
    let ids = DeckIds::from_nodes(&files.deck_serializer)?;
    let hit_roll = HitRollConstants::from_nodes(&files.hit_roll_constants)?;
    let mut damage_table = damage_table(
        &files.damage_resistance,
        hit_roll,
        &files.terrains,
        files.weapon_constants.as_deref(),
    )?;

    let smoke = DescriptorIndex::new("smoke", files.smoke);
    let missiles = DescriptorIndex::new("missiles", files.missiles);
    let mut ammunition = DescriptorIndex::new("ammunition", files.ammunition);
    ammunition.extend(files.ammunition_missiles);
    let weapons = DescriptorIndex::new("weapons", files.weapons);
    let cost_matrices = DescriptorIndex::new("cost matrix", files.cost_matrices);

    let packs = if files.packs.iter().any(Node::is_object) {
        DescriptorIndex::new("packs", files.packs)
    } else {
        warn!("no packs in packs file, using division packs");
        DescriptorIndex::new("packs", files.division_packs)
    };

    let rules = parse_rules(&files.rules);
    let divisions = DivisionResolver::new(&rules, &packs, &cost_matrices, &ids).resolve_all(&files.divisions);

    let speed_modifiers = speed_modifiers(&files.terrains);
    let ammunition_resolver = AmmunitionResolver::new(&smoke, &missiles, hit_roll, names.localization);
    let weapon_resolver = WeaponResolver::new(&ammunition, ammunition_resolver);
    let unit_resolver = UnitResolver::new(&speed_modifiers, &weapons, weapon_resolver, &ids, names.catalog);

    let mut units: Vec<UnitRecord> = files
        .units
        .iter()
        .filter(|unit| unit.is_object())
        .map(|unit| {
            let mut record = unit_resolver.resolve(unit);
            record.divisions = divisions
                .iter()
                .filter(|division| division.fields_unit(&record.descriptor_name))
                .map(|division| division.descriptor.clone())
                .collect();
            record
        })
        .collect();
    let unit_count = units.len();
    units.extend(
        files
            .buildings
            .iter()
            .filter(|building| building.is_object())
            .map(|building| unit_resolver.resolve(building)),
    );

    let mut dataset = Dataset { units, divisions };
    dataset.sanitize();
    damage_table.sanitize();

    info!(
        units = unit_count,
        buildings = dataset.units.len() - unit_count,
        divisions = dataset.divisions.len(),
        "assembled dataset"
    );

    Ok(AssembledDataset { dataset, damage_table })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn layout_override_keeps_defaults() {
        let layout = DatasetLayout::from_toml(
            r#"
            units = "Units.json"
            weapon_constants = "Constants/Weapons.json"
            "#,
        )
        .unwrap();
        assert_eq!(layout.units, "Units.json");
        assert_eq!(layout.weapon_constants, "Constants/Weapons.json");
        assert_eq!(layout.ammunition, DatasetLayout::default().ammunition);
    }

    #[test]
    fn bad_layout_is_a_toml_error() {
        let err = DatasetLayout::from_toml("units = 4").unwrap_err();
        assert!(matches!(err, ErrorKind::Toml { .. }));
    }
}

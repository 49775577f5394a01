//! Display names for descriptors.
//!
//! Localized names come from two optional sources: a unit catalog keyed by
//! unit descriptor, and a token table for everything with a `Name` token.
//! When neither knows a descriptor, a readable name is derived from the
//! descriptor identifier itself.

use std::collections::HashMap;
use std::io::Read;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::descriptors::keys;
use crate::error::IResult;
use crate::ndf::strip_quotes;

/// A unit's entry in the unit catalog.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UnitCard {
    pub descriptor: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub code: String,
}

pub trait UnitCatalog {
    fn find_by_descriptor(&self, descriptor: &str) -> Option<&UnitCard>;
}

/// Unit catalog loaded from a JSON array of [`UnitCard`]s.
#[derive(Clone, Debug, Default)]
pub struct JsonUnitCatalog {
    cards: HashMap<String, UnitCard>,
}

impl JsonUnitCatalog {
    pub fn from_json(text: &str) -> IResult<Self> {
        let cards: Vec<UnitCard> = serde_json::from_str(text)?;
        Ok(cards.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl FromIterator<UnitCard> for JsonUnitCatalog {
    fn from_iter<I: IntoIterator<Item = UnitCard>>(iter: I) -> Self {
        Self {
            cards: iter
                .into_iter()
                .map(|card| (card.descriptor.clone(), card))
                .collect(),
        }
    }
}

impl UnitCatalog for JsonUnitCatalog {
    fn find_by_descriptor(&self, descriptor: &str) -> Option<&UnitCard> {
        self.cards.get(descriptor)
    }
}

pub trait LocalizationTable {
    /// Localized text for a raw `Name` token, quotes already stripped.
    fn localized(&self, token: &str) -> Option<&str>;
}

/// Token table read from `token;text` CSV lines.
#[derive(Clone, Debug, Default)]
pub struct CsvLocalization {
    entries: HashMap<String, String>,
}

impl CsvLocalization {
    pub fn from_reader(reader: impl Read) -> IResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut entries = HashMap::new();
        for record in reader.records() {
            let record = record?;
            if let (Some(token), Some(text)) = (record.get(0), record.get(1)) {
                entries.insert(token.trim().to_string(), text.to_string());
            }
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LocalizationTable for CsvLocalization {
    fn localized(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }
}

/// Display name of an ammunition descriptor.
pub fn ammunition_name(descriptor: &str, name_token: Option<&str>, localization: &dyn LocalizationTable) -> String {
    name_token
        .and_then(|token| localization.localized(&strip_quotes(token)))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| prettify_ammunition_name(descriptor))
}

/// Display name and category of a unit descriptor.
pub fn unit_name(descriptor: &str, catalog: &dyn UnitCatalog) -> (String, String) {
    let card = catalog.find_by_descriptor(descriptor);
    let name = card
        .map(|card| card.name.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| prettify_unit_name(descriptor));
    let category = card.map(|card| card.category.clone()).unwrap_or_default();
    (name, category)
}

pub fn prettify_unit_name(descriptor: &str) -> String {
    descriptor
        .strip_prefix(keys::UNIT_DESCRIPTOR_PREFIX)
        .unwrap_or(descriptor)
        .replace('_', " ")
}

static AMMO_AFFIXES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Ammo_|(_late|_early)$").expect("valid regex"));
static HYPHENATED_MODEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(HS|RPK|UPK|G[sS]h|ZU\d*)_").expect("valid regex"));
static HYPHENATED_VARIANT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(UPK|G[sS]h)-\d*_").expect("valid regex"));
static CALIBER_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d*[Mm]{2}").expect("valid regex"));
static SPACE_BEFORE_MM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s(mm)").expect("valid regex"));
static AMMO_CLASS_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(Howz Canon|Howz|Canon AP|Canon HEAT|Canon HE|MMG inf|MMG|HMG inf|HMG|ATGM|Mortier|AutoCanon AP|AutoCanon HE|AutoCanon|DCA \d canons?|RocketInf|Grenade|RocketArt thermobaric|RocketArt|AA |GatlingAir|RocketAir|Bomb CBU|Bomb|FakeRoquette|SAM |Lance grenade|Gatling|Pod|flamethrower|MANPAD|FM |PM |Canon|AGM)",
    )
    .expect("valid regex")
});

/// Derives a readable name from an ammunition descriptor.
///
/// `Ammo_Canon_AP_120mm_M829A1_late` becomes `120mm M829A1` and
/// `Ammo_MMG_7_62mm` becomes `7.62mm`. Model designations such as
/// `GSh_30_2` keep their digits apart as `GSh-30-2`.
pub fn prettify_ammunition_name(descriptor: &str) -> String {
    let name = AMMO_AFFIXES.replace_all(descriptor, "");
    let name = HYPHENATED_MODEL.replace(&name, "${1}-");
    let name = hyphenate_variant(&name);
    let name = join_caliber_digits(&name.replace('_', " "));
    let name = SPACE_BEFORE_MM.replace_all(&name, "$1");
    let name = AMMO_CLASS_PREFIX.replace(&name, "");
    name.trim().to_string()
}

/// `GSh-30_2` -> `GSh-30-2`, unless the digits are a caliber like `_30mm`.
fn hyphenate_variant(name: &str) -> String {
    for found in HYPHENATED_VARIANT.find_iter(name) {
        if CALIBER_SUFFIX.is_match(&name[found.end()..]) {
            continue;
        }
        let underscore = found.end() - 1;
        return format!("{}-{}", &name[..underscore], &name[found.end()..]);
    }
    name.to_string()
}

/// ` 7 62` -> ` 7.62`: a space between digit groups that follow another
/// space becomes a decimal point.
fn join_caliber_digits(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let next_is_digit = chars.get(i + 1).is_some_and(|next| next.is_ascii_digit());
            if c.is_whitespace() && next_is_digit && follows_spaced_digits(&chars[..i]) {
                '.'
            } else {
                *c
            }
        })
        .collect()
}

fn follows_spaced_digits(before: &[char]) -> bool {
    before
        .iter()
        .rev()
        .find(|c| !c.is_ascii_digit())
        .is_some_and(|c| c.is_whitespace())
}

/// Display names of the multiplayer divisions.
pub const DIVISION_NAMES: &[(&str, &str)] = &[
    ("Descriptor_Deck_Division_RDA_7_Panzer_multi", "7. PanzerDivision"),
    ("Descriptor_Deck_Division_RFA_5_Panzer_multi", "5. PanzerDivision"),
    ("Descriptor_Deck_Division_SOV_79_Gds_Tank_multi", "79-Ya Gv. Tank. Div."),
    ("Descriptor_Deck_Division_US_3rd_Arm_multi", "3rd Armored Division"),
    ("Descriptor_Deck_Division_US_8th_Inf_multi", "8th Infantry Division (Mech.)"),
    ("Descriptor_Deck_Division_NATO_Garnison_Berlin_multi", "Berlin Command"),
    ("Descriptor_Deck_Division_SOV_39_Gds_Rifle_multi", "39-Ya Gv. Motostrelk. Div."),
    ("Descriptor_Deck_Division_RDA_4_MSD_multi", "4. Mot.-Schutzen-Division"),
    ("Descriptor_Deck_Division_RFA_2_PzGrenadier_multi", "2. Pz.Grenadier-Division"),
    ("Descriptor_Deck_Division_SOV_35_AirAslt_Brig_multi", "35-Ya OG Desantno-Shturmovaya Brig."),
    ("Descriptor_Deck_Division_US_82nd_Airborne_multi", "82nd Airborne Division"),
    ("Descriptor_Deck_Division_FR_11e_Para_multi", "11E Division Parachutiste"),
    ("Descriptor_Deck_Division_FR_5e_Blindee_multi", "5E Division Blindee"),
    ("Descriptor_Deck_Division_RDA_KdA_Bezirk_Erfurt_multi", "K.d.A Bezirk Erfurt"),
    ("Descriptor_Deck_Division_RFA_TerrKdo_Sud_multi", "TerritorialKommando Sud"),
    ("Descriptor_Deck_Division_UK_1st_Armoured_multi", "1st Armoured Division"),
    ("Descriptor_Deck_Division_UK_2nd_Infantry_multi", "2nd Infantry Division"),
    ("Descriptor_Deck_Division_WP_Unternehmen_Zentrum_multi", "Berliner Gruppierung"),
    ("Descriptor_Deck_Division_SOV_119IndTkBrig_multi", "119-Y Odt. Tank. Polk"),
    ("Descriptor_Deck_Division_US_11ACR_multi", "11th Arm. Cavalry Regt."),
    ("Descriptor_Deck_Division_SOV_27_Gds_Rifle_multi", "27-Ya Gv. Motostrelk. Div."),
    ("Descriptor_Deck_Division_US_24th_Inf_multi", "24th Infantry Division (Mech.)"),
    ("Descriptor_Deck_Division_SOV_6IndMSBrig_multi", "6-ya Og Motostrelk. Brig."),
    ("Descriptor_Deck_Division_SOV_56_AirAslt_Brig_multi", "56-Ya OG Desantno-Shturmovaya Brig."),
    ("Descriptor_Deck_Division_US_101st_Airmobile_multi", "101st Airborne Division (Air Assault)"),
    ("Descriptor_Deck_Division_US_35th_Inf_multi", "35th Infantry Division (Mech.)"),
    ("Descriptor_Deck_Division_RDA_Rugen_Gruppierung", "Rugener Gruppierung"),
    ("Descriptor_Deck_Division_FR_152e_Infanterie_multi", "152E Division D'Infanterie"),
    ("Descriptor_Deck_Division_SOV_76_VDV_multi", "76-Ya Gv. Tank. Div."),
];

const DIVISION_DESCRIPTOR_PREFIX: &str = "Descriptor_Deck_Division_";
const MULTIPLAYER_SUFFIX: &str = "_multi";

pub fn division_name(descriptor: &str) -> String {
    DIVISION_NAMES
        .iter()
        .find(|(known, _)| *known == descriptor)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| {
            let trimmed = descriptor.strip_prefix(DIVISION_DESCRIPTOR_PREFIX).unwrap_or(descriptor);
            trimmed
                .strip_suffix(MULTIPLAYER_SUFFIX)
                .unwrap_or(trimmed)
                .replace('_', " ")
        })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn prettifies_ammunition_descriptors() {
        assert_eq!(prettify_ammunition_name("Ammo_Canon_AP_120mm_M829A1_late"), "120mm M829A1");
        assert_eq!(prettify_ammunition_name("Ammo_MMG_7_62mm"), "7.62mm");
        assert_eq!(prettify_ammunition_name("Ammo_HMG_12_7_mm"), "12.7mm");
        assert_eq!(prettify_ammunition_name("Ammo_GatlingAir_GSh_30_2_30mm"), "GSh-30-2 30mm");
        assert_eq!(prettify_ammunition_name("Ammo_AutoCanon_HE_ZU23_2_23mm"), "ZU23-2 23mm");
        assert_eq!(prettify_ammunition_name("Ammo_ATGM_Milan_2"), "Milan 2");
    }

    #[test]
    fn unit_names_fall_back_to_descriptor() {
        let catalog: JsonUnitCatalog = [UnitCard {
            descriptor: "Descriptor_Unit_M1A1_Abrams_US".to_string(),
            name: "M1A1 ABRAMS".to_string(),
            category: "TNK".to_string(),
            code: String::new(),
        }]
        .into_iter()
        .collect();

        assert_eq!(
            unit_name("Descriptor_Unit_M1A1_Abrams_US", &catalog),
            ("M1A1 ABRAMS".to_string(), "TNK".to_string())
        );
        assert_eq!(
            unit_name("Descriptor_Unit_T80BV_SOV", &catalog),
            ("T80BV SOV".to_string(), String::new())
        );
    }

    #[test]
    fn catalog_and_localization_load() {
        let catalog = JsonUnitCatalog::from_json(
            r#"[{"descriptor": "Descriptor_Unit_A", "name": "A", "category": "INF", "code": "x"}]"#,
        )
        .unwrap();
        assert_eq!(catalog.find_by_descriptor("Descriptor_Unit_A").unwrap().category, "INF");

        let table = CsvLocalization::from_reader("DYHSEAJTQZ;M829A1 APFSDS\nBROKEN\n".as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            ammunition_name("Ammo_Canon_AP_120mm_M829A1", Some("'DYHSEAJTQZ'"), &table),
            "M829A1 APFSDS"
        );
        assert_eq!(
            ammunition_name("Ammo_Canon_AP_120mm_M829A1", Some("'UNKNOWN'"), &table),
            "120mm M829A1"
        );
    }

    #[test]
    fn division_names() {
        assert_eq!(division_name("Descriptor_Deck_Division_US_3rd_Arm_multi"), "3rd Armored Division");
        assert_eq!(
            division_name("Descriptor_Deck_Division_RDA_Rugen_Gruppierung"),
            "Rugener Gruppierung"
        );
        assert_eq!(division_name("Descriptor_Deck_Division_POL_4_Zmech_multi"), "POL 4 Zmech");
        assert_eq!(DIVISION_NAMES.len(), 29);
    }
}

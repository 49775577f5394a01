use std::collections::HashMap;

use tracing::debug;
use tracing::warn;

use crate::descriptors::fields::Fields;
use crate::descriptors::index::DescriptorIndex;
use crate::descriptors::keys;
use crate::descriptors::names::division_name;
use crate::descriptors::types::CostMatrixRecord;
use crate::descriptors::types::CostMatrixRow;
use crate::descriptors::types::DivisionRecord;
use crate::descriptors::types::PackRecord;
use crate::descriptors::types::PackRuleFields;
use crate::descriptors::types::UnitRule;
use crate::error::ErrorKind;
use crate::error::IResult;
use crate::ndf::Node;
use crate::ndf::last_path_token;
use crate::ndf::parse_flag;
use crate::ndf::strip_quotes;

/// Numeric ids the deck code serializer assigns to divisions and units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeckIds {
    divisions: HashMap<String, u32>,
    units: HashMap<String, u32>,
}

impl DeckIds {
    /// Reads the first descriptor of the deck serializer file: its first
    /// member lists division ids, its second lists unit ids.
    pub fn from_nodes(nodes: &[Node]) -> IResult<Self> {
        let malformed = |detail: &str| ErrorKind::MalformedDescriptorFile {
            category: "deck serializer",
            detail: detail.to_string(),
        };
        let serializer = nodes.first().ok_or_else(|| malformed("no descriptors"))?;
        let [divisions, units, ..] = serializer.members() else {
            return Err(malformed("expected division and unit id lists"));
        };

        let ids = |list: &Node, offset: u32| -> HashMap<String, u32> {
            list.pairs()
                .into_iter()
                .filter_map(|(descriptor, id)| {
                    let id = id.number()?;
                    Some((last_path_token(descriptor.text()?).to_string(), id as u32 + offset))
                })
                .collect()
        };

        Ok(Self {
            divisions: ids(&divisions.value, 0),
            // Unit ids are published one-based.
            units: ids(&units.value, 1),
        })
    }

    pub fn division(&self, descriptor: &str) -> Option<u32> {
        self.divisions.get(descriptor).copied()
    }

    pub fn unit(&self, descriptor: &str) -> Option<u32> {
        self.units.get(descriptor).copied()
    }
}

/// Unit rules of one division, from the division rules file.
#[derive(Debug, Clone, PartialEq)]
pub struct DivisionRules {
    pub division: String,
    pub unit_rules: Vec<UnitRule>,
}

/// Parses the division rules file: a list of `(division, rule)` tuples on
/// its first descriptor.
pub fn parse_rules(rules: &[Node]) -> Vec<DivisionRules> {
    let Some(entries) = rules.first().and_then(Node::first_value) else {
        return Vec::new();
    };

    entries
        .pairs()
        .into_iter()
        .filter_map(|(division, rule)| {
            let division = last_path_token(division.text()?).to_string();
            let unit_rules = rule
                .find_first(keys::UNIT_RULE_LIST)
                .map(|list| list.items().iter().filter_map(unit_rule).collect())
                .unwrap_or_default();
            Some(DivisionRules { division, unit_rules })
        })
        .collect()
}

fn unit_rule(rule: &Node) -> Option<UnitRule> {
    let fields = Fields::new(rule);
    let unit_descriptor = last_path_token(fields.text(keys::UNIT_DESCRIPTOR)?).to_string();
    let xp_multiplier = fields
        .value(keys::UNITS_IN_PACK_XP_MULTIPLIER)
        .map(|multipliers| multipliers.items().iter().filter_map(Node::number).collect())
        .unwrap_or_default();

    Some(
        UnitRule::builder()
            .unit_descriptor(unit_descriptor)
            .maybe_available_transport_list(fields.value(keys::AVAILABLE_TRANSPORT_LIST).and_then(transport_list))
            .maybe_available_without_transport(fields.text(keys::AVAILABLE_WITHOUT_TRANSPORT).and_then(parse_flag))
            .maybe_number_of_units_in_pack(fields.raw_number(keys::UNITS_IN_PACK).map(|count| count as u32))
            .number_of_unit_in_pack_xp_multiplier(xp_multiplier)
            .maybe_max_pack_number(fields.raw_number(keys::MAX_PACK_NUMBER).map(|count| count as u32))
            .build(),
    )
}

/// Transport descriptors a unit may be bought with. Three encodings exist,
/// told apart by the first entry:
///
/// * `$/GFX` followed by `Unit/<descriptor>`, one pair per transport
/// * `$/GFX/Unit/<descriptor>`, one path per transport
/// * a single `~/A, ~/B` string
pub fn transport_list(list: &Node) -> Option<Vec<String>> {
    let items = list.items();
    let first = items.first()?.text()?;

    let transports = if first == keys::LEGACY_PATH_ROOT {
        items
            .iter()
            .skip(1)
            .step_by(2)
            .filter_map(Node::text)
            .map(|path| last_path_token(path).to_string())
            .collect()
    } else if first.starts_with(keys::UNIT_PATH_PREFIX) {
        items
            .iter()
            .filter_map(Node::text)
            .map(|path| last_path_token(path).to_string())
            .collect()
    } else {
        first
            .split(',')
            .map(|transport| transport.trim().trim_start_matches(keys::LOCAL_PATH_PREFIX).to_string())
            .filter(|transport| !transport.is_empty())
            .collect()
    };

    Some(transports)
}

/// Resolves divisions against their packs, rules, cost matrices and ids.
pub struct DivisionResolver<'a> {
    rules: HashMap<&'a str, &'a [UnitRule]>,
    packs: &'a DescriptorIndex,
    cost_matrices: &'a DescriptorIndex,
    ids: &'a DeckIds,
}

impl<'a> DivisionResolver<'a> {
    pub fn new(
        rules: &'a [DivisionRules],
        packs: &'a DescriptorIndex,
        cost_matrices: &'a DescriptorIndex,
        ids: &'a DeckIds,
    ) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|rules| (rules.division.as_str(), rules.unit_rules.as_slice()))
                .collect(),
            packs,
            cost_matrices,
            ids,
        }
    }

    /// Multiplayer divisions in input order.
    pub fn resolve_all(&self, divisions: &[Node]) -> Vec<DivisionRecord> {
        divisions
            .iter()
            .filter(|division| division.is_object())
            .filter_map(|division| self.resolve(division))
            .collect()
    }

    /// `None` for divisions without the multiplayer tag.
    pub fn resolve(&self, division: &Node) -> Option<DivisionRecord> {
        let descriptor = division.name()?.to_string();
        let fields = Fields::new(division);

        let tags: Vec<String> = fields
            .value(keys::DIVISION_TAGS)
            .map(|tags| tags.items().iter().filter_map(Node::text).map(strip_quotes).collect())
            .unwrap_or_default();
        if !tags.iter().any(|tag| tag == keys::MULTIPLAYER_TAG) {
            debug!(division = %descriptor, "skipping division without multiplayer tag");
            return None;
        }

        let unit_rules = self.rules.get(descriptor.as_str()).copied().unwrap_or_default();
        let packs = fields
            .value(keys::PACK_LIST)
            .map(|packs| {
                packs
                    .pairs()
                    .into_iter()
                    .filter_map(|(pack, count)| self.pack(&descriptor, unit_rules, pack, count))
                    .collect()
            })
            .unwrap_or_default();

        Some(DivisionRecord {
            id: self.ids.division(&descriptor),
            name: division_name(&descriptor),
            alliance: fields.text(keys::DIVISION_NATIONALITY).map(str::to_string),
            country: fields.unquoted(keys::COUNTRY_ID),
            tags,
            max_activation_points: fields.raw_number(keys::MAX_ACTIVATION_POINTS).map(|points| points as i64),
            cost_matrix: fields
                .text(keys::COST_MATRIX)
                .and_then(|matrix| self.cost_matrix(&descriptor, matrix)),
            packs,
            descriptor,
        })
    }

    fn pack(&self, division: &str, unit_rules: &[UnitRule], pack: &Node, count: &Node) -> Option<PackRecord> {
        let pack_descriptor = last_path_token(pack.text()?).to_string();
        let definition = match self.packs.resolve(&pack_descriptor) {
            Ok(definition) => definition,
            Err(err) => {
                warn!(division, pack = %pack_descriptor, %err, "pack definition missing");
                return None;
            }
        };

        let unit_descriptor = definition
            .first_value()
            .and_then(Node::text)
            .or_else(|| Fields::new(definition).text(keys::UNIT_DESCRIPTOR))
            .map(|path| last_path_token(path).to_string())?;
        let rule = unit_rules
            .iter()
            .find(|rule| rule.unit_descriptor() == unit_descriptor)
            .map(PackRuleFields::from);

        Some(
            PackRecord::builder()
                .pack_descriptor(pack_descriptor)
                .unit_descriptor(unit_descriptor)
                .maybe_rule(rule)
                .number_of_cards(count.number().map(|count| count as u32).unwrap_or(0))
                .build(),
        )
    }

    fn cost_matrix(&self, division: &str, name: &str) -> Option<CostMatrixRecord> {
        let matrix = match self.cost_matrices.resolve(name) {
            Ok(matrix) => matrix,
            Err(err) => {
                warn!(division, %err, "cost matrix missing");
                return None;
            }
        };

        let rows = matrix
            .first_value()
            .map(|rows| {
                rows.pairs()
                    .into_iter()
                    .filter_map(|(row, costs)| {
                        Some(CostMatrixRow {
                            name: row.text()?.to_string(),
                            activation_costs: costs
                                .items()
                                .iter()
                                .filter_map(Node::number)
                                .map(|cost| cost as i64)
                                .collect(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(CostMatrixRecord {
            name: name.to_string(),
            matrix: rows,
        })
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn rule(unit: &str, transports: Node) -> Node {
        Node::new_object(
            "TDeckUniteRule",
            [
                ("UnitDescriptor", Node::scalar(format!("$/GFX/Unit/{unit}"))),
                ("AvailableWithoutTransport", Node::scalar("False")),
                ("AvailableTransportList", transports),
                ("NumberOfUnitInPack", Node::scalar("4")),
                (
                    "NumberOfUnitInPackXPMultiplier",
                    Node::new_list([Node::scalar("1"), Node::scalar("0.75"), Node::scalar("0.5")]),
                ),
            ],
        )
    }

    pub(crate) fn rules_file(division: &str, rules: Vec<Node>) -> Vec<Node> {
        vec![Node::named_object(
            "DivisionRules",
            "TDeckDivisionRules",
            [(
                "DivisionRules",
                Node::new_list([Node::new_tuple([
                    Node::scalar(format!("~/{division}")),
                    Node::new_object("TDeckDivisionRule", [("UnitRuleList", Node::new_list(rules))]),
                ])]),
            )],
        )]
    }

    pub(crate) fn division(name: &str, tags: &[&str], packs: &[(&str, &str)]) -> Node {
        Node::named_object(
            name,
            "TDeckDivisionDescriptor",
            [
                ("DivisionNationalite", Node::scalar("ECoalition/NATO")),
                ("CountryId", Node::scalar("\"US\"")),
                ("DivisionTags", Node::new_list(tags.iter().map(|tag| Node::scalar(format!("'{tag}'"))))),
                ("MaxActivationPoints", Node::scalar("50")),
                ("CostMatrix", Node::scalar("MatrixCostName_US_3rd_Arm_multi")),
                (
                    "PackList",
                    Node::new_list(packs.iter().map(|(pack, count)| {
                        Node::new_tuple([Node::scalar(format!("~/{pack}")), Node::scalar(*count)])
                    })),
                ),
            ],
        )
    }

    pub(crate) fn pack(name: &str, unit: &str) -> Node {
        Node::named_object(
            name,
            "TDeckUniteRule",
            [("Unit", Node::scalar(format!("$/GFX/Unit/{unit}")))],
        )
    }

    pub(crate) fn cost_matrix() -> Node {
        Node::named_object(
            "MatrixCostName_US_3rd_Arm_multi",
            "TDeckDivisionCostMatrix",
            [(
                "MatrixCostByFactory",
                Node::new_list([Node::new_tuple([
                    Node::scalar("EDefaultFactories/Logistic"),
                    Node::new_list([Node::scalar("1"), Node::scalar("1"), Node::scalar("2")]),
                ])]),
            )],
        )
    }

    #[test]
    fn transport_list_encodings() {
        let legacy = Node::new_list([
            Node::scalar("$/GFX"),
            Node::scalar("Unit/Descriptor_Unit_M113A1_US"),
            Node::scalar("$/GFX"),
            Node::scalar("Unit/Descriptor_Unit_M2_Bradley_US"),
        ]);
        let current = Node::new_list([
            Node::scalar("$/GFX/Unit/Descriptor_Unit_M113A1_US"),
            Node::scalar("$/GFX/Unit/Descriptor_Unit_M2_Bradley_US"),
        ]);
        let flat = Node::new_list([Node::scalar("~/Descriptor_Unit_M113A1_US, ~/Descriptor_Unit_M2_Bradley_US")]);
        let expected = Some(vec![
            "Descriptor_Unit_M113A1_US".to_string(),
            "Descriptor_Unit_M2_Bradley_US".to_string(),
        ]);

        assert_eq!(transport_list(&legacy), expected);
        assert_eq!(transport_list(&current), expected);
        assert_eq!(transport_list(&flat), expected);
        assert_eq!(transport_list(&Node::new_list([])), None);
    }

    #[test]
    fn parses_division_rules() {
        let rules = parse_rules(&rules_file(
            "Descriptor_Deck_Division_US_3rd_Arm_multi",
            vec![rule("Descriptor_Unit_M1A1_US", Node::new_list([]))],
        ));
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].division, "Descriptor_Deck_Division_US_3rd_Arm_multi");
        let rule = &rules[0].unit_rules[0];
        assert_eq!(rule.unit_descriptor(), "Descriptor_Unit_M1A1_US");
        assert_eq!(rule.available_without_transport(), Some(false));
        assert_eq!(rule.available_transport_list(), None);
        assert_eq!(rule.number_of_units_in_pack(), Some(4));
        assert_eq!(rule.number_of_unit_in_pack_xp_multiplier(), &[1.0, 0.75, 0.5]);
    }

    #[test]
    fn deck_ids_offset_units() {
        let serializer = vec![Node::named_object(
            "DeckSerializer",
            "TDeckSerializer",
            [
                (
                    "DivisionIds",
                    Node::new_list([Node::new_tuple([
                        Node::scalar("Descriptor_Deck_Division_US_3rd_Arm_multi"),
                        Node::scalar("7"),
                    ])]),
                ),
                (
                    "UnitIds",
                    Node::new_list([Node::new_tuple([
                        Node::scalar("$/GFX/Unit/Descriptor_Unit_M1A1_US"),
                        Node::scalar("41"),
                    ])]),
                ),
            ],
        )];
        let ids = DeckIds::from_nodes(&serializer).unwrap();
        assert_eq!(ids.division("Descriptor_Deck_Division_US_3rd_Arm_multi"), Some(7));
        assert_eq!(ids.unit("Descriptor_Unit_M1A1_US"), Some(42));
        assert_eq!(ids.unit("Descriptor_Unit_Missing"), None);

        let err = DeckIds::from_nodes(&[]).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn resolves_multiplayer_divisions_only() {
        let rules = parse_rules(&rules_file(
            "Descriptor_Deck_Division_US_3rd_Arm_multi",
            vec![rule("Descriptor_Unit_M1A1_US", Node::new_list([]))],
        ));
        let packs = DescriptorIndex::new(
            "packs",
            [
                pack("Descriptor_Deck_Pack_M1A1_US", "Descriptor_Unit_M1A1_US"),
                pack("Descriptor_Deck_Pack_M60A3_US", "Descriptor_Unit_M60A3_US"),
            ],
        );
        let matrices = DescriptorIndex::new("cost matrix", [cost_matrix()]);
        let ids = DeckIds::default();
        let resolver = DivisionResolver::new(&rules, &packs, &matrices, &ids);

        let divisions = resolver.resolve_all(&[
            division(
                "Descriptor_Deck_Division_US_3rd_Arm_multi",
                &["DEFAULT", "US"],
                &[
                    ("Descriptor_Deck_Pack_M1A1_US", "2"),
                    ("Descriptor_Deck_Pack_M60A3_US", "3"),
                    ("Descriptor_Deck_Pack_Missing", "1"),
                ],
            ),
            division("Descriptor_Deck_Division_US_Campaign", &["US"], &[]),
        ]);

        assert_eq!(divisions.len(), 1);
        let division = &divisions[0];
        assert_eq!(division.name, "3rd Armored Division");
        assert_eq!(division.alliance.as_deref(), Some("ECoalition/NATO"));
        assert_eq!(division.country.as_deref(), Some("US"));
        assert_eq!(division.tags, vec!["DEFAULT", "US"]);
        assert_eq!(division.max_activation_points, Some(50));

        assert_eq!(division.packs.len(), 2);
        assert_eq!(division.packs[0].unit_descriptor(), "Descriptor_Unit_M1A1_US");
        assert_eq!(division.packs[0].number_of_cards(), 2);
        assert_eq!(division.packs[0].rule().and_then(|rule| rule.number_of_units_in_pack), Some(4));
        assert!(division.packs[1].rule().is_none());
        assert!(division.fields_unit("Descriptor_Unit_M60A3_US"));

        let matrix = division.cost_matrix.as_ref().unwrap();
        assert_eq!(matrix.name, "MatrixCostName_US_3rd_Arm_multi");
        assert_eq!(
            matrix.matrix,
            vec![CostMatrixRow {
                name: "EDefaultFactories/Logistic".to_string(),
                activation_costs: vec![1, 1, 2],
            }]
        );
    }
}

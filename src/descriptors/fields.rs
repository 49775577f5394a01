use crate::descriptors::constants::METRE;
use crate::descriptors::keys;
use crate::descriptors::keys::FieldKey;
use crate::descriptors::keys::FieldRule;
use crate::descriptors::keys::UnitKind;
use crate::ndf::Node;
use crate::ndf::parse_flag;
use crate::ndf::parse_number;
use crate::ndf::strip_brackets;
use crate::ndf::strip_quotes;

/// Scales a raw number by its key's unit.
pub fn scale(value: f64, unit: UnitKind) -> f64 {
    match unit {
        UnitKind::Plain | UnitKind::Time => value,
        UnitKind::Length => value * METRE,
    }
}

/// Rounds halves towards positive infinity, the way the published dataset
/// has always been rounded.
pub fn round(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Rounds to a fixed number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    round(value * factor) / factor
}

/// Field lookups over one descriptor node.
///
/// Every lookup is a depth-first search from the node, so callers can point
/// it at a whole unit or at a single module.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    node: &'a Node,
}

impl<'a> Fields<'a> {
    pub fn new(node: &'a Node) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &'a Node {
        self.node
    }

    /// The first non-blank value found under `key`.
    pub fn value(&self, key: &str) -> Option<&'a Node> {
        self.node.find_first(key).filter(|value| !value.is_blank())
    }

    /// Tries the rule's current key, then each legacy key. Returns the value
    /// and the key it was found under.
    pub fn resolve(&self, rule: &FieldRule) -> Option<(&'a Node, FieldKey)> {
        rule.candidates()
            .find_map(|candidate| self.value(candidate.key).map(|value| (value, *candidate)))
    }

    /// Numeric value of a rule, unit-scaled. A key whose value does not parse
    /// as a number counts as absent and the next key is tried.
    pub fn number(&self, rule: &FieldRule) -> Option<f64> {
        rule.candidates().find_map(|candidate| {
            self.value(candidate.key)
                .and_then(Node::number)
                .map(|raw| scale(raw, candidate.unit))
        })
    }

    pub fn rounded(&self, rule: &FieldRule) -> Option<f64> {
        self.number(rule).map(round)
    }

    /// Plain number under a single key.
    pub fn raw_number(&self, key: &str) -> Option<f64> {
        self.value(key).and_then(Node::number)
    }

    pub fn text(&self, key: &str) -> Option<&'a str> {
        self.value(key).and_then(Node::text)
    }

    /// Text under `key` with quotes removed.
    pub fn unquoted(&self, key: &str) -> Option<String> {
        self.text(key).map(strip_quotes)
    }

    /// `True` under `key`. Anything else, including absence, is false.
    pub fn flag(&self, key: &str) -> bool {
        self.text(key).and_then(parse_flag).unwrap_or(false)
    }

    pub fn has(&self, key: &str) -> bool {
        self.node.find_first(key).is_some()
    }
}

/// Reads a family reference with its index, either as an RTTI object
/// (`Family = DamageFamily_ap`, `Index = 20`) or as the flat form
/// `DamageFamily_ap Index=20`. The family prefix and quotes are removed.
pub fn family_index(node: &Node, prefix: &str, index_key: &str) -> Option<(String, Option<f64>)> {
    let family_name = |raw: &str| {
        let unquoted = strip_quotes(raw.trim());
        unquoted
            .strip_prefix(prefix)
            .map(str::to_string)
            .unwrap_or(unquoted)
    };

    match node {
        Node::Object(_) => match node.member(keys::FAMILY).and_then(Node::text) {
            Some(family) => {
                let index = node.member(index_key).and_then(Node::number);
                Some((family_name(family), index))
            }
            // Definition objects wrapping the flat form.
            None => family_index(node.first_value()?, prefix, index_key),
        },
        Node::Literal(text) => {
            let text = strip_quotes(text);
            let mut tokens = strip_brackets(&text).split_whitespace();
            let family = tokens.next()?;
            let index = tokens
                .find_map(|token| token.strip_prefix(index_key)?.strip_prefix('='))
                .and_then(parse_number);
            Some((family_name(family), index))
        }
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::descriptors::keys;
    use crate::descriptors::keys::ALL_RULES;
    use proptest::prelude::*;

    fn with_member(key: &str, value: &str) -> Node {
        Node::new_object(
            "TModule",
            [("Inner", Node::new_object("TInner", [(key, Node::scalar(value))]))],
        )
    }

    #[test]
    fn current_key_wins_over_legacy() {
        let node = Node::new_object(
            "TAmmunitionDescriptor",
            [
                ("PorteeMaximaleGRU", Node::scalar("2830")),
                ("PorteeMaximale", Node::scalar("(100 * Metre)")),
            ],
        );
        let range = Fields::new(&node).rounded(&keys::GROUND_MAX_RANGE);
        assert_eq!(range, Some(1000.0));
    }

    #[test]
    fn falls_back_to_legacy_metre_string() {
        let node = with_member("PorteeMaximale", "(2830 * Metre)");
        assert_eq!(Fields::new(&node).rounded(&keys::GROUND_MAX_RANGE), Some(1000.0));
    }

    #[test]
    fn blank_current_value_falls_back() {
        let node = Node::new_object(
            "TModule",
            [
                ("SpeedInKmph", Node::scalar("")),
                ("Speed", Node::scalar("(283 * Metre)")),
            ],
        );
        assert_eq!(Fields::new(&node).rounded(&keys::UNIT_SPEED), Some(100.0));
    }

    #[test]
    fn absent_is_not_zero() {
        let node = with_member("Unrelated", "0");
        let fields = Fields::new(&node);
        assert_eq!(fields.number(&keys::FUEL_CAPACITY), None);
        assert!(!fields.flag("PiercingWeapon"));
        assert!(fields.has("Unrelated"));
    }

    #[test]
    fn rounding_matches_published_dataset() {
        assert_eq!(round(2.5), 3.0);
        assert_eq!(round(-2.5), -2.0);
        assert_eq!(round(0.49), 0.0);
        assert_eq!(round_to(12.3456, 2), 12.35);
    }

    #[test]
    fn family_index_forms() {
        let rtti = Node::new_object(
            "TResistanceTypeRTTI",
            [
                ("Family", Node::scalar("ResistanceFamily_blindage")),
                ("Index", Node::scalar("7")),
            ],
        );
        assert_eq!(
            family_index(&rtti, "ResistanceFamily_", "Index"),
            Some(("blindage".to_string(), Some(7.0)))
        );
        let flat = Node::scalar("DamageFamily_he MaxIndex=20");
        assert_eq!(
            family_index(&flat, "DamageFamily_", "MaxIndex"),
            Some(("he".to_string(), Some(20.0)))
        );
        let wrapped = Node::new_object(
            "TResistanceFamilyDefinition",
            [("Definition", Node::scalar("'ResistanceFamily_infanterie MaxIndex=1'"))],
        );
        assert_eq!(
            family_index(&wrapped, "ResistanceFamily_", "MaxIndex"),
            Some(("infanterie".to_string(), Some(1.0)))
        );
        assert_eq!(family_index(&Node::new_list([]), "DamageFamily_", "Index"), None);
    }

    proptest! {
        #[test]
        fn legacy_only_matches_current_only(rule_index in 0..ALL_RULES.len(), raw in 0u32..100_000) {
            let rule = &ALL_RULES[rule_index];
            let current = with_member(rule.current.key, &raw.to_string());
            let expected = Fields::new(&current).number(rule);
            prop_assert_eq!(expected, Some(scale(f64::from(raw), rule.current.unit)));

            for legacy in rule.legacy {
                // The legacy encoding of the same quantity.
                let scaled = scale(f64::from(raw), rule.current.unit);
                let legacy_raw = match legacy.unit {
                    UnitKind::Length => format!("({} * Metre)", scaled / METRE),
                    _ => format!("{scaled}"),
                };
                let node = with_member(legacy.key, &legacy_raw);
                let resolved = Fields::new(&node).number(rule).unwrap();
                let expected = expected.unwrap();
                prop_assert!((resolved - expected).abs() < 1e-9 * expected.abs().max(1.0));
            }
        }
    }
}

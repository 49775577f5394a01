//! Structural diff between two datasets, for patch notes.
//!
//! [`diff`] follows the json-diff output conventions: changed object keys
//! nest, removed and added keys are suffixed `__deleted` and `__added`,
//! changed scalars become `{"__old": .., "__new": ..}` and arrays become a
//! list of `[op, value]` entries.

use itertools::EitherOrBoth;
use itertools::Itertools;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use tracing::info;

use crate::dataset::Dataset;
use crate::error::IResult;

/// Diff of `old` against `new`, `None` when they are equal.
pub fn diff(old: &Value, new: &Value) -> Option<Value> {
    match (old, new) {
        (Value::Object(old), Value::Object(new)) => object_diff(old, new),
        (Value::Array(old), Value::Array(new)) => array_diff(old, new),
        _ if old == new => None,
        _ => Some(json!({ "__old": old, "__new": new })),
    }
}

fn object_diff(old: &Map<String, Value>, new: &Map<String, Value>) -> Option<Value> {
    let mut changes = Map::new();
    for (key, old_value) in old {
        match new.get(key) {
            Some(new_value) => {
                if let Some(change) = diff(old_value, new_value) {
                    changes.insert(key.clone(), change);
                }
            }
            None => {
                changes.insert(format!("{key}__deleted"), old_value.clone());
            }
        }
    }
    for (key, new_value) in new {
        if !old.contains_key(key) {
            changes.insert(format!("{key}__added"), new_value.clone());
        }
    }
    (!changes.is_empty()).then_some(Value::Object(changes))
}

/// Index-wise array diff. Unchanged items are kept as `[" "]` so positions
/// stay readable, changed containers nest as `["~", diff]` and changed
/// scalars become a removal followed by an addition.
fn array_diff(old: &[Value], new: &[Value]) -> Option<Value> {
    let mut changed = false;
    let mut entries = Vec::new();
    for pair in old.iter().zip_longest(new) {
        match pair {
            EitherOrBoth::Both(old, new) => match diff(old, new) {
                None => entries.push(json!([" "])),
                Some(change) if is_container(old) && is_container(new) => {
                    changed = true;
                    entries.push(json!(["~", change]));
                }
                Some(_) => {
                    changed = true;
                    entries.push(json!(["-", old]));
                    entries.push(json!(["+", new]));
                }
            },
            EitherOrBoth::Left(old) => {
                changed = true;
                entries.push(json!(["-", old]));
            }
            EitherOrBoth::Right(new) => {
                changed = true;
                entries.push(json!(["+", new]));
            }
        }
    }
    changed.then_some(Value::Array(entries))
}

fn is_container(value: &Value) -> bool {
    value.is_object() || value.is_array()
}

/// A changed or new entity.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityDiff {
    Changed { descriptor: String, diff: Value },
    New { descriptor: String, new: bool },
}

impl EntityDiff {
    fn new(descriptor: &str) -> Self {
        EntityDiff::New {
            descriptor: descriptor.to_string(),
            new: true,
        }
    }
}

/// A changed or new pack. `descriptor` is the pack's unit.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PackDiff {
    Changed { descriptor: String, pack: String, diff: Value },
    New { descriptor: String, pack: String, new: bool },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionAvailability {
    pub descriptor: String,
    pub pack_diff: Vec<PackDiff>,
}

/// Unit stat changes and division availability changes between two patches.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchDiff {
    pub unit_stats: Vec<EntityDiff>,
    pub unit_availability: Vec<DivisionAvailability>,
}

impl PatchDiff {
    /// Compares `current` against `previous`, keyed by descriptor. Entities
    /// only in `previous` are not reported.
    pub fn between(previous: &Dataset, current: &Dataset) -> IResult<Self> {
        let mut unit_stats = Vec::new();
        for unit in &current.units {
            let Some(old) = previous.unit(&unit.descriptor_name) else {
                unit_stats.push(EntityDiff::new(&unit.descriptor_name));
                continue;
            };
            if let Some(diff) = diff(&serde_json::to_value(old)?, &serde_json::to_value(unit)?) {
                unit_stats.push(EntityDiff::Changed {
                    descriptor: unit.descriptor_name.clone(),
                    diff,
                });
            }
        }

        let mut unit_availability = Vec::new();
        for division in &current.divisions {
            let old_packs = previous
                .division(&division.descriptor)
                .map(|old| old.packs.as_slice())
                .unwrap_or_default();

            let mut pack_diff = Vec::new();
            for pack in &division.packs {
                let descriptor = pack.unit_descriptor().to_string();
                let name = pack.pack_descriptor().to_string();
                match old_packs.iter().find(|old| old.pack_descriptor() == pack.pack_descriptor()) {
                    Some(old) => {
                        if let Some(diff) = diff(&serde_json::to_value(old)?, &serde_json::to_value(pack)?) {
                            pack_diff.push(PackDiff::Changed {
                                descriptor,
                                pack: name,
                                diff,
                            });
                        }
                    }
                    None => pack_diff.push(PackDiff::New {
                        descriptor,
                        pack: name,
                        new: true,
                    }),
                }
            }

            if !pack_diff.is_empty() {
                unit_availability.push(DivisionAvailability {
                    descriptor: division.descriptor.clone(),
                    pack_diff,
                });
            }
        }

        info!(
            units = unit_stats.len(),
            divisions = unit_availability.len(),
            "computed patch diff"
        );

        Ok(Self {
            unit_stats,
            unit_availability,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.unit_stats.is_empty() && self.unit_availability.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn equal_values_have_no_diff() {
        let value = json!({ "a": [1, { "b": null }], "c": "x" });
        assert_eq!(diff(&value, &value.clone()), None);
    }

    #[test]
    fn object_changes_use_suffixed_keys() {
        let old = json!({ "speed": 60, "fuel": 400, "era": false });
        let new = json!({ "speed": 65, "era": false, "stealth": 1.5 });
        assert_eq!(
            diff(&old, &new),
            Some(json!({
                "speed": { "__old": 60, "__new": 65 },
                "fuel__deleted": 400,
                "stealth__added": 1.5
            }))
        );
    }

    #[test]
    fn arrays_diff_by_index() {
        let old = json!([{ "he": 1 }, 2, 3]);
        let new = json!([{ "he": 2 }, 2, 4, 5]);
        assert_eq!(
            diff(&old, &new),
            Some(json!([
                ["~", { "he": { "__old": 1, "__new": 2 } }],
                [" "],
                ["-", 3],
                ["+", 4],
                ["+", 5]
            ]))
        );
    }

    #[test]
    fn type_change_is_a_scalar_change() {
        assert_eq!(
            diff(&json!(null), &json!(3)),
            Some(json!({ "__old": null, "__new": 3 }))
        );
    }

    #[test]
    fn entity_diffs_serialize_flat() {
        let entries = vec![
            EntityDiff::new("Descriptor_Unit_New"),
            EntityDiff::Changed {
                descriptor: "Descriptor_Unit_Old".to_string(),
                diff: json!({ "speed": { "__old": 1, "__new": 2 } }),
            },
        ];
        assert_eq!(
            serde_json::to_value(&entries).unwrap(),
            json!([
                { "descriptor": "Descriptor_Unit_New", "new": true },
                { "descriptor": "Descriptor_Unit_Old", "diff": { "speed": { "__old": 1, "__new": 2 } } }
            ])
        );
    }

    #[test]
    fn identical_datasets_have_empty_diff() {
        let dataset = Dataset::default();
        let patch = PatchDiff::between(&dataset, &dataset.clone()).unwrap();
        assert!(patch.is_empty());
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "unitStats": [], "unitAvailability": [] })
        );
    }
}

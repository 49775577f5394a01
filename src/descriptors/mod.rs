/// Ammunition, missile and smoke resolution
pub mod ammunition;
/// Balance constants shared by the resolvers
pub mod constants;
/// The damage table export
pub mod damage;
/// Division, pack, rule and deck id resolution
pub mod division;
/// Field lookups with current/legacy key fallback
pub mod fields;
/// Name -> node lookup tables, one per descriptor category
pub mod index;
/// Descriptor member names and field rules
pub mod keys;
/// Display names for units, ammunition and divisions
pub mod names;
/// Terrain speed modifiers and resistances
pub mod terrain;
/// Output records
pub mod types;
pub mod unit;
/// Mounted weapon resolution and salvo slot merging
pub mod weapon;

/// Loading a dataset's descriptor files and assembling the published documents
pub mod dataset;
/// Resolvers that turn descriptor trees into unit, weapon and division records
pub mod descriptors;
/// Cross-patch structural diff
pub mod diff;
/// Error definitions
pub mod error;
/// The parsed descriptor tree and its search operations
pub mod ndf;
/// Generic wrapper for values that may or may not match a known variant.
pub mod recognized;

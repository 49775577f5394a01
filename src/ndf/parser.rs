use std::borrow::Cow;

use crate::error::ErrorKind;
use crate::error::IResult;
use crate::ndf::Node;

/// Turns the text of one descriptor file into its top-level entries.
pub trait TreeParser {
    fn parse(&self, text: &str) -> IResult<Vec<Node>>;
}

/// Reads trees that the grammar-level parser exported as JSON, one array of
/// top-level nodes per file.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonTreeParser;

impl TreeParser for JsonTreeParser {
    fn parse(&self, text: &str) -> IResult<Vec<Node>> {
        serde_json::from_str(text).map_err(|err| ErrorKind::ParseError {
            detail: err.to_string(),
        })
    }
}

/// Source of raw descriptor file contents, keyed by layout-relative path.
///
/// `Ok(None)` means the file does not exist. Whether that is fatal is up to
/// the caller.
pub trait DescriptorFileLoader {
    fn get(&self, path: &str) -> IResult<Option<Cow<'_, str>>>;
}

/// Loads descriptor files from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: std::path::PathBuf,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DescriptorFileLoader for DirectoryLoader {
    fn get(&self, path: &str) -> IResult<Option<Cow<'_, str>>> {
        let full = self.root.join(path);
        match std::fs::read_to_string(&full) {
            Ok(text) => Ok(Some(Cow::Owned(text))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

pub struct FileLoaderWithCallback<F> {
    callback: F,
}

impl<F> FileLoaderWithCallback<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> DescriptorFileLoader for FileLoaderWithCallback<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, path: &str) -> IResult<Option<Cow<'_, str>>> {
        Ok((self.callback)(path).map(Cow::Owned))
    }
}

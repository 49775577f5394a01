use thiserror::Error;

#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error("Parse error: {detail}")]
    ParseError { detail: String },
    #[error("Mandatory descriptor file missing: category={category}, path={path}")]
    MissingDescriptorFile { category: &'static str, path: String },
    #[error("Malformed descriptor file: category={category}, {detail}")]
    MalformedDescriptorFile {
        category: &'static str,
        detail: String,
    },
    #[error("Unresolved reference {reference:?} in {index} index")]
    UnresolvedReference {
        reference: String,
        index: &'static str,
    },
    #[error("Descriptor {descriptor} has no {field}")]
    MissingField { descriptor: String, field: &'static str },
    #[error("Error serializing or deserializing json: {err}")]
    SerdeJson {
        #[from]
        err: serde_json::Error,
    },
    #[error("Error reading csv: {err}")]
    Csv {
        #[from]
        err: csv::Error,
    },
    #[error("Error reading toml: {err}")]
    Toml {
        #[from]
        err: toml::de::Error,
    },
    #[error("IO error")]
    IoError(#[from] std::io::Error),
}

impl ErrorKind {
    /// True when this error must abort the whole run rather than a single entity.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ErrorKind::UnresolvedReference { .. } | ErrorKind::MissingField { .. }
        )
    }
}

pub type IResult<T> = Result<T, ErrorKind>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn per_entity_errors_are_not_fatal() {
        let unresolved = ErrorKind::UnresolvedReference {
            reference: "WeaponDescriptor_Missing".to_string(),
            index: "weapons",
        };
        assert!(!unresolved.is_fatal());

        let missing = ErrorKind::MissingDescriptorFile {
            category: "deck serializer",
            path: "DeckSerializer.ndf.json".to_string(),
        };
        assert!(missing.is_fatal());
        assert_eq!(
            missing.to_string(),
            "Mandatory descriptor file missing: category=deck serializer, path=DeckSerializer.ndf.json"
        );
    }
}

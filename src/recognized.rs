use std::fmt;

use serde::Serialize;
use serde::Serializer;

/// A descriptor token with a fixed, known vocabulary.
pub trait Token: Sized + 'static {
    /// Every token this type knows about.
    const ALL: &'static [Self];

    /// The raw token as it appears in descriptor files.
    fn token(&self) -> &'static str;

    /// Case-insensitive lookup of a raw token.
    fn from_token(raw: &str) -> Option<Self>
    where
        Self: Copy,
    {
        Self::ALL
            .iter()
            .find(|known| known.token().eq_ignore_ascii_case(raw))
            .copied()
    }
}

/// A token that was either recognized as a known variant `T`, or is an
/// unrecognized raw value `Raw`.
///
/// Descriptor files gain new tokens from patch to patch. An unknown token is
/// not an error, it is kept verbatim so it still reaches the output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recognized<T, Raw = String> {
    Known(T),
    Unknown(Raw),
}

impl<T: Token + Copy> Recognized<T> {
    pub fn parse(raw: &str) -> Self {
        match T::from_token(raw) {
            Some(known) => Recognized::Known(known),
            None => Recognized::Unknown(raw.to_string()),
        }
    }

    /// The raw token, whether known or not.
    pub fn token(&self) -> &str {
        match self {
            Recognized::Known(t) => t.token(),
            Recognized::Unknown(raw) => raw,
        }
    }
}

impl<T, Raw> Recognized<T, Raw> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Recognized::Known(t) => Some(t),
            Recognized::Unknown(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Recognized::Known(_))
    }

    pub fn is_known_and(&self, f: impl FnOnce(&T) -> bool) -> bool {
        self.known().is_some_and(f)
    }
}

impl<T, Raw> From<T> for Recognized<T, Raw> {
    fn from(value: T) -> Self {
        Recognized::Known(value)
    }
}

impl<T: Token + Copy> fmt::Display for Recognized<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl<T: Token + Copy> Serialize for Recognized<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Facing {
        Front,
        Rear,
    }

    impl Token for Facing {
        const ALL: &'static [Self] = &[Facing::Front, Facing::Rear];

        fn token(&self) -> &'static str {
            match self {
                Facing::Front => "Front",
                Facing::Rear => "Rear",
            }
        }
    }

    #[test]
    fn parse_known_ignores_case() {
        let parsed = Recognized::<Facing>::parse("front");
        assert_eq!(parsed, Recognized::Known(Facing::Front));
        assert_eq!(parsed.token(), "Front");
    }

    #[test]
    fn unknown_tokens_survive_serialization() {
        let parsed = Recognized::<Facing>::parse("Top");
        assert!(!parsed.is_known());
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"Top\"");
    }
}

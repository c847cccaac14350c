use std::fmt::Display;

use bevy_reflect::Reflect;
use serde::Serialize;

const ALTITUDE_FLAG: char = '^';
const SPEED_FLAG: char = '@';
const VECTOR_MARKER: char = '#';
const DRAW_ONLY_SUFFIX: char = '*';

/// A fix name token with its modifier characters decoded.
///
/// Procedure data overloads plain strings with a few markers:
/// `^FIX` (altitude constraint), `@FIX` (speed constraint), anything containing `#`
/// (a vector directive such as a heading to fly, not a fix) and, in draw segments only,
/// `FIX*` (fix depicted on the scope but not flown).
#[derive(Clone, Debug, Default, Reflect, Serialize, PartialEq, Eq, Hash)]
#[reflect(Debug)]
pub struct FixToken {
    pub bare_name: String,
    pub altitude_flag: bool,
    pub speed_flag: bool,
    pub vector: bool,
    pub draw_only: bool,
}

impl FixToken {
    /// Parses the name part of a fix descriptor.
    pub fn parse(token: &str) -> Self {
        if token.contains(VECTOR_MARKER) {
            return Self {
                bare_name: token.to_string(),
                vector: true,
                ..Default::default()
            };
        }

        Self {
            bare_name: token
                .chars()
                .filter(|c| !matches!(*c, ALTITUDE_FLAG | SPEED_FLAG))
                .collect(),
            altitude_flag: token.contains(ALTITUDE_FLAG),
            speed_flag: token.contains(SPEED_FLAG),
            ..Default::default()
        }
    }

    /// Parses a token of a draw segment. Only the trailing `*` carries meaning there.
    pub fn parse_draw(token: &str) -> Self {
        match token.strip_suffix(DRAW_ONLY_SUFFIX) {
            Some(bare_name) => Self {
                bare_name: bare_name.to_string(),
                draw_only: true,
                ..Default::default()
            },
            None => Self {
                bare_name: token.to_string(),
                ..Default::default()
            },
        }
    }

    /// The name to cross-reference against the fix database, if this token names a fix at all.
    pub fn fix_name(&self) -> Option<&str> {
        (!self.vector).then_some(self.bare_name.as_str())
    }
}

/// Writes the normalized token: flags first, then the bare name, then the draw-only
/// suffix. Flags found in the middle of the original token are not restored there.
impl Display for FixToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.altitude_flag {
            write!(f, "{ALTITUDE_FLAG}")?;
        }
        if self.speed_flag {
            write!(f, "{SPEED_FLAG}")?;
        }
        f.write_str(&self.bare_name)?;
        if self.draw_only {
            write!(f, "{DRAW_ONLY_SUFFIX}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::FixToken;

    #[test]
    fn test_modifiers() {
        let altitude = FixToken::parse("^FIXA");
        assert_eq!(altitude.fix_name(), Some("FIXA"));
        assert!(altitude.altitude_flag);
        assert!(!altitude.speed_flag);

        let speed = FixToken::parse("@FIXB");
        assert_eq!(speed.fix_name(), Some("FIXB"));
        assert!(speed.speed_flag);

        let both = FixToken::parse("^@BOACH");
        assert_eq!(both.fix_name(), Some("BOACH"));
        assert!(both.altitude_flag && both.speed_flag);

        assert_eq!(FixToken::parse("PRINO").fix_name(), Some("PRINO"));
    }

    #[test]
    fn test_vector_directive() {
        let vector = FixToken::parse("FIX#HDG");
        assert!(vector.vector);
        assert_eq!(vector.fix_name(), None);

        assert_eq!(FixToken::parse("#270").fix_name(), None);
        assert_eq!(FixToken::parse("^#270").fix_name(), None);
    }

    #[test]
    fn test_draw_tokens() {
        let draw_only = FixToken::parse_draw("FIXC*");
        assert_eq!(draw_only.fix_name(), Some("FIXC"));
        assert!(draw_only.draw_only);

        // only the suffix counts in draw segments
        let plain = FixToken::parse_draw("^FIXD");
        assert_eq!(plain.fix_name(), Some("^FIXD"));
        assert!(!plain.draw_only);
        assert!(!plain.altitude_flag);
    }

    #[test]
    fn test_display() {
        assert_eq!(FixToken::parse("^@BOACH").to_string(), "^@BOACH");
        assert_eq!(FixToken::parse_draw("FIXC*").to_string(), "FIXC*");
        assert_eq!(FixToken::parse("#270").to_string(), "#270");
        assert_eq!(FixToken::parse("BO^ACH").to_string(), "^BOACH");
    }
}

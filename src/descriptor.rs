use bevy_derive::{Deref, DerefMut};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::token::FixToken;

/// Altitude/speed constraint data attached to a fix, passed through untouched.
pub type Restriction = serde_json::Value;

/// One element of a routable segment: `"FIX"` or `["FIX", restriction]`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FixDescriptor {
    Name(String),
    Restricted(String, Restriction),
}

impl FixDescriptor {
    /// The raw name token, modifiers included.
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Restricted(name, _) => name,
        }
    }

    pub fn restriction(&self) -> Option<&Restriction> {
        match self {
            Self::Name(_) => None,
            Self::Restricted(_, restriction) => Some(restriction),
        }
    }

    pub fn token(&self) -> FixToken {
        FixToken::parse(self.name())
    }

    /// Name without modifiers, `None` for vector directives.
    pub fn bare_name(&self) -> Option<String> {
        self.token().fix_name().map(str::to_string)
    }
}

impl From<&str> for FixDescriptor {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// An element of `draw`. Well-formed data only contains segments; a bare token
/// means somebody wrote a flat list, anything else is kept as found and reported
/// when the draw data is used.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DrawEntry {
    Segment(Vec<String>),
    Token(String),
    Other(serde_json::Value),
}

impl DrawEntry {
    pub fn is_segment(&self) -> bool {
        matches!(self, Self::Segment(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Other(_))
    }

    pub fn tokens(&self) -> &[String] {
        match self {
            Self::Segment(tokens) => tokens,
            Self::Token(token) => std::slice::from_ref(token),
            Self::Other(_) => &[],
        }
    }
}

/// Accepts any JSON for `draw`; the two-level shape is checked on use.
pub(crate) fn deserialize_draw<'de, D>(deserializer: D) -> Result<Vec<DrawEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => vec![],
        serde_json::Value::Array(entries) => entries
            .into_iter()
            .map(|entry| DrawEntry::deserialize(&entry).unwrap_or(DrawEntry::Other(entry)))
            .collect(),
        other => vec![DrawEntry::Other(other)],
    })
}

/// Entry or exit segments keyed by runway or published fix name, in document order.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Deref, DerefMut)]
pub struct SegmentMap(pub IndexMap<String, Vec<FixDescriptor>>);

impl SegmentMap {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Key at `index` in insertion order.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.0.get_index(index).map(|(name, _)| name.as_str())
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<FixDescriptor>)> for SegmentMap {
    fn from_iter<T: IntoIterator<Item = (K, Vec<FixDescriptor>)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::{DrawEntry, FixDescriptor, SegmentMap};

    #[test]
    fn test_descriptor_shapes() {
        let descriptors: Vec<FixDescriptor> =
            serde_json::from_value(json!(["BESSY", ["^WITLA", "A100+|S250"], "#270"])).unwrap();

        assert_eq!(
            descriptors,
            vec![
                FixDescriptor::Name("BESSY".to_string()),
                FixDescriptor::Restricted("^WITLA".to_string(), json!("A100+|S250")),
                FixDescriptor::Name("#270".to_string()),
            ]
        );
        assert_eq!(descriptors[1].name(), "^WITLA");
        assert_eq!(descriptors[1].bare_name().as_deref(), Some("WITLA"));
        assert_eq!(descriptors[1].restriction(), Some(&json!("A100+|S250")));
        assert_eq!(descriptors[0].restriction(), None);
        assert_eq!(descriptors[2].bare_name(), None);
    }

    #[test]
    fn test_restriction_is_opaque() {
        let descriptor: FixDescriptor =
            serde_json::from_value(json!(["SUNST", { "alt": [80, 100], "spd": 210 }])).unwrap();
        assert_eq!(
            descriptor.restriction(),
            Some(&json!({ "alt": [80, 100], "spd": 210 }))
        );
    }

    #[test]
    fn test_draw_entries() {
        let draw: Vec<DrawEntry> =
            serde_json::from_value(json!([["A", "B*"], "C"])).unwrap();
        assert!(draw[0].is_segment());
        assert!(!draw[1].is_segment());
        assert_eq!(draw[0].tokens(), ["A".to_string(), "B*".to_string()]);
        assert_eq!(draw[1].tokens(), ["C".to_string()]);
    }

    #[test]
    fn test_odd_draw_shapes_are_kept() {
        let draw: Vec<DrawEntry> =
            serde_json::from_value(json!([null, ["A", 5], 7, ["B"]])).unwrap();
        assert_eq!(
            draw,
            vec![
                DrawEntry::Other(json!(null)),
                DrawEntry::Other(json!(["A", 5])),
                DrawEntry::Other(json!(7)),
                DrawEntry::Segment(vec!["B".to_string()]),
            ]
        );
        assert!(draw[0].is_malformed());
        assert!(draw[1].tokens().is_empty());
        assert!(!draw[3].is_malformed());
    }

    #[test]
    fn test_segment_map_keeps_document_order() {
        let map: SegmentMap =
            serde_json::from_value(json!({ "ZULU": [], "ALPHA": ["A"], "MIKE": [] })).unwrap();
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["ZULU", "ALPHA", "MIKE"]);
        assert_eq!(map.name_at(1), Some("ALPHA"));
        assert_eq!(map.name_at(3), None);
        assert_eq!(map.get("ALPHA"), Some(&vec![FixDescriptor::from("A")]));
        assert_eq!(
            map,
            SegmentMap::from_iter([
                ("ZULU", vec![]),
                ("ALPHA", vec![FixDescriptor::from("A")]),
                ("MIKE", vec![]),
            ])
        );
    }
}

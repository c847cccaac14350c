use serde::Serialize;

use crate::descriptor::{FixDescriptor, Restriction};

/// Builds the navigation-side waypoint for a single fix descriptor.
///
/// The flight management side owns restriction semantics; procedures only decide
/// which descriptors are flown and in which order.
pub trait FromFixDescriptor: Sized {
    fn from_fix_descriptor(descriptor: &FixDescriptor) -> Self;
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Waypoint {
    pub name: String,
    pub altitude_flag: bool,
    pub speed_flag: bool,
    pub vector: bool,
    pub restriction: Option<Restriction>,
}

impl Waypoint {
    /// Fix to cross-reference, `None` if this waypoint is a vector directive.
    pub fn fix_name(&self) -> Option<&str> {
        (!self.vector).then_some(self.name.as_str())
    }
}

impl FromFixDescriptor for Waypoint {
    fn from_fix_descriptor(descriptor: &FixDescriptor) -> Self {
        let token = descriptor.token();
        Self {
            name: token.bare_name,
            altitude_flag: token.altitude_flag,
            speed_flag: token.speed_flag,
            vector: token.vector,
            restriction: descriptor.restriction().cloned(),
        }
    }
}

impl FromFixDescriptor for FixDescriptor {
    fn from_fix_descriptor(descriptor: &FixDescriptor) -> Self {
        descriptor.clone()
    }
}

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: Into<String>>(x: S) -> Self {
                Self(x.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(x: &str) -> Self {
                Self::new(x)
            }
        }
    };
}

// These are the IDs exactly as the feed producer emits them. Joins between tables rely on exact
// string equality, so never normalize them.
string_id!(StopID);
string_id!(RouteID);
string_id!(TripID);
string_id!(ServiceID);
string_id!(DirectionID);

impl Default for DirectionID {
    fn default() -> Self {
        Self::new("0")
    }
}

/// All of the stop IDs that represent one place, usually because the feed repeats a stop with a
/// slightly different name.
pub type StopIdSet = BTreeSet<StopID>;

/// Identifies one direction of one route, formatted as `{route_id}_{direction_id}`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteDirectionKey(String);

impl RouteDirectionKey {
    pub fn new(route: &RouteID, direction: &DirectionID) -> Self {
        Self(format!("{route}_{direction}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteDirectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

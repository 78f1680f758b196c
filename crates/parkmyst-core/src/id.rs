//! Identifiers for components, instances, feeds and successor lists.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type-safe component type name.
///
/// Names a registered component definition (e.g. `"SimpleQuestion"`), not a
/// placed instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentName(String);

impl ComponentName {
    /// Creates a new ComponentName.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the component name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ComponentName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ComponentName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ComponentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for ComponentName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Identifier of a placed component instance in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(u32);

impl InstanceId {
    /// Creates a new InstanceId.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for InstanceId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Opaque handle to a piece of player-visible content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedId(String);

impl FeedId {
    /// Creates a new FeedId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the handle as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reference to another instance as it appears in configuration.
///
/// Serialised as an integer; `-1` is the "no successor" sentinel and anything
/// below it is rejected.
///
/// # Examples
///
/// ```
/// use parkmyst_core::{ComponentRef, InstanceId};
///
/// let r: ComponentRef = serde_json::from_str("-1").unwrap();
/// assert_eq!(r, ComponentRef::None);
///
/// let r: ComponentRef = serde_json::from_str("7").unwrap();
/// assert_eq!(r.instance(), Some(InstanceId::new(7)));
///
/// assert!(serde_json::from_str::<ComponentRef>("-2").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ComponentRef {
    /// The `-1` sentinel: terminates this branch of dispatch.
    #[default]
    None,
    /// A concrete instance.
    Instance(InstanceId),
}

impl ComponentRef {
    /// Returns the referenced instance, if any.
    pub fn instance(self) -> Option<InstanceId> {
        match self {
            ComponentRef::None => None,
            ComponentRef::Instance(id) => Some(id),
        }
    }

    /// Returns `true` for the `-1` sentinel.
    pub fn is_none(self) -> bool {
        matches!(self, ComponentRef::None)
    }
}

impl From<InstanceId> for ComponentRef {
    fn from(id: InstanceId) -> Self {
        ComponentRef::Instance(id)
    }
}

impl TryFrom<i64> for ComponentRef {
    type Error = String;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            -1 => Ok(ComponentRef::None),
            n if n >= 0 => u32::try_from(n)
                .map(|id| ComponentRef::Instance(InstanceId(id)))
                .map_err(|_| format!("component id {n} is out of range")),
            n => Err(format!("component id must be >= -1, got {n}")),
        }
    }
}

impl From<ComponentRef> for i64 {
    fn from(r: ComponentRef) -> Self {
        match r {
            ComponentRef::None => -1,
            ComponentRef::Instance(id) => i64::from(id.get()),
        }
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentRef::None => write!(f, "-1"),
            ComponentRef::Instance(id) => write!(f, "{id}"),
        }
    }
}

/// Ordered successor list of an instance.
///
/// Accepts either a single reference or a list on input; always a list in
/// memory and on output.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "SuccessorsRepr", into = "Vec<ComponentRef>")]
pub struct Successors(Vec<ComponentRef>);

#[derive(Deserialize)]
#[serde(untagged)]
enum SuccessorsRepr {
    Single(ComponentRef),
    List(Vec<ComponentRef>),
}

impl From<SuccessorsRepr> for Successors {
    fn from(repr: SuccessorsRepr) -> Self {
        match repr {
            SuccessorsRepr::Single(r) => Self(vec![r]),
            SuccessorsRepr::List(list) => Self(list),
        }
    }
}

impl From<Successors> for Vec<ComponentRef> {
    fn from(s: Successors) -> Self {
        s.0
    }
}

impl Successors {
    /// Creates an empty successor list.
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// Returns every entry, sentinels included, in configured order.
    pub fn entries(&self) -> &[ComponentRef] {
        &self.0
    }

    /// Returns the instances to activate, in order, with `-1` entries skipped.
    pub fn targets(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.0.iter().filter_map(|r| r.instance())
    }

    /// Returns `true` if no entry names an instance.
    pub fn is_terminal(&self) -> bool {
        self.targets().next().is_none()
    }
}

impl From<ComponentRef> for Successors {
    fn from(r: ComponentRef) -> Self {
        Self(vec![r])
    }
}

impl From<InstanceId> for Successors {
    fn from(id: InstanceId) -> Self {
        Self(vec![ComponentRef::Instance(id)])
    }
}

impl From<Vec<ComponentRef>> for Successors {
    fn from(list: Vec<ComponentRef>) -> Self {
        Self(list)
    }
}

impl FromIterator<ComponentRef> for Successors {
    fn from_iter<I: IntoIterator<Item = ComponentRef>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

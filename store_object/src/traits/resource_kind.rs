//! The closed set of resource types

use std::fmt::Debug;
use std::hash::Hash;

/// A resource type served by a store.
///
/// Implemented by a fieldless enum, normally through `#[derive(ResourceKind)]`:
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ResourceKind)]
/// pub enum Resource {
///     Users,
///     #[resource(tag = "org-roles", table = "organization-roles")]
///     OrgRoles,
/// }
/// ```
pub trait ResourceKind: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Type tag used in events, audit records and cache namespaces
    fn tag(&self) -> &'static str;

    /// Table the resource lives in
    fn table(&self) -> &'static str;

    /// Primary-key column
    fn primary_key(&self) -> &'static str;

    /// Every variant, in declaration order
    fn all() -> &'static [Self];

    fn from_tag(tag: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.tag() == tag)
    }
}

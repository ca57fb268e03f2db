use serde::Serialize;
use utoipa::ToSchema;

use super::role::Role;

/// A record that can be judged for mutation by the role that owns it.
pub trait RecordOwnership {
    /// Role whose data this record represents, `None` when unknown.
    fn owning_role(&self) -> Option<Role>;
}

impl<T: RecordOwnership + ?Sized> RecordOwnership for &T {
    fn owning_role(&self) -> Option<Role> {
        (**self).owning_role()
    }
}

/// Per-record edit/delete rules.
///
/// - ADMIN may mutate any record
/// - AGENT may mutate only records owned by CLIENT
/// - CLIENT may mutate nothing here
///
/// A missing actor role or a missing record is always denied.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionEvaluator;

impl PermissionEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn can_mutate<R>(&self, actor: Option<Role>, record: Option<&R>) -> bool
    where
        R: RecordOwnership + ?Sized,
    {
        let (Some(actor), Some(record)) = (actor, record) else {
            return false;
        };

        let allowed = match actor {
            Role::Admin => true,
            Role::Agent => record.owning_role() == Some(Role::Client),
            Role::Client => false,
        };

        tracing::debug!(
            actor = %actor,
            owner = ?record.owning_role(),
            allowed,
            "mutation check"
        );
        allowed
    }

    /// Same rule as [`can_mutate`](Self::can_mutate) today, kept separate so the
    /// delete policy can tighten on its own.
    pub fn can_delete<R>(&self, actor: Option<Role>, record: Option<&R>) -> bool
    where
        R: RecordOwnership + ?Sized,
    {
        self.can_mutate(actor, record)
    }

    pub fn action_flags<R>(&self, actor: Option<Role>, record: &R) -> ActionFlags
    where
        R: RecordOwnership + ?Sized,
    {
        ActionFlags {
            can_edit: self.can_mutate(actor, Some(record)),
            can_delete: self.can_delete(actor, Some(record)),
        }
    }
}

/// Which row actions a UI should offer for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ActionFlags {
    pub can_edit: bool,
    pub can_delete: bool,
}

//! Per-endpoint allow-lists.
//!
//! Built once on first use and never modified afterwards.

use std::sync::LazyLock;

use crate::filter::{AllowList, FieldSpec};
use crate::transform::{after_last_dot, date_or_null};

pub static USER: LazyLock<AllowList> = LazyLock::new(|| {
    AllowList::new(&[
        FieldSpec::keep("userID"),
        FieldSpec::keep("userName"),
        FieldSpec::keep("fullName"),
        FieldSpec::keep("emailAddress"),
        FieldSpec::keep("isDisabled"),
        FieldSpec::keep("memberships"),
    ])
});

pub static USER_LIST: LazyLock<AllowList> =
    LazyLock::new(|| AllowList::new(&[FieldSpec::keep("users")]));

pub static GROUP: LazyLock<AllowList> = LazyLock::new(|| {
    AllowList::new(&[
        FieldSpec::keep("groupID"),
        FieldSpec::keep("groupName"),
        FieldSpec::keep("displayName"),
        FieldSpec::keep("description"),
        FieldSpec::keep("managerGroupName"),
        FieldSpec::keep("deleted"),
        FieldSpec::keep("members"),
    ])
});

pub static GROUP_LIST: LazyLock<AllowList> =
    LazyLock::new(|| AllowList::new(&[FieldSpec::keep("groups")]));

pub static INSTANCE: LazyLock<AllowList> = LazyLock::new(|| {
    AllowList::new(&[
        FieldSpec::keep("piid"),
        FieldSpec::keep("name"),
        FieldSpec::keep("state"),
        FieldSpec::keep("executionState"),
        FieldSpec::keep("bpdName"),
        FieldSpec::keep("processAppName"),
        FieldSpec::keep("processAppAcronym"),
        FieldSpec::keep("snapshotName"),
        FieldSpec::keep("executionTree"),
        FieldSpec::keep("tasks"),
        FieldSpec::map("creationTime", date_or_null),
        FieldSpec::map("lastModificationTime", date_or_null),
        FieldSpec::map("dueDate", date_or_null),
        FieldSpec::map("closeDate", date_or_null),
    ])
});

pub static TASK: LazyLock<AllowList> = LazyLock::new(|| {
    AllowList::new(&[
        FieldSpec::keep("tkiid"),
        FieldSpec::keep("name"),
        FieldSpec::keep("status"),
        FieldSpec::keep("state"),
        FieldSpec::keep("owner"),
        FieldSpec::keep("assignedTo"),
        FieldSpec::keep("assignedToType"),
        FieldSpec::keep("priority"),
        FieldSpec::map("originator", after_last_dot),
        FieldSpec::map("startTime", date_or_null),
        FieldSpec::map("dueTime", date_or_null),
        FieldSpec::map("completionTime", date_or_null),
        FieldSpec::map("lastModificationTime", date_or_null),
    ])
});

pub static BULK: LazyLock<AllowList> =
    LazyLock::new(|| AllowList::new(&[FieldSpec::keep("succeeded"), FieldSpec::keep("failed")]));

pub static SYSTEM_LIST: LazyLock<AllowList> =
    LazyLock::new(|| AllowList::new(&[FieldSpec::keep("systems")]));

pub static SYSTEM: LazyLock<AllowList> = LazyLock::new(|| {
    AllowList::new(&[
        FieldSpec::keep("systemID"),
        FieldSpec::keep("systemType"),
        FieldSpec::keep("version"),
        FieldSpec::keep("hostname"),
    ])
});

/// Shape of the `Data` object the server nests inside error bodies.
pub static ERROR_DETAIL: LazyLock<AllowList> = LazyLock::new(|| {
    AllowList::new(&[FieldSpec::keep("errorNumber"), FieldSpec::keep("errorMessage")])
});

//! YouTrack entity models.
//!
//! Every entity mirrors one REST resource. Fields use [`Opt`] so the same
//! struct serves as read model and partial write payload: unset fields stay
//! out of request bodies, explicit nulls go through (e.g. unassigning).
//! The `$type` discriminator always serializes and only accepts the values
//! of its closed set.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fields::{FieldSelection, FieldSpec};
use crate::opt::Opt;
use crate::time::Timestamp;

/// Declares a closed `$type` discriminator for an entity.
///
/// Deserialization rejects any value outside the declared set; the first
/// variant is the default used when building request payloads.
macro_rules! entity_kind {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant,)+
        }

        impl $name {
            /// The wire value of this discriminator.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                [$(Self::$variant),+][0]
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

mod custom_fields;

pub use custom_fields::*;

entity_kind!(
    /// `$type` of a [`User`]: the current-user endpoint reports `Me`.
    UserKind { User => "User", Me => "Me" }
);
entity_kind!(UserGroupKind { UserGroup => "UserGroup" });
entity_kind!(ProjectKind { Project => "Project" });
entity_kind!(TagKind { Tag => "Tag" });
entity_kind!(IssueTagKind { IssueTag => "IssueTag" });
entity_kind!(IssueKind { Issue => "Issue" });
entity_kind!(IssueCommentKind { IssueComment => "IssueComment" });
entity_kind!(IssueAttachmentKind { IssueAttachment => "IssueAttachment" });
entity_kind!(IssueLinkTypeKind { IssueLinkType => "IssueLinkType" });
entity_kind!(WorkItemTypeKind { WorkItemType => "WorkItemType" });
entity_kind!(DurationValueKind { DurationValue => "DurationValue" });
entity_kind!(IssueWorkItemKind { IssueWorkItem => "IssueWorkItem" });
entity_kind!(AgileKind { Agile => "Agile" });
entity_kind!(SprintKind { Sprint => "Sprint" });

/// A YouTrack user account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "$type", default)]
    pub kind: UserKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub ring_id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub login: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub email: Opt<String>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.login.value().or_else(|| self.name.value()) {
            Some(name) => f.write_str(name),
            None => f.write_str("(unknown user)"),
        }
    }
}

impl FieldSelection for User {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "ringId", "name", "login", "email"])
    }
}

/// A group of users, e.g. the audience an agile board is visible to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroup {
    #[serde(rename = "$type", default)]
    pub kind: UserGroupKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub ring_id: Opt<String>,
}

impl FieldSelection for UserGroup {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "name", "ringId"])
    }
}

/// A YouTrack project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "$type", default)]
    pub kind: ProjectKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub short_name: Opt<String>,
}

impl FieldSelection for Project {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "name", "shortName"])
    }
}

/// A tag as managed through the tags endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(rename = "$type", default)]
    pub kind: TagKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
}

impl FieldSelection for Tag {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "name"])
    }
}

/// A tag attached to an issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTag {
    #[serde(rename = "$type", default)]
    pub kind: IssueTagKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
}

impl FieldSelection for IssueTag {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "name"])
    }
}

/// A YouTrack issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "$type", default)]
    pub kind: IssueKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id_readable: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub created: Opt<Timestamp>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub updated: Opt<Timestamp>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub resolved: Opt<Timestamp>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub project: Opt<Project>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub reporter: Opt<User>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub updater: Opt<User>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub summary: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub description: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub wikified_description: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub uses_markdown: Opt<bool>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub comments_count: Opt<i64>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub tags: Opt<Vec<IssueTag>>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub custom_fields: Opt<Vec<IssueCustomField>>,
}

impl Issue {
    /// Server-relative URL of the issue, derived from its readable id.
    pub fn url(&self) -> Option<String> {
        self.id_readable
            .value()
            .map(|readable| format!("/issue/{readable}"))
    }

    /// Looks up a custom field by its display name.
    pub fn custom_field(&self, name: &str) -> Option<&IssueCustomField> {
        self.custom_fields
            .value()?
            .iter()
            .find(|field| field.name() == Some(name))
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.id_readable.value().map_or("(no id)", String::as_str),
            self.summary.value().map_or("", String::as_str),
        )
    }
}

impl FieldSelection for Issue {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "idReadable", "created", "updated", "resolved"])
            .nested("project", Project::fields())
            .nested("reporter", User::fields())
            .nested("updater", User::fields())
            .leaf("summary")
            .leaf("description")
            .leaf("wikifiedDescription")
            .leaf("usesMarkdown")
            .leaf("commentsCount")
            .nested("tags", IssueTag::fields())
            .nested("customFields", IssueCustomField::fields())
    }
}

/// A file attached to an issue or a comment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueAttachment {
    #[serde(rename = "$type", default)]
    pub kind: IssueAttachmentKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub author: Opt<User>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub created: Opt<Timestamp>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub updated: Opt<Timestamp>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub mime_type: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub url: Opt<String>,
}

impl FieldSelection for IssueAttachment {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "name"])
            .nested("author", User::fields())
            .leaf("created")
            .leaf("updated")
            .leaf("mimeType")
            .leaf("url")
    }
}

/// A comment on an issue.
///
/// Setting `deleted` to `true` on an update hides the comment without
/// removing it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueComment {
    #[serde(rename = "$type", default)]
    pub kind: IssueCommentKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub text: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub uses_markdown: Opt<bool>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub text_preview: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub created: Opt<Timestamp>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub updated: Opt<Timestamp>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub author: Opt<User>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub attachments: Opt<Vec<IssueAttachment>>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub deleted: Opt<bool>,
}

impl FieldSelection for IssueComment {
    fn fields() -> FieldSpec {
        FieldSpec::leaves([
            "$type",
            "id",
            "text",
            "usesMarkdown",
            "textPreview",
            "created",
            "updated",
        ])
        .nested("author", User::fields())
        .nested("attachments", IssueAttachment::fields())
        .leaf("deleted")
    }
}

/// Direction of an issue link, as reported on [`IssueLink`].
///
/// The same value selects the URL suffix when creating links: `s` links
/// outward from the source issue, `t` inward, and the empty suffix is used
/// for undirected link types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkDirection {
    Outward,
    Inward,
    Both,
}

impl LinkDirection {
    /// Suffix appended to the link type id in link-creation URLs.
    pub fn url_suffix(&self) -> &'static str {
        match self {
            LinkDirection::Outward => "s",
            LinkDirection::Inward => "t",
            LinkDirection::Both => "",
        }
    }
}

/// A link type such as "Relates" or "Depend".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLinkType {
    #[serde(rename = "$type", default)]
    pub kind: IssueLinkTypeKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub localized_name: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub source_to_target: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub localized_source_to_target: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub target_to_source: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub localized_target_to_source: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub directed: Opt<bool>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub aggregation: Opt<bool>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub read_only: Opt<bool>,
}

impl FieldSelection for IssueLinkType {
    fn fields() -> FieldSpec {
        FieldSpec::leaves([
            "$type",
            "id",
            "name",
            "localizedName",
            "sourceToTarget",
            "localizedSourceToTarget",
            "targetToSource",
            "localizedTargetToSource",
            "directed",
            "aggregation",
            "readOnly",
        ])
    }
}

/// One direction of a link between issues.
///
/// The links endpoint reports this resource without a `$type` discriminator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLink {
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub direction: Opt<LinkDirection>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub link_type: Opt<IssueLinkType>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub issues: Opt<Vec<Issue>>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub trimmed_issues: Opt<Vec<Issue>>,
}

impl FieldSelection for IssueLink {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["id", "direction"])
            .nested("linkType", IssueLinkType::fields())
            .nested("issues", Issue::fields())
            .nested("trimmedIssues", Issue::fields())
    }
}

/// A work item type configured for time tracking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemType {
    #[serde(rename = "$type", default)]
    pub kind: WorkItemTypeKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub auto_attached: Opt<bool>,
}

impl FieldSelection for WorkItemType {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "name", "autoAttached"])
    }
}

/// A time span in minutes with its human-readable presentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationValue {
    #[serde(rename = "$type", default)]
    pub kind: DurationValueKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub minutes: Opt<i64>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub presentation: Opt<String>,
}

impl FieldSelection for DurationValue {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "minutes", "presentation"])
    }
}

/// A spent-time record on an issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueWorkItem {
    #[serde(rename = "$type", default)]
    pub kind: IssueWorkItemKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub author: Opt<User>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub creator: Opt<User>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub text: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub text_preview: Opt<String>,
    /// The work item type; the wire name `type` is distinct from `$type`.
    #[serde(rename = "type", default, skip_serializing_if = "Opt::is_unset")]
    pub work_item_type: Opt<WorkItemType>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub created: Opt<Timestamp>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub updated: Opt<Timestamp>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub duration: Opt<DurationValue>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub date: Opt<Timestamp>,
}

impl FieldSelection for IssueWorkItem {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id"])
            .nested("author", User::fields())
            .nested("creator", User::fields())
            .leaf("text")
            .leaf("textPreview")
            .nested("type", WorkItemType::fields())
            .leaf("created")
            .leaf("updated")
            .nested("duration", DurationValue::fields())
            .leaf("date")
    }
}

/// A reference to an agile board, as embedded in sprints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgileRef {
    #[serde(rename = "$type", default)]
    pub kind: AgileKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
}

impl FieldSelection for AgileRef {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "name"])
    }
}

/// A reference to a sprint, as embedded in agile boards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintRef {
    #[serde(rename = "$type", default)]
    pub kind: SprintKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
}

impl FieldSelection for SprintRef {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "name"])
    }
}

/// An agile board.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agile {
    #[serde(rename = "$type", default)]
    pub kind: AgileKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub owner: Opt<User>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub visible_for: Opt<UserGroup>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub projects: Opt<Vec<Project>>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub sprints: Opt<Vec<SprintRef>>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub current_sprint: Opt<SprintRef>,
}

impl FieldSelection for Agile {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "name"])
            .nested("owner", User::fields())
            .nested("visibleFor", UserGroup::fields())
            .nested("projects", Project::fields())
            .nested("sprints", SprintRef::fields())
            .nested("currentSprint", SprintRef::fields())
    }
}

/// A sprint of an agile board.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    #[serde(rename = "$type", default)]
    pub kind: SprintKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub goal: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub start: Opt<Timestamp>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub finish: Opt<Timestamp>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub archived: Opt<bool>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub is_default: Opt<bool>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub unresolved_issues_count: Opt<i64>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub agile: Opt<AgileRef>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub issues: Opt<Vec<Issue>>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub previous_sprint: Opt<SprintRef>,
}

impl FieldSelection for Sprint {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "name", "goal", "start", "finish"])
            .leaf("archived")
            .leaf("isDefault")
            .leaf("unresolvedIssuesCount")
            .nested("agile", AgileRef::fields())
            .nested("issues", Issue::fields())
            .nested("previousSprint", SprintRef::fields())
    }
}

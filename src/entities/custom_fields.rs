//! Custom-field models: bundle elements, project field settings and the
//! polymorphic per-issue custom field family.
//!
//! Everything here hangs off a `$type` discriminator. The sets are closed:
//! a discriminator the crate does not know is a deserialization error, never
//! a silent fallback.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::fields::{FieldSelection, FieldSpec};
use crate::opt::Opt;
use crate::time::{Date, Timestamp};

use super::{User, UserGroup};

/// Field type id that makes a [`SimpleIssueCustomField`] carry a timestamp.
const DATE_AND_TIME_FIELD_TYPE: &str = "date and time";

entity_kind!(FieldTypeKind { FieldType => "FieldType" });

/// The data type of a custom field, e.g. `state[1]`, `enum[*]` or
/// `date and time`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldType {
    #[serde(rename = "$type", default)]
    pub kind: FieldTypeKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
}

impl FieldSelection for FieldType {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id"])
    }
}

entity_kind!(CustomFieldKind { CustomField => "CustomField" });

/// The server-wide definition of a custom field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    #[serde(rename = "$type", default)]
    pub kind: CustomFieldKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub field_type: Opt<FieldType>,
}

impl FieldSelection for CustomField {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "name"]).nested("fieldType", FieldType::fields())
    }
}

entity_kind!(
    /// `$type` of a [`ProjectCustomField`]; one value per bundle flavor.
    ProjectCustomFieldKind {
        Enum => "EnumProjectCustomField",
        State => "StateProjectCustomField",
        User => "UserProjectCustomField",
        Group => "GroupProjectCustomField",
        Owned => "OwnedProjectCustomField",
        Version => "VersionProjectCustomField",
        Build => "BuildProjectCustomField",
        Simple => "SimpleProjectCustomField",
        Period => "PeriodProjectCustomField",
        Text => "TextProjectCustomField",
    }
);

/// The attachment of a custom field to a project.
///
/// All flavors share one payload shape; only the discriminator differs, so
/// this is a single struct with a required `kind` rather than ten identical
/// variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCustomField {
    #[serde(rename = "$type")]
    pub kind: ProjectCustomFieldKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub field: Opt<CustomField>,
}

impl ProjectCustomField {
    /// A project custom field of the given flavor with no settings attached.
    pub fn new(kind: ProjectCustomFieldKind) -> Self {
        Self {
            kind,
            field: Opt::Unset,
        }
    }

    /// The field type id (e.g. `"date and time"`), when present.
    pub fn field_type_id(&self) -> Option<&str> {
        self.field
            .value()?
            .field_type
            .value()?
            .id
            .value()
            .map(String::as_str)
    }
}

impl FieldSelection for ProjectCustomField {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type"]).nested("field", CustomField::fields())
    }
}

entity_kind!(EnumBundleElementKind { EnumBundleElement => "EnumBundleElement" });
entity_kind!(StateBundleElementKind { StateBundleElement => "StateBundleElement" });
entity_kind!(BuildBundleElementKind { BuildBundleElement => "BuildBundleElement" });
entity_kind!(VersionBundleElementKind { VersionBundleElement => "VersionBundleElement" });
entity_kind!(OwnedBundleElementKind { OwnedBundleElement => "OwnedBundleElement" });

/// A value of an enum bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumBundleElement {
    #[serde(rename = "$type", default)]
    pub kind: EnumBundleElementKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
}

impl FieldSelection for EnumBundleElement {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "name"])
    }
}

/// A value of a state bundle, e.g. "In Progress".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateBundleElement {
    #[serde(rename = "$type", default)]
    pub kind: StateBundleElementKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
}

impl FieldSelection for StateBundleElement {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "name"])
    }
}

/// A value of a build bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildBundleElement {
    #[serde(rename = "$type", default)]
    pub kind: BuildBundleElementKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
}

impl FieldSelection for BuildBundleElement {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "name"])
    }
}

/// A value of a version bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionBundleElement {
    #[serde(rename = "$type", default)]
    pub kind: VersionBundleElementKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
}

impl FieldSelection for VersionBundleElement {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "name"])
    }
}

/// A value of an owned bundle (a value with a responsible user).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedBundleElement {
    #[serde(rename = "$type", default)]
    pub kind: OwnedBundleElementKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
}

impl FieldSelection for OwnedBundleElement {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "name"])
    }
}

entity_kind!(TextFieldValueKind { TextFieldValue => "TextFieldValue" });

/// The value of a text custom field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFieldValue {
    #[serde(rename = "$type", default)]
    pub kind: TextFieldValueKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub text: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub markdown_text: Opt<String>,
}

impl FieldSelection for TextFieldValue {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "text", "markdownText"])
    }
}

entity_kind!(PeriodValueKind { PeriodValue => "PeriodValue" });

/// The value of a period custom field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodValue {
    #[serde(rename = "$type", default)]
    pub kind: PeriodValueKind,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub minutes: Opt<i64>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub presentation: Opt<String>,
}

impl FieldSelection for PeriodValue {
    fn fields() -> FieldSpec {
        FieldSpec::leaves(["$type", "id", "minutes", "presentation"])
    }
}

/// The scalar value of a [`SimpleIssueCustomField`].
///
/// Values keep the JSON type the server sent: a numeric string stays a
/// string. An integer turns into [`SimpleValue::Timestamp`] only when the
/// project custom field declares the `date and time` type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SimpleValue {
    Timestamp(Timestamp),
    String(String),
    Int(i64),
    Float(f64),
}

impl SimpleValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SimpleValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SimpleValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            SimpleValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            SimpleValue::Timestamp(value) => Some(*value),
            _ => None,
        }
    }
}

fn decode_simple_value(
    value: serde_json::Value,
    date_and_time: bool,
) -> Result<SimpleValue, String> {
    use serde_json::Value;

    if date_and_time {
        return match value {
            Value::Number(number) => {
                let millis = number
                    .as_i64()
                    .ok_or_else(|| format!("'date and time' field must be an integer, got {number}"))?;
                Timestamp::from_millis(millis)
                    .map(SimpleValue::Timestamp)
                    .ok_or_else(|| format!("'date and time' value out of range: {millis}"))
            }
            other => Err(format!("'date and time' field must be an integer, got {other}")),
        };
    }

    match value {
        Value::String(text) => Ok(SimpleValue::String(text)),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Ok(SimpleValue::Int(int))
            } else if let Some(float) = number.as_f64() {
                Ok(SimpleValue::Float(float))
            } else {
                Err(format!("unsupported number for simple field: {number}"))
            }
        }
        other => Err(format!("unsupported simple field value: {other}")),
    }
}

macro_rules! single_value_custom_field {
    ($(#[$meta:meta])* $name:ident, value: $value:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[serde(default, skip_serializing_if = "Opt::is_unset")]
            pub id: Opt<String>,
            #[serde(default, skip_serializing_if = "Opt::is_unset")]
            pub name: Opt<String>,
            #[serde(default, skip_serializing_if = "Opt::is_unset")]
            pub value: Opt<$value>,
            #[serde(default, skip_serializing_if = "Opt::is_unset")]
            pub project_custom_field: Opt<ProjectCustomField>,
        }

        impl FieldSelection for $name {
            fn fields() -> FieldSpec {
                custom_field_fields(<$value>::fields())
            }
        }
    };
}

macro_rules! multi_value_custom_field {
    ($(#[$meta:meta])* $name:ident, values: $value:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[serde(default, skip_serializing_if = "Opt::is_unset")]
            pub id: Opt<String>,
            #[serde(default, skip_serializing_if = "Opt::is_unset")]
            pub name: Opt<String>,
            /// The selected values; multi-valued fields always carry the
            /// array on the wire.
            pub value: Vec<$value>,
            #[serde(default, skip_serializing_if = "Opt::is_unset")]
            pub project_custom_field: Opt<ProjectCustomField>,
        }

        impl FieldSelection for $name {
            fn fields() -> FieldSpec {
                custom_field_fields(<$value>::fields())
            }
        }
    };
}

fn custom_field_fields(value: FieldSpec) -> FieldSpec {
    FieldSpec::leaves(["$type", "id", "name"])
        .nested("value", value)
        .nested("projectCustomField", ProjectCustomField::fields())
}

single_value_custom_field!(
    /// A single-select enum field, e.g. "Type".
    SingleEnumIssueCustomField, value: EnumBundleElement
);
single_value_custom_field!(
    /// A state field, e.g. "State".
    StateIssueCustomField, value: StateBundleElement
);
single_value_custom_field!(
    /// A single-select build field.
    SingleBuildIssueCustomField, value: BuildBundleElement
);
single_value_custom_field!(
    /// A single-select version field.
    SingleVersionIssueCustomField, value: VersionBundleElement
);
single_value_custom_field!(
    /// A single-select owned field.
    SingleOwnedIssueCustomField, value: OwnedBundleElement
);
single_value_custom_field!(
    /// A single-user field, e.g. "Assignee".
    SingleUserIssueCustomField, value: User
);
single_value_custom_field!(
    /// A single-group field.
    SingleGroupIssueCustomField, value: UserGroup
);
single_value_custom_field!(
    /// A date field; the value travels as noon-UTC epoch milliseconds.
    DateIssueCustomField, value: Date
);
single_value_custom_field!(
    /// A period field, e.g. "Estimation".
    PeriodIssueCustomField, value: PeriodValue
);
single_value_custom_field!(
    /// A multi-line text field.
    TextIssueCustomField, value: TextFieldValue
);

multi_value_custom_field!(
    /// A multi-select enum field.
    MultiEnumIssueCustomField, values: EnumBundleElement
);
multi_value_custom_field!(
    /// A multi-select build field.
    MultiBuildIssueCustomField, values: BuildBundleElement
);
multi_value_custom_field!(
    /// A multi-select version field, e.g. "Fix versions".
    MultiVersionIssueCustomField, values: VersionBundleElement
);
multi_value_custom_field!(
    /// A multi-select owned field.
    MultiOwnedIssueCustomField, values: OwnedBundleElement
);
multi_value_custom_field!(
    /// A multi-user field.
    MultiUserIssueCustomField, values: User
);
multi_value_custom_field!(
    /// A multi-group field.
    MultiGroupIssueCustomField, values: UserGroup
);

/// A free-form scalar field: string, integer, float or timestamp.
///
/// Deserialization is context-sensitive: an integer is promoted to a
/// [`Timestamp`] exactly when the accompanying project custom field declares
/// the `date and time` type, and such a field rejects anything that is not
/// an integer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleIssueCustomField {
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub id: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub name: Opt<String>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub value: Opt<SimpleValue>,
    #[serde(default, skip_serializing_if = "Opt::is_unset")]
    pub project_custom_field: Opt<ProjectCustomField>,
}

impl<'de> Deserialize<'de> for SimpleIssueCustomField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Raw {
            #[serde(default)]
            id: Opt<String>,
            #[serde(default)]
            name: Opt<String>,
            #[serde(default)]
            value: Opt<serde_json::Value>,
            #[serde(default)]
            project_custom_field: Opt<ProjectCustomField>,
        }

        let raw = Raw::deserialize(deserializer)?;

        let date_and_time = raw.project_custom_field
            .value()
            .and_then(ProjectCustomField::field_type_id)
            == Some(DATE_AND_TIME_FIELD_TYPE);

        let value = match raw.value {
            Opt::Unset => Opt::Unset,
            Opt::Null => Opt::Null,
            Opt::Set(value) => Opt::Set(
                decode_simple_value(value, date_and_time).map_err(D::Error::custom)?,
            ),
        };

        Ok(Self {
            id: raw.id,
            name: raw.name,
            value,
            project_custom_field: raw.project_custom_field,
        })
    }
}

impl FieldSelection for SimpleIssueCustomField {
    fn fields() -> FieldSpec {
        custom_field_fields(FieldSpec::new())
    }
}

/// A custom field of an issue, dispatched on its `$type` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum IssueCustomField {
    #[serde(rename = "SingleEnumIssueCustomField")]
    SingleEnum(SingleEnumIssueCustomField),
    #[serde(rename = "MultiEnumIssueCustomField")]
    MultiEnum(MultiEnumIssueCustomField),
    #[serde(rename = "SingleBuildIssueCustomField")]
    SingleBuild(SingleBuildIssueCustomField),
    #[serde(rename = "MultiBuildIssueCustomField")]
    MultiBuild(MultiBuildIssueCustomField),
    #[serde(rename = "StateIssueCustomField")]
    State(StateIssueCustomField),
    #[serde(rename = "SingleVersionIssueCustomField")]
    SingleVersion(SingleVersionIssueCustomField),
    #[serde(rename = "MultiVersionIssueCustomField")]
    MultiVersion(MultiVersionIssueCustomField),
    #[serde(rename = "SingleOwnedIssueCustomField")]
    SingleOwned(SingleOwnedIssueCustomField),
    #[serde(rename = "MultiOwnedIssueCustomField")]
    MultiOwned(MultiOwnedIssueCustomField),
    #[serde(rename = "SingleUserIssueCustomField")]
    SingleUser(SingleUserIssueCustomField),
    #[serde(rename = "MultiUserIssueCustomField")]
    MultiUser(MultiUserIssueCustomField),
    #[serde(rename = "SingleGroupIssueCustomField")]
    SingleGroup(SingleGroupIssueCustomField),
    #[serde(rename = "MultiGroupIssueCustomField")]
    MultiGroup(MultiGroupIssueCustomField),
    #[serde(rename = "SimpleIssueCustomField")]
    Simple(SimpleIssueCustomField),
    #[serde(rename = "DateIssueCustomField")]
    Date(DateIssueCustomField),
    #[serde(rename = "PeriodIssueCustomField")]
    Period(PeriodIssueCustomField),
    #[serde(rename = "TextIssueCustomField")]
    Text(TextIssueCustomField),
}

macro_rules! for_each_custom_field {
    ($value:expr, $field:ident => $body:expr) => {
        match $value {
            IssueCustomField::SingleEnum($field) => $body,
            IssueCustomField::MultiEnum($field) => $body,
            IssueCustomField::SingleBuild($field) => $body,
            IssueCustomField::MultiBuild($field) => $body,
            IssueCustomField::State($field) => $body,
            IssueCustomField::SingleVersion($field) => $body,
            IssueCustomField::MultiVersion($field) => $body,
            IssueCustomField::SingleOwned($field) => $body,
            IssueCustomField::MultiOwned($field) => $body,
            IssueCustomField::SingleUser($field) => $body,
            IssueCustomField::MultiUser($field) => $body,
            IssueCustomField::SingleGroup($field) => $body,
            IssueCustomField::MultiGroup($field) => $body,
            IssueCustomField::Simple($field) => $body,
            IssueCustomField::Date($field) => $body,
            IssueCustomField::Period($field) => $body,
            IssueCustomField::Text($field) => $body,
        }
    };
}

impl IssueCustomField {
    /// The field's id within the issue.
    pub fn id(&self) -> Option<&str> {
        for_each_custom_field!(self, field => field.id.value().map(String::as_str))
    }

    /// The field's display name, e.g. "State" or "Assignee".
    pub fn name(&self) -> Option<&str> {
        for_each_custom_field!(self, field => field.name.value().map(String::as_str))
    }

    /// The per-project settings of the field, when fetched.
    pub fn project_custom_field(&self) -> Option<&ProjectCustomField> {
        for_each_custom_field!(self, field => field.project_custom_field.value())
    }

    /// The wire discriminator of this variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            IssueCustomField::SingleEnum(_) => "SingleEnumIssueCustomField",
            IssueCustomField::MultiEnum(_) => "MultiEnumIssueCustomField",
            IssueCustomField::SingleBuild(_) => "SingleBuildIssueCustomField",
            IssueCustomField::MultiBuild(_) => "MultiBuildIssueCustomField",
            IssueCustomField::State(_) => "StateIssueCustomField",
            IssueCustomField::SingleVersion(_) => "SingleVersionIssueCustomField",
            IssueCustomField::MultiVersion(_) => "MultiVersionIssueCustomField",
            IssueCustomField::SingleOwned(_) => "SingleOwnedIssueCustomField",
            IssueCustomField::MultiOwned(_) => "MultiOwnedIssueCustomField",
            IssueCustomField::SingleUser(_) => "SingleUserIssueCustomField",
            IssueCustomField::MultiUser(_) => "MultiUserIssueCustomField",
            IssueCustomField::SingleGroup(_) => "SingleGroupIssueCustomField",
            IssueCustomField::MultiGroup(_) => "MultiGroupIssueCustomField",
            IssueCustomField::Simple(_) => "SimpleIssueCustomField",
            IssueCustomField::Date(_) => "DateIssueCustomField",
            IssueCustomField::Period(_) => "PeriodIssueCustomField",
            IssueCustomField::Text(_) => "TextIssueCustomField",
        }
    }
}

impl FieldSelection for IssueCustomField {
    /// The union of every variant's selection, deep-merged.
    fn fields() -> FieldSpec {
        FieldSpec::union([
            SingleEnumIssueCustomField::fields(),
            MultiEnumIssueCustomField::fields(),
            SingleBuildIssueCustomField::fields(),
            MultiBuildIssueCustomField::fields(),
            StateIssueCustomField::fields(),
            SingleVersionIssueCustomField::fields(),
            MultiVersionIssueCustomField::fields(),
            SingleOwnedIssueCustomField::fields(),
            MultiOwnedIssueCustomField::fields(),
            SingleUserIssueCustomField::fields(),
            MultiUserIssueCustomField::fields(),
            SingleGroupIssueCustomField::fields(),
            MultiGroupIssueCustomField::fields(),
            SimpleIssueCustomField::fields(),
            DateIssueCustomField::fields(),
            PeriodIssueCustomField::fields(),
            TextIssueCustomField::fields(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opt::Opt;
    use chrono::{TimeZone, Utc};

    fn simple_project_field(field_type: &str) -> String {
        format!(
            r#"{{
                "$type": "SimpleProjectCustomField",
                "field": {{
                    "$type": "CustomField",
                    "fieldType": {{"$type": "FieldType", "id": "{field_type}"}}
                }}
            }}"#
        )
    }

    #[test]
    fn test_parse_state_field() {
        let json = r#"{
            "$type": "StateIssueCustomField",
            "id": "110-50",
            "name": "State",
            "value": {"$type": "StateBundleElement", "id": "98-37", "name": "In Progress"},
            "projectCustomField": {
                "$type": "StateProjectCustomField",
                "field": {
                    "$type": "CustomField",
                    "fieldType": {"$type": "FieldType", "id": "state[1]"}
                }
            }
        }"#;

        let field: IssueCustomField = serde_json::from_str(json).unwrap();
        assert_eq!(field.name(), Some("State"));
        assert_eq!(field.id(), Some("110-50"));
        assert_eq!(field.type_name(), "StateIssueCustomField");
        assert_eq!(
            field.project_custom_field().unwrap().field_type_id(),
            Some("state[1]")
        );
        match &field {
            IssueCustomField::State(state) => {
                assert_eq!(
                    state.value.value().unwrap().name,
                    Opt::Set("In Progress".to_string())
                );
            }
            other => panic!("expected a state field, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_discriminator_fails_closed() {
        let json = r#"{"$type": "MysteryIssueCustomField", "id": "1", "name": "X"}"#;
        assert!(serde_json::from_str::<IssueCustomField>(json).is_err());
    }

    #[test]
    fn test_missing_discriminator_fails() {
        let json = r#"{"id": "1", "name": "X"}"#;
        assert!(serde_json::from_str::<IssueCustomField>(json).is_err());
    }

    #[test]
    fn test_round_trip_preserves_discriminator() {
        let json = r#"{"$type":"SingleEnumIssueCustomField","id":"110-49","name":"Type","value":{"$type":"EnumBundleElement","id":"96-38","name":"Value One"}}"#;
        let field: IssueCustomField = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_string(&field).unwrap(), json);
    }

    #[test]
    fn test_unassigned_user_field_serializes_null() {
        let field = IssueCustomField::SingleUser(SingleUserIssueCustomField {
            id: Opt::Set("111-8".to_string()),
            name: Opt::Set("Assignee".to_string()),
            value: Opt::Null,
            project_custom_field: Opt::Unset,
        });
        assert_eq!(
            serde_json::to_string(&field).unwrap(),
            r#"{"$type":"SingleUserIssueCustomField","id":"111-8","name":"Assignee","value":null}"#
        );
    }

    #[test]
    fn test_parse_multi_enum_field() {
        let json = r#"{
            "$type": "MultiEnumIssueCustomField",
            "id": "110-12",
            "name": "Affected versions",
            "value": [
                {"$type": "EnumBundleElement", "id": "96-1", "name": "One"},
                {"$type": "EnumBundleElement", "id": "96-2", "name": "Two"}
            ]
        }"#;

        let field: IssueCustomField = serde_json::from_str(json).unwrap();
        match field {
            IssueCustomField::MultiEnum(multi) => {
                assert_eq!(multi.value.len(), 2);
                assert_eq!(multi.value[1].name, Opt::Set("Two".to_string()));
            }
            other => panic!("expected a multi enum field, got {other:?}"),
        }
    }

    #[test]
    fn test_multi_field_requires_value_array() {
        let json = r#"{"$type": "MultiEnumIssueCustomField", "id": "110-12", "name": "Versions"}"#;
        assert!(serde_json::from_str::<IssueCustomField>(json).is_err());
    }

    #[test]
    fn test_parse_date_field() {
        let json = r#"{
            "$type": "DateIssueCustomField",
            "id": "145-34",
            "name": "Due Date",
            "value": 1645099200000
        }"#;

        let field: IssueCustomField = serde_json::from_str(json).unwrap();
        match field {
            IssueCustomField::Date(date_field) => {
                assert_eq!(
                    date_field.value,
                    Opt::Set(Date::from_ymd(2022, 2, 17).unwrap())
                );
            }
            other => panic!("expected a date field, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_field_date_and_time_promotes_integer() {
        let json = format!(
            r#"{{
                "$type": "SimpleIssueCustomField",
                "id": "145-35",
                "name": "Started at",
                "value": 1623396729000,
                "projectCustomField": {}
            }}"#,
            simple_project_field("date and time")
        );

        let field: IssueCustomField = serde_json::from_str(&json).unwrap();
        match field {
            IssueCustomField::Simple(simple) => {
                let value = simple.value.value().unwrap().as_timestamp().unwrap();
                assert_eq!(
                    value.datetime(),
                    Utc.with_ymd_and_hms(2021, 6, 11, 7, 32, 9).unwrap()
                );
            }
            other => panic!("expected a simple field, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_field_date_and_time_rejects_non_integer() {
        let json = format!(
            r#"{{
                "$type": "SimpleIssueCustomField",
                "name": "Started at",
                "value": "not a timestamp",
                "projectCustomField": {}
            }}"#,
            simple_project_field("date and time")
        );
        assert!(serde_json::from_str::<IssueCustomField>(&json).is_err());
    }

    #[test]
    fn test_simple_field_numeric_string_stays_string() {
        let json = format!(
            r#"{{
                "$type": "SimpleIssueCustomField",
                "id": "145-36",
                "name": "Multipass",
                "value": "1623396729",
                "projectCustomField": {}
            }}"#,
            simple_project_field("string")
        );

        let field: IssueCustomField = serde_json::from_str(&json).unwrap();
        match field {
            IssueCustomField::Simple(simple) => {
                assert_eq!(
                    simple.value.value().unwrap().as_str(),
                    Some("1623396729")
                );
            }
            other => panic!("expected a simple field, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_field_integer_and_float() {
        let int_json = r#"{"$type": "SimpleIssueCustomField", "name": "Price", "value": -128}"#;
        let field: IssueCustomField = serde_json::from_str(int_json).unwrap();
        match &field {
            IssueCustomField::Simple(simple) => {
                assert_eq!(simple.value.value().unwrap().as_int(), Some(-128));
            }
            other => panic!("expected a simple field, got {other:?}"),
        }

        let float_json =
            r#"{"$type": "SimpleIssueCustomField", "name": "Multiplier", "value": 3.1412}"#;
        let field: IssueCustomField = serde_json::from_str(float_json).unwrap();
        match &field {
            IssueCustomField::Simple(simple) => {
                assert_eq!(simple.value.value().unwrap().as_float(), Some(3.1412));
            }
            other => panic!("expected a simple field, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_field_null_value() {
        let json = r#"{"$type": "SimpleIssueCustomField", "id": "145-38", "name": "Extra", "value": null}"#;
        let field: IssueCustomField = serde_json::from_str(json).unwrap();
        match field {
            IssueCustomField::Simple(simple) => assert!(simple.value.is_null()),
            other => panic!("expected a simple field, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_field_rejects_bool_value() {
        let json = r#"{"$type": "SimpleIssueCustomField", "name": "Flag", "value": true}"#;
        assert!(serde_json::from_str::<IssueCustomField>(json).is_err());
    }

    #[test]
    fn test_simple_value_timestamp_serializes_to_millis() {
        let field = IssueCustomField::Simple(SimpleIssueCustomField {
            name: Opt::Set("Started at".to_string()),
            value: Opt::Set(SimpleValue::Timestamp(
                Timestamp::from_millis(1623396729000).unwrap(),
            )),
            ..SimpleIssueCustomField::default()
        });
        assert_eq!(
            serde_json::to_string(&field).unwrap(),
            r#"{"$type":"SimpleIssueCustomField","name":"Started at","value":1623396729000}"#
        );
    }

    #[test]
    fn test_parse_period_and_text_fields() {
        let period_json = r#"{
            "$type": "PeriodIssueCustomField",
            "name": "Estimation",
            "value": {"$type": "PeriodValue", "id": "146-1", "minutes": 480, "presentation": "1d"}
        }"#;
        let field: IssueCustomField = serde_json::from_str(period_json).unwrap();
        match &field {
            IssueCustomField::Period(period) => {
                assert_eq!(period.value.value().unwrap().minutes, Opt::Set(480));
            }
            other => panic!("expected a period field, got {other:?}"),
        }

        let text_json = r#"{
            "$type": "TextIssueCustomField",
            "name": "Notes",
            "value": {"$type": "TextFieldValue", "text": "*Hello*", "markdownText": "<b>Hello</b>"}
        }"#;
        let field: IssueCustomField = serde_json::from_str(text_json).unwrap();
        match &field {
            IssueCustomField::Text(text) => {
                assert_eq!(
                    text.value.value().unwrap().text,
                    Opt::Set("*Hello*".to_string())
                );
            }
            other => panic!("expected a text field, got {other:?}"),
        }
    }

    #[test]
    fn test_project_custom_field_rejects_unknown_discriminator() {
        let json = r#"{"$type": "MysteryProjectCustomField"}"#;
        assert!(serde_json::from_str::<ProjectCustomField>(json).is_err());
    }

    #[test]
    fn test_project_custom_field_requires_discriminator() {
        assert!(serde_json::from_str::<ProjectCustomField>(r#"{}"#).is_err());
    }

    #[test]
    fn test_project_custom_field_round_trip() {
        let json = r#"{"$type":"UserProjectCustomField","field":{"$type":"CustomField","fieldType":{"$type":"FieldType","id":"user[1]"}}}"#;
        let field: ProjectCustomField = serde_json::from_str(json).unwrap();
        assert_eq!(field.kind, ProjectCustomFieldKind::User);
        assert_eq!(field.field_type_id(), Some("user[1]"));
        assert_eq!(serde_json::to_string(&field).unwrap(), json);
    }

    #[test]
    fn test_union_fields_merge_value_subselections() {
        let fields = IssueCustomField::fields().to_string();
        assert!(fields.starts_with("$type,id,name,value($type,id,name,ringId,login,email"));
        // Scalar, text and period value attributes all land in the same
        // merged subtree.
        assert!(fields.contains("text"));
        assert!(fields.contains("markdownText"));
        assert!(fields.contains("minutes"));
        assert!(fields.contains("presentation"));
        assert!(fields.ends_with("projectCustomField($type,field($type,id,name,fieldType($type,id)))"));
    }

    #[test]
    fn test_bundle_element_round_trip() {
        let json = r#"{"$type":"EnumBundleElement","id":"96-38","name":"Value One"}"#;
        let element: EnumBundleElement = serde_json::from_str(json).unwrap();
        assert_eq!(element.name, Opt::Set("Value One".to_string()));
        assert_eq!(serde_json::to_string(&element).unwrap(), json);
    }

    #[test]
    fn test_bundle_element_rejects_foreign_discriminator() {
        let json = r#"{"$type":"StateBundleElement","id":"98-37"}"#;
        assert!(serde_json::from_str::<EnumBundleElement>(json).is_err());
    }
}

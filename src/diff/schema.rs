use openapiv3::{ObjectType, Schema, SchemaKind, StringType, Type};
use serde_json::Value;

use super::Differ;
use super::resolve::resolve_boxed;
use crate::change::Severity;

const MAX_DEPTH: usize = 10;

/// Whether a schema is sent by clients or returned to them. Widening is
/// harmless on the request side and risky on the response side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Direction {
    Request,
    Response,
}

/// Where in a document a schema sits, for messages.
#[derive(Debug, Clone)]
pub(super) struct SchemaScope {
    label: String,
    field: String,
    direction: Direction,
}

impl SchemaScope {
    pub(super) fn new(label: String, direction: Direction) -> Self {
        Self {
            label,
            field: String::new(),
            direction,
        }
    }

    fn property(&self, name: &str) -> Self {
        let field = if self.field.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.field)
        };
        Self {
            field,
            ..self.clone()
        }
    }

    fn items(&self) -> Self {
        Self {
            field: format!("{}[]", self.field),
            ..self.clone()
        }
    }

    fn subject(&self) -> String {
        if self.field.is_empty() {
            self.label.clone()
        } else {
            format!("field '{}' in {}", self.field, self.label)
        }
    }

    fn path_of(&self, name: &str) -> String {
        self.property(name).field
    }
}

pub(super) fn type_name(kind: &SchemaKind) -> &'static str {
    match kind {
        SchemaKind::Type(Type::String(_)) => "string",
        SchemaKind::Type(Type::Number(_)) => "number",
        SchemaKind::Type(Type::Integer(_)) => "integer",
        SchemaKind::Type(Type::Object(_)) => "object",
        SchemaKind::Type(Type::Array(_)) => "array",
        SchemaKind::Type(Type::Boolean(_)) => "boolean",
        SchemaKind::OneOf { .. } => "oneOf",
        SchemaKind::AllOf { .. } => "allOf",
        SchemaKind::AnyOf { .. } => "anyOf",
        SchemaKind::Not { .. } => "not",
        SchemaKind::Any(_) => "any",
    }
}

impl<'a> Differ<'a> {
    pub(super) fn schema(
        &mut self,
        scope: &SchemaScope,
        old: &'a Schema,
        new: &'a Schema,
        depth: usize,
    ) {
        if depth >= MAX_DEPTH {
            return;
        }

        let old_type = type_name(&old.schema_kind);
        let new_type = type_name(&new.schema_kind);
        if old_type != new_type {
            self.push(
                Severity::Breaking,
                format!(
                    "Type of {} changed from '{old_type}' to '{new_type}'",
                    scope.subject()
                ),
            );
            return;
        }

        let (old_default, new_default) = (&old.schema_data.default, &new.schema_data.default);
        if old_default != new_default {
            let show = |v: &Option<Value>| match v {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "none".to_string(),
            };
            self.push(
                Severity::Dangerous,
                format!(
                    "Default of {} changed from '{}' to '{}'",
                    scope.subject(),
                    show(old_default),
                    show(new_default)
                ),
            );
        }

        match (&old.schema_kind, &new.schema_kind) {
            (SchemaKind::Type(Type::Object(old_obj)), SchemaKind::Type(Type::Object(new_obj))) => {
                self.object(scope, old_obj, new_obj, depth);
            }
            (SchemaKind::Type(Type::Array(old_arr)), SchemaKind::Type(Type::Array(new_arr))) => {
                let old_items = old_arr.items.as_ref().and_then(|r| resolve_boxed(r, self.old));
                let new_items = new_arr.items.as_ref().and_then(|r| resolve_boxed(r, self.new));
                if let (Some(old_items), Some(new_items)) = (old_items, new_items) {
                    self.schema(&scope.items(), old_items, new_items, depth + 1);
                }
            }
            (SchemaKind::Type(Type::String(old_str)), SchemaKind::Type(Type::String(new_str))) => {
                self.string_enum(scope, old_str, new_str);
            }
            _ => {}
        }
    }

    fn object(
        &mut self,
        scope: &SchemaScope,
        old: &'a ObjectType,
        new: &'a ObjectType,
        depth: usize,
    ) {
        let label = &scope.label;

        for name in old.properties.keys().filter(|n| !new.properties.contains_key(*n)) {
            let severity = match scope.direction {
                Direction::Response => Severity::Breaking,
                Direction::Request => Severity::Dangerous,
            };
            self.push(
                severity,
                format!("Field '{}' removed from {label}", scope.path_of(name)),
            );
        }

        for name in new.properties.keys().filter(|n| !old.properties.contains_key(*n)) {
            let severity = match scope.direction {
                Direction::Request if new.required.contains(name) => Severity::Breaking,
                _ => Severity::Safe,
            };
            self.push(
                severity,
                format!("Field '{}' added to {label}", scope.path_of(name)),
            );
        }

        for name in &new.required {
            if old.required.contains(name) || !old.properties.contains_key(name) {
                continue;
            }
            let severity = match scope.direction {
                Direction::Request => Severity::Breaking,
                Direction::Response => Severity::Safe,
            };
            self.push(
                severity,
                format!(
                    "Field '{}' in {label} became required",
                    scope.path_of(name)
                ),
            );
        }

        for name in &old.required {
            if new.required.contains(name) || !new.properties.contains_key(name) {
                continue;
            }
            let severity = match scope.direction {
                Direction::Request => Severity::Safe,
                Direction::Response => Severity::Breaking,
            };
            self.push(
                severity,
                format!(
                    "Field '{}' in {label} became optional",
                    scope.path_of(name)
                ),
            );
        }

        for (name, old_ref) in &old.properties {
            let Some(new_ref) = new.properties.get(name) else {
                continue;
            };
            let old_schema = resolve_boxed(old_ref, self.old);
            let new_schema = resolve_boxed(new_ref, self.new);
            if let (Some(old_schema), Some(new_schema)) = (old_schema, new_schema) {
                self.schema(&scope.property(name), old_schema, new_schema, depth + 1);
            }
        }
    }

    fn string_enum(&mut self, scope: &SchemaScope, old: &StringType, new: &StringType) {
        let old_values: Vec<&str> = old.enumeration.iter().flatten().map(String::as_str).collect();
        let new_values: Vec<&str> = new.enumeration.iter().flatten().map(String::as_str).collect();

        for value in old_values.iter().filter(|v| !new_values.contains(*v)) {
            self.push(
                Severity::Breaking,
                format!("Enum value '{value}' removed from {}", scope.subject()),
            );
        }

        for value in new_values.iter().filter(|v| !old_values.contains(*v)) {
            let severity = match scope.direction {
                Direction::Response => Severity::Dangerous,
                Direction::Request => Severity::Safe,
            };
            self.push(
                severity,
                format!("Enum value '{value}' added to {}", scope.subject()),
            );
        }
    }
}

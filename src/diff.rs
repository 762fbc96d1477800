use indexmap::IndexMap;
use openapiv3::{
    Components, MediaType, OpenAPI, Operation, Parameter, ParameterSchemaOrContent, PathItem,
    ReferenceOr, RequestBody, Response, Responses, StatusCode,
};

use crate::change::{Change, Severity};

mod resolve;
mod schema;

use resolve::resolve;
use schema::{Direction, SchemaScope, type_name};

/// Compare two OpenAPI documents. Changes are reported path by path in the
/// order the documents declare them; removals come before additions at
/// every level.
pub fn diff_specs(old: &OpenAPI, new: &OpenAPI) -> Vec<Change> {
    let mut differ = Differ {
        old: old.components.as_ref(),
        new: new.components.as_ref(),
        changes: Vec::new(),
    };
    differ.paths(&old.paths.paths, &new.paths.paths);
    differ.changes
}

struct Differ<'a> {
    old: Option<&'a Components>,
    new: Option<&'a Components>,
    changes: Vec<Change>,
}

impl<'a> Differ<'a> {
    fn push(&mut self, severity: Severity, message: String) {
        self.changes.push(Change::new(severity, message));
    }

    // -----------------------------------------------------------------------
    // Paths and operations
    // -----------------------------------------------------------------------

    fn paths(
        &mut self,
        old: &'a IndexMap<String, ReferenceOr<PathItem>>,
        new: &'a IndexMap<String, ReferenceOr<PathItem>>,
    ) {
        for path in old.keys().filter(|p| !new.contains_key(*p)) {
            self.push(Severity::Breaking, format!("Path '{path}' removed"));
        }
        for path in new.keys().filter(|p| !old.contains_key(*p)) {
            self.push(Severity::Safe, format!("Path '{path}' added"));
        }
        for (path, old_ref) in old {
            let Some(new_ref) = new.get(path) else {
                continue;
            };
            if let (Some(old_item), Some(new_item)) = (old_ref.as_item(), new_ref.as_item()) {
                self.path_item(path, old_item, new_item);
            }
        }
    }

    fn path_item(&mut self, path: &str, old: &'a PathItem, new: &'a PathItem) {
        for ((method, old_op), (_, new_op)) in operations(old).into_iter().zip(operations(new)) {
            let op = format!("{method} {path}");
            match (old_op, new_op) {
                (Some(_), None) => {
                    self.push(Severity::Breaking, format!("Operation '{op}' removed"))
                }
                (None, Some(_)) => self.push(Severity::Safe, format!("Operation '{op}' added")),
                (Some(old_op), Some(new_op)) => self.operation(&op, old_op, new_op),
                (None, None) => {}
            }
        }
    }

    fn operation(&mut self, op: &str, old: &'a Operation, new: &'a Operation) {
        if !old.deprecated && new.deprecated {
            self.push(Severity::Dangerous, format!("Operation '{op}' deprecated"));
        }
        self.parameters(op, &old.parameters, &new.parameters);
        self.request_body(op, old.request_body.as_ref(), new.request_body.as_ref());
        self.responses(op, &old.responses, &new.responses);
    }

    // -----------------------------------------------------------------------
    // Parameters
    // -----------------------------------------------------------------------

    fn parameter_map(
        params: &'a [ReferenceOr<Parameter>],
        components: Option<&'a Components>,
    ) -> IndexMap<(&'static str, &'a str), &'a Parameter> {
        params
            .iter()
            .filter_map(|r| resolve(r, components))
            .map(|p| ((parameter_kind(p), p.parameter_data_ref().name.as_str()), p))
            .collect()
    }

    fn parameters(
        &mut self,
        op: &str,
        old: &'a [ReferenceOr<Parameter>],
        new: &'a [ReferenceOr<Parameter>],
    ) {
        let old_map = Self::parameter_map(old, self.old);
        let new_map = Self::parameter_map(new, self.new);

        for ((kind, name), param) in &old_map {
            if new_map.contains_key(&(*kind, *name)) {
                continue;
            }
            let (severity, label) = if param.parameter_data_ref().required {
                (Severity::Breaking, "Required")
            } else {
                (Severity::Dangerous, "Optional")
            };
            self.push(
                severity,
                format!("{label} {kind} parameter '{name}' removed from '{op}'"),
            );
        }

        for ((kind, name), param) in &new_map {
            if old_map.contains_key(&(*kind, *name)) {
                continue;
            }
            let (severity, label) = if param.parameter_data_ref().required {
                (Severity::Breaking, "Required")
            } else {
                (Severity::Dangerous, "Optional")
            };
            self.push(
                severity,
                format!("{label} {kind} parameter '{name}' added to '{op}'"),
            );
        }

        for (key, old_param) in &old_map {
            let Some(new_param) = new_map.get(key) else {
                continue;
            };
            let name = key.1;
            let old_data = old_param.parameter_data_ref();
            let new_data = new_param.parameter_data_ref();
            if !old_data.required && new_data.required {
                self.push(
                    Severity::Breaking,
                    format!("Parameter '{name}' of '{op}' became required"),
                );
            }
            if old_data.required && !new_data.required {
                self.push(
                    Severity::Safe,
                    format!("Parameter '{name}' of '{op}' became optional"),
                );
            }
            let types = (
                parameter_type(&old_data.format, self.old),
                parameter_type(&new_data.format, self.new),
            );
            if let (Some(old_ty), Some(new_ty)) = types {
                if old_ty != new_ty {
                    self.push(
                        Severity::Breaking,
                        format!(
                            "Type of parameter '{name}' of '{op}' changed from '{old_ty}' to '{new_ty}'"
                        ),
                    );
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Request body
    // -----------------------------------------------------------------------

    fn request_body(
        &mut self,
        op: &str,
        old: Option<&'a ReferenceOr<RequestBody>>,
        new: Option<&'a ReferenceOr<RequestBody>>,
    ) {
        let old_body = old.and_then(|r| resolve(r, self.old));
        let new_body = new.and_then(|r| resolve(r, self.new));

        match (old_body, new_body) {
            (None, Some(body)) if body.required => self.push(
                Severity::Breaking,
                format!("Required request body added to '{op}'"),
            ),
            (None, Some(_)) => self.push(
                Severity::Safe,
                format!("Optional request body added to '{op}'"),
            ),
            (Some(_), None) => self.push(
                Severity::Breaking,
                format!("Request body removed from '{op}'"),
            ),
            (Some(old_body), Some(new_body)) => {
                if !old_body.required && new_body.required {
                    self.push(
                        Severity::Breaking,
                        format!("Request body of '{op}' became required"),
                    );
                }
                let label = format!("request body of '{op}'");
                self.content(&label, &old_body.content, &new_body.content, Direction::Request);
            }
            (None, None) => {}
        }
    }

    // -----------------------------------------------------------------------
    // Responses
    // -----------------------------------------------------------------------

    fn responses(&mut self, op: &str, old: &'a Responses, new: &'a Responses) {
        for code in old.responses.keys().filter(|c| !new.responses.contains_key(*c)) {
            self.push(
                Severity::Breaking,
                format!("Response '{}' removed from '{op}'", status_code(code)),
            );
        }
        for code in new.responses.keys().filter(|c| !old.responses.contains_key(*c)) {
            self.push(
                Severity::Safe,
                format!("Response '{}' added to '{op}'", status_code(code)),
            );
        }
        for (code, old_ref) in &old.responses {
            let Some(new_ref) = new.responses.get(code) else {
                continue;
            };
            let resolved: (Option<&Response>, Option<&Response>) =
                (resolve(old_ref, self.old), resolve(new_ref, self.new));
            if let (Some(old_resp), Some(new_resp)) = resolved {
                let label = format!("response '{}' of '{op}'", status_code(code));
                self.content(&label, &old_resp.content, &new_resp.content, Direction::Response);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Media types
    // -----------------------------------------------------------------------

    fn content(
        &mut self,
        label: &str,
        old: &'a IndexMap<String, MediaType>,
        new: &'a IndexMap<String, MediaType>,
        direction: Direction,
    ) {
        for media in old.keys().filter(|m| !new.contains_key(*m)) {
            self.push(
                Severity::Breaking,
                format!("Media type '{media}' removed from {label}"),
            );
        }
        for media in new.keys().filter(|m| !old.contains_key(*m)) {
            self.push(
                Severity::Safe,
                format!("Media type '{media}' added to {label}"),
            );
        }
        for (media, old_mt) in old {
            let Some(new_mt) = new.get(media) else {
                continue;
            };
            let old_schema = old_mt.schema.as_ref().and_then(|r| resolve(r, self.old));
            let new_schema = new_mt.schema.as_ref().and_then(|r| resolve(r, self.new));
            if let (Some(old_schema), Some(new_schema)) = (old_schema, new_schema) {
                let scope = SchemaScope::new(format!("{label} ({media})"), direction);
                self.schema(&scope, old_schema, new_schema, 0);
            }
        }
    }
}

fn operations(item: &PathItem) -> [(&'static str, Option<&Operation>); 8] {
    [
        ("GET", item.get.as_ref()),
        ("PUT", item.put.as_ref()),
        ("POST", item.post.as_ref()),
        ("DELETE", item.delete.as_ref()),
        ("OPTIONS", item.options.as_ref()),
        ("HEAD", item.head.as_ref()),
        ("PATCH", item.patch.as_ref()),
        ("TRACE", item.trace.as_ref()),
    ]
}

fn parameter_kind(p: &Parameter) -> &'static str {
    match p {
        Parameter::Query { .. } => "query",
        Parameter::Header { .. } => "header",
        Parameter::Path { .. } => "path",
        Parameter::Cookie { .. } => "cookie",
    }
}

fn parameter_type(
    format: &ParameterSchemaOrContent,
    components: Option<&Components>,
) -> Option<&'static str> {
    match format {
        ParameterSchemaOrContent::Schema(r) => {
            resolve(r, components).map(|s| type_name(&s.schema_kind))
        }
        ParameterSchemaOrContent::Content(_) => None,
    }
}

fn status_code(code: &StatusCode) -> String {
    match code {
        StatusCode::Code(c) => c.to_string(),
        StatusCode::Range(r) => format!("{r}XX"),
    }
}

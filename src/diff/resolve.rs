use indexmap::IndexMap;
use openapiv3::{Components, Parameter, ReferenceOr, RequestBody, Response, Schema};

/// A kind of object that may be referenced from `#/components/...`.
pub(super) trait Component: Sized {
    const PREFIX: &'static str;

    fn table(components: &Components) -> &IndexMap<String, ReferenceOr<Self>>;
}

impl Component for Parameter {
    const PREFIX: &'static str = "#/components/parameters/";

    fn table(components: &Components) -> &IndexMap<String, ReferenceOr<Self>> {
        &components.parameters
    }
}

impl Component for RequestBody {
    const PREFIX: &'static str = "#/components/requestBodies/";

    fn table(components: &Components) -> &IndexMap<String, ReferenceOr<Self>> {
        &components.request_bodies
    }
}

impl Component for Response {
    const PREFIX: &'static str = "#/components/responses/";

    fn table(components: &Components) -> &IndexMap<String, ReferenceOr<Self>> {
        &components.responses
    }
}

impl Component for Schema {
    const PREFIX: &'static str = "#/components/schemas/";

    fn table(components: &Components) -> &IndexMap<String, ReferenceOr<Self>> {
        &components.schemas
    }
}

fn lookup<'a, T: Component>(reference: &str, components: Option<&'a Components>) -> Option<&'a T> {
    let name = reference.strip_prefix(T::PREFIX)?;
    T::table(components?).get(name)?.as_item()
}

/// Follow one level of local `$ref`. External and chained references
/// resolve to `None` and are skipped by the caller.
pub(super) fn resolve<'a, T: Component>(
    r: &'a ReferenceOr<T>,
    components: Option<&'a Components>,
) -> Option<&'a T> {
    match r {
        ReferenceOr::Item(item) => Some(item),
        ReferenceOr::Reference { reference } => lookup(reference, components),
    }
}

pub(super) fn resolve_boxed<'a>(
    r: &'a ReferenceOr<Box<Schema>>,
    components: Option<&'a Components>,
) -> Option<&'a Schema> {
    match r {
        ReferenceOr::Item(item) => Some(item.as_ref()),
        ReferenceOr::Reference { reference } => lookup(reference, components),
    }
}

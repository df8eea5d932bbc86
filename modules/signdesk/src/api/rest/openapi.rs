//! OpenAPI document for every route the module registers, built with the
//! `utoipa` builders so the generic resource routes share one description.

use modkit::api::problem::{Problem, ValidationError, APPLICATION_PROBLEM_JSON};
use utoipa::openapi::path::{
    HttpMethod, Operation, OperationBuilder, ParameterBuilder, ParameterIn, PathItemBuilder,
};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::schema::{
    Array, KnownFormat, ObjectBuilder, Schema, SchemaFormat, Type,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityRequirement, SecurityScheme};
use utoipa::openapi::{
    ComponentsBuilder, ContentBuilder, Info, OpenApi, OpenApiBuilder, PathsBuilder, Ref, RefOr,
    Required, Response, ResponseBuilder,
};
use utoipa::{PartialSchema, ToSchema};

use crate::api::rest::dto::{SessionDto, SignOutResp, TouchJobReq, TouchJobResp};
use crate::config::SessionConfig;
use crate::domain::resource::Resource;
use crate::domain::resources::{
    Brands, Clients, Jobs, OptionValues, PricingLines, SignOptions, Signs, Users,
};

const JSON: &str = "application/json";
const SESSION_SCHEME: &str = "session_cookie";

fn schema_ref<T: ToSchema>() -> RefOr<Schema> {
    RefOr::Ref(Ref::from_schema_name(T::name()))
}

fn array_of<T: ToSchema>() -> RefOr<Schema> {
    RefOr::T(Schema::Array(Array::new(schema_ref::<T>())))
}

fn uuid_schema() -> RefOr<Schema> {
    RefOr::T(Schema::Object(
        ObjectBuilder::new()
            .schema_type(Type::String)
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::Uuid)))
            .build(),
    ))
}

/// Adds `T` and every schema it references.
fn with_schema<T: ToSchema>(components: ComponentsBuilder) -> ComponentsBuilder {
    let mut collected = vec![(T::name().to_string(), <T as PartialSchema>::schema())];
    T::schemas(&mut collected);
    collected
        .into_iter()
        .fold(components, |c, (name, schema)| c.schema(name, schema))
}

fn json_response(description: &str, schema: RefOr<Schema>) -> Response {
    ResponseBuilder::new()
        .description(description)
        .content(JSON, ContentBuilder::new().schema(Some(schema)).build())
        .build()
}

fn problem(description: &str) -> Response {
    ResponseBuilder::new()
        .description(description)
        .content(
            APPLICATION_PROBLEM_JSON,
            ContentBuilder::new()
                .schema(Some(schema_ref::<Problem>()))
                .build(),
        )
        .build()
}

fn operation(id: String, summary: String, tag: &str) -> OperationBuilder {
    OperationBuilder::new()
        .operation_id(Some(id))
        .summary(Some(summary))
        .tag(tag)
        .security(SecurityRequirement::new(SESSION_SCHEME, Vec::<String>::new()))
        .response("401", problem("No valid session"))
        .response("500", problem("Internal error"))
}

fn json_body(schema: RefOr<Schema>) -> Option<utoipa::openapi::request_body::RequestBody> {
    Some(
        RequestBodyBuilder::new()
            .content(JSON, ContentBuilder::new().schema(Some(schema)).build())
            .required(Some(Required::True))
            .build(),
    )
}

fn id_param(op: OperationBuilder) -> OperationBuilder {
    op.parameter(
        ParameterBuilder::new()
            .name("id")
            .parameter_in(ParameterIn::Path)
            .required(Required::True)
            .schema(Some(uuid_schema())),
    )
}

fn collection_ops<R: Resource>() -> (Operation, Operation) {
    let tag = R::COLLECTION;

    let mut list = operation(
        format!("list_{tag}"),
        format!("List {}s", R::NAME),
        tag,
    )
    .response("200", json_response("All rows", array_of::<R::Model>()))
    .response("400", problem("Malformed filter"))
    .response("403", problem("Role not permitted"));
    if let Some(key) = R::PARENT_KEY {
        list = list.parameter(
            ParameterBuilder::new()
                .name(key)
                .parameter_in(ParameterIn::Query)
                .required(Required::False)
                .schema(Some(uuid_schema())),
        );
    }

    let create = operation(
        format!("create_{tag}"),
        format!("Create a {}", R::NAME),
        tag,
    )
    .request_body(json_body(schema_ref::<R::New>()))
    .response("201", json_response("Created", schema_ref::<R::Model>()))
    .response("400", problem("Missing required fields"))
    .response("403", problem("Role not permitted"))
    .response("409", problem("Conflicts with an existing row"));

    (list.build(), create.build())
}

fn item_ops<R: Resource>() -> Vec<(HttpMethod, Operation)> {
    let tag = R::COLLECTION;

    let get = id_param(operation(
        format!("get_{tag}"),
        format!("Get a {}", R::NAME),
        tag,
    ))
    .response("200", json_response("Found", schema_ref::<R::Model>()))
    .response("400", problem("Malformed id"))
    .response("404", problem("Not found"));

    let update = |verb: &str| {
        id_param(operation(
            format!("{verb}_{tag}"),
            format!("Update a {}", R::NAME),
            tag,
        ))
        .request_body(json_body(schema_ref::<R::Patch>()))
        .response("200", json_response("Updated", schema_ref::<R::Model>()))
        .response("400", problem("Malformed id or body"))
        .response("404", problem("Not found"))
        .response("409", problem("Conflicts with an existing row"))
        .build()
    };

    let delete = id_param(operation(
        format!("delete_{tag}"),
        format!("Delete a {}", R::NAME),
        tag,
    ))
    .response(
        "204",
        ResponseBuilder::new().description("Deleted").build(),
    )
    .response("200", json_response("Disabled", schema_ref::<R::Model>()))
    .response("404", problem("Not found"))
    .response("409", problem("Still referenced"));

    vec![
        (HttpMethod::Get, get.build()),
        (HttpMethod::Put, update("replace")),
        (HttpMethod::Patch, update("update")),
        (HttpMethod::Delete, delete.build()),
    ]
}

fn add_resource<R: Resource>(
    paths: PathsBuilder,
    components: ComponentsBuilder,
) -> (PathsBuilder, ComponentsBuilder) {
    let (list, create) = collection_ops::<R>();
    let collection = PathItemBuilder::new()
        .operation(HttpMethod::Get, list)
        .operation(HttpMethod::Post, create)
        .build();
    let item = item_ops::<R>()
        .into_iter()
        .fold(PathItemBuilder::new(), |b, (method, op)| b.operation(method, op))
        .build();

    let paths = paths
        .path(format!("/{}", R::COLLECTION), collection)
        .path(format!("/{}/{{id}}", R::COLLECTION), item);
    let components = with_schema::<R::Patch>(with_schema::<R::New>(with_schema::<R::Model>(
        components,
    )));
    (paths, components)
}

fn auth_paths(paths: PathsBuilder) -> PathsBuilder {
    let touch = operation(
        "update_job_last_modified".into(),
        "Refresh a job's last-modified timestamp".into(),
        "jobs",
    )
    .request_body(json_body(schema_ref::<TouchJobReq>()))
    .response("200", json_response("New timestamp", schema_ref::<TouchJobResp>()))
    .response("400", problem("Missing or malformed jobId"))
    .response("404", problem("Job not found"))
    .build();

    let session = operation(
        "get_session".into(),
        "The caller's resolved identity".into(),
        "auth",
    )
    .response("200", json_response("Signed in", schema_ref::<SessionDto>()))
    .build();

    let sign_out = OperationBuilder::new()
        .operation_id(Some("sign_out"))
        .summary(Some("End the session and clear its cookies"))
        .tag("auth")
        .response("200", json_response("Signed out", schema_ref::<SignOutResp>()))
        .response("500", problem("Provider sign-out failed"))
        .build();

    let callback = OperationBuilder::new()
        .operation_id(Some("auth_callback"))
        .summary(Some("Complete sign-in with an authorization code"))
        .tag("auth")
        .parameter(
            ParameterBuilder::new()
                .name("code")
                .parameter_in(ParameterIn::Query)
                .required(Required::False)
                .schema(Some(RefOr::T(Schema::Object(
                    ObjectBuilder::new().schema_type(Type::String).build(),
                )))),
        )
        .response(
            "303",
            ResponseBuilder::new()
                .description("Redirect to the app, or to sign-in with an `error` code")
                .build(),
        )
        .build();

    paths
        .path(
            "/jobs/update-last-modified",
            PathItemBuilder::new().operation(HttpMethod::Post, touch).build(),
        )
        .path(
            "/auth/session",
            PathItemBuilder::new().operation(HttpMethod::Get, session).build(),
        )
        .path(
            "/auth/sign-out",
            PathItemBuilder::new().operation(HttpMethod::Post, sign_out).build(),
        )
        .path(
            "/auth/callback",
            PathItemBuilder::new().operation(HttpMethod::Get, callback).build(),
        )
}

pub fn document(session: &SessionConfig) -> OpenApi {
    let (paths, components) = (PathsBuilder::new(), ComponentsBuilder::new());
    let (paths, components) = add_resource::<Brands>(paths, components);
    let (paths, components) = add_resource::<Clients>(paths, components);
    let (paths, components) = add_resource::<Jobs>(paths, components);
    let (paths, components) = add_resource::<Signs>(paths, components);
    let (paths, components) = add_resource::<SignOptions>(paths, components);
    let (paths, components) = add_resource::<OptionValues>(paths, components);
    let (paths, components) = add_resource::<PricingLines>(paths, components);
    let (paths, components) = add_resource::<Users>(paths, components);

    let components = [
        with_schema::<Problem>,
        with_schema::<ValidationError>,
        with_schema::<TouchJobReq>,
        with_schema::<TouchJobResp>,
        with_schema::<SessionDto>,
        with_schema::<SignOutResp>,
    ]
    .into_iter()
    .fold(components, |c, add| add(c))
    .security_scheme(
        SESSION_SCHEME,
        SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
            session.access_cookie.clone(),
        ))),
    );

    let mut info = Info::new("SignDesk API", env!("CARGO_PKG_VERSION"));
    info.description = Some("Signage production jobs: catalog, pricing and users".into());

    OpenApiBuilder::new()
        .info(info)
        .paths(auth_paths(paths).build())
        .components(Some(components.build()))
        .build()
}

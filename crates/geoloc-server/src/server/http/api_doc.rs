//! OpenAPI document for the route table, served at `{CONTEXT_PATH}/api-doc`.

use crate::server::config::ServerConfig;
use geoloc_core::{FlowId, INVALID_COORDINATES_MSG, Method, ROUTES, Route};
use utoipa::openapi::{
    OpenApi, OpenApiBuilder, Required,
    content::ContentBuilder,
    info::InfoBuilder,
    path::{
        HttpMethod, Operation, OperationBuilder, ParameterBuilder, ParameterIn, PathItemBuilder,
        PathsBuilder,
    },
    request_body::RequestBodyBuilder,
    response::{Response, ResponseBuilder, ResponsesBuilder},
    schema::{ObjectBuilder, Schema, SchemaType, Type},
    server::Server,
};

const JSON: &str = "application/json";

/// Builds the document by walking [`ROUTES`]. Paths are relative to the
/// single server entry, which is the API root.
pub fn openapi(config: &ServerConfig) -> OpenApi {
    let paths = ROUTES
        .iter()
        .fold(PathsBuilder::new(), |paths, route| {
            let item = PathItemBuilder::new()
                .operation(http_method(route.method), operation(route, &config.api_title))
                .build();
            paths.path(route.path, item)
        })
        .build();

    let info = InfoBuilder::new()
        .title(&config.api_title)
        .version(env!("CARGO_PKG_VERSION"))
        .description(Some(&config.api_description))
        .build();

    OpenApiBuilder::new()
        .info(info)
        .servers(Some([Server::new(config.api_root())]))
        .paths(paths)
        .build()
}

fn http_method(method: Method) -> HttpMethod {
    match method {
        Method::Get => HttpMethod::Get,
        Method::Post => HttpMethod::Post,
    }
}

fn operation(route: &Route, tag: &str) -> Operation {
    let mut op = OperationBuilder::new()
        .operation_id(Some(route.flow.name()))
        .summary(Some(route.description))
        .tag(tag);

    for name in route.parameters() {
        op = op.parameter(
            ParameterBuilder::new()
                .name(name)
                .parameter_in(ParameterIn::Path)
                .required(Required::True)
                .description(Some(format!("The {name} as a decimal string")))
                .schema(Some(string_schema()))
                .build(),
        );
    }

    let mut responses = ResponsesBuilder::new()
        .response("200", json_response(success_description(route.flow)));
    if validates(route.flow) {
        responses = responses.response("400", json_response(INVALID_COORDINATES_MSG));
    }
    responses = responses.response(
        "502",
        json_response("The geocoding provider, document store or cache failed"),
    );

    if route.method == Method::Post {
        op = op.request_body(Some(
            RequestBodyBuilder::new()
                .description(Some("Records to save, wrapped in `list`"))
                .content(JSON, ContentBuilder::new().schema(Some(object_schema())).build())
                .required(Some(Required::True))
                .build(),
        ));
    }

    op.responses(responses.build()).build()
}

fn validates(flow: FlowId) -> bool {
    !matches!(flow, FlowId::Ping | FlowId::CacheSnapshot)
}

fn success_description(flow: FlowId) -> &'static str {
    match flow {
        FlowId::Ping | FlowId::Lookup => "The resolved record",
        FlowId::StoredQuery | FlowId::CacheSnapshot => "Matching records, wrapped in `list`",
        FlowId::BulkPersist | FlowId::BulkCacheWrite => "The saved records with their ids",
    }
}

fn json_response(description: &str) -> Response {
    ResponseBuilder::new()
        .description(description)
        .content(JSON, ContentBuilder::new().schema(Some(object_schema())).build())
        .build()
}

fn string_schema() -> Schema {
    Schema::Object(
        ObjectBuilder::new()
            .schema_type(SchemaType::Type(Type::String))
            .build(),
    )
}

fn object_schema() -> Schema {
    Schema::Object(
        ObjectBuilder::new()
            .schema_type(SchemaType::Type(Type::Object))
            .build(),
    )
}

use crate::{
    compiler::GENERATOR_NAME,
    traits::Renderer,
    types::{AdapterSpec, FileSpec, RouteSpec, ServiceSpec, TypeSpec},
    utils::{escape_rust_keyword, str_literal, to_pascal_case, to_snake_case},
};

/// Artifact extension of the Rust renderer.
pub const RUST_EXTENSION: &str = ".web.rs";

/// Renders axum routing glue and serde adapters for prost-generated types.
///
/// The output is meant to be `include!`d into the module holding the prost
/// types of the file's package. Everything lands in a `<stem>_web` child
/// module so files of one package never clash, and own-package types are
/// reached through `super::`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustRenderer;

impl Renderer for RustRenderer {
    fn extension(&self) -> &str {
        RUST_EXTENSION
    }

    fn render(&self, file: &FileSpec) -> String {
        compile_file_to_rust(file)
    }
}

/// Name of the module wrapping the generated code of `file`.
pub fn module_name(file: &FileSpec) -> String {
    format!("{}_web", to_snake_case(&file.stem))
}

/// Rust path of a message type as seen from inside the generated module.
/// The empty marker is `()`, which is how prost maps it.
pub fn type_path(ty: &TypeSpec) -> String {
    if ty.empty {
        return "()".to_string();
    }
    let mut segments = vec![ty.alias.clone().unwrap_or_else(|| "super".to_string())];
    segments.extend(message_path(&ty.path));
    segments.join("::")
}

/// prost puts a message's nested types in a snake_case module named after it.
fn message_path(path: &[String]) -> Vec<String> {
    let mut segments = Vec::with_capacity(path.len());
    if let Some((name, parents)) = path.split_last() {
        for parent in parents {
            segments.push(escape_rust_keyword(&to_snake_case(parent)));
        }
        segments.push(escape_rust_keyword(&to_pascal_case(name)));
    }
    segments
}

fn method_name(route: &RouteSpec) -> String {
    escape_rust_keyword(&to_snake_case(&route.method))
}

fn handler_name(route: &RouteSpec) -> String {
    format!("handle_{}", to_snake_case(&route.method))
}

fn trait_name(service: &ServiceSpec) -> String {
    format!("{}Handler", to_pascal_case(&service.name))
}

fn wrapper_name(service: &ServiceSpec) -> String {
    format!("Web{}", to_pascal_case(&service.name))
}

/// Compiles one `FileSpec` into Rust source.
pub fn compile_file_to_rust(file: &FileSpec) -> String {
    let mut rust_code: Vec<String> = Vec::new();

    rust_code.push(format!("// @generated by {}. DO NOT EDIT.", GENERATOR_NAME));
    rust_code.push(format!("// source: {}", file.source));
    rust_code.push("".to_string());
    rust_code.push("#[allow(unused_imports, unused_variables, unused_mut, dead_code, clippy::all)]".to_string());
    rust_code.push(format!("pub mod {} {{", module_name(file)));

    if !file.imports.is_empty() {
        for import in &file.imports {
            rust_code.push(format!("    use {} as {};", import.path, import.alias));
        }
        rust_code.push("".to_string());
    }

    for service in &file.services {
        rust_code.push(generate_service(service, &file.path_prefix));
    }

    for adapter in &file.adapters {
        rust_code.push(generate_adapter(adapter));
    }

    rust_code.push("}".to_string());
    rust_code.push("".to_string());

    rust_code.join("\n")
}

/// Generates the handler trait, the wrapper with its dispatch table and one
/// HTTP handler per route, and the registration function.
fn generate_service(service: &ServiceSpec, path_prefix: &str) -> String {
    let trait_name = trait_name(service);
    let wrapper = wrapper_name(service);
    let register = format!("register_{}_web", to_snake_case(&service.name));
    let mut lines = Vec::new();

    // Business logic
    lines.push(format!("    /// Business logic of the `{}` methods exposed over HTTP.", service.name));
    lines.push("    #[::protoweb::async_trait]".to_string());
    lines.push(format!("    pub trait {}: Send + Sync + 'static {{", trait_name));
    for route in &service.routes {
        lines.push(format!(
            "        async fn {}(&self, ctx: ::protoweb::Context, req: {}, resp: &mut {}) -> ::protoweb::HandlerResult;",
            method_name(route),
            type_path(&route.input),
            type_path(&route.output),
        ));
    }
    lines.push("    }".to_string());
    lines.push("".to_string());

    // Wrapper
    lines.push(format!("    /// Serves `{}` over HTTP through a [`{}`].", service.name, trait_name));
    lines.push(format!("    pub struct {}<H> {{", wrapper));
    lines.push("        h: ::std::sync::Arc<H>,".to_string());
    lines.push("        marshaler: ::protoweb::JsonMarshaler,".to_string());
    lines.push("        unmarshaler: ::protoweb::JsonUnmarshaler,".to_string());
    lines.push("    }".to_string());
    lines.push("".to_string());

    lines.push(format!("    impl<H: {}> {}<H> {{", trait_name, wrapper));
    lines.push("        pub fn new(h: H) -> Self {".to_string());
    lines.push("            Self::with_codec(h, ::protoweb::JsonMarshaler::default(), ::protoweb::JsonUnmarshaler::default())".to_string());
    lines.push("        }".to_string());
    lines.push("".to_string());
    lines.push("        pub fn with_codec(h: H, marshaler: ::protoweb::JsonMarshaler, unmarshaler: ::protoweb::JsonUnmarshaler) -> Self {".to_string());
    lines.push("            Self {".to_string());
    lines.push("                h: ::std::sync::Arc::new(h),".to_string());
    lines.push("                marshaler,".to_string());
    lines.push("                unmarshaler,".to_string());
    lines.push("            }".to_string());
    lines.push("        }".to_string());
    lines.push("".to_string());

    lines.push("        /// The dispatch table: one route per HTTP-bound method.".to_string());
    lines.push("        pub fn router<S>(self) -> ::protoweb::axum::Router<S>".to_string());
    lines.push("        where".to_string());
    lines.push("            S: Clone + Send + Sync + 'static,".to_string());
    lines.push("        {".to_string());
    lines.push("            let web = ::std::sync::Arc::new(self);".to_string());
    lines.push("            ::protoweb::axum::Router::new()".to_string());
    for route in &service.routes {
        lines.push(generate_registration(route, path_prefix));
    }
    lines.push("        }".to_string());

    for route in &service.routes {
        lines.push("".to_string());
        lines.push(generate_handler(service, route));
    }
    lines.push("    }".to_string());
    lines.push("".to_string());

    // Registration
    lines.push(format!("    /// Adds the `{}` routes to `router`.", service.name));
    lines.push(format!("    pub fn {}<H, S>(router: ::protoweb::axum::Router<S>, handler: H) -> ::protoweb::axum::Router<S>", register));
    lines.push("    where".to_string());
    lines.push(format!("        H: {},", trait_name));
    lines.push("        S: Clone + Send + Sync + 'static,".to_string());
    lines.push("    {".to_string());
    lines.push(format!("        router.merge({}::new(handler).router())", wrapper));
    lines.push("    }".to_string());
    lines.push("".to_string());

    lines.join("\n")
}

fn generate_registration(route: &RouteSpec, path_prefix: &str) -> String {
    let pattern = format!("{}{}", path_prefix, route.binding.pattern);
    [
        format!(
            "                .route({}, ::protoweb::axum::routing::on(::protoweb::axum::routing::MethodFilter::{}, {{",
            str_literal(&pattern),
            route.binding.verb,
        ),
        "                    let web = ::std::sync::Arc::clone(&web);".to_string(),
        format!(
            "                    move |req: ::protoweb::axum::extract::Request| async move {{ web.{}(req).await }}",
            handler_name(route),
        ),
        "                }))".to_string(),
    ]
    .join("\n")
}

/// Reads the request body or bails out with the parse-failure envelope.
fn read_body_lines(indent: &str) -> Vec<String> {
    vec![
        format!("{}let body = match ::protoweb::read_body(body).await {{", indent),
        format!("{}    Ok(body) => body,", indent),
        format!("{}    Err(err) => return ::protoweb::parse_failed(err),", indent),
        format!("{}}};", indent),
    ]
}

/// Generates one HTTP handler:
///  1) empty input/output holders,
///  2) content negotiation (form, JSON, anything else left at zero value),
///  3) the business-logic call with the 400 envelope on error,
///  4) 204 for the empty marker output, 200 + JSON otherwise.
fn generate_handler(service: &ServiceSpec, route: &RouteSpec) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "        /// `{} {}` for `{}.{}`.",
        route.binding.verb, route.binding.pattern, service.name, route.method
    ));
    lines.push(format!(
        "        pub async fn {}(&self, req: ::protoweb::axum::extract::Request) -> ::protoweb::axum::response::Response {{",
        handler_name(route)
    ));

    if route.input.empty {
        lines.push("            let (parts, _body) = req.into_parts();".to_string());
        lines.push("            let input = ();".to_string());
    } else {
        lines.push("            let (parts, body) = req.into_parts();".to_string());
        lines.push(format!("            let mut input = {}::default();", type_path(&route.input)));
    }
    if route.output.empty {
        lines.push("            let mut output = ();".to_string());
    } else {
        lines.push(format!("            let mut output = {}::default();", type_path(&route.output)));
    }
    lines.push("".to_string());

    if !route.input.empty {
        lines.push("            let content_type = ::protoweb::content_type(&parts.headers);".to_string());
        lines.push("            if content_type.contains(::protoweb::FORM_CONTENT_TYPE) {".to_string());
        lines.extend(read_body_lines("                "));
        lines.push("                if let Err(err) = ::protoweb::form::decode(&parts, &body, &mut input) {".to_string());
        lines.push("                    return ::protoweb::parse_failed(err);".to_string());
        lines.push("                }".to_string());
        lines.push("            } else if content_type.contains(::protoweb::JSON_CONTENT_TYPE) {".to_string());
        lines.extend(read_body_lines("                "));
        lines.push("                if let Err(err) = ::protoweb::JsonMessage::from_json(&mut input, &self.unmarshaler, &body) {".to_string());
        lines.push("                    return ::protoweb::parse_failed(err);".to_string());
        lines.push("                }".to_string());
        lines.push("            }".to_string());
        lines.push("".to_string());
    }

    lines.push("            let ctx = ::protoweb::Context::from_parts(parts);".to_string());
    lines.push(format!(
        "            if let Err(err) = self.h.{}(ctx, input, &mut output).await {{",
        method_name(route)
    ));
    lines.push("                return ::protoweb::handler_failed(err);".to_string());
    lines.push("            }".to_string());
    lines.push("".to_string());

    if route.output.empty {
        lines.push("            ::protoweb::no_content()".to_string());
    } else {
        lines.push("            ::protoweb::render_json(&output, &self.marshaler)".to_string());
    }
    lines.push("        }".to_string());

    lines.join("\n")
}

/// Generates the `JsonMessage` implementation plus serde impls routed
/// through the canonical protobuf JSON mapping.
fn generate_adapter(adapter: &AdapterSpec) -> String {
    let name = type_path(&TypeSpec {
        full_name: adapter.full_name.clone(),
        alias:     None,
        path:      adapter.path.clone(),
        empty:     false,
    });

    let lines = vec![
        format!("    impl ::protoweb::JsonMessage for {} {{", name),
        "        fn to_json(&self, marshaler: &::protoweb::JsonMarshaler) -> ::std::result::Result<::std::vec::Vec<u8>, ::protoweb::Error> {".to_string(),
        "            marshaler.marshal(self)".to_string(),
        "        }".to_string(),
        "".to_string(),
        "        fn from_json(&mut self, unmarshaler: &::protoweb::JsonUnmarshaler, buf: &[u8]) -> ::std::result::Result<(), ::protoweb::Error> {".to_string(),
        "            unmarshaler.unmarshal(buf, self)".to_string(),
        "        }".to_string(),
        "    }".to_string(),
        "".to_string(),
        format!("    impl ::protoweb::serde::Serialize for {} {{", name),
        "        fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>".to_string(),
        "        where".to_string(),
        "            S: ::protoweb::serde::Serializer,".to_string(),
        "        {".to_string(),
        "            ::protoweb::codec::serialize(self, serializer)".to_string(),
        "        }".to_string(),
        "    }".to_string(),
        "".to_string(),
        format!("    impl<'de> ::protoweb::serde::Deserialize<'de> for {} {{", name),
        "        fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>".to_string(),
        "        where".to_string(),
        "            D: ::protoweb::serde::Deserializer<'de>,".to_string(),
        "        {".to_string(),
        "            ::protoweb::codec::deserialize(deserializer)".to_string(),
        "        }".to_string(),
        "    }".to_string(),
        "".to_string(),
    ];

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Binding, Verb};

    fn ty(name: &str, alias: Option<&str>) -> TypeSpec {
        TypeSpec {
            full_name: format!("pkg.{}", name),
            alias:     alias.map(str::to_string),
            path:      name.split('.').map(str::to_string).collect(),
            empty:     false,
        }
    }

    #[test]
    fn test_type_path() {
        assert_eq!(type_path(&ty("HelloRequest", None)), "super::HelloRequest");
        assert_eq!(type_path(&ty("Outer.Inner", None)), "super::outer::Inner");
        assert_eq!(type_path(&ty("Money", Some("commonv1"))), "commonv1::Money");

        let mut empty = ty("Empty", Some("prost_types"));
        empty.empty = true;
        assert_eq!(type_path(&empty), "()");
    }

    #[test]
    fn test_registration_uses_prefix() {
        let route = RouteSpec {
            method:           "GetThing".to_string(),
            binding:          Binding {
                verb:    Verb::Get,
                pattern: "/v1/things/{id}".to_string(),
                body:    String::new(),
            },
            input:            ty("GetThingRequest", None),
            output:           ty("Thing", None),
            client_streaming: false,
        };
        let code = generate_registration(&route, "/api");
        assert!(code.contains(".route(\"/api/v1/things/{id}\""));
        assert!(code.contains("MethodFilter::GET"));
        assert!(code.contains("web.handle_get_thing(req).await"));
    }
}

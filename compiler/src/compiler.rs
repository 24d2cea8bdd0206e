use prost::Message as _;
use prost_types::compiler::{code_generator_response, CodeGeneratorResponse};
use protoweb_schema::{File, Model, TypeRef};
use tracing::{debug, info, warn};

use crate::{
    binding::extract,
    error::GenError,
    gen_rust::RustRenderer,
    imports::ImportResolver,
    options::Options,
    traits::Renderer,
    types::{AdapterSpec, Artifact, FileSpec, RouteSpec, ServiceSpec, TypeSpec},
    utils::sanitize_identifier,
};

pub const GENERATOR_NAME: &str = "protoc-gen-web";

/// Resolves a method's input or output type against the file being rendered.
/// Types from another package go through the alias table, except types
/// declared outside any package, which live directly in the module root.
fn resolve_type(ty: &TypeRef, file: &File, options: &Options, imports: &mut ImportResolver) -> TypeSpec {
    let empty = ty.is_empty_marker();
    let alias = if empty || ty.package == file.package {
        None
    } else if ty.package.is_empty() {
        Some(options.module_root.clone())
    } else {
        Some(imports.register(&options.module_path(&ty.package)))
    };

    TypeSpec {
        full_name: ty.full_name.clone(),
        alias,
        path: ty.path.clone(),
        empty,
    }
}

/// Builds the intermediate model of one file. Only methods with a binding
/// that are not server-streaming become routes.
pub fn build_file_spec(file: &File, options: &Options, imports: &mut ImportResolver) -> FileSpec {
    let mut services = Vec::with_capacity(file.services.len());

    for service in &file.services {
        let mut routes = Vec::new();
        for method in &service.methods {
            let Some(binding) = extract(method) else {
                continue;
            };
            if method.server_streaming {
                debug!("Not routing server-streaming method {}.{}", service.name, method.name);
                continue;
            }
            if method.input.is_scalar_wrapper() || method.output.is_scalar_wrapper() {
                warn!(
                    "Not routing method {}.{}: scalar wrapper types have no message type in prost",
                    service.name, method.name
                );
                continue;
            }
            routes.push(RouteSpec {
                method:           method.name.clone(),
                binding,
                input:            resolve_type(&method.input, file, options, imports),
                output:           resolve_type(&method.output, file, options, imports),
                client_streaming: method.client_streaming,
            });
        }
        services.push(ServiceSpec {
            name: service.name.clone(),
            routes,
        });
    }

    let adapters = file
        .messages
        .iter()
        .map(|m| AdapterSpec {
            full_name: m.full_name.clone(),
            path:      m.path.clone(),
        })
        .collect();

    FileSpec {
        source:      file.name.clone(),
        package:     file.package.clone(),
        stem:        sanitize_identifier(file.stem()),
        path_prefix: options.path_prefix.clone(),
        imports:     imports.imports(),
        services,
        adapters,
    }
}

/// Whether `file` produces an artifact. Files of ignored packages and files
/// declaring no messages are skipped.
pub fn is_generated(file: &File, options: &Options) -> bool {
    if options.is_ignored(&file.package) {
        debug!("Ignoring file {} because it belongs to the ignored package {}", file.name, file.package);
        return false;
    }
    if file.messages.is_empty() {
        debug!("Skipping file {} because it declares no messages", file.name);
        return false;
    }
    true
}

/// Generates the artifact of one file, or `None` when the file is skipped.
pub fn generate_file<R: Renderer>(file: &File, options: &Options, renderer: &R) -> Option<Artifact> {
    if !is_generated(file, options) {
        return None;
    }

    let mut imports = ImportResolver::new();
    let spec = build_file_spec(file, options, &mut imports);

    Some(Artifact {
        name:    file.output_path(renderer.extension()),
        content: renderer.render(&spec),
    })
}

/// Generates artifacts for every target file, one file at a time in the
/// order the model lists them.
pub fn generate<R: Renderer>(model: &Model, options: &Options, renderer: &R) -> Vec<Artifact> {
    let artifacts: Vec<Artifact> = model
        .targets()
        .filter_map(|file| generate_file(file, options, renderer))
        .collect();
    info!("Generated {} file(s)", artifacts.len());
    artifacts
}

/// Runs the plugin on an encoded `CodeGeneratorRequest`.
pub fn compile_request(buf: &[u8]) -> Result<CodeGeneratorResponse, GenError> {
    let (model, parameter) = Model::decode_request(buf)?;
    let options = Options::parse(parameter.as_deref())?;

    let file = generate(&model, &options, &RustRenderer)
        .into_iter()
        .map(|artifact| code_generator_response::File {
            name:                Some(artifact.name),
            insertion_point:     None,
            content:             Some(artifact.content),
            generated_code_info: None,
        })
        .collect();

    Ok(CodeGeneratorResponse {
        file,
        ..Default::default()
    })
}

/// Like [`compile_request`], but reports failures inside the response the
/// way protoc expects, and encodes it.
pub fn respond(buf: &[u8]) -> Result<Vec<u8>, GenError> {
    let response = compile_request(buf).unwrap_or_else(|e| CodeGeneratorResponse {
        error: Some(e.to_string()),
        ..Default::default()
    });

    let mut out = Vec::with_capacity(response.encoded_len());
    response.encode(&mut out)?;
    Ok(out)
}

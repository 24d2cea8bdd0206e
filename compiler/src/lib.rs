//! protoweb-compiler
//!
//! This crate implements:
//!  1) Extraction of one `google.api.http` binding per method (`binding`),
//!  2) The per-file import alias table (`imports`),
//!  3) Rendering of axum routing glue and JSON adapters (`gen_rust`),
//!  4) The protoc plugin driver (`compile_request`, `respond`),
//!  5) Plugin parameters (`Options`) and error types (`GenError`).

pub mod error;
pub mod types;
pub mod utils;
pub mod binding;
pub mod imports;
pub mod options;
pub mod compiler;
pub mod gen_rust;
pub mod traits;

pub use compiler::{build_file_spec, compile_request, generate, generate_file, is_generated, respond, GENERATOR_NAME};
pub use error::GenError;
pub use gen_rust::{compile_file_to_rust, RustRenderer};
pub use imports::ImportResolver;
pub use options::Options;
pub use traits::Renderer;

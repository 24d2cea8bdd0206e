use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use protoweb_compiler::error::GenError;
use protoweb_compiler::options::DEFAULT_MODULE_ROOT;
use protoweb_compiler::{build_file_spec, generate, is_generated, respond, ImportResolver, Options, RustRenderer};
use protoweb_schema::Model;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Log filter variable. stdout carries the plugin protocol, so logs go to stderr.
const LOG_ENV: &str = "PROTOC_GEN_WEB_LOG";

#[derive(Parser)]
#[command(name = "protoc-gen-web")]
#[command(
    about = "Generate axum JSON endpoints from google.api.http annotated services",
    long_about = "Without a subcommand, runs as a protoc plugin: a CodeGeneratorRequest is read \
                  from stdin and the CodeGeneratorResponse is written to stdout."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Input {
    /// Encoded FileDescriptorSet (`protoc --include_imports --descriptor_set_out=...`)
    #[arg(short, long)]
    descriptor_set: PathBuf,

    /// Proto file to generate for; repeatable. Defaults to every file in the set
    #[arg(short, long = "file")]
    files: Vec<String>,

    /// `;`-separated proto packages to skip
    #[arg(long)]
    ignore_packages: Option<String>,

    /// Rust path under which package modules live
    #[arg(long, default_value = DEFAULT_MODULE_ROOT)]
    module_root: String,

    /// Prepended to every route pattern
    #[arg(long, default_value = "")]
    path_prefix: String,
}

impl Input {
    fn load(&self) -> Result<(Model, Options), GenError> {
        let buf = fs::read(&self.descriptor_set)?;
        let model = Model::decode_descriptor_set(&buf, self.files.clone())?;

        let mut options = Options {
            module_root: self.module_root.clone(),
            path_prefix: self.path_prefix.clone(),
            ..Options::default()
        };
        if let Some(list) = &self.ignore_packages {
            options.ignore(list);
        }
        Ok((model, options))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write `.web.rs` files for the files of a descriptor set
    Generate {
        #[command(flatten)]
        input: Input,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Print the routes, imports and adapters computed for each file as JSON
    Inspect {
        #[command(flatten)]
        input: Input,
    },
}

fn main() -> Result<(), GenError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        None => {
            let mut request = Vec::new();
            io::stdin().read_to_end(&mut request)?;
            let response = respond(&request)?;
            io::stdout().write_all(&response)?;
            Ok(())
        }

        Some(Commands::Generate { input, out_dir }) => {
            let (model, options) = input.load()?;
            for artifact in generate(&model, &options, &RustRenderer) {
                let path = out_dir.join(&artifact.name);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, &artifact.content)?;
                info!("Wrote {}", path.display());
            }
            Ok(())
        }

        Some(Commands::Inspect { input }) => {
            let (model, options) = input.load()?;
            for file in model.targets().filter(|file| is_generated(file, &options)) {
                let mut imports = ImportResolver::new();
                let spec = build_file_spec(file, &options, &mut imports);
                println!("{}", serde_json::to_string_pretty(&spec)?);
            }
            Ok(())
        }
    }
}

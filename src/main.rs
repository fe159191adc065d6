//! # Tapecraft CLI
//!
//! Command-line interface for the label template builder.
//!
//! ## Usage
//!
//! ```bash
//! # Run the builder API against a print service
//! tapecraft serve --listen 0.0.0.0:8080 --service-url http://printer-host:8000
//!
//! # List starter layouts and saved templates
//! tapecraft starters
//! tapecraft list
//!
//! # Offline PNG preview of a starter
//! tapecraft render --starter warning --png warning.png
//!
//! # Save an exported document into the library, export it again
//! tapecraft import rack-a.json
//! tapecraft export 0 --out rack-a.json
//!
//! # Preview / print through the service
//! tapecraft preview --saved 0 --out preview.png
//! tapecraft print --document rack-a.json
//! tapecraft status
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use tapecraft::{
    TapecraftError, Template,
    config::{DEFAULT_LISTEN_ADDR, DEFAULT_POLL_SECS, ServerConfig, ServiceArgs},
    library::{self, JsonFileStore, TemplateLibrary, document},
    render::{self, raster},
    submit::{HttpLabelService, LabelService, Payload, Submitter},
    template::starter,
};

/// Tapecraft - Label template builder for tape printers
#[derive(Parser, Debug)]
#[command(name = "tapecraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the builder JSON API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
        listen: String,

        /// Printer status poll interval in seconds
        #[arg(long, default_value_t = DEFAULT_POLL_SECS)]
        poll_secs: u64,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// List built-in starter layouts
    Starters,

    /// List saved templates
    List {
        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Render a template locally (scene JSON, or PNG with --png)
    Render {
        #[command(flatten)]
        source: SourceArgs,

        /// Output to PNG file instead of printing the scene
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,

        /// Pixels per canvas unit for --png
        #[arg(long, default_value_t = raster::DEFAULT_SCALE)]
        scale: u32,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Save a template document into the library
    Import {
        /// Document file (as written by `export`)
        file: PathBuf,

        /// Name to save under (defaults to the document's name)
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Write a saved template as a portable document
    Export {
        /// Library index (see `list`)
        index: usize,

        /// Output file (defaults to <name>.json)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Delete a saved template
    Delete {
        /// Library index (see `list`)
        index: usize,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Ask the print service for a preview image
    Preview {
        #[command(flatten)]
        source: SourceArgs,

        /// Where to write the image
        #[arg(long, value_name = "FILE", default_value = "preview.png")]
        out: PathBuf,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Print a template through the print service
    Print {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Show the printer status reported by the service
    Status {
        #[command(flatten)]
        service: ServiceArgs,
    },
}

/// Which template a command works on.
#[derive(Args, Debug)]
struct SourceArgs {
    /// Built-in starter layout
    #[arg(long, group = "source")]
    starter: Option<String>,

    /// Template document file
    #[arg(long, value_name = "FILE", group = "source")]
    document: Option<PathBuf>,

    /// Saved template index
    #[arg(long, group = "source")]
    saved: Option<usize>,
}

fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Error: {}", e);
    }
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` controls verbosity; default `info`.
fn init_tracing() -> Result<(), String> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| format!("Failed to create env filter: {e}"))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(env_filter)
        .try_init()
        .map_err(|e| format!("Failed to initialize tracing: {e}"))
}

fn runtime() -> Result<tokio::runtime::Runtime, TapecraftError> {
    Ok(tokio::runtime::Runtime::new()?)
}

fn open_library(service: &ServiceArgs) -> Result<TemplateLibrary<JsonFileStore>, TapecraftError> {
    TemplateLibrary::open(JsonFileStore::new(&service.library))
}

fn load_source(source: &SourceArgs, service: &ServiceArgs) -> Result<Template, TapecraftError> {
    if let Some(name) = &source.starter {
        return Template::from_starter(name).ok_or_else(|| {
            TapecraftError::Validation(format!(
                "unknown starter '{}' (available: {})",
                name,
                starter::STARTER_NAMES.join(", ")
            ))
        });
    }
    if let Some(path) = &source.document {
        let text = std::fs::read_to_string(path)?;
        let doc = document::parse_str(&text)?;
        let mut template = Template::new();
        template.load_elements(&doc.elements);
        return Ok(template);
    }
    if let Some(index) = source.saved {
        let lib = open_library(service)?;
        let mut template = Template::new();
        if !lib.load(index, &mut template) {
            return Err(TapecraftError::Validation(format!(
                "no saved template at index {}",
                index
            )));
        }
        return Ok(template);
    }
    Err(TapecraftError::Validation(
        "choose a template with --starter, --document or --saved".into(),
    ))
}

fn submitter(service: &ServiceArgs) -> Result<Submitter, TapecraftError> {
    let client = HttpLabelService::new(&service.service_url, service.request_timeout())?;
    Ok(Submitter::new(Arc::new(client)))
}

fn run() -> Result<(), TapecraftError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            listen,
            poll_secs,
            service,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                service,
                poll_interval: Duration::from_secs(poll_secs),
            };
            runtime()?.block_on(tapecraft::server::serve(config))
        }

        Commands::Starters => {
            println!("Available starters:");
            for s in starter::all() {
                println!("  {:<8} {}", s.name, s.description);
            }
            Ok(())
        }

        Commands::List { service } => {
            let lib = open_library(&service)?;
            if lib.is_empty() {
                println!("No saved templates in {}", service.library.display());
                return Ok(());
            }
            for entry in lib.entries() {
                println!(
                    "  [{}] {} ({} elements, {})",
                    entry.index,
                    entry.name,
                    entry.element_count,
                    entry.created.format("%Y-%m-%d %H:%M")
                );
            }
            Ok(())
        }

        Commands::Render {
            source,
            png,
            scale,
            service,
        } => {
            let template = load_source(&source, &service)?;
            let scene = render::render(&template);
            match png {
                Some(path) => {
                    let bytes = raster::to_png_scaled(&scene, scale)?;
                    std::fs::write(&path, bytes)?;
                    println!("Saved preview to {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&scene)?),
            }
            Ok(())
        }

        Commands::Import {
            file,
            name,
            service,
        } => {
            let text = std::fs::read_to_string(&file)?;
            let doc = document::parse_str(&text)?;
            let name = name
                .or(doc.name)
                .unwrap_or_else(|| library::document::DEFAULT_EXPORT_NAME.to_string());
            let mut lib = open_library(&service)?;
            let index = lib.save(&name, &doc.elements)?;
            println!("Saved '{}' as #{}", name, index);
            Ok(())
        }

        Commands::Export {
            index,
            out,
            service,
        } => {
            let lib = open_library(&service)?;
            let saved = lib.get(index).ok_or_else(|| {
                TapecraftError::Validation(format!("no saved template at index {}", index))
            })?;
            let doc = library::export(Some(saved.name.as_str()), &saved.elements);
            let path = out.unwrap_or_else(|| PathBuf::from(library::export_file_name(&doc.name)));
            std::fs::write(&path, doc.to_json_pretty()?)?;
            println!("Exported '{}' to {}", doc.name, path.display());
            Ok(())
        }

        Commands::Delete { index, service } => {
            let mut lib = open_library(&service)?;
            match lib.remove(index)? {
                Some(removed) => println!("Deleted '{}'", removed.name),
                None => println!("No saved template at index {}", index),
            }
            Ok(())
        }

        Commands::Preview {
            source,
            out,
            service,
        } => {
            let payload = Payload::from_template(&load_source(&source, &service)?);
            let submitter = submitter(&service)?;
            let image = runtime()?.block_on(submitter.preview(&payload))?;
            std::fs::write(&out, &image.bytes)?;
            println!("Saved {} preview to {}", image.content_type, out.display());
            Ok(())
        }

        Commands::Print { source, service } => {
            let payload = Payload::from_template(&load_source(&source, &service)?);
            let submitter = submitter(&service)?;
            let confirmation = runtime()?.block_on(submitter.print(&payload))?;
            println!("{}", confirmation.message);
            if let Some(filename) = confirmation.filename {
                println!("Service file: {}", filename);
            }
            Ok(())
        }

        Commands::Status { service } => {
            let client = HttpLabelService::new(&service.service_url, service.request_timeout())?;
            let status = runtime()?.block_on(client.status())?;
            println!(
                "Printer ready: {}\nTape width: {} mm",
                status.printer_ready, status.tape_width_mm
            );
            if let Some(px) = status.print_height_px {
                println!("Print height: {} px", px);
            }
            Ok(())
        }
    }
}

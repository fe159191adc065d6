//! # Tapecraft - Label Template Builder
//!
//! Tapecraft is a Rust library for composing labels for thermal tape printers
//! (Brother PT series and similar) and sending them to a label print service.
//! It provides:
//!
//! - **Element model**: text, QR, barcode, icon, line, rectangle and table
//! - **Template store**: ordered elements, selection and label settings
//! - **Canvas renderer**: a pure scene tree plus an offline PNG preview
//! - **Template library**: named snapshots on disk, export/import documents
//! - **Submitter**: preview and print through the service's HTTP API
//!
//! ## Quick Start
//!
//! ```
//! use tapecraft::{
//!     element::ElementType,
//!     property,
//!     render::{self, bounds::Point},
//!     template::Template,
//! };
//!
//! let mut template = Template::new();
//! template.add_element(ElementType::Text);
//!
//! // Edit the selected element the way the property panel does
//! property::apply_edit(&mut template, "font-size", "18");
//! property::apply_edit(&mut template, "text", "Rack A");
//!
//! let scene = render::render(&template);
//! assert_eq!(scene.nodes.len(), 1);
//!
//! // Clicking inside the rendered box selects the element again
//! template.clear_selection();
//! let hit = template.hit_test(Point::new(55, 30));
//! assert!(hit.is_some());
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`element`] | Element kinds, ids and editor defaults |
//! | [`template`] | Live template, typed field edits, starter layouts |
//! | [`property`] | UI key/value edits and panel visibility |
//! | [`render`] | Scene tree, bounding boxes, PNG rasterizer |
//! | [`library`] | Saved templates, export/import documents |
//! | [`submit`] | Print service client, in-flight guards, status polling |
//! | [`builder`] | Action dispatch and notifications |
//! | [`server`] | JSON HTTP API |
//! | [`config`] | CLI/env configuration |
//! | [`error`] | Error types |

pub mod builder;
pub mod config;
pub mod element;
pub mod error;
pub mod library;
pub mod property;
pub mod render;
pub mod server;
pub mod submit;
pub mod template;

// Re-exports for convenience
pub use builder::{Action, Builder};
pub use element::{Element, ElementKind, ElementType};
pub use error::TapecraftError;
pub use template::Template;

//! # qrbatch
//!
//! A Rust library for generating QR codes and barcodes in bulk, exporting them to a
//! spreadsheet with one embedded image per row, and scanning codes back from images.
//!
//! ## Features
//!
//! - **Bulk Generation**: Serial (`PREFIX00001`, `PREFIX00002`, ...) or random suffixed codes, produced in fixed-size chunks
//! - **Progress & Cancellation**: Progress snapshots after every chunk, cooperative cancellation at chunk boundaries
//! - **Two Symbologies**: QR codes for matrix output, Code 128 for linear output
//! - **Spreadsheet Export**: `ID | Code | Image` sheets with embedded PNG rasters
//! - **Scanning**: Decode QR codes and Code 128 barcodes from PNG, JPEG or GIF images
//! - **One-off Codes**: Text, URL, e-mail, phone and Wi-Fi payloads with custom colors and width
//!
//! ## Quick Start
//!
//! ### Stepping a Run
//!
//! ```rust
//! use qrbatch::{Format, GenerationRequest, Method, RunStatus, Session};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let req = GenerationRequest::new(Format::Matrix, Method::Serial)
//!     .with_prefix("a")
//!     .with_start_number(1)
//!     .with_quantity(3);
//!
//! let mut session = Session::default();
//! session.start(req)?;
//! while !session.step().is_terminal() {}
//!
//! let codes: Vec<_> = session.artifacts().iter().map(|a| a.code_text()).collect();
//! assert_eq!(codes, ["A00001", "A00002", "A00003"]);
//! assert_eq!(session.status(), RunStatus::Completed);
//!
//! let doc = session.export()?;
//! assert_eq!(doc.file_name, "generated_codes_with_images.xlsx");
//! # Ok(())
//! # }
//! ```
//!
//! ### Driving a Run Asynchronously
//!
//! [`Session::drive`] processes one chunk at a time and yields to the tokio scheduler in
//! between, so the token returned by [`Session::start`] can be cancelled from other tasks.
//!
//! ```rust,no_run
//! use qrbatch::{Config, Format, GenerationRequest, Method, Session};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::with_config(Config { chunk_size: 50, ..Default::default() });
//! let token = session.start(GenerationRequest::new(Format::Linear, Method::Random).with_quantity(500))?;
//!
//! let status = session.drive(|p| println!("{:.0}%", p.ratio() * 100.0)).await;
//! println!("{status:?}, cancelled: {}", token.is_cancelled());
//! # Ok(())
//! # }
//! ```
//!
//! ### Scanning
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("code.png")?;
//! let scan = qrbatch::scan::scan_bytes(&bytes)?;
//! println!("Decoded: {}", scan.text);
//! # Ok(())
//! # }
//! ```
//!
//! ## Notes
//!
//! - Random mode does not guarantee uniqueness: two positions of a run may receive the same code.
//! - Serial counters are padded to 5 digits and grow past that width instead of being truncated.
//! - `chunk_size` must fit in 32 bits and `random_len` must be at least 1.

pub mod batch;
pub(crate) mod common;
pub mod compose;
pub mod encoder;
pub mod export;
pub mod identity;
pub mod request;
pub mod scan;

pub use batch::{drive, BatchRun, CodeArtifact, Progress, RunState, RunStatus, Session};
pub use common::*;
pub use compose::{compose, ComposedCode, InputKind, RenderStyle};
pub use encoder::{CodeEncoder, Encoder, ImagePayload, RenderOptions};
pub use export::{export_to_table, DirectoryTarget, ExportDocument, ExportLayout, ExportTable, SaveTarget};
pub use identity::{produce_code, CodeIdentity};
pub use request::GenerationRequest;

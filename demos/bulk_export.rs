use std::error::Error;

use qrbatch::{Config, DirectoryTarget, Format, GenerationRequest, Method, Session};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // RUST_LOG=qrbatch=debug shows per-chunk events
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let req = GenerationRequest::new(Format::Matrix, Method::Serial)
        .with_prefix("inv-")
        .with_start_number(1)
        .with_quantity(250);

    let mut session = Session::with_config(Config { chunk_size: 50, ..Default::default() });
    session.start(req)?;

    let status = session
        .drive(|p| println!("{}/{} ({:.0}%)", p.completed, p.total, p.ratio() * 100.0))
        .await;
    println!("Run finished: {status:?}");

    let doc = session.export()?;
    doc.save_to(&mut DirectoryTarget::new("."))?;
    println!("Saved {} codes to {}", session.artifacts().len(), doc.file_name);

    Ok(())
}

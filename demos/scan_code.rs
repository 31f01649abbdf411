use std::error::Error;

use qrbatch::scan::scan_bytes;

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "qrcode.png".to_string());
    let bytes = std::fs::read(&path)?;

    match scan_bytes(&bytes) {
        Ok(scan) => {
            println!("Decoded {} from: {}", scan.format, path);
            println!("Decoded message: {}", scan.text);
        }
        Err(e) => println!("No code decoded from {path}: {e}"),
    }

    Ok(())
}

use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("silo version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}

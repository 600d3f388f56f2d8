pub fn run() -> anyhow::Result<()> {
    println!("roadwatch {}", env!("CARGO_PKG_VERSION"));
    println!("Road hazard triage with duplicate-report suppression");
    Ok(())
}

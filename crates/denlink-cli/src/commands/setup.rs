//! Setup command - first-time certificate store bootstrap.

use console::style;

use denlink_opc::diagnostic::diagnose;
use denlink_opc::pki::ensure_pki_dirs;

use super::load_config;

pub async fn run(config_path: Option<&str>) -> anyhow::Result<u8> {
    let config = load_config(config_path)?;

    println!("{}", style("OPC UA first-time setup").bold());

    ensure_pki_dirs(&config.opc.pki_dir)?;
    println!(
        "{} certificate store ready under {}",
        style("✓").green(),
        config.opc.pki_dir.display()
    );

    println!("\ntesting connection...");
    let settings = config.opc.clone();
    let report = tokio::task::spawn_blocking(move || diagnose(&settings)).await?;

    if report.passed() {
        println!("{} setup completed, server reachable", style("✓").green());
    } else {
        // A missing server is expected during commissioning.
        println!(
            "{} setup completed, but the connection test failed",
            style("!").yellow()
        );
        println!("  this is normal if the OPC UA server is not running yet");
        for message in &report.messages {
            println!("  - {message}");
        }
    }

    Ok(0)
}

//! Diagnose command - staged OPC UA connection checks.

use console::style;

use denlink_opc::diagnostic::diagnose;

use super::load_config;

pub async fn run(config_path: Option<&str>) -> anyhow::Result<u8> {
    let config = load_config(config_path)?;

    println!("{}", style("OPC UA connection diagnostic").bold());
    println!("  endpoint:          {}", config.opc.endpoint_url);
    println!("  application name:  {}", config.opc.application_name);
    println!("  session timeout:   {}ms", config.opc.session_timeout_ms);
    println!("  operation timeout: {}ms", config.opc.operation_timeout_ms);
    println!("  use security:      {}", config.opc.use_security);
    println!(
        "  auto-accept certs: {}",
        config.opc.auto_accept_untrusted_certs
    );
    println!();

    let settings = config.opc.clone();
    let report = tokio::task::spawn_blocking(move || diagnose(&settings)).await?;

    for message in &report.messages {
        println!("  - {message}");
    }
    println!();

    let check = |ok: bool| if ok { style("PASS").green() } else { style("FAIL").red() };
    println!("  endpoint URL:     {}", check(report.url_ok));
    println!("  TCP reachability: {}", check(report.tcp_ok));
    println!("  session creation: {}", check(report.session_ok));

    if report.passed() {
        println!("\n{} all checks passed", style("✓").green());
        Ok(0)
    } else {
        print_common_solutions();
        Ok(2)
    }
}

fn print_common_solutions() {
    println!("\n{}", style("Common solutions").bold());
    println!("  1. Verify the OPC UA server is running");
    println!("  2. Check the endpoint URL in the config file");
    println!("  3. Verify firewall settings");
    println!("  4. Check the server's security settings");
    println!("  5. Run first-time setup: denlink setup");
}

//! Check SPI capabilities.

use jolt_common::config::AppConfig;

use super::resolve_model;

#[cfg(target_os = "linux")]
pub fn run(config: AppConfig, model: Option<String>) -> anyhow::Result<()> {
    use jolt_platform_linux::permissions;

    let model = resolve_model(model.as_deref(), config.sampling.model)?;

    println!("Jolt System Check");
    println!("{}", "=".repeat(50));
    println!("[OK] Model: {model}");
    println!(
        "     cs0={} cs1={} @ {} Hz",
        config.spi.cs0.display(),
        config.spi.cs1.display(),
        config.spi.speed_hz
    );

    let capabilities = permissions::check_capabilities(model, &config.spi);
    println!();
    permissions::print_capability_report(&capabilities);

    println!();
    if permissions::all_required_available(&capabilities) {
        println!("All required capabilities are available. Jolt is ready.");
    } else {
        println!("Some required capabilities are missing. See above for fixes.");
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn run(config: AppConfig, model: Option<String>) -> anyhow::Result<()> {
    let model = resolve_model(model.as_deref(), config.sampling.model)?;
    println!("Jolt System Check");
    println!("{}", "=".repeat(50));
    println!("[MISSING] No SPI backend for {model} on this platform");
    Ok(())
}

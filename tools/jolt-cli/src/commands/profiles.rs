//! List built-in calibration profiles.

use jolt_common::config::AppConfig;
use jolt_model::{AccelModel, CalibrationProfile};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Jolt Calibration Profiles");
    println!("{}", "=".repeat(50));

    for model in AccelModel::ALL {
        let builtin = CalibrationProfile::for_model(model);
        let (min, max) = model.code_format().range();
        println!("{model}");
        println!("  Codes:   {:?} [{min}, {max}]", model.code_format());
        println!("  Gain:    {:.9} g/code", builtin.gain);
        println!(
            "  Offsets: x={} y={} z={}",
            builtin.offsets[0], builtin.offsets[1], builtin.offsets[2]
        );
        if let Some(offsets) = config.calibration.offsets.get(&model) {
            println!(
                "  Config:  x={} y={} z={} (overrides built-in)",
                offsets[0], offsets[1], offsets[2]
            );
        }
    }

    Ok(())
}

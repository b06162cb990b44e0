//! Capability detection and guidance for Linux.
//!
//! Jolt needs read/write access to the spidev nodes of the selected
//! accelerometer front-end.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use jolt_common::config::SpiConfig;
use jolt_model::AccelModel;

/// A system capability that Jolt may need.
#[derive(Debug, Clone)]
pub struct Capability {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub required: bool,
    pub fix_instructions: Option<String>,
}

/// Check all capabilities needed by `model` and report status.
pub fn check_capabilities(model: AccelModel, spi: &SpiConfig) -> Vec<Capability> {
    let needs_cs1 = matches!(model, AccelModel::ModelA | AccelModel::ModelB);
    vec![
        check_spi_driver(),
        check_spi_node(&spi.cs0, "chip-select 0", true),
        check_spi_node(&spi.cs1, "chip-select 1 (Z axis converter)", needs_cs1),
        check_spi_group(),
    ]
}

/// Check that the kernel exposes spidev at all.
fn check_spi_driver() -> Capability {
    let available = std::fs::read_dir("/dev")
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .any(|e| e.file_name().to_string_lossy().starts_with("spidev"))
        })
        .unwrap_or(false);

    Capability {
        name: "spidev driver".to_string(),
        description: "Kernel userspace SPI interface".to_string(),
        available,
        required: true,
        fix_instructions: if !available {
            Some("Enable SPI: add 'dtparam=spi=on' to /boot/config.txt and reboot".to_string())
        } else {
            None
        },
    }
}

/// Check a specific spidev node for read/write access.
fn check_spi_node(path: &Path, role: &str, required: bool) -> Capability {
    let exists = path.exists();
    let available = exists && can_read_write(path);

    Capability {
        name: format!("SPI {}", path.display()),
        description: format!("Accelerometer {role}"),
        available,
        required,
        fix_instructions: match (exists, available) {
            (false, _) => Some(format!(
                "{} is missing; check the device-tree overlay for this chip-select",
                path.display()
            )),
            (true, false) => Some(
                "Add user to spi group: sudo usermod -aG spi $USER (logout required)".to_string(),
            ),
            _ => None,
        },
    }
}

/// Check if the user is in the 'spi' group.
fn check_spi_group() -> Capability {
    let in_spi_group = std::process::Command::new("groups")
        .output()
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .split_whitespace()
                .any(|g| g == "spi")
        })
        .unwrap_or(false);

    Capability {
        name: "spi group".to_string(),
        description: "Group membership granting spidev access without root".to_string(),
        available: in_spi_group,
        required: false, // running as root also works
        fix_instructions: if !in_spi_group {
            Some("sudo usermod -aG spi $USER (logout required)".to_string())
        } else {
            None
        },
    }
}

fn can_read_write(path: &Path) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is a valid NUL-terminated string for the call.
    unsafe { libc::access(c_path.as_ptr(), libc::R_OK | libc::W_OK) == 0 }
}

/// Whether every required capability is available.
pub fn all_required_available(capabilities: &[Capability]) -> bool {
    capabilities
        .iter()
        .filter(|c| c.required)
        .all(|c| c.available)
}

/// Print a user-friendly capability report.
pub fn print_capability_report(capabilities: &[Capability]) {
    println!("Jolt System Capabilities:");
    println!("{}", "-".repeat(60));

    for cap in capabilities {
        let status = if cap.available {
            "[OK]"
        } else if cap.required {
            "[MISSING - REQUIRED]"
        } else {
            "[MISSING - OPTIONAL]"
        };

        println!("  {} {}: {}", status, cap.name, cap.description);

        if let Some(ref fix) = cap.fix_instructions {
            println!("    Fix: {fix}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn digital_model_does_not_require_second_chip_select() {
        let spi = SpiConfig {
            cs0: PathBuf::from("/nonexistent/spidev0.0"),
            cs1: PathBuf::from("/nonexistent/spidev0.1"),
            speed_hz: 1_200_000,
        };
        let caps = check_capabilities(AccelModel::ModelC, &spi);
        let cs1 = caps.iter().find(|c| c.name.contains("spidev0.1")).unwrap();
        assert!(!cs1.required);
        assert!(!cs1.available);
        assert!(cs1.fix_instructions.is_some());

        let caps = check_capabilities(AccelModel::ModelB, &spi);
        let cs1 = caps.iter().find(|c| c.name.contains("spidev0.1")).unwrap();
        assert!(cs1.required);
        assert!(!all_required_available(&caps));
    }
}

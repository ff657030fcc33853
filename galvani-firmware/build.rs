//! Build script for galvani-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates channels.toml at compile time
//! - Generates the power-on channel defaults from channels.toml

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Channels a single board can drive
const MAX_CHANNELS: usize = 4;
/// Highest amplitude level
const MAX_VOLTAGE: i64 = 50;
/// Highest ramp step count
const MAX_RAMP_STEPS: i64 = 10;

/// Validated defaults for one channel
struct ChannelDefaults {
    positive: u8,
    negative: u8,
    times: [u16; 5],
    delta: [u16; 3],
    pulse_limit: u16,
}

fn main() {
    setup_linker();
    let channels = validate_config();
    generate_defaults(&channels);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate channels.toml at compile time
fn validate_config() -> Vec<ChannelDefaults> {
    println!("cargo:rerun-if-changed=channels.toml");

    let config_path = Path::new("channels.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: channels.toml not found!                                 ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires per-channel power-on defaults.            ║\n\
            ║  Please create channels.toml in the galvani-firmware directory.  ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read channels.toml                             ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in channels.toml                     ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    let channels = validate_channels(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid channel configuration                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!(
        "cargo:warning=channels.toml validated successfully ({} channels)",
        channels.len()
    );
    channels
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validate every [[channel]] entry
fn validate_channels(config: &toml::Value, errors: &mut Vec<String>) -> Vec<ChannelDefaults> {
    let entries = match config.get("channel") {
        Some(toml::Value::Array(entries)) => entries,
        Some(_) => {
            errors.push("'channel' must be an array of tables ([[channel]])".to_string());
            return Vec::new();
        }
        None => {
            errors.push("Missing [[channel]] section - at least one is required".to_string());
            return Vec::new();
        }
    };

    if entries.is_empty() || entries.len() > MAX_CHANNELS {
        errors.push(format!(
            "{} channels configured, expected 1-{}",
            entries.len(),
            MAX_CHANNELS
        ));
    }

    let mut channels = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        let Some(table) = entry.as_table() else {
            errors.push(format!("channel {} must be a table", i));
            continue;
        };
        let before = errors.len();

        let voltage = table.get("voltage");
        let positive = int_field(voltage.and_then(|v| v.get("positive")), i, "voltage.positive", MAX_VOLTAGE, errors);
        let negative = int_field(voltage.and_then(|v| v.get("negative")), i, "voltage.negative", MAX_VOLTAGE, errors);

        let mut times = [0u16; 5];
        match table.get("times") {
            Some(toml::Value::Array(values)) if values.len() == 5 => {
                for (slot, value) in times.iter_mut().zip(values) {
                    *slot = int_field(Some(value), i, "times", u16::MAX.into(), errors) as u16;
                }
            }
            Some(_) => errors.push(format!("channel {} times must be 5 integers", i)),
            None => errors.push(format!("channel {} missing 'times'", i)),
        }

        let delta = table.get("delta");
        let step = int_field(delta.and_then(|d| d.get("step")), i, "delta.step", u16::MAX.into(), errors);
        let pulses_per_step = int_field(
            delta.and_then(|d| d.get("pulses_per_step")),
            i,
            "delta.pulses_per_step",
            u16::MAX.into(),
            errors,
        );
        let max_steps = int_field(delta.and_then(|d| d.get("max_steps")), i, "delta.max_steps", MAX_RAMP_STEPS, errors);

        let pulse_limit = match table.get("pulse_limit") {
            None => 0,
            value => int_field(value, i, "pulse_limit", u16::MAX.into(), errors),
        };

        if errors.len() == before {
            channels.push(ChannelDefaults {
                positive: positive as u8,
                negative: negative as u8,
                times,
                delta: [step as u16, pulses_per_step as u16, max_steps as u16],
                pulse_limit: pulse_limit as u16,
            });
        }
    }
    channels
}

/// Read an integer in 0..=max, recording an error otherwise
fn int_field(
    value: Option<&toml::Value>,
    channel: usize,
    name: &str,
    max: i64,
    errors: &mut Vec<String>,
) -> i64 {
    match value {
        Some(toml::Value::Integer(n)) if (0..=max).contains(n) => *n,
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("channel {} {} must be 0-{}", channel, name, max));
            0
        }
        Some(_) => {
            errors.push(format!("channel {} {} must be an integer", channel, name));
            0
        }
        None => {
            errors.push(format!("channel {} missing '{}'", channel, name));
            0
        }
    }
}

/// Write `$OUT_DIR/channel_defaults.rs`
fn generate_defaults(channels: &[ChannelDefaults]) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let mut code = String::new();
    code.push_str("// Generated by build.rs from channels.toml\n");
    code.push_str(&format!(
        "pub const CHANNEL_DEFAULTS: [ChannelSetting; {}] = [\n",
        channels.len()
    ));
    for ch in channels {
        code.push_str(&format!(
            "    ChannelSetting {{\n        \
                run_state: RunState::Stopped,\n        \
                voltage: Voltage {{ positive: {}, negative: {} }},\n        \
                times: PhaseTimes::from_array({:?}),\n        \
                delta: RampDelta::from_array({:?}),\n        \
                pulse_limit: {},\n    \
            }},\n",
            ch.positive, ch.negative, ch.times, ch.delta, ch.pulse_limit
        ));
    }
    code.push_str("];\n");

    fs::write(out_dir.join("channel_defaults.rs"), code).unwrap();
}

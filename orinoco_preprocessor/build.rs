// build.rs - TOML-driven compile-time constant generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    properties: PropertyLimits,
    expansion: ExpansionLimits,
    queue: QueueLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct PropertyLimits {
    max_line_length: usize,
    max_entries: usize,
}

#[derive(serde::Deserialize)]
struct ExpansionLimits {
    max_expansion_depth: usize,
    max_output_length: usize,
}

#[derive(serde::Deserialize)]
struct QueueLimits {
    initial_capacity: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=ORINOCO_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=ORINOCO_CONFIG_DIR");

    let profile = env::var("ORINOCO_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("ORINOCO_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of the crate directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_LINE_LENGTH: usize = 1_048_576;
    const ABSOLUTE_MAX_EXPANSION_DEPTH: usize = 4096;
    const ABSOLUTE_MAX_OUTPUT_LENGTH: usize = 1_073_741_824;

    if config.properties.max_line_length == 0
        || config.properties.max_line_length > ABSOLUTE_MAX_LINE_LENGTH
    {
        panic!("LIMITS: properties.max_line_length out of range");
    }

    if config.properties.max_entries == 0 {
        panic!("LIMITS: properties.max_entries must be positive");
    }

    // The preprocessor policy keys must always fit
    if config.properties.max_entries < 3 {
        panic!("LIMITS: properties.max_entries must hold the preprocessor defaults");
    }

    if config.expansion.max_expansion_depth == 0
        || config.expansion.max_expansion_depth > ABSOLUTE_MAX_EXPANSION_DEPTH
    {
        panic!("LIMITS: expansion.max_expansion_depth out of range");
    }

    if config.expansion.max_output_length > ABSOLUTE_MAX_OUTPUT_LENGTH {
        panic!("LIMITS: expansion.max_output_length exceeds absolute maximum");
    }

    if config.logging.log_buffer_size < 100 {
        panic!("LIMITS: logging.log_buffer_size too small (min: 100)");
    }

    if profile == "production" && config.expansion.max_expansion_depth > 512 {
        panic!("PRODUCTION: max_expansion_depth too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod properties {{
        pub const MAX_LINE_LENGTH: usize = {};
        pub const MAX_ENTRIES: usize = {};
    }}

    pub mod expansion {{
        pub const MAX_EXPANSION_DEPTH: usize = {};
        pub const MAX_OUTPUT_LENGTH: usize = {};
    }}

    pub mod queue {{
        pub const INITIAL_CAPACITY: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
    }}
}}
"#,
        profile,
        config.properties.max_line_length,
        config.properties.max_entries,
        config.expansion.max_expansion_depth,
        config.expansion.max_output_length,
        config.queue.initial_capacity,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
    );

    fs::write(output_path, constants_code).unwrap();
}

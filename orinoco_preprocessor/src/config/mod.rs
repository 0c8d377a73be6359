//! Configuration module for the Orinoco preprocessor
//!
//! Compile-time limits are generated from the TOML profile by `build.rs`;
//! runtime preferences come from `ORINOCO_*` environment variables.

// Include generated constants from build.rs
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::RuntimeConfig;

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("ORINOCO_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("ORINOCO_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time::*;
    use super::*;

    #[test]
    fn test_generated_limits_are_sane() {
        assert!(properties::MAX_LINE_LENGTH > 0);
        assert!(properties::MAX_ENTRIES >= 3);
        assert!(expansion::MAX_EXPANSION_DEPTH > 0);
        assert!(logging::LOG_BUFFER_SIZE >= 100);
    }

    #[test]
    fn test_source_info() {
        assert!(build_info::source_info().ends_with(".toml"));
    }
}

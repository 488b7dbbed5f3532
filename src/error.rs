use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpirographError {
    #[error("outer radius {0} is too small, it must be at least {min}", min = crate::geometry::MIN_INNER_RADIUS)]
    OuterRadius(u32),

    #[error("inner radius {inner} must lie between {min} and the outer radius {outer}", min = crate::geometry::MIN_INNER_RADIUS)]
    InnerRadiusRange { inner: u32, outer: u32 },

    #[error("inner radius {0} is not a multiple of {step}", step = crate::geometry::RADIUS_STEP)]
    InnerRadiusStep(u32),

    #[error("invalid color '{0}', expected a hex string like \"#6EC768\"")]
    Color(String),

    #[error("could not read config file {path}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

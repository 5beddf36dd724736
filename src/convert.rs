//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::config::*;

use nimbus_engine::{AnalysisMode, EngineConfig, SpectralVariable};
use nimbus_field::{FillPolicy, ZrRelation};
use nimbus_io::{ArchiveConfig, Compression, WriterConfig};
use nimbus_motion::{Bandwidth, CornerParams, MotionConfig};
use nimbus_spectral::{AnisotropySource, Fitting, SpectralConfig, Window};

/// Parses a slope fitting method name.
pub fn parse_fitting(s: &str) -> Result<Fitting> {
    match s.to_lowercase().as_str() {
        "ols" => Ok(Fitting::Ols),
        "wols" => Ok(Fitting::Wols),
        other => bail!("unknown fitting method: {other:?}"),
    }
}

/// Parses a spectral taper window name.
pub fn parse_window(s: &str) -> Result<Window> {
    match s.to_lowercase().as_str() {
        "none" => Ok(Window::None),
        "hann" => Ok(Window::Hann),
        "blackman" => Ok(Window::Blackman),
        other => bail!("unknown window: {other:?}"),
    }
}

/// Parses a fill policy name; `value` needs an explicit `fill_value`.
pub fn parse_fill_policy(s: &str, value: Option<f64>) -> Result<FillPolicy> {
    match (s.to_lowercase().as_str(), value) {
        ("threshold-reflectivity", None) => Ok(FillPolicy::ThresholdReflectivity),
        ("zero", None) => Ok(FillPolicy::Zero),
        ("value", Some(v)) => Ok(FillPolicy::Value(v)),
        ("value", None) => bail!("fill policy \"value\" requires fill_value"),
        (other, Some(_)) if other == "threshold-reflectivity" || other == "zero" => {
            bail!("fill_value is only valid with fill = \"value\", got {other:?}")
        }
        (other, _) => bail!("unknown fill policy: {other:?}"),
    }
}

/// Parses the variable fed to the spectral analyzer.
pub fn parse_spectral_variable(s: &str) -> Result<SpectralVariable> {
    match s.to_lowercase().as_str() {
        "dbz" => Ok(SpectralVariable::Dbz),
        "rainrate" | "rain-rate" => Ok(SpectralVariable::RainRate),
        other => bail!("unknown spectral variable: {other:?}"),
    }
}

/// Parses the surface used for anisotropy estimation.
pub fn parse_anisotropy_source(s: &str) -> Result<AnisotropySource> {
    match s.to_lowercase().as_str() {
        "autocorrelation" => Ok(AnisotropySource::Autocorrelation),
        "log-power" | "logpower" => Ok(AnisotropySource::LogPower),
        other => bail!("unknown anisotropy source: {other:?}"),
    }
}

/// Parses the analysis mode.
pub fn parse_mode(s: &str) -> Result<AnalysisMode> {
    match s.to_lowercase().as_str() {
        "both" => Ok(AnalysisMode::Both),
        "spectral" => Ok(AnalysisMode::Spectral),
        "motion" => Ok(AnalysisMode::Motion),
        other => bail!("unknown analysis mode: {other:?}"),
    }
}

/// Converts a TOML bandwidth into a [`Bandwidth`].
pub fn parse_bandwidth(b: &BandwidthToml) -> Result<Bandwidth> {
    match b {
        BandwidthToml::Fixed(h) => Ok(Bandwidth::Fixed(*h)),
        BandwidthToml::Rule(rule) => match rule.to_lowercase().as_str() {
            "silverman" => Ok(Bandwidth::Silverman),
            other => bail!("unknown bandwidth rule: {other:?}"),
        },
    }
}

/// Parses a compression algorithm name string into the corresponding enum variant.
pub fn parse_compression(s: &str) -> Result<Compression> {
    match s.to_lowercase().as_str() {
        "none" => Ok(Compression::None),
        "snappy" => Ok(Compression::Snappy),
        "zstd" => Ok(Compression::Zstd),
        other => bail!("unknown compression: {other:?}"),
    }
}

/// Parses a timestamp such as `2023-05-09T14:05`, `2023-05-09 14:05`,
/// `202305091405` or a bare date (midnight).
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    const FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y%m%d%H%M",
    ];
    let s = s.trim();
    if let Some(t) = FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Ok(t);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .with_context(|| format!("invalid timestamp: {s:?}"))
}

/// Builds a [`SpectralConfig`] from the TOML spectral section.
pub fn build_spectral_config(s: &SpectralToml) -> Result<SpectralConfig> {
    Ok(SpectralConfig::default()
        .with_resolution_km(s.resolution_km)
        .with_window(parse_window(&s.window)?)
        .with_scale_breaks(s.scale_breaks.clone())
        .with_scale_bounds(s.outer_km, s.inner_km)
        .with_fitting(parse_fitting(&s.fitting)?)
        .with_anisotropy(parse_anisotropy_source(&s.anisotropy)?)
        .with_percentile(s.percentile)
        .with_smoothing_sigma(s.smoothing_sigma))
}

/// Builds a [`MotionConfig`] from the TOML motion section.
///
/// The intensity floor is left at its default; the engine replaces it with
/// the resolved fill value.
pub fn build_motion_config(m: &MotionToml) -> Result<MotionConfig> {
    let corners = CornerParams {
        max_corners: m.max_corners,
        quality: m.quality,
        min_distance: m.min_distance,
        block_size: m.block_size,
    };
    Ok(MotionConfig::default()
        .with_window_size(m.window_size)
        .with_opening_size(m.opening_size)
        .with_corners(corners)
        .with_tracking(m.template_half, m.search_radius)
        .with_max_speed(m.max_speed)
        .with_iqr_multiplier(m.iqr_multiplier)
        .with_lower_bound(m.lower_bound)
        .with_decluster(m.decluster_radius, m.decluster_min)
        .with_bandwidth(parse_bandwidth(&m.bandwidth)?))
}

/// Builds an [`EngineConfig`] from the full configuration.
pub fn build_engine_config(cfg: &NimbusConfig) -> Result<EngineConfig> {
    let zr = ZrRelation::new(cfg.field.zr_a, cfg.field.zr_b).context("invalid Z-R relation")?;
    let engine = EngineConfig::default()
        .with_stack_capacity(cfg.engine.stack_capacity)
        .with_threshold(cfg.field.threshold)
        .with_min_war(cfg.field.min_war)
        .with_zr(zr)
        .with_fill(parse_fill_policy(&cfg.field.fill, cfg.field.fill_value)?)
        .with_spectral_variable(parse_spectral_variable(&cfg.spectral.variable)?)
        .with_mode(parse_mode(&cfg.engine.mode)?)
        .with_max_lag(cfg.advection.max_lag)
        .with_flow_retention(cfg.engine.flow_retention)
        .with_downscale(cfg.advection.downscale)
        .with_spectral(build_spectral_config(&cfg.spectral)?)
        .with_motion(build_motion_config(&cfg.motion)?);
    engine.validate().context("invalid engine configuration")?;
    Ok(engine)
}

/// Builds an [`ArchiveConfig`] for the input grids in `dir`.
pub fn build_archive_config(io: &IoToml, dir: &std::path::Path) -> Result<ArchiveConfig> {
    if io.step_minutes <= 0 {
        bail!("step_minutes must be positive, got {}", io.step_minutes);
    }
    Ok(ArchiveConfig::new(dir)
        .with_prefix(io.prefix.as_str())
        .with_extension(io.extension.as_str())
        .with_step(Duration::minutes(io.step_minutes))
        .with_domain_size(io.domain_size))
}

/// Builds a [`WriterConfig`] from the TOML I/O configuration.
pub fn build_writer_config(io: &IoToml) -> Result<WriterConfig> {
    let cfg = WriterConfig::default()
        .with_compression(parse_compression(&io.compression)?)
        .with_row_group_size(io.row_group_size);
    cfg.validate().context("invalid writer configuration")?;
    Ok(cfg)
}

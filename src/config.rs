use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level nimbus configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NimbusConfig {
    /// Archive and output settings.
    #[serde(default)]
    pub io: IoToml,

    /// Rain threshold, Z-R relation and fill policy.
    #[serde(default)]
    pub field: FieldToml,

    /// Spectral analyzer settings.
    #[serde(default)]
    pub spectral: SpectralToml,

    /// Motion estimator settings.
    #[serde(default)]
    pub motion: MotionToml,

    /// Advection and correlation lag settings.
    #[serde(default)]
    pub advection: AdvectionToml,

    /// Run controller settings.
    #[serde(default)]
    pub engine: EngineToml,
}

/// Read and parse a TOML configuration file.
pub fn load(path: &Path) -> Result<NimbusConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config: {}", path.display()))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoToml {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_step_minutes")]
    pub step_minutes: i64,
    #[serde(default)]
    pub domain_size: Option<usize>,
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
    #[serde(default = "default_min_daily_records")]
    pub min_daily_records: usize,
    #[serde(default)]
    pub export_flows: bool,
}

impl Default for IoToml {
    fn default() -> Self {
        Self {
            input_dir: None,
            output_dir: None,
            prefix: String::new(),
            extension: default_extension(),
            step_minutes: default_step_minutes(),
            domain_size: None,
            start: None,
            end: None,
            compression: default_compression(),
            row_group_size: default_row_group_size(),
            min_daily_records: default_min_daily_records(),
            export_flows: false,
        }
    }
}

fn default_extension() -> String {
    "asc".to_string()
}
fn default_step_minutes() -> i64 {
    5
}
fn default_compression() -> String {
    "snappy".to_string()
}
fn default_row_group_size() -> usize {
    100_000
}
fn default_min_daily_records() -> usize {
    2
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldToml {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_min_war")]
    pub min_war: f64,
    #[serde(default = "default_zr_a")]
    pub zr_a: f64,
    #[serde(default = "default_zr_b")]
    pub zr_b: f64,
    #[serde(default = "default_fill")]
    pub fill: String,
    #[serde(default)]
    pub fill_value: Option<f64>,
}

impl Default for FieldToml {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            min_war: default_min_war(),
            zr_a: default_zr_a(),
            zr_b: default_zr_b(),
            fill: default_fill(),
            fill_value: None,
        }
    }
}

fn default_threshold() -> f64 {
    0.08
}
fn default_min_war() -> f64 {
    0.01
}
fn default_zr_a() -> f64 {
    316.0
}
fn default_zr_b() -> f64 {
    1.5
}
fn default_fill() -> String {
    "threshold-reflectivity".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpectralToml {
    #[serde(default = "default_variable")]
    pub variable: String,
    #[serde(default = "default_resolution_km")]
    pub resolution_km: f64,
    #[serde(default = "default_window")]
    pub window: String,
    #[serde(default = "default_scale_breaks")]
    pub scale_breaks: Vec<f64>,
    #[serde(default = "default_outer_km")]
    pub outer_km: f64,
    #[serde(default = "default_inner_km")]
    pub inner_km: f64,
    #[serde(default = "default_fitting")]
    pub fitting: String,
    #[serde(default = "default_anisotropy")]
    pub anisotropy: String,
    #[serde(default = "default_percentile")]
    pub percentile: f64,
    #[serde(default = "default_smoothing_sigma")]
    pub smoothing_sigma: f64,
}

impl Default for SpectralToml {
    fn default() -> Self {
        Self {
            variable: default_variable(),
            resolution_km: default_resolution_km(),
            window: default_window(),
            scale_breaks: default_scale_breaks(),
            outer_km: default_outer_km(),
            inner_km: default_inner_km(),
            fitting: default_fitting(),
            anisotropy: default_anisotropy(),
            percentile: default_percentile(),
            smoothing_sigma: default_smoothing_sigma(),
        }
    }
}

fn default_variable() -> String {
    "dbz".to_string()
}
fn default_resolution_km() -> f64 {
    1.0
}
fn default_window() -> String {
    "none".to_string()
}
fn default_scale_breaks() -> Vec<f64> {
    vec![12.0]
}
fn default_outer_km() -> f64 {
    512.0
}
fn default_inner_km() -> f64 {
    4.0
}
fn default_fitting() -> String {
    "ols".to_string()
}
fn default_anisotropy() -> String {
    "autocorrelation".to_string()
}
fn default_percentile() -> f64 {
    90.0
}
fn default_smoothing_sigma() -> f64 {
    3.0
}

/// Kernel bandwidth: a number of grid units, or the name of a rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BandwidthToml {
    Fixed(f64),
    Rule(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MotionToml {
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_opening_size")]
    pub opening_size: usize,
    #[serde(default = "default_max_corners")]
    pub max_corners: usize,
    #[serde(default = "default_quality")]
    pub quality: f64,
    #[serde(default = "default_min_distance")]
    pub min_distance: f64,
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    #[serde(default = "default_template_half")]
    pub template_half: usize,
    #[serde(default = "default_search_radius")]
    pub search_radius: usize,
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
    #[serde(default = "default_iqr_multiplier")]
    pub iqr_multiplier: f64,
    #[serde(default)]
    pub lower_bound: bool,
    #[serde(default = "default_decluster_radius")]
    pub decluster_radius: f64,
    #[serde(default = "default_decluster_min")]
    pub decluster_min: usize,
    #[serde(default = "default_bandwidth")]
    pub bandwidth: BandwidthToml,
}

impl Default for MotionToml {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            opening_size: default_opening_size(),
            max_corners: default_max_corners(),
            quality: default_quality(),
            min_distance: default_min_distance(),
            block_size: default_block_size(),
            template_half: default_template_half(),
            search_radius: default_search_radius(),
            max_speed: default_max_speed(),
            iqr_multiplier: default_iqr_multiplier(),
            lower_bound: false,
            decluster_radius: default_decluster_radius(),
            decluster_min: default_decluster_min(),
            bandwidth: default_bandwidth(),
        }
    }
}

fn default_window_size() -> usize {
    3
}
fn default_opening_size() -> usize {
    5
}
fn default_max_corners() -> usize {
    500
}
fn default_quality() -> f64 {
    0.05
}
fn default_min_distance() -> f64 {
    5.0
}
fn default_block_size() -> usize {
    15
}
fn default_template_half() -> usize {
    7
}
fn default_search_radius() -> usize {
    12
}
fn default_max_speed() -> f64 {
    100.0 / 12.0
}
fn default_iqr_multiplier() -> f64 {
    3.0
}
fn default_decluster_radius() -> f64 {
    20.0
}
fn default_decluster_min() -> usize {
    3
}
fn default_bandwidth() -> BandwidthToml {
    BandwidthToml::Fixed(100.0)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdvectionToml {
    #[serde(default = "default_downscale")]
    pub downscale: f64,
    #[serde(default = "default_max_lag")]
    pub max_lag: usize,
}

impl Default for AdvectionToml {
    fn default() -> Self {
        Self {
            downscale: default_downscale(),
            max_lag: default_max_lag(),
        }
    }
}

fn default_downscale() -> f64 {
    0.5
}
fn default_max_lag() -> usize {
    1
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineToml {
    #[serde(default = "default_stack_capacity")]
    pub stack_capacity: usize,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_flow_retention")]
    pub flow_retention: usize,
}

impl Default for EngineToml {
    fn default() -> Self {
        Self {
            stack_capacity: default_stack_capacity(),
            mode: default_mode(),
            flow_retention: default_flow_retention(),
        }
    }
}

fn default_stack_capacity() -> usize {
    12
}
fn default_mode() -> String {
    "both".to_string()
}
fn default_flow_retention() -> usize {
    288
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg: NimbusConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.field.threshold, 0.08);
        assert_eq!(cfg.spectral.scale_breaks, vec![12.0]);
        assert_eq!(cfg.motion.bandwidth, BandwidthToml::Fixed(100.0));
        assert_eq!(cfg.engine.stack_capacity, 12);
        assert_eq!(cfg.io.step_minutes, 5);
    }

    #[test]
    fn bandwidth_accepts_number_or_rule() {
        let cfg: NimbusConfig = toml::from_str("[motion]\nbandwidth = 40.0\n").unwrap();
        assert_eq!(cfg.motion.bandwidth, BandwidthToml::Fixed(40.0));
        let cfg: NimbusConfig = toml::from_str("[motion]\nbandwidth = \"silverman\"\n").unwrap();
        assert_eq!(cfg.motion.bandwidth, BandwidthToml::Rule("silverman".into()));
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(toml::from_str::<NimbusConfig>("[field]\nthreshhold = 0.1\n").is_err());
        assert!(toml::from_str::<NimbusConfig>("[plots]\n").is_err());
    }

    #[test]
    fn load_reports_path() {
        let err = load(Path::new("/no/such/nimbus.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/no/such/nimbus.toml"));
    }
}

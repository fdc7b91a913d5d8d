use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
    time::Duration,
};

use anyhow::{anyhow, bail, Context, Error};
use serde::{Deserialize, Serialize};

use crate::constants::{env, failure, latency, service};

/// Operations that carry their own latency profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Base,
    Product,
    Cart,
    Checkout,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Base => "base",
            Operation::Product => "product",
            Operation::Cart => "cart",
            Operation::Checkout => "checkout",
        }
    }
}

/// Failure classes the injector can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Database,
    Payment,
}

impl Fault {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fault::Database => "database",
            Fault::Payment => "payment",
        }
    }
}

// ----- Simulation settings -----

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSettings {
    pub base_latency_ms: u64,
    pub product_latency_ms: u64,
    pub cart_latency_ms: u64,
    pub checkout_latency_ms: u64,
    pub db_failure_rate: f64,
    pub payment_failure_rate: f64,
    pub chaos_mode: bool,
    pub chaos_latency_multiplier: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            base_latency_ms: latency::BASE_MS,
            product_latency_ms: latency::PRODUCT_MS,
            cart_latency_ms: latency::CART_MS,
            checkout_latency_ms: latency::CHECKOUT_MS,
            db_failure_rate: failure::DB_RATE,
            payment_failure_rate: failure::PAYMENT_RATE,
            chaos_mode: false,
            chaos_latency_multiplier: latency::CHAOS_MULTIPLIER,
        }
    }
}

impl SimulationSettings {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup, falling back to defaults
    /// for every key the lookup does not provide.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let settings = Self {
            base_latency_ms: parse_or(&lookup, env::BASE_LATENCY_MS, defaults.base_latency_ms)?,
            product_latency_ms: parse_or(&lookup, env::PRODUCT_LATENCY_MS, defaults.product_latency_ms)?,
            cart_latency_ms: parse_or(&lookup, env::CART_LATENCY_MS, defaults.cart_latency_ms)?,
            checkout_latency_ms: parse_or(&lookup, env::CHECKOUT_LATENCY_MS, defaults.checkout_latency_ms)?,
            db_failure_rate: parse_or(&lookup, env::DB_FAILURE_RATE, defaults.db_failure_rate)?,
            payment_failure_rate: parse_or(&lookup, env::PAYMENT_FAILURE_RATE, defaults.payment_failure_rate)?,
            chaos_mode: lookup(env::CHAOS_MODE)
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.chaos_mode),
            chaos_latency_multiplier: parse_or(
                &lookup,
                env::CHAOS_LATENCY_MULTIPLIER,
                defaults.chaos_latency_multiplier,
            )?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), Error> {
        for (name, rate) in [
            (env::DB_FAILURE_RATE, self.db_failure_rate),
            (env::PAYMENT_FAILURE_RATE, self.payment_failure_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                bail!("{} must be within [0, 1], got {}", name, rate);
            }
        }
        if !self.chaos_latency_multiplier.is_finite() || self.chaos_latency_multiplier < 0.0 {
            bail!(
                "{} must be a non-negative number, got {}",
                env::CHAOS_LATENCY_MULTIPLIER,
                self.chaos_latency_multiplier
            );
        }
        Ok(())
    }

    /// Returns these settings with every field present in `overlay` replaced.
    pub fn merged(&self, overlay: &SettingsOverlay) -> Self {
        Self {
            base_latency_ms: overlay.base_latency_ms.unwrap_or(self.base_latency_ms),
            product_latency_ms: overlay.product_latency_ms.unwrap_or(self.product_latency_ms),
            cart_latency_ms: overlay.cart_latency_ms.unwrap_or(self.cart_latency_ms),
            checkout_latency_ms: overlay.checkout_latency_ms.unwrap_or(self.checkout_latency_ms),
            db_failure_rate: overlay.db_failure_rate.unwrap_or(self.db_failure_rate),
            payment_failure_rate: overlay.payment_failure_rate.unwrap_or(self.payment_failure_rate),
            chaos_mode: overlay.chaos_mode.unwrap_or(self.chaos_mode),
            chaos_latency_multiplier: overlay
                .chaos_latency_multiplier
                .unwrap_or(self.chaos_latency_multiplier),
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid value {:?} for {}: {}", raw, key, e)),
        None => Ok(default),
    }
}

fn parse_flag(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

// ----- Chaos override file -----

/// Partial settings read from the watched chaos file. Keys may be written in
/// snake_case or with their environment variable spelling.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsOverlay {
    #[serde(default, alias = "BASE_LATENCY_MS")]
    pub base_latency_ms: Option<u64>,
    #[serde(default, alias = "PRODUCT_LATENCY_MS")]
    pub product_latency_ms: Option<u64>,
    #[serde(default, alias = "CART_LATENCY_MS")]
    pub cart_latency_ms: Option<u64>,
    #[serde(default, alias = "CHECKOUT_LATENCY_MS")]
    pub checkout_latency_ms: Option<u64>,
    #[serde(default, alias = "DB_FAILURE_RATE")]
    pub db_failure_rate: Option<f64>,
    #[serde(default, alias = "PAYMENT_FAILURE_RATE")]
    pub payment_failure_rate: Option<f64>,
    #[serde(default, alias = "CHAOS_MODE")]
    pub chaos_mode: Option<bool>,
    #[serde(default, alias = "CHAOS_LATENCY_MULTIPLIER")]
    pub chaos_latency_multiplier: Option<f64>,
}

impl SettingsOverlay {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let overlay: SettingsOverlay = serde_yaml::from_str(&content)?;
        Ok(overlay)
    }
}

// ----- Live runtime configuration -----

/// Process-wide simulation knobs. Every field is its own atomic so request
/// handlers never wait on a reload; a reload becomes visible field by field.
#[derive(Debug)]
pub struct RuntimeConfig {
    base_latency_ms: AtomicU64,
    product_latency_ms: AtomicU64,
    cart_latency_ms: AtomicU64,
    checkout_latency_ms: AtomicU64,
    db_failure_rate: AtomicU64,
    payment_failure_rate: AtomicU64,
    chaos_mode: AtomicBool,
    chaos_latency_multiplier: AtomicU64,
}

impl RuntimeConfig {
    pub fn new(settings: &SimulationSettings) -> Self {
        Self {
            base_latency_ms: AtomicU64::new(settings.base_latency_ms),
            product_latency_ms: AtomicU64::new(settings.product_latency_ms),
            cart_latency_ms: AtomicU64::new(settings.cart_latency_ms),
            checkout_latency_ms: AtomicU64::new(settings.checkout_latency_ms),
            db_failure_rate: AtomicU64::new(settings.db_failure_rate.to_bits()),
            payment_failure_rate: AtomicU64::new(settings.payment_failure_rate.to_bits()),
            chaos_mode: AtomicBool::new(settings.chaos_mode),
            chaos_latency_multiplier: AtomicU64::new(settings.chaos_latency_multiplier.to_bits()),
        }
    }

    pub fn apply(&self, settings: &SimulationSettings) {
        self.base_latency_ms.store(settings.base_latency_ms, Ordering::Relaxed);
        self.product_latency_ms.store(settings.product_latency_ms, Ordering::Relaxed);
        self.cart_latency_ms.store(settings.cart_latency_ms, Ordering::Relaxed);
        self.checkout_latency_ms.store(settings.checkout_latency_ms, Ordering::Relaxed);
        self.db_failure_rate.store(settings.db_failure_rate.to_bits(), Ordering::Relaxed);
        self.payment_failure_rate.store(settings.payment_failure_rate.to_bits(), Ordering::Relaxed);
        self.chaos_mode.store(settings.chaos_mode, Ordering::Relaxed);
        self.chaos_latency_multiplier
            .store(settings.chaos_latency_multiplier.to_bits(), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SimulationSettings {
        SimulationSettings {
            base_latency_ms: self.base_latency_ms.load(Ordering::Relaxed),
            product_latency_ms: self.product_latency_ms.load(Ordering::Relaxed),
            cart_latency_ms: self.cart_latency_ms.load(Ordering::Relaxed),
            checkout_latency_ms: self.checkout_latency_ms.load(Ordering::Relaxed),
            db_failure_rate: self.failure_rate(Fault::Database),
            payment_failure_rate: self.failure_rate(Fault::Payment),
            chaos_mode: self.chaos_mode(),
            chaos_latency_multiplier: self.chaos_multiplier(),
        }
    }

    pub fn base_latency(&self, op: Operation) -> Duration {
        let ms = match op {
            Operation::Base => &self.base_latency_ms,
            Operation::Product => &self.product_latency_ms,
            Operation::Cart => &self.cart_latency_ms,
            Operation::Checkout => &self.checkout_latency_ms,
        };
        Duration::from_millis(ms.load(Ordering::Relaxed))
    }

    pub fn failure_rate(&self, fault: Fault) -> f64 {
        let bits = match fault {
            Fault::Database => &self.db_failure_rate,
            Fault::Payment => &self.payment_failure_rate,
        };
        f64::from_bits(bits.load(Ordering::Relaxed))
    }

    pub fn chaos_mode(&self) -> bool {
        self.chaos_mode.load(Ordering::Relaxed)
    }

    pub fn chaos_multiplier(&self) -> f64 {
        f64::from_bits(self.chaos_latency_multiplier.load(Ordering::Relaxed))
    }
}

// ----- Service config -----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub addr: String,
    pub chaos_config_path: Option<PathBuf>,
    pub metrics_enabled: bool,
    pub log_format: LogFormat,
    pub simulation: SimulationSettings,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let simulation = SimulationSettings::from_lookup(&lookup)
            .context("Failed to read simulation settings")?;

        let log_format = match lookup(env::LOG_FORMAT).as_deref().map(str::trim) {
            None | Some("") => LogFormat::Text,
            Some(v) if v.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(other) => bail!("{} must be 'text' or 'json', got {:?}", env::LOG_FORMAT, other),
        };

        Ok(Self {
            addr: lookup(env::LISTEN_ADDR).unwrap_or_else(|| service::DEFAULT_ADDR.to_string()),
            chaos_config_path: lookup(env::CHAOS_CONFIG_PATH)
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            metrics_enabled: lookup(env::METRICS_ENABLED)
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            log_format,
            simulation,
        })
    }
}

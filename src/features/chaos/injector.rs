//! Latency and failure injection.
//!
//! Every decision reads the runtime configuration at the moment it is made,
//! so a reload or chaos toggle applies to the very next request.

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::debug;

use crate::{
    config::{Fault, Operation, RuntimeConfig},
    constants::{latency::JITTER_FRACTION, orders},
    errors::AppError,
    features::chaos::random::RandomSource,
    utils::logging::log_fault_injected,
};

#[derive(Clone)]
pub struct FaultInjector {
    config: Arc<RuntimeConfig>,
    random: Arc<dyn RandomSource>,
}

impl FaultInjector {
    pub fn new(config: Arc<RuntimeConfig>, random: Arc<dyn RandomSource>) -> Self {
        Self { config, random }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Draws the delay for one request of `op`: the configured latency, scaled
    /// by the chaos multiplier when chaos mode is on, with ±20% jitter.
    pub fn planned_delay(&self, op: Operation) -> Duration {
        let mut nanos = self.config.base_latency(op).as_nanos() as f64;
        if self.config.chaos_mode() {
            nanos *= self.config.chaos_multiplier();
        }
        let spread = 2.0 * self.random.next_unit() - 1.0;
        let jittered = nanos * (1.0 + JITTER_FRACTION * spread);

        // float-to-int `as` saturates, so oversized multipliers cap out
        Duration::from_nanos(jittered.max(0.0).round() as u64)
    }

    /// Suspends the calling task for a freshly drawn delay and returns it.
    pub async fn simulate_latency(&self, op: Operation) -> Duration {
        let delay = self.planned_delay(op);
        if !delay.is_zero() {
            sleep(delay).await;
        }
        debug!(operation = op.as_str(), delay_ms = delay.as_millis() as u64, "Injected latency");
        delay
    }

    /// Fails with the transient error for `fault` when a fresh draw lands
    /// below the currently configured probability.
    pub fn inject(&self, fault: Fault, op: Operation) -> Result<(), AppError> {
        let probability = self.config.failure_rate(fault);
        let draw = self.random.next_unit();
        if draw < probability {
            log_fault_injected(fault, op, probability);
            return Err(match fault {
                Fault::Database => AppError::DatabaseUnavailable,
                Fault::Payment => AppError::PaymentDeclined,
            });
        }
        Ok(())
    }

    /// Five-digit confirmation number in `[10000, 99999]`.
    pub fn order_number(&self) -> u32 {
        let span = (orders::NUMBER_MAX - orders::NUMBER_MIN + 1) as f64;
        let offset = (self.random.next_unit() * span) as u32;
        (orders::NUMBER_MIN + offset).min(orders::NUMBER_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::SimulationSettings,
        features::chaos::random::{ScriptedRandom, SeededRandom},
    };

    fn injector(settings: SimulationSettings, random: Arc<dyn RandomSource>) -> FaultInjector {
        FaultInjector::new(Arc::new(RuntimeConfig::new(&settings)), random)
    }

    fn mean_delay_ms(injector: &FaultInjector, op: Operation, samples: usize) -> f64 {
        let total: f64 = (0..samples)
            .map(|_| injector.planned_delay(op).as_secs_f64() * 1000.0)
            .sum();
        total / samples as f64
    }

    #[test]
    fn jitter_stays_within_twenty_percent() {
        let low = injector(SimulationSettings::default(), Arc::new(ScriptedRandom::constant(0.0)));
        assert_eq!(low.planned_delay(Operation::Product), Duration::from_millis(160));

        let mid = injector(SimulationSettings::default(), Arc::new(ScriptedRandom::constant(0.5)));
        assert_eq!(mid.planned_delay(Operation::Cart), Duration::from_millis(300));

        let seeded = injector(SimulationSettings::default(), Arc::new(SeededRandom::new(3)));
        for _ in 0..1_000 {
            let d = seeded.planned_delay(Operation::Checkout);
            assert!(d >= Duration::from_millis(640) && d <= Duration::from_millis(960));
        }
    }

    #[test]
    fn chaos_mode_scales_mean_delay_by_multiplier() {
        let normal = injector(SimulationSettings::default(), Arc::new(SeededRandom::new(42)));
        let chaotic = injector(
            SimulationSettings { chaos_mode: true, ..SimulationSettings::default() },
            Arc::new(SeededRandom::new(42)),
        );

        let normal_mean = mean_delay_ms(&normal, Operation::Product, 10_000);
        let chaos_mean = mean_delay_ms(&chaotic, Operation::Product, 10_000);

        assert!((normal_mean - 200.0).abs() < 4.0, "normal mean was {}", normal_mean);
        let ratio = chaos_mean / normal_mean;
        assert!((ratio - 10.0).abs() < 0.05, "ratio was {}", ratio);
    }

    #[test]
    fn chaos_toggle_applies_without_rebuilding_injector() {
        let injector = injector(SimulationSettings::default(), Arc::new(ScriptedRandom::constant(0.5)));
        assert_eq!(injector.planned_delay(Operation::Base), Duration::from_millis(50));

        injector.config().apply(&SimulationSettings { chaos_mode: true, ..SimulationSettings::default() });
        assert_eq!(injector.planned_delay(Operation::Base), Duration::from_millis(500));
    }

    #[test]
    fn zero_probability_never_fails() {
        let settings = SimulationSettings { db_failure_rate: 0.0, ..SimulationSettings::default() };
        let injector = injector(settings, Arc::new(SeededRandom::new(1)));
        for _ in 0..10_000 {
            assert!(injector.inject(Fault::Database, Operation::Product).is_ok());
        }
    }

    #[test]
    fn certain_probability_always_fails() {
        let settings = SimulationSettings { payment_failure_rate: 1.0, ..SimulationSettings::default() };
        let injector = injector(settings, Arc::new(SeededRandom::new(1)));
        for _ in 0..10_000 {
            let err = injector.inject(Fault::Payment, Operation::Checkout).unwrap_err();
            assert!(matches!(err, AppError::PaymentDeclined));
        }
    }

    #[test]
    fn scripted_draws_force_each_branch() {
        let settings = SimulationSettings { db_failure_rate: 0.3, ..SimulationSettings::default() };
        let injector = injector(settings, Arc::new(ScriptedRandom::new(vec![0.29, 0.3, 0.9])));

        assert!(matches!(
            injector.inject(Fault::Database, Operation::Product),
            Err(AppError::DatabaseUnavailable)
        ));
        assert!(injector.inject(Fault::Database, Operation::Product).is_ok());
        assert!(injector.inject(Fault::Database, Operation::Product).is_ok());
    }

    #[test]
    fn order_numbers_stay_five_digits() {
        let injector = injector(
            SimulationSettings::default(),
            Arc::new(ScriptedRandom::new(vec![0.0, 0.999_999_9, 0.5])),
        );
        assert_eq!(injector.order_number(), 10_000);
        assert_eq!(injector.order_number(), 99_999);
        assert_eq!(injector.order_number(), 55_000);
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_latency_suspends_for_the_drawn_delay() {
        let injector = injector(SimulationSettings::default(), Arc::new(ScriptedRandom::constant(0.5)));
        let start = tokio::time::Instant::now();
        let delay = injector.simulate_latency(Operation::Checkout).await;
        assert_eq!(delay, Duration::from_millis(800));
        assert!(start.elapsed() >= delay);
    }
}

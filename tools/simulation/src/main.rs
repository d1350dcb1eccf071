use rust_decimal::Decimal;
use simulation::{SimConfig, Simulation};

/// Usage: simulation [seed] [ticks] [journal_failure_rate]
fn main() {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let mut config = SimConfig::default();
    if let Some(seed) = args.next().and_then(|s| s.parse().ok()) {
        config.seed = seed;
    }
    if let Some(ticks) = args.next().and_then(|s| s.parse().ok()) {
        config.ticks = ticks;
    }
    if let Some(rate) = args.next().and_then(|s| s.parse().ok()) {
        config.journal_failure_rate = rate;
    }

    tracing::info!(
        seed = config.seed,
        ticks = config.ticks,
        failure_rate = config.journal_failure_rate,
        "starting simulation"
    );

    let mut sim = Simulation::new(config);
    let report = sim.run();

    let total_fees: Decimal = report.fees.values().copied().sum();
    tracing::info!(
        trades = report.trades_executed,
        faults = report.journal_faults,
        %total_fees,
        "simulation complete"
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&report).expect("report serializes")
    );
}

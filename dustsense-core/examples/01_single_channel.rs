//! Single Analog Dust Sensor Example
//!
//! Runs the acquisition cycle on one simulated optical dust sensor and shows
//! how noisy pulses are filtered into a single reading.
//!
//! ## What You'll Learn
//!
//! - Inspecting the raw samples of one cycle
//! - How below-threshold samples are kept but excluded from the mean
//! - Aggregating many cycles into a historical series
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_single_channel
//! ```

use dustsense_core::sim::SimulatedChannel;
use dustsense_core::time::{Clock, MockClock};
use dustsense_core::{CycleAggregator, SamplerConfig, SensorResult};

fn main() -> SensorResult<()> {
    println!("DustSense Single Channel Example");
    println!("================================\n");

    // 5 V board, so readings come out in volts
    let config = SamplerConfig::five_volt().with_max_inner_attempts(4);

    // Most pulses need a couple of reads before the photodiode settles;
    // every fifth cycle never rises above the noise floor.
    let channel = SimulatedChannel::cycling([
        0.01, 0.02, 0.14, //
        0.13, //
        0.01, 0.16, //
        0.02, 0.01, 0.01, 0.03, //
        0.12,
    ]);

    // The mock clock skips the real 1 s stabilization delay per cycle
    let mut aggregator = CycleAggregator::new(&config, channel, MockClock::new())?;

    let single = aggregator.run_cycles(1)?;
    if let Some(cycle) = aggregator.last_cycle() {
        println!("First cycle:");
        for sample in cycle.samples() {
            println!(
                "  t = {:6.3} ms  {:.3} V  {}",
                sample.elapsed_ms,
                sample.voltage,
                if sample.is_error { "noise" } else { "ok" }
            );
        }
    }
    println!("  reading: {:?}\n", single.mean);

    let aggregation = aggregator.run_cycles(20)?;
    println!("20 cycles:");
    println!("  valid cycles:   {}", aggregation.series.len());
    println!("  dropped cycles: {}", aggregation.series.dropped());
    match aggregation.mean {
        Some(volts) => println!("  mean reading:   {volts:.3} V"),
        None => println!("  mean reading:   no data"),
    }

    let elapsed = aggregator.clock().elapsed();
    println!("\nSimulated sampling time: {:.1} s", elapsed.as_secs_f64());

    aggregator.release()?;
    Ok(())
}

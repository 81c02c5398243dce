//! Inspection and simulation tools for the snapline replication stack.
//!
//! This crate backs the `snapline-tools` binary:
//!
//! - Validate a captured frame and summarize its header and payload
//! - Replay a snapshot stream over a simulated jittery, lossy link and report
//!   how the interpolation clock coped
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Machine- and human-readable output** - Every report serializes to JSON
//!   and has a terminal rendering.

mod inspect;
mod simulate;

pub use inspect::{format_inspect_pretty, inspect_frame, InspectReport, PREVIEW_BYTES};
pub use simulate::{
    format_simulation_pretty, simulate_timeline, RateHistogram, SimulationParams,
    SimulationReport,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_serialize_to_json() {
        let report = simulate_timeline(
            timeline::TimelineConfig::default(),
            &SimulationParams {
                duration: 1.0,
                ..SimulationParams::default()
            },
        )
        .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["sent"], report.sent);
        assert!(json["rate_histogram"]["normal"].is_u64());
    }
}

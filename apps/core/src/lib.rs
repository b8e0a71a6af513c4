pub mod autocomplete;
pub mod cli;
pub mod config;
pub mod contract;
pub mod data_source;
pub mod filter;
pub mod highlight;
pub mod input;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod surface;
pub mod transport;

#[cfg(test)]
extern crate self as autocomplete_core;

#[cfg(test)]
mod tests {
    mod filter_latency_test {
        include!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../tests/perf/filter_latency_test.rs"
        ));
    }
}

//! Example: intern property keys from a config file and print the report
//!
//! Run with `RUST_LOG=stringtools=debug` to see scavenging.

use std::collections::HashSet;
use std::sync::Arc;

use stringtools::strings;
use tracing_subscriber::EnvFilter;

const PROPERTIES: &str = "\
    Configuration = Debug
    Platform = x64
    OutputPath = bin/Debug
    Configuration = Release
    Platform = x64
    OutputPath = bin/Release
    Configuration = Debug
    Platform = AnyCPU
";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    strings::enable_diagnostics();

    let mut interned: Vec<(Arc<str>, Arc<str>)> = Vec::new();
    for line in PROPERTIES.lines() {
        let Some(split) = line.find('=') else { continue };

        let mut name = strings::get_span_based_builder();
        name.append_substring(line, 0, split)?.trim();
        let mut value = strings::get_span_based_builder();
        value.append_substring(line, split + 1, line.len() - split - 1)?.trim();

        interned.push((name.intern(), value.intern()));
    }

    // Equal names share one allocation
    let distinct_names: HashSet<*const str> = interned.iter().map(|(name, _)| Arc::as_ptr(name)).collect();

    println!("stringtools v{}", stringtools::VERSION);
    println!("{} properties, {} distinct name allocations", interned.len(), distinct_names.len());
    println!("{}", strings::create_diagnostic_report());
    Ok(())
}

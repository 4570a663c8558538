//! Dump the shared sample proof bundle as JSON. Building the fixtures
//! runs a full trusted setup, so expect this to take a while.

fn main() -> anyhow::Result<()> {
    let fixtures = zkfeed_test_fixtures::fixtures();
    println!("{}", serde_json::to_string_pretty(fixtures.bundle())?);
    Ok(())
}

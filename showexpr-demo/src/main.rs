//! showexpr demo
//!
//! Walks through the `show!` forms. Shown values go to stdout, logs to
//! stderr (set `RUST_LOG=debug` to see which strategy named each value).

use std::collections::BTreeMap;
use std::io;

use anyhow::Result;
use showexpr_core::{scope, show, MemoryHistory, Show, ShowConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Point {
    x: i32,
    y: i32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("showexpr-demo starting...");

    let show = Show::from_config(ShowConfig::from_env());
    let config = show.config();
    info!(
        "target `{}`, pretty: {}, history: {:?}",
        config.target, config.pretty, config.history_path
    );
    Show::install(show)?;

    basics();
    collections();
    fallbacks();

    info!("showexpr-demo done");
    Ok(())
}

fn basics() {
    info!("basics");

    let x = 42;
    show!(x);

    let a = 1;
    let b = "hello";
    let c = [1, 2, 3];
    let (a, b, _) = show!(a, b, c);

    let y = 5;
    let z = 10;
    let doubled = show!(y + z) * 2;
    show!(doubled, a + 1, b.len());

    show!("hello".to_uppercase());
    show!(std::cmp::max(y, z));
}

fn collections() {
    info!("collections");

    let numbers = vec![1, 2, 3, 4, 5];
    let numbers = show!(numbers);

    let mut ages = BTreeMap::new();
    ages.insert("alice", 30);
    ages.insert("bob", 25);
    show!(ages);

    let nested = vec![Point { x: 1, y: 2 }, Point { x: 3, y: numbers.len() as i32 }];
    show!(nested);
    show!(Point { x: 0, y: -1 });
}

fn fallbacks() {
    info!("fallbacks");

    // An interactive front-end's latest input names the values
    let history = MemoryHistory::new();
    history.record("show!(first, second)");
    let session = Show::new().with_history(history);
    let (p, q) = (10, 20);
    show!(use session; p, q);

    // Without source text, values are matched against the given scope
    let blind = Show::from_config(ShowConfig {
        target: "dump".to_string(),
        ..ShowConfig::default()
    });
    let count = 3;
    let label = String::from("total");
    let scope = scope!(count, label);
    show!(use blind, in scope; 1 + 2, label, vec![count]);
}

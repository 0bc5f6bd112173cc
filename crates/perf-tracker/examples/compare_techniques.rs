//! Compare styling techniques on a synthetic 1000-item list
//!
//! Each technique builds the markup for a list of items the way that
//! technique would style it, and the batch runner times the build.
//!
//! Usage: cargo run -p perf-tracker --example compare_techniques -- [config.toml]

use anyhow::Result;
use perf_tracker::config::{Config, TechniqueConfig};
use perf_tracker::reporter::{BatchReport, OutputFormat, Reporter};
use perf_tracker::{BatchRunner, SystemHost};
use std::env;
use std::rc::Rc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = match env::args().nth(1) {
        Some(path) => {
            println!("Loading config from: {}", path);
            Config::from_file(path)?
        }
        None => default_config(),
    };

    println!("Comparing {} techniques", config.techniques.len());
    println!("  Iterations: {}", config.batch.iterations);
    println!("  Settle delay: {:?}", config.batch.settle_delay);
    println!();

    let host = Rc::new(SystemHost::new());
    let mut runner = BatchRunner::with_config(host, config.batch.clone());

    for technique in &config.techniques {
        let name = technique.name.clone();
        let items = technique.items;
        runner
            .run_default(&technique.name, || {
                let markup = render_list(&name, items);
                std::hint::black_box(markup);
                async {}
            })
            .await;
    }

    let mut report = BatchReport::from_runner("Styling techniques", &runner);
    if let Some(baseline) = config.techniques.first() {
        for other in config.techniques.iter().skip(1) {
            if let Some(comparison) = runner.compare_results(&baseline.name, &other.name) {
                report = report.with_comparison(comparison);
            }
        }
    }

    Reporter::new(OutputFormat::Console).report(&report)?;
    Ok(())
}

fn default_config() -> Config {
    let techniques = ["plain-css", "bem", "utility", "runtime-injection"]
        .into_iter()
        .map(|name| TechniqueConfig {
            name: name.to_string(),
            items: 1000,
        })
        .collect();

    Config {
        techniques,
        ..Config::default()
    }
}

/// Markup for `items` list entries in the given technique's style
fn render_list(technique: &str, items: usize) -> String {
    let mut html = String::with_capacity(items * 96);
    let mut styles = String::new();

    html.push_str("<ul>");
    for i in 0..items {
        let class = match technique {
            "bem" => format!("list__item list__item--{}", if i % 2 == 0 { "even" } else { "odd" }),
            "utility" => {
                "flex items-center px-4 py-2 border-b text-sm hover:bg-gray-50".to_string()
            }
            "runtime-injection" => {
                // one generated class and rule per item
                let class = format!("css-{:x}", i.wrapping_mul(2654435761));
                styles.push_str(&format!(".{} {{ padding: 8px 16px; }}\n", class));
                class
            }
            _ => "item".to_string(),
        };
        html.push_str(&format!("<li class=\"{}\">Item {}</li>", class, i));
    }
    html.push_str("</ul>");

    if !styles.is_empty() {
        html.insert_str(0, &format!("<style>{}</style>", styles));
    }
    html
}

use std::env;
use std::path::PathBuf;

use datadecl_config::{DeclarativeColumns, RecordingBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or("missing yaml path")?;

    let config = DeclarativeColumns::from_path(path)?;
    println!("loaded {} columns from {}", config.len(), config.origin());
    for tool_config in config.tool_configs() {
        println!(
            "  tool config {} -> {}",
            tool_config.tool_alias,
            tool_config.providers.join(", ")
        );
    }

    let mut builder = RecordingBuilder::new();
    config.register(&mut builder)?;
    for call in builder.calls() {
        println!("  [+] {} ({}) via {}", call.name, call.kind, call.method);
    }

    Ok(())
}

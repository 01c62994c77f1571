use player_enhance::core::EngineConfig;
use player_enhance::sim::script::Script;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = EngineConfig::load().unwrap_or_else(|e| {
        log::warn!("Falling back to default config: {}", e);
        EngineConfig::default()
    });

    let script = match std::env::args().nth(1) {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("Failed to read script {}: {}", path, e))?;
            serde_json::from_str::<Script>(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse script {}: {}", path, e))?
        }
        None => {
            log::info!("No script given, running the built-in demo session");
            Script::demo()
        }
    };

    let report = script.run(config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

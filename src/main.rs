use anyhow::bail;
use freedraw::replay::{load_trace, replay};
use freedraw::settings::Settings;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (settings_path, trace_path, output) = match args.as_slice() {
        [settings, trace] => (settings, trace, None),
        [settings, trace, output] => (settings, trace, Some(output)),
        _ => bail!("usage: freedraw-replay <settings.json> <trace.json> [output.json]"),
    };

    let settings = Settings::load(settings_path)?;
    freedraw::logging::init(settings.debug_logging, settings.log_file.clone());

    let trace = load_trace(Path::new(trace_path))?;
    let report = replay(&settings, &trace);
    let json = serde_json::to_string_pretty(&report)?;

    match output {
        Some(path) => {
            if let Err(err) = std::fs::write(path, json) {
                tracing::error!(?err, path = %path, "failed to write replay report");
                return Err(err.into());
            }
            tracing::info!(path = %path, polygons = report.polygons.len(), "wrote replay report");
        }
        None => println!("{json}"),
    }
    Ok(())
}

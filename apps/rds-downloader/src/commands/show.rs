// show.rs — Print what is currently published.

use std::path::Path;

use rds_fetcher::Envelope;
use serde_json::Value;

use crate::config::DownloaderConfig;

pub fn execute(config: &DownloaderConfig) -> anyhow::Result<()> {
    let path = config.persister.target_path(&config.data_root);
    if !path.exists() {
        println!("No RDS data published at {}", path.display());
        return Ok(());
    }

    let envelope = Envelope::read_from(&path)?;
    print!("{}", render(&path, &envelope));
    Ok(())
}

fn render(path: &Path, envelope: &Envelope) -> String {
    let mut out = format!(
        "{}\n  format:  {}\n  version: {}\n  agent:   {}\n  categories ({}):\n",
        path.display(),
        envelope.meta.format,
        envelope.meta.version,
        envelope.meta.agent,
        envelope.data.len()
    );
    for (name, value) in &envelope.data {
        out.push_str(&format!("    {:<24} {}\n", name, describe(value)));
    }
    out
}

/// One-word shape of a payload, with a size for containers.
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(items) => format!("array, {} item(s)", items.len()),
        Value::Object(fields) => format!("object, {} field(s)", fields.len()),
    }
}

use anyhow::Result;

use eksforge::domain::buildspec::BuildSpec;
use eksforge::domain::cluster::KubernetesVersion;

use crate::ui::json::emit_event;
use crate::ui::json::events::StartEvent;

pub fn cmd_version(json: bool) -> Result<()> {
    if json {
        emit_event(&StartEvent::new("version"))?;
        emit_event(&serde_json::json!({
            "event": "complete",
            "command": "version",
            "data": {
                "eksforge": env!("CARGO_PKG_VERSION"),
                "default_kubernetes_version": KubernetesVersion::DEFAULT,
                "buildspec_version": BuildSpec::VERSION,
            }
        }))?;
    } else {
        println!("eksforge v{}", env!("CARGO_PKG_VERSION"));
        println!("Default Kubernetes version: {}", KubernetesVersion::DEFAULT);
        println!("Buildspec version: {}", BuildSpec::VERSION);
    }
    Ok(())
}

use std::sync::Arc;

use agentwatch_cluster::HttpClusterClient;
use agentwatch_core::{AgentwatchConfig, InstanceObservation};
use agentwatch_remediate::inventory;

/// List disconnected instances without touching counters or instances.
pub async fn scan(config: &AgentwatchConfig, cluster: &str) -> anyhow::Result<()> {
    let gateway = Arc::new(HttpClusterClient::new(&config.cluster.endpoint)?);
    let found = inventory::disconnected(gateway.as_ref(), cluster, config.call_timeout()).await?;
    print!("{}", format_scan(&found));
    Ok(())
}

fn format_scan(found: &[InstanceObservation]) -> String {
    let mut out = String::new();
    for obs in found {
        let group = obs.autoscaling_group.as_deref().unwrap_or("-");
        out.push_str(&format!("{}  {group}\n", obs.instance_id));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(id: &str, group: Option<&str>) -> InstanceObservation {
        InstanceObservation {
            instance_id: id.to_string(),
            agent_connected: false,
            autoscaling_group: group.map(str::to_string),
        }
    }

    #[test]
    fn one_line_per_instance() {
        let found = vec![observation("i-1", Some("workers-asg")), observation("i-2", None)];
        assert_eq!(format_scan(&found), "i-1  workers-asg\ni-2  -\n");
    }

    #[test]
    fn nothing_found_prints_nothing() {
        assert_eq!(format_scan(&[]), "");
    }
}

use agentwatch_core::AgentwatchConfig;
use agentwatch_state::CounterStore;

use super::open_store;

pub fn list(config: &AgentwatchConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let counters = store.list()?;
    if counters.is_empty() {
        println!("no instances are being tracked");
    }
    for (instance_id, failures) in counters {
        println!("{instance_id}\t{failures}");
    }
    Ok(())
}

pub fn reset(config: &AgentwatchConfig, instance_id: &str) -> anyhow::Result<()> {
    let store = open_store(config)?;
    if store.delete(instance_id)? {
        println!("✓ reset {instance_id}");
    } else {
        println!("{instance_id} was not being tracked");
    }
    Ok(())
}

pub fn clear(config: &AgentwatchConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let removed = store.clear()?;
    println!("✓ cleared {removed} counters");
    Ok(())
}

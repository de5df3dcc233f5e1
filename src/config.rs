//! Configuration Resolution
//!
//! The only required setting is the Azure subscription id. It comes from the
//! CLI flag first, then the environment; nothing is read from or written to
//! disk.

/// Resolve the subscription id (CLI flag > AZURE_SUBSCRIPTION_ID > SUBSCRIPTION_ID)
pub fn resolve_subscription_id(cli: Option<String>) -> Option<String> {
    cli.filter(|v| !v.trim().is_empty())
        .or_else(|| env_nonempty("AZURE_SUBSCRIPTION_ID"))
        .or_else(|| env_nonempty("SUBSCRIPTION_ID"))
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

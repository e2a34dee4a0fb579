use td_agents::{AgentRegistry, StaticProfiles};

pub fn run() {
    let registry = StaticProfiles::new();
    for name in registry.list() {
        let Some(profile) = registry.get(&name) else {
            continue;
        };
        let local = display_model(&profile.local_model);
        let remote = display_model(&profile.remote_model);
        println!(
            "{:<14} local={:<24} remote={:<24} verbosity={}",
            profile.name, local, remote, profile.default_verbosity
        );
    }
}

fn display_model(model: &str) -> &str {
    if model.is_empty() { "(default)" } else { model }
}

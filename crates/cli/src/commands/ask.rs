use std::io::Write;

use anyhow::bail;

use td_agents::{AgentRegistry, StaticProfiles};
use td_domain::chat::build_messages;
use td_domain::config::RuntimeConfig;
use td_domain::keyword::NoopKeywordStore;
use td_executor::fallback::{
    collect_stream, execute_streaming, execute_with_fallback, FallbackConfig,
};
use td_executor::{escalation, verbosity};

use crate::cli::AskArgs;

pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let runtime = RuntimeConfig::from_env();
    let registry = StaticProfiles::new();

    let agent_name = args.agent.as_deref().unwrap_or("default");
    let profile = match registry.get(agent_name) {
        Some(p) => p,
        None => bail!(
            "unknown agent '{}' (available: {})",
            agent_name,
            registry.list().join(", ")
        ),
    };

    let resolution = escalation::resolve_verbosity(
        args.verbosity,
        profile.default_verbosity,
        agent_name,
        &args.prompt,
        &NoopKeywordStore,
    )
    .await?;
    if let Some(warning) = &resolution.warning {
        eprintln!("[warning] {warning}");
    }
    tracing::debug!(
        agent = %agent_name,
        effective = resolution.effective,
        "verbosity resolved"
    );

    let system = verbosity::append_constraint(&profile.system_prompt, resolution.effective);
    let messages = build_messages(&system, &[], 0, &args.prompt);

    let cfg = FallbackConfig {
        model_override: args.model.clone().or_else(|| runtime.local_model.clone()),
        remote_url: if args.local {
            None
        } else {
            args.remote_url.clone().or_else(|| runtime.remote_url.clone())
        },
        local_only: args.local,
        remote_only: args.remote_only,
        profile: Some(profile),
        verbosity: resolution.effective,
        ollama_host: Some(runtime.ollama_host.clone()),
    };

    if args.stream {
        let stream = execute_streaming(&cfg, &messages).await?;
        let mut out = std::io::stdout();
        collect_stream(stream, |token| {
            out.write_all(token.as_bytes())?;
            out.flush()?;
            Ok(())
        })
        .await?;
        println!();
        eprintln!("(source: local)");
        return Ok(());
    }

    let result = execute_with_fallback(&cfg, &messages).await?;
    if args.json {
        let out = serde_json::json!({
            "reply": result.reply,
            "source": result.source,
            "verbosity": resolution.effective,
            "warning": resolution.warning,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", result.reply);
        eprintln!("(source: {})", result.source);
    }
    Ok(())
}

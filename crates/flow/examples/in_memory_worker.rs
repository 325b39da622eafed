// Ejemplo: motor + scheduler sobre el repositorio en memoria.
//
// Ejecutar con `cargo run -p flow --example in_memory_worker`.
use chrono::{Duration as ChronoDuration, Utc};
use flow::engine::{FlowEngine, FlowEngineConfig};
use flow::scheduler::{shutdown_channel, Scheduler};
use flow::stubs::{InMemoryInteractionRepository, ManualTicks};
use intent_domain::{ConfigRecord, InteractionEvent, SurfaceId};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let repo = Arc::new(InMemoryInteractionRepository::new());
    let now = Utc::now();
    repo.push_config(ConfigRecord { session_id: "demo".into(),
                                    event_name: "click".into(),
                                    created_at: now,
                                    enriched_config: json!({
                                        "flowSteps": [
                                            {"parentUIComp": "/savings", "action": "click", "flags": ["exploredSavings"]},
                                            {"parentUIComp": "/calc", "event": "hover", "flags": ["viewedCalculator"]}
                                        ],
                                        "injectionConfig": {"bottomCard": ["exploredSavings", "viewedCalculator"]},
                                        "componentProps": {"bottomCard": {"content": "Simula tu ahorro", "link": "/calc"}}
                                    }) });
    repo.push_event(InteractionEvent::new("/savings", "click", now + ChronoDuration::seconds(1)));

    let engine = Arc::new(FlowEngine::new(repo.clone(), FlowEngineConfig::default()));
    let store = engine.store();
    let (tick_tx, ticks) = ManualTicks::channel();
    let (_shutdown, signal) = shutdown_channel();
    let worker = tokio::spawn(Scheduler::new(engine, ticks, signal).run());

    let _ = tick_tx.send(());
    repo.push_event(InteractionEvent::new("/calc", "hover", now + ChronoDuration::seconds(2)));
    let _ = tick_tx.send(());
    drop(tick_tx);

    let summary = match worker.await {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("worker task failed: {}", e);
            return;
        }
    };
    let snapshot = store.snapshot();
    println!("ticks={} active_flags={:?} bottomCard eligible={}",
             summary.ticks,
             snapshot.flags.active(),
             snapshot.decision.is_eligible(SurfaceId::BottomCard));
}

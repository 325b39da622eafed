use chrono::{DateTime, TimeZone, Utc};
use flow::cursor::Cursor;
use flow::engine::{FlowEngine, FlowEngineConfig};
use flow::errors::Result;
use flow::repository::InteractionRepository;
use flow::scheduler::{shutdown_channel, ExitStatus, IntervalTicks, Scheduler, SchedulerConfig};
use flow::stubs::{InMemoryInteractionRepository, ManualTicks};
use intent_domain::{ConfigRecord, InteractionEvent};
use std::sync::Arc;
use std::time::Duration;

fn ts(secs: i64) -> DateTime<Utc> {
  Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

#[test]
fn poll_interval_override_parsing() {
  assert_eq!(SchedulerConfig::from_raw_interval(None).poll_interval, Duration::from_millis(5000));
  assert_eq!(SchedulerConfig::from_raw_interval(Some("250")).poll_interval, Duration::from_millis(250));
  assert_eq!(SchedulerConfig::from_raw_interval(Some("abc")).poll_interval, Duration::from_millis(5000));
  assert_eq!(SchedulerConfig::from_raw_interval(Some("0")).poll_interval, Duration::from_millis(5000));
  assert_eq!(SchedulerConfig::from_raw_interval(Some("-3")).poll_interval, Duration::from_millis(5000));
}

#[tokio::test]
async fn manual_ticks_drive_the_engine_until_the_source_ends() {
  let repo = Arc::new(InMemoryInteractionRepository::new());
  repo.push_event(InteractionEvent::new("/calc", "hover", ts(1)));
  let engine = Arc::new(FlowEngine::new(repo.clone(), FlowEngineConfig::default()));
  let (tick_tx, ticks) = ManualTicks::channel();
  let (_shutdown, signal) = shutdown_channel();

  for _ in 0..3 {
    tick_tx.send(()).expect("send tick");
  }
  drop(tick_tx);

  let summary = Scheduler::new(engine, ticks, signal).run().await;
  assert_eq!(summary.ticks, 3);
  assert_eq!(summary.degraded_ticks, 0);
  assert_eq!(summary.exit, ExitStatus::Graceful);
  assert!(repo.is_closed());
}

#[tokio::test]
async fn shutdown_stops_the_loop_with_exit_code_zero() {
  let repo = Arc::new(InMemoryInteractionRepository::new());
  let engine = Arc::new(FlowEngine::new(repo.clone(), FlowEngineConfig::default()));
  let (_tick_tx, ticks) = ManualTicks::channel();
  let (shutdown, signal) = shutdown_channel();

  let handle = tokio::spawn(Scheduler::new(engine, ticks, signal).run());
  shutdown.trigger();
  let summary = handle.await.expect("scheduler task");
  assert_eq!(summary.ticks, 0);
  assert_eq!(summary.exit.code(), 0);
  assert!(repo.is_closed());
}

#[tokio::test]
async fn degraded_ticks_are_counted_and_the_loop_continues() {
  let repo = Arc::new(InMemoryInteractionRepository::new());
  let engine = Arc::new(FlowEngine::new(repo.clone(), FlowEngineConfig::default()));
  let (tick_tx, ticks) = ManualTicks::channel();
  let (_shutdown, signal) = shutdown_channel();

  repo.fail_next(1);
  tick_tx.send(()).expect("send tick");
  tick_tx.send(()).expect("send tick");
  drop(tick_tx);

  let summary = Scheduler::new(engine, ticks, signal).run().await;
  assert_eq!(summary.ticks, 2);
  assert_eq!(summary.degraded_ticks, 1);
  assert_eq!(repo.reconnect_count(), 1);
  assert_eq!(summary.exit, ExitStatus::Graceful);
}

#[tokio::test(start_paused = true)]
async fn interval_ticks_follow_virtual_time() {
  let repo = Arc::new(InMemoryInteractionRepository::new());
  let engine = Arc::new(FlowEngine::new(repo, FlowEngineConfig::default()));
  let (shutdown, signal) = shutdown_channel();
  let ticks = IntervalTicks::new(Duration::from_millis(5000));

  let handle = tokio::spawn(Scheduler::new(engine, ticks, signal).run());
  // ticks at 0 s, 5 s and 10 s
  tokio::time::sleep(Duration::from_millis(12_500)).await;
  shutdown.trigger();
  let summary = handle.await.expect("scheduler task");
  assert_eq!(summary.ticks, 3);
  assert_eq!(summary.exit, ExitStatus::Graceful);
}

struct PanickingRepository;

impl InteractionRepository for PanickingRepository {
  fn fetch_events_since(&self, _cursor: &Cursor) -> Result<Vec<InteractionEvent>> {
    Ok(Vec::new())
  }

  fn fetch_configs_since(&self, _cursor: &Cursor) -> Result<Vec<ConfigRecord>> {
    panic!("corrupted driver state")
  }

  fn latest_event_timestamp(&self) -> Result<Option<DateTime<Utc>>> {
    Ok(None)
  }

  fn latest_config_timestamp(&self) -> Result<Option<DateTime<Utc>>> {
    Ok(None)
  }

  fn reconnect(&self) -> Result<()> {
    Ok(())
  }

  fn close(&self) -> Result<()> {
    Ok(())
  }
}

#[tokio::test]
async fn panicking_tick_ends_with_fault_status() {
  let engine = Arc::new(FlowEngine::new(Arc::new(PanickingRepository), FlowEngineConfig::default()));
  let (tick_tx, ticks) = ManualTicks::channel();
  let (_shutdown, signal) = shutdown_channel();
  tick_tx.send(()).expect("send tick");
  tick_tx.send(()).expect("send tick");

  let summary = Scheduler::new(engine, ticks, signal).run().await;
  assert_eq!(summary.exit, ExitStatus::Fault);
  assert_eq!(summary.exit.code(), 1);
  assert_eq!(summary.ticks, 0);
}

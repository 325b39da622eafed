use flow::errors::FlowError;
use intent_persistence::{with_connect_timeout, WorkerConfig};
use std::collections::HashMap;
use std::time::Duration;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
  let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
  move |key| map.get(key).cloned()
}

#[test]
fn missing_database_url_is_a_configuration_error() {
  let err = WorkerConfig::from_lookup(lookup(&[])).unwrap_err();
  assert!(matches!(err, FlowError::Configuration(_)));
  let err = WorkerConfig::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap_err();
  assert!(matches!(err, FlowError::Configuration(_)));
}

#[test]
fn defaults_apply_when_only_the_url_is_set() {
  let cfg = WorkerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://u:p@db/app")])).expect("config");
  assert_eq!(cfg.database_url, "postgres://u:p@db/app?connect_timeout=5");
  assert_eq!(cfg.scheduler.poll_interval, Duration::from_millis(5000));
  assert!(cfg.schema.contains("viewedCalculator"));
}

#[test]
fn interval_and_flag_overrides_are_read() {
  let cfg = WorkerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db/app"),
                                               ("WEBSITE_EVENT_POLL_INTERVAL_MS", "750"),
                                               ("INTENTFLOW_FLAGS", "a, b,,c")])).expect("config");
  assert_eq!(cfg.scheduler.poll_interval, Duration::from_millis(750));
  assert_eq!(cfg.schema.len(), 3);
  assert!(cfg.engine_config().schema.contains("b"));
}

#[test]
fn invalid_interval_falls_back_and_empty_flag_list_is_rejected() {
  let cfg = WorkerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db/app"),
                                               ("WEBSITE_EVENT_POLL_INTERVAL_MS", "-10")])).expect("config");
  assert_eq!(cfg.scheduler.poll_interval, Duration::from_millis(5000));

  let err = WorkerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db/app"), ("INTENTFLOW_FLAGS", " , ")]))
    .unwrap_err();
  assert!(matches!(err, FlowError::Configuration(_)));
}

#[test]
fn connect_timeout_is_appended_once() {
  assert_eq!(with_connect_timeout("postgres://db/app?sslmode=require"),
             "postgres://db/app?sslmode=require&connect_timeout=5");
  assert_eq!(with_connect_timeout("postgres://db/app?connect_timeout=2"), "postgres://db/app?connect_timeout=2");
  assert_eq!(with_connect_timeout("host=db dbname=app"), "host=db dbname=app connect_timeout=5");
}

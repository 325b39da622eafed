use intent_domain::{FlagSchema, FlagSet, DEFAULT_FLAGS};

#[test]
fn default_schema_has_view_state_flags() {
  let schema = FlagSchema::default();
  assert_eq!(schema.len(), DEFAULT_FLAGS.len());
  assert!(schema.contains("viewedCalculator"));
  assert!(!schema.contains("somethingElse"));
}

#[test]
fn apply_is_monotonic_and_ignores_unknown_names() {
  let mut flags = FlagSet::from_schema(&FlagSchema::default());
  let first = flags.apply(["exploredSavings", "notAFlag"]);
  assert_eq!(first.newly_set, vec!["exploredSavings".to_string()]);
  assert_eq!(first.unknown, vec!["notAFlag".to_string()]);
  assert!(!flags.is_known("notAFlag"));

  let second = flags.apply(["exploredSavings"]);
  assert!(!second.changed());
  assert_eq!(second.already_set, vec!["exploredSavings".to_string()]);
  assert!(flags.is_set("exploredSavings"));
}

#[test]
fn all_set_requires_non_empty_list() {
  let mut flags = FlagSet::from_schema(&FlagSchema::default());
  assert!(!flags.all_set(&[]));
  flags.apply(["viewedHome"]);
  assert!(flags.all_set(&["viewedHome".to_string()]));
  assert!(!flags.all_set(&["viewedHome".to_string(), "clickedLoans".to_string()]));
}

#[test]
fn reset_clears_every_flag() {
  let mut flags = FlagSet::from_schema(&FlagSchema::default());
  flags.apply(DEFAULT_FLAGS);
  assert_eq!(flags.active().len(), DEFAULT_FLAGS.len());
  flags.reset();
  assert!(flags.active().is_empty());
}

#[test]
fn schema_parses_comma_list_and_rejects_empty() {
  let schema = FlagSchema::parse_list("a, b ,,c").expect("schema");
  assert_eq!(schema.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
  assert!(FlagSchema::parse_list(" , ").is_err());
}

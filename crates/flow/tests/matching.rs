use chrono::{DateTime, TimeZone, Utc};
use flow::matcher::FlowMatcher;
use flow::resolver::resolve;
use intent_domain::{FlagSchema, FlagSet, FlowStepDefinition, InteractionEvent, MatchedBy, SurfaceId, VisibilityMapping};
use std::collections::BTreeMap;

fn ts(secs: i64) -> DateTime<Utc> {
  Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

#[test]
fn step_matches_on_path_and_action() {
  let steps = vec![FlowStepDefinition::with_action("/savings", "click", ["exploredSavings"])];
  let hit = InteractionEvent::new("/savings", "click", ts(1));
  let wrong_path = InteractionEvent::new("/loans", "click", ts(2));

  let batch = FlowMatcher::new().match_batch(&[hit], &steps);
  assert!(batch.flags.contains("exploredSavings"));
  assert_eq!(batch.matches[0].matched_by, MatchedBy::Both);

  let batch = FlowMatcher::new().match_batch(&[wrong_path], &steps);
  assert!(batch.is_empty());
  assert!(batch.matches.is_empty());
}

#[test]
fn batch_flags_are_the_union_of_all_matches() {
  let steps = vec![FlowStepDefinition::with_event("/calc", "hover", ["viewedCalculator"]),
                   FlowStepDefinition::with_event("/calc", "hover", ["viewedCalculator", "viewedHome"]),
                   FlowStepDefinition::with_event("/loans", "click", ["clickedLoans"])];
  let events = vec![InteractionEvent::new("/calc", "hover", ts(1)),
                    InteractionEvent::new("/loans", "click", ts(2)),
                    InteractionEvent::new("/loans", "scroll", ts(3))];
  let batch = FlowMatcher::new().match_batch(&events, &steps);
  let flags: Vec<&str> = batch.flags.iter().map(String::as_str).collect();
  assert_eq!(flags, vec!["clickedLoans", "viewedCalculator", "viewedHome"]);
  assert_eq!(batch.matches.len(), 3);
  assert_eq!(batch.matches[0].matched_by, MatchedBy::Event);
}

#[test]
fn empty_event_name_never_matches() {
  let steps = vec![FlowStepDefinition::with_event("/calc", "hover", ["viewedCalculator"])];
  let batch = FlowMatcher::new().match_batch(&[InteractionEvent::new("/calc", "", ts(1))], &steps);
  assert!(batch.is_empty());
}

#[test]
fn eligibility_uses_and_semantics() {
  let mapping = VisibilityMapping::new().with(SurfaceId::BottomCard, &["exploredSavings", "viewedCalculator"]);
  let mut flags = FlagSet::from_schema(&FlagSchema::default());

  flags.apply(["exploredSavings"]);
  let decision = resolve(&flags, &mapping, &BTreeMap::new());
  assert!(!decision.is_eligible(SurfaceId::BottomCard));
  assert!(decision.target.is_none());

  flags.apply(["viewedCalculator"]);
  let decision = resolve(&flags, &mapping, &BTreeMap::new());
  assert!(decision.is_eligible(SurfaceId::BottomCard));
  assert_eq!(decision.target, Some(SurfaceId::BottomCard));
}

#[test]
fn surfaces_without_requirements_are_never_eligible() {
  let mut flags = FlagSet::from_schema(&FlagSchema::default());
  flags.apply(intent_domain::DEFAULT_FLAGS);
  let decision = resolve(&flags, &VisibilityMapping::new(), &BTreeMap::new());
  assert!(!decision.is_eligible(SurfaceId::BottomCard));
  assert!(!decision.is_eligible(SurfaceId::CenteredModal));
  assert!(decision.target.is_none());
}

#[test]
fn bottom_card_wins_when_both_surfaces_are_eligible() {
  let mapping = VisibilityMapping::new().with(SurfaceId::BottomCard, &["viewedHome"])
                                        .with(SurfaceId::CenteredModal, &["viewedHome"]);
  let mut flags = FlagSet::from_schema(&FlagSchema::default());
  flags.apply(["viewedHome"]);
  let mut content = BTreeMap::new();
  content.insert(SurfaceId::BottomCard, intent_domain::ComponentContent::new("Hola", "", "/x"));
  let decision = resolve(&flags, &mapping, &content);
  assert!(decision.is_eligible(SurfaceId::CenteredModal));
  assert_eq!(decision.target, Some(SurfaceId::BottomCard));
  assert_eq!(decision.content.map(|c| c.text), Some("Hola".to_string()));
}

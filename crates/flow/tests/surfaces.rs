use flow::errors::FlowError;
use flow::resolver::resolve;
use flow::surface::{SurfaceBoard, SurfaceState};
use intent_domain::{ComponentContent, FlagSchema, FlagSet, SurfaceId, VisibilityMapping};
use std::collections::BTreeMap;

fn eligible_bottom_card() -> flow::resolver::VisibilityDecision {
  let mapping = VisibilityMapping::new().with(SurfaceId::BottomCard, &["viewedHome"]);
  let mut flags = FlagSet::from_schema(&FlagSchema::default());
  flags.apply(["viewedHome"]);
  let mut content = BTreeMap::new();
  content.insert(SurfaceId::BottomCard, ComponentContent::new("Hola", "", "/home"));
  resolve(&flags, &mapping, &content)
}

#[test]
fn eligible_surface_is_shown_then_dismissed() {
  let mut board = SurfaceBoard::new();
  assert_eq!(board.state(SurfaceId::BottomCard), SurfaceState::Hidden);

  let decision = eligible_bottom_card();
  assert_eq!(board.present(&decision), Some(SurfaceId::BottomCard));
  assert_eq!(board.state(SurfaceId::BottomCard), SurfaceState::Shown);
  assert_eq!(board.slot(SurfaceId::BottomCard).and_then(|s| s.content.as_ref()).map(|c| c.text.as_str()),
             Some("Hola"));

  board.dismiss(SurfaceId::BottomCard).expect("dismiss");
  assert_eq!(board.state(SurfaceId::BottomCard), SurfaceState::Dismissed);

  // eligibility does not bring a dismissed surface back
  assert_eq!(board.present(&decision), None);
  assert_eq!(board.state(SurfaceId::BottomCard), SurfaceState::Dismissed);
}

#[test]
fn only_shown_surfaces_can_be_dismissed() {
  let mut board = SurfaceBoard::new();
  let err = board.dismiss(SurfaceId::CenteredModal).unwrap_err();
  assert!(matches!(err,
                   FlowError::InvalidTransition { surface: SurfaceId::CenteredModal,
                                                  from: SurfaceState::Hidden,
                                                  to: SurfaceState::Dismissed }));
  assert!(board.deliver(SurfaceId::BottomCard, None).is_err());
}

#[test]
fn forced_surface_blocks_flag_presentation_until_dismissed() {
  let mut board = SurfaceBoard::new();
  board.force_open(SurfaceId::CenteredModal, ComponentContent::new("Oferta", "", "/o"));
  assert_eq!(board.forced(), Some(SurfaceId::CenteredModal));

  let decision = eligible_bottom_card();
  assert_eq!(board.present(&decision), None);
  assert_eq!(board.state(SurfaceId::BottomCard), SurfaceState::Eligible);

  board.dismiss(SurfaceId::CenteredModal).expect("dismiss");
  assert_eq!(board.forced(), None);
  assert_eq!(board.present(&decision), Some(SurfaceId::BottomCard));
}

#[test]
fn a_new_forced_surface_supersedes_the_previous_one() {
  let mut board = SurfaceBoard::new();
  board.force_open(SurfaceId::BottomCard, ComponentContent::new("a", "", ""));
  board.force_open(SurfaceId::CenteredModal, ComponentContent::new("b", "", ""));
  assert_eq!(board.state(SurfaceId::BottomCard), SurfaceState::Dismissed);
  assert_eq!(board.state(SurfaceId::CenteredModal), SurfaceState::Shown);
  assert_eq!(board.shown(), vec![SurfaceId::CenteredModal]);
}

#[test]
fn error_indicator_leaves_shown_surfaces_alone() {
  let mut board = SurfaceBoard::new();
  board.force_open(SurfaceId::BottomCard, ComponentContent::new("a", "", ""));
  board.report_error("backend unreachable");
  assert_eq!(board.error(), Some("backend unreachable"));
  assert_eq!(board.state(SurfaceId::BottomCard), SurfaceState::Shown);
  board.dismiss_error();
  assert!(board.error().is_none());
}

#[test]
fn override_replaces_a_surface_shown_by_eligibility() {
  let mut board = SurfaceBoard::new();
  assert_eq!(board.present(&eligible_bottom_card()), Some(SurfaceId::BottomCard));

  board.force_open(SurfaceId::CenteredModal, ComponentContent::new("Oferta", "", "/o"));
  assert_eq!(board.shown(), vec![SurfaceId::CenteredModal]);
  assert_eq!(board.state(SurfaceId::BottomCard), SurfaceState::Dismissed);
  assert_eq!(board.forced(), Some(SurfaceId::CenteredModal));
}

#[test]
fn override_of_the_shown_surface_replaces_its_content() {
  let mut board = SurfaceBoard::new();
  board.present(&eligible_bottom_card());
  board.force_open(SurfaceId::BottomCard, ComponentContent::new("Nuevo", "", "/n"));
  assert_eq!(board.shown(), vec![SurfaceId::BottomCard]);
  let slot = board.slot(SurfaceId::BottomCard).expect("slot");
  assert!(slot.forced);
  assert_eq!(slot.content.as_ref().map(|c| c.text.as_str()), Some("Nuevo"));
}

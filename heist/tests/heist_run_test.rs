
use heist::{HeistConfig, RoomPlan, RoomState};
use test_helpers::{assert_crossing_laws, run_heist};

#[test]
fn test_default_heist_terminates_and_conserves_canvases() {
    let config = HeistConfig::default().with_seed(2024);
    let (summary, reporter) = run_heist(config);

    let total: u32 = summary.rooms.iter().map(|room| room.total).sum();
    assert_eq!(summary.canvases_collected, summary.successful_extractions);
    assert_eq!(summary.canvases_collected, total);
    assert!(summary.rooms.iter().all(|room| room.emptied && room.remaining == 0));

    let held = reporter.appraisals().iter().filter(|a| a.canvas).count() as u32;
    assert_eq!(held, summary.canvases_collected);
    assert_eq!(reporter.totals(), vec![summary.canvases_collected]);
}

#[test]
fn test_every_hand_in_is_appraised_once() {
    let config = HeistConfig::default().with_ordinary_thieves(9).with_seed(7);
    let (summary, reporter) = run_heist(config);

    let appraisals = reporter.appraisals();
    let hand_ins: usize = summary.excursions_per_thief.iter().sum();
    assert_eq!(appraisals.len(), hand_ins);

    for (thief, &excursions) in summary.excursions_per_thief.iter().enumerate() {
        let appraised = appraisals.iter().filter(|a| a.thief == thief).count();
        assert_eq!(appraised, excursions, "thief {}", thief);
    }

    // one excursion log per party outing, each with a full party
    assert_eq!(summary.excursions.len() * 3, hand_ins);
}

#[test]
fn test_crossing_order_laws_hold_for_every_excursion() {
    let config = HeistConfig::default()
        .with_ordinary_thieves(12)
        .with_displacement(1..=3)
        .with_seed(99);
    let (summary, _) = run_heist(config);

    assert!(!summary.excursions.is_empty());
    assert_crossing_laws(&summary);
}

#[test]
fn test_one_room_two_canvases_scenario() {
    let config = HeistConfig::default()
        .with_ordinary_thieves(6)
        .with_rooms(RoomPlan::Fixed(vec![2]))
        .with_success_probability(1.0)
        .with_seed(1);
    let (summary, reporter) = run_heist(config);

    let appraisals = reporter.appraisals();
    assert_eq!(appraisals.iter().filter(|a| a.canvas).count(), 2);
    assert_eq!(summary.canvases_collected, 2);
    assert!(summary.rooms[0].emptied);

    // the second canvas empties the room, and nothing after it is FREE
    let second_canvas = appraisals
        .iter()
        .filter(|a| a.canvas)
        .nth(1)
        .expect("two canvases");
    assert_eq!(second_canvas.state, RoomState::Empty);
    assert_eq!(reporter.tokens().last(), Some(&"EMPTY"));

    // a single excursion strips the room
    assert_eq!(summary.excursions.len(), 1);
    assert_eq!(appraisals.len(), 3);
    assert_eq!(reporter.totals(), vec![2]);
}

#[test]
fn test_last_canvas_reports_empty_not_free() {
    let config = HeistConfig::default()
        .with_ordinary_thieves(3)
        .with_rooms(RoomPlan::Fixed(vec![1]))
        .with_success_probability(1.0)
        .with_seed(5);
    let (_, reporter) = run_heist(config);

    assert_eq!(reporter.tokens(), vec!["EMPTY", "EMPTY", "EMPTY"]);
    assert_eq!(reporter.count(RoomState::Free), 0);
    assert!(reporter.appraisals()[2].last_of_party);
}

#[test]
fn test_single_member_parties() {
    let config = HeistConfig::default()
        .with_ordinary_thieves(3)
        .with_party_size(1)
        .with_rooms(RoomPlan::Fixed(vec![3, 2]))
        .with_seed(11);
    let (summary, reporter) = run_heist(config);

    assert_eq!(summary.canvases_collected, 5);
    assert_crossing_laws(&summary);
    assert!(summary.excursions.iter().all(|log| log.inbound.len() == 1));
    // with one seat, every appraisal closes its party
    assert!(reporter.appraisals().iter().all(|a| a.last_of_party));
}

#[test]
fn test_low_success_probability_still_terminates() {
    let config = HeistConfig::default()
        .with_ordinary_thieves(6)
        .with_rooms(RoomPlan::Fixed(vec![6, 4, 5]))
        .with_success_probability(0.05)
        .with_seed(3);
    let (summary, reporter) = run_heist(config);

    assert_eq!(summary.canvases_collected, 15);
    assert!(reporter.count(RoomState::Busy) + reporter.count(RoomState::Free) > 0);
}

#[test]
fn test_room_without_canvases() {
    let config = HeistConfig::default()
        .with_ordinary_thieves(3)
        .with_rooms(RoomPlan::Fixed(vec![0, 2]))
        .with_success_probability(1.0)
        .with_seed(8);
    let (summary, reporter) = run_heist(config);

    assert_eq!(summary.canvases_collected, 2);
    assert!(summary.rooms.iter().all(|room| room.emptied));
    // the empty room is only discovered by visiting it
    assert!(summary.excursions.iter().any(|log| log.room == 0));
    assert_eq!(reporter.totals(), vec![2]);
}

#[test]
fn test_leftover_thieves_stay_idle() {
    // 7 thieves make two parties of three; one thief never leaves
    let config = HeistConfig::default().with_ordinary_thieves(7).with_seed(21);
    let (summary, _) = run_heist(config);

    assert_eq!(summary.excursions_per_thief.len(), 7);
    let hand_ins: usize = summary.excursions_per_thief.iter().sum();
    assert_eq!(hand_ins, summary.excursions.len() * 3);
    assert_eq!(summary.canvases_collected, summary.successful_extractions);
}

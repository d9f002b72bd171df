use futures::future::join_all;
use oneanddone::db::init_db;
use oneanddone::engine::{earnings, expected_value};
use oneanddone::error::ErrorKind;
use oneanddone::feed::{CandidateRecord, EventRecord, MockSeasonFeed};
use oneanddone::{
    CandidateId, Decimal, EventId, FixedClock, LedgerError, Repository, Season, StandingsMode,
    Tier,
};
use chrono::NaiveDate;
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;

struct TestSeason {
    season: Season,
    clock: Arc<FixedClock>,
    _temp: TempDir,
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Six weekly events from 2025-01-02. Week 5 is the 1.5x event that opens segment Q2.
fn schedule() -> Vec<EventRecord> {
    (1..=6)
        .map(|week: i64| {
            let start_date = day("2025-01-02") + chrono::Duration::days(7 * (week - 1));
            EventRecord {
                id: EventId::new(500 + week),
                name: format!("Week {} Open", week),
                start_date,
                end_date: start_date + chrono::Duration::days(3),
                purse: Decimal::from_units(10_000_000),
                multiplier: if week == 5 {
                    Decimal::from_str("1.5").unwrap()
                } else {
                    Decimal::one()
                },
                segment: if week < 5 { "Q1" } else { "Q2" }.to_string(),
                event_type: if week == 5 { "signature" } else { "regular" }.to_string(),
                is_completed: false,
            }
        })
        .collect()
}

fn field() -> Vec<CandidateRecord> {
    [
        ("Scottie Scheffler", Some(1)),
        ("Xander Schauffele", Some(2)),
        ("Collin Morikawa", Some(5)),
        ("Sahith Theegala", Some(22)),
        ("Akshay Bhatia", Some(48)),
        ("Qualifier", None),
    ]
    .into_iter()
    .map(|(name, rank)| CandidateRecord {
        name: name.to_string(),
        rank,
        tier: None,
    })
    .collect()
}

async fn setup(mode: StandingsMode) -> TestSeason {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));
    let clock = Arc::new(FixedClock::new(day("2025-01-01")));
    let season = Season::new(repo, clock.clone(), mode);

    let feed = MockSeasonFeed::new()
        .with_events(schedule())
        .with_candidates(field());
    season.sync(&feed).await.unwrap();

    TestSeason {
        season,
        clock,
        _temp: temp_dir,
    }
}

async fn candidate(season: &Season, name: &str) -> CandidateId {
    season
        .candidates
        .by_name(name)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("candidate {} not loaded", name))
        .id
}

#[test]
fn test_payout_reference_figures() {
    let ten_million = Decimal::from_units(10_000_000);
    assert_eq!(
        earnings(Some(1), ten_million, Decimal::one()).unwrap(),
        Decimal::from_units(1_800_000)
    );
    assert_eq!(
        earnings(Some(20), ten_million, Decimal::from_str("1.5").unwrap()).unwrap(),
        Decimal::from_units(217_500)
    );
    assert_eq!(earnings(Some(71), ten_million, Decimal::one()).unwrap(), Decimal::zero());
    assert_eq!(
        earnings(None, Decimal::from_units(5_000_000), Decimal::one()).unwrap(),
        Decimal::zero()
    );
}

#[test]
fn test_ev_dominance_across_tiers() {
    let purse = Decimal::from_units(9_000_000);
    let evs: Vec<Decimal> = Tier::ALL
        .iter()
        .map(|tier| expected_value(*tier, purse, Decimal::one()).unwrap())
        .collect();
    assert!(evs.windows(2).all(|pair| pair[0] > pair[1]), "{:?}", evs);
}

#[tokio::test]
async fn test_reserve_then_commit_promotes_reservation() {
    let t = setup(StandingsMode::Live).await;
    let x = candidate(&t.season, "Collin Morikawa").await;

    t.season.create_reservation(x, 5).await.unwrap();
    assert_eq!(t.season.list_reservations().await.unwrap().len(), 1);

    let week5 = t.season.events.by_week(5).await.unwrap();
    let commitment = t.season.commit(week5.id, x).await.unwrap();
    assert_eq!(commitment.event_id, week5.id);

    assert!(t.season.list_reservations().await.unwrap().is_empty());
    let stored = t.season.candidates.get(x).await.unwrap();
    assert_eq!(stored.committed_event_id, Some(week5.id));
    assert_eq!(stored.committed_week, Some(5));
}

#[tokio::test]
async fn test_reserving_committed_candidate_writes_nothing() {
    let t = setup(StandingsMode::Live).await;
    let x = candidate(&t.season, "Scottie Scheffler").await;
    let y = candidate(&t.season, "Xander Schauffele").await;
    t.season.create_reservation(y, 3).await.unwrap();
    t.season.commit(EventId::new(502), x).await.unwrap();

    let err = t.season.create_reservation(x, 3).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::CandidateAlreadyCommitted { week: Some(2), .. }
    ));

    // Y still holds week 3; nothing was evicted.
    let reservations = t.season.list_reservations().await.unwrap();
    assert_eq!(reservations.len(), 1);
    assert_eq!(reservations[0].reservation.candidate_id, y);
}

#[tokio::test]
async fn test_duplicate_commit_leaves_candidate_untouched() {
    let t = setup(StandingsMode::Live).await;
    let x = candidate(&t.season, "Scottie Scheffler").await;
    let y = candidate(&t.season, "Xander Schauffele").await;
    t.season.commit(EventId::new(501), x).await.unwrap();

    let err = t.season.commit(EventId::new(501), y).await.unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateCommitment(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let y_after = t.season.candidates.get(y).await.unwrap();
    assert!(y_after.committed_event_id.is_none());
    assert_eq!(t.season.list_commitments().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_commitment_reference_never_changes() {
    let t = setup(StandingsMode::Live).await;
    let x = candidate(&t.season, "Sahith Theegala").await;
    t.season.commit(EventId::new(501), x).await.unwrap();

    for event in [502, 503, 504] {
        assert!(t.season.commit(EventId::new(event), x).await.is_err());
    }
    let stored = t.season.candidates.get(x).await.unwrap();
    assert_eq!(stored.committed_event_id, Some(EventId::new(501)));
}

#[tokio::test]
async fn test_scoring_scenario_on_multiplied_purse() {
    let t = setup(StandingsMode::Incremental).await;
    let x = candidate(&t.season, "Collin Morikawa").await;
    let earlier = candidate(&t.season, "Akshay Bhatia").await;

    // Seed Q2 so the increment is measured against an existing row.
    let c6 = t.season.commit(EventId::new(506), earlier).await.unwrap();
    t.season.record_result(c6.id, Some(40), None).await.unwrap();
    let before = t.season.list_segment_standings().await.unwrap();
    let q2_before = before.iter().find(|s| s.segment == "Q2").unwrap().clone();

    let c5 = t.season.commit(EventId::new(505), x).await.unwrap();
    let scored = t.season.record_result(c5.id, Some(3), None).await.unwrap();
    assert_eq!(scored.earnings, Decimal::from_units(1_035_000));

    let after = t.season.list_segment_standings().await.unwrap();
    let q2_after = after.iter().find(|s| s.segment == "Q2").unwrap();
    assert_eq!(q2_after.events_completed, q2_before.events_completed + 1);
    assert_eq!(
        q2_after.total,
        q2_before.total + Decimal::from_units(1_035_000)
    );
    assert_eq!(q2_after.best_finish, Some(3));
}

#[tokio::test]
async fn test_replayed_results() {
    let t = setup(StandingsMode::Incremental).await;
    let x = candidate(&t.season, "Scottie Scheffler").await;
    let c = t.season.commit(EventId::new(501), x).await.unwrap();

    assert!(t.season.record_result(c.id, Some(1), None).await.unwrap().applied);
    let replay = t.season.record_result(c.id, Some(1), None).await.unwrap();
    assert!(!replay.applied);
    assert_eq!(replay.earnings, Decimal::from_units(1_800_000));

    let err = t.season.record_result(c.id, Some(2), None).await.unwrap_err();
    assert!(matches!(err, LedgerError::ResultAlreadyRecorded(_)));

    let standings = t.season.list_segment_standings().await.unwrap();
    assert_eq!(standings.len(), 1);
    assert_eq!(standings[0].events_completed, 1);
    assert_eq!(standings[0].total, Decimal::from_units(1_800_000));
    assert_eq!(standings[0].best_finish, Some(1));
}

#[tokio::test]
async fn test_live_and_incremental_standings_agree() {
    let t = setup(StandingsMode::Incremental).await;
    let results = [
        ("Scottie Scheffler", 501, Some(1)),
        ("Xander Schauffele", 502, None),
        ("Collin Morikawa", 503, Some(22)),
        ("Sahith Theegala", 505, Some(9)),
        ("Akshay Bhatia", 506, Some(70)),
    ];
    for (name, event, finish) in results {
        let id = candidate(&t.season, name).await;
        let c = t.season.commit(EventId::new(event), id).await.unwrap();
        t.season.record_result(c.id, finish, None).await.unwrap();
    }

    let live = t.season.standings.live().await.unwrap();
    let incremental = t.season.standings.incremental().await.unwrap();
    assert_eq!(live, incremental);

    let total: Decimal = live.iter().map(|s| s.total).sum();
    assert_eq!(total, t.season.ledger.season_total().await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_commits_to_one_event() {
    let names = [
        "Scottie Scheffler",
        "Xander Schauffele",
        "Collin Morikawa",
        "Sahith Theegala",
        "Akshay Bhatia",
    ];

    for _round in 0..5 {
        let t = setup(StandingsMode::Live).await;
        let mut ids = Vec::new();
        for name in names {
            ids.push(candidate(&t.season, name).await);
        }

        let attempts = ids.iter().map(|id| {
            let season = t.season.clone();
            let id = *id;
            tokio::spawn(async move { season.commit(EventId::new(503), id).await })
        });
        let outcomes: Vec<_> = join_all(attempts)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        let successes = outcomes.iter().filter(|o| o.is_ok()).count();
        assert_eq!(successes, 1);
        for outcome in outcomes.iter().filter_map(|o| o.as_ref().err()) {
            assert_eq!(outcome.kind(), ErrorKind::Conflict, "{:?}", outcome);
            assert!(
                matches!(outcome, LedgerError::DuplicateCommitment(id) if *id == EventId::new(503)),
                "{:?}",
                outcome
            );
        }

        assert_eq!(t.season.list_commitments().await.unwrap().len(), 1);
        let committed = t
            .season
            .list_candidates()
            .await
            .unwrap()
            .into_iter()
            .filter(|c| c.is_committed())
            .count();
        assert_eq!(committed, 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_commits_of_one_candidate() {
    for _round in 0..5 {
        let t = setup(StandingsMode::Live).await;
        let x = candidate(&t.season, "Scottie Scheffler").await;

        let attempts = [501, 502, 503, 504].map(|event| {
            let season = t.season.clone();
            tokio::spawn(async move { season.commit(EventId::new(event), x).await })
        });
        let outcomes: Vec<_> = join_all(attempts)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        let winner = outcomes
            .iter()
            .filter_map(|o| o.as_ref().ok())
            .collect::<Vec<_>>();
        assert_eq!(winner.len(), 1);
        let won_event = winner[0].event_id;
        let won_week = t.season.events.get(won_event).await.unwrap().week;

        for outcome in outcomes.iter().filter_map(|o| o.as_ref().err()) {
            assert_eq!(outcome.kind(), ErrorKind::Conflict, "{:?}", outcome);
            assert!(
                matches!(
                    outcome,
                    LedgerError::CandidateAlreadyCommitted { week: Some(w), .. } if *w == won_week
                ),
                "{:?}",
                outcome
            );
        }
        assert_eq!(t.season.list_commitments().await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_elapsed_weeks_reject_plans_and_commits() {
    let t = setup(StandingsMode::Live).await;
    let x = candidate(&t.season, "Qualifier").await;
    t.clock.set(day("2025-01-13"));

    assert!(matches!(
        t.season.create_reservation(x, 1).await,
        Err(LedgerError::EventCompleted(_))
    ));
    assert!(matches!(
        t.season.commit(EventId::new(502), x).await,
        Err(LedgerError::EventCompleted(_))
    ));

    let current = t.season.current_event().await.unwrap();
    assert_eq!(current.week, 3);
    t.season.commit(current.id, x).await.unwrap();
}

#[tokio::test]
async fn test_week_bijection_under_reshuffling() {
    let t = setup(StandingsMode::Live).await;
    let a = candidate(&t.season, "Scottie Scheffler").await;
    let b = candidate(&t.season, "Xander Schauffele").await;

    t.season.create_reservation(a, 2).await.unwrap();
    t.season.create_reservation(b, 3).await.unwrap();
    t.season.create_reservation(a, 3).await.unwrap();
    t.season.create_reservation(b, 2).await.unwrap();

    let reservations = t.season.list_reservations().await.unwrap();
    let pairs: Vec<(CandidateId, u32)> = reservations
        .iter()
        .map(|r| (r.reservation.candidate_id, r.reservation.week))
        .collect();
    assert_eq!(pairs, vec![(b, 2), (a, 3)]);

    assert_eq!(t.season.clear_reservation(Some(a), None).await.unwrap(), 1);
    assert_eq!(t.season.clear_reservation(None, Some(2)).await.unwrap(), 1);
    assert!(t.season.list_reservations().await.unwrap().is_empty());
}

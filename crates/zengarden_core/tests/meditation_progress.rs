use std::sync::Arc;
use zengarden_core::clock::DAY_MS;
use zengarden_core::db::{open_db, open_db_in_memory, seed_builtin_catalog};
use zengarden_core::repo::meditation_repo::{
    InMemoryMeditationRepository, MeditationRepository, SqliteMeditationRepository,
};
use zengarden_core::{
    format_clock, ManualClock, MeditationService, MeditationServiceError, PlayerEvent,
    SessionPlayer, TotalStats,
};

const NOW: i64 = 1_792_146_600_000;

fn with_both_backends(check: impl Fn(&MeditationService<&dyn MeditationRepository>, &ManualClock)) {
    let clock = Arc::new(ManualClock::new(NOW));
    let memory = InMemoryMeditationRepository::new();
    check(
        &MeditationService::with_clock(&memory as &dyn MeditationRepository, clock.clone()),
        &*clock,
    );

    let clock = Arc::new(ManualClock::new(NOW));
    let conn = open_db_in_memory().unwrap();
    seed_builtin_catalog(&conn).unwrap();
    let sqlite = SqliteMeditationRepository::try_new(&conn).unwrap();
    check(
        &MeditationService::with_clock(&sqlite as &dyn MeditationRepository, clock.clone()),
        &*clock,
    );
}

#[test]
fn completing_session_twice_accumulates_time() {
    with_both_backends(|service, _| {
        let session = service.get_by_id(1).unwrap();
        assert_eq!(session.duration_secs, 300);

        service.update_progress(session.id, session.duration_secs).unwrap();
        let progress = service
            .update_progress(session.id, session.duration_secs)
            .unwrap();
        assert_eq!(progress.completed_sessions, 2);
        assert_eq!(progress.total_time_secs, 600);

        let totals = service.get_total_stats().unwrap();
        assert_eq!(
            totals,
            TotalStats {
                total_sessions: 2,
                total_minutes: 10,
                streak: 1,
            }
        );
    });
}

#[test]
fn streak_breaks_on_gap() {
    with_both_backends(|service, clock| {
        clock.set(NOW - 3 * DAY_MS);
        service.update_progress(4, 1200).unwrap();
        clock.set(NOW - DAY_MS);
        service.update_progress(2, 600).unwrap();
        clock.set(NOW);
        service.update_progress(1, 300).unwrap();

        assert_eq!(service.calculate_streak().unwrap(), 2);
    });
}

#[test]
fn streak_is_zero_without_completion_today() {
    with_both_backends(|service, clock| {
        clock.set(NOW - DAY_MS);
        service.update_progress(1, 300).unwrap();
        clock.set(NOW);
        assert_eq!(service.calculate_streak().unwrap(), 0);
    });
}

#[test]
fn favorites_only_include_completed_sessions() {
    with_both_backends(|service, _| {
        assert!(service.get_favorites(3).unwrap().is_empty());
        service.update_progress(5, 1800).unwrap();
        service.update_progress(3, 900).unwrap();
        service.update_progress(3, 900).unwrap();

        let titles: Vec<String> = service
            .get_favorites(3)
            .unwrap()
            .into_iter()
            .map(|session| session.title)
            .collect();
        assert_eq!(titles, vec!["Deep Focus", "Open Awareness"]);
    });
}

#[test]
fn unknown_session_and_bad_duration_are_rejected() {
    with_both_backends(|service, _| {
        assert!(matches!(
            service.update_progress(77, 300),
            Err(MeditationServiceError::SessionNotFound(77))
        ));
        assert!(matches!(
            service.update_progress(1, 0),
            Err(MeditationServiceError::Validation(_))
        ));
        assert_eq!(service.get_total_stats().unwrap().total_sessions, 0);
    });
}

#[test]
fn completions_survive_reopening_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("progress.db");
    let clock = Arc::new(ManualClock::new(NOW));

    {
        let conn = open_db(&path).unwrap();
        seed_builtin_catalog(&conn).unwrap();
        let repo = SqliteMeditationRepository::try_new(&conn).unwrap();
        MeditationService::with_clock(repo, clock.clone())
            .update_progress(2, 600)
            .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo = SqliteMeditationRepository::try_new(&conn).unwrap();
    let service = MeditationService::with_clock(repo, clock);
    assert_eq!(service.get_progress(2).unwrap().completed_sessions, 1);
}

#[test]
fn player_drives_completion_into_progress() {
    with_both_backends(|service, _| {
        let session = service.get_by_id(1).unwrap();
        let mut player = SessionPlayer::for_session(&session).unwrap();
        player.toggle_play();
        player.seek_fraction(0.5);
        assert_eq!(format_clock(player.remaining_secs()), "2:30");

        let mut events = Vec::new();
        for _ in 0..400 {
            if let Some(event) = player.tick() {
                events.push(event);
            }
        }
        assert_eq!(events, vec![PlayerEvent::Completed { duration_secs: 300 }]);
        assert!(!player.is_playing());

        for PlayerEvent::Completed { duration_secs } in events {
            service.update_progress(session.id, duration_secs).unwrap();
        }
        assert_eq!(service.get_progress(session.id).unwrap().total_time_secs, 300);
    });
}

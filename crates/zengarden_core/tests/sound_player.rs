use std::sync::Arc;
use zengarden_core::db::{open_db_in_memory, seed_builtin_catalog};
use zengarden_core::repo::sound_repo::{
    InMemorySoundRepository, SoundRepository, SqliteSoundRepository,
};
use zengarden_core::{ManualClock, SoundService, SoundServiceError};

fn with_both_backends(check: impl Fn(&SoundService<&dyn SoundRepository>)) {
    let clock = Arc::new(ManualClock::new(1_000));
    let memory = InMemorySoundRepository::new();
    check(&SoundService::with_clock(&memory as &dyn SoundRepository, clock.clone()));

    let conn = open_db_in_memory().unwrap();
    seed_builtin_catalog(&conn).unwrap();
    let sqlite = SqliteSoundRepository::try_new(&conn).unwrap();
    check(&SoundService::with_clock(&sqlite as &dyn SoundRepository, clock));
}

#[test]
fn catalog_is_listed_by_id_and_filtered_by_category() {
    with_both_backends(|service| {
        let ids: Vec<i64> = service.get_all().unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        let nature = service.get_by_category("nature").unwrap();
        assert!(!nature.is_empty());
        assert!(nature.iter().all(|sound| sound.category == "Nature"));
    });
}

#[test]
fn only_one_sound_plays_at_a_time() {
    with_both_backends(|service| {
        service.play(1).unwrap();
        let state = service.play(6).unwrap();
        assert_eq!(state.currently_playing, Some(6));
        assert_eq!(service.currently_playing().unwrap().unwrap().name, "Crackling Fire");

        assert_eq!(service.toggle(6).unwrap().currently_playing, None);
        assert!(service.currently_playing().unwrap().is_none());
        assert!(matches!(
            service.toggle(99),
            Err(SoundServiceError::SoundNotFound(99))
        ));
    });
}

#[test]
fn clips_carry_length_and_own_level() {
    with_both_backends(|service| {
        let chimes = service.get_by_id(5).unwrap();
        assert_eq!(chimes.duration_secs, Some(240));
        assert_eq!(chimes.volume, Some(0.5));
        let rain = service.get_by_id(1).unwrap();
        assert_eq!(rain.duration_secs, None);
        assert_eq!(rain.volume, None);

        service.set_volume(0.8).unwrap();
        assert!((service.output_level(5).unwrap() - 0.4).abs() < 1e-6);
        assert!((service.output_level(1).unwrap() - 0.8).abs() < 1e-6);
        assert!(matches!(
            service.output_level(99),
            Err(SoundServiceError::SoundNotFound(99))
        ));
    });
}

#[test]
fn mix_uses_known_sounds_in_request_order() {
    with_both_backends(|service| {
        let mix = service.create_mix(&[3, 42, 1], Some("  Evening  ")).unwrap();
        assert_eq!(mix.name, "Evening");
        let ids: Vec<i64> = mix.sounds.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(mix.created_at, 1_000);
    });
}

#[test]
fn favorites_exclude_unpopular_sounds() {
    with_both_backends(|service| {
        let favorites = service.get_favorites().unwrap();
        assert_eq!(favorites.len(), 4);
        assert!(favorites.iter().all(|sound| sound.id != 6));
    });
}

mod tests {
    use embassy_time::Instant;
    use myrtio_audio_strip::color::Rgb;
    use myrtio_audio_strip::effect::{
        ColorWipeEffect, EffectContext, EffectId, EffectRunner, EffectSlot, RainbowEffect,
        RainbowVariant, TickInterval, VolumeShifterEffect,
    };
    use myrtio_audio_strip::loudness::LoudnessState;
    use myrtio_audio_strip::{
        ConfigError, ConfigStore, EffectList, MemoryStore, OutputDriver, StoreError, StoreLayout,
        Strip,
    };

    const LEN: usize = 10;
    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };

    struct NullDriver;

    impl OutputDriver for NullDriver {
        fn write(&mut self, _colors: &[Rgb]) {}
    }

    fn strip() -> Strip<NullDriver, LEN> {
        Strip::new(NullDriver)
    }

    fn ctx(ms: u64) -> EffectContext {
        EffectContext::new(Instant::from_millis(ms), LoudnessState::default())
    }

    fn fast_wipe() -> EffectRunner {
        EffectRunner::new(ColorWipeEffect::new(RED)).with_tick_interval(TickInterval::EveryCall)
    }

    #[test]
    fn test_empty_list_is_a_valid_state() {
        let mut strip = strip();
        let mut list = EffectList::<4>::new();

        list.next_effect(Instant::from_millis(0), &mut strip);
        list.restart(Instant::from_millis(0), &mut strip);
        assert!(list.is_empty());
        assert_eq!(list.current_index(), 0);
        assert!(!list.run(&ctx(0), &mut strip));
        assert!(list.current().is_none());
    }

    #[test]
    fn test_default_list_rotates_once_in_30001_calls() {
        let mut strip = strip();
        let mut list = EffectList::<4>::with_defaults();
        assert_eq!(list.ids().collect::<Vec<_>>(), vec![EffectId::VolumeShifter]);

        list.restart(Instant::from_millis(0), &mut strip);
        let rotations: Vec<u64> = (0..=30_000)
            .filter(|&ms| list.run(&ctx(ms), &mut strip))
            .collect();

        assert_eq!(rotations, vec![30_000]);
        assert_eq!(list.current_index(), 0);
        assert_eq!(list.current().unwrap().loop_count(), 0);
    }

    #[test]
    fn test_rotation_order_wraps_around() {
        let mut strip = strip();
        let mut list = EffectList::<4>::new();
        list.add_effect(fast_wipe()).unwrap();
        list.add_effect(EffectRunner::new(RainbowEffect::new(RainbowVariant::Uniform))
            .with_tick_interval(TickInterval::EveryCall))
            .unwrap();
        list.restart(Instant::from_millis(0), &mut strip);

        let mut order = Vec::new();
        for ms in 0..2_000 {
            if list.run(&ctx(ms), &mut strip) {
                order.push(list.current_index());
            }
        }
        // wipe: 10 steps, rainbow: 256 steps
        assert_eq!(&order[..4], &[1, 0, 1, 0]);
    }

    #[test]
    fn test_add_effect_hands_back_when_full() {
        let mut list = EffectList::<2>::new();
        list.add_effect(fast_wipe()).unwrap();
        list.add_effect(fast_wipe()).unwrap();
        let rejected = list.add_effect(EffectRunner::new(VolumeShifterEffect::endless()));
        assert_eq!(rejected.unwrap_err().id(), EffectId::VolumeShifter);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_remove_effect_keeps_index_valid() {
        let mut strip = strip();
        let mut list = EffectList::<4>::new();
        list.add_effect(fast_wipe()).unwrap();
        list.add_effect(EffectRunner::new(VolumeShifterEffect::endless()))
            .unwrap();
        list.restart(Instant::from_millis(0), &mut strip);
        list.next_effect(Instant::from_millis(0), &mut strip);
        assert_eq!(list.current_index(), 1);

        let removed = list.remove_effect(1).unwrap();
        assert_eq!(removed.id(), EffectId::VolumeShifter);
        assert_eq!(list.current_index(), 0);
        assert!(list.remove_effect(5).is_none());

        list.remove_effect(0);
        assert!(list.is_empty());
        assert!(!list.run(&ctx(1), &mut strip));
    }

    #[test]
    fn test_showcase_list() {
        let list = EffectList::<16>::showcase();
        assert_eq!(
            list.ids().collect::<Vec<_>>(),
            vec![
                EffectId::VolumeShifter,
                EffectId::ColorWipe,
                EffectId::Rainbow,
                EffectId::ColorWipe,
                EffectId::RainbowCycle,
                EffectId::ColorWipe,
                EffectId::TheaterChaseRainbow,
            ]
        );
        assert_eq!(list.get(1).unwrap().tick_interval().as_millis(), 30);
        assert_eq!(list.get(5).unwrap().tick_interval().as_millis(), 10);

        let small = EffectList::<3>::showcase();
        assert_eq!(small.len(), 3);
    }

    #[test]
    fn test_save_then_load_restores_list() {
        let layout = StoreLayout::default();
        let mut store = MemoryStore::new();
        let saved = EffectList::<16>::showcase();
        saved.save_config(&mut store, &layout).unwrap();

        assert_eq!(store.get(layout.root_key), Some(&br#"{"numEffects":7}"#[..]));
        assert!(store.contains_key("/ledEffects/effect6.json"));

        let mut loaded = EffectList::<16>::new();
        assert_eq!(loaded.load_config(&store, &layout).unwrap(), 7);
        for (a, b) in saved.iter().zip(loaded.iter()) {
            assert_eq!(a.slot(), b.slot());
            assert_eq!(a.tick_interval(), b.tick_interval());
            assert_eq!(a.num_loops(), b.num_loops());
        }
    }

    #[test]
    fn test_save_removes_stale_records() {
        let layout = StoreLayout::default();
        let mut store = MemoryStore::new();
        store.insert("/ledEffects/effect5.json", br#"{"effectName":"Rbow"}"#.to_vec());
        store.insert("/ledEffects/notes.txt", b"old".to_vec());
        store.insert("/wifi/config.json", b"{}".to_vec());

        let mut list = EffectList::<4>::new();
        list.add_effect(fast_wipe()).unwrap();
        list.add_effect(fast_wipe()).unwrap();
        list.save_config(&mut store, &layout).unwrap();

        assert_eq!(
            store.keys("/ledEffects/").unwrap(),
            vec![
                "/ledEffects/effect0.json".to_string(),
                "/ledEffects/effect1.json".to_string(),
                "/ledEffects/numEffects.json".to_string(),
            ]
        );
        assert!(store.contains_key("/wifi/config.json"));
    }

    #[test]
    fn test_save_failure_keeps_memory_state() {
        let layout = StoreLayout::default();
        let mut store = MemoryStore::new();
        store.set_available(false);

        let list = EffectList::<16>::showcase();
        let err = list.save_config(&mut store, &layout).unwrap_err();
        assert!(matches!(err, ConfigError::Store(StoreError::Unavailable)));
        assert_eq!(list.len(), 7);
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_root_installs_defaults() {
        let layout = StoreLayout::default();
        let store = MemoryStore::new();
        let mut list = EffectList::<16>::showcase();

        let err = list.load_config(&store, &layout).unwrap_err();
        assert!(matches!(err, ConfigError::Store(StoreError::NotFound)));
        assert_eq!(list.len(), 1);
        assert_eq!(
            list.get(0).unwrap().slot(),
            &EffectSlot::VolumeShifter(VolumeShifterEffect::new(30_000))
        );
    }

    #[test]
    fn test_malformed_root_or_record_installs_defaults() {
        let layout = StoreLayout::default();
        let mut list = EffectList::<16>::new();

        let mut store = MemoryStore::new();
        store.insert(layout.root_key, b"numEffects=2".to_vec());
        assert!(matches!(
            list.load_config(&store, &layout),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(list.ids().collect::<Vec<_>>(), vec![EffectId::VolumeShifter]);

        let mut store = MemoryStore::new();
        store.insert(layout.root_key, br#"{"numEffects":2}"#.to_vec());
        store.insert("/ledEffects/effect0.json", br#"{"effectName":"Rbow"}"#.to_vec());
        assert!(matches!(
            list.load_config(&store, &layout),
            Err(ConfigError::Store(StoreError::NotFound))
        ));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_too_many_effects_installs_defaults() {
        let layout = StoreLayout::default();
        let mut store = MemoryStore::new();
        store.insert(layout.root_key, br#"{"numEffects":20}"#.to_vec());

        let mut list = EffectList::<16>::new();
        assert!(matches!(
            list.load_config(&store, &layout),
            Err(ConfigError::TooManyEffects {
                count: 20,
                capacity: 16
            })
        ));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_unknown_records_are_skipped() {
        let layout = StoreLayout::default();
        let mut store = MemoryStore::new();
        store.insert(layout.root_key, br#"{"numEffects":3}"#.to_vec());
        store.insert("/ledEffects/effect0.json", br#"{"effectName":"Sparkle"}"#.to_vec());
        store.insert("/ledEffects/effect1.json", br#"{"effectName":"RbowCyc"}"#.to_vec());
        store.insert(
            "/ledEffects/effect2.json",
            br#"{"effectName":"VolShift","tEffectLength":1000}"#.to_vec(),
        );

        let mut list = EffectList::<16>::new();
        assert_eq!(list.load_config(&store, &layout).unwrap(), 2);
        assert_eq!(
            list.ids().collect::<Vec<_>>(),
            vec![EffectId::RainbowCycle, EffectId::VolumeShifter]
        );
        assert_eq!(list.get(0).unwrap().num_loops(), 3);
    }

    #[test]
    fn test_record_keys() {
        let layout = StoreLayout::default();
        assert_eq!(layout.record_key(0), "/ledEffects/effect0.json");
        assert_eq!(layout.record_key(12), "/ledEffects/effect12.json");
    }
}

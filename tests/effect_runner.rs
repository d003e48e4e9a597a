mod tests {
    use embassy_time::{Duration, Instant};
    use myrtio_audio_strip::color::{BLACK, Rgb};
    use myrtio_audio_strip::effect::{
        ColorWipeEffect, EffectContext, EffectRunner, TheaterChaseEffect, TickInterval,
        VolumeShifterEffect,
    };
    use myrtio_audio_strip::loudness::LoudnessState;
    use myrtio_audio_strip::{LedStrip, OutputDriver, Strip};

    const LEN: usize = 10;
    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };

    #[derive(Default)]
    struct CountingDriver {
        writes: usize,
    }

    impl OutputDriver for CountingDriver {
        fn write(&mut self, _colors: &[Rgb]) {
            self.writes += 1;
        }
    }

    fn strip() -> Strip<CountingDriver, LEN> {
        Strip::new(CountingDriver::default())
    }

    fn ctx(ms: u64) -> EffectContext {
        EffectContext::new(Instant::from_millis(ms), LoudnessState::default())
    }

    /// Drive a runner every millisecond until it reports finished
    fn finish_time(runner: &mut EffectRunner, strip: &mut Strip<CountingDriver, LEN>) -> u64 {
        runner.pre_effect_reset(true, Instant::from_millis(0), strip);
        for ms in 0..1_000_000 {
            if runner.run(&ctx(ms), strip) {
                return ms;
            }
        }
        panic!("runner never finished");
    }

    #[test]
    fn test_completes_exactly_num_loops_passes() {
        let mut strip = strip();
        let mut runner = EffectRunner::new(ColorWipeEffect::new(RED))
            .with_tick_interval(TickInterval::Every(Duration::from_millis(20)))
            .with_num_loops(3);

        // 3 passes of 10 steps, one step every 20 ms starting at 0
        assert_eq!(finish_time(&mut runner, &mut strip), 29 * 20);
        assert_eq!(runner.loop_count(), 3);
        assert_eq!(strip.driver().writes, 30);
    }

    #[test]
    fn test_num_loops_over_intervals() {
        for (interval, loops) in [(1, 1), (5, 2), (13, 4), (50, 1)] {
            let mut strip = strip();
            let mut runner = EffectRunner::new(TheaterChaseEffect::new(RED, 2))
                .with_tick_interval(TickInterval::Every(Duration::from_millis(interval)))
                .with_num_loops(loops);

            let passes = u64::from(loops);
            assert_eq!(
                finish_time(&mut runner, &mut strip),
                (2 * passes - 1) * interval,
                "interval {interval} loops {loops}"
            );
            assert_eq!(runner.loop_count(), loops);
        }
    }

    #[test]
    fn test_every_call_steps_once_per_call() {
        let mut strip = strip();
        let mut runner = EffectRunner::new(VolumeShifterEffect::endless());
        assert_eq!(runner.tick_interval(), TickInterval::EveryCall);
        runner.pre_effect_reset(true, Instant::from_millis(0), &mut strip);

        for call in 1..=5 {
            // Large jumps in time still give a single step
            assert!(!runner.run(&ctx(call * 10_000), &mut strip));
            assert_eq!(strip.driver().writes, usize::try_from(call).unwrap());
        }

        // Same instant again: nothing is due
        runner.run(&ctx(50_000), &mut strip);
        assert_eq!(strip.driver().writes, 5);
    }

    #[test]
    fn test_interval_not_due_does_nothing() {
        let mut strip = strip();
        let mut runner = EffectRunner::new(ColorWipeEffect::new(RED));
        runner.pre_effect_reset(true, Instant::from_millis(100), &mut strip);

        assert!(!runner.run(&ctx(99), &mut strip));
        assert_eq!(strip.driver().writes, 0);
        assert!(!runner.run(&ctx(100), &mut strip));
        assert_eq!(runner.next_due(), Instant::from_millis(120));
        assert!(!runner.run(&ctx(119), &mut strip));
        assert_eq!(strip.driver().writes, 1);
    }

    #[test]
    fn test_pre_effect_reset_blanks_and_rewinds() {
        let mut strip = strip();
        let mut runner = EffectRunner::new(ColorWipeEffect::new(RED))
            .with_tick_interval(TickInterval::EveryCall)
            .with_num_loops(2);
        runner.pre_effect_reset(true, Instant::from_millis(0), &mut strip);
        for ms in 0..10 {
            runner.run(&ctx(ms), &mut strip);
        }
        assert_eq!(runner.loop_count(), 1);
        assert_eq!(strip.pixel(LEN - 1), Some(RED));

        runner.pre_effect_reset(false, Instant::from_millis(500), &mut strip);
        assert_eq!(strip.pixels(), &[BLACK; LEN]);
        assert_eq!(runner.loop_count(), 1);
        assert_eq!(runner.next_due(), Instant::from_millis(500));

        runner.pre_effect_reset(true, Instant::from_millis(500), &mut strip);
        assert_eq!(runner.loop_count(), 0);
    }

    #[test]
    fn test_settings_are_clamped() {
        let runner = EffectRunner::new(ColorWipeEffect::default())
            .with_num_loops(0)
            .with_tick_interval(TickInterval::Every(Duration::from_millis(0)));
        assert_eq!(runner.num_loops(), 1);
        assert_eq!(
            runner.tick_interval(),
            TickInterval::Every(Duration::from_millis(1))
        );

        let runner = EffectRunner::new(ColorWipeEffect::default()).with_num_loops(255);
        assert_eq!(runner.num_loops(), 254);
    }

    #[test]
    fn test_tick_interval_millis() {
        assert_eq!(TickInterval::from_millis(65_535), TickInterval::EveryCall);
        assert_eq!(
            TickInterval::from_millis(0),
            TickInterval::Every(Duration::from_millis(1))
        );
        assert_eq!(TickInterval::EveryCall.as_millis(), 65_535);
        assert_eq!(TickInterval::from_millis(20).as_millis(), 20);
    }

    #[test]
    fn test_display() {
        let runner = EffectRunner::new(ColorWipeEffect::new(RED));
        assert_eq!(
            runner.to_string(),
            "Color wipe (c:[255,0,0]; tick:20ms; loops:1)"
        );

        let runner = EffectRunner::new(VolumeShifterEffect::new(30_000));
        assert_eq!(
            runner.to_string(),
            "Volume shifter (length:30000ms; tick:every call; loops:1)"
        );
    }
}

use std::time::Duration;

use bevy_ecs::{
    schedule::{ExecutorKind, IntoSystemConfigs, Schedule},
    system::Resource,
    world::World,
};
use chrono::{DateTime, Utc};

/// Length of the frame currently being simulated.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    pub delta: Duration,
}

impl FrameTime {
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

/// The scene world plus the systems that run once per displayed frame.
///
/// Nothing here knows about the display: whoever drives the loop measures
/// the frame delta and calls [`FrameLoop::advance`], which makes it easy to
/// step simulated frames in tests.
pub struct FrameLoop {
    world: World,
    schedule: Schedule,
}

impl FrameLoop {
    pub fn new(mut world: World) -> Self {
        world.init_resource::<FrameTime>();
        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        Self { world, schedule }
    }

    /// Registers systems to run on every frame. Use `.chain()` when their
    /// relative order matters.
    pub fn on_frame<M>(&mut self, systems: impl IntoSystemConfigs<M>) -> &mut Self {
        self.schedule.add_systems(systems);
        self
    }

    pub fn advance(&mut self, delta: Duration) {
        self.world.resource_mut::<FrameTime>().delta = delta;
        self.schedule.run(&mut self.world);
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

/// Measures wall clock time between redraws.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<DateTime<Utc>>,
}

impl FrameClock {
    /// Time since the previous tick; zero on the first tick or if the clock
    /// went backwards.
    pub fn tick(&mut self) -> Duration {
        self.tick_at(Utc::now())
    }

    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Duration {
        let delta = self
            .last
            .map(|last| (now - last).to_std().unwrap_or(Duration::ZERO))
            .unwrap_or(Duration::ZERO);
        self.last = Some(now);
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::system::{Res, ResMut};

    #[derive(Resource, Default)]
    struct Trace(Vec<(u128, &'static str)>);

    fn first(time: Res<FrameTime>, mut trace: ResMut<Trace>) {
        trace.0.push((time.delta.as_millis(), "first"));
    }

    fn second(time: Res<FrameTime>, mut trace: ResMut<Trace>) {
        trace.0.push((time.delta.as_millis(), "second"));
    }

    #[test]
    fn advance_runs_chained_systems_in_order() {
        let mut world = World::new();
        world.init_resource::<Trace>();
        let mut frames = FrameLoop::new(world);
        frames.on_frame((first, second).chain());

        frames.advance(Duration::from_millis(16));
        frames.advance(Duration::from_millis(17));

        let time = *frames.world().resource::<FrameTime>();
        assert_eq!(time.delta, Duration::from_millis(17));
        assert_eq!(
            frames.world().resource::<Trace>().0,
            vec![(16, "first"), (16, "second"), (17, "first"), (17, "second")]
        );
    }

    #[test]
    fn clock_reports_wall_time_between_ticks() {
        let start = Utc::now();
        let mut clock = FrameClock::default();
        assert_eq!(clock.tick_at(start), Duration::ZERO);
        assert_eq!(
            clock.tick_at(start + chrono::Duration::milliseconds(20)),
            Duration::from_millis(20)
        );
        // going backwards clamps rather than failing
        assert_eq!(clock.tick_at(start), Duration::ZERO);
    }
}

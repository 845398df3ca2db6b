use crate::ramp_command::{RampCommand, RampCommandReceiver};
use crate::speed_profile::SpeedProfile;

/// RampExecutor owns a speed profile together with the receiving half of a
/// [`RampCommandQueue`](crate::RampCommandQueue) and advances the profile
/// once per tick.
///
/// The context that calls [`tick`](Self::tick) is the only one touching the
/// profile. Other contexts keep the matching
/// [`RampCommandSender`](crate::RampCommandSender) and never need a borrow
/// of the executor, so no lock sits between the two.
pub struct RampExecutor<'q, P, const N: usize> {
    /// The profile being driven
    profile: P,

    /// Commands waiting for the next tick
    commands: RampCommandReceiver<'q, N>,

    /// Speed returned by the last tick
    speed: i32,

    /// Ticks since the last accepted `Prepare`
    ticks: u32,
}

impl<'q, P, const N: usize> RampExecutor<'q, P, N>
where
    P: SpeedProfile,
{
    /// Creates an executor around `profile` that drains `commands`.
    pub fn new(profile: P, commands: RampCommandReceiver<'q, N>) -> Self {
        Self {
            profile,
            commands,
            speed: 0,
            ticks: 0,
        }
    }

    /// Applies every pending command in submission order, then advances the
    /// profile by exactly one update and returns the new speed.
    pub fn tick(&mut self, current_position: i32) -> i32 {
        while let Some(command) = self.commands.recv() {
            self.apply(command, current_position);
        }
        self.speed = self.profile.update_speed(current_position);
        self.ticks = self.ticks.saturating_add(1);
        self.speed
    }

    /// Halts the profile at once and discards pending commands, without
    /// waiting for the next tick.
    pub fn e_stop(&mut self) {
        let dropped = self.commands.clear();
        if dropped > 0 {
            debug!("e-stop discards {} queued ramp commands", dropped);
        }
        self.profile.e_stop();
        self.speed = 0;
    }

    fn apply(&mut self, command: RampCommand, position: i32) {
        let result = match command {
            RampCommand::Prepare {
                target_speed,
                acceleration,
                update_period,
                speed_factor,
            } => {
                let result = self.profile.prepare_rotation(
                    position,
                    target_speed,
                    acceleration,
                    update_period,
                    speed_factor,
                );
                if result.is_ok() {
                    self.ticks = 0;
                }
                result
            }
            RampCommand::OverrideSpeed(factor) => self.profile.override_speed(factor),
            RampCommand::OverrideAcceleration(factor) => {
                self.profile.override_acceleration(factor);
                Ok(())
            }
            RampCommand::Stop => {
                self.profile.initiate_stopping(position);
                Ok(())
            }
            RampCommand::EStop => {
                self.profile.e_stop();
                Ok(())
            }
        };
        if let Err(err) = result {
            warn!("ramp command dropped: {}", err);
        }
    }

    // -----------------------------------------------------------------
    //  Getter methods
    // -----------------------------------------------------------------

    /// Speed returned by the last tick.
    pub fn speed(&self) -> i32 {
        self.speed
    }

    /// Number of ticks since the last accepted `Prepare`.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn is_moving(&self) -> bool {
        self.profile.is_moving()
    }

    /// Number of commands waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.commands.len()
    }

    pub fn profile(&self) -> &P {
        &self.profile
    }

    pub fn into_inner(self) -> P {
        self.profile
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::lin_speed::LinSpeedRamp;
    use crate::ramp_command::RampCommandQueue;
    use crate::ramp_error::RampError;
    use crate::ramp_units::{Acceleration, UpdatePeriod};

    fn prepare_cmd(target: i32) -> RampCommand {
        RampCommand::prepare(
            target,
            Acceleration::per_sec2(500.0).unwrap(),
            UpdatePeriod::from_micros(1000).unwrap(),
        )
    }

    #[test]
    fn commands_apply_before_update() {
        let mut queue = RampCommandQueue::<4>::new();
        let (mut tx, rx) = queue.split();
        let mut exec = RampExecutor::new(LinSpeedRamp::new(), rx);
        tx.submit(prepare_cmd(1000)).unwrap();
        assert_eq!(exec.pending(), 1);
        assert!(!exec.is_moving());

        exec.tick(0);
        assert_eq!(exec.pending(), 0);
        assert_eq!(exec.profile().current_speed(), 0.5);
        assert_eq!(exec.ticks(), 1);

        for _ in 0..1999 {
            exec.tick(0);
        }
        assert_eq!(exec.speed(), 1000);
        assert_eq!(exec.ticks(), 2000);
    }

    #[test]
    fn commands_apply_in_order() {
        let mut queue = RampCommandQueue::<4>::new();
        let (mut tx, rx) = queue.split();
        let mut exec = RampExecutor::new(LinSpeedRamp::new(), rx);
        tx.submit(prepare_cmd(1000)).unwrap();
        tx.submit(RampCommand::OverrideSpeed(0.5)).unwrap();
        tx.submit(RampCommand::OverrideAcceleration(2.0)).unwrap();
        exec.tick(0);

        let ramp = exec.profile();
        assert_eq!(ramp.target_speed(), 500.0);
        assert_eq!(ramp.delta_magnitude(), 1.0);
        assert_eq!(ramp.current_speed(), 1.0);
    }

    #[test]
    fn sender_submits_while_executor_ticks() {
        let mut queue = RampCommandQueue::<2>::new();
        let (mut tx, rx) = queue.split();
        let mut exec = RampExecutor::new(LinSpeedRamp::new(), rx);

        tx.submit(prepare_cmd(1000)).unwrap();
        for _ in 0..100 {
            exec.tick(0);
        }
        assert_eq!(exec.speed(), 50);

        // a one-slot queue only works if every tick drains it
        tx.submit(RampCommand::Stop).unwrap();
        for _ in 0..100 {
            exec.tick(0);
            assert!(!tx.is_full());
        }
        assert_eq!(exec.speed(), 0);
        assert_eq!(exec.profile().target_speed(), 0.0);
    }

    #[test]
    fn sender_runs_on_another_thread() {
        let mut queue = RampCommandQueue::<4>::new();
        let (mut tx, rx) = queue.split();
        let mut exec = RampExecutor::new(LinSpeedRamp::new(), rx);

        std::thread::scope(|scope| {
            scope.spawn(move || {
                tx.submit(prepare_cmd(1000)).unwrap();
                tx.submit(RampCommand::OverrideSpeed(0.5)).unwrap();
            });
            let mut ticks = 0;
            while exec.profile().target_speed() != 500.0 {
                exec.tick(0);
                ticks += 1;
                assert!(ticks < 10_000_000, "commands never arrived");
                std::thread::yield_now();
            }
        });

        let mut ticks = 0;
        while exec.tick(0) != 500 {
            ticks += 1;
            assert!(ticks <= 2000);
        }
        assert!(exec.is_moving());
    }

    #[test]
    fn e_stop_bypasses_queue() {
        let mut queue = RampCommandQueue::<3>::new();
        let (mut tx, rx) = queue.split();
        let mut exec = RampExecutor::new(LinSpeedRamp::new(), rx);
        tx.submit(prepare_cmd(1000)).unwrap();
        for _ in 0..10 {
            exec.tick(0);
        }
        tx.submit(RampCommand::OverrideSpeed(2.0)).unwrap();
        tx.submit(RampCommand::OverrideAcceleration(4.0)).unwrap();
        assert_eq!(tx.submit(RampCommand::Stop), Err(RampError::QueueFull));

        exec.e_stop();
        assert_eq!(exec.pending(), 0);
        assert_eq!(exec.speed(), 0);
        assert!(!exec.is_moving());
        assert_eq!(exec.tick(0), 0);
        assert!(tx.submit(RampCommand::Stop).is_ok());
    }

    #[test]
    fn into_inner_returns_profile() {
        let mut queue = RampCommandQueue::<2>::new();
        let (mut tx, rx) = queue.split();
        let mut exec = RampExecutor::new(LinSpeedRamp::new(), rx);
        tx.submit(prepare_cmd(-20)).unwrap();
        exec.tick(0);
        let ramp = exec.into_inner();
        assert_eq!(ramp.current_speed(), -0.5);
    }
}

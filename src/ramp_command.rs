use heapless::spsc::{Consumer, Producer, Queue};

use crate::ramp_error::{RampError, Result};
use crate::ramp_units::{Acceleration, UpdatePeriod};

/// A command for the ramp, queued by a context that does not own it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RampCommand {
    /// Start a new motion toward `target_speed`.
    Prepare {
        target_speed: i32,
        acceleration: Acceleration,
        update_period: UpdatePeriod,
        speed_factor: f64,
    },
    /// Rescale the target speed.
    OverrideSpeed(f64),
    /// Rescale the acceleration. Non-positive factors are ignored.
    OverrideAcceleration(f64),
    /// Ramp down to zero.
    Stop,
    /// Halt without ramping.
    EStop,
}

impl RampCommand {
    /// A `Prepare` command with a speed factor of 1.0.
    pub fn prepare(target_speed: i32, acceleration: Acceleration, update_period: UpdatePeriod) -> Self {
        RampCommand::Prepare {
            target_speed,
            acceleration,
            update_period,
            speed_factor: 1.0,
        }
    }

    /// Rejects speed factors the ramp would refuse, so the sender learns
    /// about them when submitting rather than on a later tick.
    pub fn validate(&self) -> Result<()> {
        match *self {
            RampCommand::Prepare { speed_factor, .. } | RampCommand::OverrideSpeed(speed_factor)
                if !speed_factor.is_finite() || speed_factor < 0.0 =>
            {
                Err(RampError::invalid(
                    "speed_factor",
                    "must be finite and not negative",
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Bounded single-producer single-consumer queue of [`RampCommand`]s.
///
/// The queue itself is only storage. [`split`](Self::split) hands out a
/// [`RampCommandSender`] for the commanding context and a
/// [`RampCommandReceiver`] for the [`RampExecutor`](crate::RampExecutor),
/// and the two halves can live in different execution contexts without a
/// lock. It holds at most `N - 1` commands; a full queue rejects new ones
/// and nothing already queued is dropped.
pub struct RampCommandQueue<const N: usize> {
    queue: Queue<RampCommand, N>,
}

impl<const N: usize> Default for RampCommandQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RampCommandQueue<N> {
    pub const fn new() -> Self {
        Self { queue: Queue::new() }
    }

    /// Number of commands the queue can hold.
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Splits the queue into its sending and receiving halves.
    pub fn split(&mut self) -> (RampCommandSender<'_, N>, RampCommandReceiver<'_, N>) {
        let (producer, consumer) = self.queue.split();
        (
            RampCommandSender { producer },
            RampCommandReceiver { consumer },
        )
    }
}

/// Sending half of a [`RampCommandQueue`].
pub struct RampCommandSender<'q, const N: usize> {
    producer: Producer<'q, RampCommand, N>,
}

impl<const N: usize> RampCommandSender<'_, N> {
    /// Validates and enqueues a command for the next tick.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for an out-of-range speed factor, `QueueFull` if
    /// every slot is taken.
    pub fn submit(&mut self, command: RampCommand) -> Result<()> {
        command.validate()?;
        self.producer.enqueue(command).map_err(|_| {
            warn!("ramp command queue full, {} pending", self.producer.len());
            RampError::QueueFull
        })
    }

    pub fn len(&self) -> usize {
        self.producer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producer.len() == 0
    }

    pub fn is_full(&self) -> bool {
        !self.producer.ready()
    }
}

/// Receiving half of a [`RampCommandQueue`], drained by the executor.
pub struct RampCommandReceiver<'q, const N: usize> {
    consumer: Consumer<'q, RampCommand, N>,
}

impl<const N: usize> RampCommandReceiver<'_, N> {
    /// Removes the oldest pending command.
    pub fn recv(&mut self) -> Option<RampCommand> {
        self.consumer.dequeue()
    }

    /// Discards every pending command and returns how many there were.
    pub fn clear(&mut self) -> usize {
        let mut dropped = 0;
        while self.consumer.dequeue().is_some() {
            dropped += 1;
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    pub fn is_empty(&self) -> bool {
        !self.consumer.ready()
    }
}

//! Intent plumbing for control loops.
//!
//! The engine itself is single-writer; this module is the serialization
//! point for everything else. Interrupt handlers, RPC glue or other tasks
//! enqueue [`LightIntent`]s into a bounded channel built on
//! `critical-section` and `heapless::Deque`, and the control loop that owns
//! the engine drains them between iterations.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::color::{DriveLevels, Luv, WhiteLevels};
use crate::engine::ColorEngine;
use crate::solver::SolverError;
use crate::PwmOutput;

/// A requested change to the light state. All fields are optional; absent
/// fields leave the corresponding state alone.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightIntent {
    pub power: Option<bool>,
    pub raw: Option<DriveLevels>,
    pub white: Option<WhiteLevels>,
    pub chromaticity: Option<Luv>,
    pub color_temperature: Option<u16>,
    /// Lightness for a `color_temperature` request; ignored otherwise
    pub lightness: Option<f32>,
}

/// Error returned when trying to send to a full channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrySendError(pub LightIntent);

/// A bounded, thread-safe intent queue.
///
/// Synchronized with critical sections, making it suitable for sharing
/// between a control loop and interrupt context on embedded targets.
pub struct IntentChannel<const SIZE: usize> {
    inner: Mutex<RefCell<Deque<LightIntent, SIZE>>>,
}

impl<const SIZE: usize> IntentChannel<SIZE> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Get a sender handle for this channel.
    ///
    /// Multiple senders can coexist; they share access to the same queue.
    pub const fn sender(&self) -> IntentSender<'_, SIZE> {
        IntentSender { channel: self }
    }

    /// Get a receiver handle for this channel.
    pub const fn receiver(&self) -> IntentReceiver<'_, SIZE> {
        IntentReceiver { channel: self }
    }

    fn try_send(&self, intent: LightIntent) -> Result<(), TrySendError> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.push_back(intent).map_err(TrySendError)
        })
    }

    fn try_receive(&self) -> Option<LightIntent> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.pop_front()
        })
    }
}

impl<const SIZE: usize> Default for IntentChannel<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// A sender handle for an [`IntentChannel`].
#[derive(Clone, Copy)]
pub struct IntentSender<'a, const SIZE: usize> {
    channel: &'a IntentChannel<SIZE>,
}

impl<const SIZE: usize> IntentSender<'_, SIZE> {
    /// Try to enqueue an intent.
    ///
    /// Returns `Err(TrySendError(intent))` if the channel is full.
    pub fn try_send(&self, intent: LightIntent) -> Result<(), TrySendError> {
        self.channel.try_send(intent)
    }
}

/// A receiver handle for an [`IntentChannel`].
#[derive(Clone, Copy)]
pub struct IntentReceiver<'a, const SIZE: usize> {
    channel: &'a IntentChannel<SIZE>,
}

impl<const SIZE: usize> IntentReceiver<'_, SIZE> {
    /// Try to dequeue an intent. Returns `None` if the channel is empty.
    pub fn try_receive(&self) -> Option<LightIntent> {
        self.channel.try_receive()
    }
}

/// Drains intents and applies them to the engine.
pub struct IntentProcessor<'a, const SIZE: usize> {
    intents: IntentReceiver<'a, SIZE>,
}

impl<'a, const SIZE: usize> IntentProcessor<'a, SIZE> {
    pub const fn new(intents: IntentReceiver<'a, SIZE>) -> Self {
        Self { intents }
    }

    /// Drain all pending intents into the engine (non-blocking).
    ///
    /// Stops at the first solver error; the offending intent's remaining
    /// fields and any queued intents stay unapplied until the next call.
    pub fn process_pending<D: PwmOutput>(
        &mut self,
        engine: &mut ColorEngine<D>,
    ) -> Result<(), SolverError> {
        while let Some(intent) = self.intents.try_receive() {
            Self::apply(engine, &intent)?;
        }
        Ok(())
    }

    /// Apply one intent.
    ///
    /// A raw request is authoritative and suppresses the perceptual fields;
    /// a chromaticity suppresses a temperature, mirroring the precedence
    /// the engine's caches encode.
    fn apply<D: PwmOutput>(
        engine: &mut ColorEngine<D>,
        intent: &LightIntent,
    ) -> Result<(), SolverError> {
        if let Some(white) = intent.white {
            engine.set_white(white);
        }

        if let Some(levels) = intent.raw {
            engine.set_raw(levels);
        } else if let Some(target) = intent.chromaticity {
            engine.set_chromaticity(target)?;
        } else if let Some(kelvin) = intent.color_temperature {
            engine.set_color_temperature(intent.lightness, kelvin)?;
        }

        if let Some(power) = intent.power {
            engine.set_power(power);
        }

        Ok(())
    }
}

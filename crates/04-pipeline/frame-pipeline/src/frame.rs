use smallvec::SmallVec;
use tick_clock::Tick;

/// Events delivered with one frame, in arrival order.
pub type EventBatch<E> = SmallVec<[E; 8]>;

/// One simulation step's input: a tick and the events since the last frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame<E> {
    tick: Tick,
    events: EventBatch<E>,
}

impl<E> Frame<E> {
    /// Pairs `tick` with `events`.
    pub fn new(tick: Tick, events: EventBatch<E>) -> Self {
        Self { tick, events }
    }

    /// Tick that closed this frame.
    pub fn tick(&self) -> &Tick {
        &self.tick
    }

    /// Events in arrival order.
    pub fn events(&self) -> &[E] {
        &self.events
    }

    /// Consumes the frame, returning its events.
    pub fn into_events(self) -> EventBatch<E> {
        self.events
    }

    /// Splits the frame into its parts.
    pub fn into_parts(self) -> (Tick, EventBatch<E>) {
        (self.tick, self.events)
    }
}

use std::fmt;
use std::mem;

/// Payload of a fault captured at a task boundary. This is exactly what
/// `catch_unwind` hands back, so re-raising later with `resume_unwind`
/// preserves the original panic payload.
pub(crate) type Fault = Box<dyn std::any::Any + Send + 'static>;

/// The slot behind a [`Promise`].
///
/// `Detached` exists only for spawned roots: a detached task is never awaited
/// and never has its result retrieved, so the detached discriminant and the
/// fault slot can share one location. Which of the two the slot means is
/// fixed by whether [`Promise::set_detached`] ran, at most once, before the
/// first resume.
enum Outcome<T> {
    Empty,
    Value(T),
    Fault(Fault),
    Detached,
}

impl<T> fmt::Debug for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Empty => "Empty",
            Outcome::Value(_) => "Value",
            Outcome::Fault(_) => "Fault",
            Outcome::Detached => "Detached",
        })
    }
}

/// Result storage behind a [`Task`](crate::task::Task).
///
/// A tri-state value holder that transitions exactly once out of `Empty`,
/// into either the value or the fault arm. Double transitions are runtime
/// bugs, guarded in debug builds.
#[derive(Debug)]
pub(crate) struct Promise<T> {
    outcome: Outcome<T>,
}

impl<T> Promise<T> {
    pub(crate) fn new() -> Self {
        Self {
            outcome: Outcome::Empty,
        }
    }

    /// Store the computed value.
    ///
    /// The result of a detached task has no retrieval point, so for a
    /// detached promise the value is dropped and the discriminant kept.
    pub(crate) fn fulfill(&mut self, value: T) {
        match self.outcome {
            Outcome::Detached => {}
            _ => {
                debug_assert!(
                    matches!(self.outcome, Outcome::Empty),
                    "promise completed twice"
                );
                self.outcome = Outcome::Value(value);
            }
        }
    }

    /// Store a fault captured at the body's poll boundary.
    ///
    /// Hands the fault back when the promise belongs to a detached task:
    /// there is nowhere to store it and no awaiter to retrieve it, so the
    /// resumer must propagate it fatally.
    pub(crate) fn reject(&mut self, fault: Fault) -> Option<Fault> {
        match self.outcome {
            Outcome::Detached => Some(fault),
            _ => {
                debug_assert!(
                    matches!(self.outcome, Outcome::Empty),
                    "promise completed twice"
                );
                self.outcome = Outcome::Fault(fault);
                None
            }
        }
    }

    /// Mark this promise as belonging to a detached task. Only legal before
    /// the first resume, while the slot is still empty.
    pub(crate) fn set_detached(&mut self) {
        debug_assert!(
            matches!(self.outcome, Outcome::Empty),
            "detach() on a task that was already consumed"
        );
        self.outcome = Outcome::Detached;
    }

    /// Retrieval point: move the value or the fault out, emptying the slot.
    /// `None` while the computation is still pending (or detached, which is
    /// never retrieved).
    pub(crate) fn try_take(&mut self) -> Option<Result<T, Fault>> {
        match self.outcome {
            Outcome::Value(_) | Outcome::Fault(_) => {
                match mem::replace(&mut self.outcome, Outcome::Empty) {
                    Outcome::Value(value) => Some(Ok(value)),
                    Outcome::Fault(fault) => Some(Err(fault)),
                    _ => unreachable!(),
                }
            }
            _ => None,
        }
    }
}

//! The captured-failure container.

use std::{any::Any, error::Error as StdError, fmt, panic};

/// A boxed error object as captured from a wrapped call.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A failure captured by [`run_catching`](crate::run_catching) or one of its
/// variants.
///
/// The original failure is retained, not re-wrapped: an `Err` returned by the
/// wrapped call keeps its concrete type (recoverable via [`downcast`] or
/// [`downcast_ref`]), and a panic keeps its original payload. [`rethrow`] is
/// the only place that turns the captured failure back into control flow.
///
/// [`downcast`]: Self::downcast
/// [`downcast_ref`]: Self::downcast_ref
/// [`rethrow`]: Self::rethrow
pub struct CaughtError {
    repr: Repr,
}

enum Repr {
    /// An `Err` returned by the wrapped call. The box holds the concrete
    /// error the call failed with; its type name is recorded at capture time.
    Error {
        inner: BoxError,
        type_name: &'static str,
    },
    /// A panic raised while the wrapped call ran.
    Panic(Box<dyn Any + Send + 'static>),
}

impl CaughtError {
    /// Captures a concrete error object.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            repr: Repr::Error {
                inner: Box::new(error),
                type_name: std::any::type_name::<E>(),
            },
        }
    }

    /// Captures a panic payload, as handed out by `std::panic::catch_unwind`.
    pub fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        Self {
            repr: Repr::Panic(payload),
        }
    }

    /// Returns true if this failure was captured from a panic rather than an
    /// `Err` return.
    pub fn is_panic(&self) -> bool {
        matches!(self.repr, Repr::Panic(_))
    }

    /// The type name of the captured error, recorded when it was caught, or
    /// `"panic"` for a captured panic.
    pub fn type_name(&self) -> &'static str {
        match &self.repr {
            Repr::Error { type_name, .. } => type_name,
            Repr::Panic(_) => "panic",
        }
    }

    /// Borrows the captured error as its concrete type, if it is one.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        match &self.repr {
            Repr::Error { inner, .. } => inner.downcast_ref::<E>(),
            Repr::Panic(_) => None,
        }
    }

    /// Recovers the captured error as its concrete type, handing `self` back
    /// unchanged when the type does not match or the failure is a panic.
    pub fn downcast<E>(self) -> Result<E, Self>
    where
        E: StdError + Send + Sync + 'static,
    {
        match self.repr {
            Repr::Error { inner, type_name } => match inner.downcast::<E>() {
                Ok(boxed) => Ok(*boxed),
                Err(inner) => Err(Self {
                    repr: Repr::Error { inner, type_name },
                }),
            },
            repr @ Repr::Panic(_) => Err(Self { repr }),
        }
    }

    /// The panic message, when this failure was captured from a panic with a
    /// string payload.
    pub fn panic_message(&self) -> Option<&str> {
        match &self.repr {
            Repr::Error { .. } => None,
            Repr::Panic(payload) => Some(panic_message(payload.as_ref())),
        }
    }

    /// Raises the captured failure again.
    ///
    /// A captured panic is resumed with its original payload. A captured
    /// error is thrown as a panic carrying the original boxed object, so a
    /// later re-capture can still downcast to it.
    pub fn rethrow(self) -> ! {
        match self.repr {
            Repr::Error { inner, .. } => panic::panic_any(inner),
            Repr::Panic(payload) => panic::resume_unwind(payload),
        }
    }
}

/// Best-effort extraction of the message panics usually carry.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "opaque panic payload"
    }
}

impl fmt::Display for CaughtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Error { inner, .. } => write!(f, "{inner}"),
            Repr::Panic(payload) => {
                write!(f, "panicked: {}", panic_message(payload.as_ref()))
            }
        }
    }
}

// The panic payload has no `Debug` of its own, so this is written by hand.
impl fmt::Debug for CaughtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Error { inner, type_name } => f
                .debug_struct("CaughtError")
                .field("error", inner)
                .field("type_name", type_name)
                .finish(),
            Repr::Panic(payload) => f
                .debug_struct("CaughtError")
                .field("panic", &panic_message(payload.as_ref()))
                .finish(),
        }
    }
}

impl StdError for CaughtError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.repr {
            Repr::Error { inner, .. } => Some(&**inner),
            Repr::Panic(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Returned when the covariance matrix is not positive-definite and the
    /// Cholesky factorization fails.
    #[error("failed to factorize covariance matrix")]
    FactorizeFailed,

    /// Returned when an observation or query point has the wrong number of
    /// coordinates.
    #[error("dimension mismatch: expected {expected} coordinates, got {got}")]
    DimensionMismatch {
        /// The dimensionality fixed by the first observation.
        expected: usize,
        /// The number of coordinates actually supplied.
        got: usize,
    },

    /// Returned when querying a Gaussian process with no observations.
    #[error("no observations logged")]
    NoObservations,

    /// Returned when a logged point is missing a value for one of the
    /// optimizer's parameters.
    #[error("parameter {0:?} missing from input map")]
    MissingParam(String),

    /// Returned when a parameter's lower bound exceeds its upper bound.
    #[error("invalid bounds for {name:?}: min ({min}) must not exceed max ({max})")]
    InvalidBounds {
        /// The name of the offending parameter.
        name: String,
        /// The lower bound value.
        min: f64,
        /// The upper bound value.
        max: f64,
    },

    /// Returned when an optimizer is built without any parameters.
    #[error("at least one parameter is required")]
    NoParams,

    /// Returned when `optimize` is called while a run is already in flight.
    #[error("optimizer is already running")]
    AlreadyRunning,

    /// Returned when `optimize` terminates because `stop` was called.
    #[error("optimizer got stop signal")]
    Stopped,

    /// A fatal failure inside the local acquisition search.
    #[error("local search failed: {0}")]
    LocalSearch(String),

    /// Returned when an async evaluation task fails.
    #[cfg(feature = "async")]
    #[error("async task error: {0}")]
    TaskError(String),
}

pub type Result<T> = core::result::Result<T, Error>;

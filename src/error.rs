//! Error types.
//!
//! - `AppError` is what the binary reports: a message plus a process exit code.
//! - `ModelError` is what the sequential builder returns to library callers.
//! - `FitError` is what a single regression engine returns for one formula.
//!
//! Exit codes: 2 = bad usage / model specification, 3 = data problems,
//! 4 = a model in the grid could not be fitted.

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failure of a single regression fit.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    /// A variable named in the formula is not a column of the data table.
    MissingColumn(String),
    /// Fewer complete observations than needed to estimate the residual variance.
    TooFewObservations { n: usize, p: usize },
    /// The design matrix does not have full column rank.
    RankDeficient { rank: usize, columns: usize },
    /// Logistic engine: the response contains values other than 0 and 1.
    NonBinaryResponse { value: f64 },
    /// IRLS did not reach the deviance tolerance.
    NotConverged { iterations: usize },
    /// The solver produced NaN/inf coefficients or fitted values.
    NonFinite,
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::MissingColumn(name) => write!(f, "column `{name}` not found in data"),
            FitError::TooFewObservations { n, p } => write!(
                f,
                "too few complete observations: n={n} for {p} coefficients (need n > {p})"
            ),
            FitError::RankDeficient { rank, columns } => write!(
                f,
                "singular design matrix: rank {rank} < {columns} columns"
            ),
            FitError::NonBinaryResponse { value } => {
                write!(f, "binomial response must be 0/1, found {value}")
            }
            FitError::NotConverged { iterations } => {
                write!(f, "IRLS did not converge after {iterations} iterations")
            }
            FitError::NonFinite => write!(f, "non-finite estimates"),
        }
    }
}

impl std::error::Error for FitError {}

/// Errors surfaced by the sequential model builder.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The formula expression could not be split into `outcomes ~ predictors`.
    MalformedFormula(String),
    /// No outcome or no predictor was given.
    EmptySpec(String),
    /// The exposure is not one of the predictors.
    InvalidExposure {
        exposure: String,
        predictors: Vec<String>,
    },
    DuplicatePredictor(String),
    DuplicateOutcome(String),
    /// A variable is listed both as an outcome and as a predictor.
    OverlappingRoles(String),
    MissingColumn(String),
    InvalidConfidence(f64),
    UnsupportedEngine(String),
    /// One model of the grid could not be fitted.
    FitFailure {
        outcome: String,
        chain_length: usize,
        reason: FitError,
    },
    /// No diagnostic layout exists for the model family.
    UnsupportedFamily(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::MalformedFormula(expr) => write!(
                f,
                "malformed formula `{expr}`: expected `outcome1 + outcome2 ~ pred1 + pred2`"
            ),
            ModelError::EmptySpec(what) => write!(f, "empty model specification: {what}"),
            ModelError::InvalidExposure {
                exposure,
                predictors,
            } => write!(
                f,
                "exposure `{exposure}` is not a predictor (predictors: {})",
                predictors.join(", ")
            ),
            ModelError::DuplicatePredictor(name) => {
                write!(f, "predictor `{name}` is listed more than once")
            }
            ModelError::DuplicateOutcome(name) => {
                write!(f, "outcome `{name}` is listed more than once")
            }
            ModelError::OverlappingRoles(name) => {
                write!(f, "`{name}` is listed both as an outcome and as a predictor")
            }
            ModelError::MissingColumn(name) => write!(f, "column `{name}` not found in data"),
            ModelError::InvalidConfidence(level) => {
                write!(f, "confidence level must be in (0, 1), got {level}")
            }
            ModelError::UnsupportedEngine(name) => write!(
                f,
                "unsupported engine `{name}` (supported: lm, logit)"
            ),
            ModelError::FitFailure {
                outcome,
                chain_length,
                reason,
            } => write!(
                f,
                "fit failed for outcome `{outcome}` with {chain_length} predictor(s): {reason}"
            ),
            ModelError::UnsupportedFamily(family) => {
                write!(f, "no diagnostics available for model family `{family}`")
            }
        }
    }
}

impl std::error::Error for ModelError {}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        let exit_code = match &err {
            ModelError::MissingColumn(_) => 3,
            ModelError::FitFailure { .. } => 4,
            _ => 2,
        };
        AppError::new(exit_code, err.to_string())
    }
}

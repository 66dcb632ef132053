//! Error taxonomy for the QC core.
//!
//! Three failure families matter to callers and are kept distinct:
//!
//! - **Precondition violations** (bad degree range, non-positive flow,
//!   mismatched trace lengths): the input was structurally wrong and the
//!   offending field is named.
//! - **Under-determined fits**: the data was valid but too small for the
//!   requested polynomial degree.
//! - **IO / parse problems** from the CSV front door.
//!
//! Every error carries enough context to print a one-line message; the binary
//! maps errors to process exit codes via [`QcError::exit_code`].

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum QcError {
    /// Structurally invalid input; `field` names the offending value.
    #[error("invalid `{field}`: {message}")]
    Precondition { field: &'static str, message: String },

    /// Fewer samples than polynomial parameters.
    #[error(
        "under-determined fit for degree {degree}: need at least {needed} samples, got {got}"
    )]
    UnderdeterminedFit {
        degree: usize,
        needed: usize,
        got: usize,
    },

    /// A trace in one figure/bundle has a different length than its peers.
    ///
    /// Mesh triangulation walks adjacent traces sample-by-sample, so this is
    /// always fatal for the reconstruction that produced it.
    #[error("trace `{label}` has length {got}, expected {expected}")]
    TraceLengthMismatch {
        label: String,
        expected: usize,
        got: usize,
    },

    /// The least-squares solve itself failed (ill-conditioned system).
    #[error("fit failed: {0}")]
    Fit(String),

    /// No usable rows remain after ingest/trim.
    #[error("{0}")]
    EmptyData(String),

    /// File or CSV-level failure (not row-level; those are collected).
    #[error("{0}")]
    Io(String),
}

impl QcError {
    pub fn precondition(field: &'static str, message: impl Into<String>) -> Self {
        QcError::Precondition {
            field,
            message: message.into(),
        }
    }

    /// Exit code for the `doseqc` binary.
    ///
    /// 2 = usage/input problems, 3 = data problems, 4 = fit/reconstruction.
    pub fn exit_code(&self) -> u8 {
        match self {
            QcError::Precondition { .. } | QcError::Io(_) => 2,
            QcError::EmptyData(_) => 3,
            QcError::UnderdeterminedFit { .. }
            | QcError::Fit(_)
            | QcError::TraceLengthMismatch { .. } => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_names_the_field() {
        let err = QcError::precondition("flow", "must be > 0 (row 3)");
        assert!(err.to_string().contains("`flow`"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn fit_errors_are_distinguishable_from_preconditions() {
        let err = QcError::UnderdeterminedFit {
            degree: 3,
            needed: 4,
            got: 2,
        };
        assert_eq!(err.exit_code(), 4);
        assert!(matches!(err, QcError::UnderdeterminedFit { .. }));
    }
}

use thiserror::Error;

/// The engine's single user-visible failure mode. Malformed individual
/// records never error; they degrade to sentinel field values.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("neither input sequence produced any usable record")]
    NoUsableRecords,
}

#[cfg(test)]
mod tests {
    use super::EngineError;

    #[test]
    fn engine_error_message_names_both_inputs() {
        assert_eq!(
            EngineError::NoUsableRecords.to_string(),
            "neither input sequence produced any usable record"
        );
    }
}

use thiserror::Error;

/// Errors reported by the ramp at command time.
///
/// Every variant is a caller input error. Nothing here is transient, so
/// retrying the same call with the same arguments fails the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RampError {
    /// A motion parameter is outside its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },

    /// The command queue has no free slot left.
    #[error("ramp command queue is full")]
    QueueFull,
}

impl RampError {
    pub(crate) const fn invalid(name: &'static str, reason: &'static str) -> Self {
        RampError::InvalidParameter { name, reason }
    }
}

pub type Result<T> = core::result::Result<T, RampError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn invalid_parameter_names_the_offender() {
        let err = RampError::invalid("update_period", "must be greater than zero");
        assert_eq!(
            err.to_string(),
            "invalid parameter `update_period`: must be greater than zero"
        );
    }

    #[test]
    fn queue_full_message() {
        assert_eq!(RampError::QueueFull.to_string(), "ramp command queue is full");
    }
}

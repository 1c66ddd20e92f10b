use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StressError};

/// Body of `POST /stress`.
///
/// Fields are signed so that zero and negative values reach validation
/// instead of failing inside the JSON extractor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StressRequest {
    pub cpu: i64,
    pub timeout: i64,
}

/// Validated parameters handed to a [`crate::process::ProcessSpawner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StressArgs {
    /// Number of CPU workers the stress tool runs.
    pub cpu: u32,
    /// Run duration in seconds.
    pub timeout: u32,
}

impl StressRequest {
    pub fn validate(&self) -> Result<StressArgs> {
        Ok(StressArgs {
            cpu: positive("cpu", self.cpu)?,
            timeout: positive("timeout", self.timeout)?,
        })
    }
}

fn positive(field: &str, value: i64) -> Result<u32> {
    if value < 1 {
        return Err(StressError::Validation(format!(
            "{} must be greater than 0, got {}",
            field, value
        )));
    }
    u32::try_from(value).map_err(|_| {
        StressError::Validation(format!("{} is too large, got {}", field, value))
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressJob {
    pub process_id: u32,
    pub cpu: u32,
    pub timeout: u32,
    pub started_at: DateTime<Utc>,
}

/// Body returned by a successful `POST /stress`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StressResponse {
    pub message: String,
    pub cpu: u32,
    pub timeout: u32,
    pub process_id: u32,
}

impl From<&StressJob> for StressResponse {
    fn from(job: &StressJob) -> Self {
        Self {
            message: format!(
                "CPU stress started with {} workers for {} seconds",
                job.cpu, job.timeout
            ),
            cpu: job.cpu,
            timeout: job.timeout,
            process_id: job.process_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StressList {
    pub active_stresses: Vec<StressJob>,
    pub count: usize,
}

impl From<Vec<StressJob>> for StressList {
    fn from(active_stresses: Vec<StressJob>) -> Self {
        let count = active_stresses.len();
        Self {
            active_stresses,
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_values() {
        let args = StressRequest { cpu: 2, timeout: 60 }.validate().unwrap();
        assert_eq!(args, StressArgs { cpu: 2, timeout: 60 });
    }

    #[test]
    fn rejects_zero_and_negative() {
        for (cpu, timeout) in [(0, 10), (2, 0), (-1, 10), (2, -5)] {
            let err = StressRequest { cpu, timeout }.validate().unwrap_err();
            assert!(matches!(err, StressError::Validation(_)), "{cpu}/{timeout}");
        }
    }

    #[test]
    fn rejects_values_beyond_u32() {
        let err = StressRequest {
            cpu: i64::from(u32::MAX) + 1,
            timeout: 1,
        }
        .validate()
        .unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn response_message_matches_job() {
        let job = StressJob {
            process_id: 1234,
            cpu: 2,
            timeout: 60,
            started_at: Utc::now(),
        };
        let resp = StressResponse::from(&job);
        assert_eq!(resp.message, "CPU stress started with 2 workers for 60 seconds");
        assert_eq!(resp.process_id, 1234);
    }
}

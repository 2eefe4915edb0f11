//! Consultation model and its lifecycle.
//!
//! A consultation starts `scheduled` and ends either `completed` or
//! `cancelled`. Both end states are terminal. The client applies a
//! transition only after the backend has confirmed it.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use stalk_core::AppError;
use validator::Validate;

/// Longest cancellation memo accepted, in characters.
pub const MAX_MEMO_CHARS: u64 = 500;

/// Consultation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl ConsultationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsultationStatus::Scheduled => "scheduled",
            ConsultationStatus::Completed => "completed",
            ConsultationStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConsultationStatus::Scheduled)
    }

    pub fn can_transition_to(&self, next: ConsultationStatus) -> bool {
        matches!(
            (self, next),
            (
                ConsultationStatus::Scheduled,
                ConsultationStatus::Completed | ConsultationStatus::Cancelled
            )
        )
    }
}

/// Why the user cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancellationReason {
    PersonalReason,
    ScheduleChange,
    HealthIssue,
    NoLongerNeeded,
    Other,
}

impl CancellationReason {
    pub const ALL: [CancellationReason; 5] = [
        CancellationReason::PersonalReason,
        CancellationReason::ScheduleChange,
        CancellationReason::HealthIssue,
        CancellationReason::NoLongerNeeded,
        CancellationReason::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CancellationReason::PersonalReason => "PERSONAL_REASON",
            CancellationReason::ScheduleChange => "SCHEDULE_CHANGE",
            CancellationReason::HealthIssue => "HEALTH_ISSUE",
            CancellationReason::NoLongerNeeded => "NO_LONGER_NEEDED",
            CancellationReason::Other => "OTHER",
        }
    }
}

/// Body of `POST /api/consultations/{id}/cancel`.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRequest {
    pub reason: CancellationReason,
    #[validate(length(max = MAX_MEMO_CHARS))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl CancellationRequest {
    /// Blank memos are dropped rather than sent.
    pub fn new(reason: CancellationReason, memo: Option<&str>) -> Self {
        let memo = memo
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        Self { reason, memo }
    }
}

/// A scheduled advisory engagement between the user and an advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    pub id: u64,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub counterparty_name: String,
    pub status: ConsultationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<CancellationReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_memo: Option<String>,
}

impl Consultation {
    pub fn new(
        id: u64,
        scheduled_date: NaiveDate,
        scheduled_time: NaiveTime,
        counterparty_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            scheduled_date,
            scheduled_time,
            counterparty_name: counterparty_name.into(),
            status: ConsultationStatus::Scheduled,
            cancellation_reason: None,
            cancellation_memo: None,
        }
    }

    fn ensure_transition(&self, next: ConsultationStatus) -> Result<(), AppError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(AppError::InvalidTransition {
                from: self.status.as_str(),
                to: next.as_str(),
            })
        }
    }

    /// A session token may only be requested while the consultation is
    /// still scheduled.
    pub fn ensure_session_allowed(&self) -> Result<(), AppError> {
        if self.status.is_terminal() {
            return Err(AppError::InvalidTransition {
                from: self.status.as_str(),
                to: "in_session",
            });
        }
        Ok(())
    }

    /// Check a cancellation without applying it.
    pub fn check_cancellation(&self, request: &CancellationRequest) -> Result<(), AppError> {
        self.ensure_transition(ConsultationStatus::Cancelled)?;
        request.validate()?;
        Ok(())
    }

    /// Apply a backend-confirmed cancellation.
    pub fn apply_cancellation(&mut self, request: &CancellationRequest) -> Result<(), AppError> {
        self.check_cancellation(request)?;
        self.status = ConsultationStatus::Cancelled;
        self.cancellation_reason = Some(request.reason);
        self.cancellation_memo = request.memo.clone();
        Ok(())
    }

    /// Apply a backend-confirmed completion.
    pub fn apply_completion(&mut self) -> Result<(), AppError> {
        self.ensure_transition(ConsultationStatus::Completed)?;
        self.status = ConsultationStatus::Completed;
        Ok(())
    }
}

//! Payment authorization pipeline
//!
//! Drives one payment attempt through the state machine
//! RECEIVED → VALIDATED → PRICED → RISK_ASSESSED → terminal, where the
//! terminal state is COMMITTED, CHALLENGED, BLOCKED, or REJECTED.
//!
//! Every collaborator is an injected port: persistence (`Store`),
//! behavioral signals (`FraudSignalSource`), the audit trail
//! (`AuditSink`), and time (`Clock`). A per-booking async mutex covers
//! check-and-commit; the store's unique `(user_id, transaction_ref)`
//! constraint backs it up, so racing attempts lose cleanly. The pipeline
//! never retries.

use crate::audit::AuditSink;
use crate::config::PipelineConfig;
use crate::eligibility::{parse_boolean_intent, validate_eligibility, BoolIntent};
use crate::error::{PaymentError, Result};
use crate::pricing::compute_expected_total;
use booking_core::store::PaymentCommit;
use booking_core::{Booking, Clock, PaymentStatus, PricingQuote, Store, Transaction};
use dashmap::DashMap;
use risk_engine::{
    FraudAssessment, FraudScorer, FraudSignalSource, FraudSignals, RiskAction, RiskLevel,
};
use rust_decimal::Decimal;
use security::audit_log::{AuditEvent, AuditEventType, AuditSeverity};
use security::validators::validate_transaction_ref;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Pipeline state for one attempt, used in logs and audit payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptState {
    Received,
    Validated,
    Priced,
    RiskAssessed,
}

impl AttemptState {
    fn as_str(&self) -> &'static str {
        match self {
            AttemptState::Received => "RECEIVED",
            AttemptState::Validated => "VALIDATED",
            AttemptState::Priced => "PRICED",
            AttemptState::RiskAssessed => "RISK_ASSESSED",
        }
    }
}

/// One payment attempt as submitted by a client
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    /// Client-supplied idempotency token
    pub transaction_ref: String,

    /// Amount the client believes it owes
    pub amount: Option<Decimal>,

    /// Raw rapid assistance intent, normalized before use
    pub rapid_assistance_requested: serde_json::Value,
}

/// Request-scoped context used for risk signals and audit records
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Source IP address
    pub ip_address: String,

    /// Client user agent, if sent
    pub user_agent: Option<String>,

    /// Session identifier, if any
    pub session_id: Option<String>,

    /// Device fingerprint
    pub device_id: String,

    /// Coarse location label (city or district)
    pub location: String,
}

/// Successful authorization result
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    /// Committed transaction record
    pub transaction: Transaction,

    /// Challenge marker: payment went through but needs verification
    pub requires_additional_verification: bool,

    /// Risk tier the attempt was assessed at
    pub fraud_risk_level: RiskLevel,
}

/// Payment authorization pipeline
pub struct PaymentPipeline {
    store: Arc<dyn Store>,
    signals: Arc<dyn FraudSignalSource>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    scorer: FraudScorer,
    config: PipelineConfig,
    booking_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl PaymentPipeline {
    /// Assemble a pipeline from its ports
    pub fn new(
        store: Arc<dyn Store>,
        signals: Arc<dyn FraudSignalSource>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            signals,
            audit,
            clock,
            scorer: FraudScorer::new(),
            config,
            booking_locks: DashMap::new(),
        }
    }

    /// Authorize one payment attempt
    ///
    /// Runs the full state machine and either commits atomically or
    /// returns a taxonomy error with no state mutated.
    pub async fn authorize_payment(
        &self,
        booking_id: Uuid,
        request: PaymentRequest,
        acting_user_id: Uuid,
        context: RequestContext,
    ) -> Result<PaymentOutcome> {
        tracing::debug!(
            %booking_id,
            %acting_user_id,
            state = AttemptState::Received.as_str(),
            "payment attempt received"
        );

        let lock = self
            .booking_locks
            .entry(booking_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock().await;

        let result = self
            .run_attempt(booking_id, &request, acting_user_id, &context)
            .await;

        if let Err(err) = &result {
            self.audit_rejection(booking_id, acting_user_id, &request, &context, err)
                .await?;
        }

        drop(guard);
        drop(lock);
        // Prune the entry once no other task holds a handle; the shard
        // lock makes the count check and removal atomic with new arrivals.
        self.booking_locks
            .remove_if(&booking_id, |_, lock| Arc::strong_count(lock) == 1);

        result
    }

    /// Number of bookings with an in-flight lock entry
    pub fn active_booking_locks(&self) -> usize {
        self.booking_locks.len()
    }

    async fn run_attempt(
        &self,
        booking_id: Uuid,
        request: &PaymentRequest,
        acting_user_id: Uuid,
        context: &RequestContext,
    ) -> Result<PaymentOutcome> {
        // RECEIVED → VALIDATED
        let (booking, amount, rapid_requested) = self
            .validate(booking_id, request, acting_user_id)
            .await?;
        tracing::debug!(%booking_id, state = AttemptState::Validated.as_str(), "attempt validated");

        // VALIDATED → PRICED
        let quote = self.price(&booking, amount, rapid_requested).await?;
        tracing::debug!(
            %booking_id,
            state = AttemptState::Priced.as_str(),
            total = %quote.total_expected,
            "price recomputed"
        );

        // PRICED → RISK_ASSESSED
        let assessment = self.assess_risk(&booking, amount, context).await?;
        tracing::debug!(
            %booking_id,
            state = AttemptState::RiskAssessed.as_str(),
            score = assessment.risk_score.score(),
            level = %assessment.risk_level,
            "risk assessed"
        );

        // RISK_ASSESSED → terminal
        match assessment.recommendation.action {
            RiskAction::Block => {
                self.audit_blocked(&booking, acting_user_id, request, context, &assessment)
                    .await?;
                Err(PaymentError::FraudBlocked {
                    risk_level: assessment.risk_level,
                })
            }
            RiskAction::Allow | RiskAction::Challenge => {
                let challenged = assessment.recommendation.action == RiskAction::Challenge;
                let transaction = self
                    .commit(&booking, request, &quote, rapid_requested)
                    .await?;
                self.audit_committed(
                    &booking,
                    acting_user_id,
                    context,
                    &transaction,
                    &assessment,
                    challenged,
                )
                .await?;

                Ok(PaymentOutcome {
                    transaction,
                    requires_additional_verification: challenged,
                    fraud_risk_level: assessment.risk_level,
                })
            }
        }
    }

    /// RECEIVED → VALIDATED: existence, ownership, state, ref, amount
    async fn validate(
        &self,
        booking_id: Uuid,
        request: &PaymentRequest,
        acting_user_id: Uuid,
    ) -> Result<(Booking, Decimal, bool)> {
        let booking = self
            .store
            .booking(booking_id)
            .await?
            .ok_or(PaymentError::NotFound)?;

        if booking.user_id != acting_user_id {
            return Err(PaymentError::AccessDenied);
        }

        match booking.payment_status {
            PaymentStatus::Pending => {}
            PaymentStatus::Paid => return Err(PaymentError::AlreadyPaid),
            PaymentStatus::Cancelled => return Err(PaymentError::BookingCancelled),
        }

        if !validate_transaction_ref(&request.transaction_ref) {
            return Err(PaymentError::InvalidTransactionRef);
        }
        if self
            .store
            .transaction_ref_exists(acting_user_id, &request.transaction_ref)
            .await?
        {
            return Err(PaymentError::DuplicateTransaction(
                request.transaction_ref.clone(),
            ));
        }

        let amount = request
            .amount
            .ok_or_else(|| PaymentError::InvalidAmount("amount is required".into()))?;
        if amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount(
                "amount must be positive".into(),
            ));
        }

        let rapid_requested = match parse_boolean_intent(&request.rapid_assistance_requested) {
            BoolIntent::Yes => true,
            BoolIntent::No => false,
            BoolIntent::Invalid => {
                return Err(PaymentError::InvalidEligibility(
                    "Invalid rapid assistance preference".into(),
                ))
            }
        };

        if rapid_requested && !booking.rapid_assistance_enabled {
            let check = validate_eligibility(
                booking.patient_age,
                true,
                self.config.rapid_assistance_min_age,
            );
            if !check.is_valid {
                return Err(PaymentError::InvalidEligibility(check.errors.join("; ")));
            }
        }

        Ok((booking, amount, rapid_requested))
    }

    /// VALIDATED → PRICED: recompute and compare against the submission
    async fn price(
        &self,
        booking: &Booking,
        amount: Decimal,
        rapid_requested: bool,
    ) -> Result<PricingQuote> {
        let pricing = self
            .store
            .hospital_pricing(booking.hospital_id, booking.resource_type)
            .await?
            .ok_or(PaymentError::NotFound)?;

        let quote = compute_expected_total(booking, &pricing, rapid_requested, &self.config)?;

        if amount != quote.total_expected {
            return Err(PaymentError::AmountMismatch {
                expected: quote.total_expected,
                submitted: amount,
            });
        }

        Ok(quote)
    }

    /// PRICED → RISK_ASSESSED: gather signals and score
    async fn assess_risk(
        &self,
        booking: &Booking,
        amount: Decimal,
        context: &RequestContext,
    ) -> Result<FraudAssessment> {
        let user_id = booking.user_id;
        let signals = FraudSignals {
            amount,
            historical_average: self.signals.historical_average(user_id).await?,
            transactions_in_window: self.signals.transaction_count(user_id).await?,
            recent_failures: self.signals.failure_count(user_id).await?,
            known_device: self
                .signals
                .is_known_device(user_id, &context.device_id)
                .await?,
            known_location: self
                .signals
                .is_known_location(user_id, &context.location)
                .await?,
            ip_address: context.ip_address.clone(),
        };

        Ok(self.scorer.assess(&signals))
    }

    /// Terminal commit through the store's atomic entry point
    async fn commit(
        &self,
        booking: &Booking,
        request: &PaymentRequest,
        quote: &PricingQuote,
        rapid_requested: bool,
    ) -> Result<Transaction> {
        let rapid_charge = if rapid_requested && !booking.rapid_assistance_enabled {
            quote.add_on_charge
        } else {
            Decimal::ZERO
        };

        let transaction = self
            .store
            .commit_payment(PaymentCommit {
                booking_id: booking.id,
                user_id: booking.user_id,
                hospital_id: booking.hospital_id,
                transaction_ref: request.transaction_ref.clone(),
                amount: quote.total_expected,
                rapid_assistance_charge: rapid_charge,
                committed_at: self.clock.now(),
            })
            .await?;

        Ok(transaction)
    }

    async fn audit_committed(
        &self,
        booking: &Booking,
        acting_user_id: Uuid,
        context: &RequestContext,
        transaction: &Transaction,
        assessment: &FraudAssessment,
        challenged: bool,
    ) -> Result<()> {
        let (event_type, severity) = if challenged {
            (AuditEventType::PaymentChallenged, AuditSeverity::Warning)
        } else {
            (AuditEventType::PaymentCommitted, AuditSeverity::Info)
        };

        let payload = json!({
            "booking_id": booking.id,
            "transaction_id": transaction.id,
            "transaction_ref": transaction.transaction_ref,
            "amount": transaction.amount,
            "risk_score": assessment.risk_score.score(),
            "risk_level": assessment.risk_level.as_str(),
        });

        let event = self
            .build_event(event_type, severity, &payload, acting_user_id, context);
        self.emit(event, severity).await
    }

    async fn audit_blocked(
        &self,
        booking: &Booking,
        acting_user_id: Uuid,
        request: &PaymentRequest,
        context: &RequestContext,
        assessment: &FraudAssessment,
    ) -> Result<()> {
        let flags: Vec<&str> = assessment.fraud_flags.iter().map(|f| f.as_str()).collect();
        let payload = json!({
            "booking_id": booking.id,
            "transaction_ref": request.transaction_ref,
            "risk_score": assessment.risk_score.score(),
            "risk_level": assessment.risk_level.as_str(),
            "fraud_flags": flags,
            "requires_manual_review": assessment.recommendation.requires_manual_review,
        });

        let event = self.build_event(
            AuditEventType::PaymentBlocked,
            AuditSeverity::Critical,
            &payload,
            acting_user_id,
            context,
        );
        self.emit(event, AuditSeverity::Critical).await
    }

    async fn audit_rejection(
        &self,
        booking_id: Uuid,
        acting_user_id: Uuid,
        request: &PaymentRequest,
        context: &RequestContext,
        err: &PaymentError,
    ) -> Result<()> {
        // Block events carry their own Critical record inside the attempt
        if matches!(err, PaymentError::FraudBlocked { .. }) {
            return Ok(());
        }

        let (event_type, severity) = match err {
            PaymentError::AccessDenied => (AuditEventType::AccessDenied, AuditSeverity::Warning),
            PaymentError::DuplicateTransaction(_) => (
                AuditEventType::DuplicateTransactionAttempt,
                AuditSeverity::Warning,
            ),
            PaymentError::AmountMismatch { .. } => (
                AuditEventType::AmountMismatchDetected,
                AuditSeverity::Warning,
            ),
            _ => (AuditEventType::PaymentRejected, AuditSeverity::Info),
        };

        let payload = json!({
            "booking_id": booking_id,
            "transaction_ref": request.transaction_ref,
            "error_code": err.code(),
        });

        let event = self.build_event(event_type, severity, &payload, acting_user_id, context);
        self.emit(event, severity).await
    }

    fn build_event(
        &self,
        event_type: AuditEventType,
        severity: AuditSeverity,
        payload: &serde_json::Value,
        acting_user_id: Uuid,
        context: &RequestContext,
    ) -> AuditEvent {
        let mut event = AuditEvent::new(event_type, severity, payload, self.clock.now())
            .with_user(acting_user_id)
            .with_ip(context.ip_address.clone());
        if let Some(agent) = &context.user_agent {
            event = event.with_user_agent(agent.clone());
        }
        if let Some(session) = &context.session_id {
            event = event.with_session(session.clone());
        }
        event
    }

    /// Routine sink failures degrade to a warning; Critical events must
    /// not be lost, so their failures propagate.
    async fn emit(&self, event: AuditEvent, severity: AuditSeverity) -> Result<()> {
        match self.audit.record(event).await {
            Ok(()) => Ok(()),
            Err(err) if severity >= AuditSeverity::Critical => Err(PaymentError::IntegrityFailure(
                format!("audit write failed for a critical event: {err}"),
            )),
            Err(err) => {
                tracing::warn!(error = %err, "audit write failed, continuing");
                Ok(())
            }
        }
    }
}

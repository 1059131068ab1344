//! Token issuer and resolver

use std::sync::Arc;

use chrono::{Duration, Utc};
use guestlink_domain::config::TokenConfig;
use guestlink_domain::{
    is_platform_booking_code, normalize_access_code, normalize_code, validate_expires_in_days,
    validate_property_id, validate_token_format, GuestLinkError, IssueTokenRequest, IssuedToken,
    NewVerificationToken, ResolveTokenRequest, ResolvedToken, Result, TokenSummary,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::crypto::{generate_token, hash_access_code, verify_access_code, Pepper};
use super::ports::{PepperProvider, ReservationPolicy, TokenRepository};

/// What issuance does when the reservation policy cannot be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyFailureMode {
    FailOpen,
    FailClosed,
}

impl PolicyFailureMode {
    pub fn from_fail_open(fail_open: bool) -> Self {
        if fail_open {
            Self::FailOpen
        } else {
            Self::FailClosed
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TokenSettings {
    pub default_expires_in_days: i64,
    pub max_expires_in_days: i64,
    pub policy_failure_mode: PolicyFailureMode,
}

impl From<&TokenConfig> for TokenSettings {
    fn from(config: &TokenConfig) -> Self {
        Self {
            default_expires_in_days: config.default_expires_in_days,
            max_expires_in_days: config.max_expires_in_days,
            policy_failure_mode: PolicyFailureMode::from_fail_open(config.policy_fail_open),
        }
    }
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self::from(&TokenConfig::default())
    }
}

/// Issues and resolves guest verification tokens
pub struct TokenService {
    tokens: Arc<dyn TokenRepository>,
    policy: Arc<dyn ReservationPolicy>,
    pepper: Arc<dyn PepperProvider>,
    settings: TokenSettings,
}

impl TokenService {
    pub fn new(
        tokens: Arc<dyn TokenRepository>,
        policy: Arc<dyn ReservationPolicy>,
        pepper: Arc<dyn PepperProvider>,
        settings: TokenSettings,
    ) -> Self {
        Self { tokens, policy, pepper, settings }
    }

    /// Issue a new manual token, replacing the property's active one.
    ///
    /// When the booking identifier has the platform code shape the token is
    /// code-protected, and issuance fails without a pepper.
    #[instrument(skip(self, request), fields(property_id = %request.property_id))]
    pub async fn issue(&self, request: IssueTokenRequest) -> Result<IssuedToken> {
        let property_id = validate_property_id(&request.property_id)?;
        let days = validate_expires_in_days(
            request.expires_in_days.unwrap_or(self.settings.default_expires_in_days),
            self.settings.max_expires_in_days,
        )?;

        self.enforce_policy(&property_id).await?;

        let booking_id = non_blank(request.booking_id.as_deref());
        let external_code = non_blank(request.external_code.as_deref()).map(|c| normalize_code(&c));

        let identifier = external_code.as_deref().or(booking_id.as_deref());
        let access_code_hash = match identifier.filter(|id| is_platform_booking_code(id)) {
            Some(code) => Some(hash_access_code(&self.require_pepper()?, code)?),
            None => None,
        };

        let now = Utc::now();
        let expires_at = now + Duration::days(days);
        let token = NewVerificationToken {
            id: Uuid::now_v7().to_string(),
            token: generate_token(now),
            property_id,
            booking_id,
            external_code,
            access_code_hash,
            expires_at,
            created_at: now,
        };

        let deactivated = self.tokens.replace_active_manual(&token).await?;
        let requires_code = token.access_code_hash.is_some();
        info!(deactivated, requires_code, expires_in_days = days, "verification token issued");

        Ok(IssuedToken { token: token.token, expires_at, requires_code })
    }

    /// Validate a presented token and optional access code.
    #[instrument(skip(self, request), fields(property_id = ?request.property_id))]
    pub async fn resolve(&self, request: ResolveTokenRequest) -> Result<ResolvedToken> {
        validate_token_format(&request.token)?;
        let expected_property =
            request.property_id.as_deref().map(validate_property_id).transpose()?;

        let token = self
            .tokens
            .find_by_token(&request.token)
            .await?
            .ok_or_else(|| GuestLinkError::NotFound("verification token".into()))?;

        // A token presented for another property is indistinguishable from
        // an unknown one.
        if expected_property.is_some_and(|expected| expected != token.property_id) {
            return Err(GuestLinkError::NotFound("verification token".into()));
        }

        let now = Utc::now();
        if !token.is_active || token.is_expired(now) {
            debug!(is_active = token.is_active, "token rejected as expired");
            return Err(GuestLinkError::Expired("verification token".into()));
        }

        if let Some(stored_hash) = token.access_code_hash.as_deref() {
            let candidate =
                non_blank(request.external_code.as_deref()).ok_or(GuestLinkError::CodeRequired)?;
            let candidate = normalize_access_code(&candidate).ok_or(GuestLinkError::InvalidCode)?;

            if !verify_access_code(&self.require_pepper()?, &candidate, stored_hash)? {
                return Err(GuestLinkError::InvalidCode);
            }
        }

        if let Err(err) = self.tokens.record_usage(&token.id, now).await {
            warn!(error_type = err.label(), error = %err, "failed to record token usage");
        }

        Ok(ResolvedToken {
            requires_code: token.requires_code(),
            property_id: token.property_id,
            booking_id: token.booking_id,
        })
    }

    /// Deactivate every active manual token of a property.
    #[instrument(skip(self))]
    pub async fn revoke_for_property(&self, property_id: &str) -> Result<usize> {
        let property_id = validate_property_id(property_id)?;
        let revoked = self.tokens.deactivate_manual(&property_id).await?;
        info!(revoked, "manual tokens revoked");
        Ok(revoked)
    }

    /// Public metadata of the property's active manual token.
    #[instrument(skip(self))]
    pub async fn active_token_for_property(&self, property_id: &str) -> Result<Option<TokenSummary>> {
        let property_id = validate_property_id(property_id)?;
        let now = Utc::now();
        Ok(self
            .tokens
            .find_active_manual(&property_id)
            .await?
            .filter(|token| !token.is_expired(now))
            .map(|token| TokenSummary::from(&token)))
    }

    async fn enforce_policy(&self, property_id: &str) -> Result<()> {
        match self.policy.check_allowed(property_id).await {
            Ok(decision) if decision.allowed => Ok(()),
            Ok(decision) => Err(GuestLinkError::Auth(
                decision.reason.unwrap_or_else(|| "reservations are disabled for this property".into()),
            )),
            Err(err) => match self.settings.policy_failure_mode {
                PolicyFailureMode::FailOpen => {
                    warn!(error_type = err.label(), error = %err, "policy check unavailable, failing open");
                    Ok(())
                }
                PolicyFailureMode::FailClosed => {
                    warn!(error_type = err.label(), error = %err, "policy check unavailable, failing closed");
                    Err(GuestLinkError::Auth("reservation policy is unavailable".into()))
                }
            },
        }
    }

    fn require_pepper(&self) -> Result<Pepper> {
        self.pepper
            .pepper()
            .ok_or_else(|| GuestLinkError::Config("token pepper is not configured".into()))
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

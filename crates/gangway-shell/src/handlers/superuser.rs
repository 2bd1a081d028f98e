//! Superuser creation surface.
//!
//! The panel fires `create-superuser` and waits on the `superuser-created`
//! event. Every started attempt ends with exactly one terminal event, whether
//! it validated, failed, or was cancelled. Transport errors are never used to
//! signal creation failure.

use crate::config::BackendConfig;
use crate::error::{Result, ShellError};
use crate::state::ShellState;
use gangway_bridge::{channel, CreationResult, SuperuserRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// `create-superuser` handler. Spawned so the dispatcher stays responsive.
pub fn create(state: Arc<ShellState>, req: SuperuserRequest) {
    tokio::spawn(async move {
        let result = match validate(&req) {
            Err(e) => CreationResult {
                success: false,
                message: e.to_string(),
            },
            Ok(()) => attempt(&state, &req).await,
        };
        if result.success {
            info!("superuser '{}' created", req.username);
        } else {
            warn!("superuser creation failed: {}", result.message);
        }
        state.sink.publish(channel::SUPERUSER_CREATED, &result);
    });
}

fn validate(req: &SuperuserRequest) -> Result<()> {
    if req.username.trim().is_empty() {
        return Err(ShellError::Validation {
            field: "username".to_string(),
            message: "username must not be empty".to_string(),
        });
    }
    if !req.email.contains('@') {
        return Err(ShellError::Validation {
            field: "email".to_string(),
            message: "email address is not valid".to_string(),
        });
    }
    if req.password.len() < 8 {
        return Err(ShellError::Validation {
            field: "password".to_string(),
            message: "password must be at least 8 characters".to_string(),
        });
    }
    Ok(())
}

async fn attempt(state: &ShellState, req: &SuperuserRequest) -> CreationResult {
    let token = state.begin_superuser().await;
    let url = format!("{}{}", state.backend_base_url, BackendConfig::SUPERUSER_PATH);
    let request = state.http.post(&url).json(req).send();
    tokio::pin!(request);

    // The HTTP future cannot observe the token itself, so race it against a
    // cancellation poll.
    let response = loop {
        tokio::select! {
            outcome = &mut request => break outcome,
            _ = tokio::time::sleep(Duration::from_millis(100)) => {
                if token.is_cancelled() {
                    return CreationResult {
                        success: false,
                        message: "Superuser creation cancelled".to_string(),
                    };
                }
            }
        }
    };

    match response {
        Ok(resp) if resp.status().is_success() => CreationResult {
            success: true,
            message: format!("Superuser '{}' created", req.username),
        },
        Ok(resp) => {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            CreationResult {
                success: false,
                message: format!("Backend rejected the request ({}): {}", status, body),
            }
        }
        Err(e) => CreationResult {
            success: false,
            message: format!("Could not reach the backend: {}", e),
        },
    }
}

/// `cancel-superuser` handler.
pub async fn cancel(state: &ShellState) {
    if state.cancel_superuser().await {
        info!("superuser creation cancelled by panel");
    }
}

/// `close-superuser-window` handler. The composition root owns the window.
pub fn close_window(state: &ShellState) {
    state.request_close();
}

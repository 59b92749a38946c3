use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio_stream::{wrappers::ReceiverStream, Stream};

use crate::domain::auth::{AuthResponse, CredentialsRequest, SessionEvents};
use crate::domain::user::UserSession;
use crate::{domain::auth::AuthService, error::AppResult, infrastructure::auth::AuthUser};

pub struct AuthController {
    auth_service: Arc<AuthService>,
    events: Arc<SessionEvents>,
}

impl AuthController {
    pub fn new(auth_service: Arc<AuthService>, events: Arc<SessionEvents>) -> Self {
        Self {
            auth_service,
            events,
        }
    }

    /// POST /auth/signup - Create an account and sign in
    pub async fn signup(
        State(controller): State<Arc<AuthController>>,
        Json(request): Json<CredentialsRequest>,
    ) -> AppResult<(StatusCode, Json<AuthResponse>)> {
        let response = controller
            .auth_service
            .sign_up(&request.email, &request.password)
            .await?;
        Ok((StatusCode::CREATED, Json(response)))
    }

    /// POST /auth/signin - Sign in with email and password
    pub async fn signin(
        State(controller): State<Arc<AuthController>>,
        Json(request): Json<CredentialsRequest>,
    ) -> AppResult<Json<AuthResponse>> {
        let response = controller
            .auth_service
            .sign_in(&request.email, &request.password)
            .await?;
        Ok(Json(response))
    }

    /// POST /auth/signout - End the current session
    pub async fn signout(
        State(controller): State<Arc<AuthController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<StatusCode> {
        controller
            .auth_service
            .sign_out(auth_user.session_id, auth_user.user_id)
            .await?;
        Ok(StatusCode::NO_CONTENT)
    }

    /// GET /api/session - Current session
    pub async fn session(
        State(controller): State<Arc<AuthController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<UserSession>> {
        let session = controller
            .auth_service
            .current_session(auth_user.session_id)
            .await?;
        Ok(Json(session))
    }

    /// POST /api/subscription/upgrade - Switch the account to pro
    pub async fn upgrade(
        State(controller): State<Arc<AuthController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<UserSession>> {
        let session = controller
            .auth_service
            .upgrade_to_pro(auth_user.user_id)
            .await?;
        Ok(Json(session))
    }

    /// GET /api/session/events - Stream of changes to the caller's session
    ///
    /// Closes once the caller's own session is signed out or revoked.
    pub async fn events(
        State(controller): State<Arc<AuthController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
        let (user_id, session_id) = (auth_user.user_id, auth_user.session_id);
        tracing::debug!(user_id = %user_id, session_id = %session_id, "Session event stream opened");

        let mut updates = controller.events.subscribe();
        let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(16);
        let snapshot = Event::default()
            .event("session")
            .json_data(auth_user.session());

        tokio::spawn(async move {
            if let Ok(snapshot) = snapshot {
                if tx.send(Ok(snapshot)).await.is_err() {
                    return;
                }
            }

            loop {
                let received = tokio::select! {
                    _ = tx.closed() => break,
                    received = updates.recv() => received,
                };

                let event = match received {
                    Ok(event) if event.is_for(user_id, session_id) => event,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(user_id = %user_id, skipped, "Session event stream lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                if let Ok(data) = Event::default().event(event.name()).json_data(&event) {
                    if tx.send(Ok(data)).await.is_err() {
                        break;
                    }
                }

                if event.ends_session() {
                    tracing::debug!(
                        session_id = %session_id,
                        event = event.name(),
                        "Session ended, closing event stream"
                    );
                    break;
                }
            }
        });

        Sse::new(ReceiverStream::new(rx)).keep_alive(KeepAlive::default())
    }
}

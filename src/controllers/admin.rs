use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::user::dto::{AdminStats, UpdateUserRequest, UserListQuery, UserSummary};
use crate::{domain::admin::AdminService, error::AppResult};

pub struct AdminController {
    admin_service: Arc<AdminService>,
}

impl AdminController {
    pub fn new(admin_service: Arc<AdminService>) -> Self {
        Self { admin_service }
    }

    /// GET /api/admin/users?search= - List users
    pub async fn list_users(
        State(controller): State<Arc<AdminController>>,
        Query(query): Query<UserListQuery>,
    ) -> AppResult<Json<Vec<UserSummary>>> {
        let users = controller
            .admin_service
            .list_users(query.search.as_deref())
            .await?;
        Ok(Json(users))
    }

    /// GET /api/admin/stats - User and revenue totals
    pub async fn stats(State(controller): State<Arc<AdminController>>) -> AppResult<Json<AdminStats>> {
        Ok(Json(controller.admin_service.stats().await?))
    }

    /// PATCH /api/admin/users/{id} - Change email or tier
    pub async fn update_user(
        State(controller): State<Arc<AdminController>>,
        Path(user_id): Path<Uuid>,
        Json(request): Json<UpdateUserRequest>,
    ) -> AppResult<Json<UserSummary>> {
        let user = controller
            .admin_service
            .update_user(user_id, request)
            .await?;
        Ok(Json(user))
    }

    /// DELETE /api/admin/users/{id} - Remove a user
    pub async fn delete_user(
        State(controller): State<Arc<AdminController>>,
        Path(user_id): Path<Uuid>,
    ) -> AppResult<StatusCode> {
        controller.admin_service.delete_user(user_id).await?;
        Ok(StatusCode::NO_CONTENT)
    }
}

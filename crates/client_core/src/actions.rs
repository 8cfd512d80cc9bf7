use std::sync::Arc;

use shared::{
    domain::{CourseId, EnrollmentId, EnrollmentStatus, LessonId, NotificationId, UserId},
    protocol::{
        ChatCreated, CoursePublishRequest, EnrollRequest, EnrollmentStatusRequest,
        LessonProgressRequest, LoginRequest, LoginResponse, LogoutRequest, StartChatRequest,
        UserBlockRequest,
    },
};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::{
    config::ClientSettings,
    credentials::{CredentialStore, REFRESH_TOKEN_KEY},
    executor::{decode_body, ActionError, ActionRequest, RequestExecutor},
    page::Page,
    transport::{ApiResponse, Transport},
};

pub const HOME_PAGE: &str = "/";
pub const LOGIN_PAGE: &str = "/login";

pub const LOGIN_FAILED: &str = "Could not log in. Please check your credentials and try again";
pub const START_CHAT_FAILED: &str = "Could not start chat. Please try again";
pub const ENROLL_FAILED: &str = "Could not enroll user in course. Please try again";
pub const DISMISS_NOTIFICATION_FAILED: &str = "Could not dismiss notification. Please try again";
pub const LESSON_COMPLETION_FAILED: &str = "Could not update lesson completion. Please try again";
pub const ENROLLMENT_STATUS_FAILED: &str = "Could not update enrollment status. Please try again";
pub const BLOCK_USER_FAILED: &str = "Could not block user. Please try again";
pub const UNBLOCK_USER_FAILED: &str = "Could not unblock user. Please try again";
pub const PUBLISH_COURSE_FAILED: &str = "Could not publish course. Please try again";

mod paths {
    use shared::domain::{ChatId, CourseId, EnrollmentId, LessonId, NotificationId};

    pub const LOGIN: &str = "/api/login/";
    pub const LOGOUT: &str = "/api/logout/";
    pub const CHATS: &str = "/api/chats/";
    pub const USER_BLOCK: &str = "/api/users/block/";

    pub fn course(id: CourseId) -> String {
        format!("/api/courses/{id}/")
    }

    pub fn course_enrollments(id: CourseId) -> String {
        format!("/api/courses/{id}/enrollments/")
    }

    pub fn enrollment(id: EnrollmentId) -> String {
        format!("/api/courses/enrollments/{id}/")
    }

    pub fn notification_dismiss(id: NotificationId) -> String {
        format!("/api/notifications/{id}/dismiss/")
    }

    pub fn lesson_progress(id: LessonId) -> String {
        format!("/api/lessons/{id}/progress/")
    }

    pub fn chat_page(id: ChatId) -> String {
        format!("/chats/{id}")
    }
}

/// What an action ended up doing to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Navigated(String),
    Reloaded,
    Alerted {
        message: &'static str,
        reason: String,
    },
}

/// Page effect requested by a successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Reload,
    To(String),
}

/// A user action as a value, for hosts that queue or spawn them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Login {
        email: String,
        password: String,
    },
    Logout,
    StartChat {
        user_ids: Vec<UserId>,
    },
    Enroll {
        course_id: CourseId,
        user_id: Option<UserId>,
    },
    DismissNotification {
        notification_id: NotificationId,
    },
    UpdateLessonCompletion {
        lesson_id: LessonId,
        completed: bool,
    },
    UpdateEnrollmentStatus {
        enrollment_id: EnrollmentId,
        status: EnrollmentStatus,
    },
    BlockUser {
        blocked_by: UserId,
        blocked_user: UserId,
    },
    UnblockUser {
        blocked_by: UserId,
        blocked_user: UserId,
    },
    PublishCourse {
        course_id: CourseId,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Login { .. } => "login",
            Action::Logout => "logout",
            Action::StartChat { .. } => "start_chat",
            Action::Enroll { .. } => "enroll",
            Action::DismissNotification { .. } => "dismiss_notification",
            Action::UpdateLessonCompletion { .. } => "update_lesson_completion",
            Action::UpdateEnrollmentStatus { .. } => "update_enrollment_status",
            Action::BlockUser { .. } => "block_user",
            Action::UnblockUser { .. } => "unblock_user",
            Action::PublishCourse { .. } => "publish_course",
        }
    }
}

pub struct ActionDispatcher {
    executor: RequestExecutor,
    credentials: Arc<dyn CredentialStore>,
    page: Arc<dyn Page>,
}

impl ActionDispatcher {
    pub fn new(
        settings: &ClientSettings,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
        page: Arc<dyn Page>,
    ) -> anyhow::Result<Self> {
        let executor = RequestExecutor::new(
            settings.api_root()?,
            settings.csrf_cookie_name.clone(),
            settings.csrf_header.clone(),
            transport,
            Arc::clone(&credentials),
        );
        Ok(Self {
            executor,
            credentials,
            page,
        })
    }

    pub async fn dispatch(&self, action: Action) -> ActionOutcome {
        match action {
            Action::Login { email, password } => self.login(&email, &password).await,
            Action::Logout => self.logout().await,
            Action::StartChat { user_ids } => self.start_chat(user_ids).await,
            Action::Enroll { course_id, user_id } => self.enroll(course_id, user_id).await,
            Action::DismissNotification { notification_id } => {
                self.dismiss_notification(notification_id).await
            }
            Action::UpdateLessonCompletion {
                lesson_id,
                completed,
            } => self.update_lesson_completion(lesson_id, completed).await,
            Action::UpdateEnrollmentStatus {
                enrollment_id,
                status,
            } => self.update_enrollment_status(enrollment_id, status).await,
            Action::BlockUser {
                blocked_by,
                blocked_user,
            } => self.block_user(blocked_by, blocked_user).await,
            Action::UnblockUser {
                blocked_by,
                blocked_user,
            } => self.unblock_user(blocked_by, blocked_user).await,
            Action::PublishCourse { course_id } => self.publish_course(course_id).await,
        }
    }

    /// Runs `action` on the tokio runtime without waiting for it.
    pub fn spawn(self: &Arc<Self>, action: Action) -> JoinHandle<ActionOutcome> {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move { dispatcher.dispatch(action).await })
    }

    pub async fn login(&self, email: &str, password: &str) -> ActionOutcome {
        let request = ActionRequest::post(paths::LOGIN).with_body(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        });
        self.run("login", request, LOGIN_FAILED, |res| {
            let tokens: LoginResponse = decode_body(&res)?;
            self.credentials
                .store_session_tokens(&tokens.access, &tokens.refresh)
                .map_err(ActionError::Storage)?;
            Ok(Navigation::To(HOME_PAGE.to_string()))
        })
        .await
    }

    /// Ends the session locally whatever the server says: tokens are cleared
    /// and the page goes home after the request settles. Never alerts.
    pub async fn logout(&self) -> ActionOutcome {
        let refresh = self.credentials.read_token(REFRESH_TOKEN_KEY);
        info!(action = "logout", has_refresh = refresh.is_some(), "dispatching action");

        let result = match ActionRequest::post(paths::LOGOUT).with_body(&LogoutRequest { refresh })
        {
            Ok(request) => self.executor.execute(request).await.map(|_| ()),
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            error!(action = "logout", reason = %err.reason(), "logout request failed");
        }

        self.credentials.clear_session_tokens();
        self.page.navigate_to(HOME_PAGE);
        ActionOutcome::Navigated(HOME_PAGE.to_string())
    }

    pub async fn start_chat(&self, user_ids: Vec<UserId>) -> ActionOutcome {
        let request = ActionRequest::post(paths::CHATS).with_body(&StartChatRequest { user_ids });
        self.run("start_chat", request, START_CHAT_FAILED, |res| {
            let chat: ChatCreated = decode_body(&res)?;
            Ok(Navigation::To(paths::chat_page(chat.pk)))
        })
        .await
    }

    /// Anonymous visitors are sent to the login page instead of enrolling.
    /// A non-positive id counts as anonymous.
    pub async fn enroll(&self, course_id: CourseId, user_id: Option<UserId>) -> ActionOutcome {
        let Some(user_id) = user_id.filter(|id| id.0 > 0) else {
            info!(action = "enroll", course_id = course_id.0, "no user; redirecting to login");
            self.page.navigate_to(LOGIN_PAGE);
            return ActionOutcome::Navigated(LOGIN_PAGE.to_string());
        };

        let request = ActionRequest::post(paths::course_enrollments(course_id))
            .with_body(&EnrollRequest { user_id });
        self.run("enroll", request, ENROLL_FAILED, reload).await
    }

    pub async fn dismiss_notification(&self, notification_id: NotificationId) -> ActionOutcome {
        let request = Ok(ActionRequest::post(paths::notification_dismiss(
            notification_id,
        )));
        self.run(
            "dismiss_notification",
            request,
            DISMISS_NOTIFICATION_FAILED,
            reload,
        )
        .await
    }

    pub async fn update_lesson_completion(
        &self,
        lesson_id: LessonId,
        completed: bool,
    ) -> ActionOutcome {
        let request = ActionRequest::put(paths::lesson_progress(lesson_id))
            .with_body(&LessonProgressRequest { completed });
        self.run(
            "update_lesson_completion",
            request,
            LESSON_COMPLETION_FAILED,
            reload,
        )
        .await
    }

    pub async fn update_enrollment_status(
        &self,
        enrollment_id: EnrollmentId,
        status: EnrollmentStatus,
    ) -> ActionOutcome {
        let request = ActionRequest::patch(paths::enrollment(enrollment_id))
            .with_body(&EnrollmentStatusRequest { status });
        self.run(
            "update_enrollment_status",
            request,
            ENROLLMENT_STATUS_FAILED,
            reload,
        )
        .await
    }

    pub async fn block_user(&self, blocked_by: UserId, blocked_user: UserId) -> ActionOutcome {
        let request = ActionRequest::post(paths::USER_BLOCK).with_body(&UserBlockRequest {
            blocked_by,
            blocked_user,
        });
        self.run("block_user", request, BLOCK_USER_FAILED, reload)
            .await
    }

    pub async fn unblock_user(&self, blocked_by: UserId, blocked_user: UserId) -> ActionOutcome {
        let request = ActionRequest::delete(paths::USER_BLOCK).with_body(&UserBlockRequest {
            blocked_by,
            blocked_user,
        });
        self.run("unblock_user", request, UNBLOCK_USER_FAILED, reload)
            .await
    }

    pub async fn publish_course(&self, course_id: CourseId) -> ActionOutcome {
        let request =
            ActionRequest::patch(paths::course(course_id)).with_body(&CoursePublishRequest::publish());
        self.run("publish_course", request, PUBLISH_COURSE_FAILED, reload)
            .await
    }

    async fn run<F>(
        &self,
        action: &'static str,
        request: Result<ActionRequest, ActionError>,
        failure_message: &'static str,
        on_success: F,
    ) -> ActionOutcome
    where
        F: FnOnce(ApiResponse) -> Result<Navigation, ActionError>,
    {
        let result = match request {
            Ok(request) => {
                info!(action, method = %request.method, path = %request.path, "dispatching action");
                self.executor.execute(request).await.and_then(on_success)
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(Navigation::Reload) => {
                self.page.reload();
                ActionOutcome::Reloaded
            }
            Ok(Navigation::To(location)) => {
                self.page.navigate_to(&location);
                ActionOutcome::Navigated(location)
            }
            Err(err) => {
                let reason = err.reason();
                error!(action, reason = %reason, "action failed");
                self.page.alert(failure_message);
                ActionOutcome::Alerted {
                    message: failure_message,
                    reason,
                }
            }
        }
    }
}

fn reload(_: ApiResponse) -> Result<Navigation, ActionError> {
    Ok(Navigation::Reload)
}

#[cfg(test)]
#[path = "tests/actions_tests.rs"]
mod tests;

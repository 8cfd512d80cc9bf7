use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, Action, ActionDispatcher, ActionOutcome, FileCredentials, Page,
    ReqwestTransport,
};
use shared::domain::{CourseId, EnrollmentId, EnrollmentStatus, LessonId, NotificationId, UserId};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Fire course site actions against the REST API")]
struct Cli {
    /// Settings file; defaults to ./client.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    base_url: Option<String>,
    /// Raw cookie header, e.g. "csrftoken=...; sessionid=...".
    #[arg(long, env = "COURSE_COOKIES")]
    cookie: Option<String>,
    #[arg(long)]
    session_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        email: String,
        #[arg(long, env = "COURSE_PASSWORD")]
        password: String,
    },
    Logout,
    StartChat {
        #[arg(required = true, num_args = 1..)]
        user_ids: Vec<i64>,
    },
    Enroll {
        course_id: i64,
        #[arg(long)]
        user_id: Option<i64>,
    },
    DismissNotification {
        notification_id: i64,
    },
    CompleteLesson {
        lesson_id: i64,
        /// Mark the lesson as not completed instead.
        #[arg(long)]
        undo: bool,
    },
    SetEnrollmentStatus {
        enrollment_id: i64,
        status: EnrollmentStatus,
    },
    Block {
        blocked_by: i64,
        blocked_user: i64,
    },
    Unblock {
        blocked_by: i64,
        blocked_user: i64,
    },
    PublishCourse {
        course_id: i64,
    },
}

impl From<Command> for Action {
    fn from(command: Command) -> Self {
        match command {
            Command::Login { email, password } => Action::Login { email, password },
            Command::Logout => Action::Logout,
            Command::StartChat { user_ids } => Action::StartChat {
                user_ids: user_ids.into_iter().map(UserId).collect(),
            },
            Command::Enroll { course_id, user_id } => Action::Enroll {
                course_id: CourseId(course_id),
                user_id: user_id.map(UserId),
            },
            Command::DismissNotification { notification_id } => Action::DismissNotification {
                notification_id: NotificationId(notification_id),
            },
            Command::CompleteLesson { lesson_id, undo } => Action::UpdateLessonCompletion {
                lesson_id: LessonId(lesson_id),
                completed: !undo,
            },
            Command::SetEnrollmentStatus {
                enrollment_id,
                status,
            } => Action::UpdateEnrollmentStatus {
                enrollment_id: EnrollmentId(enrollment_id),
                status,
            },
            Command::Block {
                blocked_by,
                blocked_user,
            } => Action::BlockUser {
                blocked_by: UserId(blocked_by),
                blocked_user: UserId(blocked_user),
            },
            Command::Unblock {
                blocked_by,
                blocked_user,
            } => Action::UnblockUser {
                blocked_by: UserId(blocked_by),
                blocked_user: UserId(blocked_user),
            },
            Command::PublishCourse { course_id } => Action::PublishCourse {
                course_id: CourseId(course_id),
            },
        }
    }
}

/// Terminal stand-in for the browser document.
struct ConsolePage {
    base_url: String,
}

impl Page for ConsolePage {
    fn navigate_to(&self, location: &str) {
        println!("navigate: {}{location}", self.base_url);
    }

    fn reload(&self) {
        println!("reload");
    }

    fn alert(&self, message: &str) {
        eprintln!("alert: {message}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    if let Some(session_file) = cli.session_file {
        settings.session_file = session_file.to_string_lossy().into_owned();
    }
    let api_root = settings.api_root()?;

    let credentials = Arc::new(FileCredentials::new(&settings.session_file, cli.cookie));
    let page = Arc::new(ConsolePage {
        base_url: api_root.clone(),
    });
    let dispatcher = ActionDispatcher::new(
        &settings,
        Arc::new(ReqwestTransport::new()),
        credentials,
        page,
    )?;

    let action = Action::from(cli.command);
    info!(action = action.name(), api_root = %api_root, "running action");
    if let ActionOutcome::Alerted { reason, .. } = dispatcher.dispatch(action).await {
        anyhow::bail!("action failed: {reason}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Action {
        let cli = Cli::try_parse_from(std::iter::once("course_actions").chain(args.iter().copied()))
            .expect("parse");
        Action::from(cli.command)
    }

    #[test]
    fn complete_lesson_defaults_to_completed() {
        assert_eq!(
            parse(&["complete-lesson", "42"]),
            Action::UpdateLessonCompletion {
                lesson_id: LessonId(42),
                completed: true,
            }
        );
        assert_eq!(
            parse(&["complete-lesson", "42", "--undo"]),
            Action::UpdateLessonCompletion {
                lesson_id: LessonId(42),
                completed: false,
            }
        );
    }

    #[test]
    fn enroll_user_is_optional() {
        assert_eq!(
            parse(&["enroll", "5"]),
            Action::Enroll {
                course_id: CourseId(5),
                user_id: None,
            }
        );
        assert_eq!(
            parse(&["enroll", "5", "--user-id", "11"]),
            Action::Enroll {
                course_id: CourseId(5),
                user_id: Some(UserId(11)),
            }
        );
    }

    #[test]
    fn enrollment_status_is_parsed() {
        assert_eq!(
            parse(&["set-enrollment-status", "8", "completed"]),
            Action::UpdateEnrollmentStatus {
                enrollment_id: EnrollmentId(8),
                status: EnrollmentStatus::Completed,
            }
        );
        assert!(Cli::try_parse_from(["course_actions", "set-enrollment-status", "8", "paused"])
            .is_err());
    }

    #[test]
    fn login_takes_email_and_password() {
        assert_eq!(
            parse(&["login", "student@example.com", "--password", "pw"]),
            Action::Login {
                email: "student@example.com".into(),
                password: "pw".into(),
            }
        );
    }

    #[test]
    fn start_chat_needs_user_ids() {
        assert_eq!(
            parse(&["start-chat", "1", "2", "3"]),
            Action::StartChat {
                user_ids: vec![UserId(1), UserId(2), UserId(3)],
            }
        );
        assert!(Cli::try_parse_from(["course_actions", "start-chat"]).is_err());
    }
}

//! Shared wiring for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskboard::{
    automation::{
        adapters::memory::{InMemoryAutomationRepository, InMemoryBadgeLedger},
        services::{ActionExecutor, AutomationEngine, AutomationService},
    },
    board::Board,
    concurrency::ProjectWriteLocks,
    config::EngineConfig,
    notification::{
        adapters::memory::InMemoryNotificationStore, ports::NotificationDelivery,
        services::NotificationService,
    },
    project::{
        adapters::memory::InMemoryProjectRepository,
        domain::{MemberRole, Project, UserId},
        services::{AddMemberRequest, CreateProjectRequest, ProjectService},
    },
    realtime::{
        adapters::{RealtimeDispatcher, SubscriptionRegistry},
        domain::RealtimeMessage,
        ports::EventDispatcher,
    },
    task::{adapters::memory::InMemoryTaskRepository, services::TaskService},
};
use tokio::sync::mpsc::UnboundedReceiver;

/// Board type wired to in-memory adapters.
pub type TestBoard = Board<
    InMemoryTaskRepository,
    InMemoryProjectRepository,
    InMemoryAutomationRepository,
    InMemoryBadgeLedger,
    DefaultClock,
>;

/// Every service of the crate, sharing one set of in-memory stores and one
/// realtime subscription registry.
pub struct App {
    pub projects: ProjectService<InMemoryProjectRepository, InMemoryTaskRepository, DefaultClock>,
    pub automations:
        AutomationService<InMemoryAutomationRepository, InMemoryProjectRepository, DefaultClock>,
    pub notifications: NotificationService<InMemoryNotificationStore>,
    pub board: TestBoard,
    pub badges: Arc<InMemoryBadgeLedger>,
    pub registry: Arc<SubscriptionRegistry>,
}

impl App {
    /// Wires the services according to the configuration.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_delivery(config, |_, inbox| -> Arc<dyn NotificationDelivery> { inbox })
    }

    /// Wires the services, routing automation notifications through the
    /// delivery built from the task store and the inbox.
    #[must_use]
    pub fn with_delivery<F>(config: &EngineConfig, make_delivery: F) -> Self
    where
        F: FnOnce(
            Arc<InMemoryTaskRepository>,
            Arc<InMemoryNotificationStore>,
        ) -> Arc<dyn NotificationDelivery>,
    {
        let project_repo = Arc::new(InMemoryProjectRepository::new());
        let task_repo = Arc::new(InMemoryTaskRepository::new());
        let automation_repo = Arc::new(InMemoryAutomationRepository::new());
        let badges = Arc::new(InMemoryBadgeLedger::new());
        let inbox = Arc::new(InMemoryNotificationStore::new());
        let registry = Arc::new(SubscriptionRegistry::new());
        let dispatcher: Arc<dyn EventDispatcher> =
            Arc::new(RealtimeDispatcher::new(Arc::clone(&registry)));
        let delivery = make_delivery(Arc::clone(&task_repo), Arc::clone(&inbox));
        let locks = Arc::new(ProjectWriteLocks::new());
        let clock = Arc::new(DefaultClock);

        let tasks = Arc::new(
            TaskService::new(
                Arc::clone(&task_repo),
                Arc::clone(&project_repo),
                Arc::clone(&dispatcher),
                Arc::clone(&locks),
                Arc::clone(&clock),
            )
            .with_config(config.clone()),
        );
        let executor = ActionExecutor::new(
            Arc::clone(&tasks),
            Arc::clone(&project_repo),
            Arc::clone(&badges),
            delivery,
            Arc::clone(&clock),
        )
        .with_timeout(config.action_timeout());
        let engine = AutomationEngine::new(
            Arc::clone(&automation_repo),
            executor,
            Arc::clone(&dispatcher),
            Arc::clone(&locks),
            Arc::clone(&clock),
        )
        .with_hop_limit(config.hop_limit);

        Self {
            projects: ProjectService::new(
                Arc::clone(&project_repo),
                task_repo,
                dispatcher,
                locks,
                Arc::clone(&clock),
            ),
            automations: AutomationService::new(automation_repo, project_repo, clock),
            notifications: NotificationService::new(inbox)
                .with_list_limit(config.notification_list_limit),
            board: Board::new(tasks, engine),
            badges,
            registry,
        }
    }

    /// Creates a project owned by `owner` with `editor` as an editor.
    ///
    /// # Errors
    ///
    /// Returns an error if project creation or membership fails.
    pub async fn shared_project(
        &self,
        owner: UserId,
        editor: UserId,
    ) -> Result<Project, eyre::Report> {
        let project = self
            .projects
            .create_project(owner, CreateProjectRequest::new("Launch"))
            .await?;
        self.projects
            .add_member(
                owner,
                project.id(),
                AddMemberRequest::new(editor).with_role(MemberRole::Editor),
            )
            .await?;
        Ok(self.projects.get_project(owner, project.id()).await?)
    }

    /// Opens a connection subscribed to the project's room.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription is refused.
    pub fn watch(
        &self,
        project: &Project,
    ) -> Result<UnboundedReceiver<RealtimeMessage>, eyre::Report> {
        let (connection, receiver) = self.registry.connect();
        self.registry.subscribe(connection, project.id())?;
        Ok(receiver)
    }
}

/// Provides services with the default configuration.
#[fixture]
pub fn app() -> App {
    App::new(&EngineConfig::default())
}

/// Returns every message already queued on the connection.
pub fn drain(receiver: &mut UnboundedReceiver<RealtimeMessage>) -> Vec<RealtimeMessage> {
    std::iter::from_fn(|| receiver.try_recv().ok()).collect()
}

//! Shared world state for automation rule BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskboard::{
    automation::{
        adapters::memory::{InMemoryAutomationRepository, InMemoryBadgeLedger},
        domain::AutomationId,
        services::{ActionExecutor, AutomationEngine, AutomationService, CascadeReport},
    },
    board::Board,
    concurrency::ProjectWriteLocks,
    error::ErrorKind,
    notification::{adapters::memory::InMemoryNotificationStore, ports::NotificationDelivery},
    project::{
        adapters::memory::InMemoryProjectRepository,
        domain::{Project, UserId},
        services::ProjectService,
    },
    realtime::{adapters::RecordingDispatcher, ports::EventDispatcher},
    task::{adapters::memory::InMemoryTaskRepository, domain::Task, services::TaskService},
};

/// Board type used by the BDD world.
pub type TestBoard = Board<
    InMemoryTaskRepository,
    InMemoryProjectRepository,
    InMemoryAutomationRepository,
    InMemoryBadgeLedger,
    DefaultClock,
>;

/// Scenario world for automation rule behaviour tests.
pub struct AutomationWorld {
    pub projects: ProjectService<InMemoryProjectRepository, InMemoryTaskRepository, DefaultClock>,
    pub automations:
        AutomationService<InMemoryAutomationRepository, InMemoryProjectRepository, DefaultClock>,
    pub board: TestBoard,
    pub badges: Arc<InMemoryBadgeLedger>,
    pub users: HashMap<String, UserId>,
    pub rules: HashMap<String, AutomationId>,
    pub project: Option<Project>,
    pub task: Option<Task>,
    pub history_before_move: Option<usize>,
    pub last_cascade: Option<CascadeReport>,
    pub refusal: Option<ErrorKind>,
}

impl AutomationWorld {
    /// Creates a world with in-memory services and no scenario state.
    #[must_use]
    pub fn new() -> Self {
        let project_repo = Arc::new(InMemoryProjectRepository::new());
        let task_repo = Arc::new(InMemoryTaskRepository::new());
        let automation_repo = Arc::new(InMemoryAutomationRepository::new());
        let badges = Arc::new(InMemoryBadgeLedger::new());
        let dispatcher: Arc<dyn EventDispatcher> = Arc::new(RecordingDispatcher::new());
        let delivery: Arc<dyn NotificationDelivery> = Arc::new(InMemoryNotificationStore::new());
        let locks = Arc::new(ProjectWriteLocks::new());
        let clock = Arc::new(DefaultClock);

        let tasks = Arc::new(TaskService::new(
            Arc::clone(&task_repo),
            Arc::clone(&project_repo),
            Arc::clone(&dispatcher),
            Arc::clone(&locks),
            Arc::clone(&clock),
        ));
        let executor = ActionExecutor::new(
            Arc::clone(&tasks),
            Arc::clone(&project_repo),
            Arc::clone(&badges),
            delivery,
            Arc::clone(&clock),
        );
        let engine = AutomationEngine::new(
            Arc::clone(&automation_repo),
            executor,
            Arc::clone(&dispatcher),
            Arc::clone(&locks),
            Arc::clone(&clock),
        );

        Self {
            projects: ProjectService::new(
                Arc::clone(&project_repo),
                task_repo,
                dispatcher,
                locks,
                Arc::clone(&clock),
            ),
            automations: AutomationService::new(automation_repo, project_repo, clock),
            board: Board::new(tasks, engine),
            badges,
            users: HashMap::new(),
            rules: HashMap::new(),
            project: None,
            task: None,
            history_before_move: None,
            last_cascade: None,
            refusal: None,
        }
    }

    /// Returns the identifier for a named user, creating it on first use.
    pub fn user(&mut self, name: &str) -> UserId {
        *self.users.entry(name.to_owned()).or_insert_with(UserId::new)
    }

    /// Returns the identifier of a user already named in the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if the user has not been introduced.
    pub fn known_user(&self, name: &str) -> Result<UserId, eyre::Report> {
        self.users
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown user {name} in scenario world"))
    }

    /// Returns the scenario project.
    ///
    /// # Errors
    ///
    /// Returns an error if no project has been created.
    pub fn project(&self) -> Result<&Project, eyre::Report> {
        self.project
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing project in scenario world"))
    }

    /// Returns the scenario task.
    ///
    /// # Errors
    ///
    /// Returns an error if no task has been created.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Returns the identifier of a named automation.
    ///
    /// # Errors
    ///
    /// Returns an error if the automation has not been created.
    pub fn rule(&self, name: &str) -> Result<AutomationId, eyre::Report> {
        self.rules
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown automation {name} in scenario world"))
    }
}

impl Default for AutomationWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> AutomationWorld {
    AutomationWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

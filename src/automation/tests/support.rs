//! Shared wiring for automation unit tests.

use std::sync::Arc;

use crate::automation::{
    adapters::memory::{InMemoryAutomationRepository, InMemoryBadgeLedger},
    domain::{Action, ActionPayload, Automation, NewAutomation, Trigger, TriggerPayload},
    ports::AutomationRepository,
    services::{ActionExecutor, AutomationEngine},
};
use crate::concurrency::ProjectWriteLocks;
use crate::event::{Causation, DomainEvent};
use crate::notification::{adapters::memory::InMemoryNotificationStore, ports::NotificationDelivery};
use crate::project::{
    adapters::memory::InMemoryProjectRepository,
    domain::{MemberRole, NewProject, Project, StatusDefinition, StatusRegistry, UserId},
    ports::ProjectRepository,
};
use crate::realtime::{adapters::RecordingDispatcher, ports::EventDispatcher};
use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Actor, Task},
    services::{CreateTaskRequest, TaskService},
};
use mockable::DefaultClock;

pub(super) type TestTasks =
    TaskService<InMemoryTaskRepository, InMemoryProjectRepository, DefaultClock>;
pub(super) type TestExecutor = ActionExecutor<
    InMemoryTaskRepository,
    InMemoryProjectRepository,
    InMemoryBadgeLedger,
    DefaultClock,
>;
pub(super) type TestEngine = AutomationEngine<
    InMemoryTaskRepository,
    InMemoryProjectRepository,
    InMemoryAutomationRepository,
    InMemoryBadgeLedger,
    DefaultClock,
>;

/// A project with an owner and one editor, plus every collaborator the
/// engine needs, all backed by in-memory adapters.
pub(super) struct Board {
    pub(super) project: Project,
    pub(super) owner: UserId,
    pub(super) editor: UserId,
    pub(super) tasks: Arc<TestTasks>,
    pub(super) projects: Arc<InMemoryProjectRepository>,
    pub(super) automations: Arc<InMemoryAutomationRepository>,
    pub(super) badges: Arc<InMemoryBadgeLedger>,
    pub(super) inbox: Arc<InMemoryNotificationStore>,
    pub(super) dispatcher: Arc<RecordingDispatcher>,
    locks: Arc<ProjectWriteLocks>,
}

pub(super) async fn board() -> Board {
    board_with(None).await
}

pub(super) async fn board_with_statuses(names: &[&str]) -> Board {
    let registry =
        StatusRegistry::from_definitions(names.iter().map(|name| StatusDefinition::new(*name)))
            .expect("registry should be valid");
    board_with(Some(registry)).await
}

async fn board_with(statuses: Option<StatusRegistry>) -> Board {
    let owner = UserId::new();
    let editor = UserId::new();
    let mut project = Project::new(
        NewProject {
            title: "Automations".to_owned(),
            description: None,
            owner,
            statuses,
        },
        &DefaultClock,
    )
    .expect("project should be valid");
    project
        .add_member(editor, MemberRole::Editor, &DefaultClock)
        .expect("editor should be added");

    let projects = Arc::new(InMemoryProjectRepository::new());
    projects
        .store(&project)
        .await
        .expect("project should be stored");
    let dispatcher = Arc::new(RecordingDispatcher::new());
    let port: Arc<dyn EventDispatcher> = dispatcher.clone();
    let locks = Arc::new(ProjectWriteLocks::new());
    let tasks = Arc::new(TaskService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::clone(&projects),
        port,
        Arc::clone(&locks),
        Arc::new(DefaultClock),
    ));

    Board {
        project,
        owner,
        editor,
        tasks,
        projects,
        automations: Arc::new(InMemoryAutomationRepository::new()),
        badges: Arc::new(InMemoryBadgeLedger::new()),
        inbox: Arc::new(InMemoryNotificationStore::new()),
        dispatcher,
        locks,
    }
}

impl Board {
    /// Executor delivering notifications into the in-memory inbox.
    pub(super) fn executor(&self) -> TestExecutor {
        let delivery: Arc<dyn NotificationDelivery> = self.inbox.clone();
        self.executor_with(delivery)
    }

    pub(super) fn executor_with(&self, delivery: Arc<dyn NotificationDelivery>) -> TestExecutor {
        ActionExecutor::new(
            Arc::clone(&self.tasks),
            Arc::clone(&self.projects),
            Arc::clone(&self.badges),
            delivery,
            Arc::new(DefaultClock),
        )
    }

    pub(super) fn engine(&self) -> TestEngine {
        let port: Arc<dyn EventDispatcher> = self.dispatcher.clone();
        AutomationEngine::new(
            Arc::clone(&self.automations),
            self.executor(),
            port,
            Arc::clone(&self.locks),
            Arc::new(DefaultClock),
        )
    }

    /// Stores an active automation in the project.
    pub(super) async fn automation(
        &self,
        name: &str,
        trigger: TriggerPayload,
        action: ActionPayload,
    ) -> Automation {
        let automation = Automation::new(
            NewAutomation {
                project_id: self.project.id(),
                name: name.to_owned(),
                description: None,
                created_by: self.owner,
                trigger: Trigger::try_from(trigger).expect("trigger should parse"),
                action: Action::try_from(action).expect("action should parse"),
            },
            &DefaultClock,
        )
        .expect("automation should be valid");
        self.automations
            .store(&automation)
            .await
            .expect("automation should be stored");
        automation
    }

    pub(super) async fn stored(&self, automation: &Automation) -> Automation {
        self.automations
            .find_by_id(automation.id())
            .await
            .expect("lookup should succeed")
            .expect("automation should exist")
    }

    /// Creates a task, returning it with its creation event.
    pub(super) async fn create(&self, request: CreateTaskRequest) -> (Task, DomainEvent) {
        let (task, event) = self
            .tasks
            .create_task(self.owner, request)
            .await
            .expect("task creation should succeed")
            .into_parts();
        (task, event.expect("creation should publish"))
    }

    pub(super) async fn create_titled(&self, title: &str) -> (Task, DomainEvent) {
        self.create(CreateTaskRequest::new(self.project.id(), title))
            .await
    }

    /// Moves a task as the owner, returning the committed event.
    pub(super) async fn move_as_owner(&self, task: &Task, status: &str) -> DomainEvent {
        self.tasks
            .transition_status(task.id(), status, &Causation::user(self.owner))
            .await
            .expect("move should succeed")
            .into_parts()
            .1
            .expect("move should publish")
    }

    pub(super) async fn current(&self, task: &Task) -> Task {
        self.tasks
            .find_task(task.id(), Actor::System)
            .await
            .expect("task should exist")
    }
}

//! Project aggregate root.

use super::{Member, MemberRole, ProjectDomainError, ProjectId, StatusRegistry, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Reason a caller was refused access to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    /// The caller is not a member; the project is reported as missing.
    NotMember,
    /// The caller is a member but not the owner.
    NotOwner,
}

/// Validated input for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    /// Project title.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Creating user, who becomes the owner.
    pub owner: UserId,
    /// Initial registry; the canonical defaults when `None`.
    pub statuses: Option<StatusRegistry>,
}

/// Project aggregate: title, members, and the status registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    id: ProjectId,
    title: String,
    description: Option<String>,
    owner: UserId,
    members: Vec<Member>,
    statuses: StatusRegistry,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project.
#[derive(Debug, Clone)]
pub struct PersistedProjectData {
    /// Persisted project identifier.
    pub id: ProjectId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted owner.
    pub owner: UserId,
    /// Persisted members, owner included.
    pub members: Vec<Member>,
    /// Persisted status registry.
    pub statuses: StatusRegistry,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

fn normalize_title(title: &str) -> Result<String, ProjectDomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ProjectDomainError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

impl Project {
    /// Creates a project whose creator is its sole member and owner.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::EmptyTitle`] when the title is blank.
    pub fn new(data: NewProject, clock: &impl Clock) -> Result<Self, ProjectDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: ProjectId::new(),
            title: normalize_title(&data.title)?,
            description: normalize_description(data.description),
            owner: data.owner,
            members: vec![Member::new(data.owner, MemberRole::Owner, timestamp)],
            statuses: data.statuses.unwrap_or_default(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a project from persisted data.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            owner: data.owner,
            members: data.members,
            statuses: data.statuses,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the owner.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the members, owner first.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Returns the status registry.
    #[must_use]
    pub const fn statuses(&self) -> &StatusRegistry {
        &self.statuses
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the role the user holds, if they are a member.
    #[must_use]
    pub fn role_of(&self, user: UserId) -> Option<MemberRole> {
        self.members
            .iter()
            .find(|member| member.user() == user)
            .map(Member::role)
    }

    /// Returns `true` when the user is a member.
    #[must_use]
    pub fn is_member(&self, user: UserId) -> bool {
        self.role_of(user).is_some()
    }

    /// Checks that the user may read the project.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied::NotMember`] for non-members.
    pub fn ensure_member(&self, user: UserId) -> Result<(), AccessDenied> {
        if self.is_member(user) {
            Ok(())
        } else {
            Err(AccessDenied::NotMember)
        }
    }

    /// Checks that the user owns the project.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied::NotMember`] for non-members and
    /// [`AccessDenied::NotOwner`] for members without the owner role.
    pub fn ensure_owner(&self, user: UserId) -> Result<(), AccessDenied> {
        self.ensure_member(user)?;
        if self.owner == user {
            Ok(())
        } else {
            Err(AccessDenied::NotOwner)
        }
    }

    /// Replaces the title and description.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::EmptyTitle`] when the new title is blank.
    pub fn update_details(
        &mut self,
        title: Option<String>,
        description: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), ProjectDomainError> {
        if let Some(new_title) = title {
            self.title = normalize_title(&new_title)?;
        }
        if description.is_some() {
            self.description = normalize_description(description);
        }
        self.touch(clock);
        Ok(())
    }

    /// Adds a member with the given role.
    ///
    /// The owner role is held by the project owner alone; a request for it
    /// is recorded as [`MemberRole::Editor`].
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::AlreadyMember`] when the user already
    /// belongs to the project.
    pub fn add_member(
        &mut self,
        user: UserId,
        role: MemberRole,
        clock: &impl Clock,
    ) -> Result<Member, ProjectDomainError> {
        if self.is_member(user) {
            return Err(ProjectDomainError::AlreadyMember(user));
        }
        let granted = if role == MemberRole::Owner {
            MemberRole::Editor
        } else {
            role
        };
        let member = Member::new(user, granted, clock.utc());
        self.members.push(member.clone());
        self.touch(clock);
        Ok(member)
    }

    /// Revokes a user's membership.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::CannotRemoveOwner`] for the owner and
    /// [`ProjectDomainError::NotMember`] when the user is not a member.
    pub fn remove_member(
        &mut self,
        user: UserId,
        clock: &impl Clock,
    ) -> Result<(), ProjectDomainError> {
        if user == self.owner {
            return Err(ProjectDomainError::CannotRemoveOwner);
        }
        if !self.is_member(user) {
            return Err(ProjectDomainError::NotMember(user));
        }
        self.members.retain(|member| member.user() != user);
        self.touch(clock);
        Ok(())
    }

    /// Replaces the status registry.
    pub fn replace_statuses(&mut self, statuses: StatusRegistry, clock: &impl Clock) {
        self.statuses = statuses;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

//! Storage for contact submissions and portfolio projects.
//!
//! Handlers only see [`ContentStore`]; [`MemoryStore`] keeps everything in
//! process memory and loses it on restart.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::dto::{Contact, NewContact, Project, ProjectInput, Timestamp};

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn create_contact(&self, input: NewContact, now: Timestamp) -> anyhow::Result<Contact>;
    /// Newest first.
    async fn list_contacts(&self) -> anyhow::Result<Vec<Contact>>;
    async fn get_contact(&self, id: &str) -> anyhow::Result<Option<Contact>>;
    /// Returns `false` if no contact has that id.
    async fn mark_contact_read(&self, id: &str) -> anyhow::Result<bool>;
    async fn delete_contact(&self, id: &str) -> anyhow::Result<bool>;

    async fn create_project(&self, input: ProjectInput, now: Timestamp) -> anyhow::Result<Project>;
    /// Newest first.
    async fn list_projects(&self, featured_only: bool) -> anyhow::Result<Vec<Project>>;
    async fn get_project(&self, id: &str) -> anyhow::Result<Option<Project>>;
    async fn update_project(
        &self,
        id: &str,
        input: ProjectInput,
        now: Timestamp,
    ) -> anyhow::Result<Option<Project>>;
    async fn delete_project(&self, id: &str) -> anyhow::Result<bool>;
}

#[derive(Default)]
pub struct MemoryStore {
    contacts: DashMap<String, Contact>,
    projects: DashMap<String, Project>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn create_contact(&self, input: NewContact, now: Timestamp) -> anyhow::Result<Contact> {
        let contact = Contact {
            id: new_id(),
            name: input.name,
            email: input.email,
            subject: input.subject,
            message: input.message,
            created_at: now,
            read: false,
        };
        self.contacts.insert(contact.id.clone(), contact.clone());
        tracing::debug!("Contact stored: id={}", contact.id);
        Ok(contact)
    }

    async fn list_contacts(&self) -> anyhow::Result<Vec<Contact>> {
        let mut contacts: Vec<Contact> = self.contacts.iter().map(|e| e.value().clone()).collect();
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(contacts)
    }

    async fn get_contact(&self, id: &str) -> anyhow::Result<Option<Contact>> {
        Ok(self.contacts.get(id).map(|e| e.value().clone()))
    }

    async fn mark_contact_read(&self, id: &str) -> anyhow::Result<bool> {
        match self.contacts.get_mut(id) {
            Some(mut contact) => {
                contact.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_contact(&self, id: &str) -> anyhow::Result<bool> {
        Ok(self.contacts.remove(id).is_some())
    }

    async fn create_project(&self, input: ProjectInput, now: Timestamp) -> anyhow::Result<Project> {
        let project = Project {
            id: new_id(),
            title: input.title,
            description: input.description,
            image_url: input.image_url,
            live_url: input.live_url,
            github_url: input.github_url,
            technologies: input.technologies,
            category: input.category,
            featured: input.featured,
            created_at: now,
            updated_at: now,
        };
        self.projects.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    async fn list_projects(&self, featured_only: bool) -> anyhow::Result<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .projects
            .iter()
            .filter(|e| !featured_only || e.featured)
            .map(|e| e.value().clone())
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(projects)
    }

    async fn get_project(&self, id: &str) -> anyhow::Result<Option<Project>> {
        Ok(self.projects.get(id).map(|e| e.value().clone()))
    }

    async fn update_project(
        &self,
        id: &str,
        input: ProjectInput,
        now: Timestamp,
    ) -> anyhow::Result<Option<Project>> {
        let Some(mut project) = self.projects.get_mut(id) else {
            return Ok(None);
        };
        project.title = input.title;
        project.description = input.description;
        project.image_url = input.image_url;
        project.live_url = input.live_url;
        project.github_url = input.github_url;
        project.technologies = input.technologies;
        project.category = input.category;
        project.featured = input.featured;
        project.updated_at = now;
        Ok(Some(project.value().clone()))
    }

    async fn delete_project(&self, id: &str) -> anyhow::Result<bool> {
        Ok(self.projects.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::timestamp;

    fn new_contact(name: &str) -> NewContact {
        NewContact {
            name: name.to_string(),
            email: format!("{name}@example.com"),
            subject: "Hi".to_string(),
            message: "Hello there".to_string(),
        }
    }

    fn project(title: &str, featured: bool) -> ProjectInput {
        ProjectInput {
            title: title.to_string(),
            description: "desc".to_string(),
            image_url: String::new(),
            live_url: String::new(),
            github_url: String::new(),
            technologies: vec!["rust".to_string()],
            category: "web".to_string(),
            featured,
        }
    }

    #[tokio::test]
    async fn contacts_list_newest_first() {
        let store = MemoryStore::new();
        store.create_contact(new_contact("old"), timestamp(100)).await.unwrap();
        store.create_contact(new_contact("new"), timestamp(200)).await.unwrap();

        let names: Vec<String> = store
            .list_contacts()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn contact_starts_unread_and_can_be_marked() {
        let store = MemoryStore::new();
        let contact = store.create_contact(new_contact("ada"), timestamp(1)).await.unwrap();
        assert!(!contact.read);

        assert!(store.mark_contact_read(&contact.id).await.unwrap());
        assert!(store.get_contact(&contact.id).await.unwrap().unwrap().read);
        assert!(!store.mark_contact_read("missing").await.unwrap());
    }

    #[tokio::test]
    async fn delete_contact_reports_presence() {
        let store = MemoryStore::new();
        let contact = store.create_contact(new_contact("ada"), timestamp(1)).await.unwrap();
        assert!(store.delete_contact(&contact.id).await.unwrap());
        assert!(!store.delete_contact(&contact.id).await.unwrap());
        assert!(store.get_contact(&contact.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn featured_filter() {
        let store = MemoryStore::new();
        store.create_project(project("a", true), timestamp(1)).await.unwrap();
        store.create_project(project("b", false), timestamp(2)).await.unwrap();

        assert_eq!(store.list_projects(false).await.unwrap().len(), 2);
        let featured = store.list_projects(true).await.unwrap();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].title, "a");
    }

    #[tokio::test]
    async fn update_project_keeps_created_at() {
        let store = MemoryStore::new();
        let created = store.create_project(project("a", false), timestamp(10)).await.unwrap();

        let updated = store
            .update_project(&created.id, project("renamed", true), timestamp(20))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "renamed");
        assert!(updated.featured);
        assert_eq!(updated.created_at, timestamp(10));
        assert_eq!(updated.updated_at, timestamp(20));

        assert!(store
            .update_project("missing", project("x", false), timestamp(30))
            .await
            .unwrap()
            .is_none());
    }
}

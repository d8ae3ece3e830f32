use uuid::Uuid;

use crate::domain::{Category, Location};
use crate::error::DomainError;
use crate::policy::Viewer;

use super::Repositories;
use super::validation;

#[derive(Debug, Clone)]
pub struct CategoryDraft {
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct LocationDraft {
    pub name: String,
    pub is_published: bool,
}

#[derive(Debug, Clone, Default)]
pub struct LocationChanges {
    pub name: Option<String>,
    pub is_published: Option<bool>,
}

/// Categories and locations. Reads are public; changes need a staff account.
#[derive(Clone)]
pub struct CatalogService {
    repos: Repositories,
}

impl CatalogService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn published_categories(&self) -> Result<Vec<Category>, DomainError> {
        let categories = self.repos.categories.list().await?;
        Ok(categories.into_iter().filter(|c| c.is_published).collect())
    }

    pub async fn published_locations(&self) -> Result<Vec<Location>, DomainError> {
        let locations = self.repos.locations.list().await?;
        Ok(locations.into_iter().filter(|l| l.is_published).collect())
    }

    pub async fn create_category(
        &self,
        requester: &Viewer,
        draft: CategoryDraft,
    ) -> Result<Category, DomainError> {
        self.ensure_staff(requester).await?;
        validation::title("title", &draft.title)?;
        validation::required("description", &draft.description)?;
        validation::slug(&draft.slug)?;
        self.ensure_slug_free(&draft.slug).await?;

        let mut category = Category::new(draft.title, draft.description, draft.slug);
        category.is_published = draft.is_published;

        let category = self.repos.categories.create(category).await?;
        tracing::info!(slug = %category.slug, "Category created");
        Ok(category)
    }

    pub async fn update_category(
        &self,
        requester: &Viewer,
        slug: &str,
        changes: CategoryChanges,
    ) -> Result<Category, DomainError> {
        self.ensure_staff(requester).await?;
        let mut category = self.category_by_slug(slug).await?;

        if let Some(title) = changes.title {
            validation::title("title", &title)?;
            category.title = title;
        }
        if let Some(description) = changes.description {
            validation::required("description", &description)?;
            category.description = description;
        }
        if let Some(new_slug) = changes.slug {
            validation::slug(&new_slug)?;
            if new_slug != category.slug {
                self.ensure_slug_free(&new_slug).await?;
                category.slug = new_slug;
            }
        }
        if let Some(is_published) = changes.is_published {
            category.is_published = is_published;
        }

        let category = self.repos.categories.update(category).await?;
        tracing::info!(slug = %category.slug, "Category updated");
        Ok(category)
    }

    /// Deletes a category. Its posts stay, without a category.
    pub async fn delete_category(&self, requester: &Viewer, slug: &str) -> Result<(), DomainError> {
        self.ensure_staff(requester).await?;
        let category = self.category_by_slug(slug).await?;
        self.repos.categories.delete(category.id).await?;
        tracing::info!(slug = %slug, "Category deleted");
        Ok(())
    }

    pub async fn create_location(
        &self,
        requester: &Viewer,
        draft: LocationDraft,
    ) -> Result<Location, DomainError> {
        self.ensure_staff(requester).await?;
        validation::title("name", &draft.name)?;

        let mut location = Location::new(draft.name);
        location.is_published = draft.is_published;

        let location = self.repos.locations.create(location).await?;
        tracing::info!(location_id = %location.id, "Location created");
        Ok(location)
    }

    pub async fn update_location(
        &self,
        requester: &Viewer,
        id: Uuid,
        changes: LocationChanges,
    ) -> Result<Location, DomainError> {
        self.ensure_staff(requester).await?;
        let mut location = self
            .repos
            .locations
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("location", id))?;

        if let Some(name) = changes.name {
            validation::title("name", &name)?;
            location.name = name;
        }
        if let Some(is_published) = changes.is_published {
            location.is_published = is_published;
        }

        let location = self.repos.locations.update(location).await?;
        tracing::info!(location_id = %id, "Location updated");
        Ok(location)
    }

    /// Deletes a location. Posts referring to it lose the reference.
    pub async fn delete_location(&self, requester: &Viewer, id: Uuid) -> Result<(), DomainError> {
        self.ensure_staff(requester).await?;
        if self.repos.locations.find_by_id(id).await?.is_none() {
            return Err(DomainError::not_found("location", id));
        }
        self.repos.locations.delete(id).await?;
        tracing::info!(location_id = %id, "Location deleted");
        Ok(())
    }

    async fn ensure_staff(&self, requester: &Viewer) -> Result<(), DomainError> {
        let user_id = requester.user_id().ok_or(DomainError::Unauthorized)?;
        let user = self
            .repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        if !user.is_staff {
            return Err(DomainError::Forbidden);
        }
        Ok(())
    }

    async fn category_by_slug(&self, slug: &str) -> Result<Category, DomainError> {
        self.repos
            .categories
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("category", slug))
    }

    async fn ensure_slug_free(&self, slug: &str) -> Result<(), DomainError> {
        if self.repos.categories.find_by_slug(slug).await?.is_some() {
            return Err(DomainError::Duplicate(format!("slug {slug} is already taken")));
        }
        Ok(())
    }
}

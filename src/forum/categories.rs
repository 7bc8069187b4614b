//! Category administration and listing.

use serde::Deserialize;
use tracing::info;

use super::{ForumService, Identity, now, validate};
use crate::{
    authz::require_role,
    db,
    error::{ForumError, ForumResult},
    models::{Category, CategoryChanges, NewCategory},
    roles::Role,
};

/// Body of a category creation request.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    /// Display name.
    pub name: String,
    /// Optional blurb shown under the name.
    #[serde(default)]
    pub description: Option<String>,
    /// Position in the listing; defaults to zero.
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Body of a category edit. Absent fields are left unchanged.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New listing position.
    pub sort_order: Option<i32>,
    /// Enable or disable the category.
    pub is_active: Option<bool>,
}

impl ForumService {
    /// Create a category. Administrators only.
    ///
    /// # Errors
    /// Returns [`ForumError::Unauthorized`] or [`ForumError::Forbidden`] for
    /// callers who are not administrators and [`ForumError::InvalidInput`]
    /// for a blank name.
    pub async fn create_category(
        &self,
        identity: Option<&Identity>,
        input: CategoryInput,
    ) -> ForumResult<Category> {
        let who = require_role(identity, Role::Admin)?;
        let name = validate::required("name", &input.name)?;
        let created_at = now();
        let mut conn = self.conn().await?;
        let category = db::create_category(
            &mut conn,
            &NewCategory {
                name,
                description: input.description.as_deref(),
                sort_order: input.sort_order.unwrap_or(0),
                thread_count: 0,
                post_count: 0,
                is_active: true,
                created_at,
                updated_at: created_at,
            },
        )
        .await?;
        info!(category_id = category.id, admin = who.user_id, "created category");
        Ok(category)
    }

    /// Active categories in display order.
    ///
    /// # Errors
    /// Returns infrastructure errors from the pool or database.
    pub async fn list_categories(&self) -> ForumResult<Vec<Category>> {
        let mut conn = self.conn().await?;
        Ok(db::list_active_categories(&mut conn).await?)
    }

    /// Edit a category. Administrators only.
    ///
    /// # Errors
    /// Returns [`ForumError::Unauthorized`] or [`ForumError::Forbidden`] for
    /// callers who are not administrators, [`ForumError::InvalidInput`] for a
    /// blank name, and [`ForumError::NotFound`] for unknown ids.
    pub async fn update_category(
        &self,
        identity: Option<&Identity>,
        category_id: i32,
        input: CategoryUpdate,
    ) -> ForumResult<Category> {
        let who = require_role(identity, Role::Admin)?;
        let name = input
            .name
            .as_deref()
            .map(|n| validate::required("name", n))
            .transpose()?;
        let changes = CategoryChanges {
            name,
            description: input.description.as_deref(),
            sort_order: input.sort_order,
            is_active: input.is_active,
            updated_at: now(),
        };
        let mut conn = self.conn().await?;
        let category = db::update_category(&mut conn, category_id, &changes)
            .await?
            .ok_or(ForumError::NotFound("category"))?;
        info!(category_id, admin = who.user_id, "updated category");
        Ok(category)
    }
}

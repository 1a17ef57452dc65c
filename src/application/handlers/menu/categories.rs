use std::sync::Arc;

use crate::application::LockGuard;
use crate::domain::daily_close::LockCategory;
use crate::domain::foundation::AuthenticatedUser;
use crate::domain::menu::{Category, MenuError};
use crate::ports::MenuRepository;

use super::MENU_ADMINS;

#[derive(Debug, Clone)]
pub struct CreateCategoryCommand {
    pub name: String,
    pub description: Option<String>,
}

pub struct CreateCategoryHandler {
    menu: Arc<dyn MenuRepository>,
    lock: Arc<LockGuard>,
}

impl CreateCategoryHandler {
    pub fn new(menu: Arc<dyn MenuRepository>, lock: Arc<LockGuard>) -> Self {
        Self { menu, lock }
    }

    pub async fn handle(
        &self,
        cmd: CreateCategoryCommand,
        actor: &AuthenticatedUser,
    ) -> Result<Category, MenuError> {
        actor.require_any(MENU_ADMINS)?;
        self.lock.check(LockCategory::MenuChange, actor).await?;

        let category = Category::new(cmd.name, cmd.description)?;
        self.menu.save_category(&category).await?;
        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }
}

pub struct ListCategoriesHandler {
    menu: Arc<dyn MenuRepository>,
}

impl ListCategoriesHandler {
    pub fn new(menu: Arc<dyn MenuRepository>) -> Self {
        Self { menu }
    }

    pub async fn handle(&self) -> Result<Vec<Category>, MenuError> {
        Ok(self.menu.list_categories().await?)
    }
}

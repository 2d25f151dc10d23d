use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::errors::CatalogError;
use super::value_objects::{BulkInsertFailure, BulkInsertMode, BulkInsertReport, NewKitchen, NewMenuItem};
use crate::models::{Kitchen, MenuItem};
use crate::store::{Store, StoreError};

// ============================================================================
// Catalog Service
// ============================================================================
//
// Menu edits only touch the menu_items collection. Orders keep the name and
// price captured when they were placed.
//
// ============================================================================

pub struct CatalogService {
    store: Arc<dyn Store>,
    bulk_mode: BulkInsertMode,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>, bulk_mode: BulkInsertMode) -> Self {
        Self { store, bulk_mode }
    }

    // --- kitchens ---------------------------------------------------------

    pub async fn create_kitchen(&self, new: NewKitchen) -> Result<Kitchen, CatalogError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyName);
        }

        let kitchen = Kitchen {
            id: Uuid::new_v4(),
            name: name.to_string(),
            brand_slug: new.brand_slug.filter(|slug| !slug.trim().is_empty()),
            created_at: Utc::now(),
        };

        match self.store.insert_kitchen(&kitchen).await {
            Ok(()) => {}
            Err(StoreError::AlreadyExists { .. }) => {
                return Err(CatalogError::DuplicateName(kitchen.name));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(kitchen_id = %kitchen.id, name = %kitchen.name, "🏪 Kitchen created");
        Ok(kitchen)
    }

    pub async fn list_kitchens(&self) -> Result<Vec<Kitchen>, CatalogError> {
        Ok(self.store.list_kitchens().await?)
    }

    // --- menu items -------------------------------------------------------

    pub async fn create_menu_item(&self, kitchen_id: Uuid, new: NewMenuItem) -> Result<MenuItem, CatalogError> {
        let item = build_item(kitchen_id, &new)?;
        if self.store.get_kitchen(kitchen_id).await?.is_none() {
            return Err(CatalogError::KitchenNotFound(kitchen_id));
        }

        self.store.insert_menu_item(&item).await?;
        tracing::info!(menu_item_id = %item.id, kitchen_id = %kitchen_id, price = %item.price, "Menu item created");
        Ok(item)
    }

    pub async fn list_menu_items(&self, kitchen_id: Uuid) -> Result<Vec<MenuItem>, CatalogError> {
        Ok(self.store.list_menu_items(kitchen_id).await?)
    }

    pub async fn remove_menu_item(&self, id: Uuid) -> Result<(), CatalogError> {
        if !self.store.delete_menu_item(id).await? {
            return Err(CatalogError::MenuItemNotFound(id));
        }
        tracing::info!(menu_item_id = %id, "Menu item removed");
        Ok(())
    }

    pub async fn update_price(&self, id: Uuid, price: Decimal) -> Result<MenuItem, CatalogError> {
        validate_price(price)?;
        self.modify(id, |item| item.price = price).await
    }

    pub async fn update_image(&self, id: Uuid, image_url: Option<String>) -> Result<MenuItem, CatalogError> {
        self.modify(id, |item| item.image_url = image_url).await
    }

    async fn modify<F>(&self, id: Uuid, change: F) -> Result<MenuItem, CatalogError>
    where
        F: FnOnce(&mut MenuItem),
    {
        let mut item = self
            .store
            .get_menu_item(id)
            .await?
            .ok_or(CatalogError::MenuItemNotFound(id))?;
        change(&mut item);

        if !self.store.update_menu_item(&item).await? {
            return Err(CatalogError::MenuItemNotFound(id));
        }
        tracing::debug!(menu_item_id = %id, price = %item.price, "Menu item updated");
        Ok(item)
    }

    /// Add the same item to every kitchen
    pub async fn create_menu_item_for_all_kitchens(
        &self,
        new: NewMenuItem,
        mode: Option<BulkInsertMode>,
    ) -> Result<BulkInsertReport, CatalogError> {
        let mode = mode.unwrap_or(self.bulk_mode);
        let kitchens = self.store.list_kitchens().await?;

        let items = kitchens
            .iter()
            .map(|kitchen| build_item(kitchen.id, &new))
            .collect::<Result<Vec<_>, _>>()?;

        if items.is_empty() {
            return Ok(BulkInsertReport::default());
        }

        let report = match mode {
            BulkInsertMode::AllOrNothing => {
                self.store.insert_menu_items(&items).await?;
                BulkInsertReport {
                    inserted: items.len(),
                    ids: items.iter().map(|item| item.id).collect(),
                    failures: Vec::new(),
                }
            }
            BulkInsertMode::BestEffort => {
                let mut report = BulkInsertReport::default();
                for item in &items {
                    match self.store.insert_menu_item(item).await {
                        Ok(()) => {
                            report.inserted += 1;
                            report.ids.push(item.id);
                        }
                        Err(e) => {
                            tracing::warn!(kitchen_id = %item.kitchen_id, error = %e, "Menu item insert failed");
                            report.failures.push(BulkInsertFailure {
                                kitchen_id: item.kitchen_id,
                                error: e.to_string(),
                            });
                        }
                    }
                }
                report
            }
        };

        tracing::info!(
            name = %new.name,
            inserted = report.inserted,
            failed = report.failures.len(),
            "Menu item added to all kitchens"
        );
        Ok(report)
    }
}

fn build_item(kitchen_id: Uuid, new: &NewMenuItem) -> Result<MenuItem, CatalogError> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(CatalogError::EmptyName);
    }
    validate_price(new.price)?;

    Ok(MenuItem {
        id: Uuid::new_v4(),
        kitchen_id,
        name: name.to_string(),
        price: new.price,
        image_url: new.image_url.clone(),
    })
}

fn validate_price(price: Decimal) -> Result<(), CatalogError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(CatalogError::NegativePrice(price));
    }
    Ok(())
}

//! Mirror service
//!
//! Working state of the try-on screen: the current selection (at most one
//! garment per category) and the last generated image. A generated image
//! becomes a saved outfit only through the coordinator.
//!
//! Every change to the selection starts a new generation. A remote result
//! is kept only if no change happened while it was in flight, and it is
//! saved together with the items it was rendered from.

use crate::database::{ClothingItem, Outfit};
use crate::error::{AppError, Result};
use crate::remote::StylistClient;
use crate::services::coordinator::Coordinator;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A rendered image and the selection it was requested for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedOutfit {
    pub image: String,
    pub items: Vec<ClothingItem>,
}

/// Selection and pending result for one mirror session
#[derive(Debug, Clone, Default)]
pub struct MirrorSession {
    selected: Vec<ClothingItem>,
    generated: Option<GeneratedOutfit>,
    generation: u64,
}

impl MirrorSession {
    /// Select or deselect an item. Selecting replaces any other item of
    /// the same category. Returns whether the item is now selected.
    pub fn toggle(&mut self, item: ClothingItem) -> bool {
        let was_selected = self.selected.iter().any(|i| i.id == item.id);
        self.selected.retain(|i| i.category != item.category);
        self.invalidate();

        if was_selected {
            false
        } else {
            self.selected.push(item);
            true
        }
    }

    pub fn deselect(&mut self, id: &str) {
        if self.selected.iter().any(|i| i.id == id) {
            self.selected.retain(|i| i.id != id);
            self.invalidate();
        }
    }

    pub fn selected(&self) -> &[ClothingItem] {
        &self.selected
    }

    pub fn generated(&self) -> Option<&str> {
        self.generated.as_ref().map(|g| g.image.as_str())
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.invalidate();
    }

    /// Drop the current result and supersede any call in flight
    fn invalidate(&mut self) {
        self.generated = None;
        self.generation += 1;
    }
}

/// Service driving outfit generation
pub struct MirrorService {
    coordinator: Arc<Coordinator>,
    client: StylistClient,
    session: Mutex<MirrorSession>,
}

impl MirrorService {
    pub fn new(coordinator: Arc<Coordinator>, client: StylistClient) -> Self {
        Self {
            coordinator,
            client,
            session: Mutex::new(MirrorSession::default()),
        }
    }

    /// Toggle a catalog item in the selection; returns the new selection.
    pub async fn toggle_selection(&self, item_id: &str) -> Result<Vec<ClothingItem>> {
        let item = self
            .coordinator
            .find_item(item_id)
            .await
            .ok_or_else(|| AppError::ItemNotFound(item_id.to_string()))?;

        let mut session = self.session.lock().await;
        session.toggle(item);
        Ok(session.selected().to_vec())
    }

    /// Drop an item that left the catalog
    pub async fn forget_item(&self, item_id: &str) {
        self.session.lock().await.deselect(item_id);
    }

    /// Render the current selection on the user's reference photos.
    ///
    /// Fails with [`AppError::StaleGeneration`] when the selection changed
    /// or a newer generation started before this one answered.
    pub async fn generate(&self) -> Result<String> {
        let (selection, ticket) = {
            let mut session = self.session.lock().await;
            session.invalidate();
            (session.selected.clone(), session.generation)
        };

        let user_images = self.coordinator.user_images().await;
        let image = self.client.generate_outfit(&user_images, &selection).await?;

        let mut session = self.session.lock().await;
        if session.generation != ticket {
            tracing::info!("Discarding outfit generated for a superseded selection");
            return Err(AppError::StaleGeneration);
        }

        session.generated = Some(GeneratedOutfit {
            image: image.clone(),
            items: selection,
        });
        Ok(image)
    }

    /// Save the pending result as an outfit and reset the session.
    ///
    /// Returns `None` when nothing has been generated.
    pub async fn save_generated(&self) -> Result<Option<Outfit>> {
        let mut session = self.session.lock().await;

        let Some(generated) = session.generated.clone() else {
            return Ok(None);
        };

        let outfit = self
            .coordinator
            .save_outfit(generated.image, generated.items)
            .await?;
        session.clear();

        Ok(Some(outfit))
    }

    pub async fn session(&self) -> MirrorSession {
        self.session.lock().await.clone()
    }
}

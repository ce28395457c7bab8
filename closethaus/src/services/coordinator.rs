//! Application state coordinator
//!
//! Single owner of the in-memory wardrobe snapshot and the current room.
//! Hydrates once from the repository, then applies every mutation to the
//! snapshot immediately and hands the changed collection to the save
//! dispatcher. Saves never block the caller and never roll back memory.

use crate::config::SYNC_EVENT_CAPACITY;
use crate::database::{
    observe_id, ClothingCategory, ClothingItem, CollectionUpdate, ImageRef, NewClothingItem, Outfit,
    ReferenceKind, Repository, Snapshot, UserImages,
};
use crate::error::{AppError, Result};
use crate::services::room::Room;
use crate::storage::Collection;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex, RwLock};
use tokio::task::JoinHandle;

/// Lifecycle of the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Still loading; mutations are rejected
    Uninitialized,
    Initialized,
}

/// Outcome of a background save
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SyncEvent {
    Saved { collection: Collection },
    SaveFailed { collection: Collection, message: String },
}

enum SaveJob {
    Write(CollectionUpdate),
    Flush(oneshot::Sender<()>),
}

/// Routes collection saves to the repository.
///
/// `Serialized` keeps one in-flight write per collection with later saves
/// queued in issue order. `Concurrent` dispatches every save as its own
/// task, so completions may land out of order.
enum SaveDispatcher {
    Serialized(HashMap<Collection, mpsc::UnboundedSender<SaveJob>>),
    Concurrent {
        repo: Repository,
        events: broadcast::Sender<SyncEvent>,
        pending: Mutex<Vec<JoinHandle<()>>>,
    },
}

impl SaveDispatcher {
    fn new(repo: &Repository, events: &broadcast::Sender<SyncEvent>, serialize_saves: bool) -> Self {
        if !serialize_saves {
            return SaveDispatcher::Concurrent {
                repo: repo.clone(),
                events: events.clone(),
                pending: Mutex::new(Vec::new()),
            };
        }

        let mut lanes = HashMap::new();
        for collection in Collection::ALL {
            let (tx, rx) = mpsc::unbounded_channel();
            tokio::spawn(run_lane(repo.clone(), events.clone(), rx));
            lanes.insert(collection, tx);
        }
        SaveDispatcher::Serialized(lanes)
    }

    async fn dispatch(&self, update: CollectionUpdate) {
        let collection = update.collection();
        tracing::debug!("Scheduling save of {}", collection);

        match self {
            SaveDispatcher::Serialized(lanes) => {
                let sent = lanes
                    .get(&collection)
                    .map(|lane| lane.send(SaveJob::Write(update)).is_ok())
                    .unwrap_or(false);
                if !sent {
                    tracing::error!("Save lane for {} is closed; change not persisted", collection);
                }
            }
            SaveDispatcher::Concurrent {
                repo,
                events,
                pending,
            } => {
                let handle = tokio::spawn(run_save(repo.clone(), events.clone(), update));
                let mut pending = pending.lock().await;
                pending.retain(|h| !h.is_finished());
                pending.push(handle);
            }
        }
    }

    async fn flush(&self) {
        match self {
            SaveDispatcher::Serialized(lanes) => {
                for (collection, lane) in lanes {
                    let (tx, rx) = oneshot::channel();
                    if lane.send(SaveJob::Flush(tx)).is_err() || rx.await.is_err() {
                        tracing::warn!("Save lane for {} closed before flush", collection);
                    }
                }
            }
            SaveDispatcher::Concurrent { pending, .. } => {
                let handles: Vec<JoinHandle<()>> = pending.lock().await.drain(..).collect();
                for handle in handles {
                    if let Err(e) = handle.await {
                        tracing::error!("Save task failed: {}", e);
                    }
                }
            }
        }
    }
}

async fn run_lane(
    repo: Repository,
    events: broadcast::Sender<SyncEvent>,
    mut rx: mpsc::UnboundedReceiver<SaveJob>,
) {
    while let Some(job) = rx.recv().await {
        match job {
            SaveJob::Write(update) => run_save(repo.clone(), events.clone(), update).await,
            SaveJob::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

async fn run_save(repo: Repository, events: broadcast::Sender<SyncEvent>, update: CollectionUpdate) {
    let collection = update.collection();

    let event = match repo.save(&update).await {
        Ok(()) => SyncEvent::Saved { collection },
        Err(e) => {
            tracing::error!("Failed to save {}: {}", collection, e);
            SyncEvent::SaveFailed {
                collection,
                message: e.user_message(),
            }
        }
    };

    // No subscribers is fine
    let _ = events.send(event);
}

struct CoordinatorState {
    phase: Phase,
    room: Room,
    snapshot: Snapshot,
}

impl CoordinatorState {
    fn ensure_initialized(&self) -> Result<()> {
        match self.phase {
            Phase::Initialized => Ok(()),
            Phase::Uninitialized => Err(AppError::NotInitialized),
        }
    }
}

/// Owner of the wardrobe snapshot and room state.
///
/// Must be created inside a Tokio runtime: the serialized dispatcher spawns
/// one writer task per collection.
pub struct Coordinator {
    repo: Repository,
    state: RwLock<CoordinatorState>,
    saves: SaveDispatcher,
    events: broadcast::Sender<SyncEvent>,
}

impl Coordinator {
    pub fn new(repo: Repository, serialize_saves: bool) -> Self {
        let (events, _) = broadcast::channel(SYNC_EVENT_CAPACITY);
        let saves = SaveDispatcher::new(&repo, &events, serialize_saves);

        Self {
            repo,
            state: RwLock::new(CoordinatorState {
                phase: Phase::Uninitialized,
                room: Room::Onboarding,
                snapshot: Snapshot::default(),
            }),
            saves,
            events,
        }
    }

    /// Hydrate from storage. Runs once; later calls are no-ops.
    ///
    /// A storage failure is logged and the session starts from empty
    /// defaults rather than staying stuck in the loading phase.
    pub async fn initialize(&self) {
        if self.state.read().await.phase == Phase::Initialized {
            return;
        }

        let loaded = self.repo.load_all().await;

        let mut state = self.state.write().await;
        if state.phase == Phase::Initialized {
            return;
        }

        match loaded {
            Ok(snapshot) => {
                for item in &snapshot.clothing_items {
                    observe_id(&item.id);
                }
                for outfit in &snapshot.outfits {
                    observe_id(&outfit.id);
                }
                state.snapshot = snapshot;
            }
            Err(e) => {
                tracing::warn!("Failed to load wardrobe, starting empty: {}", e);
                state.snapshot = Snapshot::default();
            }
        }

        state.room = Room::initial(&state.snapshot.user_images);
        state.phase = Phase::Initialized;

        tracing::info!("Coordinator initialized in room {}", state.room);
    }

    /// Replace one reference photo.
    ///
    /// The user images are only persisted once both photos are present.
    pub async fn set_user_image(&self, kind: ReferenceKind, image: ImageRef) -> Result<UserImages> {
        let mut state = self.state.write().await;
        state.ensure_initialized()?;

        state.snapshot.user_images.set(kind, image);
        let images = state.snapshot.user_images.clone();

        self.persist_user_images(&images).await;
        Ok(images)
    }

    /// Replace both reference photos at once
    pub async fn set_user_images(&self, images: UserImages) -> Result<()> {
        let mut state = self.state.write().await;
        state.ensure_initialized()?;

        state.snapshot.user_images = images.clone();

        self.persist_user_images(&images).await;
        Ok(())
    }

    async fn persist_user_images(&self, images: &UserImages) {
        if images.is_complete() {
            self.saves
                .dispatch(CollectionUpdate::UserImages(images.clone()))
                .await;
        } else {
            tracing::debug!("Reference photos incomplete, not persisting yet");
        }
    }

    /// Append a new garment to the catalog
    pub async fn add_clothing_item(&self, new_item: NewClothingItem) -> Result<ClothingItem> {
        let mut state = self.state.write().await;
        state.ensure_initialized()?;

        let item = new_item.into_item();
        state.snapshot.clothing_items.push(item.clone());

        tracing::info!("Added clothing item {} ({})", item.id, item.category);

        self.saves
            .dispatch(CollectionUpdate::ClothingItems(
                state.snapshot.clothing_items.clone(),
            ))
            .await;
        Ok(item)
    }

    /// Delete a garment from the catalog. Saved outfits keep their copies.
    pub async fn remove_clothing_item(&self, id: &str) -> Result<ClothingItem> {
        let mut state = self.state.write().await;
        state.ensure_initialized()?;

        let position = state
            .snapshot
            .clothing_items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| AppError::ItemNotFound(id.to_string()))?;
        let removed = state.snapshot.clothing_items.remove(position);

        tracing::info!("Removed clothing item {}", removed.id);

        self.saves
            .dispatch(CollectionUpdate::ClothingItems(
                state.snapshot.clothing_items.clone(),
            ))
            .await;
        Ok(removed)
    }

    /// Record a generated outfit, most recent first
    pub async fn save_outfit(&self, image: String, items: Vec<ClothingItem>) -> Result<Outfit> {
        let mut state = self.state.write().await;
        state.ensure_initialized()?;

        let outfit = Outfit::new(image, items);
        state.snapshot.outfits.insert(0, outfit.clone());

        tracing::info!("Saved outfit {} with {} items", outfit.id, outfit.items.len());

        self.saves
            .dispatch(CollectionUpdate::SavedOutfits(state.snapshot.outfits.clone()))
            .await;
        Ok(outfit)
    }

    /// Move to another room through the transition table
    pub async fn navigate(&self, to: Room) -> Result<Room> {
        let mut state = self.state.write().await;
        state.ensure_initialized()?;

        let onboarded = state.snapshot.user_images.is_complete();
        let from = state.room;
        state.room = from.transition(to, onboarded)?;

        tracing::info!("Room transition: {} -> {}", from, state.room);
        Ok(state.room)
    }

    /// Return to the living room from the closet or the mirror
    pub async fn back(&self) -> Result<Room> {
        let mut state = self.state.write().await;
        state.ensure_initialized()?;

        let from = state.room;
        state.room = from.back();

        if from != state.room {
            tracing::info!("Room transition: {} -> {}", from, state.room);
        }
        Ok(state.room)
    }

    /// Wait until every save scheduled so far has completed
    pub async fn flush(&self) {
        self.saves.flush().await;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub async fn phase(&self) -> Phase {
        self.state.read().await.phase
    }

    pub async fn room(&self) -> Room {
        self.state.read().await.room
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.snapshot.clone()
    }

    pub async fn user_images(&self) -> UserImages {
        self.state.read().await.snapshot.user_images.clone()
    }

    pub async fn clothing_items(&self) -> Vec<ClothingItem> {
        self.state.read().await.snapshot.clothing_items.clone()
    }

    pub async fn outfits(&self) -> Vec<Outfit> {
        self.state.read().await.snapshot.outfits.clone()
    }

    pub async fn find_item(&self, id: &str) -> Option<ClothingItem> {
        self.state
            .read()
            .await
            .snapshot
            .clothing_items
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    /// Catalog grouped in category display order, empty groups omitted
    pub async fn items_by_category(&self) -> Vec<(ClothingCategory, Vec<ClothingItem>)> {
        let state = self.state.read().await;

        ClothingCategory::ALL
            .into_iter()
            .map(|category| {
                let items: Vec<ClothingItem> = state
                    .snapshot
                    .clothing_items
                    .iter()
                    .filter(|item| item.category == category)
                    .cloned()
                    .collect();
                (category, items)
            })
            .filter(|(_, items)| !items.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Store;
    use crate::test_support::{new_item, sample_image};
    use tempfile::TempDir;

    async fn create_test_coordinator(serialize_saves: bool) -> (Coordinator, Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::new(Store::new(temp_dir.path().join("test.db")));
        let coordinator = Coordinator::new(repo.clone(), serialize_saves);
        coordinator.initialize().await;
        (coordinator, repo, temp_dir)
    }

    #[tokio::test]
    async fn test_mutations_rejected_before_initialize() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::new(Store::new(temp_dir.path().join("test.db")));
        let coordinator = Coordinator::new(repo, true);

        assert_eq!(coordinator.phase().await, Phase::Uninitialized);

        let result = coordinator
            .add_clothing_item(new_item("Tee", ClothingCategory::Top))
            .await;
        assert!(matches!(result, Err(AppError::NotInitialized)));
        assert!(coordinator.clothing_items().await.is_empty());
    }

    #[tokio::test]
    async fn test_fresh_store_starts_in_onboarding() {
        let (coordinator, _repo, _temp) = create_test_coordinator(true).await;

        assert_eq!(coordinator.phase().await, Phase::Initialized);
        assert_eq!(coordinator.room().await, Room::Onboarding);
        assert_eq!(coordinator.snapshot().await, Snapshot::default());
    }

    #[tokio::test]
    async fn test_storage_failure_still_initializes() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("occupied");
        std::fs::create_dir_all(db_path.join("child")).unwrap();

        let coordinator = Coordinator::new(Repository::new(Store::new(db_path)), true);
        coordinator.initialize().await;

        assert_eq!(coordinator.phase().await, Phase::Initialized);
        assert_eq!(coordinator.room().await, Room::Onboarding);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_memory_and_reports() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("occupied");
        std::fs::create_dir_all(db_path.join("child")).unwrap();

        let coordinator = Coordinator::new(Repository::new(Store::new(db_path)), true);
        coordinator.initialize().await;
        let mut events = coordinator.subscribe();

        coordinator
            .add_clothing_item(new_item("Tee", ClothingCategory::Top))
            .await
            .unwrap();
        coordinator.flush().await;

        assert_eq!(coordinator.clothing_items().await.len(), 1);
        match events.recv().await.unwrap() {
            SyncEvent::SaveFailed { collection, message } => {
                assert_eq!(collection, Collection::ClothingItems);
                assert!(message.starts_with("Failed to save"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_half_onboarding_is_not_persisted() {
        let (coordinator, repo, _temp) = create_test_coordinator(true).await;

        coordinator
            .set_user_image(ReferenceKind::Headshot, sample_image())
            .await
            .unwrap();
        coordinator.flush().await;

        let stored: Option<UserImages> = repo
            .store()
            .get(Collection::UserImages, Collection::UserImages.key())
            .await
            .unwrap();
        assert!(stored.is_none());

        coordinator
            .set_user_image(ReferenceKind::FullBody, sample_image())
            .await
            .unwrap();
        coordinator.flush().await;

        let stored: Option<UserImages> = repo
            .store()
            .get(Collection::UserImages, Collection::UserImages.key())
            .await
            .unwrap();
        assert!(stored.unwrap().is_complete());
    }

    #[tokio::test]
    async fn test_outfit_keeps_deleted_items() {
        let (coordinator, repo, _temp) = create_test_coordinator(true).await;

        let a = coordinator
            .add_clothing_item(new_item("Striped Tee", ClothingCategory::Top))
            .await
            .unwrap();
        let b = coordinator
            .add_clothing_item(new_item("Chinos", ClothingCategory::Bottom))
            .await
            .unwrap();

        coordinator
            .save_outfit("b3V0Zml0".to_string(), vec![a.clone(), b.clone()])
            .await
            .unwrap();
        coordinator.remove_clothing_item(&a.id).await.unwrap();
        coordinator.flush().await;

        let outfits = coordinator.outfits().await;
        assert_eq!(outfits[0].items, vec![a.clone(), b.clone()]);

        let reloaded = repo.load_all().await.unwrap();
        assert_eq!(reloaded.clothing_items, vec![b.clone()]);
        assert_eq!(reloaded.outfits[0].items, vec![a, b]);
    }

    #[tokio::test]
    async fn test_outfits_are_prepended() {
        let (coordinator, _repo, _temp) = create_test_coordinator(true).await;

        let first = coordinator.save_outfit("Zmlyc3Q=".to_string(), vec![]).await.unwrap();
        let second = coordinator.save_outfit("c2Vjb25k".to_string(), vec![]).await.unwrap();

        let ids: Vec<String> = coordinator.outfits().await.into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_new_ids_stay_above_stored_ids() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::new(Store::new(temp_dir.path().join("test.db")));

        let mut stored = new_item("Coat", ClothingCategory::Top).into_item();
        let ahead = chrono::Utc::now().timestamp_millis() + 3_600_000;
        stored.id = ahead.to_string();
        repo.save_clothing_items(std::slice::from_ref(&stored)).await.unwrap();

        let coordinator = Coordinator::new(repo, true);
        coordinator.initialize().await;

        let added = coordinator
            .add_clothing_item(new_item("Scarf", ClothingCategory::Accessory))
            .await
            .unwrap();
        assert!(added.id.parse::<i64>().unwrap() > ahead);

        coordinator.remove_clothing_item(&added.id).await.unwrap();
        assert_eq!(coordinator.clothing_items().await, vec![stored]);
    }

    #[tokio::test]
    async fn test_remove_unknown_item() {
        let (coordinator, _repo, _temp) = create_test_coordinator(true).await;

        let result = coordinator.remove_clothing_item("missing").await;
        assert!(matches!(result, Err(AppError::ItemNotFound(_))));
    }

    #[tokio::test]
    async fn test_rapid_saves_land_in_issue_order() {
        let (coordinator, repo, _temp) = create_test_coordinator(true).await;

        let mut added = Vec::new();
        for i in 0..20 {
            let item = coordinator
                .add_clothing_item(new_item(&format!("Item {}", i), ClothingCategory::Accessory))
                .await
                .unwrap();
            added.push(item);
        }
        coordinator.flush().await;

        let reloaded = repo.load_all().await.unwrap();
        assert_eq!(reloaded.clothing_items, added);
    }

    #[tokio::test]
    async fn test_concurrent_dispatch_persists_after_flush() {
        let (coordinator, repo, _temp) = create_test_coordinator(false).await;

        let item = coordinator
            .add_clothing_item(new_item("Loafers", ClothingCategory::Shoes))
            .await
            .unwrap();
        coordinator.flush().await;

        let reloaded = repo.load_all().await.unwrap();
        assert_eq!(reloaded.clothing_items, vec![item]);
    }

    #[tokio::test]
    async fn test_room_navigation() {
        let (coordinator, _repo, _temp) = create_test_coordinator(true).await;

        assert!(coordinator.navigate(Room::LivingRoom).await.is_err());

        coordinator
            .set_user_images(UserImages::new(sample_image(), sample_image()))
            .await
            .unwrap();

        assert_eq!(coordinator.navigate(Room::LivingRoom).await.unwrap(), Room::LivingRoom);
        assert_eq!(coordinator.navigate(Room::Closet).await.unwrap(), Room::Closet);
        assert!(coordinator.navigate(Room::Mirror).await.is_err());
        assert_eq!(coordinator.back().await.unwrap(), Room::LivingRoom);
        assert!(coordinator.navigate(Room::Onboarding).await.is_err());
    }

    #[tokio::test]
    async fn test_items_by_category() {
        let (coordinator, _repo, _temp) = create_test_coordinator(true).await;

        coordinator
            .add_clothing_item(new_item("Sandals", ClothingCategory::Shoes))
            .await
            .unwrap();
        coordinator
            .add_clothing_item(new_item("Hoodie", ClothingCategory::Top))
            .await
            .unwrap();
        coordinator
            .add_clothing_item(new_item("Polo", ClothingCategory::Top))
            .await
            .unwrap();

        let groups = coordinator.items_by_category().await;
        let categories: Vec<ClothingCategory> = groups.iter().map(|(c, _)| *c).collect();
        assert_eq!(categories, vec![ClothingCategory::Top, ClothingCategory::Shoes]);

        let tops: Vec<&str> = groups[0].1.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(tops, vec!["Hoodie", "Polo"]);
    }
}

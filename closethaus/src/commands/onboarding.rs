//! Onboarding commands

use super::{notice, CommandResult};
use crate::app::AppState;
use crate::database::{ImageRef, ReferenceKind, UserImages};
use crate::services::Room;

/// Store one reference photo from an uploaded data URL
pub async fn upload_reference_image(
    state: &AppState,
    kind: ReferenceKind,
    data_url: &str,
) -> CommandResult<UserImages> {
    let image = ImageRef::from_data_url(data_url).map_err(|e| notice("Upload reference photo", e))?;

    state
        .coordinator
        .set_user_image(kind, image)
        .await
        .map_err(|e| notice("Upload reference photo", e))
}

/// Leave onboarding once both photos are in
pub async fn complete_onboarding(state: &AppState) -> CommandResult<Room> {
    state
        .coordinator
        .navigate(Room::LivingRoom)
        .await
        .map_err(|e| notice("Complete onboarding", e))
}

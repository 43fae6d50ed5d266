use std::sync::Arc;

use tracing::info;

use crate::application::errors::AppError;
use crate::domain::RepositoryError;
use crate::domain::book_items::Book;
use crate::domain::favorites::select_favorites;
use crate::domain::ids::{BookId, UserId};
use crate::domain::repositories::{Avatar, AvatarRepository, FavoriteRepository, UserRepository};
use crate::domain::users::{ProfileSummary, User};
use crate::infrastructure::image_processing::process_avatar;

/// Profile edits: bio, avatar upload and the favorites list.
#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    avatars: Arc<dyn AvatarRepository>,
    favorites: Arc<dyn FavoriteRepository>,
}

impl ProfileService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        avatars: Arc<dyn AvatarRepository>,
        favorites: Arc<dyn FavoriteRepository>,
    ) -> Self {
        Self {
            users,
            avatars,
            favorites,
        }
    }

    pub async fn summary(&self, user: &User) -> Result<ProfileSummary, AppError> {
        let has_avatar = self.avatars.exists(user.id).await?;
        Ok(ProfileSummary::new(user, has_avatar))
    }

    /// Apply a profile edit. `bio` of `None` leaves it unchanged and a blank
    /// bio clears it. The avatar is a base64 image data URL; blank means keep.
    pub async fn update(
        &self,
        user_id: UserId,
        bio: Option<String>,
        avatar: Option<&str>,
    ) -> Result<User, AppError> {
        // Decode before touching the bio so a bad image changes nothing.
        let processed = match avatar.map(str::trim).filter(|s| !s.is_empty()) {
            Some(data_url) => {
                let data_url = data_url.to_string();
                let image = tokio::task::spawn_blocking(move || process_avatar(&data_url))
                    .await
                    .map_err(|err| AppError::unexpected(format!("avatar processing task failed: {err}")))?
                    .map_err(|err| AppError::validation(err.to_string()))?;
                Some(image)
            }
            None => None,
        };

        let user = match bio {
            Some(bio) => {
                let bio = Some(bio.trim().to_string()).filter(|b| !b.is_empty());
                self.users.update_bio(user_id, bio).await?
            }
            None => self.users.get(user_id).await?,
        };

        if let Some(image) = processed {
            let bytes = image.data.len();
            self.avatars
                .upsert(Avatar {
                    user_id,
                    content_type: image.content_type.to_string(),
                    data: image.data,
                })
                .await?;
            info!(%user_id, bytes, "avatar updated");
        }

        info!(%user_id, "profile updated");
        Ok(user)
    }

    pub async fn favorites(&self, user_id: UserId) -> Result<Vec<Book>, AppError> {
        Ok(self.favorites.list(user_id).await?)
    }

    /// Replace the favorites with the first distinct entries of `requested`,
    /// up to the cap. Books the user does not own are rejected.
    pub async fn set_favorites(
        &self,
        user_id: UserId,
        requested: &[BookId],
    ) -> Result<Vec<Book>, AppError> {
        let selected = select_favorites(requested);
        match self.favorites.replace(user_id, &selected).await {
            Ok(()) => {}
            Err(RepositoryError::NotFound) => {
                return Err(AppError::validation(
                    "favorites must be books from your own log",
                ));
            }
            Err(err) => return Err(err.into()),
        }
        info!(%user_id, count = selected.len(), "favorites updated");
        self.favorites(user_id).await
    }

    pub async fn avatar(&self, user_id: UserId) -> Result<Avatar, AppError> {
        Ok(self.avatars.get(user_id).await?)
    }
}

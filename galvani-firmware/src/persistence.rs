//! Settings persistence
//!
//! Stores the flat channel settings image in flash. Falls back to the
//! compiled-in defaults when flash is empty or holds an image that does
//! not match this board.

use defmt::*;

use galvani_core::config::{ChannelSettings, ImageError, MAX_IMAGE_SIZE};
use galvani_hal_rp2040::flash::{FlashError, FlashStorage, StorageKey};
use galvani_hal_rp2040::FlashStorageTrait;

use crate::board::CHANNEL_COUNT;
use crate::defaults::channel_defaults;

/// Settings persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Flash operation failed
    Flash(FlashError),
    /// Stored image is unusable
    Image(ImageError),
}

impl From<FlashError> for PersistError {
    fn from(e: FlashError) -> Self {
        PersistError::Flash(e)
    }
}

impl From<ImageError> for PersistError {
    fn from(e: ImageError) -> Self {
        PersistError::Image(e)
    }
}

impl PersistError {
    /// Operator-facing description
    pub fn describe(&self) -> &'static str {
        match self {
            PersistError::Flash(FlashError::NotFound) => "no stored settings",
            PersistError::Flash(_) => "flash error",
            PersistError::Image(ImageError::LengthMismatch { .. }) => "stored image size mismatch",
            PersistError::Image(ImageError::OutOfBounds { .. }) => "stored values out of bounds",
        }
    }
}

/// Settings persistence manager
pub struct SettingsPersistence<'d> {
    storage: FlashStorage<'d>,
}

impl<'d> SettingsPersistence<'d> {
    /// Create a new persistence manager
    pub fn new(storage: FlashStorage<'d>) -> Self {
        Self { storage }
    }

    /// Read and decode the stored image
    pub async fn load(&mut self) -> Result<ChannelSettings<CHANNEL_COUNT>, PersistError> {
        let mut buffer = [0u8; MAX_IMAGE_SIZE];
        let len = self
            .storage
            .read(StorageKey::ChannelSettings, &mut buffer)
            .await?;

        debug!("Read {} bytes of settings from flash", len);

        Ok(ChannelSettings::from_image(&buffer[..len])?)
    }

    /// Stored image, or the defaults when there is none
    pub async fn load_or_default(&mut self) -> ChannelSettings<CHANNEL_COUNT> {
        match self.load().await {
            Ok(settings) => {
                info!("Loaded channel settings from flash");
                settings
            }
            Err(PersistError::Flash(FlashError::NotFound)) => {
                info!("No stored settings, using defaults");
                channel_defaults()
            }
            Err(e) => {
                warn!("Stored settings unusable ({:?}), using defaults", e);
                channel_defaults()
            }
        }
    }

    /// Write the settings image
    pub async fn store(
        &mut self,
        settings: &ChannelSettings<CHANNEL_COUNT>,
    ) -> Result<(), PersistError> {
        let image = settings.to_image();
        match self.storage.write(StorageKey::ChannelSettings, &image).await {
            Ok(()) => {}
            Err(FlashError::Storage) => {
                // a corrupted map is only recoverable by starting over
                warn!("Settings partition unusable, erasing");
                self.storage.erase_all().await?;
                self.storage
                    .write(StorageKey::ChannelSettings, &image)
                    .await?;
            }
            Err(e) => return Err(e.into()),
        }
        info!("Stored {} bytes of settings", image.len());
        Ok(())
    }
}

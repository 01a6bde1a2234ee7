use crate::models::status::OsStatus;

/// Audio session category. Capture requires simultaneous play and record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionCategory {
    PlayAndRecord,
}

/// Options applied together with the session category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SessionCategoryOptions {
    pub default_to_speaker: bool,
    pub allow_bluetooth: bool,
}

impl SessionCategoryOptions {
    pub fn capture() -> Self {
        Self {
            default_to_speaker: true,
            allow_bluetooth: true,
        }
    }
}

/// Process-wide audio session configuration.
pub trait SessionConfigurer: Send + Sync {
    fn set_category(
        &self,
        category: SessionCategory,
        options: SessionCategoryOptions,
    ) -> Result<(), OsStatus>;

    fn set_active(&self, active: bool) -> Result<(), OsStatus>;
}

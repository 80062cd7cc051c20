use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::{Deserialize, Serialize};

use super::invalid_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    #[default]
    Ja,
}

impl Locale {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ja => "ja",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "en" => Some(Self::En),
            "ja" => Some(Self::Ja),
            _ => None,
        }
    }
}

/// User preferences. Stored as the single row of the `settings` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub theme: Theme,
    pub locale: Locale,
}

/// Partial settings change; `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SettingsUpdate {
    pub theme: Option<Theme>,
    pub locale: Option<Locale>,
}

impl AppSettings {
    #[must_use]
    pub fn merge(self, update: SettingsUpdate) -> Self {
        Self {
            theme: update.theme.unwrap_or(self.theme),
            locale: update.locale.unwrap_or(self.locale),
        }
    }

    /// Load the stored settings, falling back to defaults when the row is missing.
    pub fn load(conn: &Connection) -> Result<Self> {
        let row: Option<(String, String)> = conn
            .query_row("SELECT theme, locale FROM settings WHERE id = 1", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()?;

        let Some((theme, locale)) = row else {
            return Ok(Self::default());
        };

        Ok(Self {
            theme: Theme::parse(&theme).ok_or_else(|| invalid_text(0, &theme))?,
            locale: Locale::parse(&locale).ok_or_else(|| invalid_text(1, &locale))?,
        })
    }

    pub fn save(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO settings (id, theme, locale) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET theme = excluded.theme, locale = excluded.locale",
            params![self.theme.as_str(), self.locale.as_str()],
        )?;
        Ok(())
    }

    /// Apply a partial change to the stored settings and return the result.
    pub fn update(conn: &Connection, update: SettingsUpdate) -> Result<Self> {
        let settings = Self::load(conn)?.merge(update);
        settings.save(conn)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.theme, Theme::System);
        assert_eq!(settings.locale, Locale::Ja);
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let settings = AppSettings::default().merge(SettingsUpdate {
            theme: Some(Theme::Dark),
            locale: None,
        });
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.locale, Locale::Ja);
    }

    #[test]
    fn test_save_and_load() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        assert_eq!(AppSettings::load(conn).unwrap(), AppSettings::default());

        let settings = AppSettings {
            theme: Theme::Light,
            locale: Locale::En,
        };
        settings.save(conn).unwrap();
        assert_eq!(AppSettings::load(conn).unwrap(), settings);
    }

    #[test]
    fn test_update_persists_merged_settings() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let updated = AppSettings::update(
            conn,
            SettingsUpdate {
                theme: None,
                locale: Some(Locale::En),
            },
        )
        .unwrap();
        assert_eq!(updated.theme, Theme::System);
        assert_eq!(updated.locale, Locale::En);
        assert_eq!(AppSettings::load(conn).unwrap(), updated);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{"locale":"en"}"#).unwrap();
        assert_eq!(settings.theme, Theme::System);
        assert_eq!(settings.locale, Locale::En);
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Club list and favorites rendering.
//!
//! Renderers build view models; the `*_html` helpers turn those into page
//! fragments. Everything interpolated into HTML is escaped.

use crate::error::{AppError, Result};
use crate::models::{
    ClubRecord, FavoriteRecord, FavoritesSet, FilterFacets, UserId, DEFAULT_DESCRIPTION,
};
use crate::services::catalog::ClubCatalog;
use crate::services::favorites::{FavoritesReconciler, LocalFavoritesStore};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub const NO_CLUBS_FOUND: &str = "No clubs found.";
pub const NO_FAVORITES: &str = "No favorites saved yet.";
const NOT_AVAILABLE: &str = "Not available";
const NO_TITLE: &str = "No title available";

/// Visual state of an entry's favorite toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum StarIcon {
    Plain,
    Favorited,
}

impl StarIcon {
    pub fn for_membership(favorited: bool) -> Self {
        if favorited {
            StarIcon::Favorited
        } else {
            StarIcon::Plain
        }
    }
}

/// One rendered club box.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ClubEntry {
    pub club: String,
    pub staff: Option<String>,
    pub email: Option<String>,
    pub icon: StarIcon,
    pub detail: ClubDetail,
}

/// A rendered list: entries, or a placeholder message when there are none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ListView {
    pub entries: Vec<ClubEntry>,
    pub placeholder: Option<String>,
}

impl ListView {
    fn from_entries(entries: Vec<ClubEntry>, empty_message: &str) -> Self {
        let placeholder = entries.is_empty().then(|| empty_message.to_string());
        Self {
            entries,
            placeholder,
        }
    }

    pub fn entry(&self, club: &str) -> Option<&ClubEntry> {
        self.entries.iter().find(|e| e.club == club)
    }
}

/// Contents of the detail overlay for one club.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ClubDetail {
    pub title: String,
    pub staff: String,
    pub email: String,
    pub time: String,
    pub club_type: String,
    pub days: String,
    pub description: String,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl ClubDetail {
    pub fn for_club(club: &ClubRecord) -> Self {
        let time = match club.time {
            Some(t) => format!("Time: {} School", t),
            None => format!("Time: {}", NOT_AVAILABLE),
        };

        let title = if club.club.is_empty() {
            NO_TITLE
        } else {
            club.club.as_str()
        };

        Self {
            title: title.to_string(),
            staff: format!(
                "Staff: {}",
                non_empty(club.staff.as_deref()).unwrap_or(NOT_AVAILABLE)
            ),
            email: format!(
                "Email: {}",
                non_empty(club.email.as_deref()).unwrap_or(NOT_AVAILABLE)
            ),
            time,
            club_type: format!(
                "Type: {}",
                club.club_type.map(|t| t.as_str()).unwrap_or(NOT_AVAILABLE)
            ),
            days: format!(
                "Days: {}",
                club.day.map(|d| d.as_str()).unwrap_or(NOT_AVAILABLE)
            ),
            description: non_empty(club.description.as_deref())
                .unwrap_or(DEFAULT_DESCRIPTION)
                .to_string(),
        }
    }
}

fn entry_for(club: &ClubRecord, icon: StarIcon) -> ClubEntry {
    ClubEntry {
        club: club.club.clone(),
        staff: club.staff.clone(),
        email: club.email.clone(),
        icon,
        detail: ClubDetail::for_club(club),
    }
}

/// Filtered view of the full catalog.
pub struct ClubListRenderer;

impl ClubListRenderer {
    /// Clubs passing the active facets, in catalog order.
    pub fn filter<'a>(catalog: &'a ClubCatalog, facets: &FilterFacets) -> Vec<&'a ClubRecord> {
        if !facets.is_active() {
            return catalog.clubs().iter().collect();
        }
        catalog
            .clubs()
            .iter()
            .filter(|club| facets.matches(club))
            .collect()
    }

    pub fn render(
        catalog: &ClubCatalog,
        facets: &FilterFacets,
        favorites: &FavoritesSet,
    ) -> ListView {
        let entries = Self::filter(catalog, facets)
            .into_iter()
            .map(|club| {
                entry_for(
                    club,
                    StarIcon::for_membership(favorites.contains(&club.club)),
                )
            })
            .collect();
        ListView::from_entries(entries, NO_CLUBS_FOUND)
    }
}

/// Where the favorites-only view is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoritesMode {
    /// Inside the catalog page, over the reconciled favorites. Removals go
    /// through the reconciler and reach the remote copy.
    Embedded,
    /// The dedicated favorites page, over the local copy only. Display
    /// fields are refreshed from the live catalog when it loads. Removals
    /// only touch the local copy.
    Standalone,
}

/// Favorites-only view in either mode.
pub struct FavoritesListRenderer {
    mode: FavoritesMode,
}

impl FavoritesListRenderer {
    pub fn new(mode: FavoritesMode) -> Self {
        Self { mode }
    }

    /// Fields to display for a favorite: the live catalog record in
    /// standalone mode when one exists, else the cached snapshot.
    pub fn display_record(
        &self,
        favorite: &FavoriteRecord,
        catalog: Option<&ClubCatalog>,
    ) -> ClubRecord {
        let live = match self.mode {
            FavoritesMode::Standalone => catalog.and_then(|c| c.get(&favorite.club)),
            FavoritesMode::Embedded => None,
        };
        live.cloned().unwrap_or_else(|| favorite.to_club())
    }

    pub fn render(&self, favorites: &FavoritesSet, catalog: Option<&ClubCatalog>) -> ListView {
        let entries = favorites
            .iter()
            .map(|favorite| {
                entry_for(
                    &self.display_record(favorite, catalog),
                    StarIcon::Favorited,
                )
            })
            .collect();
        ListView::from_entries(entries, NO_FAVORITES)
    }

    /// Remove a favorite as this mode allows; returns the favorites to render
    /// next.
    pub async fn remove(
        &self,
        reconciler: &FavoritesReconciler,
        local: &LocalFavoritesStore,
        club: &str,
        user: Option<&UserId>,
    ) -> Result<FavoritesSet> {
        match self.mode {
            FavoritesMode::Standalone => Ok(local.remove(club)),
            FavoritesMode::Embedded => {
                let current = local.get();
                let record = current
                    .get(club)
                    .ok_or_else(|| AppError::NotFound(format!("Favorite {} not found", club)))?;
                reconciler.remove_favorite(local, record, user).await
            }
        }
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render a list as `<li>` club boxes, or the placeholder paragraph.
///
/// `toggle_action` is the form target for the star button. `detail_base` is
/// the page URL up to its query separator (`/?` or `/?view=favorites&`), to
/// which the detail link appends `detail=<club>`.
pub fn list_html(view: &ListView, toggle_action: &str, detail_base: &str) -> String {
    if let Some(placeholder) = &view.placeholder {
        return format!("<p class=\"no-results\">{}</p>", escape_html(placeholder));
    }

    let mut html = String::new();
    for entry in &view.entries {
        let (glyph, class) = match entry.icon {
            StarIcon::Favorited => ("&#9733;", "favorite-star favorited"),
            StarIcon::Plain => ("&#9734;", "favorite-star"),
        };
        let club = escape_html(&entry.club);
        html.push_str(&format!(
            concat!(
                "<li class=\"club-box\">",
                "<form method=\"post\" action=\"{action}\">",
                "<input type=\"hidden\" name=\"club\" value=\"{club}\">",
                "<button type=\"submit\" class=\"{class}\" data-club=\"{club}\">{glyph}</button>",
                "</form>",
                "<a class=\"club-detail\" href=\"{base}detail={detail}\">",
                "<h3 class=\"clubBoxesFontSize\">{club}</h3></a>",
                "<p class=\"clubBoxesFontSize\">{staff}</p>",
                "<p class=\"clubBoxesEmailSize\">{email}</p>",
                "</li>"
            ),
            action = escape_html(toggle_action),
            class = class,
            club = club,
            glyph = glyph,
            base = escape_html(detail_base),
            detail = urlencoding::encode(&entry.club),
            staff = escape_html(entry.staff.as_deref().unwrap_or("")),
            email = escape_html(entry.email.as_deref().unwrap_or("")),
        ));
    }
    html
}

/// Render the detail overlay with a close link back to `close_href`.
pub fn detail_html(detail: &ClubDetail, close_href: &str) -> String {
    format!(
        concat!(
            "<div id=\"descriptionOverlay\" class=\"overlay\">",
            "<a class=\"overlay-backdrop\" href=\"{close}\"></a>",
            "<div class=\"overlay-content\">",
            "<a id=\"closeOverlay\" href=\"{close}\">&times;</a>",
            "<h2 id=\"overlayTitle\">{title}</h2>",
            "<p id=\"overlayStaff\">{staff}</p>",
            "<p id=\"overlayEmail\">{email}</p>",
            "<p id=\"overlayTime\">{time}</p>",
            "<p id=\"overlayType\">{club_type}</p>",
            "<p id=\"overlayDays\">{days}</p>",
            "<p id=\"overlayDescription\">{description}</p>",
            "</div></div>"
        ),
        close = escape_html(close_href),
        title = escape_html(&detail.title),
        staff = escape_html(&detail.staff),
        email = escape_html(&detail.email),
        time = escape_html(&detail.time),
        club_type = escape_html(&detail.club_type),
        days = escape_html(&detail.days),
        description = escape_html(&detail.description),
    )
}

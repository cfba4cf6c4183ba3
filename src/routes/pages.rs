// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-rendered pages.
//!
//! The catalog page (`/`) and the dedicated favorites page (`/favorites`).
//! Stars and filters are plain forms that post back and redirect, so the
//! pages work without scripts.

use crate::error::{CATALOG_UNAVAILABLE_MESSAGE, REMOVE_FAVORITE_ALERT, SAVE_FAVORITE_ALERT};
use crate::middleware::{CurrentUser, DeviceId};
use crate::models::{FilterFacets, CHECKBOXES};
use crate::routes::api::open_session;
use crate::services::render::{detail_html, escape_html, list_html, FavoritesMode};
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    routing::{get, post},
    Extension, Form, Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(catalog_page))
        .route("/filters", post(submit_filters))
        .route("/toggle", post(submit_toggle))
        .route("/favorites/embedded/remove", post(submit_embedded_remove))
        .route("/favorites", get(favorites_page))
        .route("/favorites/remove", post(submit_standalone_remove))
}

#[derive(Deserialize, Default)]
struct PageQuery {
    /// Club whose detail overlay is open
    detail: Option<String>,
    /// `favorites` shows only favorites on the catalog page
    view: Option<String>,
    /// Alert code carried across a redirect
    alert: Option<String>,
}

#[derive(Deserialize)]
struct ClubForm {
    club: String,
}

/// Alert codes used in redirects.
const ALERT_SAVE: &str = "save";
const ALERT_REMOVE: &str = "remove";

fn alert_message(code: Option<&str>) -> Option<&'static str> {
    match code? {
        ALERT_SAVE => Some(SAVE_FAVORITE_ALERT),
        ALERT_REMOVE => Some(REMOVE_FAVORITE_ALERT),
        _ => None,
    }
}

fn page(title: &str, alert: Option<&str>, body: &str) -> Html<String> {
    let alert_html = alert
        .map(|a| format!("<div class=\"alert\" role=\"alert\">{}</div>", escape_html(a)))
        .unwrap_or_default();

    Html(format!(
        concat!(
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
            "<title>{title}</title></head><body>",
            "<nav><a href=\"/\">All clubs</a> <a href=\"/?view=favorites\">My favorites</a> ",
            "<a href=\"/favorites\">Favorites page</a></nav>",
            "{alert}{body}</body></html>"
        ),
        title = escape_html(title),
        alert = alert_html,
        body = body,
    ))
}

fn filter_form(facets: &FilterFacets) -> String {
    let mut html = String::from("<form id=\"filters\" method=\"post\" action=\"/filters\">");
    for (id, value) in CHECKBOXES {
        html.push_str(&format!(
            "<label><input type=\"checkbox\" id=\"{id}\" name=\"{id}\"{checked}> {label}</label>",
            id = id,
            checked = if facets.is_checked(value) { " checked" } else { "" },
            label = value.label(),
        ));
    }
    html.push_str("<button type=\"submit\">Apply</button></form>");
    html
}

fn with_alert(path: &str, alert: Option<&str>) -> Redirect {
    match alert {
        Some(code) if path.contains('?') => Redirect::to(&format!("{}&alert={}", path, code)),
        Some(code) => Redirect::to(&format!("{}?alert={}", path, code)),
        None => Redirect::to(path),
    }
}

// ─── Catalog page ────────────────────────────────────────────

async fn catalog_page(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceId>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let (mut session, sync_alert) = open_session(&state, &device, user).await;
    let alert = sync_alert.or_else(|| alert_message(query.alert.as_deref()).map(str::to_string));
    let facets = session.facets();
    let favorites_only = query.view.as_deref() == Some("favorites");

    // A page view fetches the list afresh.
    if let Err(e) = session.load_catalog(state.club_source.as_ref()).await {
        tracing::error!(error = %e, "Catalog page rendered without clubs");
        let body = format!(
            "{}<ul id=\"clubList\"><p class=\"no-results\">{}</p></ul>",
            filter_form(&facets),
            CATALOG_UNAVAILABLE_MESSAGE
        );
        return page("Clubs", alert.as_deref(), &body);
    }

    let (list, toggle_action, base, close) = if favorites_only {
        (
            session.render_favorites(),
            "/favorites/embedded/remove",
            "/?view=favorites&",
            "/?view=favorites",
        )
    } else {
        match session.render_catalog(state.club_source.as_ref()).await {
            Ok(view) => (view, "/toggle", "/?", "/"),
            Err(e) => {
                tracing::error!(error = %e, "Error rendering catalog");
                let body = format!(
                    "<ul id=\"clubList\"><p class=\"no-results\">{}</p></ul>",
                    CATALOG_UNAVAILABLE_MESSAGE
                );
                return page("Clubs", alert.as_deref(), &body);
            }
        }
    };

    let overlay = match query.detail.as_deref() {
        Some(club) => list
            .entry(club)
            .map(|entry| detail_html(&entry.detail, close))
            .unwrap_or_default(),
        None => String::new(),
    };

    let body = format!(
        "{}<ul id=\"clubList\">{}</ul>{}",
        filter_form(&facets),
        list_html(&list, toggle_action, base),
        overlay
    );
    page("Clubs", alert.as_deref(), &body)
}

async fn submit_filters(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceId>,
    Form(form): Form<HashMap<String, String>>,
) -> Redirect {
    let session = state.sessions.session(&device.0).await.lock_owned().await;
    let facets = session.set_all_checkboxes(|id| form.contains_key(id));
    tracing::debug!(active = facets.is_active(), "Filters submitted");
    Redirect::to("/")
}

async fn submit_toggle(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceId>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<ClubForm>,
) -> Redirect {
    let (mut session, sync_alert) = open_session(&state, &device, user).await;
    let failed = match session
        .toggle_favorite(&state.reconciler, state.club_source.as_ref(), &form.club)
        .await
    {
        Ok(outcome) => outcome.alert.is_some(),
        Err(e) => {
            tracing::warn!(club = %form.club, error = %e, "Toggle rejected");
            false
        }
    };
    let alert = (failed || sync_alert.is_some()).then_some(ALERT_SAVE);
    with_alert("/", alert)
}

async fn submit_embedded_remove(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceId>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<ClubForm>,
) -> Redirect {
    let (mut session, sync_alert) = open_session(&state, &device, user).await;
    let alert = match session
        .remove_favorite(
            &state.reconciler,
            state.club_source.as_ref(),
            FavoritesMode::Embedded,
            &form.club,
        )
        .await
    {
        Ok(outcome) => outcome.alert.map(|_| ALERT_REMOVE),
        Err(e) => {
            tracing::warn!(club = %form.club, error = %e, "Removal rejected");
            None
        }
    };
    let alert = alert.or(sync_alert.map(|_| ALERT_SAVE));
    with_alert("/?view=favorites", alert)
}

// ─── Favorites page ──────────────────────────────────────────

async fn favorites_page(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceId>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let session = state.sessions.session(&device.0).await.lock_owned().await;
    let list = session.render_standalone(state.club_source.as_ref()).await;
    let alert = alert_message(query.alert.as_deref());

    let overlay = match query.detail.as_deref() {
        Some(club) => list
            .entry(club)
            .map(|entry| detail_html(&entry.detail, "/favorites"))
            .unwrap_or_default(),
        None => String::new(),
    };

    let body = format!(
        "<ul id=\"favoriteList\">{}</ul>{}",
        list_html(&list, "/favorites/remove", "/favorites?"),
        overlay
    );
    page("My Favorites", alert, &body)
}

async fn submit_standalone_remove(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceId>,
    Form(form): Form<ClubForm>,
) -> Redirect {
    let mut session = state.sessions.session(&device.0).await.lock_owned().await;
    if let Err(e) = session
        .remove_favorite(
            &state.reconciler,
            state.club_source.as_ref(),
            FavoritesMode::Standalone,
            &form.club,
        )
        .await
    {
        tracing::warn!(club = %form.club, error = %e, "Removal rejected");
    }
    Redirect::to("/favorites")
}

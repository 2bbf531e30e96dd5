//! REST endpoint handlers.
//!
//! Every success body carries `"ok": true` next to the payload fields;
//! every failure renders through [`ApiError`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Tick, actor roster, version |
//! | `GET` | `/addons` | Loaded addons and load errors |
//! | `GET` | `/npc/{name}` | Actor descriptor |
//! | `POST` | `/realm/selection` | Apply a realm selection |
//! | `POST` | `/favor/apply` | Apply a single favor change |
//! | `POST` | `/gossip/propagate` | Spread a rumor to receivers |
//! | `GET` | `/travel/options` | Lanes leaving a location |
//! | `POST` | `/travel/go` | Move an actor along a lane |
//! | `GET` | `/travel/where` | Current location of an actor |
//! | `GET` | `/travel/log` | Recent journeys |

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use fizban_types::{
    ActorDescriptor, ActorId, FavorOutcome, FavorRequest, GossipOutcome, GossipRequest, LocationId,
    Selection, SelectionOutcome, TravelOption, TravelReceipt, TravelRecord, TravelRequest,
};
use serde::{Deserialize, Serialize};

use crate::addons::{self, AddonInfo};
use crate::error::ApiError;
use crate::state::{AppState, BACKEND_VERSION};

/// Default number of entries returned by `/travel/log`.
const DEFAULT_LOG_LIMIT: usize = 50;

/// Success body: `"ok": true` plus the flattened payload.
#[derive(Debug, Serialize)]
pub struct Okay<T> {
    /// Always `true`.
    pub ok: bool,
    /// Payload fields.
    #[serde(flatten)]
    pub body: T,
}

const fn okay<T>(body: T) -> Json<Okay<T>> {
    Json(Okay { ok: true, body })
}

type ApiResult<T> = Result<Json<Okay<T>>, ApiError>;

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("missing query parameter {name}")))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthBody {
    /// Current world tick.
    pub tick: u64,
    /// Every known actor, sorted.
    pub agents: Vec<ActorId>,
    /// Backend version.
    pub version: &'static str,
}

/// Report liveness, tick, and actor roster.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Okay<HealthBody>> {
    let health = state.world.health();
    okay(HealthBody {
        tick: health.tick,
        agents: health.actors,
        version: BACKEND_VERSION,
    })
}

// ---------------------------------------------------------------------------
// GET /addons
// ---------------------------------------------------------------------------

/// Body of `GET /addons`.
#[derive(Debug, Serialize)]
pub struct AddonsBody {
    /// Backend version.
    pub backend_version: &'static str,
    /// The raw addon setting.
    pub enabled: String,
    /// Loaded addons keyed by name.
    pub addons: BTreeMap<String, AddonInfo>,
    /// Load errors keyed by requested name.
    pub errors: BTreeMap<String, String>,
    /// When the addons were loaded.
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// List loaded addons and load errors.
pub async fn list_addons(State(state): State<Arc<AppState>>) -> Json<Okay<AddonsBody>> {
    let registry = &state.addons;
    okay(AddonsBody {
        backend_version: BACKEND_VERSION,
        enabled: registry.enabled_setting().to_owned(),
        addons: registry.addons().clone(),
        errors: registry.errors().clone(),
        loaded_at: registry.loaded_at(),
    })
}

// ---------------------------------------------------------------------------
// GET /npc/{name}
// ---------------------------------------------------------------------------

/// Describe an actor. Unknown actors get an empty descriptor.
pub async fn get_npc(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<ActorDescriptor> {
    let descriptor = state.world.describe_actor(&ActorId::from(name))?;
    Ok(okay(descriptor))
}

// ---------------------------------------------------------------------------
// POST /realm/selection
// ---------------------------------------------------------------------------

/// Body of `POST /realm/selection`.
#[derive(Debug, Serialize)]
pub struct SelectionBody {
    /// Engine outcome.
    #[serde(flatten)]
    pub outcome: SelectionOutcome,
    /// Notes attached by addon hooks.
    pub hook_notes: Vec<String>,
    /// Addon hook failures. Never affect the outcome.
    pub hook_errors: Vec<String>,
}

/// Apply a realm selection and run addon hooks over the outcome.
pub async fn realm_selection(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Selection>, JsonRejection>,
) -> ApiResult<SelectionBody> {
    let Json(selection) = payload?;
    let outcome = state.world.apply_selection(&selection)?;
    let (hook_notes, hook_errors) = state.addons.run_selection_hooks(&outcome, &state.world);
    Ok(okay(SelectionBody {
        outcome,
        hook_notes,
        hook_errors,
    }))
}

// ---------------------------------------------------------------------------
// POST /favor/apply
// ---------------------------------------------------------------------------

/// Apply one favor change.
pub async fn favor_apply(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FavorRequest>, JsonRejection>,
) -> ApiResult<FavorOutcome> {
    let Json(request) = payload?;
    Ok(okay(state.world.apply_favor(&request)?))
}

// ---------------------------------------------------------------------------
// POST /gossip/propagate
// ---------------------------------------------------------------------------

/// Spread a rumor from its teller to the receivers.
pub async fn gossip_propagate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GossipRequest>, JsonRejection>,
) -> ApiResult<GossipOutcome> {
    let Json(request) = payload?;
    Ok(okay(state.world.propagate_gossip(&request)?))
}

// ---------------------------------------------------------------------------
// GET /travel/options
// ---------------------------------------------------------------------------

/// Query parameters for `GET /travel/options`.
#[derive(Debug, Deserialize)]
pub struct OptionsQuery {
    /// Origin location.
    pub from_location: Option<String>,
}

/// Body of `GET /travel/options`.
#[derive(Debug, Serialize)]
pub struct OptionsBody {
    /// Origin location.
    pub from_location: LocationId,
    /// Lanes in configuration order.
    pub options: Vec<TravelOption>,
}

/// List lanes leaving a location.
pub async fn travel_options(
    State(state): State<Arc<AppState>>,
    query: Result<Query<OptionsQuery>, QueryRejection>,
) -> ApiResult<OptionsBody> {
    let Query(params) = query?;
    let from_location = LocationId::from(required(params.from_location, "from_location")?);
    let options = state.world.travel_options(&from_location)?;
    Ok(okay(OptionsBody {
        from_location,
        options,
    }))
}

// ---------------------------------------------------------------------------
// POST /travel/go
// ---------------------------------------------------------------------------

/// Move an actor along a lane.
pub async fn travel_go(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TravelRequest>, JsonRejection>,
) -> ApiResult<TravelReceipt> {
    let Json(request) = payload?;
    Ok(okay(state.world.travel_go(&request)?))
}

// ---------------------------------------------------------------------------
// GET /travel/where
// ---------------------------------------------------------------------------

/// Query parameters for `GET /travel/where`.
#[derive(Debug, Deserialize)]
pub struct WhereQuery {
    /// Actor to locate.
    pub actor: Option<String>,
}

/// Body of `GET /travel/where`.
#[derive(Debug, Serialize)]
pub struct WhereBody {
    /// The actor.
    pub actor: ActorId,
    /// Current location, `null` if unknown.
    pub location: Option<LocationId>,
}

/// Report an actor's current location.
pub async fn travel_where(
    State(state): State<Arc<AppState>>,
    query: Result<Query<WhereQuery>, QueryRejection>,
) -> ApiResult<WhereBody> {
    let Query(params) = query?;
    let actor = ActorId::from(required(params.actor, "actor")?);
    let location = state.world.where_is(&actor)?;
    Ok(okay(WhereBody { actor, location }))
}

// ---------------------------------------------------------------------------
// GET /travel/log
// ---------------------------------------------------------------------------

/// Query parameters for `GET /travel/log`.
#[derive(Debug, Deserialize)]
pub struct LogQuery {
    /// Maximum number of entries (default 50).
    pub limit: Option<usize>,
}

/// Body of `GET /travel/log`.
#[derive(Debug, Serialize)]
pub struct LogBody {
    /// Number of entries returned.
    pub count: usize,
    /// Journeys, newest first.
    pub entries: Vec<TravelRecord>,
}

/// List recent journeys.
pub async fn travel_log(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LogQuery>, QueryRejection>,
) -> ApiResult<LogBody> {
    let Query(params) = query?;
    let entries = state
        .world
        .travel_log(params.limit.unwrap_or(DEFAULT_LOG_LIMIT));
    Ok(okay(LogBody {
        count: entries.len(),
        entries,
    }))
}

// ---------------------------------------------------------------------------
// Addon routes
// ---------------------------------------------------------------------------

/// Body of the addon ping routes.
#[derive(Debug, Serialize)]
pub struct PingBody {
    /// Answering addon.
    pub addon: &'static str,
    /// Always `"pong"`.
    pub reply: &'static str,
    /// Extra detail, addon specific.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// `GET /ping` from the `example_ping` addon.
pub async fn example_ping() -> Json<Okay<PingBody>> {
    okay(PingBody {
        addon: addons::EXAMPLE_PING,
        reply: "pong",
        detail: None,
    })
}

/// `GET /addon/realm-lorkhan/ping` from the `realm_lorkhan` addon.
pub async fn realm_lorkhan_ping(State(state): State<Arc<AppState>>) -> ApiResult<PingBody> {
    let realm = addons::realm_location();
    let lanes = state.world.travel_options(&realm)?.len();
    Ok(okay(PingBody {
        addon: addons::REALM_LORKHAN,
        reply: "pong",
        detail: Some(format!("{realm} has {lanes} lane(s) out")),
    }))
}

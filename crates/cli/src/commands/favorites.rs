//! Favorites commands.
//!
//! Favorites are stored locally next to the session token. `sync` pushes
//! them to the server-side favorite flags of the signed-in account.

use std::collections::HashSet;

use clap::Subcommand;
use luxtime_core::WatchId;
use serde::Serialize;

use super::{CommandError, Context, print_json};

#[derive(Subcommand)]
pub enum FavoriteAction {
    /// List local favorites
    List,
    /// Flip a listing's favorite state
    Toggle {
        /// Listing ID
        id: String,
    },
    /// Favorite a listing
    Add {
        /// Listing ID
        id: String,
    },
    /// Unfavorite a listing
    Remove {
        /// Listing ID
        id: String,
    },
    /// Flag every local favorite on the server
    Sync,
}

#[derive(Serialize)]
struct FavoriteState<'a> {
    id: &'a str,
    is_favorite: bool,
    changed: bool,
}

#[derive(Serialize)]
struct SyncReport {
    pushed: Vec<WatchId>,
    skipped: Vec<String>,
}

pub async fn run(ctx: &Context, action: FavoriteAction) -> Result<(), CommandError> {
    let favorites = &ctx.favorites;
    match action {
        FavoriteAction::List => print_json(&favorites.ids()),
        FavoriteAction::Toggle { id } => {
            let is_favorite = favorites.toggle(&id)?;
            print_json(&FavoriteState {
                id: &id,
                is_favorite,
                changed: true,
            })
        }
        FavoriteAction::Add { id } => {
            let changed = favorites.add(&id)?;
            print_json(&FavoriteState {
                id: &id,
                is_favorite: true,
                changed,
            })
        }
        FavoriteAction::Remove { id } => {
            let changed = favorites.remove(&id)?;
            print_json(&FavoriteState {
                id: &id,
                is_favorite: false,
                changed,
            })
        }
        FavoriteAction::Sync => sync(ctx).await,
    }
}

async fn sync(ctx: &Context) -> Result<(), CommandError> {
    ctx.require_user().await?;

    let on_server: HashSet<WatchId> = ctx
        .api
        .favorites()
        .await?
        .into_iter()
        .map(|watch| watch.id)
        .collect();

    let mut report = SyncReport {
        pushed: Vec::new(),
        skipped: Vec::new(),
    };

    for raw in ctx.favorites.ids() {
        let Ok(id) = raw.parse::<WatchId>() else {
            tracing::warn!("Skipping non-numeric favorite {raw:?}");
            report.skipped.push(raw);
            continue;
        };
        if on_server.contains(&id) {
            continue;
        }
        let toggled = ctx.api.toggle_favorite(id).await?;
        if toggled.is_favorite {
            report.pushed.push(id);
        } else {
            // Already flagged server-side; undo the flip.
            ctx.api.toggle_favorite(id).await?;
        }
    }

    tracing::info!("{} favorites pushed to the server", report.pushed.len());
    print_json(&report)
}

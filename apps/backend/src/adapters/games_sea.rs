//! SeaORM adapter for the game store.
//!
//! The state blob is stored as JSON next to a denormalized `status` column
//! (used to find active games) and a `version` column that every write bumps.
//! Writes with an expected version are compare-and-swap: the UPDATE filters on
//! the version, and zero affected rows means a concurrent writer won.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::domain::state::{GameId, GameState, GameStatus};
use crate::entities::games;
use crate::errors::domain::DomainError;
use crate::infra::db_errors::{map_db_err, GAME_NOT_FOUND_PREFIX, OPTIMISTIC_LOCK_PREFIX};
use crate::repos::games::{GameStore, StoredGame};

impl From<GameStatus> for games::GameStatus {
    fn from(value: GameStatus) -> Self {
        match value {
            GameStatus::Lobby => games::GameStatus::Lobby,
            GameStatus::Active => games::GameStatus::Active,
            GameStatus::Finished => games::GameStatus::Finished,
            GameStatus::Forfeited => games::GameStatus::Forfeited,
        }
    }
}

fn encode(state: &GameState) -> Result<String, sea_orm::DbErr> {
    serde_json::to_string(state).map_err(|e| sea_orm::DbErr::Json(e.to_string()))
}

/// The blob is written before the row id exists, so the id column is authoritative.
fn decode(model: games::Model) -> Result<StoredGame, sea_orm::DbErr> {
    let mut state: GameState =
        serde_json::from_str(&model.state_json).map_err(|e| sea_orm::DbErr::Json(e.to_string()))?;
    state.game_id = model.id;
    Ok(StoredGame {
        state,
        version: model.version,
    })
}

fn not_found(game_id: GameId) -> sea_orm::DbErr {
    sea_orm::DbErr::Custom(format!("{GAME_NOT_FOUND_PREFIX}{game_id}"))
}

pub async fn create_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    state: &GameState,
) -> Result<games::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let active = games::ActiveModel {
        id: NotSet,
        status: Set(state.status.into()),
        state_json: Set(encode(state)?),
        version: Set(1),
        created_at: Set(now),
        updated_at: Set(now),
    };
    active.insert(conn).await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: GameId,
) -> Result<Option<games::Model>, sea_orm::DbErr> {
    games::Entity::find_by_id(game_id).one(conn).await
}

/// Find game by ID or fail with the structured not-found payload.
pub async fn require_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: GameId,
) -> Result<games::Model, sea_orm::DbErr> {
    find_by_id(conn, game_id)
        .await?
        .ok_or_else(|| not_found(game_id))
}

/// Write the state, bumping the version. With `expected_version` this is a
/// compare-and-swap; a mismatch yields the `OPTIMISTIC_LOCK` payload.
async fn write_state<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    state: &GameState,
    expected_version: Option<i32>,
) -> Result<(), sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let mut update = games::Entity::update_many()
        .col_expr(games::Column::StateJson, Expr::value(encode(state)?))
        .col_expr(
            games::Column::Status,
            Expr::value(games::GameStatus::from(state.status)),
        )
        .col_expr(games::Column::UpdatedAt, Expr::value(now))
        .col_expr(games::Column::Version, Expr::col(games::Column::Version).add(1))
        .filter(games::Column::Id.eq(state.game_id));
    if let Some(expected) = expected_version {
        update = update.filter(games::Column::Version.eq(expected));
    }

    let result = update.exec(conn).await?;
    if result.rows_affected == 0 {
        // Either the game doesn't exist or the version moved on
        let current = find_by_id(conn, state.game_id)
            .await?
            .ok_or_else(|| not_found(state.game_id))?;
        let payload = format!(
            "{OPTIMISTIC_LOCK_PREFIX}{{\"expected\":{},\"actual\":{}}}",
            expected_version.unwrap_or_default(),
            current.version
        );
        return Err(sea_orm::DbErr::Custom(payload));
    }
    Ok(())
}

/// Write the state and return the version this write produced. A successful
/// compare-and-swap from `v` always lands on `v + 1`. An unconditional write
/// reads its version back, so `conn` must be a transaction for that value to
/// be this write's own.
pub async fn update_state<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    state: &GameState,
    expected_version: Option<i32>,
) -> Result<i32, sea_orm::DbErr> {
    write_state(conn, state, expected_version).await?;
    match expected_version {
        Some(expected) => Ok(expected + 1),
        None => Ok(require_game(conn, state.game_id).await?.version),
    }
}

pub async fn active_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<GameId>, sea_orm::DbErr> {
    games::Entity::find()
        .select_only()
        .column(games::Column::Id)
        .filter(games::Column::Status.eq(games::GameStatus::Active))
        .order_by_asc(games::Column::Id)
        .into_tuple::<i64>()
        .all(conn)
        .await
}

/// `GameStore` over a SeaORM connection.
#[derive(Debug, Clone)]
pub struct SeaGameStore {
    db: DatabaseConnection,
}

impl SeaGameStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GameStore for SeaGameStore {
    async fn create(&self, state: GameState) -> Result<StoredGame, DomainError> {
        let model = create_game(&self.db, &state).await.map_err(map_db_err)?;
        decode(model).map_err(map_db_err)
    }

    async fn load(&self, game_id: GameId) -> Result<StoredGame, DomainError> {
        let model = require_game(&self.db, game_id).await.map_err(map_db_err)?;
        decode(model).map_err(map_db_err)
    }

    async fn save(
        &self,
        state: &GameState,
        expected_version: Option<i32>,
    ) -> Result<i32, DomainError> {
        if expected_version.is_some() {
            return update_state(&self.db, state, expected_version)
                .await
                .map_err(map_db_err);
        }
        let txn = self.db.begin().await.map_err(map_db_err)?;
        match update_state(&txn, state, None).await {
            Ok(version) => {
                txn.commit().await.map_err(map_db_err)?;
                Ok(version)
            }
            Err(e) => {
                let _ = txn.rollback().await;
                Err(map_db_err(e))
            }
        }
    }

    async fn active_game_ids(&self) -> Result<Vec<GameId>, DomainError> {
        active_ids(&self.db).await.map_err(map_db_err)
    }
}
